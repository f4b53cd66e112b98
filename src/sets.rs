//! first 集与 follow 集.
//!
//! 两者都使用不动点迭代: 每一轮按顺序扫描所有产生式并把新的终结符并入对应的集合,
//! 直到某一轮没有任何集合发生变化. 集合只增不减, 终结符的数量有限, 因此对任意文法
//! (包括左递归文法) 都会停止.

use std::collections::{BTreeSet, HashMap};

use tracing::{debug, trace};

use crate::{Grammar, NonTerminal, Terminal, Token, error::Error};

/// 终结符集合, 使用 [`BTreeSet`] 保证输出顺序稳定.
pub type SymbolSet<'a> = BTreeSet<Terminal<'a>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirstSets<'a> {
    epsilon: Terminal<'a>,
    sets: HashMap<Token<'a>, SymbolSet<'a>>,
}

impl<'a> FirstSets<'a> {
    /// 计算文法中每一个符号的 first 集.
    ///
    /// 终结符 (包括两个特殊标记) 的 first 集就是它自身.
    /// # Errors
    /// - [`Error::UndefinedNonTerminal`] 产生式引用了没有定义的非终结符.
    pub fn from_grammar(grammar: &Grammar<'a>) -> Result<Self, Error> {
        let sets = grammar
            .tokens()
            .iter()
            .map(|tok| match tok {
                Token::Terminal(t) => (*tok, [*t].into()),
                Token::NonTerminal(_) => (*tok, SymbolSet::new()),
            })
            .collect();
        let mut first = Self {
            epsilon: grammar.epsilon(),
            sets,
        };
        let mut passes = 0;
        let mut changed = true;
        while changed {
            changed = false;
            passes += 1;
            for prod in grammar.prods() {
                let fs = first.first_set(prod.tail())?;
                // unwrap: 所有非终结符在初始化时都放入了 sets.
                let head_set = first.sets.get_mut(&Token::from(prod.head())).unwrap();
                for t in fs {
                    if head_set.insert(t) {
                        trace!("first({}) += {t}", prod.head());
                        changed = true;
                    }
                }
            }
        }
        debug!("first sets converged after {passes} passes");
        Ok(first)
    }

    /// 获取某个符号的 first 集, 如果这个符号不在文法中, 那么返回 [`None`].
    #[must_use]
    pub fn get(&self, tok: impl Into<Token<'a>>) -> Option<&SymbolSet<'a>> {
        let tok: Token<'a> = tok.into();
        self.sets.get(&tok)
    }

    /// 符号能否推导出空串.
    #[must_use]
    pub fn can_vanish(&self, tok: impl Into<Token<'a>>) -> bool {
        self.get(tok).is_some_and(|s| s.contains(&self.epsilon))
    }

    /// 计算一个 token 序列的 first 集.
    ///
    /// 从左到右扫描, 并入每个符号的 first 集 (去掉空串), 遇到不能推导出空串的符号就停止;
    /// 如果整个序列都能推导出空串 (包括 `seq` 为空), 结果中包含空串标记.
    /// # Errors
    /// - [`Error::UndefinedNonTerminal`] 序列中有不在文法中的非终结符.
    pub fn first_set<'b>(
        &self,
        seq: impl IntoIterator<Item = &'b Token<'a>>,
    ) -> Result<SymbolSet<'a>, Error>
    where
        'a: 'b,
    {
        let mut first_set = SymbolSet::new();
        for tok in seq {
            let fs = match (tok, self.sets.get(tok)) {
                (_, Some(fs)) => fs,
                // 输入中的终结符不一定出现在文法中, 其 first 集仍然是它自身.
                (Token::Terminal(t), None) => {
                    first_set.insert(*t);
                    return Ok(first_set);
                }
                (Token::NonTerminal(nt), None) => {
                    Err(Error::UndefinedNonTerminal(nt.as_str().to_string()))?
                }
            };
            first_set.extend(fs.iter().filter(|t| **t != self.epsilon));
            if !fs.contains(&self.epsilon) {
                return Ok(first_set);
            }
        }
        first_set.insert(self.epsilon);
        Ok(first_set)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowSets<'a> {
    sets: HashMap<NonTerminal<'a>, SymbolSet<'a>>,
}

impl<'a> FollowSets<'a> {
    /// 计算文法中每一个非终结符的 follow 集, 开始符号的 follow 集包含输入结束标记.
    ///
    /// 对于每一个产生式 `B -> alpha A beta` 中 `A` 的每一次出现:
    /// `first(beta)` 去掉空串后并入 `follow(A)`, 如果 `beta` 能推导出空串 (或者为空),
    /// 那么 `follow(B)` 也并入 `follow(A)`.
    pub fn from_grammar(grammar: &Grammar<'a>, first: &FirstSets<'a>) -> Result<Self, Error> {
        let mut sets: HashMap<NonTerminal<'a>, SymbolSet<'a>> = grammar
            .non_terminals()
            .iter()
            .map(|nt| (*nt, SymbolSet::new()))
            .collect();
        // unwrap: 开始符号一定是文法中的非终结符.
        sets.get_mut(&grammar.symbol_start())
            .unwrap()
            .insert(grammar.eof());
        let epsilon = grammar.epsilon();
        let mut passes = 0;
        let mut changed = true;
        while changed {
            changed = false;
            passes += 1;
            for prod in grammar.prods() {
                let tail = prod.tail();
                for (idx, nt) in tail
                    .iter()
                    .enumerate()
                    .filter_map(|(idx, t)| Some((idx, t.as_non_term()?)))
                {
                    let mut fs = first.first_set(&tail[idx + 1..])?;
                    if fs.remove(&epsilon) {
                        // unwrap: 产生式头部一定是文法中的非终结符.
                        fs.extend(sets.get(&prod.head()).unwrap().iter().copied());
                    }
                    let nt_set = sets
                        .get_mut(&nt)
                        .ok_or(Error::UndefinedNonTerminal(nt.as_str().to_string()))?;
                    for t in fs {
                        if nt_set.insert(t) {
                            trace!("follow({nt}) += {t}");
                            changed = true;
                        }
                    }
                }
            }
        }
        debug!("follow sets converged after {passes} passes");
        Ok(Self { sets })
    }

    #[must_use]
    pub fn get(&self, nt: NonTerminal<'a>) -> Option<&SymbolSet<'a>> {
        self.sets.get(&nt)
    }
}
