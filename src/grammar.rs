use bumpalo::Bump;
use std::{
    collections::{BTreeSet, HashMap, HashSet},
    fmt::{Debug, Display},
};

use crate::{
    NonTerminal, Terminal, Token,
    error::{Error, ParseProductionError},
    token::Markers,
};

#[derive(Clone, Hash, PartialOrd, Ord)]
pub struct Production<'a> {
    // 产生式 `->` 左侧内容.
    head: NonTerminal<'a>,
    // 产生式 `->` 右侧内容, 空产生式为 `[epsilon]`.
    tail: Vec<Token<'a>>,
}

impl Debug for Production<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Production")
            .field(&format_args!(
                "{:?} -> {}",
                self.head,
                self.tail
                    .iter()
                    .map(|t| format!("{:?} ", t))
                    .collect::<String>()
                    .trim_end()
            ))
            .finish()
    }
}

impl Display for Production<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(&format!(
            "{} -> {}",
            self.head,
            self.tail
                .iter()
                .map(|t| format!("{} ", t))
                .collect::<String>()
                .trim_end()
        ))
    }
}

impl PartialEq for Production<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.head == other.head && self.tail == other.tail
    }
}

impl Eq for Production<'_> {}

impl<'a> Production<'a> {
    #[must_use]
    pub fn new(head: NonTerminal<'a>, tail: Vec<Token<'a>>) -> Self {
        Self { head, tail }
    }

    #[must_use]
    pub fn head(&self) -> NonTerminal<'a> {
        self.head
    }

    #[must_use]
    pub fn tail(&self) -> &[Token<'a>] {
        &self.tail
    }

    /// 去掉空串标记之后的产生式尾部, 也就是分析栈上真正需要匹配的符号.
    pub fn tail_without(
        &self,
        epsilon: Terminal<'a>,
    ) -> impl DoubleEndedIterator<Item = &Token<'a>> {
        self.tail
            .iter()
            .filter(move |tok| **tok != Token::Terminal(epsilon))
    }

    /// 产生式是否恰好为 `head -> epsilon`.
    #[must_use]
    pub fn is_epsilon(&self, epsilon: Terminal<'a>) -> bool {
        self.tail_without(epsilon).next().is_none()
    }
}

/// 上下文无关文法.
///
/// 非终结符之间通过名字互相引用, 文法只持有一份 `非终结符 -> 产生式列表` 的扁平映射,
/// 产生式本身分配在调用者提供的 [`Bump`] 中, 因此分析表和分析器可以直接持有 `&'a Production<'a>`.
#[derive(Debug, Clone)]
pub struct Grammar<'a> {
    /// 按照声明顺序排列的所有产生式.
    prods: Vec<&'a Production<'a>>,
    /// 按照声明顺序排列的非终结符, 第一个为开始符号.
    non_terms: Vec<NonTerminal<'a>>,
    rules: HashMap<NonTerminal<'a>, Vec<&'a Production<'a>>>,
    /// 出现过的所有符号, 总是包含两个特殊标记.
    tokens: BTreeSet<Token<'a>>,
    start: NonTerminal<'a>,
    markers: Markers<'a>,
}

impl PartialEq for Grammar<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.prods == other.prods
            && self.start == other.start
            && self.tokens == other.tokens
            && self.markers == other.markers
    }
}

impl Eq for Grammar<'_> {}

impl<'a> Grammar<'a> {
    /// 使用默认的 [`Markers`] 构建文法, 见 [`Grammar::with_markers`].
    pub fn new<I>(rules: I, bump: &'a Bump) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (NonTerminal<'a>, Vec<Vec<Token<'a>>>)>,
    {
        Self::with_markers(rules, Markers::default(), bump)
    }

    /// 从 `(非终结符, 产生式列表)` 序列构建文法, 第一个非终结符为开始符号.
    ///
    /// 同一个非终结符出现多次时, 产生式按顺序追加.
    /// # Errors
    /// - [`Error::EmptyGrammar`] 序列为空.
    /// - [`Error::EmptyProduction`] 某个产生式尾部没有任何符号.
    /// - [`Error::UndefinedNonTerminal`] 产生式引用了没有定义的非终结符.
    /// - [`Error::EndMarkerInProduction`] 产生式尾部包含输入结束标记.
    /// - [`Error::IndistinctMarkers`] 空串标记与输入结束标记相同.
    pub fn with_markers<I>(rules: I, markers: Markers<'a>, bump: &'a Bump) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (NonTerminal<'a>, Vec<Vec<Token<'a>>>)>,
    {
        if markers.epsilon == markers.eof {
            Err(Error::IndistinctMarkers(markers.eof.to_string()))?
        }
        let mut prods = Vec::new();
        let mut non_terms = Vec::new();
        let mut by_head: HashMap<NonTerminal<'a>, Vec<&'a Production<'a>>> = HashMap::new();
        let mut tokens: BTreeSet<Token<'a>> = [markers.epsilon.into(), markers.eof.into()].into();
        for (head, tails) in rules {
            if !by_head.contains_key(&head) {
                non_terms.push(head);
                tokens.insert(head.into());
            }
            let entry = by_head.entry(head).or_default();
            for tail in tails {
                if tail.is_empty() {
                    Err(Error::EmptyProduction(head.as_str().to_string()))?
                }
                // 输入结束标记只能由分析器放在栈底.
                if tail.contains(&Token::Terminal(markers.eof)) {
                    Err(Error::EndMarkerInProduction(head.as_str().to_string()))?
                }
                tokens.extend(tail.iter().copied());
                let prod = &*bump.alloc(Production::new(head, tail));
                entry.push(prod);
                prods.push(prod);
            }
        }
        let Some(&start) = non_terms.first() else {
            return Err(Error::EmptyGrammar);
        };
        // 所有被引用的非终结符都必须有定义, 否则后续求 first 集时会查找失败.
        for prod in &prods {
            for nt in prod.tail().iter().filter_map(|t| t.as_non_term()) {
                if !by_head.contains_key(&nt) {
                    Err(Error::UndefinedNonTerminal(nt.as_str().to_string()))?
                }
            }
        }
        Ok(Grammar {
            prods,
            non_terms,
            rules: by_head,
            tokens,
            start,
            markers,
        })
    }

    /// 使用默认的 [`Markers`] 解析文本形式的文法, 见 [`Grammar::from_cfg_with_markers`].
    pub fn from_cfg(s: &'a str, bump: &'a Bump) -> Result<Self, Error> {
        Self::from_cfg_with_markers(s, Markers::default(), bump)
    }

    /// 解析文本形式的文法, 每行一条规则: `head -> a b | c`.
    ///
    /// 出现在某一行 `->` 左侧的符号为非终结符, 其余的符号为终结符,
    /// 与 `markers.epsilon` 同名的符号表示空串. 第一行的左侧符号为开始符号.
    pub fn from_cfg_with_markers(
        s: &'a str,
        markers: Markers<'a>,
        bump: &'a Bump,
    ) -> Result<Self, Error> {
        let mut non_terminals = HashSet::new();
        let mut splitted: Vec<(&str, &str)> = Vec::new();
        // 找出所有的非终结符.
        for (line_num, line) in s
            .lines()
            .enumerate()
            .filter(|(_, s)| s.chars().any(|c| !c.is_whitespace()))
        {
            let parts = line.split_once("->").ok_or(Error::parse_production_error(
                line_num,
                ParseProductionError::NoArrow,
            ))?;
            let head_ident = parts.0.trim();
            if head_ident.is_empty() || head_ident.contains(char::is_whitespace) {
                Err(Error::parse_production_error(
                    line_num,
                    ParseProductionError::InvalidHead(head_ident.to_string()),
                ))?
            }
            splitted.push((head_ident, parts.1));
            non_terminals.insert(head_ident);
        }
        let rules: Vec<_> = splitted
            .into_iter()
            .map(|(head_ident, tails)| {
                let tails: Vec<Vec<Token<'a>>> = tails
                    .split('|')
                    .map(|tail_s| {
                        tail_s
                            .split_ascii_whitespace()
                            .map(|s| {
                                if non_terminals.contains(s) {
                                    Token::from(NonTerminal::from(s))
                                } else {
                                    Token::from(Terminal::from(s))
                                }
                            })
                            .collect()
                    })
                    .collect();
                (NonTerminal::from(head_ident), tails)
            })
            .collect();
        Self::with_markers(rules, markers, bump)
    }

    /// 按声明顺序遍历产生式.
    pub fn prods(&self) -> &[&'a Production<'a>] {
        &self.prods
    }

    /// 获取以某个非终结符为头部的所有产生式, 如果这个非终结符没有定义, 那么返回空.
    #[must_use]
    pub fn prods_of(&self, nt: NonTerminal<'a>) -> &[&'a Production<'a>] {
        self.rules.get(&nt).map(Vec::as_slice).unwrap_or_default()
    }

    /// 按声明顺序遍历非终结符.
    pub fn non_terminals(&self) -> &[NonTerminal<'a>] {
        &self.non_terms
    }

    /// 文法中的所有终结符 (包括空串标记与输入结束标记).
    pub fn terminals(&self) -> impl Iterator<Item = Terminal<'a>> + '_ {
        self.tokens.iter().map_while(|t| t.as_term())
    }

    #[must_use]
    pub fn tokens(&self) -> &BTreeSet<Token<'a>> {
        &self.tokens
    }

    /// 按名字查找终结符, 可用于把输入的单词映射到文法的终结符上.
    #[must_use]
    pub fn terminal(&self, ident: &str) -> Option<Terminal<'a>> {
        self.terminals().find(|t| t.as_str() == ident)
    }

    #[must_use]
    pub fn symbol_start(&self) -> NonTerminal<'a> {
        self.start
    }

    #[must_use]
    pub fn markers(&self) -> Markers<'a> {
        self.markers
    }

    #[must_use]
    pub fn epsilon(&self) -> Terminal<'a> {
        self.markers.epsilon
    }

    #[must_use]
    pub fn eof(&self) -> Terminal<'a> {
        self.markers.eof
    }
}

#[cfg(test)]
mod test {
    use std::collections::BTreeSet;

    use crate::{
        NonTerminal, Production, Terminal, Token,
        error::{Error, ParseProductionError},
        grammar::Grammar,
        prod,
        token::{EOF, EPSILON, Markers},
    };
    use bumpalo::Bump;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_productions() {
        let input = "
            program -> compoundstmt
            stmt -> ifstmt | whilestmt | assgstmt
            compoundstmt -> { stmts }
            stmt -> ε
        ";
        let bump = Bump::new();
        let grammar = Grammar::from_cfg(input, &bump).unwrap();

        let prods = [
            Production::new(
                "program".into(),
                vec![NonTerminal::from("compoundstmt").into()],
            ),
            Production::new("stmt".into(), vec![Terminal::from("ifstmt").into()]),
            Production::new("stmt".into(), vec![Terminal::from("whilestmt").into()]),
            Production::new("stmt".into(), vec![Terminal::from("assgstmt").into()]),
            Production::new(
                "compoundstmt".into(),
                vec![
                    Terminal::from("{").into(),
                    Terminal::from("stmts").into(),
                    Terminal::from("}").into(),
                ],
            ),
            Production::new("stmt".into(), vec![EPSILON.into()]),
        ];

        let tokens: BTreeSet<Token<'static>> = [
            NonTerminal::from("program").into(),
            NonTerminal::from("compoundstmt").into(),
            NonTerminal::from("stmt").into(),
            EPSILON.into(),
            EOF.into(),
            Terminal::from("ifstmt").into(),
            Terminal::from("whilestmt").into(),
            Terminal::from("assgstmt").into(),
            Terminal::from("{").into(),
            Terminal::from("}").into(),
            Terminal::from("stmts").into(),
        ]
        .into();

        assert_eq!(grammar.symbol_start(), NonTerminal::from("program"));
        assert_eq!(grammar.prods, prods.iter().collect::<Vec<_>>());
        assert_eq!(grammar.tokens, tokens);
        assert_eq!(
            grammar.non_terminals(),
            ["program", "stmt", "compoundstmt"].map(NonTerminal::from)
        );
        assert_eq!(grammar.prods_of("stmt".into()).len(), 4);
        assert!(grammar.prods_of("stmt".into())[3].is_epsilon(grammar.epsilon()));
        assert_eq!(grammar.terminal("{"), Some(Terminal::from("{")));
        assert_eq!(grammar.terminal("program"), None);
    }

    #[test]
    fn literal_rules() {
        let bump = Bump::new();
        let (e, x) = (NonTerminal::from("E"), NonTerminal::from("X"));
        let (plus, int) = (Terminal::from("+"), Terminal::from("int"));
        let grammar = Grammar::new(
            [
                (e, vec![prod![int, x]]),
                (x, vec![prod![plus, e], prod![EPSILON]]),
            ],
            &bump,
        )
        .unwrap();
        assert_eq!(grammar.symbol_start(), e);
        assert_eq!(grammar.prods().len(), 3);
        assert_eq!(
            grammar.terminals().collect::<Vec<_>>(),
            vec![EOF, plus, int, EPSILON]
        );
        assert_eq!(grammar.prods()[0].to_string(), "E -> int X");
        assert_eq!(grammar.prods()[2].to_string(), "X -> ε");
    }

    #[test]
    fn custom_markers() {
        let bump = Bump::new();
        let markers = Markers {
            epsilon: Terminal::from("eps"),
            eof: Terminal::from("eof"),
        };
        let grammar = Grammar::from_cfg_with_markers("S -> a S | eps", markers, &bump).unwrap();
        assert_eq!(grammar.markers(), markers);
        assert_eq!(grammar.eof(), Terminal::from("eof"));
        assert!(grammar.prods()[1].is_epsilon(grammar.epsilon()));
        assert!(!grammar.prods()[1].is_epsilon(EPSILON));

        let same = Markers {
            epsilon: Terminal::from("$"),
            eof: EOF,
        };
        assert_eq!(
            Grammar::from_cfg_with_markers("S -> a", same, &bump),
            Err(Error::IndistinctMarkers("$".into()))
        );
    }

    #[test]
    fn end_marker_in_production() {
        let bump = Bump::new();
        assert_eq!(
            Grammar::from_cfg("S -> a $", &bump),
            Err(Error::EndMarkerInProduction("S".into()))
        );
        // 自定义结束标记时, `$` 只是普通的终结符.
        let markers = Markers {
            epsilon: EPSILON,
            eof: Terminal::from("eof"),
        };
        let grammar = Grammar::from_cfg_with_markers("S -> a $", markers, &bump).unwrap();
        assert_eq!(grammar.terminal("$"), Some(Terminal::from("$")));
        assert_eq!(
            Grammar::from_cfg_with_markers("S -> a eof", markers, &bump),
            Err(Error::EndMarkerInProduction("S".into()))
        );
    }

    #[test]
    fn invalid_grammars() {
        let bump = Bump::new();
        assert_eq!(
            Grammar::new(Vec::<(NonTerminal, Vec<Vec<Token>>)>::new(), &bump),
            Err(Error::EmptyGrammar)
        );
        assert_eq!(Grammar::from_cfg("  \n  ", &bump), Err(Error::EmptyGrammar));
        assert_eq!(
            Grammar::new([(NonTerminal::from("S"), vec![vec![]])], &bump),
            Err(Error::EmptyProduction("S".into()))
        );
        assert_eq!(
            Grammar::new(
                [(
                    NonTerminal::from("S"),
                    vec![prod![Terminal::from("a"), NonTerminal::from("A")]]
                )],
                &bump
            ),
            Err(Error::UndefinedNonTerminal("A".into()))
        );
        assert_eq!(
            Grammar::from_cfg("S -> a\n a b", &bump),
            Err(Error::ParseProductionError {
                line: 1,
                cause: ParseProductionError::NoArrow
            })
        );
        assert_eq!(
            Grammar::from_cfg("S a -> x", &bump),
            Err(Error::ParseProductionError {
                line: 0,
                cause: ParseProductionError::InvalidHead("S a".into())
            })
        );
        assert_eq!(
            Grammar::from_cfg("S -> a |", &bump),
            Err(Error::EmptyProduction("S".into()))
        );
    }
}
