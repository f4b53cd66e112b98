use std::{collections::HashMap, fmt::Display};

use tracing::{debug, warn};

use crate::{
    Grammar, NonTerminal, Production, Terminal,
    error::Error,
    sets::{FirstSets, FollowSets},
};

/// 预测分析表的表项.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entry<'a> {
    /// 使用产生式展开非终结符.
    Produce(&'a Production<'a>),
    /// 空产生式标记, 非终结符推导出空串, 不消耗输入.
    Epsilon,
}

impl Entry<'_> {
    #[must_use]
    pub fn is_epsilon(&self) -> bool {
        matches!(self, Self::Epsilon)
    }
}

/// 分析表中的一个冲突格子: 同一个 `(非终结符, 终结符)` 需要放入两个不同的表项.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub non_terminal: String,
    pub lookahead: String,
    /// 已经在格子中的表项.
    pub existing: String,
    /// 试图放入格子的表项.
    pub incoming: String,
}

impl Display for Conflict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(&format!(
            "M[{}, {}]: `{}` / `{}`",
            self.non_terminal, self.lookahead, self.existing, self.incoming
        ))
    }
}

/// LL(1) 预测分析表.
#[derive(Debug, Clone)]
pub struct Table<'a> {
    /// 每个非终结符一行, 每个终结符一列.
    cells: Vec<Vec<Option<Entry<'a>>>>,
    /// 表中的终结符 (不包括空串标记), 下标即为表中的列.
    terms: Vec<Terminal<'a>>,
    /// 表中的非终结符 (声明顺序), 下标即为表中的行.
    non_terms: Vec<NonTerminal<'a>>,
    term_idxes: HashMap<&'a str, usize>,
    non_term_idxes: HashMap<&'a str, usize>,
    epsilon: Terminal<'a>,
}

impl PartialEq for Table<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cells == other.cells && self.terms == other.terms && self.non_terms == other.non_terms
    }
}

impl Eq for Table<'_> {}

impl<'a> Table<'a> {
    /// 计算 first 集, follow 集并构建分析表.
    pub fn from_grammar(grammar: &Grammar<'a>) -> Result<Self, Error> {
        let first = FirstSets::from_grammar(grammar)?;
        let follow = FollowSets::from_grammar(grammar, &first)?;
        Self::build_from(grammar, &first, &follow)
    }

    /// 构建 LL(1) 分析表.
    ///
    /// 对于非终结符 `A` 的每一个产生式 `p`, 设 `L = first(p)`:
    /// - `L` 中的每个终结符 `t` 放入 `M[A, t] = p`;
    /// - 如果 `L` 包含空串, 那么 `follow(A)` 中的每个终结符 `t` 放入 `M[A, t] = epsilon`.
    /// # Errors
    /// - [`Error::GrammarConflict`] 文法不是 LL(1) 的, 包含所有的冲突格子.
    /// - 其他见: [`FirstSets::first_set`].
    pub fn build_from(
        grammar: &Grammar<'a>,
        first: &FirstSets<'a>,
        follow: &FollowSets<'a>,
    ) -> Result<Self, Error> {
        let epsilon = grammar.epsilon();
        let terms: Vec<_> = grammar.terminals().filter(|t| *t != epsilon).collect();
        let non_terms = grammar.non_terminals().to_vec();
        let term_idxes: HashMap<&'a str, usize> = terms
            .iter()
            .enumerate()
            .map(|(a, b)| (b.as_str(), a))
            .collect();
        let non_term_idxes: HashMap<&'a str, usize> = non_terms
            .iter()
            .enumerate()
            .map(|(a, b)| (b.as_str(), a))
            .collect();
        let mut cells = vec![vec![None; terms.len()]; non_terms.len()];
        let mut conflicts = Vec::new();
        let mut put = |row: usize, t: Terminal<'a>, entry: Entry<'a>| {
            // 表的列包含了文法中除空串以外的所有终结符.
            let col = term_idxes[t.as_str()];
            let cell: &mut Option<Entry<'a>> = &mut cells[row][col];
            match *cell {
                None => *cell = Some(entry),
                Some(existing) if existing == entry => {}
                Some(existing) => {
                    let head = non_terms[row];
                    let conflict = Conflict {
                        non_terminal: head.to_string(),
                        lookahead: t.to_string(),
                        existing: render(head, existing, epsilon),
                        incoming: render(head, entry, epsilon),
                    };
                    warn!("LL(1) conflict: {conflict}");
                    conflicts.push(conflict);
                }
            }
        };
        for (row, &nt) in non_terms.iter().enumerate() {
            for &prod in grammar.prods_of(nt) {
                let mut look_aheads = first.first_set(prod.tail())?;
                let vanish = look_aheads.remove(&epsilon);
                for t in look_aheads {
                    put(row, t, Entry::Produce(prod));
                }
                if vanish {
                    for &t in follow.get(nt).into_iter().flatten() {
                        put(row, t, Entry::Epsilon);
                    }
                }
            }
        }
        if !conflicts.is_empty() {
            Err(Error::GrammarConflict(conflicts))?
        }
        debug!(
            "LL(1) table built: {} non-terminals x {} terminals",
            non_terms.len(),
            terms.len()
        );
        Ok(Self {
            cells,
            terms,
            non_terms,
            term_idxes,
            non_term_idxes,
            epsilon,
        })
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.non_terms.len()
    }

    #[must_use]
    pub fn cols(&self) -> usize {
        self.terms.len()
    }

    pub fn terminals(&self) -> &[Terminal<'a>] {
        &self.terms
    }

    pub fn non_terminals(&self) -> &[NonTerminal<'a>] {
        &self.non_terms
    }

    /// 查询 `M[non_term, term]`.
    /// # Returns
    /// 如果格子为空, 或者表中没有这个非终结符/终结符, 那么返回 [`None`].
    #[must_use]
    pub fn entry(&self, non_term: NonTerminal, term: Terminal) -> Option<Entry<'a>> {
        let row = *self.non_term_idxes.get(non_term.as_str())?;
        let col = *self.term_idxes.get(term.as_str())?;
        self.cells[row][col]
    }

    /// 遍历一个非终结符的所有非空表项, 如果表中没有这个非终结符, 那么返回 [`None`].
    #[must_use]
    pub fn entries(
        &self,
        non_term: NonTerminal,
    ) -> Option<impl Iterator<Item = (Terminal<'a>, Entry<'a>)> + '_> {
        let row = *self.non_term_idxes.get(non_term.as_str())?;
        Some(
            self.cells[row]
                .iter()
                .enumerate()
                .filter_map(|(col, e)| Some((self.terms[col], (*e)?))),
        )
    }

    /// 使用 markdown 形式输出表格.
    #[must_use]
    pub fn to_markdown(&self) -> String {
        let mut header_line = "| |".to_string();
        header_line += &self
            .terms
            .iter()
            .map(|t| format!(" `{}` |", t.as_str()))
            .collect::<String>();
        let sep_line: String = String::from("| - |")
            + &std::iter::repeat_n(" - |", self.terms.len()).collect::<String>();
        let mut data_lines = String::new();
        for (nt, row) in self.non_terms.iter().zip(self.cells.iter()) {
            let line = format!("| `{nt}` |")
                + &row
                    .iter()
                    .map(|entry| match entry {
                        Some(entry) => format!(" {} |", render(*nt, *entry, self.epsilon)),
                        None => "  |".to_string(),
                    })
                    .collect::<String>();
            data_lines += &line;
            data_lines += "\n";
        }
        format!("{header_line}\n{sep_line}\n{}", data_lines.trim_end())
    }
}

fn render(head: NonTerminal, entry: Entry, epsilon: Terminal) -> String {
    match entry {
        Entry::Produce(prod) => prod.to_string(),
        Entry::Epsilon => format!("{head} -> {epsilon}"),
    }
}
