use std::{
    cmp::Ordering,
    fmt::{Debug, Display},
    hash::{Hash, Hasher},
};

/// 终结符.
///
/// 可以携带一个附加值 (词法分析器给出的原始文本, 例如数字字面量 `5`),
/// 附加值不参与相等比较, 哈希与排序, 只供语义动作使用.
#[derive(Clone, Copy)]
pub struct Terminal<'a> {
    ident: &'a str,
    payload: Option<&'a str>,
}

impl Debug for Terminal<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.payload {
            Some(payload) => f.pad(&format!(r#"t{:?}({payload})"#, self.ident)),
            None => f.pad(&format!(r#"t{:?}"#, self.ident)),
        }
    }
}

impl Display for Terminal<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.ident)
    }
}

impl PartialEq for Terminal<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.ident == other.ident
    }
}

impl Eq for Terminal<'_> {}

impl Hash for Terminal<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.ident.hash(state);
    }
}

impl PartialOrd for Terminal<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Terminal<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.ident.cmp(other.ident)
    }
}

impl<'a> From<&'a str> for Terminal<'a> {
    fn from(ident: &'a str) -> Self {
        Terminal {
            ident,
            payload: None,
        }
    }
}

impl<'a> Terminal<'a> {
    #[must_use]
    pub const fn new(ident: &'a str) -> Self {
        Self {
            ident,
            payload: None,
        }
    }

    /// 创建携带附加值的终结符, 一般由词法分析器产生.
    #[must_use]
    pub const fn with_payload(ident: &'a str, payload: &'a str) -> Self {
        Self {
            ident,
            payload: Some(payload),
        }
    }

    pub fn as_str(&self) -> &'a str {
        self.ident
    }

    #[must_use]
    pub fn payload(&self) -> Option<&'a str> {
        self.payload
    }
}

#[derive(PartialEq, Eq, Clone, Hash, Copy, PartialOrd, Ord)]
pub struct NonTerminal<'a> {
    ident: &'a str,
}

impl Debug for NonTerminal<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(&format!(r#"nt{:?}"#, self.ident))
    }
}

impl Display for NonTerminal<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.ident)
    }
}

impl<'a> From<&'a str> for NonTerminal<'a> {
    fn from(ident: &'a str) -> Self {
        Self { ident }
    }
}

impl<'a> NonTerminal<'a> {
    pub fn as_str(&self) -> &'a str {
        self.ident
    }
}

/// 默认的空串标记.
pub const EPSILON: Terminal<'static> = Terminal::new("ε");
/// 默认的输入结束标记.
pub const EOF: Terminal<'static> = Terminal::new("$");

/// 文法使用的两个特殊终结符: 空串标记与输入结束标记.
///
/// 每个 [`crate::Grammar`] 持有自己的一份, 所有的分析过程都从文法中读取, 而不是使用全局常量.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Markers<'a> {
    pub epsilon: Terminal<'a>,
    pub eof: Terminal<'a>,
}

impl Default for Markers<'_> {
    fn default() -> Self {
        Self {
            epsilon: EPSILON,
            eof: EOF,
        }
    }
}

/// 文法符号, 终结符排在非终结符的前面.
#[derive(Clone, Copy, Hash, PartialOrd, Ord)]
pub enum Token<'a> {
    Terminal(Terminal<'a>),
    NonTerminal(NonTerminal<'a>),
}

impl Debug for Token<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Terminal(arg0) => f.pad(&format!("{:?}", arg0)),
            Self::NonTerminal(arg0) => f.pad(&format!("{:?}", arg0)),
        }
    }
}

impl Display for Token<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Terminal(arg0) => f.pad(&format!("{}", arg0)),
            Self::NonTerminal(arg0) => f.pad(&format!("{}", arg0)),
        }
    }
}

impl PartialEq for Token<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Terminal(l0), Self::Terminal(r0)) => l0 == r0,
            (Self::NonTerminal(l0), Self::NonTerminal(r0)) => l0 == r0,
            _ => false,
        }
    }
}

impl Eq for Token<'_> {}

impl<'a> Token<'a> {
    pub fn as_str(&self) -> &'a str {
        match self {
            Self::Terminal(t) => t.as_str(),
            Self::NonTerminal(nt) => nt.as_str(),
        }
    }

    #[must_use]
    pub fn is_term(&self) -> bool {
        matches!(self, Self::Terminal(_))
    }

    #[must_use]
    pub fn is_non_term(&self) -> bool {
        matches!(self, Self::NonTerminal(_))
    }

    #[must_use]
    pub fn as_term(&self) -> Option<Terminal<'a>> {
        match self {
            Self::Terminal(t) => Some(*t),
            Self::NonTerminal(_) => None,
        }
    }

    #[must_use]
    pub fn as_non_term(&self) -> Option<NonTerminal<'a>> {
        match self {
            Self::NonTerminal(nt) => Some(*nt),
            Self::Terminal(_) => None,
        }
    }
}

impl<'a> From<Terminal<'a>> for Token<'a> {
    fn from(value: Terminal<'a>) -> Self {
        Self::Terminal(value)
    }
}

impl<'a> From<NonTerminal<'a>> for Token<'a> {
    fn from(value: NonTerminal<'a>) -> Self {
        Self::NonTerminal(value)
    }
}
