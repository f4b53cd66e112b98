/// 构造一个产生式尾部, 每个参数可以是 [`crate::Terminal`], [`crate::NonTerminal`] 或 [`crate::Token`].
///
/// ```
/// use ll_analysis::{NonTerminal, Terminal, Token, prod};
///
/// let tail: Vec<Token> = prod![Terminal::from("("), NonTerminal::from("E"), Terminal::from(")")];
/// assert_eq!(tail.len(), 3);
/// ```
#[macro_export]
macro_rules! prod {
    ($($tok:expr),* $(,)?) => {
        vec![$($crate::Token::from($tok)),*]
    };
}
