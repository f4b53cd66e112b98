//! 表驱动的 LL(1) 预测分析器.
//!
//! ```text
//! 栈初始化为 [$, S], 令 a 为输入的第一个符号;
//! while (栈不为空) {
//!     弹出栈顶符号 X;
//!     if (X 是终结符) {
//!         if (X != a) 报错;
//!         令 a 为下一个输入符号;
//!     } else if (M[X, a] = X -> Y1 Y2 ... Yk) {
//!         依次压入 Yk, ..., Y2, Y1;
//!     } else if (M[X, a] = X -> epsilon) {
//!         什么也不压入;
//!     } else 报错;
//! }
//! ```

use tracing::trace;

use crate::{
    Grammar, NonTerminal, Terminal, Token,
    error::{Error, MalformedInput},
    table::{Entry, Table},
};

/// 语义动作, 分析器在匹配终结符与展开完一个产生式之后调用.
pub trait Semantics<'a> {
    type Value;

    /// 匹配了一个输入终结符 (不包括输入结束标记), 附加值可以通过 [`Terminal::payload`] 获取.
    fn shift(&mut self, term: Terminal<'a>) -> Self::Value;

    /// 产生式 `head -> tail` 的所有子节点都已经匹配完成, `children` 与去掉空串之后的 `tail` 一一对应.
    ///
    /// 对于空产生式, `tail` 为空串标记, `children` 为空.
    fn reduce(
        &mut self,
        head: NonTerminal<'a>,
        tail: &[Token<'a>],
        children: Vec<Self::Value>,
    ) -> Self::Value;
}

/// 只进行识别, 不计算任何值.
#[derive(Debug, Default, Clone, Copy)]
pub struct Recognize;

impl<'a> Semantics<'a> for Recognize {
    type Value = ();

    fn shift(&mut self, _term: Terminal<'a>) {}

    fn reduce(&mut self, _head: NonTerminal<'a>, _tail: &[Token<'a>], _children: Vec<()>) {}
}

/// 分析栈中的元素.
#[derive(Debug, Clone, Copy)]
enum Frame<'a> {
    /// 等待匹配或者展开的符号.
    Symbol(Token<'a>),
    /// 产生式的尾部已经全部出栈, 此时执行语义动作.
    Reduce(NonTerminal<'a>, &'a [Token<'a>], usize),
}

#[derive(Debug, Clone, Copy)]
pub struct Parser<'a> {
    grammar: &'a Grammar<'a>,
    table: &'a Table<'a>,
}

impl<'a> Parser<'a> {
    #[must_use]
    pub fn new(grammar: &'a Grammar<'a>, table: &'a Table<'a>) -> Self {
        Self { grammar, table }
    }

    /// 识别输入的终结符序列, 见 [`Parser::parse_with`].
    pub fn parse<I>(&self, input: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = Terminal<'a>>,
    {
        self.parse_with(input, &mut Recognize)
    }

    /// 分析输入的终结符序列, 并返回开始符号的语义值.
    ///
    /// 输入应当以文法的输入结束标记结尾, 输入耗尽之后也视为读到了输入结束标记.
    /// 分析在栈顶的输入结束标记被匹配之后才算成功.
    /// # Errors
    /// - [`Error::MalformedInput`] 输入不符合文法, 包含出错时输入的位置, 不会尝试恢复.
    pub fn parse_with<I, S>(&self, input: I, semantics: &mut S) -> Result<S::Value, Error>
    where
        I: IntoIterator<Item = Terminal<'a>>,
        S: Semantics<'a>,
    {
        let eof = self.grammar.eof();
        let epsilon = self.grammar.epsilon();
        let mut input = input.into_iter();
        let mut cursor = 0;
        let mut look_ahead = input.next().unwrap_or(eof);
        let mut stack = vec![
            Frame::Symbol(eof.into()),
            Frame::Symbol(self.grammar.symbol_start().into()),
        ];
        let mut values: Vec<S::Value> = Vec::new();
        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Symbol(Token::Terminal(expected)) => {
                    if expected != look_ahead {
                        Err(Error::malformed_input(
                            cursor,
                            MalformedInput::UnexpectedTerminal {
                                expected: expected.to_string(),
                                found: look_ahead.to_string(),
                            },
                        ))?
                    }
                    trace!("{cursor}: match {look_ahead:?}");
                    if expected == eof {
                        // 输入结束标记在栈底, 匹配之后栈一定为空, 输入也必须结束.
                        if let Some(extra) = input.next() {
                            Err(Error::malformed_input(
                                cursor + 1,
                                MalformedInput::TrailingInput {
                                    found: extra.to_string(),
                                },
                            ))?
                        }
                    } else {
                        values.push(semantics.shift(look_ahead));
                        cursor += 1;
                        look_ahead = input.next().unwrap_or(eof);
                    }
                }
                Frame::Symbol(Token::NonTerminal(nt)) => {
                    let entry = self.table.entry(nt, look_ahead).ok_or_else(|| {
                        Error::malformed_input(
                            cursor,
                            MalformedInput::NoEntry {
                                non_terminal: nt.to_string(),
                                lookahead: look_ahead.to_string(),
                            },
                        )
                    })?;
                    match entry {
                        Entry::Epsilon => {
                            trace!("{cursor}: {nt} -> {epsilon}");
                            let tail = [Token::Terminal(epsilon)];
                            values.push(semantics.reduce(nt, &tail, Vec::new()));
                        }
                        Entry::Produce(prod) => {
                            trace!("{cursor}: {prod}");
                            let arity = prod.tail_without(epsilon).count();
                            stack.push(Frame::Reduce(nt, prod.tail(), arity));
                            stack.extend(
                                prod.tail_without(epsilon)
                                    .rev()
                                    .map(|t| Frame::Symbol(*t)),
                            );
                        }
                    }
                }
                Frame::Reduce(head, tail, arity) => {
                    // 栈中在 Reduce 之上的 arity 个符号都已经出栈, 各自留下了一个语义值.
                    let children = values.split_off(values.len() - arity);
                    values.push(semantics.reduce(head, tail, children));
                }
            }
        }
        // unwrap: 开始符号在输入结束标记之前出栈, 恰好留下一个语义值.
        Ok(values.pop().unwrap())
    }
}

#[cfg(test)]
mod test {
    use bumpalo::Bump;

    use crate::{
        Grammar, NonTerminal, Table, Terminal, Token,
        error::{Error, MalformedInput},
        parser::{Parser, Semantics},
        token::EOF,
    };
    use pretty_assertions::assert_eq;

    const ARITH: &str = "
        E -> T X
        X -> + E | ε
        T -> ( E ) | int Y
        Y -> * T | ε
    ";

    fn terms(input: &str) -> Vec<Terminal<'_>> {
        input.split_whitespace().map(Terminal::from).collect()
    }

    #[test]
    fn accept() {
        let bump = Bump::new();
        let grammar = Grammar::from_cfg(ARITH, &bump).unwrap();
        let table = Table::from_grammar(&grammar).unwrap();
        let parser = Parser::new(&grammar, &table);
        assert_eq!(parser.parse(terms("( int * int + int ) $")), Ok(()));
        assert_eq!(parser.parse(terms("int")), Ok(()), "end marker is implied");
        assert_eq!(parser.parse(terms("int * ( int + int ) + int $")), Ok(()));
    }

    #[test]
    fn reject() {
        let bump = Bump::new();
        let grammar = Grammar::from_cfg(ARITH, &bump).unwrap();
        let table = Table::from_grammar(&grammar).unwrap();
        let parser = Parser::new(&grammar, &table);
        assert_eq!(
            parser.parse(terms("( int * + int ) $")),
            Err(Error::MalformedInput {
                position: 3,
                cause: MalformedInput::NoEntry {
                    non_terminal: "T".into(),
                    lookahead: "+".into()
                }
            })
        );
        assert_eq!(
            parser.parse(terms("( int * int $")),
            Err(Error::MalformedInput {
                position: 4,
                cause: MalformedInput::UnexpectedTerminal {
                    expected: ")".into(),
                    found: "$".into()
                }
            })
        );
        assert_eq!(
            parser.parse(terms("int $ int")),
            Err(Error::MalformedInput {
                position: 2,
                cause: MalformedInput::TrailingInput { found: "int".into() }
            })
        );
        // `T -> ( E )` 之后不能再接 `*`.
        assert_eq!(
            parser.parse(terms("int * ( int + int ) * int $")),
            Err(Error::MalformedInput {
                position: 7,
                cause: MalformedInput::NoEntry {
                    non_terminal: "X".into(),
                    lookahead: "*".into()
                }
            })
        );
        assert!(parser.parse(terms("$")).is_err());
        assert!(parser.parse(terms("int int $")).is_err());
    }

    #[test]
    fn reentrant() {
        let bump = Bump::new();
        let grammar = Grammar::from_cfg(ARITH, &bump).unwrap();
        let table = Table::from_grammar(&grammar).unwrap();
        let parser = Parser::new(&grammar, &table);
        assert!(parser.parse(terms("( int * + int ) $")).is_err());
        // 失败的分析不影响之后的分析.
        assert_eq!(parser.parse(terms("( int * int + int ) $")), Ok(()));
        std::thread::scope(|s| {
            for input in ["int $", "( int ) $", "int + int $"] {
                s.spawn(move || assert_eq!(parser.parse(terms(input)), Ok(())));
            }
        });
    }

    /// 求值四则运算: `E` 与 `T` 的值为数值, `X` 的值为需要加上的数, `Y` 的值为需要乘上的数.
    struct Eval;

    impl<'a> Semantics<'a> for Eval {
        type Value = i64;

        fn shift(&mut self, term: Terminal<'a>) -> i64 {
            term.payload().and_then(|p| p.parse().ok()).unwrap_or_default()
        }

        fn reduce(
            &mut self,
            head: NonTerminal<'a>,
            tail: &[Token<'a>],
            children: Vec<i64>,
        ) -> i64 {
            match (head.as_str(), tail.len(), children.as_slice()) {
                ("E", _, [t, x]) => t + x,
                ("X", _, [_, e]) => *e,
                ("X", _, []) => 0,
                ("T", 3, [_, e, _]) => *e,
                ("T", 2, [int, y]) => int * y,
                ("Y", _, [_, t]) => *t,
                ("Y", _, []) => 1,
                other => unreachable!("unexpected reduction {other:?}"),
            }
        }
    }

    #[test]
    fn semantic_actions() {
        let bump = Bump::new();
        let grammar = Grammar::from_cfg(ARITH, &bump).unwrap();
        let table = Table::from_grammar(&grammar).unwrap();
        let parser = Parser::new(&grammar, &table);
        let input = [
            Terminal::from("("),
            Terminal::with_payload("int", "5"),
            Terminal::from("*"),
            Terminal::with_payload("int", "10"),
            Terminal::from("+"),
            Terminal::with_payload("int", "15"),
            Terminal::from(")"),
            EOF,
        ];
        assert_eq!(parser.parse_with(input, &mut Eval), Ok(65));
        let input = [
            Terminal::with_payload("int", "2"),
            Terminal::from("*"),
            Terminal::from("("),
            Terminal::with_payload("int", "3"),
            Terminal::from("+"),
            Terminal::with_payload("int", "4"),
            Terminal::from(")"),
        ];
        assert_eq!(parser.parse_with(input, &mut Eval), Ok(14));
    }

    /// 记录语义动作的调用顺序.
    #[derive(Default)]
    struct Trace(Vec<String>);

    impl<'a> Semantics<'a> for Trace {
        type Value = String;

        fn shift(&mut self, term: Terminal<'a>) -> String {
            term.to_string()
        }

        fn reduce(
            &mut self,
            head: NonTerminal<'a>,
            tail: &[Token<'a>],
            children: Vec<String>,
        ) -> String {
            let tail = tail
                .iter()
                .map(|t| t.to_string())
                .collect::<Vec<_>>()
                .join(" ");
            self.0.push(format!("{head} -> {tail}"));
            format!("{head}[{}]", children.join(" "))
        }
    }

    #[test]
    fn reduce_once_per_expansion() {
        let bump = Bump::new();
        let grammar = Grammar::from_cfg(ARITH, &bump).unwrap();
        let table = Table::from_grammar(&grammar).unwrap();
        let parser = Parser::new(&grammar, &table);
        let mut trace = Trace::default();
        let tree = parser.parse_with(terms("int + int $"), &mut trace).unwrap();
        assert_eq!(tree, "E[T[int Y[]] X[+ E[T[int Y[]] X[]]]]");
        assert_eq!(
            trace.0,
            vec![
                "Y -> ε",
                "T -> int Y",
                "Y -> ε",
                "T -> int Y",
                "X -> ε",
                "E -> T X",
                "X -> + E",
                "E -> T X",
            ]
        );
    }
}
