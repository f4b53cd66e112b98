//! 使用 LL(1) 预测分析对简单的四则运算表达式求值.
//!
//! 文法直接以数据结构的形式给出 (没有左递归, 是 LL(1) 的):
//! ```text
//! E -> T X
//! X -> + E | ε
//! T -> ( E ) | int Y
//! Y -> * T | ε
//! ```
//! 从标准输入读取表达式, 例如 `( 5 * 10 + 15 )`, 数字被切分为携带附加值的 `int` 终结符.
use std::io::{self, Read};

use bumpalo::Bump;
use ll_analysis::{
    EOF, EPSILON, Grammar, NonTerminal, Parser, Semantics, Table, Terminal, Token, prod,
};
use tracing::{debug, info};

/// 每个非终结符的语义值:
/// - `E`, `T`: 表达式的值;
/// - `X`: 需要加到左侧的值, 空产生式为 0;
/// - `Y`: 需要乘到左侧的值, 空产生式为 1.
struct Eval;

impl<'a> Semantics<'a> for Eval {
    type Value = i64;

    fn shift(&mut self, term: Terminal<'a>) -> i64 {
        // 只有 int 携带附加值, 词法分析时已经检查过是数字.
        term.payload()
            .and_then(|p| p.parse().ok())
            .unwrap_or_default()
    }

    fn reduce(&mut self, head: NonTerminal<'a>, tail: &[Token<'a>], children: Vec<i64>) -> i64 {
        let value = match (head.as_str(), children.as_slice()) {
            ("E", [t, x]) => t + x,
            ("X", [_, e]) => *e,
            ("X", []) => 0,
            ("T", [_, e, _]) => *e,
            ("T", [int, y]) => int * y,
            ("Y", [_, t]) => *t,
            ("Y", []) => 1,
            _ => unreachable!("production not in grammar"),
        };
        debug!(
            "{head} -> {} = {value}",
            tail.iter().map(|t| format!("{t} ")).collect::<String>().trim_end()
        );
        value
    }
}

/// 把表达式切分成终结符, 数字变为 `int` 并携带原始文本.
fn tokenize(s: &str) -> Result<Vec<Terminal<'_>>, String> {
    s.split_whitespace()
        .map(|word| match word {
            "(" | ")" | "+" | "*" => Ok(Terminal::from(word)),
            _ if word.parse::<i64>().is_ok() => Ok(Terminal::with_payload("int", word)),
            _ => Err(format!("unknown word: {word}")),
        })
        .chain(std::iter::once(Ok(EOF)))
        .collect()
}

fn main() {
    #[cfg(debug_assertions)]
    {
        use tracing::level_filters::LevelFilter;
        use tracing_subscriber::{
            Layer, fmt, layer::SubscriberExt, registry, util::SubscriberInitExt,
        };

        let layer = fmt::layer()
            .without_time()
            .with_writer(io::stderr)
            .with_filter(LevelFilter::DEBUG);
        registry().with(layer).init();
    }

    let bump = Bump::new();
    let [e, x, t, y] = ["E", "X", "T", "Y"].map(NonTerminal::from);
    let [lp, rp, plus, times, int] = ["(", ")", "+", "*", "int"].map(Terminal::from);
    let grammar = Grammar::new(
        [
            (e, vec![prod![t, x]]),
            (x, vec![prod![plus, e], prod![EPSILON]]),
            (t, vec![prod![lp, e, rp], prod![int, y]]),
            (y, vec![prod![times, t], prod![EPSILON]]),
        ],
        &bump,
    )
    .unwrap();
    let table = Table::from_grammar(&grammar).unwrap();
    println!("{}", table.to_markdown());
    println!();

    let mut inp = String::new();
    io::stdin().read_to_string(&mut inp).unwrap();
    let terms = match tokenize(&inp) {
        Ok(terms) => terms,
        Err(e) => {
            println!("Tokenizing error: {e}");
            return;
        }
    };
    info!("input: {terms:?}");
    match Parser::new(&grammar, &table).parse_with(terms, &mut Eval) {
        Ok(value) => println!("{} = {value}", inp.trim()),
        Err(e) => println!("Parsing error: {e}"),
    }
}
