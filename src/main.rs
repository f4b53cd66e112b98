use std::{
    io::{self, Read},
    process::ExitCode,
};

use bumpalo::Bump;
use clap::Parser as _;
use ll_analysis::{
    FirstSets, FollowSets, Grammar, Parser, SymbolSet, Table, Terminal,
    error::{Error, MalformedInput},
};
use tracing::{error, info, level_filters::LevelFilter};
use tracing_subscriber::{Layer, fmt, layer::SubscriberExt, registry, util::SubscriberInitExt};

/// 从标准输入读取文法 (每行 `head -> a b | c`), 输出 first/follow 集与 LL(1) 分析表.
#[derive(clap::Parser)]
struct AppArgs {
    /// 使用分析表分析的终结符序列, 以空白分隔, `name:payload` 为终结符附加值.
    #[clap(short, long)]
    input: Option<String>,
    /// 输出调试日志.
    #[clap(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = AppArgs::parse();
    let layer = fmt::layer()
        .without_time()
        .with_writer(io::stderr)
        .with_filter(if args.verbose {
            LevelFilter::DEBUG
        } else {
            LevelFilter::WARN
        });
    registry().with(layer).init();

    let mut inp = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut inp) {
        error!("failed to read grammar from stdin: {e}");
        return ExitCode::FAILURE;
    }
    match run(&inp, args.input.as_deref()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cfg: &str, input: Option<&str>) -> Result<(), Error> {
    let bump = Bump::new();
    let grammar = Grammar::from_cfg(cfg, &bump)?;
    for (idx, prod) in grammar.prods().iter().enumerate() {
        println!("{idx:>4} {prod}");
    }
    println!();
    let first = FirstSets::from_grammar(&grammar)?;
    let follow = FollowSets::from_grammar(&grammar, &first)?;
    println!("--- First / Follow ---");
    for &nt in grammar.non_terminals() {
        let fs = first.get(nt).map(show).unwrap_or_default();
        let fo = follow.get(nt).map(show).unwrap_or_default();
        println!("{nt}: first = {{{fs}}}, follow = {{{fo}}}");
    }
    println!();
    println!("--- Table ---");
    let table = Table::build_from(&grammar, &first, &follow)?;
    println!("{}", table.to_markdown());

    if let Some(input) = input {
        let terms = read_input(&grammar, input)?;
        Parser::new(&grammar, &table).parse(terms)?;
        info!("input accepted");
        println!();
        println!("accepted");
    }
    Ok(())
}

/// 把输入的单词映射到文法的终结符上, `name:payload` 为终结符附加值.
/// # Errors
/// - [`Error::MalformedInput`] 单词不是文法中的终结符.
fn read_input<'a>(grammar: &Grammar<'a>, input: &'a str) -> Result<Vec<Terminal<'a>>, Error> {
    input
        .split_whitespace()
        .enumerate()
        .map(|(position, word)| -> Result<Terminal<'a>, Error> {
            let (ident, payload) = match word.split_once(':') {
                Some((ident, payload)) => (ident, Some(payload)),
                None => (word, None),
            };
            let term = grammar.terminal(ident).ok_or_else(|| {
                Error::malformed_input(
                    position,
                    MalformedInput::UnknownTerminal {
                        found: ident.to_string(),
                    },
                )
            })?;
            Ok(match payload {
                Some(payload) => Terminal::with_payload(term.as_str(), payload),
                None => term,
            })
        })
        .collect()
}

fn show(set: &SymbolSet) -> String {
    set.iter()
        .map(|t| t.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
