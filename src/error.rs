use crate::table::Conflict;

#[derive(thiserror::Error, Debug, Eq, PartialEq)]
pub enum Error {
    #[error("Error parsing productions, line: {line}, cause: {cause:?}.")]
    ParseProductionError {
        line: usize,
        cause: ParseProductionError,
    },
    #[error("Grammar contains no rules.")]
    EmptyGrammar,
    #[error("Production of {0} has an empty body, use the epsilon marker instead.")]
    EmptyProduction(String),
    #[error("Grammar does not contain the non-terminal: {0}.")]
    UndefinedNonTerminal(String),
    #[error("Production of {0} contains the end marker, which only the parser may place.")]
    EndMarkerInProduction(String),
    #[error("Epsilon marker and end marker must differ, both are: {0}.")]
    IndistinctMarkers(String),
    #[error("Grammar is not LL(1), conflicting cells: {}.", join_conflicts(.0))]
    GrammarConflict(Vec<Conflict>),
    #[error("Malformed input at {position}: {cause}.")]
    MalformedInput {
        position: usize,
        cause: MalformedInput,
    },
}

#[derive(thiserror::Error, Debug, Eq, PartialEq)]
pub enum ParseProductionError {
    #[error("No arrow in production line")]
    NoArrow,
    #[error("Production head must be a single symbol, found: {0:?}")]
    InvalidHead(String),
}

/// 预测分析过程中遇到的输入错误, 不进行任何恢复.
#[derive(thiserror::Error, Debug, Eq, PartialEq)]
pub enum MalformedInput {
    #[error("expected terminal {expected}, found {found}")]
    UnexpectedTerminal { expected: String, found: String },
    #[error("no table entry for M[{non_terminal}, {lookahead}]")]
    NoEntry {
        non_terminal: String,
        lookahead: String,
    },
    #[error("input continues after the end marker: {found}")]
    TrailingInput { found: String },
    #[error("word is not a terminal of the grammar: {found}")]
    UnknownTerminal { found: String },
}

impl Error {
    pub(crate) fn parse_production_error(line: usize, cause: ParseProductionError) -> Self {
        Self::ParseProductionError { line, cause }
    }

    pub fn malformed_input(position: usize, cause: MalformedInput) -> Self {
        Self::MalformedInput { position, cause }
    }
}

fn join_conflicts(conflicts: &[Conflict]) -> String {
    conflicts
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
