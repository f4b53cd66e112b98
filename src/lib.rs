pub mod error;
pub mod grammar;
pub(crate) mod macros;
pub mod parser;
pub mod sets;
pub mod table;
pub mod token;

pub use grammar::{Grammar, Production};
pub use parser::{Parser, Recognize, Semantics};
pub use sets::{FirstSets, FollowSets, SymbolSet};
pub use table::{Entry, Table};
pub use token::{EOF, EPSILON, Markers, NonTerminal, Terminal, Token};
