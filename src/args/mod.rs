//! CLI argument types and parsing helpers.
mod cli;
pub(crate) mod parsers;
mod types;


pub use cli::{Command, FieldsArgs, InitArgs, TesterArgs};
pub use types::{OutputFormat, PositiveUsize};

pub(crate) use parsers::{parse_duration_arg, parse_header};
