#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::redundant_closure_for_method_calls,
    clippy::module_name_repetitions
)]

pub mod batch;
pub mod cli;
mod errors;
pub mod expr;
pub mod io;
pub mod predicate;
pub mod rule;

pub use batch::{translate_all, BatchConf, BatchReport};
pub use errors::RuleBridgeError;
pub use expr::{parse_infix, read_sexp, Expression};
pub use predicate::translate as translate_predicate;
pub use rule::{assemble, Notation, RewriteRule};

type HashSet<T> = hashbrown::HashSet<T>;
