//! Read-only structural queries over converted graphs.
//!
//! Supports the SPARQL subset the structural battery needs: `PREFIX`,
//! `ASK`, `SELECT` (variables or `*`), triple patterns with `a`, IRIs,
//! prefixed names and literals, `FILTER NOT EXISTS { … }` and
//! `FILTER ([!]CONTAINS(?v, "…"))`.

pub mod eval;
pub mod harness;
pub mod parser;

pub use eval::{execute, QueryResult, Solution};
pub use harness::{default_battery, Expectation, QueryHarness, QueryOutcome, QueryReport, StructuralQuery};
pub use parser::parse_query;
