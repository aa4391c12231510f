//! cv-sql - SQL text layer for Caravan
//!
//! This crate provides qualified-name matching over T-SQL-style object
//! definitions and the cross-warehouse reference rewriter that turns
//! foreign warehouse components into deployment variables.

pub mod ident;
pub mod rewriter;

pub use ident::{bracket, is_ident_char, strip_brackets};
pub use rewriter::{variable_name, ReferenceRewriter, RewriteOutcome};
