//! Cross-warehouse reference rewriting
//!
//! Object definitions reference foreign warehouses with three-part
//! qualified names (`warehouse.schema.object`), each part independently
//! bracket-delimited or bare. The rewriter normalizes every foreign
//! reference to a canonical fully-bracketed form whose warehouse component
//! is a deployment variable:
//!
//! ```text
//! SELECT * FROM Sales.dbo.Orders
//! -- owner = Inventory, becomes:
//! SELECT * FROM [$(Sales_ref)].[dbo].[Orders]
//! ```
//!
//! The variable is substituted with a concrete warehouse identity at
//! deployment time, so one package can be replayed against different
//! target topologies.

use crate::ident::{bracket, is_ident_char, strip_brackets};
use regex::Regex;
use std::sync::OnceLock;

// One matcher covers all eight bracketed/bare combinations: each part is
// either a bracket-delimited run or a bare identifier.
const PART: &str = r"\[[^\[\]]+\]|[A-Za-z_@#][A-Za-z0-9_@#]*";

static QUALIFIED_NAME: OnceLock<Regex> = OnceLock::new();

fn qualified_name() -> &'static Regex {
    QUALIFIED_NAME.get_or_init(|| {
        Regex::new(&format!(r"({PART})\.({PART})\.({PART})")).expect("valid regex")
    })
}

/// Deployment variable name for a warehouse, e.g. `Sales` -> `Sales_ref`.
///
/// Characters that cannot appear in a variable name (spaces in delimited
/// warehouse names, punctuation) are folded to underscores.
pub fn variable_name(warehouse: &str) -> String {
    let mut name: String = warehouse
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    name.push_str("_ref");
    name
}

/// Result of rewriting one object definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteOutcome {
    /// The definition with foreign references normalized
    pub text: String,

    /// Foreign warehouses discovered textually, deduplicated
    /// case-insensitively, first-seen casing preserved
    pub referenced: Vec<String>,
}

impl RewriteOutcome {
    /// Deployment variable names for every referenced warehouse
    pub fn required_variables(&self) -> Vec<String> {
        self.referenced.iter().map(|w| variable_name(w)).collect()
    }
}

/// Rewrites cross-warehouse references in object definitions owned by one
/// warehouse.
#[derive(Debug, Clone)]
pub struct ReferenceRewriter {
    owner: String,
}

impl ReferenceRewriter {
    /// Create a rewriter for objects owned by `owner`.
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
        }
    }

    /// Rewrite every qualifying reference in `text`.
    ///
    /// A leading component qualifies as a foreign warehouse when it is not
    /// the owner (case-insensitive) and not equal to the second component —
    /// a two-part `schema.object` name inside a longer dotted chain can
    /// otherwise be misread as warehouse-qualified. Rewriting is
    /// idempotent: already-substituted names carry a `$(` marker and are
    /// never matched again.
    pub fn rewrite(&self, text: &str) -> RewriteOutcome {
        let re = qualified_name();
        let mut out = String::with_capacity(text.len());
        let mut referenced: Vec<String> = Vec::new();
        let mut last = 0usize;

        for caps in re.captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            if !standalone(text, whole.start(), whole.end()) {
                continue;
            }
            let (Some(a_raw), Some(b_raw), Some(c_raw)) =
                (caps.get(1), caps.get(2), caps.get(3))
            else {
                continue;
            };
            let a = strip_brackets(a_raw.as_str());
            let b = strip_brackets(b_raw.as_str());
            let c = strip_brackets(c_raw.as_str());
            if !self.is_foreign(a, b) {
                continue;
            }

            out.push_str(&text[last..whole.start()]);
            let canonical = [
                bracket(&format!("$({})", variable_name(a))),
                bracket(b),
                bracket(c),
            ]
            .join(".");
            out.push_str(&canonical);
            last = whole.end();

            if !referenced.iter().any(|w| w.eq_ignore_ascii_case(a)) {
                referenced.push(a.to_string());
            }
        }
        out.push_str(&text[last..]);

        RewriteOutcome {
            text: out,
            referenced,
        }
    }

    fn is_foreign(&self, a: &str, b: &str) -> bool {
        !a.is_empty()
            && !a.contains("$(")
            && !a.eq_ignore_ascii_case(&self.owner)
            && !a.eq_ignore_ascii_case(b)
    }
}

/// Whether the match at `start..end` is a standalone three-part name.
///
/// A match preceded by an identifier character, `.` or `]`, or followed by
/// `.`, is a slice of a longer dotted chain (e.g. a four-part
/// `server.warehouse.schema.object` name) and must be left alone.
fn standalone(text: &str, start: usize, end: usize) -> bool {
    if let Some(prev) = text[..start].chars().next_back() {
        if is_ident_char(prev) || prev == '.' || prev == ']' {
            return false;
        }
    }
    if let Some(next) = text[end..].chars().next() {
        if next == '.' {
            return false;
        }
    }
    true
}

#[cfg(test)]
#[path = "rewriter_test.rs"]
mod tests;
