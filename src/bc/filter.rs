//! OData `$filter` expression builder.
//!
//! Clauses are joined with `and`; a disjunction group is parenthesized
//! before joining. String literals are single-quoted without escaping,
//! matching what the BC pages accept (values containing a quote are not
//! supported by the remote surface either).

use std::fmt;

/// A composable `$filter` expression.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    clauses: Vec<String>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a string equality clause (`field eq 'value'`).
    pub fn eq(mut self, field: &str, value: &str) -> Self {
        self.clauses.push(format!("{} eq '{}'", field, value));
        self
    }

    /// Adds a numeric/unquoted equality clause.
    pub fn eq_raw(mut self, field: &str, value: impl fmt::Display) -> Self {
        self.clauses.push(format!("{} eq {}", field, value));
        self
    }

    /// Adds a parenthesized disjunction of the given group's clauses.
    pub fn any_of(mut self, group: Filter) -> Self {
        if !group.clauses.is_empty() {
            self.clauses.push(format!("({})", group.clauses.join(" or ")));
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Renders the expression, or `None` when no clause was added.
    pub fn to_query(&self) -> Option<String> {
        if self.clauses.is_empty() {
            None
        } else {
            Some(self.clauses.join(" and "))
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_query().unwrap_or_default())
    }
}
