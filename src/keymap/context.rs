//! Context predicates for conditional keybindings
//!
//! Enables bindings that only activate under certain conditions, such as
//! "Ctrl+W closes the document only when a document is active".

use std::fmt;
use std::str::FromStr;

use crate::model::ContextData;

/// Conditions that can be attached to keybindings
///
/// Multiple conditions on a binding are ANDed together.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Condition {
    /// Binding only active when the context has this key
    Has(String),
    /// Binding only active when the context lacks this key
    Missing(String),
}

impl Condition {
    pub fn has(key: impl Into<String>) -> Self {
        Condition::Has(key.into())
    }

    pub fn missing(key: impl Into<String>) -> Self {
        Condition::Missing(key.into())
    }

    /// Evaluate this condition against the current context
    pub fn evaluate(&self, ctx: &ContextData) -> bool {
        match self {
            Condition::Has(key) => ctx.contains_key(key),
            Condition::Missing(key) => !ctx.contains_key(key),
        }
    }

    /// Evaluate all conditions (AND logic)
    pub fn evaluate_all(conditions: &[Condition], ctx: &ContextData) -> bool {
        conditions.iter().all(|c| c.evaluate(ctx))
    }
}

/// Parses `key` or `!key`
impl FromStr for Condition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (negated, key) = match s.strip_prefix('!') {
            Some(rest) => (true, rest.trim()),
            None => (false, s),
        };

        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.');
        if !valid {
            return Err(s.to_string());
        }

        Ok(if negated {
            Condition::missing(key)
        } else {
            Condition::has(key)
        })
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Has(key) => write!(f, "{}", key),
            Condition::Missing(key) => write!(f, "!{}", key),
        }
    }
}
