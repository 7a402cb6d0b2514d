//! Equality policies applied when two values sit at the same path.

use confdiff_types::ConfigValue;

/// How values are compared.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EqualityPolicy {
    /// Exact structural equality.
    Strict,
    /// Strings are trimmed and lower-cased first; everything else is exact.
    Lenient,
}

impl EqualityPolicy {
    pub fn from_strict(strict: bool) -> Self {
        if strict {
            EqualityPolicy::Strict
        } else {
            EqualityPolicy::Lenient
        }
    }

    /// Compare two scalars. Composite values are never equal here.
    pub fn scalars_equal(&self, a: &ConfigValue, b: &ConfigValue) -> bool {
        match (self, a, b) {
            (_, ConfigValue::Mapping(_) | ConfigValue::Sequence(_), _)
            | (_, _, ConfigValue::Mapping(_) | ConfigValue::Sequence(_)) => false,
            (EqualityPolicy::Lenient, ConfigValue::String(x), ConfigValue::String(y)) => {
                normalize(x) == normalize(y)
            }
            _ => a == b,
        }
    }
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}
