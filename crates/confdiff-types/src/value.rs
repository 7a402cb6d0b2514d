//! The format-neutral document tree.
//!
//! Every supported format parses into a [`ConfigValue`]. Mapping keys keep
//! their document order so that rendering is stable, but equality between
//! mappings ignores that order.

use std::fmt;

use indexmap::IndexMap;
use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

/// Ordered mapping from keys to child values.
pub type Mapping = IndexMap<String, ConfigValue>;

/// A numeric scalar, integer or floating point depending on its literal.
#[derive(Clone, Copy, Debug)]
pub enum Number {
    Integer(i64),
    Float(f64),
}

impl Number {
    /// The value as `f64`, for cross-representation comparison.
    pub fn as_f64(&self) -> f64 {
        match *self {
            Number::Integer(i) => i as f64,
            Number::Float(f) => f,
        }
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Number::Integer(a), Number::Integer(b)) => a == b,
            _ => self.as_f64() == other.as_f64(),
        }
    }
}

impl fmt::Display for Number {
    /// Floats always keep a fractional part or exponent so that the literal
    /// re-infers as a float.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Integer(i) => write!(f, "{i}"),
            Number::Float(x) => write!(f, "{x:?}"),
        }
    }
}

impl From<i64> for Number {
    fn from(i: i64) -> Self {
        Number::Integer(i)
    }
}

impl From<f64> for Number {
    fn from(f: f64) -> Self {
        Number::Float(f)
    }
}

/// A node in a parsed configuration document.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum ConfigValue {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Mapping(Mapping),
    Sequence(Vec<ConfigValue>),
}

impl ConfigValue {
    /// An empty mapping.
    pub fn mapping() -> Self {
        ConfigValue::Mapping(Mapping::new())
    }

    /// Returns `true` for mappings and sequences.
    pub fn is_composite(&self) -> bool {
        matches!(self, ConfigValue::Mapping(_) | ConfigValue::Sequence(_))
    }

    /// Returns `true` for everything that is not a mapping or sequence.
    pub fn is_scalar(&self) -> bool {
        !self.is_composite()
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            ConfigValue::Mapping(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[ConfigValue]> {
        match self {
            ConfigValue::Sequence(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Literal text of a scalar as it appears when rendered unquoted.
    ///
    /// Returns `None` for mappings and sequences.
    pub fn scalar_text(&self) -> Option<String> {
        match self {
            ConfigValue::Null => Some("null".to_string()),
            ConfigValue::Bool(b) => Some(b.to_string()),
            ConfigValue::Number(n) => Some(n.to_string()),
            ConfigValue::String(s) => Some(s.clone()),
            ConfigValue::Mapping(_) | ConfigValue::Sequence(_) => None,
        }
    }
}

impl From<bool> for ConfigValue {
    fn from(b: bool) -> Self {
        ConfigValue::Bool(b)
    }
}

impl From<i64> for ConfigValue {
    fn from(i: i64) -> Self {
        ConfigValue::Number(Number::Integer(i))
    }
}

impl From<f64> for ConfigValue {
    fn from(f: f64) -> Self {
        ConfigValue::Number(Number::Float(f))
    }
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self {
        ConfigValue::String(s.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(s: String) -> Self {
        ConfigValue::String(s)
    }
}

impl From<Mapping> for ConfigValue {
    fn from(m: Mapping) -> Self {
        ConfigValue::Mapping(m)
    }
}

impl From<Vec<ConfigValue>> for ConfigValue {
    fn from(s: Vec<ConfigValue>) -> Self {
        ConfigValue::Sequence(s)
    }
}

impl fmt::Display for ConfigValue {
    /// Scalars print their literal; composites print compact JSON.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.scalar_text() {
            Some(text) => f.write_str(&text),
            None => {
                let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
                f.write_str(&json)
            }
        }
    }
}

impl Serialize for ConfigValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ConfigValue::Null => serializer.serialize_unit(),
            ConfigValue::Bool(b) => serializer.serialize_bool(*b),
            ConfigValue::Number(Number::Integer(i)) => serializer.serialize_i64(*i),
            ConfigValue::Number(Number::Float(f)) => serializer.serialize_f64(*f),
            ConfigValue::String(s) => serializer.serialize_str(s),
            ConfigValue::Mapping(m) => {
                let mut map = serializer.serialize_map(Some(m.len()))?;
                for (k, v) in m {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
            ConfigValue::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
        }
    }
}

struct ConfigValueVisitor;

impl<'de> Visitor<'de> for ConfigValueVisitor {
    type Value = ConfigValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any configuration value")
    }

    fn visit_unit<E: de::Error>(self) -> Result<ConfigValue, E> {
        Ok(ConfigValue::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<ConfigValue, E> {
        Ok(ConfigValue::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<ConfigValue, D::Error> {
        Deserialize::deserialize(deserializer)
    }

    fn visit_bool<E: de::Error>(self, b: bool) -> Result<ConfigValue, E> {
        Ok(ConfigValue::Bool(b))
    }

    fn visit_i64<E: de::Error>(self, i: i64) -> Result<ConfigValue, E> {
        Ok(ConfigValue::Number(Number::Integer(i)))
    }

    fn visit_u64<E: de::Error>(self, u: u64) -> Result<ConfigValue, E> {
        Ok(match i64::try_from(u) {
            Ok(i) => ConfigValue::Number(Number::Integer(i)),
            Err(_) => ConfigValue::Number(Number::Float(u as f64)),
        })
    }

    fn visit_f64<E: de::Error>(self, f: f64) -> Result<ConfigValue, E> {
        Ok(ConfigValue::Number(Number::Float(f)))
    }

    fn visit_str<E: de::Error>(self, s: &str) -> Result<ConfigValue, E> {
        Ok(ConfigValue::String(s.to_string()))
    }

    fn visit_string<E: de::Error>(self, s: String) -> Result<ConfigValue, E> {
        Ok(ConfigValue::String(s))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut access: A) -> Result<ConfigValue, A::Error> {
        let mut items = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some(item) = access.next_element()? {
            items.push(item);
        }
        Ok(ConfigValue::Sequence(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<ConfigValue, A::Error> {
        let mut map = Mapping::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((key, value)) = access.next_entry::<String, ConfigValue>()? {
            map.insert(key, value);
        }
        Ok(ConfigValue::Mapping(map))
    }
}

impl<'de> Deserialize<'de> for ConfigValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ConfigValueVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_json(s: &str) -> ConfigValue {
        serde_json::from_str(s).unwrap()
    }

    #[test]
    fn mapping_equality_ignores_order() {
        let a = from_json(r#"{"x": 1, "y": 2}"#);
        let b = from_json(r#"{"y": 2, "x": 1}"#);
        assert_eq!(a, b);
    }

    #[test]
    fn mapping_preserves_document_order() {
        let v = from_json(r#"{"zeta": 1, "alpha": 2, "mid": 3}"#);
        let keys: Vec<_> = v.as_mapping().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn sequence_equality_respects_order() {
        assert_ne!(from_json("[1, 2]"), from_json("[2, 1]"));
    }

    #[test]
    fn integer_and_float_literals_are_distinguished() {
        assert!(matches!(from_json("5"), ConfigValue::Number(Number::Integer(5))));
        assert!(matches!(from_json("5.5"), ConfigValue::Number(Number::Float(_))));
        assert!(matches!(from_json("5.0"), ConfigValue::Number(Number::Float(_))));
    }

    #[test]
    fn integer_equals_integral_float() {
        assert_eq!(ConfigValue::from(3i64), ConfigValue::from(3.0f64));
        assert_ne!(ConfigValue::from(3i64), ConfigValue::from(3.5f64));
    }

    #[test]
    fn float_display_keeps_fraction() {
        assert_eq!(Number::Float(2.0).to_string(), "2.0");
        assert_eq!(Number::Float(0.25).to_string(), "0.25");
        assert_eq!(Number::Integer(-7).to_string(), "-7");
    }

    #[test]
    fn scalar_text_for_each_variant() {
        assert_eq!(ConfigValue::Null.scalar_text().as_deref(), Some("null"));
        assert_eq!(ConfigValue::from(true).scalar_text().as_deref(), Some("true"));
        assert_eq!(ConfigValue::from("abc").scalar_text().as_deref(), Some("abc"));
        assert!(ConfigValue::mapping().scalar_text().is_none());
        assert!(ConfigValue::Sequence(vec![]).scalar_text().is_none());
    }

    #[test]
    fn huge_unsigned_becomes_float() {
        let v = from_json("18446744073709551615");
        assert!(matches!(v, ConfigValue::Number(Number::Float(_))));
    }

    #[test]
    fn serialize_matches_plain_json() {
        let v = from_json(r#"{"a": [1, 2.5, "x", null, true], "b": {}}"#);
        let out = serde_json::to_string(&v).unwrap();
        assert_eq!(out, r#"{"a":[1,2.5,"x",null,true],"b":{}}"#);
    }

    #[test]
    fn composite_display_is_compact_json() {
        let v = from_json(r#"{"k": [1, 2]}"#);
        assert_eq!(v.to_string(), r#"{"k":[1,2]}"#);
    }
}
