use std::fmt;

use serde::{Deserialize, Serialize};

/// A single cell or record value.
///
/// Serialized untagged so persisted documents read as plain JSON
/// (`null`, `"text"`, `12.5`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    #[default]
    Null,
    Text(String),
    Number(f64),
}

/// Strict equality: a `Text` never equals a `Number`, whatever it spells.
impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b).is_eq(),
            _ => false,
        }
    }
}

impl Eq for Scalar {}

impl Scalar {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Scalar::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Scalar::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Render the value as grid cell text. Absent values become `""`.
    pub fn to_cell_string(&self) -> String {
        match self {
            Scalar::Null => String::new(),
            Scalar::Text(s) => s.clone(),
            Scalar::Number(n) => format_number(*n),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_cell_string())
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Text(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::Text(s)
    }
}

impl From<f64> for Scalar {
    fn from(n: f64) -> Self {
        Scalar::Number(n)
    }
}

// Shortest round-trip form; integral values print without a fraction.
fn format_number(n: f64) -> String {
    if n == 0.0 {
        return "0".to_string();
    }
    n.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_never_equals_number() {
        assert_ne!(Scalar::text("2"), Scalar::Number(2.0));
        assert_eq!(Scalar::text("P001"), Scalar::text("P001"));
        assert_eq!(Scalar::Number(29.99), Scalar::Number(29.99));
        assert_ne!(Scalar::Null, Scalar::text(""));
    }

    #[test]
    fn cell_strings() {
        assert_eq!(Scalar::Null.to_cell_string(), "");
        assert_eq!(Scalar::Number(3.0).to_cell_string(), "3");
        assert_eq!(Scalar::Number(-0.0).to_cell_string(), "0");
        assert_eq!(Scalar::Number(1.5).to_cell_string(), "1.5");
        assert_eq!(Scalar::text("P002").to_cell_string(), "P002");
    }

    #[test]
    fn json_is_untagged() {
        let values = vec![Scalar::Null, Scalar::text("a"), Scalar::Number(4.5)];
        let json = serde_json::to_string(&values).unwrap();
        assert_eq!(json, r#"[null,"a",4.5]"#);

        let back: Vec<Scalar> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, values);
    }
}
