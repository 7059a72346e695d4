// Generic `Key: value` reply parser with an explicit field schema
use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

use super::{ValidationError, ValidationFailure};

/// The controller reports the head position as one compact line,
/// `X: 220 Y: 220 Z: 220`, instead of one key per line.
const COORDINATES_PATTERN: &str =
    r"X:\s*([-+]?[0-9]*\.?[0-9]+)\s*Y:\s*([-+]?[0-9]*\.?[0-9]+)\s*Z:\s*([-+]?[0-9]*\.?[0-9]+)";

fn coordinates_regex() -> &'static Regex {
    static COORDINATES_REGEX: OnceLock<Regex> = OnceLock::new();
    COORDINATES_REGEX.get_or_init(|| Regex::new(COORDINATES_PATTERN).expect("invalid regex pattern"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coercion {
    Text,
    Number,
}

/// One schema entry: a field name, how to coerce it and whether it must be present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub coercion: Coercion,
    pub required: bool,
}

impl FieldSpec {
    pub const fn text(name: &'static str) -> Self {
        Self {
            name,
            coercion: Coercion::Text,
            required: true,
        }
    }

    pub const fn number(name: &'static str) -> Self {
        Self {
            name,
            coercion: Coercion::Number,
            required: true,
        }
    }

    pub const fn optional(self) -> Self {
        Self {
            required: false,
            ..self
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
}

/// Schema-checked fields of one reply.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidatedFields {
    values: HashMap<&'static str, FieldValue>,
}

impl ValidatedFields {
    pub fn text(&self, name: &str) -> Option<&str> {
        match self.values.get(name) {
            Some(FieldValue::Text(text)) => Some(text),
            _ => None,
        }
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        match self.values.get(name) {
            Some(FieldValue::Number(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn require_text(&self, name: &str) -> Result<&str, ValidationError> {
        self.text(name)
            .ok_or_else(|| ValidationError::new(name, ValidationFailure::Missing))
    }

    pub fn require_number(&self, name: &str) -> Result<f64, ValidationError> {
        self.number(name)
            .ok_or_else(|| ValidationError::new(name, ValidationFailure::Missing))
    }
}

/// Splits a payload into key/value pairs.
///
/// Each line is split on its first colon with both sides trimmed, so values
/// such as MAC addresses keep their own colons. A repeated key keeps its last
/// value. Lines without a colon or with an empty key are skipped.
pub fn split_pairs(payload: &str) -> HashMap<String, String> {
    let mut pairs = HashMap::new();
    for line in payload.split('\n') {
        if line.contains("X:") && line.contains("Y:") && line.contains("Z:") {
            // Unmatched coordinate lines are dropped, not split.
            if let Some(captures) = coordinates_regex().captures(line) {
                for (index, axis) in ["X", "Y", "Z"].into_iter().enumerate() {
                    pairs.insert(axis.to_string(), captures[index + 1].to_string());
                }
            }
            continue;
        }
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        pairs.insert(key.to_string(), value.trim().to_string());
    }
    pairs
}

/// Checks `pairs` against `schema` in order, stopping at the first failure.
pub fn validate(
    pairs: &HashMap<String, String>,
    schema: &[FieldSpec],
) -> Result<ValidatedFields, ValidationError> {
    let mut fields = ValidatedFields::default();
    for spec in schema {
        let Some(raw) = pairs.get(spec.name) else {
            if spec.required {
                return Err(ValidationError::new(spec.name, ValidationFailure::Missing));
            }
            continue;
        };
        let value = match spec.coercion {
            Coercion::Text => FieldValue::Text(raw.clone()),
            Coercion::Number => FieldValue::Number(coerce_number(spec.name, raw)?),
        };
        fields.values.insert(spec.name, value);
    }
    Ok(fields)
}

pub fn parse(payload: &str, schema: &[FieldSpec]) -> Result<ValidatedFields, ValidationError> {
    validate(&split_pairs(payload), schema)
}

fn coerce_number(field: &str, raw: &str) -> Result<f64, ValidationError> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| ValidationError::new(field, ValidationFailure::NotNumeric(raw.to_string())))?;
    if !value.is_finite() {
        return Err(ValidationError::new(field, ValidationFailure::NotFinite(raw.to_string())));
    }
    Ok(value)
}
