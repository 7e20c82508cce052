// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Script-facing value representation
//!
//! Setters such as `innerHTML` and the console accept loosely typed values the
//! way a script would hand them over. Coercion to text follows JavaScript rules.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Dynamically typed value handed to the runtime by application code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub enum ScriptValue {
    /// Undefined value
    #[default]
    Undefined,
    /// Null value
    Null,
    /// Boolean value
    Boolean(bool),
    /// Number value (JavaScript only has f64)
    Number(f64),
    /// String value
    String(String),
    /// Array value
    Array(Vec<ScriptValue>),
    /// Object together with the result of its own string conversion
    Object(String),
    /// Object without any string conversion
    Opaque,
}

impl ScriptValue {
    /// Check if value is truthy
    pub fn is_truthy(&self) -> bool {
        match self {
            ScriptValue::Undefined | ScriptValue::Null => false,
            ScriptValue::Boolean(b) => *b,
            ScriptValue::Number(n) => *n != 0.0 && !n.is_nan(),
            ScriptValue::String(s) => !s.is_empty(),
            ScriptValue::Array(_) | ScriptValue::Object(_) | ScriptValue::Opaque => true,
        }
    }

    /// Check if null or undefined
    pub fn is_nullish(&self) -> bool {
        matches!(self, ScriptValue::Undefined | ScriptValue::Null)
    }

    /// Get as string
    pub fn as_string(&self) -> Option<&str> {
        match self {
            ScriptValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Call the value's `toString`
    ///
    /// Fails with a usage error (the TypeError equivalent) for values that have
    /// no string conversion: `undefined`, `null` and opaque objects.
    pub fn coerce_to_string(&self) -> Result<String> {
        match self {
            ScriptValue::Undefined => Err(Error::usage("cannot convert undefined to a string")),
            ScriptValue::Null => Err(Error::usage("cannot convert null to a string")),
            ScriptValue::Opaque => Err(Error::usage("value has no toString conversion")),
            ScriptValue::Array(items) => {
                let parts = items
                    .iter()
                    .map(|item| match item {
                        ScriptValue::Undefined | ScriptValue::Null => Ok(String::new()),
                        other => other.coerce_to_string(),
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(parts.join(","))
            }
            other => Ok(other.to_display_string()),
        }
    }

    /// Convert to string the way `String(value)` does; never fails
    pub fn to_display_string(&self) -> String {
        match self {
            ScriptValue::Undefined => "undefined".to_string(),
            ScriptValue::Null => "null".to_string(),
            ScriptValue::Boolean(b) => b.to_string(),
            ScriptValue::Number(n) => format_number(*n),
            ScriptValue::String(s) => s.clone(),
            ScriptValue::Array(items) => items
                .iter()
                .map(|v| match v {
                    ScriptValue::Undefined | ScriptValue::Null => String::new(),
                    other => other.to_display_string(),
                })
                .collect::<Vec<_>>()
                .join(","),
            ScriptValue::Object(s) => s.clone(),
            ScriptValue::Opaque => "[object Object]".to_string(),
        }
    }
}

fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        }
    } else if n == 0.0 {
        // -0 prints as 0
        "0".to_string()
    } else {
        n.to_string()
    }
}

impl From<bool> for ScriptValue {
    fn from(b: bool) -> Self {
        ScriptValue::Boolean(b)
    }
}

impl From<f64> for ScriptValue {
    fn from(n: f64) -> Self {
        ScriptValue::Number(n)
    }
}

impl From<i32> for ScriptValue {
    fn from(n: i32) -> Self {
        ScriptValue::Number(n as f64)
    }
}

impl From<String> for ScriptValue {
    fn from(s: String) -> Self {
        ScriptValue::String(s)
    }
}

impl From<&str> for ScriptValue {
    fn from(s: &str) -> Self {
        ScriptValue::String(s.to_string())
    }
}

impl From<Vec<ScriptValue>> for ScriptValue {
    fn from(items: Vec<ScriptValue>) -> Self {
        ScriptValue::Array(items)
    }
}

impl<T: Into<ScriptValue>> From<Option<T>> for ScriptValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(ScriptValue::Null)
    }
}

impl std::fmt::Display for ScriptValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_display_string())
    }
}
