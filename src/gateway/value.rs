// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Values crossing the gateway: handles and host values

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Opaque identifier for a remote node, minted by the host
///
/// The runtime never interprets a handle; it only passes it back on calls.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Handle {
    /// Integer handle
    Int(i64),
    /// String handle
    Str(String),
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handle::Int(n) => write!(f, "{}", n),
            Handle::Str(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for Handle {
    fn from(n: i64) -> Self {
        Handle::Int(n)
    }
}

impl From<i32> for Handle {
    fn from(n: i32) -> Self {
        Handle::Int(n as i64)
    }
}

impl From<&str> for Handle {
    fn from(s: &str) -> Self {
        Handle::Str(s.to_string())
    }
}

impl From<String> for Handle {
    fn from(s: String) -> Self {
        Handle::Str(s)
    }
}

/// Value carried by a gateway call or reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum HostValue {
    /// Absent value
    #[default]
    Null,
    /// Integer (integer handles)
    Int(i64),
    /// String (text, markup, string handles)
    Str(String),
    /// List (handle lists)
    List(Vec<HostValue>),
}

impl HostValue {
    /// Check if null
    pub fn is_null(&self) -> bool {
        matches!(self, HostValue::Null)
    }

    /// Short description of the value's shape, for protocol errors
    pub fn kind(&self) -> &'static str {
        match self {
            HostValue::Null => "null",
            HostValue::Int(_) => "integer",
            HostValue::Str(_) => "string",
            HostValue::List(_) => "list",
        }
    }

    /// Get as string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            HostValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Interpret as a handle; null means "no node"
    pub fn into_handle(self, op: &str) -> Result<Option<Handle>> {
        match self {
            HostValue::Null => Ok(None),
            HostValue::Int(n) => Ok(Some(Handle::Int(n))),
            HostValue::Str(s) => Ok(Some(Handle::Str(s))),
            other => Err(Error::protocol(op, "handle or null", other.kind())),
        }
    }

    /// Interpret as a handle that must be present
    pub fn into_required_handle(self, op: &str) -> Result<Handle> {
        match self.into_handle(op)? {
            Some(handle) => Ok(handle),
            None => Err(Error::protocol(op, "handle", "null")),
        }
    }

    /// Interpret as an ordered list of handles; null is an empty list
    pub fn into_handles(self, op: &str) -> Result<Vec<Handle>> {
        match self {
            HostValue::Null => Ok(Vec::new()),
            HostValue::List(items) => items
                .into_iter()
                .map(|item| item.into_required_handle(op))
                .collect(),
            other => Err(Error::protocol(op, "list of handles", other.kind())),
        }
    }

    /// Interpret as optional text
    pub fn into_text(self, op: &str) -> Result<Option<String>> {
        match self {
            HostValue::Null => Ok(None),
            HostValue::Str(s) => Ok(Some(s)),
            other => Err(Error::protocol(op, "string or null", other.kind())),
        }
    }

    /// Interpret as text, treating null as the empty string
    pub fn into_string(self, op: &str) -> Result<String> {
        Ok(self.into_text(op)?.unwrap_or_default())
    }
}

impl From<Handle> for HostValue {
    fn from(handle: Handle) -> Self {
        match handle {
            Handle::Int(n) => HostValue::Int(n),
            Handle::Str(s) => HostValue::Str(s),
        }
    }
}

impl From<&Handle> for HostValue {
    fn from(handle: &Handle) -> Self {
        handle.clone().into()
    }
}

impl From<String> for HostValue {
    fn from(s: String) -> Self {
        HostValue::Str(s)
    }
}

impl From<&str> for HostValue {
    fn from(s: &str) -> Self {
        HostValue::Str(s.to_string())
    }
}

impl From<i64> for HostValue {
    fn from(n: i64) -> Self {
        HostValue::Int(n)
    }
}

impl<T: Into<HostValue>> From<Option<T>> for HostValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(HostValue::Null)
    }
}

impl From<Vec<Handle>> for HostValue {
    fn from(handles: Vec<Handle>) -> Self {
        HostValue::List(handles.into_iter().map(HostValue::from).collect())
    }
}

impl fmt::Display for HostValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostValue::Null => write!(f, "null"),
            HostValue::Int(n) => write!(f, "{}", n),
            HostValue::Str(s) => write!(f, "{:?}", s),
            HostValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}
