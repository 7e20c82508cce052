// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Runtime configuration

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::gateway::Op;

/// Which API surface the host has agreed to serve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Surface {
    /// Every operation, including propagation
    #[default]
    Full,
    /// No outerHTML, id, parentNode, querySelector, cookie access or propagation
    Minimal,
}

impl Surface {
    /// Check whether an operation is part of this surface
    pub fn allows(&self, op: Op) -> bool {
        match self {
            Surface::Full => true,
            Surface::Minimal => !op.is_full_surface_only(),
        }
    }
}

impl fmt::Display for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Surface::Full => f.write_str("full"),
            Surface::Minimal => f.write_str("minimal"),
        }
    }
}

impl FromStr for Surface {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "full" => Ok(Surface::Full),
            "minimal" => Ok(Surface::Minimal),
            other => Err(Error::Config(format!("unknown surface '{}'", other))),
        }
    }
}

/// Runtime context configuration
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Negotiated API surface
    pub surface: Surface,
    /// Bubble events to ancestors after local listeners run
    pub bubbling: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            surface: Surface::Full,
            bubbling: true,
        }
    }
}

impl RuntimeConfig {
    /// Create a new runtime config
    pub fn new() -> Self {
        Self::default()
    }

    /// Config for hosts serving only the minimal surface
    pub fn minimal() -> Self {
        Self {
            surface: Surface::Minimal,
            bubbling: false,
        }
    }

    /// Set the surface
    pub fn surface(mut self, surface: Surface) -> Self {
        self.surface = surface;
        self
    }

    /// Enable/disable bubbling
    pub fn bubbling(mut self, enabled: bool) -> Self {
        self.bubbling = enabled;
        self
    }

    /// Whether dispatch walks up to ancestors
    pub fn propagates(&self) -> bool {
        self.bubbling && self.surface == Surface::Full
    }
}
