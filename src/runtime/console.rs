// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Console shim forwarding to the host's `log` operation

use std::sync::Arc;

use super::value::ScriptValue;
use super::Bridge;
use crate::error::Result;
use crate::gateway::{HostValue, Op};

/// `console` object; every logged value becomes one `log` call
#[derive(Clone)]
pub struct Console {
    bridge: Arc<Bridge>,
}

impl Console {
    pub(crate) fn new(bridge: Arc<Bridge>) -> Self {
        Self { bridge }
    }

    /// `console.log(...args)`
    pub fn log(&self, args: &[ScriptValue]) -> Result<()> {
        for arg in args {
            self.bridge
                .call(Op::Log, &[HostValue::Str(arg.to_display_string())])?;
        }
        Ok(())
    }

    /// Log a single string
    pub fn log_str(&self, message: &str) -> Result<()> {
        self.bridge.call(Op::Log, &[HostValue::from(message)])?;
        Ok(())
    }
}

impl std::fmt::Debug for Console {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Console").finish_non_exhaustive()
    }
}
