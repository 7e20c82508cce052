// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Event record passed to listeners

/// Event being dispatched
///
/// One record is shared by every listener along the bubbling path, so flags set
/// at one level are visible at the next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    event_type: String,
    do_default: bool,
    do_propagate: bool,
}

impl Event {
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            do_default: true,
            do_propagate: true,
        }
    }

    /// Event type, e.g. `submit`
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// `preventDefault()`
    pub fn prevent_default(&mut self) {
        self.do_default = false;
    }

    /// `stopPropagation()`; listeners at the current level still run
    pub fn stop_propagation(&mut self) {
        self.do_propagate = false;
    }

    pub fn default_prevented(&self) -> bool {
        !self.do_default
    }

    pub fn propagation_stopped(&self) -> bool {
        !self.do_propagate
    }

    /// Whether the default action should happen
    pub fn do_default(&self) -> bool {
        self.do_default
    }
}
