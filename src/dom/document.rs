// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! `document` facade

use std::sync::Arc;

use super::node::Node;
use crate::error::Result;
use crate::gateway::{Handle, HostValue, Op};
use crate::runtime::Bridge;

/// Document-level entry points
#[derive(Clone)]
pub struct Document {
    bridge: Arc<Bridge>,
}

impl Document {
    pub(crate) fn new(bridge: Arc<Bridge>) -> Self {
        Self { bridge }
    }

    /// Wrap a handle obtained out of band
    pub fn node(&self, handle: impl Into<Handle>) -> Node {
        Node::new(handle.into(), self.bridge.clone())
    }

    /// First element matching `selector`
    pub fn query_selector(&self, selector: &str) -> Result<Option<Node>> {
        let handle = self
            .bridge
            .call(Op::QuerySelector, &[HostValue::from(selector)])?
            .into_handle(Op::QuerySelector.as_str())?;
        Ok(handle.map(|h| self.node(h)))
    }

    /// All elements matching `selector`, in document order
    pub fn query_selector_all(&self, selector: &str) -> Result<Vec<Node>> {
        let handles = self
            .bridge
            .call(Op::QuerySelectorAll, &[HostValue::from(selector)])?
            .into_handles(Op::QuerySelectorAll.as_str())?;
        Ok(handles.into_iter().map(|h| self.node(h)).collect())
    }

    /// `createElement(tag)`; the host decides whether the tag is valid
    pub fn create_element(&self, tag: &str) -> Result<Node> {
        let handle = self
            .bridge
            .call(Op::CreateElement, &[HostValue::from(tag)])?
            .into_required_handle(Op::CreateElement.as_str())?;
        Ok(self.node(handle))
    }

    /// `document.cookie`
    pub fn cookie(&self) -> Result<String> {
        self.bridge
            .call(Op::CookieGet, &[])?
            .into_string(Op::CookieGet.as_str())
    }

    /// `document.cookie = value`
    pub fn set_cookie(&self, value: &str) -> Result<()> {
        self.bridge.call(Op::CookieSet, &[HostValue::from(value)])?;
        Ok(())
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document").finish_non_exhaustive()
    }
}
