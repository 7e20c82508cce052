// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Node proxy
//!
//! A `Node` is a handle plus the context it belongs to. Every accessor is one
//! gateway call; nothing is cached on the proxy.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use tracing::trace;

use super::event::Event;
use crate::error::Result;
use crate::gateway::{Handle, HostValue, Op};
use crate::runtime::{Bridge, ScriptValue};

/// Proxy for a node living in the host
#[derive(Clone)]
pub struct Node {
    handle: Handle,
    bridge: Arc<Bridge>,
}

impl Node {
    pub(crate) fn new(handle: Handle, bridge: Arc<Bridge>) -> Self {
        Self { handle, bridge }
    }

    pub(crate) fn wrap(&self, handle: Handle) -> Node {
        Node::new(handle, self.bridge.clone())
    }

    /// Host handle of this node
    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    fn call(&self, op: Op, extra: &[HostValue]) -> Result<HostValue> {
        let mut args = Vec::with_capacity(extra.len() + 1);
        args.push(HostValue::from(&self.handle));
        args.extend_from_slice(extra);
        self.bridge.call(op, &args)
    }

    /// `getAttribute(name)`; `None` if the attribute is absent
    pub fn get_attribute(&self, name: &str) -> Result<Option<String>> {
        self.call(Op::GetAttribute, &[HostValue::from(name)])?
            .into_text(Op::GetAttribute.as_str())
    }

    /// `innerHTML`
    pub fn inner_html(&self) -> Result<String> {
        self.call(Op::InnerHtmlGet, &[])?
            .into_string(Op::InnerHtmlGet.as_str())
    }

    /// `innerHTML = value`
    ///
    /// The value goes through its string conversion first; values without one
    /// fail locally.
    pub fn set_inner_html(&self, value: impl Into<ScriptValue>) -> Result<()> {
        let markup = value.into().coerce_to_string()?;
        self.call(Op::InnerHtmlSet, &[HostValue::from(markup)])?;
        Ok(())
    }

    /// `outerHTML`
    pub fn outer_html(&self) -> Result<String> {
        self.call(Op::OuterHtmlGet, &[])?
            .into_string(Op::OuterHtmlGet.as_str())
    }

    /// `outerHTML = value`
    pub fn set_outer_html(&self, value: impl Into<ScriptValue>) -> Result<()> {
        let markup = value.into().coerce_to_string()?;
        self.call(Op::OuterHtmlSet, &[HostValue::from(markup)])?;
        Ok(())
    }

    /// `id`
    pub fn id(&self) -> Result<String> {
        self.call(Op::IdGet, &[])?.into_string(Op::IdGet.as_str())
    }

    /// `id = value`
    pub fn set_id(&self, id: &str) -> Result<()> {
        self.call(Op::IdSet, &[HostValue::from(id)])?;
        Ok(())
    }

    /// `children` in host order
    pub fn children(&self) -> Result<Vec<Node>> {
        let handles = self
            .call(Op::ChildrenGet, &[])?
            .into_handles(Op::ChildrenGet.as_str())?;
        Ok(handles.into_iter().map(|h| self.wrap(h)).collect())
    }

    /// `parentNode`; `None` for the root and for detached nodes
    pub fn parent_node(&self) -> Result<Option<Node>> {
        let parent = self
            .call(Op::ParentNodeGet, &[])?
            .into_handle(Op::ParentNodeGet.as_str())?;
        Ok(parent.map(|h| self.wrap(h)))
    }

    /// `appendChild(child)`
    pub fn append_child(&self, child: &Node) -> Result<()> {
        self.call(Op::AppendChild, &[HostValue::from(&child.handle)])?;
        Ok(())
    }

    /// `insertBefore(elt)`: put `elt` right before this node in its parent
    pub fn insert_before(&self, elt: &Node) -> Result<()> {
        self.call(Op::InsertBefore, &[HostValue::from(&elt.handle)])?;
        Ok(())
    }

    /// `removeChild(child)`; `None` if `child` is not a child of this node
    pub fn remove_child(&self, child: &Node) -> Result<Option<Node>> {
        let removed = self
            .call(Op::RemoveChild, &[HostValue::from(&child.handle)])?
            .into_handle(Op::RemoveChild.as_str())?;
        Ok(removed.map(|h| self.wrap(h)))
    }

    /// Host-defined string form (`toString()`)
    pub fn to_host_string(&self) -> Result<String> {
        self.call(Op::ToString, &[])?.into_string(Op::ToString.as_str())
    }

    /// `addEventListener(type, callback)`
    ///
    /// Registering the same callback twice makes it run twice.
    pub fn add_event_listener<F>(&self, event_type: &str, listener: F)
    where
        F: Fn(&Node, &mut Event) -> Result<()> + Send + Sync + 'static,
    {
        self.bridge
            .listeners
            .add(&self.handle, event_type, Arc::new(listener));
    }

    /// `dispatchEvent(event)`; returns whether the default action should run
    ///
    /// Listeners on this node run first, in registration order, over a snapshot
    /// of the list. Unless propagation is stopped, disabled or the node has no
    /// parent, the same event then continues on the parent.
    pub fn dispatch_event(&self, event: &mut Event) -> Result<bool> {
        let propagates = self.bridge.config.propagates();
        let mut current = self.clone();

        loop {
            let listeners = self
                .bridge
                .listeners
                .snapshot(&current.handle, event.event_type());

            for listener in &listeners {
                trace!(node = %current.handle, event = event.event_type(), "invoking listener");
                (**listener)(&current, event)?;
            }

            if !propagates || event.propagation_stopped() {
                break;
            }
            match current.parent_node()? {
                Some(parent) => current = parent,
                None => break,
            }
        }

        Ok(event.do_default())
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.handle == other.handle
    }
}

impl Eq for Node {}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.handle.hash(state);
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node").field("handle", &self.handle).finish()
    }
}
