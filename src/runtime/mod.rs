// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Runtime context
//!
//! A `RuntimeContext` owns the gateway, the listener table and the configuration,
//! and hands out the console, document facade and request factory built on them.
//! Contexts are isolated: two contexts in one process never share listeners.

mod config;
mod console;
mod value;
mod xhr;

use std::sync::Arc;

use tracing::{debug, trace};

use crate::dom::{Document, Event, ListenerTable, Node};
use crate::error::{Error, Result};
use crate::gateway::{Gateway, Handle, HostValue, Op};

pub use config::{RuntimeConfig, Surface};
pub use console::Console;
pub use value::ScriptValue;
pub use xhr::{RequestFactory, RequestState, XmlHttpRequest};

/// State shared by every object created within one context
pub(crate) struct Bridge {
    gateway: Arc<dyn Gateway>,
    pub(crate) listeners: ListenerTable,
    pub(crate) config: RuntimeConfig,
}

impl Bridge {
    /// Issue a gateway call, refusing operations outside the negotiated surface
    pub(crate) fn call(&self, op: Op, args: &[HostValue]) -> Result<HostValue> {
        if !self.config.surface.allows(op) {
            return Err(Error::usage(format!(
                "{} is not available on the {} surface",
                op, self.config.surface
            )));
        }
        trace!(op = %op, argc = args.len(), "gateway call");
        self.gateway.call(op, args)
    }
}

/// Entry point holding the console, document and request factory
#[derive(Clone)]
pub struct RuntimeContext {
    bridge: Arc<Bridge>,
    console: Console,
    document: Document,
    requests: RequestFactory,
}

impl RuntimeContext {
    /// Create a context over a gateway
    pub fn new<G: Gateway + 'static>(gateway: G, config: RuntimeConfig) -> Self {
        Self::from_shared(Arc::new(gateway), config)
    }

    /// Create a context with the default (full surface) configuration
    pub fn with_defaults<G: Gateway + 'static>(gateway: G) -> Self {
        Self::new(gateway, RuntimeConfig::default())
    }

    /// Create a context over an already shared gateway
    pub fn from_shared(gateway: Arc<dyn Gateway>, config: RuntimeConfig) -> Self {
        debug!(surface = %config.surface, bubbling = config.bubbling, "creating runtime context");

        let bridge = Arc::new(Bridge {
            gateway,
            listeners: ListenerTable::new(),
            config,
        });

        Self {
            console: Console::new(bridge.clone()),
            document: Document::new(bridge.clone()),
            requests: RequestFactory::new(bridge.clone()),
            bridge,
        }
    }

    /// The `console` object
    pub fn console(&self) -> &Console {
        &self.console
    }

    /// The `document` object
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Factory for request objects
    pub fn requests(&self) -> &RequestFactory {
        &self.requests
    }

    /// Shorthand for `requests().create()`
    pub fn xml_http_request(&self) -> XmlHttpRequest {
        self.requests.create()
    }

    /// Listener table of this context
    pub fn listeners(&self) -> &ListenerTable {
        &self.bridge.listeners
    }

    /// Configuration of this context
    pub fn config(&self) -> &RuntimeConfig {
        &self.bridge.config
    }

    /// Dispatch a fresh event of `event_type` on the node behind `handle`
    ///
    /// Entry point for the host when a user action happens on a node. Returns
    /// whether the default action should still be performed.
    pub fn dispatch(&self, handle: impl Into<Handle>, event_type: &str) -> Result<bool> {
        let node = self.document.node(handle);
        let mut event = Event::new(event_type);
        node.dispatch_event(&mut event)
    }

    /// Wrap a handle in a node proxy
    pub fn node(&self, handle: impl Into<Handle>) -> Node {
        self.document.node(handle)
    }
}

impl std::fmt::Debug for RuntimeContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuntimeContext")
            .field("config", &self.bridge.config)
            .field("listeners", &self.bridge.listeners)
            .finish_non_exhaustive()
    }
}
