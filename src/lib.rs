// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! # hostdom - Host-delegated DOM runtime
//!
//! A DOM-like scripting surface whose every node operation is a call through a
//! single gateway to a host that owns the real document.
//!
//! ## Features
//!
//! - Node proxies: handles plus one gateway call per property or method
//! - Event dispatch: ordered listeners, bubbling, `preventDefault`/`stopPropagation`
//! - Document facade: `querySelector(All)`, `createElement`, `cookie`
//! - Synchronous `XMLHttpRequest` and a `console` shim
//! - Full or minimal host surface, negotiated per context
//! - Line-delimited JSON wire protocol for out-of-process hosts
//! - Reference host over an html5ever-parsed document
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use hostdom::{DocumentHost, RuntimeContext};
//!
//! # fn main() -> hostdom::Result<()> {
//! let host = Arc::new(DocumentHost::parse(
//!     r#"<form action="/add"><input name="guest"></form>"#,
//! )?);
//! let ctx = RuntimeContext::with_defaults(host.clone());
//!
//! let form = ctx.document().query_selector("form")?.expect("form");
//! form.add_event_listener("submit", |_, event| {
//!     event.prevent_default();
//!     Ok(())
//! });
//!
//! // The host asks whether to perform the default action
//! assert!(!ctx.dispatch(form.handle().clone(), "submit")?);
//! # Ok(())
//! # }
//! ```

pub mod dom;
pub mod error;
pub mod gateway;
pub mod host;
pub mod runtime;

// Re-exports for convenience

// Runtime
pub use runtime::{
    Console, RequestFactory, RuntimeConfig, RuntimeContext, ScriptValue, Surface,
    XmlHttpRequest,
};

// DOM
pub use dom::{Document, Event, Listener, ListenerTable, Node};

// Gateway
pub use gateway::{
    gateway_fn, serve, CallRecord, Gateway, Handle, HostValue, Op, ProcessGateway,
    StreamGateway, TracingGateway,
};

// Host
pub use host::{DocumentHost, Fetcher};
#[cfg(feature = "http")]
pub use host::{HttpFetcher, HttpFetcherConfig};

// Errors
pub use error::{Error, ErrorContext, Result};

/// hostdom version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
