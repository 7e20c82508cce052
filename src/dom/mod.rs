// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Script-side DOM over the remote call gateway
//!
//! Node proxies, the document facade, the listener table and event dispatch.
//! Everything here forwards to the host; the only local state is the listener
//! table.

mod document;
mod event;
mod listeners;
mod node;

pub use document::Document;
pub use event::Event;
pub use listeners::{Listener, ListenerTable};
pub use node::Node;
