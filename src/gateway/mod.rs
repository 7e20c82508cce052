// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Remote call gateway
//!
//! The gateway is the only boundary-crossing primitive: a single synchronous
//! `call(op, args)` that returns a host value or fails. Every node, document,
//! console and request operation in the runtime is expressed in terms of it.

mod stream;
mod traced;
mod value;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub use stream::{serve, ProcessGateway, StreamGateway, WireReply, WireRequest};
pub use traced::{CallRecord, TracingGateway};
pub use value::{Handle, HostValue};

/// The fixed vocabulary of host operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Op {
    #[serde(rename = "log")]
    Log,
    #[serde(rename = "getAttribute")]
    GetAttribute,
    #[serde(rename = "toString")]
    ToString,
    #[serde(rename = "appendChild")]
    AppendChild,
    #[serde(rename = "insertBefore")]
    InsertBefore,
    #[serde(rename = "removeChild")]
    RemoveChild,
    #[serde(rename = "innerHTML_get")]
    InnerHtmlGet,
    #[serde(rename = "innerHTML_set")]
    InnerHtmlSet,
    #[serde(rename = "outerHTML_get")]
    OuterHtmlGet,
    #[serde(rename = "outerHTML_set")]
    OuterHtmlSet,
    #[serde(rename = "children_get")]
    ChildrenGet,
    #[serde(rename = "parentNode_get")]
    ParentNodeGet,
    #[serde(rename = "id_get")]
    IdGet,
    #[serde(rename = "id_set")]
    IdSet,
    #[serde(rename = "querySelector")]
    QuerySelector,
    #[serde(rename = "querySelectorAll")]
    QuerySelectorAll,
    #[serde(rename = "createElement")]
    CreateElement,
    #[serde(rename = "cookie_get")]
    CookieGet,
    #[serde(rename = "cookie_set")]
    CookieSet,
    #[serde(rename = "XMLHttpRequest_send")]
    XmlHttpRequestSend,
}

impl Op {
    /// Every operation, in vocabulary order
    pub const ALL: [Op; 20] = [
        Op::Log,
        Op::GetAttribute,
        Op::ToString,
        Op::AppendChild,
        Op::InsertBefore,
        Op::RemoveChild,
        Op::InnerHtmlGet,
        Op::InnerHtmlSet,
        Op::OuterHtmlGet,
        Op::OuterHtmlSet,
        Op::ChildrenGet,
        Op::ParentNodeGet,
        Op::IdGet,
        Op::IdSet,
        Op::QuerySelector,
        Op::QuerySelectorAll,
        Op::CreateElement,
        Op::CookieGet,
        Op::CookieSet,
        Op::XmlHttpRequestSend,
    ];

    /// Wire name of the operation
    pub fn as_str(&self) -> &'static str {
        match self {
            Op::Log => "log",
            Op::GetAttribute => "getAttribute",
            Op::ToString => "toString",
            Op::AppendChild => "appendChild",
            Op::InsertBefore => "insertBefore",
            Op::RemoveChild => "removeChild",
            Op::InnerHtmlGet => "innerHTML_get",
            Op::InnerHtmlSet => "innerHTML_set",
            Op::OuterHtmlGet => "outerHTML_get",
            Op::OuterHtmlSet => "outerHTML_set",
            Op::ChildrenGet => "children_get",
            Op::ParentNodeGet => "parentNode_get",
            Op::IdGet => "id_get",
            Op::IdSet => "id_set",
            Op::QuerySelector => "querySelector",
            Op::QuerySelectorAll => "querySelectorAll",
            Op::CreateElement => "createElement",
            Op::CookieGet => "cookie_get",
            Op::CookieSet => "cookie_set",
            Op::XmlHttpRequestSend => "XMLHttpRequest_send",
        }
    }

    /// Operations missing from the minimal surface
    pub fn is_full_surface_only(&self) -> bool {
        matches!(
            self,
            Op::OuterHtmlGet
                | Op::OuterHtmlSet
                | Op::IdGet
                | Op::IdSet
                | Op::ParentNodeGet
                | Op::QuerySelector
                | Op::CookieGet
                | Op::CookieSet
        )
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Op {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Op::ALL
            .iter()
            .copied()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| Error::host(s, "unknown operation"))
    }
}

/// Synchronous call primitive bridging the runtime and the host
///
/// Implementations must serialize calls: the runtime issues them in program
/// order and never concurrently from one logical thread, but a gateway shared
/// across threads has to keep host state consistent on its own.
///
/// # Example
///
/// ```rust
/// use hostdom::gateway::{gateway_fn, Gateway, HostValue, Op};
///
/// let gateway = gateway_fn(|op, _args| match op {
///     Op::CookieGet => Ok(HostValue::from("session=1")),
///     _ => Ok(HostValue::Null),
/// });
/// let cookie = gateway.call(Op::CookieGet, &[]).unwrap();
/// assert_eq!(cookie.as_str(), Some("session=1"));
/// ```
pub trait Gateway: Send + Sync {
    /// Issue one call and block until the host replies
    fn call(&self, op: Op, args: &[HostValue]) -> Result<HostValue>;
}

/// Gateway backed by a closure
pub struct FnGateway<F> {
    f: F,
}

/// Wrap a closure as a gateway
pub fn gateway_fn<F>(f: F) -> FnGateway<F>
where
    F: Fn(Op, &[HostValue]) -> Result<HostValue> + Send + Sync,
{
    FnGateway { f }
}

impl<F> Gateway for FnGateway<F>
where
    F: Fn(Op, &[HostValue]) -> Result<HostValue> + Send + Sync,
{
    fn call(&self, op: Op, args: &[HostValue]) -> Result<HostValue> {
        (self.f)(op, args)
    }
}

impl<F> fmt::Debug for FnGateway<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnGateway").finish_non_exhaustive()
    }
}

impl<G: Gateway + ?Sized> Gateway for &G {
    fn call(&self, op: Op, args: &[HostValue]) -> Result<HostValue> {
        (**self).call(op, args)
    }
}

impl<G: Gateway + ?Sized> Gateway for Arc<G> {
    fn call(&self, op: Op, args: &[HostValue]) -> Result<HostValue> {
        (**self).call(op, args)
    }
}

impl<G: Gateway + ?Sized> Gateway for Box<G> {
    fn call(&self, op: Op, args: &[HostValue]) -> Result<HostValue> {
        (**self).call(op, args)
    }
}
