// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Synchronous XMLHttpRequest over the gateway
//!
//! Asynchronous mode is rejected outright. `send` performs exactly one
//! `XMLHttpRequest_send` call and blocks until the host answers.

use std::sync::Arc;

use tracing::debug;

use super::value::ScriptValue;
use super::Bridge;
use crate::error::{Error, Result};
use crate::gateway::{HostValue, Op};

/// Method and URL recorded by `open`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestState {
    pub method: String,
    pub url: String,
}

/// Creates request objects bound to a runtime context
#[derive(Clone)]
pub struct RequestFactory {
    bridge: Arc<Bridge>,
}

impl RequestFactory {
    pub(crate) fn new(bridge: Arc<Bridge>) -> Self {
        Self { bridge }
    }

    /// `new XMLHttpRequest()`
    pub fn create(&self) -> XmlHttpRequest {
        XmlHttpRequest {
            bridge: self.bridge.clone(),
            state: None,
            response_text: None,
        }
    }
}

impl std::fmt::Debug for RequestFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestFactory").finish_non_exhaustive()
    }
}

/// Blocking request/response object
pub struct XmlHttpRequest {
    bridge: Arc<Bridge>,
    state: Option<RequestState>,
    response_text: Option<String>,
}

impl XmlHttpRequest {
    /// `open(method, url, isAsync)`
    ///
    /// Fails before anything else if `is_async` is truthy.
    pub fn open(
        &mut self,
        method: &str,
        url: &str,
        is_async: impl Into<ScriptValue>,
    ) -> Result<()> {
        if is_async.into().is_truthy() {
            return Err(Error::usage("asynchronous XMLHttpRequest is not supported"));
        }

        self.state = Some(RequestState {
            method: method.to_string(),
            url: url.to_string(),
        });
        self.response_text = None;
        Ok(())
    }

    /// `send(body)`; blocks until the host replies
    pub fn send(&mut self, body: Option<&str>) -> Result<()> {
        let state = self
            .state
            .as_ref()
            .ok_or_else(|| Error::usage("send() called before open()"))?;

        debug!(method = %state.method, url = %state.url, "sending request through host");

        let reply = self.bridge.call(
            Op::XmlHttpRequestSend,
            &[
                HostValue::from(state.method.as_str()),
                HostValue::from(state.url.as_str()),
                HostValue::from(body),
            ],
        )?;
        self.response_text = Some(reply.into_string(Op::XmlHttpRequestSend.as_str())?);
        Ok(())
    }

    /// Method and URL from the last `open`
    pub fn state(&self) -> Option<&RequestState> {
        self.state.as_ref()
    }

    /// `responseText`; `None` until a send completes
    pub fn response_text(&self) -> Option<&str> {
        self.response_text.as_deref()
    }
}

impl std::fmt::Debug for XmlHttpRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XmlHttpRequest")
            .field("state", &self.state)
            .field("response_text", &self.response_text)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::error::Error;
    use crate::gateway::{gateway_fn, HostValue, Op, TracingGateway};
    use crate::runtime::RuntimeContext;

    fn echo_host() -> Arc<TracingGateway<impl crate::gateway::Gateway>> {
        Arc::new(TracingGateway::new(gateway_fn(|op, args| match op {
            Op::XmlHttpRequestSend => Ok(HostValue::from(format!(
                "{} {} {}",
                args[0], args[1], args[2]
            ))),
            _ => Err(Error::host(op.as_str(), "unexpected")),
        })))
    }

    #[test]
    fn test_async_open_fails_before_any_call() {
        let gateway = echo_host();
        let ctx = RuntimeContext::with_defaults(gateway.clone());

        let mut xhr = ctx.xml_http_request();
        let err = xhr.open("GET", "/comments", true).unwrap_err();
        assert!(err.is_usage());
        assert!(xhr.state().is_none());

        // A truthy non-boolean counts as async too
        assert!(xhr.open("GET", "/comments", "yes").is_err());
        assert_eq!(gateway.call_count(), 0);
    }

    #[test]
    fn test_sync_send() {
        let gateway = echo_host();
        let ctx = RuntimeContext::with_defaults(gateway.clone());

        let mut xhr = ctx.requests().create();
        xhr.open("POST", "/add", false).unwrap();
        assert_eq!(xhr.response_text(), None);

        xhr.send(Some("guest=hi")).unwrap();
        assert_eq!(
            xhr.response_text(),
            Some("\"POST\" \"/add\" \"guest=hi\"")
        );

        xhr.send(None).unwrap();
        assert_eq!(xhr.response_text(), Some("\"POST\" \"/add\" null"));
        assert_eq!(gateway.ops(), vec![Op::XmlHttpRequestSend; 2]);
    }

    #[test]
    fn test_send_before_open() {
        let gateway = echo_host();
        let ctx = RuntimeContext::with_defaults(gateway.clone());

        let mut xhr = ctx.xml_http_request();
        assert!(xhr.send(None).unwrap_err().is_usage());
        assert_eq!(gateway.call_count(), 0);
    }

    #[test]
    fn test_host_failure_propagates() {
        let ctx = RuntimeContext::with_defaults(gateway_fn(|op, _| {
            Err(Error::host(op.as_str(), "connection refused"))
        }));

        let mut xhr = ctx.xml_http_request();
        xhr.open("GET", "http://localhost:1/", false).unwrap();
        let err = xhr.send(None).unwrap_err();
        assert_eq!(err.op(), Some("XMLHttpRequest_send"));
        assert!(err.to_string().contains("connection refused"));
        assert_eq!(xhr.response_text(), None);
    }
}
