// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Call logging decorator for gateways

use std::collections::VecDeque;
use std::fmt;
use std::time::{Duration, Instant, SystemTime};

use parking_lot::RwLock;
use tracing::debug;

use super::{Gateway, HostValue, Op};
use crate::error::Result;

/// Default number of calls kept in the log
pub const DEFAULT_CALL_LOG_CAPACITY: usize = 1024;

/// One gateway round-trip as seen by the runtime
#[derive(Debug, Clone)]
pub struct CallRecord {
    pub timestamp: SystemTime,
    pub op: Op,
    pub args: Vec<HostValue>,
    pub reply: Option<HostValue>,
    pub error: Option<String>,
    pub duration: Duration,
}

impl fmt::Display for CallRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let args = self
            .args
            .iter()
            .map(|a| a.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        match (&self.reply, &self.error) {
            (_, Some(err)) => write!(f, "{}({}) -> ERROR: {}", self.op, args, err),
            (Some(reply), None) => write!(f, "{}({}) -> {}", self.op, args, reply),
            (None, None) => write!(f, "{}({}) -> pending", self.op, args),
        }
    }
}

/// Gateway wrapper that logs each call and keeps a bounded call history
pub struct TracingGateway<G> {
    inner: G,
    log: RwLock<VecDeque<CallRecord>>,
    capacity: usize,
}

impl<G: Gateway> TracingGateway<G> {
    /// Wrap a gateway with the default log capacity
    pub fn new(inner: G) -> Self {
        Self::with_capacity(inner, DEFAULT_CALL_LOG_CAPACITY)
    }

    /// Wrap a gateway keeping at most `capacity` calls
    pub fn with_capacity(inner: G, capacity: usize) -> Self {
        Self {
            inner,
            log: RwLock::new(VecDeque::new()),
            capacity,
        }
    }

    /// The wrapped gateway
    pub fn inner(&self) -> &G {
        &self.inner
    }

    /// Recorded calls, oldest first
    pub fn calls(&self) -> Vec<CallRecord> {
        self.log.read().iter().cloned().collect()
    }

    /// Recorded operations, oldest first
    pub fn ops(&self) -> Vec<Op> {
        self.log.read().iter().map(|r| r.op).collect()
    }

    /// Number of recorded calls
    pub fn call_count(&self) -> usize {
        self.log.read().len()
    }

    /// Clear the call history
    pub fn clear(&self) {
        self.log.write().clear();
    }
}

impl<G: Gateway> Gateway for TracingGateway<G> {
    fn call(&self, op: Op, args: &[HostValue]) -> Result<HostValue> {
        let started = Instant::now();
        let result = self.inner.call(op, args);
        let duration = started.elapsed();

        let record = CallRecord {
            timestamp: SystemTime::now(),
            op,
            args: args.to_vec(),
            reply: result.as_ref().ok().cloned(),
            error: result.as_ref().err().map(|e| e.to_string()),
            duration,
        };
        debug!(target: "hostdom::gateway", elapsed_us = duration.as_micros() as u64, "{}", record);

        if self.capacity > 0 {
            let mut log = self.log.write();
            if log.len() >= self.capacity {
                log.pop_front();
            }
            log.push_back(record);
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::gateway::gateway_fn;

    #[test]
    fn test_records_calls_and_errors() {
        let gateway = TracingGateway::new(gateway_fn(|op, _| match op {
            Op::CookieGet => Ok(HostValue::from("a=1")),
            _ => Err(Error::host(op.as_str(), "boom")),
        }));

        assert!(gateway.call(Op::CookieGet, &[]).is_ok());
        assert!(gateway.call(Op::Log, &["hi".into()]).is_err());

        let calls = gateway.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].to_string(), "cookie_get() -> \"a=1\"");
        assert_eq!(calls[1].op, Op::Log);
        assert!(calls[1].error.as_deref().unwrap().contains("boom"));
    }

    #[test]
    fn test_log_is_bounded() {
        let gateway = TracingGateway::with_capacity(gateway_fn(|_, _| Ok(HostValue::Null)), 2);
        gateway.call(Op::Log, &["1".into()]).unwrap();
        gateway.call(Op::Log, &["2".into()]).unwrap();
        gateway.call(Op::CookieGet, &[]).unwrap();

        assert_eq!(gateway.ops(), vec![Op::Log, Op::CookieGet]);
        gateway.clear();
        assert_eq!(gateway.call_count(), 0);
    }
}
