// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Newline-delimited JSON encoding of the gateway contract
//!
//! One request per line, one reply per line:
//!
//! ```text
//! -> {"id":1,"op":"querySelector","args":["form"]}
//! <- {"id":1,"ok":4}
//! -> {"id":2,"op":"getAttribute","args":[4,"action"]}
//! <- {"id":2,"error":"unknown handle 4"}
//! ```

use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{Gateway, HostValue, Op};
use crate::error::{Error, Result};

/// A call as it travels over the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireRequest {
    pub id: u64,
    pub op: Op,
    #[serde(default)]
    pub args: Vec<HostValue>,
}

/// A reply as it travels over the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireReply {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ok: Option<HostValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WireReply {
    /// Successful reply
    pub fn ok(id: u64, value: HostValue) -> Self {
        Self {
            id,
            ok: Some(value),
            error: None,
        }
    }

    /// Failure reply
    pub fn error(id: u64, message: impl Into<String>) -> Self {
        Self {
            id,
            ok: None,
            error: Some(message.into()),
        }
    }
}

/// Gateway speaking the wire encoding over a reader/writer pair
pub struct StreamGateway<R, W> {
    io: Mutex<(R, W)>,
    next_id: AtomicU64,
}

impl<R: BufRead + Send, W: Write + Send> StreamGateway<R, W> {
    /// Create a gateway over a reader (host replies) and writer (our requests)
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            io: Mutex::new((reader, writer)),
            next_id: AtomicU64::new(1),
        }
    }

    /// Take the underlying reader and writer back
    pub fn into_inner(self) -> (R, W) {
        self.io.into_inner()
    }
}

impl<R: BufRead + Send, W: Write + Send> Gateway for StreamGateway<R, W> {
    fn call(&self, op: Op, args: &[HostValue]) -> Result<HostValue> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let request = WireRequest {
            id,
            op,
            args: args.to_vec(),
        };

        // Held for the whole round-trip so replies cannot interleave
        let mut io = self.io.lock();
        let (reader, writer) = &mut *io;

        let mut line = serde_json::to_string(&request)?;
        line.push('\n');
        writer.write_all(line.as_bytes())?;
        writer.flush()?;

        let mut reply_line = String::new();
        if reader.read_line(&mut reply_line)? == 0 {
            return Err(Error::GatewayClosed);
        }

        let reply: WireReply = serde_json::from_str(reply_line.trim_end())?;
        if reply.id != id {
            return Err(Error::protocol(
                op.as_str(),
                "reply with matching id",
                format!("id {}", reply.id),
            ));
        }

        match (reply.ok, reply.error) {
            (_, Some(message)) => Err(Error::host(op.as_str(), message)),
            (Some(value), None) => Ok(value),
            (None, None) => Ok(HostValue::Null),
        }
    }
}

/// Gateway to a host running as a child process, spoken to over stdin/stdout
pub struct ProcessGateway {
    inner: StreamGateway<BufReader<ChildStdout>, ChildStdin>,
    child: Mutex<Child>,
}

impl ProcessGateway {
    /// Spawn the host process and connect to its standard streams
    pub fn spawn(mut command: Command) -> Result<Self> {
        let mut child = command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| Error::Config("host process has no stdin".into()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::Config("host process has no stdout".into()))?;

        debug!(pid = child.id(), "spawned host process");

        Ok(Self {
            inner: StreamGateway::new(BufReader::new(stdout), stdin),
            child: Mutex::new(child),
        })
    }

    /// Process id of the host
    pub fn id(&self) -> u32 {
        self.child.lock().id()
    }
}

impl Gateway for ProcessGateway {
    fn call(&self, op: Op, args: &[HostValue]) -> Result<HostValue> {
        self.inner.call(op, args)
    }
}

impl Drop for ProcessGateway {
    fn drop(&mut self) {
        let child = self.child.get_mut();
        if let Err(e) = child.kill() {
            debug!(error = %e, "host process already exited");
        }
        let _ = child.wait();
    }
}

/// Answer wire requests with `gateway` until the reader is exhausted
///
/// Malformed lines get an error reply with id 0 and serving continues.
/// Returns the number of requests answered.
pub fn serve<G, R, W>(gateway: &G, reader: R, mut writer: W) -> Result<usize>
where
    G: Gateway + ?Sized,
    R: BufRead,
    W: Write,
{
    let mut served = 0;

    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let reply = match serde_json::from_str::<WireRequest>(&line) {
            Ok(request) => {
                served += 1;
                match gateway.call(request.op, &request.args) {
                    Ok(value) => WireReply::ok(request.id, value),
                    Err(e) => {
                        debug!(op = %request.op, error = %e, "host operation failed");
                        WireReply::error(request.id, wire_message(e))
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "malformed wire request");
                WireReply::error(0, format!("malformed request: {}", e))
            }
        };

        let mut out = serde_json::to_string(&reply)?;
        out.push('\n');
        writer.write_all(out.as_bytes())?;
        writer.flush()?;
    }

    Ok(served)
}

/// Text of a failure reply; the client re-attaches the op to host errors
fn wire_message(error: Error) -> String {
    match error {
        Error::Host { message, .. } => message,
        other => other.to_string(),
    }
}
