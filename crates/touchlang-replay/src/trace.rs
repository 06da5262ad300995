#![forbid(unsafe_code)]

//! JSON-lines touch traces.
//!
//! Each non-empty line is either a touch frame or a user action:
//!
//! ```text
//! {"phase":"start","t_ms":0,"contacts":[{"id":0,"x":100,"y":100,"force":null}]}
//! {"phase":"end","t_ms":150,"contacts":[{"id":0,"x":100,"y":100}]}
//! {"action":"context","t_ms":400,"context":"writing"}
//! {"action":"clear","t_ms":900}
//! ```
//!
//! Timestamps are milliseconds from the start of the trace and must not
//! decrease. Lines starting with `#` are comments.

use std::io::BufRead;

use serde::{Deserialize, Serialize};
use touchlang_core::{Contact, Context, TouchFrame, TouchPhase};
use web_time::{Duration, Instant};

use crate::error::{ReplayError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceFrame {
    pub phase: TouchPhase,
    pub t_ms: u64,
    #[serde(default)]
    pub contacts: Vec<Contact>,
}

impl TraceFrame {
    /// Materialize as a frame on a clock starting at `t0`.
    #[must_use]
    pub fn to_frame(&self, t0: Instant) -> TouchFrame {
        TouchFrame::new(
            self.phase,
            self.contacts.clone(),
            t0 + Duration::from_millis(self.t_ms),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum TraceAction {
    Context { t_ms: u64, context: Context },
    Clear { t_ms: u64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TraceLine {
    Frame(TraceFrame),
    Action(TraceAction),
}

impl TraceLine {
    #[must_use]
    pub fn t_ms(&self) -> u64 {
        match self {
            Self::Frame(f) => f.t_ms,
            Self::Action(TraceAction::Context { t_ms, .. } | TraceAction::Clear { t_ms }) => *t_ms,
        }
    }
}

/// Parse a whole trace, checking timestamp order.
pub fn parse_trace(reader: impl BufRead) -> Result<Vec<TraceLine>> {
    let mut lines = Vec::new();
    let mut last_t = 0;
    for (idx, raw) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let raw = raw.map_err(|e| ReplayError::io(format!("<trace line {line_no}>"), e))?;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let line: TraceLine = serde_json::from_str(trimmed).map_err(|source| ReplayError::Trace {
            line: line_no,
            source,
        })?;
        if line.t_ms() < last_t {
            return Err(ReplayError::OutOfOrder {
                line: line_no,
                t_ms: line.t_ms(),
            });
        }
        last_t = line.t_ms();
        lines.push(line);
    }
    Ok(lines)
}
