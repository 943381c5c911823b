//! Access-trace replay.
//!
//! Feeds a [`CacheHierarchy`] from a text trace, one event per line:
//!
//! ```text
//! # comment
//! R 0x7ffd1000 8      read 8 bytes (also `L`)
//! W 4096 4            write 4 bytes (also `S`)
//! START               open the activation window
//! STOP                close it
//! ```
//!
//! Opcodes and markers are case-insensitive; addresses and sizes are decimal
//! or `0x`-prefixed hex. When the replayer is gated, accesses outside a
//! `START` / `STOP` window are dropped before they reach the hierarchy. When it
//! is not gated, markers are ignored and every access is replayed. Writes are
//! replayed as dirtying stores into the top level.

use std::io::BufRead;

use tracing::{debug, trace};

use crate::common::error::TraceError;
use crate::hierarchy::CacheHierarchy;

/// One parsed trace line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TraceEvent {
    /// A read of `size` bytes at `addr`.
    Read {
        /// First byte read.
        addr: u64,
        /// Bytes read.
        size: u64,
    },
    /// A write of `size` bytes at `addr`.
    Write {
        /// First byte written.
        addr: u64,
        /// Bytes written.
        size: u64,
    },
    /// Opens the activation window.
    Start,
    /// Closes the activation window.
    Stop,
}

impl TraceEvent {
    /// Parses one trace line.
    ///
    /// # Returns
    ///
    /// `Ok(None)` for blank and comment lines.
    ///
    /// # Errors
    ///
    /// [`TraceError::Parse`] carrying `line` for anything unrecognised.
    pub fn parse(line: usize, text: &str) -> Result<Option<Self>, TraceError> {
        let text = text.trim();
        if text.is_empty() || text.starts_with('#') {
            return Ok(None);
        }
        let err = |message: String| TraceError::Parse { line, message };

        let mut fields = text.split_whitespace();
        let op = fields.next().unwrap_or_default().to_ascii_uppercase();
        let event = match op.as_str() {
            "START" => Self::Start,
            "STOP" => Self::Stop,
            "R" | "L" | "W" | "S" => {
                let (Some(addr), Some(size)) = (fields.next(), fields.next()) else {
                    return Err(err(format!("`{op}` needs an address and a size")));
                };
                let addr = parse_number(addr).ok_or_else(|| err(format!("bad address `{addr}`")))?;
                let size = parse_number(size).ok_or_else(|| err(format!("bad size `{size}`")))?;
                if matches!(op.as_str(), "R" | "L") {
                    Self::Read { addr, size }
                } else {
                    Self::Write { addr, size }
                }
            }
            _ => return Err(err(format!("unknown event `{op}`"))),
        };
        if let Some(extra) = fields.next() {
            return Err(err(format!("unexpected field `{extra}`")));
        }
        Ok(Some(event))
    }
}

fn parse_number(text: &str) -> Option<u64> {
    match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => text.parse().ok(),
    }
}

/// Counts from one replay.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    /// Events parsed, markers included.
    pub events: u64,
    /// Accesses handed to the hierarchy.
    pub forwarded: u64,
    /// Accesses dropped outside the activation window.
    pub skipped: u64,
}

/// Replays trace events into the top level of a hierarchy.
#[derive(Clone, Copy, Debug, Default)]
pub struct TraceReplayer {
    gated: bool,
    active: bool,
}

impl TraceReplayer {
    /// Creates a replayer.
    ///
    /// # Arguments
    ///
    /// * `gated` - Only replay accesses between `START` and `STOP` markers.
    pub fn new(gated: bool) -> Self {
        Self {
            gated,
            active: false,
        }
    }

    /// Whether the activation window is currently open.
    pub fn is_active(&self) -> bool {
        !self.gated || self.active
    }

    /// Applies one event.
    ///
    /// # Returns
    ///
    /// `true` if the event was an access that reached the hierarchy.
    pub fn apply(&mut self, event: TraceEvent, hierarchy: &mut CacheHierarchy) -> bool {
        match event {
            TraceEvent::Start => {
                self.active = true;
                false
            }
            TraceEvent::Stop => {
                self.active = false;
                false
            }
            TraceEvent::Read { addr, size } if self.is_active() => {
                hierarchy.load(0, addr, size);
                true
            }
            TraceEvent::Write { addr, size } if self.is_active() => {
                hierarchy.store(0, addr, size, true);
                true
            }
            TraceEvent::Read { addr, .. } | TraceEvent::Write { addr, .. } => {
                trace!(addr, "access outside activation window");
                false
            }
        }
    }

    /// Reads and replays a whole trace.
    ///
    /// # Errors
    ///
    /// [`TraceError`] on the first unreadable or malformed line. Events before
    /// it have already been applied.
    pub fn replay<R: BufRead>(
        &mut self,
        reader: R,
        hierarchy: &mut CacheHierarchy,
    ) -> Result<ReplaySummary, TraceError> {
        let mut summary = ReplaySummary::default();
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let Some(event) = TraceEvent::parse(index + 1, &line)? else {
                continue;
            };
            summary.events += 1;
            match event {
                TraceEvent::Start | TraceEvent::Stop => {
                    let _ = self.apply(event, hierarchy);
                }
                _ if self.apply(event, hierarchy) => summary.forwarded += 1,
                _ => summary.skipped += 1,
            }
        }
        debug!(
            events = summary.events,
            forwarded = summary.forwarded,
            skipped = summary.skipped,
            "trace replayed"
        );
        Ok(summary)
    }
}
