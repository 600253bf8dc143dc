//! Packet sources and verdict sinks.
//!
//! A [`PacketSource`] hands out packets one at a time and takes back a
//! [`Verdict`] for each of them. Two sources are provided:
//!
//! - [`MemorySource`]: packets held in memory, verdicts recorded for
//!   inspection
//! - [`PcapSource`]: packets read from a legacy pcap capture

mod memory;
mod pcap;

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

pub use memory::MemorySource;
pub use pcap::PcapSource;

/// Log section used by packet sources.
pub const PACKET_SECTION: &str = "packet";

/// Failure to read packets.
#[derive(Debug, thiserror::Error)]
pub enum PacketError {
    #[error("cannot open capture '{}': {source}", path.display())]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed capture: {0}")]
    Format(String),
}

/// One captured packet.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Packet {
    /// Sequence number within its source, from 0.
    pub id: u64,
    pub timestamp: Duration,
    /// Captured bytes. May be shorter than `original_len`.
    pub data: Vec<u8>,
    pub original_len: usize,
}

impl Packet {
    pub fn new(id: u64, data: Vec<u8>) -> Self {
        Packet {
            id,
            timestamp: Duration::ZERO,
            original_len: data.len(),
            data,
        }
    }

    #[inline]
    pub fn is_truncated(&self) -> bool {
        self.data.len() < self.original_len
    }
}

/// What happens to a packet once inspected.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Verdict {
    Accept,
    Drop,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Verdict::Accept => "accept",
            Verdict::Drop => "drop",
        })
    }
}

/// Running totals kept by every source.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct CaptureStats {
    pub received: u64,
    pub truncated: u64,
    pub accepted: u64,
    pub dropped: u64,
}

impl CaptureStats {
    pub(crate) fn record(&mut self, verdict: Verdict) {
        match verdict {
            Verdict::Accept => self.accepted += 1,
            Verdict::Drop => self.dropped += 1,
        }
    }
}

/// Where packets come from and where their verdicts go.
pub trait PacketSource {
    /// Next packet, or `None` once the source is exhausted.
    fn receive(&mut self) -> Result<Option<Packet>, PacketError>;

    /// Settle `packet`. Every received packet gets exactly one verdict.
    fn verdict(&mut self, packet: Packet, verdict: Verdict);

    fn stats(&self) -> CaptureStats;
}
