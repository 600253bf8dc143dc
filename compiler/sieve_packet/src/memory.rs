//! In-memory packet source.

use std::collections::VecDeque;

use crate::{CaptureStats, Packet, PacketError, PacketSource, Verdict};

/// Replays a fixed list of payloads and records the verdicts it receives.
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    pending: VecDeque<Packet>,
    verdicts: Vec<(u64, Verdict)>,
    stats: CaptureStats,
}

impl MemorySource {
    pub fn new<I>(payloads: I) -> Self
    where
        I: IntoIterator<Item = Vec<u8>>,
    {
        let pending = payloads
            .into_iter()
            .enumerate()
            .map(|(id, data)| Packet::new(id as u64, data))
            .collect();
        MemorySource {
            pending,
            ..MemorySource::default()
        }
    }

    /// `(packet id, verdict)` in the order verdicts were given.
    pub fn verdicts(&self) -> &[(u64, Verdict)] {
        &self.verdicts
    }
}

impl PacketSource for MemorySource {
    fn receive(&mut self) -> Result<Option<Packet>, PacketError> {
        let packet = self.pending.pop_front();
        if packet.is_some() {
            self.stats.received += 1;
        }
        Ok(packet)
    }

    fn verdict(&mut self, packet: Packet, verdict: Verdict) {
        self.stats.record(verdict);
        self.verdicts.push((packet.id, verdict));
    }

    fn stats(&self) -> CaptureStats {
        self.stats
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
