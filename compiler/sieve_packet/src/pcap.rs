//! Legacy pcap capture files.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

use pcap_parser::traits::PcapReaderIterator;
use pcap_parser::{LegacyPcapReader, PcapBlockOwned, PcapError};
use sieve_diagnostic::{emit, LogLevel};

use crate::{CaptureStats, Packet, PacketError, PacketSource, Verdict, PACKET_SECTION};

/// Reader buffer size; must hold the largest record in the capture.
const BUFFER_SIZE: usize = 65536;

/// Packets read from a legacy pcap stream.
///
/// Verdicts are only counted: an offline capture has nowhere to forward
/// accepted packets to.
pub struct PcapSource<R>
where
    R: Read,
{
    reader: LegacyPcapReader<R>,
    linktype: Option<i32>,
    next_id: u64,
    stats: CaptureStats,
}

impl PcapSource<File> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PacketError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| PacketError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(file)
    }
}

impl<R> PcapSource<R>
where
    R: Read,
{
    pub fn from_reader(input: R) -> Result<Self, PacketError> {
        let reader = LegacyPcapReader::new(BUFFER_SIZE, input)
            .map_err(|e| PacketError::Format(format!("{e:?}")))?;
        Ok(PcapSource {
            reader,
            linktype: None,
            next_id: 0,
            stats: CaptureStats::default(),
        })
    }

    /// Link type from the file header, once it has been read.
    pub fn linktype(&self) -> Option<i32> {
        self.linktype
    }
}

impl<R> PacketSource for PcapSource<R>
where
    R: Read,
{
    fn receive(&mut self) -> Result<Option<Packet>, PacketError> {
        loop {
            match self.reader.next() {
                Ok((offset, block)) => {
                    let packet = record_to_packet(block, self.next_id, &mut self.linktype);
                    self.reader.consume(offset);

                    if let Some(packet) = packet {
                        self.next_id += 1;
                        self.stats.received += 1;
                        if packet.is_truncated() {
                            self.stats.truncated += 1;
                            emit(LogLevel::Warning, PACKET_SECTION, "packet truncated");
                        }
                        return Ok(Some(packet));
                    }
                }
                Err(PcapError::Eof) => return Ok(None),
                Err(PcapError::Incomplete(_)) => {
                    self.reader
                        .refill()
                        .map_err(|e| PacketError::Format(format!("{e:?}")))?;
                }
                Err(e) => return Err(PacketError::Format(format!("{e:?}"))),
            }
        }
    }

    fn verdict(&mut self, packet: Packet, verdict: Verdict) {
        tracing::trace!(packet = packet.id, %verdict, "verdict");
        self.stats.record(verdict);
    }

    fn stats(&self) -> CaptureStats {
        self.stats
    }
}

/// The packet carried by `block`; file headers only update `linktype`.
fn record_to_packet(block: PcapBlockOwned<'_>, id: u64, linktype: &mut Option<i32>) -> Option<Packet> {
    match block {
        PcapBlockOwned::LegacyHeader(header) => {
            *linktype = Some(header.network.0);
            None
        }
        PcapBlockOwned::Legacy(record) => Some(Packet {
            id,
            timestamp: Duration::new(
                u64::from(record.ts_sec),
                record.ts_usec.saturating_mul(1000),
            ),
            data: record.data.to_vec(),
            original_len: record.origlen as usize,
        }),
        PcapBlockOwned::NG(_) => None,
    }
}
