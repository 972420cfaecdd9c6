use super::{FlvHeader, FlvReader, Tag, HEADER_LEN, TAG_HEADER_LEN, TRAILER_LEN};
use crate::error::Result;
use log::trace;
use std::time::Duration;
use tokio::io::AsyncRead;
use tokio::time::Instant;

/// One decoded tag together with its wall-clock arrival measurements.
#[derive(Debug, Clone)]
pub struct TagArrival {
    pub tag: Tag,
    /// Time since the previous arrival; for the first tag, since the probe
    /// started.
    pub interval: Duration,
    /// Time since the probe started.
    pub elapsed: Duration,
}

/// Measures how a live FLV byte stream delivers its tags over time.
///
/// Useful against HTTP-FLV endpoints to see whether the origin paces tags
/// near their embedded timestamps or bursts them.
#[derive(Debug)]
pub struct StreamProbe<R: AsyncRead + Unpin + Send> {
    reader: FlvReader<R>,
    header: FlvHeader,
    started_at: Instant,
    last_arrival: Instant,
    tag_count: u64,
    byte_count: u64,
}

impl<R: AsyncRead + Unpin + Send> StreamProbe<R> {
    /// Validates the preamble and records the probe start instant.
    pub async fn start(reader: R) -> Result<Self> {
        let mut reader = FlvReader::new(reader);
        let header = reader.read_header().await?;
        let now = Instant::now();
        Ok(Self {
            reader,
            header,
            started_at: now,
            last_arrival: now,
            tag_count: 0,
            byte_count: HEADER_LEN as u64,
        })
    }

    pub fn header(&self) -> &FlvHeader {
        &self.header
    }

    /// Waits for the next tag and reports when it arrived. `Ok(None)` when
    /// the stream ends.
    pub async fn next_arrival(&mut self) -> Result<Option<TagArrival>> {
        let tag = match self.reader.read_tag().await? {
            Some(tag) => tag,
            None => return Ok(None),
        };

        let now = Instant::now();
        let interval = now - self.last_arrival;
        let elapsed = now - self.started_at;
        self.last_arrival = now;
        self.tag_count += 1;
        self.byte_count += (TAG_HEADER_LEN + tag.data.len() + TRAILER_LEN) as u64;
        trace!(
            "tag {:?} ts={}ms arrived {}ms after the previous one, {}ms in",
            tag.kind,
            tag.timestamp,
            interval.as_millis(),
            elapsed.as_millis()
        );

        Ok(Some(TagArrival {
            tag,
            interval,
            elapsed,
        }))
    }

    /// Tags seen so far.
    pub fn tag_count(&self) -> u64 {
        self.tag_count
    }

    /// Wire bytes consumed so far, preamble included.
    pub fn byte_count(&self) -> u64 {
        self.byte_count
    }
}
