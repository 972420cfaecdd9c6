use super::{
    TagKind, FLAG_HAS_AUDIO, FLAG_HAS_VIDEO, FLV_SIGNATURE, HEADER_LEN, MAX_TAG_PAYLOAD,
    TAG_HEADER_LEN,
};
use crate::error::{FlvError, Result};
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};

/// Tag-level FLV encoder over any async byte sink.
#[derive(Debug)]
pub struct FlvWriter<W: AsyncWrite + Unpin + Send> {
    writer: BufWriter<W>,
    tags_written: u64,
    duration_ms: u32,
}

impl<W: AsyncWrite + Unpin + Send> FlvWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::new(writer),
            tags_written: 0,
            duration_ms: 0,
        }
    }

    /// Writes the 13-byte preamble: signature, version 1, audio+video
    /// flags, data offset 9, and the zero previous-tag-size word.
    pub async fn write_header(&mut self) -> Result<()> {
        let mut header = [0u8; HEADER_LEN];
        header[..3].copy_from_slice(&FLV_SIGNATURE);
        header[3] = 1;
        header[4] = FLAG_HAS_AUDIO | FLAG_HAS_VIDEO;
        header[5..9].copy_from_slice(&9u32.to_be_bytes());
        self.writer.write_all(&header).await?;
        Ok(())
    }

    /// Appends one tag. Safe to call repeatedly; the header is never
    /// re-written.
    pub async fn write_tag(&mut self, kind: TagKind, data: &[u8], timestamp: u32) -> Result<()> {
        if data.len() > MAX_TAG_PAYLOAD {
            return Err(FlvError::Format(format!(
                "payload of {} bytes exceeds the 24-bit size field",
                data.len()
            )));
        }

        let size = data.len() as u32;
        let mut header = [0u8; TAG_HEADER_LEN];
        header[0] = kind.as_byte();
        header[1..4].copy_from_slice(&size.to_be_bytes()[1..]);
        header[4..7].copy_from_slice(&timestamp.to_be_bytes()[1..]);
        header[7] = (timestamp >> 24) as u8;
        // header[8..11] stays zero: stream id

        self.writer.write_all(&header).await?;
        self.writer.write_all(data).await?;
        self.writer.write_u32(TAG_HEADER_LEN as u32 + size).await?;

        self.tags_written += 1;
        if timestamp > self.duration_ms {
            self.duration_ms = timestamp;
        }
        Ok(())
    }

    pub async fn flush(&mut self) -> Result<()> {
        self.writer.flush().await?;
        Ok(())
    }

    /// Returns the underlying sink. Unflushed buffered bytes are dropped;
    /// call [`flush`](Self::flush) first.
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    /// Number of tags appended so far.
    pub fn tags_written(&self) -> u64 {
        self.tags_written
    }

    /// Largest timestamp appended so far, in milliseconds.
    pub fn duration_ms(&self) -> u32 {
        self.duration_ms
    }
}

impl FlvWriter<File> {
    /// Creates the file and writes the preamble in one step.
    pub async fn create(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::create(path).await?;
        let mut writer = Self::new(file);
        writer.write_header().await?;
        writer.flush().await?;
        Ok(writer)
    }
}
