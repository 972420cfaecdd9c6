use super::{FlvHeader, FlvReader, Tag};
use crate::error::Result;
use log::debug;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncSeek};

/// Sequential, restartable reader over a finite FLV resource.
///
/// The preamble is validated once, at construction. [`loop_back`] rewinds
/// to the first tag without re-reading it; any epoch or pass-origin state a
/// caller derived from earlier tags is stale after a loop-back, since each
/// pass is an independent timeline.
///
/// [`loop_back`]: Self::loop_back
#[derive(Debug)]
pub struct FlvSource<R: AsyncRead + AsyncSeek + Unpin + Send> {
    reader: FlvReader<R>,
    header: FlvHeader,
    finished: bool,
    passes: u32,
}

impl FlvSource<File> {
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path).await?;
        Self::new(file).await
    }
}

impl<R: AsyncRead + AsyncSeek + Unpin + Send> FlvSource<R> {
    pub async fn new(reader: R) -> Result<Self> {
        let mut reader = FlvReader::new(reader);
        let header = reader.read_header().await?;
        Ok(Self {
            reader,
            header,
            finished: false,
            passes: 0,
        })
    }

    pub fn header(&self) -> &FlvHeader {
        &self.header
    }

    /// Reads the next tag; `Ok(None)` marks the source finished until the
    /// next [`loop_back`](Self::loop_back).
    pub async fn read_tag(&mut self) -> Result<Option<Tag>> {
        match self.reader.read_tag().await? {
            Some(tag) => Ok(Some(tag)),
            None => {
                self.finished = true;
                Ok(None)
            }
        }
    }

    /// True once a read has returned end-of-data.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Rewinds to the first tag and clears the finished flag.
    pub async fn loop_back(&mut self) -> Result<()> {
        self.reader.rewind_to_body().await?;
        self.finished = false;
        self.passes += 1;
        debug!("source looped back to the first tag, pass {}", self.passes);
        Ok(())
    }

    /// Number of completed loop-backs.
    pub fn passes(&self) -> u32 {
        self.passes
    }
}
