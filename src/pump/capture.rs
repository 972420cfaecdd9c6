use crate::error::{FlvError, Result};
use crate::flv::{FlvWriter, TagKind};
use bytes::Bytes;
use log::{debug, error, info};
use tokio::io::AsyncWrite;
use tokio::sync::mpsc;

const FEED_CAPACITY: usize = 64;

/// One message delivered by a live session. Audio and video carry the
/// session-relative timestamp; generic data records carry their absolute
/// timestamp and their own kind byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionMessage {
    Video { data: Bytes, timestamp: u32 },
    Audio { data: Bytes, timestamp: u32 },
    Data { kind: TagKind, data: Bytes, timestamp: u32 },
}

impl SessionMessage {
    /// The tag kind, payload, and timestamp this message maps to on disk.
    pub fn into_tag_parts(self) -> (TagKind, Bytes, u32) {
        match self {
            SessionMessage::Video { data, timestamp } => (TagKind::Video, data, timestamp),
            SessionMessage::Audio { data, timestamp } => (TagKind::Audio, data, timestamp),
            SessionMessage::Data {
                kind,
                data,
                timestamp,
            } => (kind, data, timestamp),
        }
    }
}

enum Feed {
    Message(SessionMessage),
    Stop,
}

/// Feed half of a capture session. Clones share one feed; session
/// callbacks deliver messages from whatever task they run on.
#[derive(Clone)]
pub struct RecorderHandle {
    feed: mpsc::Sender<Feed>,
}

impl RecorderHandle {
    /// Queues a message for the recorder, applying channel backpressure.
    /// Fails once the recorder has terminated (stopped or hit a write
    /// failure).
    pub async fn deliver(&self, message: SessionMessage) -> Result<()> {
        self.feed
            .send(Feed::Message(message))
            .await
            .map_err(|_| FlvError::Session("capture has ended".to_string()))
    }

    /// Asks the recorder to finish cleanly. Best effort: the recorder may
    /// already have terminated on a write failure.
    pub async fn stop(&self) {
        let _ = self.feed.send(Feed::Stop).await;
    }
}

/// Appends live session messages to an FLV resource.
///
/// The run future is the completion signal the owner awaits: it resolves
/// with the writer once [`RecorderHandle::stop`] is called or every handle
/// is dropped, or with the first write failure. Failures are not retried
/// and messages still queued at termination are dropped.
pub struct Recorder<W: AsyncWrite + Unpin + Send> {
    writer: FlvWriter<W>,
    feed: mpsc::Receiver<Feed>,
}

impl<W: AsyncWrite + Unpin + Send> Recorder<W> {
    pub fn new(writer: FlvWriter<W>) -> (Self, RecorderHandle) {
        let (tx, rx) = mpsc::channel(FEED_CAPACITY);
        (
            Self { writer, feed: rx },
            RecorderHandle { feed: tx },
        )
    }

    /// Receives messages until the feed ends, writing each as one tag.
    /// Returns the writer so the caller can keep appending or inspect the
    /// totals.
    pub async fn run(mut self) -> Result<FlvWriter<W>> {
        info!("capture started");
        while let Some(item) = self.feed.recv().await {
            match item {
                Feed::Message(message) => {
                    if let Err(e) = self.write_message(message).await {
                        error!("tag write failed, capture aborting: {}", e);
                        return Err(e);
                    }
                }
                Feed::Stop => {
                    debug!("capture stop requested");
                    break;
                }
            }
        }
        self.writer.flush().await?;
        info!(
            "capture ended: {} tags, {}ms",
            self.writer.tags_written(),
            self.writer.duration_ms()
        );
        Ok(self.writer)
    }

    // Flushed per message so a failing resource surfaces on the message
    // that hit it.
    async fn write_message(&mut self, message: SessionMessage) -> Result<()> {
        let (kind, data, timestamp) = message.into_tag_parts();
        self.writer.write_tag(kind, &data, timestamp).await?;
        self.writer.flush().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flv::{FlvReader, TagKind};
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn new_recorder() -> (Recorder<Cursor<Vec<u8>>>, RecorderHandle) {
        Recorder::new(FlvWriter::new(Cursor::new(Vec::new())))
    }

    #[tokio::test]
    async fn test_messages_land_as_tags_in_order() {
        let (recorder, handle) = new_recorder();
        let task = tokio::spawn(recorder.run());

        handle
            .deliver(SessionMessage::Video {
                data: Bytes::from_static(b"keyframe"),
                timestamp: 0,
            })
            .await
            .unwrap();
        handle
            .deliver(SessionMessage::Audio {
                data: Bytes::from_static(b"adts"),
                timestamp: 20,
            })
            .await
            .unwrap();
        handle
            .deliver(SessionMessage::Data {
                kind: TagKind::ScriptData,
                data: Bytes::from_static(b"onMetaData"),
                timestamp: 1000,
            })
            .await
            .unwrap();
        handle.stop().await;

        let writer = task.await.unwrap().unwrap();
        assert_eq!(writer.tags_written(), 3);
        assert_eq!(writer.duration_ms(), 1000);

        let data = writer.into_inner().into_inner();
        let mut reader = FlvReader::new(&data[..]);
        let kinds_and_ts: Vec<(TagKind, u32)> = {
            let mut out = Vec::new();
            while let Some(tag) = reader.read_tag().await.unwrap() {
                out.push((tag.kind, tag.timestamp));
            }
            out
        };
        assert_eq!(
            kinds_and_ts,
            vec![
                (TagKind::Video, 0),
                (TagKind::Audio, 20),
                (TagKind::ScriptData, 1000),
            ]
        );
    }

    #[tokio::test]
    async fn test_all_handles_dropped_completes_cleanly() {
        let (recorder, handle) = new_recorder();
        let task = tokio::spawn(recorder.run());

        handle
            .deliver(SessionMessage::Video {
                data: Bytes::from_static(b"k"),
                timestamp: 0,
            })
            .await
            .unwrap();
        drop(handle);

        let writer = task.await.unwrap().unwrap();
        assert_eq!(writer.tags_written(), 1);
    }

    #[tokio::test]
    async fn test_first_write_failure_ends_the_run() {
        let failing = tokio_test::io::Builder::new()
            .write_error(std::io::Error::new(std::io::ErrorKind::Other, "injected"))
            .build();
        let (recorder, handle) = Recorder::new(FlvWriter::new(failing));
        let task = tokio::spawn(recorder.run());

        handle
            .deliver(SessionMessage::Video {
                data: Bytes::from_static(b"k"),
                timestamp: 0,
            })
            .await
            .unwrap();

        let err = task.await.unwrap().unwrap_err();
        assert!(matches!(err, FlvError::Io(_)));

        // the feed is gone; later deliveries surface as session errors
        let late = handle
            .deliver(SessionMessage::Audio {
                data: Bytes::from_static(b"a"),
                timestamp: 10,
            })
            .await
            .unwrap_err();
        assert!(matches!(late, FlvError::Session(_)));
    }

    #[tokio::test]
    async fn test_stop_is_idempotent_and_best_effort() {
        let (recorder, handle) = new_recorder();
        let task = tokio::spawn(recorder.run());

        handle.stop().await;
        let writer = task.await.unwrap().unwrap();
        assert_eq!(writer.tags_written(), 0);

        // stopping again after completion must not hang or panic
        handle.stop().await;
    }
}
