use crate::error::Result;
use crate::flv::TagKind;
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;

/// Connection lifecycle as reported by the session layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    NotReady,
    Connected,
    /// The outbound stream exists and is writable; publishing may proceed.
    StreamReady,
    Abnormal,
}

impl ConnectionStatus {
    pub fn from_u8(v: u8) -> Self {
        match v {
            1 => ConnectionStatus::Connected,
            2 => ConnectionStatus::StreamReady,
            3 => ConnectionStatus::Abnormal,
            _ => ConnectionStatus::NotReady,
        }
    }

    pub fn as_u8(&self) -> u8 {
        match self {
            ConnectionStatus::NotReady => 0,
            ConnectionStatus::Connected => 1,
            ConnectionStatus::StreamReady => 2,
            ConnectionStatus::Abnormal => 3,
        }
    }
}

/// The narrow capability a publish pump needs from a protocol session.
///
/// Handshake, chunking and command messaging live behind this seam;
/// `timestamp_delta` is the tag's offset from the pass epoch, which the
/// session stamps onto whatever framing it speaks.
#[async_trait]
pub trait StreamSink: Send {
    fn connection_status(&self) -> ConnectionStatus;

    fn is_closed(&self) -> bool;

    async fn publish(&mut self, kind: TagKind, data: Bytes, timestamp_delta: u32) -> Result<()>;
}

/// Shared status cell: session callbacks write it, the pump loop reads it.
/// Clones share the same flags.
#[derive(Debug, Clone, Default)]
pub struct SessionStatus {
    inner: Arc<StatusCell>,
}

#[derive(Debug, Default)]
struct StatusCell {
    status: AtomicU8,
    closed: AtomicBool,
}

impl SessionStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_status(&self, status: ConnectionStatus) {
        self.inner.status.store(status.as_u8(), Ordering::SeqCst);
    }

    pub fn status(&self) -> ConnectionStatus {
        ConnectionStatus::from_u8(self.inner.status.load(Ordering::SeqCst))
    }

    pub fn mark_closed(&self) {
        self.inner.closed.store(true, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }
}
