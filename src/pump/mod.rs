//! # Timed Tag Pumps
//!
//! Moves tags between FLV resources and live sessions, in both directions:
//!
//! - [`Publisher`] replays an [`FlvSource`](crate::flv::FlvSource) onto a
//!   [`StreamSink`] at the rate implied by the embedded timestamps, looping
//!   the source when it runs out.
//! - [`Recorder`] appends live session messages to an
//!   [`FlvWriter`](crate::flv::FlvWriter).
//!
//! The protocol session itself (handshake, chunking, command messaging)
//! stays outside; the pumps see it only through the [`StreamSink`]
//! capability and the [`SessionStatus`] cell its callbacks write.

use crate::error::FlvError;
use thiserror::Error;

pub mod capture;
pub mod publish;
pub mod sink;

/// Why a publish run ended early. [`Publisher::run`] returns `Ok(())` only
/// when the duration budget is spent or the source has nothing to publish.
#[derive(Debug, Error)]
pub enum PumpError {
    /// The sink never reported the ready-to-publish status in time.
    #[error("timed out waiting for the sink to become ready")]
    ReadyTimeout,

    /// The session reported closure.
    #[error("sink connection is closed")]
    SinkClosed,

    /// The session left the ready-to-publish status.
    #[error("sink status is abnormal: {0:?}")]
    SinkAbnormal(ConnectionStatus),

    /// Reading from the tag source failed.
    #[error("tag source error: {0}")]
    Source(#[source] FlvError),

    /// The sink rejected a published tag.
    #[error("sink rejected tag: {0}")]
    Sink(#[source] FlvError),
}

pub use self::capture::{Recorder, RecorderHandle, SessionMessage};
pub use self::publish::{PublishConfig, Publisher};
pub use self::sink::{ConnectionStatus, SessionStatus, StreamSink};
