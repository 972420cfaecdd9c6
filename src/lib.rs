#![doc(html_root_url = "https://docs.rs/flvio/0.1.0")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(rustdoc::missing_crate_level_docs)]

//! # flvio - FLV Tag I/O Toolkit
//!
//! `flvio` moves time-stamped FLV records between files and live streams,
//! in either direction, while preserving the original playback timing. It
//! provides the tag-level container codec, a restartable tag source with
//! loop-back, and the two real-time pumps built on them: a publish pacer
//! that replays a recorded stream at the rate implied by its timestamps,
//! and a capture recorder that appends live session messages to a file.
//!
//! The protocol session itself (handshake, chunking, command messaging)
//! stays outside this crate: the publish pump talks to it through the
//! narrow [`StreamSink`](pump::StreamSink) capability, and transports are
//! plain [`AsyncRead`](tokio::io::AsyncRead)/[`AsyncWrite`](tokio::io::AsyncWrite)
//! endpoints.
//!
//! ## Quick Start
//!
//! Add this to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! flvio = "0.1.0"
//! ```
//!
//! ### Reading a Container
//!
//! ```rust,no_run
//! use flvio::flv::FlvSource;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut source = FlvSource::open("clip.flv").await?;
//!     while let Some(tag) = source.read_tag().await? {
//!         println!("{:?} at {}ms: {} bytes", tag.kind, tag.timestamp, tag.data.len());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ### Publishing a File in Real Time
//!
//! ```rust,no_run
//! use async_trait::async_trait;
//! use bytes::Bytes;
//! use flvio::flv::{FlvSource, TagKind};
//! use flvio::pump::{ConnectionStatus, Publisher, StreamSink};
//!
//! struct PrintSink;
//!
//! #[async_trait]
//! impl StreamSink for PrintSink {
//!     fn connection_status(&self) -> ConnectionStatus {
//!         ConnectionStatus::StreamReady
//!     }
//!
//!     fn is_closed(&self) -> bool {
//!         false
//!     }
//!
//!     async fn publish(
//!         &mut self,
//!         kind: TagKind,
//!         data: Bytes,
//!         timestamp_delta: u32,
//!     ) -> flvio::Result<()> {
//!         println!("{:?}: {} bytes at +{}ms", kind, data.len(), timestamp_delta);
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let source = FlvSource::open("clip.flv").await?;
//!     let mut publisher = Publisher::new(source, PrintSink);
//!     publisher.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! ### Capturing a Live Session
//!
//! ```rust,no_run
//! use bytes::Bytes;
//! use flvio::flv::FlvWriter;
//! use flvio::pump::{Recorder, SessionMessage};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let writer = FlvWriter::create("capture.flv").await?;
//!     let (recorder, handle) = Recorder::new(writer);
//!     let run = tokio::spawn(recorder.run());
//!
//!     // session callbacks feed the handle from their own tasks
//!     handle
//!         .deliver(SessionMessage::Video {
//!             data: Bytes::from_static(b"frame"),
//!             timestamp: 0,
//!         })
//!         .await?;
//!     handle.stop().await;
//!
//!     let writer = run.await??;
//!     println!("captured {} tags, {}ms", writer.tags_written(), writer.duration_ms());
//!     Ok(())
//! }
//! ```
//!
//! ## Module Overview
//!
//! - `flv`: the container layer
//!   - Tag codec over async byte streams
//!   - Restartable source with loop-back
//!   - Arrival-timing probe for live streams
//!
//! - `pump`: the real-time pumps
//!   - Publish pacer with readiness, timeout, and bounded-sleep handling
//!   - Capture recorder fed by session callbacks
//!   - The stream-sink seam and shared session status cell
//!
//! - `error`: error types and the crate `Result` alias

/// Error types and utilities
pub mod error;

/// FLV container support: codec, sources, probes
pub mod flv;

/// Real-time publish and capture pumps
pub mod pump;

pub use error::{FlvError, Result};

// Re-export the tag types for convenience
pub use flv::{Tag, TagKind};
