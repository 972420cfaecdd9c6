//! # FLV Container Support
//!
//! This module implements the FLV container layer used by the pumps:
//!
//! - Tag-level codec over async byte streams ([`FlvReader`], [`FlvWriter`])
//! - Restartable tag source with loop-back ([`FlvSource`])
//! - Arrival-timing probe for live FLV streams ([`StreamProbe`])
//!
//! Payloads are opaque byte spans; the codec never inspects audio or video
//! data, only the fixed tag framing around it.
//!
//! ## Example: Working with Tags
//!
//! ```rust
//! use flvio::flv::{Tag, TagKind};
//! use bytes::Bytes;
//!
//! let tag = Tag::new(TagKind::Video, 40, Bytes::from_static(b"frame"));
//! assert_eq!(tag.kind.as_byte(), 0x09);
//! assert_eq!(tag.timestamp, 40);
//! ```

use bytes::Bytes;

pub mod probe;
pub mod reader;
pub mod source;
pub mod writer;

// Container layout
pub const FLV_SIGNATURE: [u8; 3] = *b"FLV";
pub const HEADER_LEN: usize = 13;
pub const TAG_HEADER_LEN: usize = 11;
pub const TRAILER_LEN: usize = 4;
pub const MAX_TAG_PAYLOAD: usize = 0x00ff_ffff;

// Tag kind bytes
pub const TAG_KIND_AUDIO: u8 = 0x08;
pub const TAG_KIND_VIDEO: u8 = 0x09;
pub const TAG_KIND_SCRIPT_DATA: u8 = 0x12;

// Header type-flag bits
pub const FLAG_HAS_AUDIO: u8 = 0x04;
pub const FLAG_HAS_VIDEO: u8 = 0x01;

/// Tag discriminator byte. Unknown values pass through as [`TagKind::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagKind {
    Audio,
    Video,
    ScriptData,
    Other(u8),
}

impl TagKind {
    pub fn from_byte(b: u8) -> Self {
        match b {
            TAG_KIND_AUDIO => TagKind::Audio,
            TAG_KIND_VIDEO => TagKind::Video,
            TAG_KIND_SCRIPT_DATA => TagKind::ScriptData,
            other => TagKind::Other(other),
        }
    }

    pub fn as_byte(&self) -> u8 {
        match self {
            TagKind::Audio => TAG_KIND_AUDIO,
            TagKind::Video => TAG_KIND_VIDEO,
            TagKind::ScriptData => TAG_KIND_SCRIPT_DATA,
            TagKind::Other(b) => *b,
        }
    }
}

/// One container record: a kind byte, a millisecond timestamp, and an
/// opaque payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub kind: TagKind,
    /// Milliseconds, monotonic-ish within one pass of a container but not
    /// across loop-back.
    pub timestamp: u32,
    pub data: Bytes,
}

impl Tag {
    pub fn new(kind: TagKind, timestamp: u32, data: Bytes) -> Self {
        Self {
            kind,
            timestamp,
            data,
        }
    }
}

/// Decoded 13-byte preamble. The data-offset and leading previous-tag-size
/// words are consumed by the reader but carry no information here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlvHeader {
    pub version: u8,
    pub flags: u8,
}

impl FlvHeader {
    pub fn has_audio(&self) -> bool {
        self.flags & FLAG_HAS_AUDIO != 0
    }

    pub fn has_video(&self) -> bool {
        self.flags & FLAG_HAS_VIDEO != 0
    }
}

pub use self::probe::{StreamProbe, TagArrival};
pub use self::reader::FlvReader;
pub use self::source::FlvSource;
pub use self::writer::FlvWriter;
