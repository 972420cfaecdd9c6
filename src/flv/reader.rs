use super::{FlvHeader, Tag, TagKind, FLV_SIGNATURE, HEADER_LEN, TAG_HEADER_LEN};
use crate::error::{FlvError, Result};
use bytes::Bytes;
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeek, AsyncSeekExt, BufReader};

/// Tag-level FLV decoder over any async byte stream.
#[derive(Debug)]
pub struct FlvReader<R: AsyncRead + Unpin + Send> {
    reader: BufReader<R>,
}

impl<R: AsyncRead + Unpin + Send> FlvReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
        }
    }

    /// Reads and validates the 13-byte preamble. Consumes the data-offset
    /// and leading previous-tag-size words without interpreting them.
    pub async fn read_header(&mut self) -> Result<FlvHeader> {
        let mut header = [0u8; HEADER_LEN];
        match self.reader.read_exact(&mut header).await {
            Ok(_) => {}
            Err(ref e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                return Err(FlvError::Format(
                    "stream ends inside the 13-byte header".to_string(),
                ));
            }
            Err(e) => return Err(FlvError::Io(e)),
        }

        if header[..3] != FLV_SIGNATURE {
            return Err(FlvError::Format(format!(
                "bad signature {:02x?}, expected \"FLV\"",
                &header[..3]
            )));
        }

        Ok(FlvHeader {
            version: header[3],
            flags: header[4],
        })
    }

    /// Reads the next tag. `Ok(None)` means the stream ended cleanly at a
    /// tag boundary; an EOF anywhere past the first byte is an I/O error.
    pub async fn read_tag(&mut self) -> Result<Option<Tag>> {
        let kind_byte = match self.reader.read_u8().await {
            Ok(b) => b,
            Err(ref e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
            Err(e) => return Err(FlvError::Io(e)),
        };

        let mut rest = [0u8; TAG_HEADER_LEN - 1];
        self.reader.read_exact(&mut rest).await?;

        let size = u32::from_be_bytes([0, rest[0], rest[1], rest[2]]) as usize;
        // 3 low-order bytes plus the extended byte that follows them on
        // the wire; combined as ext << 24 | low24, symmetric with the writer.
        let timestamp = u32::from_be_bytes([rest[6], rest[3], rest[4], rest[5]]);
        // rest[7..10] is the stream id, always zero and always ignored

        let mut data = vec![0u8; size];
        self.reader.read_exact(&mut data).await?;

        // previous-tag-size trailer, consumed but not validated
        self.reader.read_u32().await?;

        Ok(Some(Tag {
            kind: TagKind::from_byte(kind_byte),
            timestamp,
            data: Bytes::from(data),
        }))
    }
}

impl<R: AsyncRead + AsyncSeek + Unpin + Send> FlvReader<R> {
    /// Repositions to the first tag, immediately after the preamble.
    pub async fn rewind_to_body(&mut self) -> Result<()> {
        self.reader
            .seek(io::SeekFrom::Start(HEADER_LEN as u64))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flv::{FLAG_HAS_AUDIO, FLAG_HAS_VIDEO};
    use pretty_assertions::assert_eq;

    fn wire_header() -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(b"FLV");
        buf.push(1);
        buf.push(FLAG_HAS_AUDIO | FLAG_HAS_VIDEO);
        buf.extend_from_slice(&9u32.to_be_bytes());
        buf.extend_from_slice(&0u32.to_be_bytes());
        buf
    }

    fn wire_tag(kind: u8, timestamp: u32, payload: &[u8]) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.push(kind);
        buf.extend_from_slice(&(payload.len() as u32).to_be_bytes()[1..]);
        buf.extend_from_slice(&timestamp.to_be_bytes()[1..]);
        buf.push((timestamp >> 24) as u8);
        buf.extend_from_slice(&[0, 0, 0]);
        buf.extend_from_slice(payload);
        let prev = (TAG_HEADER_LEN + payload.len()) as u32;
        buf.extend_from_slice(&prev.to_be_bytes());
        buf
    }

    #[tokio::test]
    async fn test_read_header() {
        let data = wire_header();
        let mut reader = FlvReader::new(&data[..]);

        let header = reader.read_header().await.unwrap();
        assert_eq!(header.version, 1);
        assert!(header.has_audio());
        assert!(header.has_video());
    }

    #[tokio::test]
    async fn test_bad_signature_rejected() {
        let mut data = wire_header();
        data[0] = b'X';
        let mut reader = FlvReader::new(&data[..]);

        let err = reader.read_header().await.unwrap_err();
        assert!(matches!(err, FlvError::Format(_)));
    }

    #[tokio::test]
    async fn test_short_header_rejected() {
        let data = b"FLV\x01".to_vec();
        let mut reader = FlvReader::new(&data[..]);

        let err = reader.read_header().await.unwrap_err();
        assert!(matches!(err, FlvError::Format(_)));
    }

    #[tokio::test]
    async fn test_read_tag_sequence() {
        let mut data = Vec::new();
        data.extend_from_slice(&wire_tag(0x09, 0, b"keyframe"));
        data.extend_from_slice(&wire_tag(0x08, 23, b"adts"));
        let mut reader = FlvReader::new(&data[..]);

        let first = reader.read_tag().await.unwrap().unwrap();
        assert_eq!(first.kind, TagKind::Video);
        assert_eq!(first.timestamp, 0);
        assert_eq!(&first.data[..], b"keyframe");

        let second = reader.read_tag().await.unwrap().unwrap();
        assert_eq!(second.kind, TagKind::Audio);
        assert_eq!(second.timestamp, 23);
        assert_eq!(&second.data[..], b"adts");

        assert!(reader.read_tag().await.unwrap().is_none());
        // still None on repeated reads
        assert!(reader.read_tag().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_eof_inside_tag_header_is_error() {
        let data = vec![0x09u8, 0x00, 0x00]; // kind plus a truncated size field
        let mut reader = FlvReader::new(&data[..]);

        let err = reader.read_tag().await.unwrap_err();
        assert!(matches!(err, FlvError::Io(_)));
    }

    #[tokio::test]
    async fn test_declared_payload_longer_than_stream_is_error() {
        let mut data = wire_tag(0x09, 0, b"full payload bytes");
        data.truncate(TAG_HEADER_LEN + 4); // cut inside the payload
        let mut reader = FlvReader::new(&data[..]);

        let err = reader.read_tag().await.unwrap_err();
        assert!(matches!(err, FlvError::Io(_)));
    }

    #[tokio::test]
    async fn test_missing_trailer_is_error() {
        let mut data = wire_tag(0x08, 10, b"au");
        data.truncate(data.len() - 4);
        let mut reader = FlvReader::new(&data[..]);

        let err = reader.read_tag().await.unwrap_err();
        assert!(matches!(err, FlvError::Io(_)));
    }

    #[tokio::test]
    async fn test_trailer_value_not_validated() {
        let mut data = wire_tag(0x09, 0, b"v");
        let len = data.len();
        data[len - 1] = 0xff; // corrupt the previous-tag-size word
        data.extend_from_slice(&wire_tag(0x08, 5, b"a"));
        let mut reader = FlvReader::new(&data[..]);

        assert!(reader.read_tag().await.unwrap().is_some());
        let next = reader.read_tag().await.unwrap().unwrap();
        assert_eq!(next.kind, TagKind::Audio);
    }

    #[tokio::test]
    async fn test_extended_timestamp_byte_contributes_high_bits() {
        // hand-assembled: low24 = 0x000005, extended byte = 0x01
        let mut data = vec![0x09u8];
        data.extend_from_slice(&[0x00, 0x00, 0x01]); // size 1
        data.extend_from_slice(&[0x00, 0x00, 0x05]); // timestamp low 24
        data.push(0x01); // extended byte
        data.extend_from_slice(&[0x00, 0x00, 0x00]); // stream id
        data.push(0xaa); // payload
        data.extend_from_slice(&12u32.to_be_bytes());
        let mut reader = FlvReader::new(&data[..]);

        let tag = reader.read_tag().await.unwrap().unwrap();
        assert_eq!(tag.timestamp, 0x0100_0005);
    }

    #[tokio::test]
    async fn test_zero_extended_byte_leaves_low_bits() {
        let data = wire_tag(0x12, 0x00ab_cdef, b"meta");
        let mut reader = FlvReader::new(&data[..]);

        let tag = reader.read_tag().await.unwrap().unwrap();
        assert_eq!(tag.timestamp, 0x00ab_cdef);
    }

    #[tokio::test]
    async fn test_unknown_kind_passes_through() {
        let data = wire_tag(0x2a, 7, b"opaque");
        let mut reader = FlvReader::new(&data[..]);

        let tag = reader.read_tag().await.unwrap().unwrap();
        assert_eq!(tag.kind, TagKind::Other(0x2a));
    }

    #[tokio::test]
    async fn test_tag_reassembled_across_split_reads() {
        let tag_bytes = wire_tag(0x09, 40, b"split across polls");
        let mock = tokio_test::io::Builder::new()
            .read(&tag_bytes[..5])
            .read(&tag_bytes[5..13])
            .read(&tag_bytes[13..])
            .build();
        let mut reader = FlvReader::new(mock);

        let tag = reader.read_tag().await.unwrap().unwrap();
        assert_eq!(tag.kind, TagKind::Video);
        assert_eq!(tag.timestamp, 40);
        assert_eq!(&tag.data[..], b"split across polls");
    }

    #[tokio::test]
    async fn test_rewind_to_body() {
        let mut data = wire_header();
        data.extend_from_slice(&wire_tag(0x09, 0, b"first"));
        let mut reader = FlvReader::new(std::io::Cursor::new(data));

        reader.read_header().await.unwrap();
        let first = reader.read_tag().await.unwrap().unwrap();
        assert!(reader.read_tag().await.unwrap().is_none());

        reader.rewind_to_body().await.unwrap();
        let again = reader.read_tag().await.unwrap().unwrap();
        assert_eq!(again, first);
    }
}
