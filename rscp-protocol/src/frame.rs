use alloc::vec::Vec;
use core::fmt::Display;

use log::{debug, error, trace};
use zerocopy::byteorder::little_endian::{I32, I64, U16};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::tags::Tag;
use crate::value::{self, Payload, Timestamp, Value, ValueError};

/// Size of the frame header in bytes
pub const HEADER_LEN: usize = 18;
/// Size of the trailing checksum in bytes
pub const CRC_LEN: usize = 4;
/// The largest payload the 16 bit length field can describe
pub const MAX_PAYLOAD_LEN: usize = u16::MAX as usize;
/// The largest frame the device can send
pub const MAX_FRAME_LEN: usize = HEADER_LEN + MAX_PAYLOAD_LEN + CRC_LEN;

/// Errors that make a received frame unusable
///
/// All of these are fatal for the connection: the transport has no way to
/// resynchronize once a frame is corrupt.
#[derive(Debug, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum FrameError {
    #[error("bad magic 0x{0:04X}")]
    BadMagic(u16),
    #[error("unsupported protocol version {0}")]
    UnsupportedVersion(u8),
    #[error("checksum mismatch, frame carries 0x{expected:08X}, computed 0x{computed:08X}")]
    ChecksumMismatch { expected: u32, computed: u32 },
    #[error("payload of {0} bytes exceeds the frame length field")]
    PayloadTooLarge(usize),
    #[error("undecodable payload: {0}")]
    Value(#[from] ValueError),
}

/// `CTRL` field of the frame header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ctrl(u16);
impl Ctrl {
    /// Protocol version this library implements
    pub const VERSION: u8 = 0x01;
    const VERSION_MASK: u16 = 0x000F;
    const CRC_FLAG: u16 = 0x0010;

    pub fn new(with_checksum: bool) -> Self {
        let crc = if with_checksum { Self::CRC_FLAG } else { 0 };
        Ctrl(Self::VERSION as u16 | crc)
    }
    pub fn version(&self) -> u8 {
        (self.0 & Self::VERSION_MASK) as u8
    }
    pub fn has_checksum(&self) -> bool {
        self.0 & Self::CRC_FLAG != 0
    }
}
impl Display for Ctrl {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "v{} crc={}", self.version(), self.has_checksum())
    }
}

/// Frame header as laid out on the wire
#[derive(Debug, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
struct FrameHeader {
    magic: U16,
    ctrl: U16,
    seconds: I64,
    nanoseconds: I32,
    length: U16,
}
impl FrameHeader {
    const MAGIC: u16 = 0xE3DC;
}

/// A protocol frame
///
/// The frame body is the content of the synthetic root container: the root
/// itself (tag `0`) never goes on the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Time the sender created the frame
    pub timestamp: Timestamp,
    /// Top level values in wire order
    pub values: Vec<Value>,
}

/// Result of [parse_frame]
#[derive(Debug, PartialEq)]
pub enum Parsed {
    /// A whole frame was decoded from the first `consumed` bytes
    Complete { frame: Frame, consumed: usize },
    /// More bytes are needed, this is not an error
    Incomplete,
}

impl Frame {
    pub fn new(timestamp: Timestamp, values: Vec<Value>) -> Frame {
        Frame { timestamp, values }
    }
    /// Take the values of a root container
    ///
    /// Values of any other type become the single top level value.
    pub fn from_root(timestamp: Timestamp, root: Value) -> Frame {
        let values = match root.payload {
            Payload::Container(children) if root.tag == Tag::ROOT => children,
            _ => alloc::vec![root],
        };
        Frame { timestamp, values }
    }
    /// Construct a fully assembled frame
    pub fn encode(&self, with_checksum: bool) -> Result<Vec<u8>, FrameError> {
        let payload_len = self.values.iter().map(Value::encoded_len).sum();
        let mut payload = Vec::with_capacity(payload_len);
        for value in &self.values {
            value.encode(&mut payload)?;
        }
        encode_frame(&payload, self.timestamp, with_checksum)
    }
}

/// Wrap an encoded root payload into a frame
///
/// Returns [FrameError::PayloadTooLarge] when the payload doesn't fit the
/// 16 bit length field.
pub fn encode_frame(
    payload: &[u8],
    timestamp: Timestamp,
    with_checksum: bool,
) -> Result<Vec<u8>, FrameError> {
    if payload.len() > MAX_PAYLOAD_LEN {
        return Err(FrameError::PayloadTooLarge(payload.len()));
    }
    let header = FrameHeader {
        magic: U16::new(FrameHeader::MAGIC),
        ctrl: U16::new(Ctrl::new(with_checksum).0),
        seconds: I64::new(timestamp.seconds),
        nanoseconds: I32::new(timestamp.nanoseconds),
        length: U16::new(payload.len() as u16),
    };
    let mut out = Vec::with_capacity(HEADER_LEN + payload.len() + CRC_LEN);
    out.extend_from_slice(header.as_bytes());
    out.extend_from_slice(payload);
    if with_checksum {
        let crc = crc32fast::hash(&out);
        out.extend_from_slice(&crc.to_le_bytes());
    }
    trace!("Encoded frame of {} bytes", out.len());
    Ok(out)
}

/// Parse one frame from the start of `bytes`
///
/// Trailing bytes (block padding, the start of the next frame) are left
/// alone; call again with `&bytes[consumed..]` to get the next frame.
pub fn parse_frame(bytes: &[u8]) -> Result<Parsed, FrameError> {
    let Ok((header, rest)) = FrameHeader::ref_from_prefix(bytes) else {
        return Ok(Parsed::Incomplete);
    };
    if header.magic.get() != FrameHeader::MAGIC {
        error!("Received frame with bad magic 0x{:04X}", header.magic.get());
        return Err(FrameError::BadMagic(header.magic.get()));
    }
    let ctrl = Ctrl(header.ctrl.get());
    if ctrl.version() != Ctrl::VERSION {
        return Err(FrameError::UnsupportedVersion(ctrl.version()));
    }
    let length = header.length.get() as usize;
    let crc_len = if ctrl.has_checksum() { CRC_LEN } else { 0 };
    if rest.len() < length + crc_len {
        trace!(
            "Frame incomplete, {} of {} bytes",
            HEADER_LEN + rest.len(),
            HEADER_LEN + length + crc_len
        );
        return Ok(Parsed::Incomplete);
    }
    debug!("Decoded frame header {ctrl}, payload length {length}");

    if ctrl.has_checksum() {
        let covered = &bytes[..HEADER_LEN + length];
        let mut expected = [0u8; CRC_LEN];
        expected.copy_from_slice(&rest[length..length + CRC_LEN]);
        let expected = u32::from_le_bytes(expected);
        let computed = crc32fast::hash(covered);
        if expected != computed {
            error!("Frame checksum mismatch 0x{expected:08X} != 0x{computed:08X}");
            return Err(FrameError::ChecksumMismatch { expected, computed });
        }
    }

    let values = value::decode_all(&rest[..length])?;
    let frame = Frame {
        timestamp: Timestamp {
            seconds: header.seconds.get(),
            nanoseconds: header.nanoseconds.get(),
        },
        values,
    };
    Ok(Parsed::Complete {
        frame,
        consumed: HEADER_LEN + length + crc_len,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tags;
    use crate::value::ContainerBuilder;
    use alloc::vec;
    use crate::init_logger;

    fn sample_frame() -> Frame {
        let mut auth = ContainerBuilder::new(tags::RSCP_REQ_AUTHENTICATION);
        auth.append(tags::RSCP_AUTHENTICATION_USER, "user@example.com")
            .append(tags::RSCP_AUTHENTICATION_PASSWORD, "hunter2");
        Frame::new(Timestamp::from_seconds(1_700_000_000), vec![auth.build()])
    }

    #[test]
    fn test_header_layout() {
        let encoded = encode_frame(&[], Timestamp::default(), false).unwrap();
        assert_eq!(
            encoded,
            [
                0xDC, 0xE3, // magic
                0x01, 0x00, // ctrl: version 1, no crc
                0, 0, 0, 0, 0, 0, 0, 0, // seconds
                0, 0, 0, 0, // nanoseconds
                0, 0, // length
            ]
        );
        let encoded = encode_frame(&[0xAA], Timestamp::default(), true).unwrap();
        assert_eq!(encoded.len(), HEADER_LEN + 1 + CRC_LEN);
        assert_eq!(encoded[2], 0x11);
        assert_eq!(encoded[16..18], [1, 0]);
    }
    #[test]
    fn test_parse_encoded_frame() {
        init_logger();
        let frame = sample_frame();
        for with_checksum in [true, false] {
            let bytes = frame.encode(with_checksum).unwrap();
            let Parsed::Complete { frame: parsed, consumed } = parse_frame(&bytes).unwrap() else {
                panic!("Expected a complete frame");
            };
            assert_eq!(consumed, bytes.len());
            assert_eq!(parsed, frame);
        }
    }
    #[test]
    fn test_incomplete_until_last_byte() {
        let bytes = sample_frame().encode(true).unwrap();
        for len in 0..bytes.len() {
            assert_eq!(parse_frame(&bytes[..len]), Ok(Parsed::Incomplete), "len {len}");
        }
        assert!(matches!(parse_frame(&bytes), Ok(Parsed::Complete { .. })));
    }
    #[test]
    fn test_frame_followed_by_partial_header() {
        let first = sample_frame().encode(true).unwrap();
        let second = sample_frame().encode(true).unwrap();
        let mut buf = first.clone();
        buf.extend_from_slice(&second[..5]);

        let Parsed::Complete { consumed, .. } = parse_frame(&buf).unwrap() else {
            panic!("Expected a complete frame");
        };
        assert_eq!(consumed, first.len());
        assert_eq!(buf.len() - consumed, 5);
        assert_eq!(parse_frame(&buf[consumed..]), Ok(Parsed::Incomplete));
    }
    #[test]
    fn test_repeated_parse_over_one_buffer() {
        let mut buf = Vec::new();
        for seconds in 0..3 {
            let mut frame = sample_frame();
            frame.timestamp = Timestamp::from_seconds(seconds);
            buf.extend(frame.encode(true).unwrap());
        }
        let mut rest = buf.as_slice();
        let mut seen = Vec::new();
        while let Parsed::Complete { frame, consumed } = parse_frame(rest).unwrap() {
            seen.push(frame.timestamp.seconds);
            rest = &rest[consumed..];
        }
        assert_eq!(seen, [0, 1, 2]);
        assert!(rest.is_empty());
    }
    #[test]
    fn test_altered_payload_is_rejected() {
        init_logger();
        let mut bytes = sample_frame().encode(true).unwrap();
        bytes[HEADER_LEN + 10] ^= 0x01;
        assert!(matches!(
            parse_frame(&bytes),
            Err(FrameError::ChecksumMismatch { .. })
        ));
    }
    #[test]
    fn test_bad_magic_and_version() {
        let mut bytes = sample_frame().encode(true).unwrap();
        bytes[0] = 0x00;
        assert_eq!(parse_frame(&bytes), Err(FrameError::BadMagic(0xE300)));

        let mut bytes = sample_frame().encode(true).unwrap();
        bytes[2] = 0x12;
        assert_eq!(parse_frame(&bytes), Err(FrameError::UnsupportedVersion(2)));
    }
    #[test]
    fn test_undecodable_payload_is_corrupt() {
        // A value header claiming more bytes than the frame holds
        let payload = [0x01, 0x00, 0x80, 0x01, 0x06, 0x10, 0x00];
        let bytes = encode_frame(&payload, Timestamp::default(), true).unwrap();
        assert!(matches!(
            parse_frame(&bytes),
            Err(FrameError::Value(ValueError::Truncated { .. }))
        ));
    }
    #[test]
    fn test_root_container_is_unwrapped() {
        let mut root = ContainerBuilder::new(Tag::ROOT);
        root.append_value(Value::request(tags::EMS_REQ_POWER_PV))
            .append_value(Value::request(tags::EMS_REQ_POWER_HOME));
        let frame = Frame::from_root(Timestamp::default(), root.build());
        assert_eq!(frame.values.len(), 2);
        assert_eq!(frame.values[0].tag, tags::EMS_REQ_POWER_PV);
    }
    #[test]
    fn test_payload_too_large() {
        let payload = vec![0u8; MAX_PAYLOAD_LEN + 1];
        assert_eq!(
            encode_frame(&payload, Timestamp::default(), true),
            Err(FrameError::PayloadTooLarge(MAX_PAYLOAD_LEN + 1))
        );
    }
}
