//! Tagged value tree
//!
//! Every RSCP value is encoded as a 7 byte header (`tag`, `type`, `length`,
//! all little endian) followed by `length` bytes of payload. Containers carry
//! the concatenated encodings of their children, so a container's encoded
//! length is the sum of its children's encoded lengths plus its own header.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::Display;

use log::{trace, warn};
use zerocopy::byteorder::little_endian::{U16, U32};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::tags::Tag;

/// Size of an encoded value header in bytes
pub const VALUE_HEADER_LEN: usize = 7;
/// Maximum container nesting accepted while decoding
pub const MAX_DEPTH: usize = 32;

/// Errors encountered while encoding or decoding values
#[derive(Debug, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum ValueError {
    /// Fewer bytes than a value header remain
    #[error("value header truncated, {available} bytes available")]
    TruncatedHeader { available: usize },
    /// The declared length exceeds the remaining bytes
    #[error("value {tag} declares {declared} bytes but only {available} remain")]
    Truncated {
        tag: Tag,
        declared: usize,
        available: usize,
    },
    /// A fixed width type with a length that doesn't match its width
    #[error("value {tag} of type {data_type} has invalid length {length}")]
    InvalidLength {
        tag: Tag,
        data_type: DataType,
        length: usize,
    },
    /// Payload is larger than the 16 bit length field
    #[error("value {tag} is {length} bytes long, which can't be encoded")]
    TooLong { tag: Tag, length: usize },
    #[error("containers nested deeper than {max} levels")]
    TooDeep { max: usize },
    /// The value doesn't hold the requested type
    #[error("value {tag} holds type 0x{found:02X}, expected {expected}")]
    TypeMismatch {
        tag: Tag,
        expected: &'static str,
        found: u8,
    },
}

/// Primitive kind of a value as encoded on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DataType {
    None = 0x00,
    Bool = 0x01,
    Char8 = 0x02,
    UChar8 = 0x03,
    Int16 = 0x04,
    UInt16 = 0x05,
    Int32 = 0x06,
    UInt32 = 0x07,
    Int64 = 0x08,
    UInt64 = 0x09,
    Float32 = 0x0A,
    Double64 = 0x0B,
    Bitfield = 0x0C,
    String = 0x0D,
    Container = 0x0E,
    Timestamp = 0x0F,
    ByteArray = 0x10,
    Error = 0xFF,
}
impl DataType {
    pub fn from_u8(value: u8) -> Option<DataType> {
        let data_type = match value {
            0x00 => DataType::None,
            0x01 => DataType::Bool,
            0x02 => DataType::Char8,
            0x03 => DataType::UChar8,
            0x04 => DataType::Int16,
            0x05 => DataType::UInt16,
            0x06 => DataType::Int32,
            0x07 => DataType::UInt32,
            0x08 => DataType::Int64,
            0x09 => DataType::UInt64,
            0x0A => DataType::Float32,
            0x0B => DataType::Double64,
            0x0C => DataType::Bitfield,
            0x0D => DataType::String,
            0x0E => DataType::Container,
            0x0F => DataType::Timestamp,
            0x10 => DataType::ByteArray,
            0xFF => DataType::Error,
            _ => return None,
        };
        Some(data_type)
    }
    /// Payload width of fixed size types
    fn fixed_len(self) -> Option<usize> {
        match self {
            DataType::None => Some(0),
            DataType::Bool | DataType::Char8 | DataType::UChar8 => Some(1),
            DataType::Int16 | DataType::UInt16 => Some(2),
            DataType::Int32 | DataType::UInt32 | DataType::Float32 | DataType::Error => Some(4),
            DataType::Int64 | DataType::UInt64 | DataType::Double64 => Some(8),
            DataType::Timestamp => Some(Timestamp::LEN),
            DataType::Bitfield
            | DataType::String
            | DataType::Container
            | DataType::ByteArray => None,
        }
    }
}
impl Display for DataType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Point in time with nanosecond resolution
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp {
    pub seconds: i64,
    pub nanoseconds: i32,
}
impl Timestamp {
    /// Encoded size in bytes
    pub const LEN: usize = 12;

    pub const fn from_seconds(seconds: i64) -> Self {
        Timestamp {
            seconds,
            nanoseconds: 0,
        }
    }
    fn to_bytes(self) -> [u8; Self::LEN] {
        let mut out = [0u8; Self::LEN];
        out[..8].copy_from_slice(&self.seconds.to_le_bytes());
        out[8..].copy_from_slice(&self.nanoseconds.to_le_bytes());
        out
    }
    fn from_bytes(bytes: [u8; Self::LEN]) -> Self {
        let mut seconds = [0u8; 8];
        let mut nanoseconds = [0u8; 4];
        seconds.copy_from_slice(&bytes[..8]);
        nanoseconds.copy_from_slice(&bytes[8..]);
        Timestamp {
            seconds: i64::from_le_bytes(seconds),
            nanoseconds: i32::from_le_bytes(nanoseconds),
        }
    }
}

/// Error code reported by the device in an error typed value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    NotHandled,
    AccessDenied,
    Format,
    Again,
    OutOfBounds,
    NotAvailable,
    UnknownTag,
    AlreadyInUse,
    Other(u32),
}
impl From<u32> for ErrorCode {
    fn from(value: u32) -> Self {
        match value {
            1 => ErrorCode::NotHandled,
            2 => ErrorCode::AccessDenied,
            3 => ErrorCode::Format,
            4 => ErrorCode::Again,
            5 => ErrorCode::OutOfBounds,
            6 => ErrorCode::NotAvailable,
            7 => ErrorCode::UnknownTag,
            8 => ErrorCode::AlreadyInUse,
            other => ErrorCode::Other(other),
        }
    }
}
impl From<ErrorCode> for u32 {
    fn from(value: ErrorCode) -> Self {
        match value {
            ErrorCode::NotHandled => 1,
            ErrorCode::AccessDenied => 2,
            ErrorCode::Format => 3,
            ErrorCode::Again => 4,
            ErrorCode::OutOfBounds => 5,
            ErrorCode::NotAvailable => 6,
            ErrorCode::UnknownTag => 7,
            ErrorCode::AlreadyInUse => 8,
            ErrorCode::Other(other) => other,
        }
    }
}
impl Display for ErrorCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ErrorCode::Other(code) => write!(f, "error {code}"),
            known => write!(f, "{known:?} ({})", u32::from(*known)),
        }
    }
}

/// Decoded payload of a value
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    None,
    Bool(bool),
    Char8(i8),
    UChar8(u8),
    Int16(i16),
    UInt16(u16),
    Int32(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
    Float32(f32),
    Double64(f64),
    Bitfield(Vec<u8>),
    String(String),
    Container(Vec<Value>),
    Timestamp(Timestamp),
    ByteArray(Vec<u8>),
    Error(ErrorCode),
    /// A data type this library doesn't know, kept as is
    Raw { data_type: u8, bytes: Vec<u8> },
}

impl Payload {
    /// The wire type byte of this payload
    pub fn data_type(&self) -> u8 {
        let data_type = match self {
            Payload::None => DataType::None,
            Payload::Bool(_) => DataType::Bool,
            Payload::Char8(_) => DataType::Char8,
            Payload::UChar8(_) => DataType::UChar8,
            Payload::Int16(_) => DataType::Int16,
            Payload::UInt16(_) => DataType::UInt16,
            Payload::Int32(_) => DataType::Int32,
            Payload::UInt32(_) => DataType::UInt32,
            Payload::Int64(_) => DataType::Int64,
            Payload::UInt64(_) => DataType::UInt64,
            Payload::Float32(_) => DataType::Float32,
            Payload::Double64(_) => DataType::Double64,
            Payload::Bitfield(_) => DataType::Bitfield,
            Payload::String(_) => DataType::String,
            Payload::Container(_) => DataType::Container,
            Payload::Timestamp(_) => DataType::Timestamp,
            Payload::ByteArray(_) => DataType::ByteArray,
            Payload::Error(_) => DataType::Error,
            Payload::Raw { data_type, .. } => return *data_type,
        };
        data_type as u8
    }
    fn payload_len(&self) -> usize {
        match self {
            Payload::Bitfield(bytes) | Payload::ByteArray(bytes) => bytes.len(),
            Payload::Raw { bytes, .. } => bytes.len(),
            Payload::String(s) => s.len(),
            Payload::Container(children) => children.iter().map(Value::encoded_len).sum(),
            fixed => DataType::from_u8(fixed.data_type())
                .and_then(DataType::fixed_len)
                .unwrap_or_default(),
        }
    }
    fn encode(&self, out: &mut Vec<u8>) -> Result<(), ValueError> {
        match self {
            Payload::None => {}
            Payload::Bool(v) => out.push(*v as u8),
            Payload::Char8(v) => out.extend_from_slice(&v.to_le_bytes()),
            Payload::UChar8(v) => out.push(*v),
            Payload::Int16(v) => out.extend_from_slice(&v.to_le_bytes()),
            Payload::UInt16(v) => out.extend_from_slice(&v.to_le_bytes()),
            Payload::Int32(v) => out.extend_from_slice(&v.to_le_bytes()),
            Payload::UInt32(v) => out.extend_from_slice(&v.to_le_bytes()),
            Payload::Int64(v) => out.extend_from_slice(&v.to_le_bytes()),
            Payload::UInt64(v) => out.extend_from_slice(&v.to_le_bytes()),
            Payload::Float32(v) => out.extend_from_slice(&v.to_le_bytes()),
            Payload::Double64(v) => out.extend_from_slice(&v.to_le_bytes()),
            Payload::Bitfield(bytes) | Payload::ByteArray(bytes) => out.extend_from_slice(bytes),
            Payload::Raw { bytes, .. } => out.extend_from_slice(bytes),
            Payload::String(s) => out.extend_from_slice(s.as_bytes()),
            Payload::Container(children) => {
                for child in children {
                    child.encode(out)?;
                }
            }
            Payload::Timestamp(ts) => out.extend_from_slice(&ts.to_bytes()),
            Payload::Error(code) => out.extend_from_slice(&u32::from(*code).to_le_bytes()),
        }
        Ok(())
    }
    fn decode(tag: Tag, data_type: u8, bytes: &[u8], depth: usize) -> Result<Payload, ValueError> {
        let Some(known) = DataType::from_u8(data_type) else {
            trace!("Keeping value {tag} of unknown type 0x{data_type:02X} as raw bytes");
            return Ok(Payload::Raw {
                data_type,
                bytes: bytes.to_vec(),
            });
        };
        if let Some(width) = known.fixed_len() {
            if bytes.len() != width {
                return Err(ValueError::InvalidLength {
                    tag,
                    data_type: known,
                    length: bytes.len(),
                });
            }
        }
        // Widths were checked above, so the conversions below can't fail
        let array = |bytes: &[u8]| -> [u8; 8] {
            let mut out = [0u8; 8];
            out[..bytes.len()].copy_from_slice(bytes);
            out
        };
        let b = array(&bytes[..bytes.len().min(8)]);
        let payload = match known {
            DataType::None => Payload::None,
            DataType::Bool => Payload::Bool(b[0] != 0),
            DataType::Char8 => Payload::Char8(b[0] as i8),
            DataType::UChar8 => Payload::UChar8(b[0]),
            DataType::Int16 => Payload::Int16(i16::from_le_bytes([b[0], b[1]])),
            DataType::UInt16 => Payload::UInt16(u16::from_le_bytes([b[0], b[1]])),
            DataType::Int32 => Payload::Int32(i32::from_le_bytes([b[0], b[1], b[2], b[3]])),
            DataType::UInt32 => Payload::UInt32(u32::from_le_bytes([b[0], b[1], b[2], b[3]])),
            DataType::Int64 => Payload::Int64(i64::from_le_bytes(b)),
            DataType::UInt64 => Payload::UInt64(u64::from_le_bytes(b)),
            DataType::Float32 => Payload::Float32(f32::from_le_bytes([b[0], b[1], b[2], b[3]])),
            DataType::Double64 => Payload::Double64(f64::from_le_bytes(b)),
            DataType::Error => {
                Payload::Error(u32::from_le_bytes([b[0], b[1], b[2], b[3]]).into())
            }
            DataType::Timestamp => {
                let mut ts = [0u8; Timestamp::LEN];
                ts.copy_from_slice(bytes);
                Payload::Timestamp(Timestamp::from_bytes(ts))
            }
            DataType::Bitfield => Payload::Bitfield(bytes.to_vec()),
            DataType::ByteArray => Payload::ByteArray(bytes.to_vec()),
            DataType::String => match core::str::from_utf8(bytes) {
                Ok(s) => Payload::String(String::from(s)),
                Err(_) => {
                    warn!("String {tag} is not valid UTF-8, keeping the raw bytes");
                    Payload::Raw {
                        data_type,
                        bytes: bytes.to_vec(),
                    }
                }
            },
            DataType::Container => {
                if depth >= MAX_DEPTH {
                    return Err(ValueError::TooDeep { max: MAX_DEPTH });
                }
                Payload::Container(decode_children(bytes, depth + 1)?)
            }
        };
        Ok(payload)
    }
}

macro_rules! payload_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Payload {
                fn from(value: $ty) -> Self {
                    Payload::$variant(value)
                }
            }
        )*
    };
}
payload_from! {
    bool => Bool,
    i8 => Char8,
    u8 => UChar8,
    i16 => Int16,
    u16 => UInt16,
    i32 => Int32,
    u32 => UInt32,
    i64 => Int64,
    u64 => UInt64,
    f32 => Float32,
    f64 => Double64,
    String => String,
    Timestamp => Timestamp,
    Vec<u8> => ByteArray,
    ErrorCode => Error,
}
impl From<&str> for Payload {
    fn from(value: &str) -> Self {
        Payload::String(value.into())
    }
}
impl From<()> for Payload {
    fn from(_: ()) -> Self {
        Payload::None
    }
}

impl Payload {
    /// Integer payloads widened to `i64`, `None` for anything else
    pub fn integer(&self) -> Option<i64> {
        match *self {
            Payload::Char8(v) => Some(v as i64),
            Payload::UChar8(v) => Some(v as i64),
            Payload::Int16(v) => Some(v as i64),
            Payload::UInt16(v) => Some(v as i64),
            Payload::Int32(v) => Some(v as i64),
            Payload::UInt32(v) => Some(v as i64),
            Payload::Int64(v) => Some(v),
            Payload::UInt64(v) => i64::try_from(v).ok(),
            _ => None,
        }
    }
}

impl Display for Payload {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Payload::None => write!(f, "-"),
            Payload::Bool(v) => write!(f, "{v}"),
            Payload::Char8(v) => write!(f, "{v}"),
            Payload::UChar8(v) => write!(f, "{v}"),
            Payload::Int16(v) => write!(f, "{v}"),
            Payload::UInt16(v) => write!(f, "{v}"),
            Payload::Int32(v) => write!(f, "{v}"),
            Payload::UInt32(v) => write!(f, "{v}"),
            Payload::Int64(v) => write!(f, "{v}"),
            Payload::UInt64(v) => write!(f, "{v}"),
            Payload::Float32(v) => write!(f, "{v:.2}"),
            Payload::Double64(v) => write!(f, "{v:.2}"),
            Payload::String(v) => write!(f, "{v}"),
            Payload::Timestamp(ts) => write!(f, "{}.{:09}", ts.seconds, ts.nanoseconds),
            Payload::Bitfield(bytes) | Payload::ByteArray(bytes) => {
                for b in bytes {
                    write!(f, "{b:02X}")?;
                }
                Ok(())
            }
            Payload::Container(children) => write!(f, "<{} values>", children.len()),
            Payload::Error(code) => write!(f, "{code}"),
            Payload::Raw { data_type, bytes } => {
                write!(f, "<type 0x{data_type:02X}, {} bytes>", bytes.len())
            }
        }
    }
}

/// Encoded value header
#[derive(Debug, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
struct ValueHeader {
    tag: U32,
    data_type: u8,
    length: U16,
}

/// A tagged value
#[derive(Debug, Clone, PartialEq)]
pub struct Value {
    pub tag: Tag,
    pub payload: Payload,
}

impl Value {
    pub fn new(tag: Tag, payload: impl Into<Payload>) -> Self {
        Value {
            tag,
            payload: payload.into(),
        }
    }
    /// A `None` typed value, the usual form of a request
    pub fn request(tag: Tag) -> Self {
        Value::new(tag, Payload::None)
    }
    /// Size of this value including its header once encoded
    pub fn encoded_len(&self) -> usize {
        VALUE_HEADER_LEN + self.payload.payload_len()
    }
    /// Append the encoded value to `out`
    ///
    /// Returns [ValueError::TooLong] when this value or one of its children
    /// doesn't fit the 16 bit length field.
    pub fn encode(&self, out: &mut Vec<u8>) -> Result<(), ValueError> {
        let length = self.payload.payload_len();
        if length > u16::MAX as usize {
            return Err(ValueError::TooLong {
                tag: self.tag,
                length,
            });
        }
        let header = ValueHeader {
            tag: U32::new(self.tag.0),
            data_type: self.payload.data_type(),
            length: U16::new(length as u16),
        };
        let start = out.len();
        out.extend_from_slice(header.as_bytes());
        if let Err(e) = self.payload.encode(out) {
            out.truncate(start);
            return Err(e);
        }
        Ok(())
    }
    /// Decode one value from the start of `bytes`
    ///
    /// Returns the value and the number of bytes it occupied.
    pub fn decode(bytes: &[u8]) -> Result<(Value, usize), ValueError> {
        Self::decode_at_depth(bytes, 0)
    }
    fn decode_at_depth(bytes: &[u8], depth: usize) -> Result<(Value, usize), ValueError> {
        let (header, rest) =
            ValueHeader::read_from_prefix(bytes).map_err(|_| ValueError::TruncatedHeader {
                available: bytes.len(),
            })?;
        let tag = Tag(header.tag.get());
        let declared = header.length.get() as usize;
        let Some(data) = rest.get(..declared) else {
            return Err(ValueError::Truncated {
                tag,
                declared,
                available: rest.len(),
            });
        };
        let payload = Payload::decode(tag, header.data_type, data, depth)?;
        Ok((Value { tag, payload }, VALUE_HEADER_LEN + declared))
    }

    pub fn data_type(&self) -> u8 {
        self.payload.data_type()
    }
    /// Whether the device answered this tag with an error
    pub fn is_error(&self) -> bool {
        matches!(self.payload, Payload::Error(_))
    }
    pub fn error_code(&self) -> Option<ErrorCode> {
        match self.payload {
            Payload::Error(code) => Some(code),
            _ => None,
        }
    }
    fn mismatch(&self, expected: &'static str) -> ValueError {
        ValueError::TypeMismatch {
            tag: self.tag,
            expected,
            found: self.data_type(),
        }
    }
    pub fn as_bool(&self) -> Result<bool, ValueError> {
        match self.payload {
            Payload::Bool(v) => Ok(v),
            _ => Err(self.mismatch("bool")),
        }
    }
    /// Any unsigned or non-negative signed integer, widened to `u64`
    pub fn as_u64(&self) -> Result<u64, ValueError> {
        let value = match self.payload {
            Payload::UChar8(v) => v as u64,
            Payload::UInt16(v) => v as u64,
            Payload::UInt32(v) => v as u64,
            Payload::UInt64(v) => v,
            Payload::Char8(v) => u64::try_from(v).map_err(|_| self.mismatch("unsigned integer"))?,
            Payload::Int16(v) => u64::try_from(v).map_err(|_| self.mismatch("unsigned integer"))?,
            Payload::Int32(v) => u64::try_from(v).map_err(|_| self.mismatch("unsigned integer"))?,
            Payload::Int64(v) => u64::try_from(v).map_err(|_| self.mismatch("unsigned integer"))?,
            _ => return Err(self.mismatch("unsigned integer")),
        };
        Ok(value)
    }
    /// Any integer that fits an `i64`
    pub fn as_i64(&self) -> Result<i64, ValueError> {
        let value = match self.payload {
            Payload::Char8(v) => v as i64,
            Payload::Int16(v) => v as i64,
            Payload::Int32(v) => v as i64,
            Payload::Int64(v) => v,
            Payload::UChar8(v) => v as i64,
            Payload::UInt16(v) => v as i64,
            Payload::UInt32(v) => v as i64,
            Payload::UInt64(v) => i64::try_from(v).map_err(|_| self.mismatch("integer"))?,
            _ => return Err(self.mismatch("integer")),
        };
        Ok(value)
    }
    /// Any number, converted to `f64`
    pub fn as_f64(&self) -> Result<f64, ValueError> {
        match self.payload {
            Payload::Float32(v) => Ok(v as f64),
            Payload::Double64(v) => Ok(v),
            _ => self
                .as_i64()
                .map(|v| v as f64)
                .map_err(|_| self.mismatch("number")),
        }
    }
    pub fn as_str(&self) -> Result<&str, ValueError> {
        match &self.payload {
            Payload::String(s) => Ok(s),
            _ => Err(self.mismatch("string")),
        }
    }
    pub fn as_bytes(&self) -> Result<&[u8], ValueError> {
        match &self.payload {
            Payload::ByteArray(bytes) | Payload::Bitfield(bytes) => Ok(bytes),
            _ => Err(self.mismatch("byte array")),
        }
    }
    pub fn as_timestamp(&self) -> Result<Timestamp, ValueError> {
        match self.payload {
            Payload::Timestamp(ts) => Ok(ts),
            _ => Err(self.mismatch("timestamp")),
        }
    }
    /// Children of a container value
    pub fn children(&self) -> Result<&[Value], ValueError> {
        match &self.payload {
            Payload::Container(children) => Ok(children),
            _ => Err(self.mismatch("container")),
        }
    }
    /// First child with the given tag (either request or response form)
    pub fn find(&self, tag: Tag) -> Option<&Value> {
        self.children()
            .ok()?
            .iter()
            .find(|child| child.tag.request() == tag.request())
    }
}

/// Decode a concatenation of values, preserving wire order
pub fn decode_all(bytes: &[u8]) -> Result<Vec<Value>, ValueError> {
    decode_children(bytes, 0)
}

fn decode_children(mut bytes: &[u8], depth: usize) -> Result<Vec<Value>, ValueError> {
    let mut values = Vec::new();
    while !bytes.is_empty() {
        let (value, consumed) = Value::decode_at_depth(bytes, depth)?;
        values.push(value);
        bytes = &bytes[consumed..];
    }
    Ok(values)
}

/// Builds a container value child by child
///
/// ```rust
/// # use rscp_protocol::{tags, value::ContainerBuilder};
/// let mut auth = ContainerBuilder::new(tags::RSCP_REQ_AUTHENTICATION);
/// auth.append(tags::RSCP_AUTHENTICATION_USER, "user")
///     .append(tags::RSCP_AUTHENTICATION_PASSWORD, "secret");
/// let auth = auth.build();
/// assert_eq!(auth.children().unwrap().len(), 2);
/// ```
#[derive(Debug)]
pub struct ContainerBuilder {
    tag: Tag,
    children: Vec<Value>,
}

impl ContainerBuilder {
    pub fn new(tag: Tag) -> Self {
        ContainerBuilder {
            tag,
            children: Vec::new(),
        }
    }
    /// Append a primitive child
    pub fn append(&mut self, tag: Tag, value: impl Into<Payload>) -> &mut Self {
        self.children.push(Value::new(tag, value));
        self
    }
    /// Append an already built child, usually another container
    pub fn append_value(&mut self, value: Value) -> &mut Self {
        self.children.push(value);
        self
    }
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
    pub fn build(self) -> Value {
        Value {
            tag: self.tag,
            payload: Payload::Container(self.children),
        }
    }
}
