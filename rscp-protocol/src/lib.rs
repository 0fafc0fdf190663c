#![cfg_attr(not(test), no_std)]
//! Client side of the RSCP protocol spoken by E3/DC home storage systems
//!
//! The protocol runs over a single TCP connection. Every request is a tree
//! of tagged values packed into a frame, encrypted with a chained 256 bit
//! Rijndael cipher and answered by exactly one response frame.
//!
//! [Session] ties the pieces together on top of any
//! [embedded_io::Read] + [embedded_io::Write] transport.
extern crate alloc;

use alloc::string::String;
use core::fmt::Display;

pub mod cipher;
pub mod commands;
pub mod dictionary;
mod frame;
pub mod orchestrator;
pub mod reassembly;
pub mod session;
pub mod tags;
pub mod types;
mod util;
pub mod value;

pub use dictionary::{BuiltinDictionary, TagDictionary};
pub use frame::{
    CRC_LEN, Ctrl, Frame, FrameError, HEADER_LEN, MAX_FRAME_LEN, MAX_PAYLOAD_LEN, Parsed,
    encode_frame, parse_frame,
};
pub use orchestrator::{Orchestrator, Output, Query, Reading};
pub use session::{Cycle, Session};
pub use tags::Tag;
pub use value::{ContainerBuilder, Payload, Timestamp, Value, ValueError};

/// Default TCP port of the RSCP service
pub const DEFAULT_PORT: u16 = 5033;

/// Fatal protocol errors, independent of the transport
#[derive(Debug, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum ProtocolError {
    #[error("corrupt frame: {0}")]
    Frame(#[from] FrameError),
    #[error("receive buffer exceeded {limit} bytes without a complete frame")]
    BufferOverflow { limit: usize },
    #[error("authentication rejected by the device")]
    AuthenticationRejected,
    #[error("invalid request: {0}")]
    Input(#[from] InputError),
    #[error("malformed value: {0}")]
    Value(#[from] ValueError),
}

/// Invalid user input, detected before anything is sent
#[derive(Debug, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum InputError {
    #[error("unknown history type `{0}`, expected day, week, month or year")]
    UnknownHistoryType(String),
    #[error("invalid date `{0}`, expected YYYY-MM-DD")]
    InvalidDateFormat(String),
    #[error("{what} of {value} W must be between 1 and {max} W")]
    PowerOutOfRange {
        what: &'static str,
        value: u32,
        max: u32,
    },
    #[error("manual charge of {value} Wh must be between {min} and {max} Wh")]
    ChargeEnergyOutOfRange { value: u32, min: u32, max: u32 },
}

#[derive(Debug)]
#[non_exhaustive]
pub enum Error<T: embedded_io::Error> {
    /// No response within the transport timeout
    ///
    /// Not fatal, the pending request is sent again.
    Timeout,
    /// The device closed the connection
    PeerClosed,
    /// Corrupt data or a rejected session
    Protocol(ProtocolError),
    /// Transport layer error
    Transport(T),
}

impl<T: embedded_io::Error> Error<T> {
    /// Whether the session can't continue after this error
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Error::Timeout)
    }
}

impl<T: embedded_io::Error> Display for Error<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Timeout => write!(f, "Timed out waiting for a response"),
            Error::PeerClosed => write!(f, "Connection closed by peer"),
            Error::Protocol(e) => write!(f, "Protocol error: {e}"),
            Error::Transport(e) => write!(f, "Transport error: {e}"),
        }
    }
}
impl<T: embedded_io::Error + 'static> core::error::Error for Error<T> {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Error::Protocol(e) => Some(e),
            Error::Transport(e) => Some(e),
            _ => None,
        }
    }
}
impl<T: embedded_io::Error> From<ProtocolError> for Error<T> {
    fn from(value: ProtocolError) -> Self {
        Self::Protocol(value)
    }
}

#[cfg(test)]
static INIT: std::sync::Once = std::sync::Once::new();

#[cfg(test)]
fn init_logger() {
    INIT.call_once(|| {
        simple_logger::init_with_level(log::Level::Trace).unwrap();
    });
}
