//! Half-duplex request/response loop over one connection

use alloc::vec::Vec;

use embedded_io::{ErrorKind, Read, Write};
use log::{debug, trace, warn};

use crate::cipher::{TransportCipher, pad_to_block};
use crate::dictionary::TagDictionary;
use crate::frame::Frame;
use crate::orchestrator::{Orchestrator, Output};
use crate::reassembly::ReceiveBuffer;
use crate::value::{Timestamp, Value};
use crate::{Error, ProtocolError};

/// Outcome of one request/response cycle
#[derive(Debug, PartialEq)]
pub enum Cycle {
    Responded(Vec<Output>),
    /// Nothing arrived in time, the same request goes out next cycle
    TimedOut,
    /// Every query is done
    Finished,
}

/// One connection to the device
///
/// Owns the transport and everything that lives exactly as long as it: the
/// cipher chain, the receive buffer and the orchestration state.
pub struct Session<T: Read + Write, D: TagDictionary> {
    transport: T,
    cipher: TransportCipher,
    buffer: ReceiveBuffer,
    orchestrator: Orchestrator,
    dictionary: D,
    clock: fn() -> Timestamp,
}

impl<T: Read + Write, D: TagDictionary> Session<T, D> {
    /// Start a session on a freshly connected transport
    ///
    /// `passphrase` is the RSCP password configured on the device.
    pub fn new(transport: T, passphrase: &[u8], orchestrator: Orchestrator, dictionary: D) -> Self {
        Session {
            transport,
            cipher: TransportCipher::new(passphrase),
            buffer: ReceiveBuffer::new(),
            orchestrator,
            dictionary,
            clock: Timestamp::default,
        }
    }

    /// Source of the timestamps put into request frames
    pub fn with_clock(mut self, clock: fn() -> Timestamp) -> Self {
        self.clock = clock;
        self
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    /// Give back the transport, e.g. to shut it down
    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Frame, pad, encrypt and write a root container
    pub fn send(&mut self, root: Value) -> Result<(), Error<T::Error>> {
        let frame = Frame::from_root((self.clock)(), root);
        let mut bytes = frame.encode(true).map_err(ProtocolError::from)?;
        pad_to_block(&mut bytes);
        self.cipher.send.encrypt_blocks(&mut bytes);
        trace!("Sending {} bytes", bytes.len());
        self.transport.write_all(&bytes).map_err(Error::Transport)?;
        self.transport.flush().map_err(Error::Transport)?;
        Ok(())
    }

    /// Read until at least one frame arrived and nothing is left over
    pub fn receive(&mut self) -> Result<Vec<Frame>, Error<T::Error>> {
        let mut frames = Vec::new();
        loop {
            let spare = self.buffer.spare_mut()?;
            let n = match self.transport.read(spare) {
                Ok(0) => return Err(Error::PeerClosed),
                Ok(n) => n,
                Err(e) if embedded_io::Error::kind(&e) == ErrorKind::TimedOut => {
                    if frames.is_empty() {
                        warn!("Response receive timeout");
                        return Err(Error::Timeout);
                    }
                    return Ok(frames);
                }
                Err(e) => return Err(Error::Transport(e)),
            };
            trace!("Received {n} bytes");
            self.buffer.commit(n);
            frames.extend(self.buffer.drain_frames(&mut self.cipher.receive)?);
            if !frames.is_empty() && self.buffer.held() == 0 {
                return Ok(frames);
            }
        }
    }

    /// Send the pending request and handle its response
    pub fn cycle(&mut self) -> Result<Cycle, Error<T::Error>> {
        let Some(request) = self.orchestrator.next_request() else {
            return Ok(Cycle::Finished);
        };
        self.send(request)?;
        let frames = match self.receive() {
            Err(Error::Timeout) => return Ok(Cycle::TimedOut),
            result => result?,
        };
        let mut outputs = Vec::new();
        for frame in &frames {
            outputs.extend(self.orchestrator.handle_frame(frame, &self.dictionary)?);
        }
        debug!("Cycle produced {} outputs", outputs.len());
        Ok(Cycle::Responded(outputs))
    }

    /// Cycle until every query is done
    ///
    /// Timeouts are retried, at most `max_timeouts` times in a row when
    /// given. Every output is handed to `sink` as it arrives.
    pub fn run(
        &mut self,
        max_timeouts: Option<u32>,
        mut sink: impl FnMut(Output),
    ) -> Result<(), Error<T::Error>> {
        let mut timeouts = 0;
        loop {
            match self.cycle()? {
                Cycle::Responded(outputs) => {
                    timeouts = 0;
                    outputs.into_iter().for_each(&mut sink);
                }
                Cycle::TimedOut => {
                    timeouts += 1;
                    if max_timeouts.is_some_and(|max| timeouts > max) {
                        return Err(Error::Timeout);
                    }
                    warn!("Retrying request ({timeouts})");
                }
                Cycle::Finished => return Ok(()),
            }
        }
    }
}
