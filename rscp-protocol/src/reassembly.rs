//! Turns the encrypted byte stream back into frames
//!
//! TCP hands out the stream in arbitrary pieces. Bytes are collected in a
//! [ReceiveBuffer] until whole cipher blocks are available; only whole
//! blocks are decrypted and only the blocks of completely parsed frames
//! move the receive IV forward.

use alloc::vec;
use alloc::vec::Vec;

use log::{debug, trace};

use crate::ProtocolError;
use crate::cipher::{BLOCK_SIZE, CipherStream};
use crate::frame::{self, Frame, MAX_FRAME_LEN, Parsed};
use crate::util::{round_down, round_up};

/// Step by which the receive buffer grows
pub const GROW_INCREMENT: usize = 4096;
/// Largest padded frame plus room for two more reads
pub const MAX_BUFFER_LEN: usize = round_up(MAX_FRAME_LEN, BLOCK_SIZE) + 2 * GROW_INCREMENT;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReassemblyState {
    /// Nothing buffered
    Idle,
    /// Less than one cipher block buffered
    Accumulating,
    /// At least one whole block can be decrypted
    BlockReady,
}

/// Receive side buffer of one connection
#[derive(Debug)]
pub struct ReceiveBuffer {
    buf: Vec<u8>,
    /// Bytes received but not yet consumed by a frame
    held: usize,
}

impl Default for ReceiveBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl ReceiveBuffer {
    pub fn new() -> Self {
        ReceiveBuffer {
            buf: vec![0u8; GROW_INCREMENT],
            held: 0,
        }
    }

    /// Free space to read into
    ///
    /// Grows the buffer whenever less than [GROW_INCREMENT] bytes are free.
    pub fn spare_mut(&mut self) -> Result<&mut [u8], ProtocolError> {
        if self.buf.len() - self.held < GROW_INCREMENT {
            let len = self.buf.len() + GROW_INCREMENT;
            if len > MAX_BUFFER_LEN {
                return Err(ProtocolError::BufferOverflow {
                    limit: MAX_BUFFER_LEN,
                });
            }
            trace!("Growing receive buffer to {len} bytes");
            self.buf.resize(len, 0);
        }
        Ok(&mut self.buf[self.held..])
    }

    /// Record `n` bytes written into [ReceiveBuffer::spare_mut]
    pub fn commit(&mut self, n: usize) {
        self.held = (self.held + n).min(self.buf.len());
    }

    /// Copy `data` into the buffer
    pub fn extend_from_slice(&mut self, mut data: &[u8]) -> Result<(), ProtocolError> {
        while !data.is_empty() {
            let spare = self.spare_mut()?;
            let n = spare.len().min(data.len());
            spare[..n].copy_from_slice(&data[..n]);
            self.commit(n);
            data = &data[n..];
        }
        Ok(())
    }

    /// Bytes received but not yet consumed
    pub fn held(&self) -> usize {
        self.held
    }

    pub fn state(&self) -> ReassemblyState {
        match self.held {
            0 => ReassemblyState::Idle,
            n if n < BLOCK_SIZE => ReassemblyState::Accumulating,
            _ => ReassemblyState::BlockReady,
        }
    }

    /// Decrypt and parse every complete frame in the buffer
    ///
    /// Each frame consumes its length rounded up to the block size. The
    /// receive IV moves to the last consumed ciphertext block and the
    /// remainder is moved to the front of the buffer. A partial frame or a
    /// partial block stays buffered untouched.
    pub fn drain_frames(&mut self, stream: &mut CipherStream) -> Result<Vec<Frame>, ProtocolError> {
        let mut frames = Vec::new();
        let aligned = round_down(self.held, BLOCK_SIZE);
        if aligned == 0 {
            return Ok(frames);
        }
        let plaintext = stream.decrypt_span(&self.buf[..aligned]);

        let mut offset = 0;
        while offset < aligned {
            match frame::parse_frame(&plaintext[offset..])? {
                Parsed::Complete { frame, consumed } => {
                    offset += round_up(consumed, BLOCK_SIZE);
                    frames.push(frame);
                }
                Parsed::Incomplete => break,
            }
        }

        if offset > 0 {
            let mut last = [0u8; BLOCK_SIZE];
            last.copy_from_slice(&self.buf[offset - BLOCK_SIZE..offset]);
            stream.advance_to(&last);
            self.buf.copy_within(offset..self.held, 0);
            self.held -= offset;
            debug!(
                "Reassembled {} frame(s) from {offset} bytes, {} bytes left over",
                frames.len(),
                self.held
            );
        }
        Ok(frames)
    }
}
