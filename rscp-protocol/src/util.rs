/// Round `n` up to the next multiple of `block`
///
/// ## Example
/// A frame of 43 bytes occupies two 32 byte cipher blocks on the wire,
/// so it consumes `round_up(43, 32) == 64` bytes of the receive buffer.
pub const fn round_up(n: usize, block: usize) -> usize {
    n.div_ceil(block) * block
}

/// Round `n` down to a multiple of `block`
pub const fn round_down(n: usize, block: usize) -> usize {
    n - n % block
}
