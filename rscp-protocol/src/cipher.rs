//! Transport encryption
//!
//! The device encrypts the whole TCP stream with Rijndael using a 256 bit
//! block and a 256 bit key, chained block to block (CBC). Each direction keeps
//! its own IV which starts out as all `0xFF` and afterwards always holds the
//! last ciphertext block processed in that direction. The IV is never reset
//! while the connection lives.
//!
//! There is no message authentication; tampering or a desynchronized IV only
//! shows up as undecodable frames.

use alloc::vec::Vec;

use log::trace;

/// Cipher block size in bytes
pub const BLOCK_SIZE: usize = 32;
/// Key size in bytes
pub const KEY_SIZE: usize = 32;
/// Initial IV of both directions
const IV_SEED: [u8; BLOCK_SIZE] = [0xFF; BLOCK_SIZE];

/// Derive the key from the shared passphrase
///
/// The passphrase is copied into a key buffer filled with `0xFF`; longer
/// passphrases are truncated.
pub fn derive_key(passphrase: &[u8]) -> [u8; KEY_SIZE] {
    let mut key = [0xFF; KEY_SIZE];
    let len = passphrase.len().min(KEY_SIZE);
    key[..len].copy_from_slice(&passphrase[..len]);
    key
}

/// Zero pad `data` up to a whole number of blocks
pub fn pad_to_block(data: &mut Vec<u8>) {
    let padded = crate::util::round_up(data.len(), BLOCK_SIZE);
    data.resize(padded, 0);
}

const fn xtime(b: u8) -> u8 {
    (b << 1) ^ if b & 0x80 != 0 { 0x1B } else { 0x00 }
}

/// Multiplication in GF(2^8)
fn gmul(mut a: u8, mut b: u8) -> u8 {
    let mut product = 0;
    while b != 0 {
        if b & 1 != 0 {
            product ^= a;
        }
        a = xtime(a);
        b >>= 1;
    }
    product
}

const fn build_sbox() -> [u8; 256] {
    let mut sbox = [0u8; 256];
    // p walks the multiplicative group by powers of 3, q by powers of 3^-1,
    // so q is always the inverse of p
    let mut p = 1u8;
    let mut q = 1u8;
    loop {
        p = p ^ (p << 1) ^ if p & 0x80 != 0 { 0x1B } else { 0 };
        q ^= q << 1;
        q ^= q << 2;
        q ^= q << 4;
        if q & 0x80 != 0 {
            q ^= 0x09;
        }
        sbox[p as usize] = q
            ^ q.rotate_left(1)
            ^ q.rotate_left(2)
            ^ q.rotate_left(3)
            ^ q.rotate_left(4)
            ^ 0x63;
        if p == 1 {
            break;
        }
    }
    sbox[0] = 0x63;
    sbox
}

const fn invert(sbox: &[u8; 256]) -> [u8; 256] {
    let mut inverse = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        inverse[sbox[i] as usize] = i as u8;
        i += 1;
    }
    inverse
}

static SBOX: [u8; 256] = build_sbox();
static INV_SBOX: [u8; 256] = invert(&build_sbox());

/// Rijndael block cipher
///
/// Supports block lengths of 16 and 32 bytes and key lengths of 16, 24 and
/// 32 bytes. The protocol only uses 32/32; the 16 byte block is what AES
/// standardized and is kept for checking against published vectors.
#[derive(Clone)]
pub struct Rijndael {
    /// Block length in 32 bit words
    nb: usize,
    rounds: usize,
    /// Expanded key, `4 * nb * (rounds + 1)` bytes
    round_keys: Vec<u8>,
}

impl Rijndael {
    /// Returns `None` for unsupported key or block lengths
    pub fn new(key: &[u8], block_len: usize) -> Option<Self> {
        if !matches!(key.len(), 16 | 24 | 32) || !matches!(block_len, 16 | 32) {
            return None;
        }
        Some(Self::expand(key, block_len))
    }

    /// Key expansion, lengths have to be valid
    fn expand(key: &[u8], block_len: usize) -> Self {
        let nk = key.len() / 4;
        let nb = block_len / 4;
        let rounds = nk.max(nb) + 6;
        let words = nb * (rounds + 1);

        let mut w: Vec<[u8; 4]> = Vec::with_capacity(words);
        for chunk in key.chunks_exact(4) {
            w.push([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        let mut rcon = 1u8;
        for i in nk..words {
            let mut temp = w[i - 1];
            if i % nk == 0 {
                temp.rotate_left(1);
                temp = temp.map(|b| SBOX[b as usize]);
                temp[0] ^= rcon;
                rcon = xtime(rcon);
            } else if nk > 6 && i % nk == 4 {
                temp = temp.map(|b| SBOX[b as usize]);
            }
            let prev = w[i - nk];
            w.push([
                prev[0] ^ temp[0],
                prev[1] ^ temp[1],
                prev[2] ^ temp[2],
                prev[3] ^ temp[3],
            ]);
        }

        Rijndael {
            nb,
            rounds,
            round_keys: w.into_iter().flatten().collect(),
        }
    }

    pub fn block_len(&self) -> usize {
        self.nb * 4
    }

    /// Row shift offsets for rows 1 to 3
    fn shifts(&self) -> [usize; 3] {
        if self.nb == 8 { [1, 3, 4] } else { [1, 2, 3] }
    }

    fn add_round_key(&self, state: &mut [u8], round: usize) {
        let len = self.block_len();
        let key = &self.round_keys[round * len..(round + 1) * len];
        for (s, k) in state.iter_mut().zip(key) {
            *s ^= k;
        }
    }

    /// `state[r + 4c]` holds row `r` of column `c`
    fn shift_rows(&self, state: &mut [u8], inverse: bool) {
        let nb = self.nb;
        let mut row = [0u8; 8];
        for (r, shift) in (1..4).zip(self.shifts()) {
            for (c, cell) in row.iter_mut().enumerate().take(nb) {
                let from = if inverse {
                    (c + nb - shift) % nb
                } else {
                    (c + shift) % nb
                };
                *cell = state[r + 4 * from];
            }
            for (c, cell) in row.iter().enumerate().take(nb) {
                state[r + 4 * c] = *cell;
            }
        }
    }

    fn mix_columns(&self, state: &mut [u8]) {
        for col in state.chunks_exact_mut(4) {
            let [a0, a1, a2, a3] = [col[0], col[1], col[2], col[3]];
            col[0] = gmul(a0, 2) ^ gmul(a1, 3) ^ a2 ^ a3;
            col[1] = a0 ^ gmul(a1, 2) ^ gmul(a2, 3) ^ a3;
            col[2] = a0 ^ a1 ^ gmul(a2, 2) ^ gmul(a3, 3);
            col[3] = gmul(a0, 3) ^ a1 ^ a2 ^ gmul(a3, 2);
        }
    }

    fn inv_mix_columns(&self, state: &mut [u8]) {
        for col in state.chunks_exact_mut(4) {
            let [a0, a1, a2, a3] = [col[0], col[1], col[2], col[3]];
            col[0] = gmul(a0, 14) ^ gmul(a1, 11) ^ gmul(a2, 13) ^ gmul(a3, 9);
            col[1] = gmul(a0, 9) ^ gmul(a1, 14) ^ gmul(a2, 11) ^ gmul(a3, 13);
            col[2] = gmul(a0, 13) ^ gmul(a1, 9) ^ gmul(a2, 14) ^ gmul(a3, 11);
            col[3] = gmul(a0, 11) ^ gmul(a1, 13) ^ gmul(a2, 9) ^ gmul(a3, 14);
        }
    }

    /// Encrypt one block in place
    ///
    /// `block` has to be exactly [Rijndael::block_len] bytes long.
    pub fn encrypt_block(&self, block: &mut [u8]) {
        debug_assert_eq!(block.len(), self.block_len());
        self.add_round_key(block, 0);
        for round in 1..=self.rounds {
            block.iter_mut().for_each(|b| *b = SBOX[*b as usize]);
            self.shift_rows(block, false);
            if round != self.rounds {
                self.mix_columns(block);
            }
            self.add_round_key(block, round);
        }
    }

    /// Decrypt one block in place
    pub fn decrypt_block(&self, block: &mut [u8]) {
        debug_assert_eq!(block.len(), self.block_len());
        self.add_round_key(block, self.rounds);
        for round in (0..self.rounds).rev() {
            self.shift_rows(block, true);
            block.iter_mut().for_each(|b| *b = INV_SBOX[*b as usize]);
            self.add_round_key(block, round);
            if round != 0 {
                self.inv_mix_columns(block);
            }
        }
    }
}

/// One direction of the chained transport encryption
#[derive(Clone)]
pub struct CipherStream {
    cipher: Rijndael,
    iv: [u8; BLOCK_SIZE],
}

impl CipherStream {
    fn new(cipher: Rijndael) -> Self {
        CipherStream {
            cipher,
            iv: IV_SEED,
        }
    }

    /// Current IV, the last ciphertext block processed
    pub fn iv(&self) -> &[u8; BLOCK_SIZE] {
        &self.iv
    }

    /// Encrypt whole blocks in place and carry the IV forward
    ///
    /// Trailing bytes that don't fill a block are left untouched.
    pub fn encrypt_blocks(&mut self, data: &mut [u8]) {
        for block in data.chunks_exact_mut(BLOCK_SIZE) {
            for (b, iv) in block.iter_mut().zip(&self.iv) {
                *b ^= iv;
            }
            self.cipher.encrypt_block(block);
            self.iv.copy_from_slice(block);
        }
        trace!("Encrypted {} blocks", data.len() / BLOCK_SIZE);
    }

    /// Decrypt whole blocks in place and carry the IV forward
    pub fn decrypt_blocks(&mut self, data: &mut [u8]) {
        let mut iv = self.iv;
        self.decrypt_chain(&mut iv, data);
        self.iv = iv;
    }

    fn decrypt_chain(&self, iv: &mut [u8; BLOCK_SIZE], data: &mut [u8]) {
        for block in data.chunks_exact_mut(BLOCK_SIZE) {
            let mut ciphertext = [0u8; BLOCK_SIZE];
            ciphertext.copy_from_slice(block);
            self.cipher.decrypt_block(block);
            for (b, prev) in block.iter_mut().zip(iv.iter()) {
                *b ^= prev;
            }
            *iv = ciphertext;
        }
    }

    /// Decrypt the whole blocks of `ciphertext` without moving the IV
    ///
    /// Used when it isn't known yet how much of the data will be consumed;
    /// commit with [CipherStream::advance_to] afterwards.
    pub fn decrypt_span(&self, ciphertext: &[u8]) -> Vec<u8> {
        let whole = ciphertext.len() - ciphertext.len() % BLOCK_SIZE;
        let mut plaintext = ciphertext[..whole].to_vec();
        let mut iv = self.iv;
        self.decrypt_chain(&mut iv, &mut plaintext);
        plaintext
    }

    /// Continue the chain after `last_block`
    pub fn advance_to(&mut self, last_block: &[u8; BLOCK_SIZE]) {
        self.iv = *last_block;
    }
}

/// Send and receive cipher state of one connection
#[derive(Clone)]
pub struct TransportCipher {
    pub send: CipherStream,
    pub receive: CipherStream,
}

impl TransportCipher {
    pub fn new(passphrase: &[u8]) -> Self {
        let key = derive_key(passphrase);
        let cipher = Rijndael::expand(&key, BLOCK_SIZE);
        TransportCipher {
            send: CipherStream::new(cipher.clone()),
            receive: CipherStream::new(cipher),
        }
    }
}
