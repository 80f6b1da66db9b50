//! Rijndael block cipher
//!
//! Supports 128, 192 and 256-bit blocks with 128, 192 and 256-bit keys.
//! With a 128-bit block this is AES; the legacy envelope format uses the
//! 256-bit block variant, which AES does not cover.
//!
//! State bytes are column-major: byte `r + 4 * c` is row `r`, column `c`,
//! which is also the order of the bytes in the input block.
//!
//! The S-box is a lookup table, so this implementation is not hardened
//! against cache-timing attacks on shared hardware.

use zeroize::Zeroizing;

use crate::error::{CryptError, CryptResult};

const MAX_BLOCK: usize = 32;

const SBOX: [u8; 256] = build_sbox();
const INV_SBOX: [u8; 256] = build_inv_sbox();

const fn xtime(b: u8) -> u8 {
    (b << 1) ^ (((b >> 7) & 1) * 0x1b)
}

/// Multiply in GF(2^8). Branches only on `b`, which is always a constant
/// coefficient at runtime.
const fn gf_mul(mut a: u8, mut b: u8) -> u8 {
    let mut p = 0u8;
    while b != 0 {
        if b & 1 != 0 {
            p ^= a;
        }
        a = xtime(a);
        b >>= 1;
    }
    p
}

const fn gf_inv(a: u8) -> u8 {
    // a^254 = a^-1, and maps 0 to 0
    let mut result = 1u8;
    let mut base = a;
    let mut e = 254u8;
    while e != 0 {
        if e & 1 != 0 {
            result = gf_mul(result, base);
        }
        base = gf_mul(base, base);
        e >>= 1;
    }
    if a == 0 {
        0
    } else {
        result
    }
}

const fn build_sbox() -> [u8; 256] {
    let mut sbox = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        let x = gf_inv(i as u8);
        sbox[i] = x
            ^ x.rotate_left(1)
            ^ x.rotate_left(2)
            ^ x.rotate_left(3)
            ^ x.rotate_left(4)
            ^ 0x63;
        i += 1;
    }
    sbox
}

const fn build_inv_sbox() -> [u8; 256] {
    let mut inv = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        inv[SBOX[i] as usize] = i as u8;
        i += 1;
    }
    inv
}

/// A keyed Rijndael instance. Round keys are wiped on drop.
pub struct Rijndael {
    nb: usize,
    nr: usize,
    round_keys: Zeroizing<Vec<u8>>,
}

impl Rijndael {
    /// Expand `key` for the given block size (both in bytes: 16, 24 or 32)
    pub fn new(key: &[u8], block_size: usize) -> CryptResult<Self> {
        if !matches!(key.len(), 16 | 24 | 32) {
            return Err(CryptError::Config(format!(
                "Unsupported Rijndael key size: {} bytes",
                key.len()
            )));
        }
        if !matches!(block_size, 16 | 24 | 32) {
            return Err(CryptError::Config(format!(
                "Unsupported Rijndael block size: {} bytes",
                block_size
            )));
        }

        let nb = block_size / 4;
        let nk = key.len() / 4;
        let nr = nk.max(nb) + 6;
        let total_words = nb * (nr + 1);

        let mut w = Zeroizing::new(vec![0u8; 4 * total_words]);
        w[..key.len()].copy_from_slice(key);

        let mut rcon = 1u8;
        for i in nk..total_words {
            let mut temp = [w[4 * i - 4], w[4 * i - 3], w[4 * i - 2], w[4 * i - 1]];
            if i % nk == 0 {
                temp.rotate_left(1);
                for b in temp.iter_mut() {
                    *b = SBOX[*b as usize];
                }
                temp[0] ^= rcon;
                rcon = xtime(rcon);
            } else if nk > 6 && i % nk == 4 {
                for b in temp.iter_mut() {
                    *b = SBOX[*b as usize];
                }
            }
            for j in 0..4 {
                w[4 * i + j] = w[4 * (i - nk) + j] ^ temp[j];
            }
        }

        Ok(Self {
            nb,
            nr,
            round_keys: w,
        })
    }

    /// Block size in bytes
    pub fn block_size(&self) -> usize {
        4 * self.nb
    }

    /// Encrypt one block in place
    pub fn encrypt_block(&self, block: &mut [u8]) {
        debug_assert_eq!(block.len(), self.block_size());

        self.add_round_key(block, 0);
        for round in 1..self.nr {
            sub_bytes(block, &SBOX);
            self.shift_rows(block);
            mix_columns(block);
            self.add_round_key(block, round);
        }
        sub_bytes(block, &SBOX);
        self.shift_rows(block);
        self.add_round_key(block, self.nr);
    }

    /// Decrypt one block in place
    pub fn decrypt_block(&self, block: &mut [u8]) {
        debug_assert_eq!(block.len(), self.block_size());

        self.add_round_key(block, self.nr);
        for round in (1..self.nr).rev() {
            self.inv_shift_rows(block);
            sub_bytes(block, &INV_SBOX);
            self.add_round_key(block, round);
            inv_mix_columns(block);
        }
        self.inv_shift_rows(block);
        sub_bytes(block, &INV_SBOX);
        self.add_round_key(block, 0);
    }

    fn add_round_key(&self, block: &mut [u8], round: usize) {
        let len = self.block_size();
        let key = &self.round_keys[round * len..(round + 1) * len];
        for (b, k) in block.iter_mut().zip(key) {
            *b ^= k;
        }
    }

    fn row_offsets(&self) -> [usize; 4] {
        if self.nb == 8 {
            [0, 1, 3, 4]
        } else {
            [0, 1, 2, 3]
        }
    }

    fn shift_rows(&self, block: &mut [u8]) {
        let offsets = self.row_offsets();
        let mut tmp = Zeroizing::new([0u8; MAX_BLOCK]);
        for c in 0..self.nb {
            for (r, offset) in offsets.iter().enumerate() {
                tmp[r + 4 * c] = block[r + 4 * ((c + offset) % self.nb)];
            }
        }
        block.copy_from_slice(&tmp[..self.block_size()]);
    }

    fn inv_shift_rows(&self, block: &mut [u8]) {
        let offsets = self.row_offsets();
        let mut tmp = Zeroizing::new([0u8; MAX_BLOCK]);
        for c in 0..self.nb {
            for (r, offset) in offsets.iter().enumerate() {
                tmp[r + 4 * ((c + offset) % self.nb)] = block[r + 4 * c];
            }
        }
        block.copy_from_slice(&tmp[..self.block_size()]);
    }
}

fn sub_bytes(block: &mut [u8], table: &[u8; 256]) {
    for b in block.iter_mut() {
        *b = table[*b as usize];
    }
}

fn mix_columns(block: &mut [u8]) {
    for col in block.chunks_exact_mut(4) {
        let [a0, a1, a2, a3] = [col[0], col[1], col[2], col[3]];
        col[0] = gf_mul(a0, 2) ^ gf_mul(a1, 3) ^ a2 ^ a3;
        col[1] = a0 ^ gf_mul(a1, 2) ^ gf_mul(a2, 3) ^ a3;
        col[2] = a0 ^ a1 ^ gf_mul(a2, 2) ^ gf_mul(a3, 3);
        col[3] = gf_mul(a0, 3) ^ a1 ^ a2 ^ gf_mul(a3, 2);
    }
}

fn inv_mix_columns(block: &mut [u8]) {
    for col in block.chunks_exact_mut(4) {
        let [a0, a1, a2, a3] = [col[0], col[1], col[2], col[3]];
        col[0] = gf_mul(a0, 14) ^ gf_mul(a1, 11) ^ gf_mul(a2, 13) ^ gf_mul(a3, 9);
        col[1] = gf_mul(a0, 9) ^ gf_mul(a1, 14) ^ gf_mul(a2, 11) ^ gf_mul(a3, 13);
        col[2] = gf_mul(a0, 13) ^ gf_mul(a1, 9) ^ gf_mul(a2, 14) ^ gf_mul(a3, 11);
        col[3] = gf_mul(a0, 11) ^ gf_mul(a1, 13) ^ gf_mul(a2, 9) ^ gf_mul(a3, 14);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_hex(s: &str) -> Vec<u8> {
        (0..s.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&s[i..i + 2], 16).unwrap())
            .collect()
    }

    fn sequential(len: usize) -> Vec<u8> {
        (0..len as u8).collect()
    }

    fn check_fips_vector(key_len: usize, expected: &str) {
        let cipher = Rijndael::new(&sequential(key_len), 16).unwrap();
        let plaintext = from_hex("00112233445566778899aabbccddeeff");

        let mut block = plaintext.clone();
        cipher.encrypt_block(&mut block);
        assert_eq!(block, from_hex(expected));

        cipher.decrypt_block(&mut block);
        assert_eq!(block, plaintext);
    }

    #[test]
    fn test_sbox_known_entries() {
        assert_eq!(SBOX[0x00], 0x63);
        assert_eq!(SBOX[0x01], 0x7c);
        assert_eq!(SBOX[0x53], 0xed);
        assert_eq!(SBOX[0xff], 0x16);
        assert_eq!(INV_SBOX[0x63], 0x00);
    }

    #[test]
    fn test_fips197_aes128() {
        check_fips_vector(16, "69c4e0d86a7b0430d8cdb78070b4c55a");
    }

    #[test]
    fn test_fips197_aes192() {
        check_fips_vector(24, "dda97ca4864cdfe06eaf70a0ec0d7191");
    }

    #[test]
    fn test_fips197_aes256() {
        check_fips_vector(32, "8ea2b7ca516745bfeafc49904b496089");
    }

    #[test]
    fn test_256_bit_block_vector() {
        // First block of the osu! replay checksum vector, CBC-whitened by hand
        let key = b"osu!-scoreburgr---------20210520";
        let iv = from_hex("f07c1a9a1bba62aa5fbed5670d80273bd9544490ad5d758421d5609ae4e7c5a2");
        let plaintext = b"c51aee56bb5195244252d190baa54b49";
        let expected = from_hex("b9d1f32180bb84c78cbd01818b42c8257e22ee645d7cc0fc1f7902828a7b4542");

        let cipher = Rijndael::new(key, 32).unwrap();
        let mut block: Vec<u8> = plaintext.iter().zip(&iv).map(|(p, v)| p ^ v).collect();
        cipher.encrypt_block(&mut block);
        assert_eq!(block, expected);

        cipher.decrypt_block(&mut block);
        for (b, v) in block.iter_mut().zip(&iv) {
            *b ^= v;
        }
        assert_eq!(block, plaintext);
    }

    #[test]
    fn test_wide_blocks_invert() {
        for block_size in [24, 32] {
            for key_len in [16, 24, 32] {
                let cipher = Rijndael::new(&sequential(key_len), block_size).unwrap();
                let plaintext = sequential(block_size);

                let mut block = plaintext.clone();
                cipher.encrypt_block(&mut block);
                assert_ne!(block, plaintext);

                cipher.decrypt_block(&mut block);
                assert_eq!(block, plaintext);
            }
        }
    }

    #[test]
    fn test_256_bit_block_diffuses() {
        let cipher = Rijndael::new(&[0x42; 32], 32).unwrap();

        let mut a = [0u8; 32];
        let mut b = [0u8; 32];
        b[31] = 1;
        cipher.encrypt_block(&mut a);
        cipher.encrypt_block(&mut b);

        let differing = a.iter().zip(b.iter()).filter(|(x, y)| x != y).count();
        assert!(differing > 24, "only {} bytes changed", differing);
    }

    #[test]
    fn test_rejects_bad_sizes() {
        assert!(Rijndael::new(&[0u8; 20], 32).is_err());
        assert!(Rijndael::new(&[0u8; 32], 20).is_err());
        assert_eq!(Rijndael::new(&[0u8; 32], 32).unwrap().block_size(), 32);
    }
}
