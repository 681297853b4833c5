//! Fixed-width rolling hash over a sliding window of bytes.
//!
//! The parser feeds one byte at a time into a window of exactly `w`
//! bytes and tests the hash after every push; a match against the
//! trigger condition marks a phrase boundary. The window width is fixed
//! for the life of a [`RollingHash`], matching `Hasher hf(w)` being
//! constructed once per parse.
use std::collections::VecDeque;

/// A rolling hash over the last `w` pushed bytes.
pub trait RollingHash {
    /// Push one byte into the window, evicting the oldest byte once the
    /// window is full, and return the new hash value.
    fn update(&mut self, byte: u8) -> u64;

    /// Current hash value without pushing anything.
    fn value(&self) -> u64;

    /// Number of bytes pushed so far, capped at the window size.
    fn filled(&self) -> usize;

    fn window_size(&self) -> usize;
}

/// Base-256 Horner rolling hash modulo the Mersenne prime `2^61 - 1`.
///
/// `value = (byte[0] * base^(w-1) + byte[1] * base^(w-2) + ... + byte[w-1]) mod q`
///
/// updated incrementally as bytes enter and leave the window:
/// `value' = ((value - byte_out * base^(w-1)) * base + byte_in) mod q`.
/// `q = 2^61 - 1` keeps every intermediate product within a `u128` with
/// no risk of silent wraparound, and is large enough that phrase
/// boundaries (triggered by `value % p == 0` for the caller's modulus
/// `p`) are not biased by any small common factor.
pub struct KarpRabinHash {
    w: usize,
    base: u64,
    modulus: u64,
    base_pow_w_minus_1: u64,
    value: u64,
    window: VecDeque<u8>,
}

const MODULUS: u64 = (1u64 << 61) - 1;
const BASE: u64 = 256;

fn mulmod(a: u64, b: u64, m: u64) -> u64 {
    ((a as u128 * b as u128) % m as u128) as u64
}

impl KarpRabinHash {
    pub fn new(w: usize) -> Self {
        assert!(w > 0, "window size must be positive");
        let mut base_pow = 1u64;
        for _ in 0..w.saturating_sub(1) {
            base_pow = mulmod(base_pow, BASE, MODULUS);
        }
        KarpRabinHash {
            w,
            base: BASE,
            modulus: MODULUS,
            base_pow_w_minus_1: base_pow,
            value: 0,
            window: VecDeque::with_capacity(w),
        }
    }
}

impl RollingHash for KarpRabinHash {
    fn update(&mut self, byte: u8) -> u64 {
        if self.window.len() == self.w {
            let outgoing = self.window.pop_front().unwrap() as u64;
            let sub = mulmod(outgoing, self.base_pow_w_minus_1, self.modulus);
            let tmp = (self.value + self.modulus - sub) % self.modulus;
            self.value = mulmod(tmp, self.base, self.modulus);
            self.value = (self.value + byte as u64) % self.modulus;
        } else {
            self.value = mulmod(self.value, self.base, self.modulus);
            self.value = (self.value + byte as u64) % self.modulus;
        }
        self.window.push_back(byte);
        self.value
    }

    fn value(&self) -> u64 {
        self.value
    }

    fn filled(&self) -> usize {
        self.window.len()
    }

    fn window_size(&self) -> usize {
        self.w
    }
}
