//! Balance ciphertexts and the range-proof / ciphertext backend seam.

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::curve::{Point, Scalar};
use crate::Result;

/// Amounts and balances. The width matches the fixed range-proof bound.
pub type Amount = u32;

/// Bit width of every amount-bearing range proof.
pub const RANGE_BITS: u32 = 32;

/// ElGamal-style balance ciphertext: `L = b·G + r·y`, `R = r·G`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ciphertext {
    pub l: Point,
    pub r: Point,
}

impl Ciphertext {
    pub fn new(l: Point, r: Point) -> Self {
        Self { l, r }
    }
}

/// One bit of a range proof: `V_i = b_i·G + r_i·H` with an OR-proof that
/// `V_i` or `V_i - G` is a multiple of `H`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitProof {
    pub v: Point,
    pub a0: Point,
    pub a1: Point,
    pub c0: Scalar,
    pub s0: Scalar,
    pub s1: Scalar,
}

/// Proof that `commitment = b·G + r·H` opens to `b < 2^bits`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeProof {
    pub commitment: Point,
    pub bits: Vec<BitProof>,
}

/// Range proofs and ciphertext-balance arithmetic, consumed by the proof
/// strategies only through these four calls.
pub trait CipherBackend: Send + Sync {
    /// Encrypt `amount` for `public_key` with the given randomness.
    fn cipher_balance(&self, public_key: &Point, amount: Amount, randomness: &Scalar) -> Ciphertext;

    /// Recover the amount held in `ciphertext` under `secret`.
    fn decipher_balance(&self, secret: &Scalar, ciphertext: &Ciphertext) -> Result<Amount>;

    /// Prove `amount < 2^bits`. Returns the commitment randomness and the proof.
    fn prove_range(
        &self,
        amount: Amount,
        bits: u32,
        rng: &mut dyn RngCore,
    ) -> Result<(Scalar, RangeProof)>;

    /// Check a range proof, returning its commitment when valid.
    fn verify_range(&self, proof: &RangeProof, bits: u32) -> Option<Point>;
}
