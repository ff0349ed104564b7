//! # stark-zk-primitives — Shared Stark-curve ZK building blocks
//!
//! Types and algorithms used by both the prover and the verifier:
//!
//! - [`curve`]: scalars mod the group order `n`, points, hex/byte codecs
//! - [`challenge`]: Poseidon-based Fiat-Shamir challenges
//! - [`sigma`]: proof of exponent (POE) and of double exponent (POE2)
//! - [`chaum_pedersen`]: DLEQ proof with a fixed 192-byte encoding
//! - [`cipher`] / [`she`]: balance ciphertexts and range proofs
//! - [`operations`]: public inputs, proofs and challenges of the five
//!   confidential-balance operations
//!
//! ## Transcript Binding
//!
//! Every operation challenge is derived from a prefix that commits to the
//! deployment domain, the operation selector, the caller key and the call
//! parameters:
//!
//! ```text
//! prefix = Poseidon(domain, selector, y.x, y.y, params...)
//! c      = challenge(prefix, statement points || commitments)
//! ```
//!
//! Anything that goes on the wire round-trips through `serde` with points and
//! scalars rendered as `0x`-prefixed hex.

pub mod challenge;
pub mod chaum_pedersen;
pub mod cipher;
pub mod config;
pub mod curve;
pub mod generators;
pub mod keys;
pub mod operations;
pub mod she;
pub mod sigma;


pub use cipher::{Amount, CipherBackend, Ciphertext, RangeProof, RANGE_BITS};
pub use config::ProtocolConfig;
pub use curve::{random_scalar, Point, Scalar};
pub use keys::SecretKey;
pub use she::She;
pub use starknet_types_core::felt::Felt;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("malformed encoding: {0}")]
    MalformedEncoding(&'static str),
    #[error("invalid point: {0}")]
    InvalidPoint(&'static str),
    #[error("invalid scalar: {0}")]
    InvalidScalar(&'static str),
    #[error("malformed proof: expected {expected} bytes, got {actual}")]
    MalformedProof { expected: usize, actual: usize },
    #[error("range proof failed: {0}")]
    RangeProof(&'static str),
    #[error("ciphertext does not decrypt to a balance in range")]
    Undecipherable,
}

pub type Result<T> = core::result::Result<T, Error>;
