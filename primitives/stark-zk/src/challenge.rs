//! Fiat-Shamir challenges over Poseidon.
//!
//! A transcript is a flat list of field elements: the domain tag followed by
//! the affine coordinates of every point. The list is folded left with the
//! two-input Poseidon hash. Results that land outside the scalar field are
//! re-hashed with a salt counter (starting at 1) until they fall below `n`,
//! which avoids the bias of a plain modular reduction.

use starknet_types_core::felt::Felt;
use starknet_types_core::hash::{Poseidon, StarkHash};

use crate::curve::{Point, Scalar};

/// Encode an ASCII tag of at most 31 bytes as a field element (Cairo short string).
pub fn short_string(tag: &str) -> Felt {
    let bytes = tag.as_bytes();
    debug_assert!(bytes.len() <= 31, "short strings hold at most 31 bytes");
    Felt::from_bytes_be_slice(&bytes[..bytes.len().min(31)])
}

/// Challenge over `[tag, P1.x, P1.y, P2.x, P2.y, ...]`.
pub fn challenge(tag: &Felt, points: &[&Point]) -> Scalar {
    let mut seq = Vec::with_capacity(1 + 2 * points.len());
    seq.push(*tag);
    for p in points {
        let (x, y) = p.affine();
        seq.push(x);
        seq.push(y);
    }
    to_scalar(fold(&seq))
}

/// Challenge over `[tag, P1.x, parity(P1.y), ...]`.
pub fn challenge_compressed(tag: &Felt, points: &[&Point]) -> Scalar {
    let mut seq = Vec::with_capacity(1 + 2 * points.len());
    seq.push(*tag);
    for p in points {
        seq.push(p.x());
        seq.push(if p.y_parity() { Felt::ONE } else { Felt::ZERO });
    }
    to_scalar(fold(&seq))
}

/// Left fold with pairwise Poseidon. An empty sequence folds to zero.
pub fn fold(seq: &[Felt]) -> Felt {
    match seq.split_first() {
        Some((first, rest)) => rest.iter().fold(*first, |acc, f| Poseidon::hash(&acc, f)),
        None => Felt::ZERO,
    }
}

/// Map a field element into the scalar field by rejection sampling.
pub fn to_scalar(folded: Felt) -> Scalar {
    if let Some(s) = Scalar::try_from_felt(&folded) {
        return s;
    }
    let mut salt = 1u64;
    loop {
        let candidate = Poseidon::hash(&folded, &Felt::from(salt));
        if let Some(s) = Scalar::try_from_felt(&candidate) {
            return s;
        }
        salt += 1;
    }
}

/// Poseidon over an arbitrary list of field elements; used for operation prefixes.
pub fn hash_elements(elements: &[Felt]) -> Felt {
    Poseidon::hash_array(elements)
}
