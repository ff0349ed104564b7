//! Fixed generators.
//!
//! `H` and the default auditor key are derived by try-and-increment: hash the
//! tag with a counter, keep the first x-coordinate that lies on the curve and
//! take the even y. Nobody knows their discrete log relative to `G`.

use std::sync::LazyLock;

use starknet_types_core::felt::Felt;
use starknet_types_core::hash::{Poseidon, StarkHash};

use crate::challenge::short_string;
use crate::curve::Point;

/// Tag for the second Pedersen / Chaum-Pedersen generator.
pub const PEDERSEN_H_TAG: &str = "stark-zk/pedersen-h";
/// Tag for the default auditor public key.
pub const AUDITOR_TAG: &str = "stark-zk/auditor";

static PEDERSEN_H: LazyLock<Point> = LazyLock::new(|| hash_to_curve(PEDERSEN_H_TAG));

/// Second generator `H`, independent of `G`.
pub fn pedersen_h() -> Point {
    PEDERSEN_H.clone()
}

/// Deterministic curve point for `tag`.
pub fn hash_to_curve(tag: &str) -> Point {
    let seed = short_string(tag);
    let mut counter = 0u64;
    loop {
        let x = Poseidon::hash(&seed, &Felt::from(counter));
        if let Ok(p) = Point::decompress(x, false) {
            if !p.is_identity() {
                return p;
            }
        }
        counter += 1;
    }
}
