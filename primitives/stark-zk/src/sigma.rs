//! Proof-of-exponent building blocks.
//!
//! `POE` proves knowledge of `x` with `y = x·base`; `POE2` proves knowledge of
//! `(x1, x2)` with `y = x1·base1 + x2·base2` under a single challenge. The
//! confidential-operation proofs are conjunctions of these relations sharing
//! responses, so the check helpers are exported on their own.

use rand::RngCore;
use serde::{Deserialize, Serialize};
use starknet_types_core::felt::Felt;

use crate::challenge::challenge;
use crate::curve::{random_scalar, Point, Scalar};
use crate::{Error, Result};

/// Sigma response `k + c·x mod n`.
pub fn respond(k: &Scalar, c: &Scalar, x: &Scalar) -> Scalar {
    *k + *c * *x
}

/// `s·base == a + c·y`
pub fn poe_holds(s: &Scalar, base: &Point, a: &Point, c: &Scalar, y: &Point) -> bool {
    base.mul(s) == a + &y.mul(c)
}

/// `s1·base1 + s2·base2 == a + c·y`
pub fn poe2_holds(
    s1: &Scalar,
    s2: &Scalar,
    base1: &Point,
    base2: &Point,
    a: &Point,
    c: &Scalar,
    y: &Point,
) -> bool {
    &base1.mul(s1) + &base2.mul(s2) == a + &y.mul(c)
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoeProof {
    pub y: Point,
    pub a: Point,
    pub c: Scalar,
    pub s: Scalar,
}

/// # Errors
/// * `Error::InvalidScalar` - If `x` is zero
pub fn prove_poe<R: RngCore + ?Sized>(
    x: &Scalar,
    base: &Point,
    tag: &Felt,
    rng: &mut R,
) -> Result<PoeProof> {
    if x.is_zero() {
        return Err(Error::InvalidScalar("secret must be non-zero"));
    }
    let y = base.mul(x);
    let k = random_scalar(rng);
    let a = base.mul(&k);
    let c = challenge(tag, &[base, &y, &a]);
    let s = respond(&k, &c, x);
    Ok(PoeProof { y, a, c, s })
}

/// Rejects an identity statement.
pub fn verify_poe(proof: &PoeProof, base: &Point, tag: &Felt) -> bool {
    if proof.y.ensure_public_key().is_err() || proof.a.validate().is_err() {
        return false;
    }
    let c = challenge(tag, &[base, &proof.y, &proof.a]);
    c == proof.c && poe_holds(&proof.s, base, &proof.a, &c, &proof.y)
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Poe2Proof {
    pub y: Point,
    pub a: Point,
    pub c: Scalar,
    pub s1: Scalar,
    pub s2: Scalar,
}

/// One of `x1`, `x2` may be zero, not both.
pub fn prove_poe2<R: RngCore + ?Sized>(
    x1: &Scalar,
    x2: &Scalar,
    base1: &Point,
    base2: &Point,
    tag: &Felt,
    rng: &mut R,
) -> Result<Poe2Proof> {
    if x1.is_zero() && x2.is_zero() {
        return Err(Error::InvalidScalar("secrets must not both be zero"));
    }
    let y = &base1.mul(x1) + &base2.mul(x2);
    let k1 = random_scalar(rng);
    let k2 = random_scalar(rng);
    let a = &base1.mul(&k1) + &base2.mul(&k2);
    let c = challenge(tag, &[base1, base2, &y, &a]);
    Ok(Poe2Proof {
        y,
        a,
        c,
        s1: respond(&k1, &c, x1),
        s2: respond(&k2, &c, x2),
    })
}

pub fn verify_poe2(proof: &Poe2Proof, base1: &Point, base2: &Point, tag: &Felt) -> bool {
    if proof.y.ensure_public_key().is_err() || proof.a.validate().is_err() {
        return false;
    }
    let c = challenge(tag, &[base1, base2, &proof.y, &proof.a]);
    c == proof.c && poe2_holds(&proof.s1, &proof.s2, base1, base2, &proof.a, &c, &proof.y)
}
