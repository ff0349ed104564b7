//! Chaum-Pedersen proof of discrete-log equality.
//!
//! Statement `U = x·G`, `V = x·H`. The prover commits `P = r·G`, `Q = r·H`,
//! derives `c` from `(P, Q, U, V)` with the compressed transcript and answers
//! `e = r + c·x mod n`. The verifier recomputes `c` and checks
//! `e·G == P + c·U` and `e·H == Q + c·V`.
//!
//! Byte layout (192 bytes, each field 32-byte big-endian):
//! ```text
//! P.x || P.y || Q.x || Q.y || c || e
//! ```
//! A nonce must never be reused across two challenges for the same secret.

use log::debug;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use starknet_types_core::felt::Felt;
use subtle::ConstantTimeEq;

use crate::challenge::{challenge_compressed, short_string};
use crate::curve::{canonical_felt, random_scalar, Point, Scalar};
use crate::generators::pedersen_h;
use crate::sigma::respond as sigma_respond;
use crate::{Error, Result};

/// Encoded proof length.
pub const PROOF_LEN: usize = 192;

const TAG: &str = "chaum-pedersen";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    pub u: Point,
    pub v: Point,
}

impl Statement {
    pub fn from_secret(x: &Scalar) -> Self {
        Self {
            u: Point::generator().mul(x),
            v: pedersen_h().mul(x),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commitment {
    pub p: Point,
    pub q: Point,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proof {
    pub p: Point,
    pub q: Point,
    pub c: Scalar,
    pub e: Scalar,
}

/// Commit with the given nonce, or a fresh one when `None`.
/// Returns the commitment and the nonce to answer with.
///
/// # Errors
/// * `Error::InvalidScalar` - If the supplied nonce is zero
pub fn commit<R: RngCore + ?Sized>(
    nonce: Option<Scalar>,
    rng: &mut R,
) -> Result<(Commitment, Scalar)> {
    let r = match nonce {
        Some(r) if r.is_zero() => return Err(Error::InvalidScalar("nonce must be non-zero")),
        Some(r) => r,
        None => random_scalar(rng),
    };
    let commitment = Commitment {
        p: Point::generator().mul(&r),
        q: pedersen_h().mul(&r),
    };
    Ok((commitment, r))
}

/// `e = r + c·x mod n`
pub fn respond(x: &Scalar, r: &Scalar, c: &Scalar) -> Scalar {
    sigma_respond(r, c, x)
}

/// Fiat-Shamir challenge for a commitment/statement pair.
pub fn challenge_for(commitment: &Commitment, statement: &Statement) -> Scalar {
    let tag: Felt = short_string(TAG);
    challenge_compressed(
        &tag,
        &[&commitment.p, &commitment.q, &statement.u, &statement.v],
    )
}

/// Non-interactive proof of knowledge of `x` for `(x·G, x·H)`.
///
/// # Errors
/// * `Error::InvalidScalar` - If `x` is zero
pub fn prove<R: RngCore + ?Sized>(x: &Scalar, rng: &mut R) -> Result<(Statement, Proof)> {
    if x.is_zero() {
        return Err(Error::InvalidScalar("secret must be non-zero"));
    }
    let statement = Statement::from_secret(x);
    let (commitment, r) = commit(None, rng)?;
    let c = challenge_for(&commitment, &statement);
    let e = respond(x, &r, &c);
    let proof = Proof {
        p: commitment.p,
        q: commitment.q,
        c,
        e,
    };
    Ok((statement, proof))
}

/// Verification failure is a normal `false`, never an error.
pub fn verify(statement: &Statement, proof: &Proof) -> bool {
    for key in [&statement.u, &statement.v] {
        if key.ensure_public_key().is_err() {
            debug!(target: "chaum_pedersen", "rejecting statement with invalid key");
            return false;
        }
    }
    for point in [&proof.p, &proof.q] {
        if point.validate().is_err() {
            debug!(target: "chaum_pedersen", "rejecting proof with invalid point");
            return false;
        }
    }

    let commitment = Commitment {
        p: proof.p.clone(),
        q: proof.q.clone(),
    };
    let c = challenge_for(&commitment, statement);
    if !bool::from(c.to_bytes_be().ct_eq(&proof.c.to_bytes_be())) {
        debug!(target: "chaum_pedersen", "challenge does not match transcript");
        return false;
    }

    let lhs_g = Point::generator().mul(&proof.e);
    let rhs_g = &proof.p + &statement.u.mul(&c);
    let lhs_h = pedersen_h().mul(&proof.e);
    let rhs_h = &proof.q + &statement.v.mul(&c);
    lhs_g == rhs_g && lhs_h == rhs_h
}

pub fn encode_proof(proof: &Proof) -> [u8; PROOF_LEN] {
    let (px, py) = proof.p.affine();
    let (qx, qy) = proof.q.affine();
    let mut out = [0u8; PROOF_LEN];
    out[0..32].copy_from_slice(&px.to_bytes_be());
    out[32..64].copy_from_slice(&py.to_bytes_be());
    out[64..96].copy_from_slice(&qx.to_bytes_be());
    out[96..128].copy_from_slice(&qy.to_bytes_be());
    out[128..160].copy_from_slice(&proof.c.to_bytes_be());
    out[160..192].copy_from_slice(&proof.e.to_bytes_be());
    out
}

pub fn decode_proof(bytes: &[u8]) -> Result<Proof> {
    if bytes.len() != PROOF_LEN {
        return Err(Error::MalformedProof {
            expected: PROOF_LEN,
            actual: bytes.len(),
        });
    }
    let p = Point::from_affine(
        canonical_felt(&bytes[0..32])?,
        canonical_felt(&bytes[32..64])?,
    )?;
    let q = Point::from_affine(
        canonical_felt(&bytes[64..96])?,
        canonical_felt(&bytes[96..128])?,
    )?;
    let c = Scalar::from_bytes_be(&field(bytes, 128))?;
    let e = Scalar::from_bytes_be(&field(bytes, 160))?;
    Ok(Proof { p, q, c, e })
}

fn field(bytes: &[u8], at: usize) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&bytes[at..at + 32]);
    out
}
