use log::debug;
use serde::{Deserialize, Serialize};
use stark_zk_primitives::generators::pedersen_h;
use stark_zk_primitives::operations::{transfer_prefix, TransferInputs, TransferProof};
use stark_zk_primitives::sigma::respond;
use stark_zk_primitives::{Amount, Ciphertext, Felt, Point, Scalar, RANGE_BITS};

use super::ensure_balance;
use crate::strategy::{
    PrefixContext, ProofBundle, ProofContext, ProofOutput, ProofRequest, ProofStrategy,
};
use crate::ProverError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransferParams {
    /// Recipient public key `ȳ`.
    pub recipient: Point,
    /// Plaintext of `balance`.
    pub initial_balance: Amount,
    pub amount: Amount,
    /// Sender's encrypted balance `(CL, CR)` before the transfer.
    pub balance: Ciphertext,
    pub nonce: u64,
}

/// Generate a proof for a confidential transfer.
///
/// The amount `b` is encrypted three times under one randomness `r` (the
/// opening of the amount's range commitment `V`), to the sender, the recipient
/// and the auditor. The remainder `b' = initial_balance - b` is range-proved
/// as `V2 = b'·G + r2·H` and tied to the balance through
/// `CL - L == b'·G + x·(CR - R)`.
///
/// # Errors
/// * `ProverError::InvalidInput` - If `initial_balance` is not the encrypted balance
/// * `ProverError::Overflow` - If `amount` exceeds the balance
/// * `ProverError::Primitive` - If the recipient key is invalid or a range proof fails
pub fn prove_transfer(
    ctx: &mut ProofContext<'_>,
    params: &TransferParams,
) -> Result<ProofOutput<TransferInputs, TransferProof>, ProverError> {
    params.recipient.ensure_public_key()?;
    let x = ctx.secret().scalar();
    ensure_balance(&params.balance, &x, params.initial_balance)?;
    let left = params
        .initial_balance
        .checked_sub(params.amount)
        .ok_or(ProverError::Overflow("balance - transfer amount"))?;

    let (r, range) = ctx.backend.prove_range(params.amount, RANGE_BITS, &mut *ctx.rng)?;
    let (r2, range2) = ctx.backend.prove_range(left, RANGE_BITS, &mut *ctx.rng)?;
    let v = range.commitment.clone();
    let v2 = range2.commitment.clone();

    let y = ctx.public_key.clone();
    let y_bar = &params.recipient;
    let audit = &ctx.config.auditor_key;
    let sent = ctx.backend.cipher_balance(&y, params.amount, &r);
    let inputs = TransferInputs {
        y,
        y_bar: y_bar.clone(),
        nonce: params.nonce,
        l_bar: ctx.backend.cipher_balance(y_bar, params.amount, &r).l,
        l_audit: ctx.backend.cipher_balance(audit, params.amount, &r).l,
        l: sent.l,
        r: sent.r,
    };

    let g = Point::generator();
    let h = pedersen_h();
    let kx = ctx.nonce();
    let kr = ctx.nonce();
    let kb = ctx.nonce();
    let kb2 = ctx.nonce();
    let kr2 = ctx.nonce();

    let kb_g = g.mul(&kb);
    let a_x = g.mul(&kx);
    let a_r = g.mul(&kr);
    let a_b = &kb_g + &inputs.y.mul(&kr);
    let a_bar = &kb_g + &inputs.y_bar.mul(&kr);
    let a_audit = &kb_g + &ctx.config.auditor_key.mul(&kr);
    let a_v = &kb_g + &h.mul(&kr);
    let a_b2 = &g.mul(&kb2) + &(&params.balance.r - &inputs.r).mul(&kx);
    let a_v2 = &g.mul(&kb2) + &h.mul(&kr2);

    let c = inputs.challenge(
        ctx.config,
        &params.balance,
        &v,
        &v2,
        [&a_x, &a_r, &a_b, &a_bar, &a_audit, &a_v, &a_b2, &a_v2],
    );
    let proof = TransferProof {
        a_x,
        a_r,
        a_b,
        a_bar,
        a_audit,
        a_v,
        a_b2,
        a_v2,
        s_x: respond(&kx, &c, &x),
        s_r: respond(&kr, &c, &r),
        s_b: respond(&kb, &c, &Scalar::from(params.amount)),
        s_b2: respond(&kb2, &c, &Scalar::from(left)),
        s_r2: respond(&kr2, &c, &r2),
        range,
        range2,
    };

    debug!(target: "prover", "transfer proof generated for nonce {}", params.nonce);
    Ok(ProofOutput { inputs, proof })
}

pub struct TransferStrategy;

impl ProofStrategy for TransferStrategy {
    fn prefix(&self, ctx: &PrefixContext<'_>, request: &ProofRequest) -> Result<Felt, ProverError> {
        let ProofRequest::Transfer(p) = request else {
            return Err(ProverError::MismatchedRequest("transfer expects transfer parameters"));
        };
        Ok(transfer_prefix(ctx.config, ctx.public_key, &p.recipient, p.nonce))
    }

    fn prove(
        &self,
        ctx: &mut ProofContext<'_>,
        request: &ProofRequest,
    ) -> Result<ProofBundle, ProverError> {
        let ProofRequest::Transfer(p) = request else {
            return Err(ProverError::MismatchedRequest("transfer expects transfer parameters"));
        };
        prove_transfer(ctx, p).map(ProofBundle::Transfer)
    }
}
