use log::debug;
use serde::{Deserialize, Serialize};
use stark_zk_primitives::generators::pedersen_h;
use stark_zk_primitives::operations::{withdraw_prefix, WithdrawInputs, WithdrawProof};
use stark_zk_primitives::sigma::respond;
use stark_zk_primitives::{Amount, Ciphertext, Felt, Point, Scalar, RANGE_BITS};

use super::ensure_balance;
use crate::strategy::{
    PrefixContext, ProofBundle, ProofContext, ProofOutput, ProofRequest, ProofStrategy,
};
use crate::ProverError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WithdrawParams {
    /// Plaintext of `balance`, known to the account owner.
    pub initial_balance: Amount,
    /// Amount to withdraw, disclosed.
    pub amount: Amount,
    /// Current encrypted balance `(CL, CR)`.
    pub balance: Ciphertext,
    pub to: Felt,
    pub nonce: u64,
}

/// Generate a proof for withdrawing part of the encrypted balance.
///
/// With `b = initial_balance - amount` and `V = b·G + r·H` from the range proof:
/// ```text
/// s_x·G               == A_x + c·y
/// s_b·G + s_x·CR      == A   + c·(CL - amount·G)
/// s_b·G + s_r·H       == A_v + c·V
/// ```
///
/// # Errors
/// * `ProverError::InvalidInput` - If `initial_balance` is not the encrypted balance
/// * `ProverError::Overflow` - If `amount` exceeds the balance
/// * `ProverError::Primitive` - If the range proof cannot be built
pub fn prove_withdraw(
    ctx: &mut ProofContext<'_>,
    params: &WithdrawParams,
) -> Result<ProofOutput<WithdrawInputs, WithdrawProof>, ProverError> {
    let x = ctx.secret().scalar();
    ensure_balance(&params.balance, &x, params.initial_balance)?;
    let left = params
        .initial_balance
        .checked_sub(params.amount)
        .ok_or(ProverError::Overflow("balance - withdraw amount"))?;

    let (r, range) = ctx.backend.prove_range(left, RANGE_BITS, &mut *ctx.rng)?;
    let v = range.commitment.clone();

    let inputs = WithdrawInputs {
        y: ctx.public_key.clone(),
        nonce: params.nonce,
        l: params.balance.l.clone(),
        r: params.balance.r.clone(),
        to: params.to,
        amount: params.amount,
    };

    let g = Point::generator();
    let h = pedersen_h();
    let kx = ctx.nonce();
    let kb = ctx.nonce();
    let kr = ctx.nonce();

    let a_x = g.mul(&kx);
    let a = &g.mul(&kb) + &params.balance.r.mul(&kx);
    let a_v = &g.mul(&kb) + &h.mul(&kr);

    let c = inputs.challenge(ctx.config, &v, [&a_x, &a, &a_v]);
    let proof = WithdrawProof {
        a_x,
        a,
        a_v,
        s_x: respond(&kx, &c, &x),
        s_b: respond(&kb, &c, &Scalar::from(left)),
        s_r: respond(&kr, &c, &r),
        range,
    };

    debug!(target: "prover", "withdraw proof generated for nonce {}", params.nonce);
    Ok(ProofOutput { inputs, proof })
}

pub struct WithdrawStrategy;

impl ProofStrategy for WithdrawStrategy {
    fn prefix(&self, ctx: &PrefixContext<'_>, request: &ProofRequest) -> Result<Felt, ProverError> {
        let ProofRequest::Withdraw(p) = request else {
            return Err(ProverError::MismatchedRequest("withdraw expects withdraw parameters"));
        };
        Ok(withdraw_prefix(ctx.config, ctx.public_key, p.nonce, &p.to, p.amount))
    }

    fn prove(
        &self,
        ctx: &mut ProofContext<'_>,
        request: &ProofRequest,
    ) -> Result<ProofBundle, ProverError> {
        let ProofRequest::Withdraw(p) = request else {
            return Err(ProverError::MismatchedRequest("withdraw expects withdraw parameters"));
        };
        prove_withdraw(ctx, p).map(ProofBundle::Withdraw)
    }
}
