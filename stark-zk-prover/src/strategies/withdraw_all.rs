use log::debug;
use serde::{Deserialize, Serialize};
use stark_zk_primitives::operations::{withdraw_all_prefix, WithdrawAllInputs, WithdrawAllProof};
use stark_zk_primitives::sigma::respond;
use stark_zk_primitives::{Amount, Ciphertext, Felt, Point};

use super::holds_balance;
use crate::strategy::{
    PrefixContext, ProofBundle, ProofContext, ProofOutput, ProofRequest, ProofStrategy,
};
use crate::ProverError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WithdrawAllParams {
    /// Current encrypted balance `(CL, CR)`.
    pub balance: Ciphertext,
    pub nonce: u64,
    /// Recipient of the public funds.
    pub to: Felt,
    /// The full balance, disclosed.
    pub amount: Amount,
}

/// Generate a proof that the whole encrypted balance equals `amount`.
///
/// One nonce `k` answers both relations:
/// ```text
/// s·G  == A_x  + c·y
/// s·CR == A_cr + c·(CL - amount·G)
/// ```
///
/// # Errors
/// * `ProverError::InvalidInput` - If `amount` is not the encrypted balance
pub fn prove_withdraw_all(
    ctx: &mut ProofContext<'_>,
    params: &WithdrawAllParams,
) -> Result<ProofOutput<WithdrawAllInputs, WithdrawAllProof>, ProverError> {
    let x = ctx.secret().scalar();
    if !holds_balance(&params.balance, &x, params.amount) {
        return Err(ProverError::InvalidInput("amount does not match the encrypted balance"));
    }

    let inputs = WithdrawAllInputs {
        y: ctx.public_key.clone(),
        nonce: params.nonce,
        to: params.to,
        amount: params.amount,
        l: params.balance.l.clone(),
        r: params.balance.r.clone(),
    };

    let k = ctx.nonce();
    let a_x = Point::generator().mul(&k);
    let a_cr = params.balance.r.mul(&k);
    let c = inputs.challenge(ctx.config, &a_x, &a_cr);
    let s_x = respond(&k, &c, &x);

    debug!(target: "prover", "withdraw_all proof generated for nonce {}", params.nonce);
    Ok(ProofOutput {
        inputs,
        proof: WithdrawAllProof { a_x, a_cr, s_x },
    })
}

pub struct WithdrawAllStrategy;

impl ProofStrategy for WithdrawAllStrategy {
    fn prefix(&self, ctx: &PrefixContext<'_>, request: &ProofRequest) -> Result<Felt, ProverError> {
        let ProofRequest::WithdrawAll(p) = request else {
            return Err(ProverError::MismatchedRequest(
                "withdraw_all expects withdraw_all parameters",
            ));
        };
        Ok(withdraw_all_prefix(ctx.config, ctx.public_key, p.nonce, &p.to, p.amount))
    }

    fn prove(
        &self,
        ctx: &mut ProofContext<'_>,
        request: &ProofRequest,
    ) -> Result<ProofBundle, ProverError> {
        let ProofRequest::WithdrawAll(p) = request else {
            return Err(ProverError::MismatchedRequest(
                "withdraw_all expects withdraw_all parameters",
            ));
        };
        prove_withdraw_all(ctx, p).map(ProofBundle::WithdrawAll)
    }
}
