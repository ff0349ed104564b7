use log::debug;
use serde::{Deserialize, Serialize};
use stark_zk_primitives::operations::{fund_prefix, FundInputs, FundProof};
use stark_zk_primitives::sigma::respond;
use stark_zk_primitives::{Felt, Point};

use crate::strategy::{
    PrefixContext, ProofBundle, ProofContext, ProofOutput, ProofRequest, ProofStrategy,
};
use crate::ProverError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundParams {
    pub nonce: u64,
}

/// Generate a proof of knowledge of the account key for a deposit.
///
/// # Arguments
/// * `ctx` - Proving context holding the account secret
/// * `params` - Deposit nonce, replay-protected on chain
///
/// # Returns
/// * Public inputs `{y, nonce}` and proof `{A, s}` with `s·G == A + c·y`
pub fn prove_fund(
    ctx: &mut ProofContext<'_>,
    params: &FundParams,
) -> Result<ProofOutput<FundInputs, FundProof>, ProverError> {
    let x = ctx.secret().scalar();
    let inputs = FundInputs {
        y: ctx.public_key.clone(),
        nonce: params.nonce,
    };

    let k = ctx.nonce();
    let a = Point::generator().mul(&k);
    let c = inputs.challenge(ctx.config, &a);
    let s = respond(&k, &c, &x);

    debug!(target: "prover", "fund proof generated for nonce {}", params.nonce);
    Ok(ProofOutput {
        inputs,
        proof: FundProof { a, s },
    })
}

pub struct FundStrategy;

impl ProofStrategy for FundStrategy {
    fn prefix(&self, ctx: &PrefixContext<'_>, request: &ProofRequest) -> Result<Felt, ProverError> {
        let ProofRequest::Fund(params) = request else {
            return Err(ProverError::MismatchedRequest("fund expects fund parameters"));
        };
        Ok(fund_prefix(ctx.config, ctx.public_key, params.nonce))
    }

    fn prove(
        &self,
        ctx: &mut ProofContext<'_>,
        request: &ProofRequest,
    ) -> Result<ProofBundle, ProverError> {
        let ProofRequest::Fund(params) = request else {
            return Err(ProverError::MismatchedRequest("fund expects fund parameters"));
        };
        prove_fund(ctx, params).map(ProofBundle::Fund)
    }
}
