use log::debug;
use serde::{Deserialize, Serialize};
use stark_zk_primitives::operations::{expost_prefix, ExPostInputs, ExPostProof};
use stark_zk_primitives::sigma::respond;
use stark_zk_primitives::{Ciphertext, Felt, Point, Scalar};

use crate::strategy::{
    PrefixContext, ProofBundle, ProofContext, ProofOutput, ProofRequest, ProofStrategy,
};
use crate::ProverError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExPostParams {
    /// Key the settled amount is disclosed to, `ȳ`.
    pub recipient: Point,
    /// Settled transaction ciphertext `(TL, TR)` under the prover's key.
    pub transaction: Ciphertext,
}

/// Re-encrypt the amount of a settled transaction toward `recipient`.
///
/// The amount `b` is recovered from `(TL, TR)`; a fresh `r` gives
/// `L = b·G + r·y`, `L_bar = b·G + r·ȳ`, `R = r·G`, and the proof ties `b` back
/// to the transaction through `TL == b·G + x·TR`.
///
/// # Errors
/// * `ProverError::Primitive` - If the recipient key is invalid or the
///   transaction does not decrypt to an amount in range
pub fn prove_expost(
    ctx: &mut ProofContext<'_>,
    params: &ExPostParams,
) -> Result<ProofOutput<ExPostInputs, ExPostProof>, ProverError> {
    params.recipient.ensure_public_key()?;
    let x = ctx.secret().scalar();
    let b = ctx.backend.decipher_balance(&x, &params.transaction)?;

    let r = ctx.nonce();
    let to_self = ctx.backend.cipher_balance(ctx.public_key, b, &r);
    let to_recipient = ctx.backend.cipher_balance(&params.recipient, b, &r);
    let inputs = ExPostInputs {
        y: ctx.public_key.clone(),
        y_bar: params.recipient.clone(),
        l: to_self.l,
        l_bar: to_recipient.l,
        r: to_self.r,
        tl: params.transaction.l.clone(),
        tr: params.transaction.r.clone(),
    };

    let g = Point::generator();
    let kx = ctx.nonce();
    let kb = ctx.nonce();
    let kr = ctx.nonce();

    let kb_g = g.mul(&kb);
    let a_x = g.mul(&kx);
    let a_r = g.mul(&kr);
    let a_l = &kb_g + &inputs.y.mul(&kr);
    let a_bar = &kb_g + &inputs.y_bar.mul(&kr);
    let a_t = &kb_g + &inputs.tr.mul(&kx);

    let c = inputs.challenge(ctx.config, [&a_x, &a_r, &a_l, &a_bar, &a_t]);
    let proof = ExPostProof {
        a_x,
        a_r,
        a_l,
        a_bar,
        a_t,
        s_x: respond(&kx, &c, &x),
        s_b: respond(&kb, &c, &Scalar::from(b)),
        s_r: respond(&kr, &c, &r),
    };

    debug!(target: "prover", "expost proof generated");
    Ok(ProofOutput { inputs, proof })
}

pub struct ExPostStrategy;

impl ProofStrategy for ExPostStrategy {
    fn prefix(&self, ctx: &PrefixContext<'_>, request: &ProofRequest) -> Result<Felt, ProverError> {
        let ProofRequest::ExPost(p) = request else {
            return Err(ProverError::MismatchedRequest("expost expects expost parameters"));
        };
        Ok(expost_prefix(
            ctx.config,
            ctx.public_key,
            &p.recipient,
            &p.transaction.l,
            &p.transaction.r,
        ))
    }

    fn prove(
        &self,
        ctx: &mut ProofContext<'_>,
        request: &ProofRequest,
    ) -> Result<ProofBundle, ProverError> {
        let ProofRequest::ExPost(p) = request else {
            return Err(ProverError::MismatchedRequest("expost expects expost parameters"));
        };
        prove_expost(ctx, p).map(ProofBundle::ExPost)
    }
}
