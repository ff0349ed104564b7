//! # stark-zk-verifier — Confidential-balance proof verification
//!
//! [`StarkVerifier`] checks the proofs produced by `stark-zk-prover` against
//! their public inputs. Every method recomputes the bound Fiat-Shamir
//! challenge from the inputs and commitments, then checks each sigma relation:
//!
//! | Operation      | Relations                                                        |
//! |----------------|------------------------------------------------------------------|
//! | `fund`         | `s·G = A + c·y`                                                  |
//! | `withdraw_all` | `s·G = A_x + c·y`, `s·R = A_cr + c·(L - amount·G)`               |
//! | `withdraw`     | key, balance opening, range commitment, range proof              |
//! | `transfer`     | key, shared `R`, three encryptions, both range commitments, remainder |
//! | `expost`       | key, `R`, both re-encryptions, transaction opening               |
//!
//! Malformed or tampered proofs are a normal `false`; nothing here panics on
//! untrusted input.


use log::debug;
use stark_zk_primitives::cipher::CipherBackend;
use stark_zk_primitives::generators::pedersen_h;
use stark_zk_primitives::operations::{
    ExPostInputs, ExPostProof, FundInputs, FundProof, TransferInputs, TransferProof,
    WithdrawAllInputs, WithdrawAllProof, WithdrawInputs, WithdrawProof,
};
use stark_zk_primitives::sigma::{poe2_holds, poe_holds};
use stark_zk_primitives::{Amount, Ciphertext, Point, ProtocolConfig, Scalar, She, RANGE_BITS};

pub struct StarkVerifier<B: CipherBackend = She> {
    backend: B,
    config: ProtocolConfig,
}

impl StarkVerifier<She> {
    pub fn new() -> Self {
        Self::with_backend(She)
    }
}

impl Default for StarkVerifier<She> {
    fn default() -> Self {
        Self::new()
    }
}

/// Reject the identity as a key and anything off the curve.
fn keys_valid(keys: &[&Point]) -> bool {
    keys.iter().all(|k| k.ensure_public_key().is_ok())
}

fn points_valid(points: &[&Point]) -> bool {
    points.iter().all(|p| p.validate().is_ok())
}

fn amount_g(amount: Amount) -> Point {
    Point::generator().mul(&Scalar::from(amount))
}

impl<B: CipherBackend> StarkVerifier<B> {
    pub fn with_backend(backend: B) -> Self {
        Self {
            backend,
            config: ProtocolConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ProtocolConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    pub fn verify_fund(&self, inputs: &FundInputs, proof: &FundProof) -> bool {
        if !keys_valid(&[&inputs.y]) || !points_valid(&[&proof.a]) {
            debug!(target: "verifier", "fund: invalid point");
            return false;
        }
        let c = inputs.challenge(&self.config, &proof.a);
        let ok = poe_holds(&proof.s, &Point::generator(), &proof.a, &c, &inputs.y);
        if !ok {
            debug!(target: "verifier", "fund: key relation failed for nonce {}", inputs.nonce);
        }
        ok
    }

    pub fn verify_withdraw_all(
        &self,
        inputs: &WithdrawAllInputs,
        proof: &WithdrawAllProof,
    ) -> bool {
        if !keys_valid(&[&inputs.y])
            || !points_valid(&[&inputs.l, &inputs.r, &proof.a_x, &proof.a_cr])
        {
            debug!(target: "verifier", "withdraw_all: invalid point");
            return false;
        }
        let c = inputs.challenge(&self.config, &proof.a_x, &proof.a_cr);
        if !poe_holds(&proof.s_x, &Point::generator(), &proof.a_x, &c, &inputs.y) {
            debug!(target: "verifier", "withdraw_all: key relation failed");
            return false;
        }
        let opened = &inputs.l - &amount_g(inputs.amount);
        if !poe_holds(&proof.s_x, &inputs.r, &proof.a_cr, &c, &opened) {
            debug!(target: "verifier", "withdraw_all: balance does not open to {}", inputs.amount);
            return false;
        }
        true
    }

    pub fn verify_withdraw(&self, inputs: &WithdrawInputs, proof: &WithdrawProof) -> bool {
        if !keys_valid(&[&inputs.y])
            || !points_valid(&[&inputs.l, &inputs.r, &proof.a_x, &proof.a, &proof.a_v])
        {
            debug!(target: "verifier", "withdraw: invalid point");
            return false;
        }
        let Some(v) = self.backend.verify_range(&proof.range, RANGE_BITS) else {
            debug!(target: "verifier", "withdraw: range proof rejected");
            return false;
        };

        let g = Point::generator();
        let c = inputs.challenge(&self.config, &v, [&proof.a_x, &proof.a, &proof.a_v]);
        if !poe_holds(&proof.s_x, &g, &proof.a_x, &c, &inputs.y) {
            debug!(target: "verifier", "withdraw: key relation failed");
            return false;
        }
        let opened = &inputs.l - &amount_g(inputs.amount);
        if !poe2_holds(&proof.s_b, &proof.s_x, &g, &inputs.r, &proof.a, &c, &opened) {
            debug!(target: "verifier", "withdraw: balance relation failed");
            return false;
        }
        if !poe2_holds(&proof.s_b, &proof.s_r, &g, &pedersen_h(), &proof.a_v, &c, &v) {
            debug!(target: "verifier", "withdraw: range commitment relation failed");
            return false;
        }
        true
    }

    /// `balance` is the sender's on-chain ciphertext before the transfer.
    pub fn verify_transfer(
        &self,
        inputs: &TransferInputs,
        balance: &Ciphertext,
        proof: &TransferProof,
    ) -> bool {
        let audit = &self.config.auditor_key;
        if !keys_valid(&[&inputs.y, &inputs.y_bar, audit])
            || !points_valid(&[
                &balance.l,
                &balance.r,
                &inputs.l,
                &inputs.r,
                &inputs.l_bar,
                &inputs.l_audit,
                &proof.a_x,
                &proof.a_r,
                &proof.a_b,
                &proof.a_bar,
                &proof.a_audit,
                &proof.a_v,
                &proof.a_b2,
                &proof.a_v2,
            ])
        {
            debug!(target: "verifier", "transfer: invalid point");
            return false;
        }
        let Some(v) = self.backend.verify_range(&proof.range, RANGE_BITS) else {
            debug!(target: "verifier", "transfer: amount range proof rejected");
            return false;
        };
        let Some(v2) = self.backend.verify_range(&proof.range2, RANGE_BITS) else {
            debug!(target: "verifier", "transfer: remainder range proof rejected");
            return false;
        };

        let g = Point::generator();
        let h = pedersen_h();
        let c = inputs.challenge(
            &self.config,
            balance,
            &v,
            &v2,
            [
                &proof.a_x,
                &proof.a_r,
                &proof.a_b,
                &proof.a_bar,
                &proof.a_audit,
                &proof.a_v,
                &proof.a_b2,
                &proof.a_v2,
            ],
        );

        let remainder_base = &balance.r - &inputs.r;
        let remainder = &balance.l - &inputs.l;
        let checks = [
            ("key", poe_holds(&proof.s_x, &g, &proof.a_x, &c, &inputs.y)),
            ("randomness", poe_holds(&proof.s_r, &g, &proof.a_r, &c, &inputs.r)),
            (
                "sender ciphertext",
                poe2_holds(&proof.s_b, &proof.s_r, &g, &inputs.y, &proof.a_b, &c, &inputs.l),
            ),
            (
                "recipient ciphertext",
                poe2_holds(
                    &proof.s_b,
                    &proof.s_r,
                    &g,
                    &inputs.y_bar,
                    &proof.a_bar,
                    &c,
                    &inputs.l_bar,
                ),
            ),
            (
                "auditor ciphertext",
                poe2_holds(&proof.s_b, &proof.s_r, &g, audit, &proof.a_audit, &c, &inputs.l_audit),
            ),
            ("amount commitment", poe2_holds(&proof.s_b, &proof.s_r, &g, &h, &proof.a_v, &c, &v)),
            (
                "remainder",
                poe2_holds(
                    &proof.s_b2,
                    &proof.s_x,
                    &g,
                    &remainder_base,
                    &proof.a_b2,
                    &c,
                    &remainder,
                ),
            ),
            (
                "remainder commitment",
                poe2_holds(&proof.s_b2, &proof.s_r2, &g, &h, &proof.a_v2, &c, &v2),
            ),
        ];
        for (name, ok) in checks {
            if !ok {
                debug!(
                    target: "verifier",
                    "transfer: {name} relation failed for nonce {}", inputs.nonce
                );
                return false;
            }
        }
        true
    }

    pub fn verify_expost(&self, inputs: &ExPostInputs, proof: &ExPostProof) -> bool {
        if !keys_valid(&[&inputs.y, &inputs.y_bar])
            || !points_valid(&[
                &inputs.l,
                &inputs.l_bar,
                &inputs.r,
                &inputs.tl,
                &inputs.tr,
                &proof.a_x,
                &proof.a_r,
                &proof.a_l,
                &proof.a_bar,
                &proof.a_t,
            ])
        {
            debug!(target: "verifier", "expost: invalid point");
            return false;
        }

        let g = Point::generator();
        let commitments = [&proof.a_x, &proof.a_r, &proof.a_l, &proof.a_bar, &proof.a_t];
        let c = inputs.challenge(&self.config, commitments);
        let checks = [
            ("key", poe_holds(&proof.s_x, &g, &proof.a_x, &c, &inputs.y)),
            ("randomness", poe_holds(&proof.s_r, &g, &proof.a_r, &c, &inputs.r)),
            (
                "own ciphertext",
                poe2_holds(&proof.s_b, &proof.s_r, &g, &inputs.y, &proof.a_l, &c, &inputs.l),
            ),
            (
                "recipient ciphertext",
                poe2_holds(
                    &proof.s_b,
                    &proof.s_r,
                    &g,
                    &inputs.y_bar,
                    &proof.a_bar,
                    &c,
                    &inputs.l_bar,
                ),
            ),
            (
                "transaction",
                poe2_holds(&proof.s_b, &proof.s_x, &g, &inputs.tr, &proof.a_t, &c, &inputs.tl),
            ),
        ];
        for (name, ok) in checks {
            if !ok {
                debug!(target: "verifier", "expost: {name} relation failed");
                return false;
            }
        }
        true
    }
}
