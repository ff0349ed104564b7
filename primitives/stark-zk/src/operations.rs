//! Public inputs and proofs of the confidential-balance operations.
//!
//! Every proof is bound to its call data through a prefix
//! `Poseidon([domain, selector, y.x, y.y, params...])`, which is then used as
//! the domain tag of the Fiat-Shamir challenge over the statement points
//! followed by the sigma commitments. Shared by prover and verifier so both
//! sides derive the exact same challenge.

use serde::{Deserialize, Serialize};
use starknet_types_core::felt::Felt;

use crate::challenge::{challenge, hash_elements, short_string};
use crate::cipher::{Amount, Ciphertext, RangeProof};
use crate::config::ProtocolConfig;
use crate::curve::{Point, Scalar};

/// Operation names, also used as registry keys and prefix selectors.
pub mod names {
    pub const FUND: &str = "fund";
    pub const WITHDRAW_ALL: &str = "withdraw_all";
    pub const WITHDRAW: &str = "withdraw";
    pub const TRANSFER: &str = "transfer";
    pub const EXPOST: &str = "expost";
}

fn prefix_of(config: &ProtocolConfig, name: &str, y: &Point, params: &[Felt]) -> Felt {
    let (yx, yy) = y.affine();
    let mut elements = Vec::with_capacity(4 + params.len());
    elements.push(config.domain);
    elements.push(short_string(name));
    elements.push(yx);
    elements.push(yy);
    elements.extend_from_slice(params);
    hash_elements(&elements)
}

pub fn fund_prefix(config: &ProtocolConfig, y: &Point, nonce: u64) -> Felt {
    prefix_of(config, names::FUND, y, &[Felt::from(nonce)])
}

pub fn withdraw_all_prefix(
    config: &ProtocolConfig,
    y: &Point,
    nonce: u64,
    to: &Felt,
    amount: Amount,
) -> Felt {
    let params = [Felt::from(nonce), *to, Felt::from(amount)];
    prefix_of(config, names::WITHDRAW_ALL, y, &params)
}

pub fn withdraw_prefix(
    config: &ProtocolConfig,
    y: &Point,
    nonce: u64,
    to: &Felt,
    amount: Amount,
) -> Felt {
    let params = [Felt::from(nonce), *to, Felt::from(amount)];
    prefix_of(config, names::WITHDRAW, y, &params)
}

pub fn transfer_prefix(config: &ProtocolConfig, y: &Point, y_bar: &Point, nonce: u64) -> Felt {
    let (bx, by) = y_bar.affine();
    prefix_of(config, names::TRANSFER, y, &[bx, by, Felt::from(nonce)])
}

/// `tl`, `tr` are the settled transaction ciphertext being audited.
pub fn expost_prefix(
    config: &ProtocolConfig,
    y: &Point,
    y_bar: &Point,
    tl: &Point,
    tr: &Point,
) -> Felt {
    let (bx, by) = y_bar.affine();
    let (tl_x, tl_y) = tl.affine();
    let (tr_x, tr_y) = tr.affine();
    prefix_of(config, names::EXPOST, y, &[bx, by, tl_x, tl_y, tr_x, tr_y])
}

fn bound_challenge(prefix: &Felt, statement: &[&Point], commitments: &[&Point]) -> Scalar {
    let points: Vec<&Point> = statement.iter().chain(commitments.iter()).copied().collect();
    challenge(prefix, &points)
}

// ========================= Fund =========================

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundInputs {
    pub y: Point,
    pub nonce: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundProof {
    pub a: Point,
    pub s: Scalar,
}

impl FundInputs {
    pub fn prefix(&self, config: &ProtocolConfig) -> Felt {
        fund_prefix(config, &self.y, self.nonce)
    }

    pub fn challenge(&self, config: &ProtocolConfig, a: &Point) -> Scalar {
        bound_challenge(&self.prefix(config), &[&self.y], &[a])
    }
}

// ========================= Withdraw all =========================

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawAllInputs {
    pub y: Point,
    pub nonce: u64,
    pub to: Felt,
    pub amount: Amount,
    /// Current balance ciphertext, left part.
    pub l: Point,
    /// Current balance ciphertext, right part.
    pub r: Point,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawAllProof {
    pub a_x: Point,
    pub a_cr: Point,
    pub s_x: Scalar,
}

impl WithdrawAllInputs {
    pub fn prefix(&self, config: &ProtocolConfig) -> Felt {
        withdraw_all_prefix(config, &self.y, self.nonce, &self.to, self.amount)
    }

    pub fn challenge(&self, config: &ProtocolConfig, a_x: &Point, a_cr: &Point) -> Scalar {
        bound_challenge(&self.prefix(config), &[&self.y, &self.l, &self.r], &[a_x, a_cr])
    }
}

// ========================= Withdraw =========================

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawInputs {
    pub y: Point,
    pub nonce: u64,
    pub l: Point,
    pub r: Point,
    pub to: Felt,
    pub amount: Amount,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawProof {
    pub a_x: Point,
    pub a: Point,
    pub a_v: Point,
    pub s_x: Scalar,
    pub s_b: Scalar,
    pub s_r: Scalar,
    /// Range proof over the remaining balance.
    pub range: RangeProof,
}

impl WithdrawInputs {
    pub fn prefix(&self, config: &ProtocolConfig) -> Felt {
        withdraw_prefix(config, &self.y, self.nonce, &self.to, self.amount)
    }

    pub fn challenge(
        &self,
        config: &ProtocolConfig,
        v: &Point,
        commitments: [&Point; 3],
    ) -> Scalar {
        bound_challenge(&self.prefix(config), &[&self.y, &self.l, &self.r, v], &commitments)
    }
}

// ========================= Transfer =========================

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferInputs {
    pub y: Point,
    pub y_bar: Point,
    pub nonce: u64,
    /// Amount encrypted to the sender, subtracted from the balance.
    pub l: Point,
    /// Shared randomness point of all three encryptions.
    pub r: Point,
    /// Amount encrypted to the recipient.
    pub l_bar: Point,
    /// Amount encrypted to the auditor.
    pub l_audit: Point,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferProof {
    pub a_x: Point,
    pub a_r: Point,
    pub a_b: Point,
    pub a_bar: Point,
    pub a_audit: Point,
    pub a_v: Point,
    pub a_b2: Point,
    pub a_v2: Point,
    pub s_x: Scalar,
    pub s_r: Scalar,
    pub s_b: Scalar,
    pub s_b2: Scalar,
    pub s_r2: Scalar,
    /// Range proof over the transferred amount.
    pub range: RangeProof,
    /// Range proof over the remaining balance.
    pub range2: RangeProof,
}

impl TransferInputs {
    pub fn prefix(&self, config: &ProtocolConfig) -> Felt {
        transfer_prefix(config, &self.y, &self.y_bar, self.nonce)
    }

    /// `balance` is the sender's ciphertext before the transfer.
    pub fn challenge(
        &self,
        config: &ProtocolConfig,
        balance: &Ciphertext,
        v: &Point,
        v2: &Point,
        commitments: [&Point; 8],
    ) -> Scalar {
        let statement = [
            &self.y,
            &self.y_bar,
            &config.auditor_key,
            &balance.l,
            &balance.r,
            &self.l,
            &self.r,
            &self.l_bar,
            &self.l_audit,
            v,
            v2,
        ];
        bound_challenge(&self.prefix(config), &statement, &commitments)
    }
}

// ========================= Ex-post audit =========================

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExPostInputs {
    pub y: Point,
    pub y_bar: Point,
    pub l: Point,
    pub l_bar: Point,
    pub r: Point,
    /// Settled transaction ciphertext, left part.
    pub tl: Point,
    /// Settled transaction ciphertext, right part.
    pub tr: Point,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExPostProof {
    pub a_x: Point,
    pub a_r: Point,
    pub a_l: Point,
    pub a_bar: Point,
    pub a_t: Point,
    pub s_x: Scalar,
    pub s_b: Scalar,
    pub s_r: Scalar,
}

impl ExPostInputs {
    pub fn prefix(&self, config: &ProtocolConfig) -> Felt {
        expost_prefix(config, &self.y, &self.y_bar, &self.tl, &self.tr)
    }

    pub fn challenge(&self, config: &ProtocolConfig, commitments: [&Point; 5]) -> Scalar {
        let statement = [&self.y, &self.y_bar, &self.l, &self.l_bar, &self.r, &self.tl, &self.tr];
        bound_challenge(&self.prefix(config), &statement, &commitments)
    }
}
