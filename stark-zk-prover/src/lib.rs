//! # stark-zk-prover — Confidential-balance proof generation
//!
//! Client-side proving for confidential balances held as ElGamal ciphertexts
//! on the Stark curve. A [`Prover`] owns the account secret and dispatches to
//! a registry of [`ProofStrategy`] implementations:
//!
//! - `fund` - knowledge of the account key, bound to a deposit nonce
//! - `withdraw_all` - the whole encrypted balance equals a public amount
//! - `withdraw` - a public amount is taken out and the remainder stays in range
//! - `transfer` - one amount re-encrypted to self, recipient and auditor
//! - `expost` - a settled transaction re-encrypted toward an auditor
//!
//! Custom strategies can be registered under any name and exchange
//! `serde_json::Value` payloads.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use stark_zk_prover::{FundParams, Prover};
//! use stark_zk_primitives::SecretKey;
//!
//! let mut prover = Prover::new(SecretKey::from_hex("0x3039")?);
//! let funded = prover.fund(FundParams { nonce: 123 })?;
//!
//! // Submit funded.inputs and funded.proof on chain
//! ```
//!
//! Stealth addresses live in [`stealth`] and do not need a `Prover`.
//!
//! ## Security Notes
//!
//! - Sigma nonces are drawn fresh for every proof from the prover's RNG
//! - Proof outputs carry commitments and responses only, never the secret
//! - Every challenge is bound to the deployment domain and the call data

pub mod prover;
pub mod stealth;
pub mod strategies;
pub mod strategy;
#[cfg(test)]
mod tests;

pub use prover::Prover;
pub use stealth::{Announcement, StealthAddress, StealthScheme};
pub use strategies::{
    ExPostParams, ExPostStrategy, FundParams, FundStrategy, TransferParams, TransferStrategy,
    WithdrawAllParams, WithdrawAllStrategy, WithdrawParams, WithdrawStrategy,
};
pub use strategy::{
    OperationKind, PrefixContext, ProofBundle, ProofContext, ProofOutput, ProofRequest,
    ProofStrategy,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProverError {
    #[error(transparent)]
    Primitive(#[from] stark_zk_primitives::Error),
    #[error("unknown proof type: {0}")]
    UnknownProofType(String),
    #[error("request does not match strategy: {0}")]
    MismatchedRequest(&'static str),
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    #[error("arithmetic overflow in {0}")]
    Overflow(&'static str),
    #[error("derived stealth key is zero")]
    DegenerateKey,
    #[error("strategy failed: {0}")]
    Strategy(String),
}
