//! Strategy seam between the [`Prover`](crate::Prover) and the individual
//! operations.
//!
//! Built-in operations form the closed [`OperationKind`] set; anything else is
//! a boxed [`ProofStrategy`] registered by name and driven through
//! [`ProofRequest::Custom`] / [`ProofBundle::Custom`] JSON payloads.

use core::fmt;
use core::str::FromStr;

use rand::RngCore;
use serde::{Deserialize, Serialize};
use stark_zk_primitives::cipher::CipherBackend;
use stark_zk_primitives::operations::{
    names, ExPostInputs, ExPostProof, FundInputs, FundProof, TransferInputs, TransferProof,
    WithdrawAllInputs, WithdrawAllProof, WithdrawInputs, WithdrawProof,
};
use stark_zk_primitives::{random_scalar, Felt, Point, ProtocolConfig, Scalar, SecretKey};

use crate::strategies::{
    ExPostParams, ExPostStrategy, FundParams, FundStrategy, TransferParams, TransferStrategy,
    WithdrawAllParams, WithdrawAllStrategy, WithdrawParams, WithdrawStrategy,
};
use crate::ProverError;

/// Read-only view a strategy needs to compute a prefix.
#[derive(Clone, Copy)]
pub struct PrefixContext<'a> {
    pub public_key: &'a Point,
    pub config: &'a ProtocolConfig,
}

/// Everything a strategy may use while proving. Built fresh by the prover
/// for every call.
pub struct ProofContext<'a> {
    secret: &'a SecretKey,
    pub public_key: &'a Point,
    pub rng: &'a mut dyn RngCore,
    pub backend: &'a dyn CipherBackend,
    pub config: &'a ProtocolConfig,
}

impl<'a> ProofContext<'a> {
    pub fn new(
        secret: &'a SecretKey,
        public_key: &'a Point,
        rng: &'a mut dyn RngCore,
        backend: &'a dyn CipherBackend,
        config: &'a ProtocolConfig,
    ) -> Self {
        Self {
            secret,
            public_key,
            rng,
            backend,
            config,
        }
    }

    pub fn secret(&self) -> &SecretKey {
        self.secret
    }

    /// Fresh single-use sigma nonce.
    pub fn nonce(&mut self) -> Scalar {
        random_scalar(&mut *self.rng)
    }
}

/// Parameters of one proof request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "params", rename_all = "snake_case")]
pub enum ProofRequest {
    Fund(FundParams),
    WithdrawAll(WithdrawAllParams),
    Withdraw(WithdrawParams),
    Transfer(TransferParams),
    ExPost(ExPostParams),
    Custom(serde_json::Value),
}

/// Public inputs and the proof over them, ready for submission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofOutput<I, P> {
    pub inputs: I,
    pub proof: P,
}

/// Result of [`Prover::prove`](crate::Prover::prove); serialized as
/// `{"type": <operation>, "bundle": <output>}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "bundle", rename_all = "snake_case")]
pub enum ProofBundle {
    Fund(ProofOutput<FundInputs, FundProof>),
    WithdrawAll(ProofOutput<WithdrawAllInputs, WithdrawAllProof>),
    Withdraw(ProofOutput<WithdrawInputs, WithdrawProof>),
    Transfer(ProofOutput<TransferInputs, TransferProof>),
    ExPost(ProofOutput<ExPostInputs, ExPostProof>),
    Custom(serde_json::Value),
}

/// One proof-producing operation.
pub trait ProofStrategy: Send + Sync {
    /// Hash binding the proof to the deployment and the call data.
    fn prefix(&self, ctx: &PrefixContext<'_>, request: &ProofRequest) -> Result<Felt, ProverError>;

    fn prove(
        &self,
        ctx: &mut ProofContext<'_>,
        request: &ProofRequest,
    ) -> Result<ProofBundle, ProverError>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OperationKind {
    Fund,
    WithdrawAll,
    Withdraw,
    Transfer,
    ExPost,
}

impl OperationKind {
    pub const ALL: [OperationKind; 5] = [
        OperationKind::Fund,
        OperationKind::WithdrawAll,
        OperationKind::Withdraw,
        OperationKind::Transfer,
        OperationKind::ExPost,
    ];

    pub fn name(self) -> &'static str {
        match self {
            OperationKind::Fund => names::FUND,
            OperationKind::WithdrawAll => names::WITHDRAW_ALL,
            OperationKind::Withdraw => names::WITHDRAW,
            OperationKind::Transfer => names::TRANSFER,
            OperationKind::ExPost => names::EXPOST,
        }
    }

    pub fn strategy(self) -> Box<dyn ProofStrategy> {
        match self {
            OperationKind::Fund => Box::new(FundStrategy),
            OperationKind::WithdrawAll => Box::new(WithdrawAllStrategy),
            OperationKind::Withdraw => Box::new(WithdrawStrategy),
            OperationKind::Transfer => Box::new(TransferStrategy),
            OperationKind::ExPost => Box::new(ExPostStrategy),
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OperationKind {
    type Err = ProverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OperationKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| ProverError::UnknownProofType(s.to_string()))
    }
}

impl ProofRequest {
    /// Built-in operation this request targets; `None` for custom payloads.
    pub fn kind(&self) -> Option<OperationKind> {
        match self {
            ProofRequest::Fund(_) => Some(OperationKind::Fund),
            ProofRequest::WithdrawAll(_) => Some(OperationKind::WithdrawAll),
            ProofRequest::Withdraw(_) => Some(OperationKind::Withdraw),
            ProofRequest::Transfer(_) => Some(OperationKind::Transfer),
            ProofRequest::ExPost(_) => Some(OperationKind::ExPost),
            ProofRequest::Custom(_) => None,
        }
    }
}
