use std::collections::BTreeMap;

use log::{debug, trace};
use rand::rngs::ThreadRng;
use rand::CryptoRng;
use stark_zk_primitives::cipher::CipherBackend;
use stark_zk_primitives::operations::{
    ExPostInputs, ExPostProof, FundInputs, FundProof, TransferInputs, TransferProof,
    WithdrawAllInputs, WithdrawAllProof, WithdrawInputs, WithdrawProof,
};
use stark_zk_primitives::{Felt, Point, ProtocolConfig, SecretKey, She};

use crate::strategies::{
    ExPostParams, FundParams, TransferParams, WithdrawAllParams, WithdrawParams,
};
use crate::strategy::{
    OperationKind, PrefixContext, ProofBundle, ProofContext, ProofOutput, ProofRequest,
    ProofStrategy,
};
use crate::ProverError;

/// Holds the account secret and dispatches proof requests to named strategies.
///
/// The five built-in operations are registered on construction; [`register`]
/// adds or replaces entries. The secret never leaves the prover: outputs only
/// carry commitments, responses and public inputs.
///
/// [`register`]: Prover::register
pub struct Prover<R: CryptoRng = ThreadRng> {
    secret: SecretKey,
    public_key: Point,
    rng: R,
    backend: Box<dyn CipherBackend>,
    config: ProtocolConfig,
    strategies: BTreeMap<String, Box<dyn ProofStrategy>>,
}

impl Prover<ThreadRng> {
    /// Prover drawing nonces from the thread-local CSPRNG.
    pub fn new(secret: SecretKey) -> Self {
        Self::with_rng(secret, rand::rng())
    }
}

impl<R: CryptoRng> Prover<R> {
    /// Prover with a caller-supplied RNG, e.g. a seeded `ChaCha20Rng` in tests.
    pub fn with_rng(secret: SecretKey, rng: R) -> Self {
        let public_key = secret.public_key();
        let strategies = OperationKind::ALL
            .into_iter()
            .map(|kind| (kind.name().to_string(), kind.strategy()))
            .collect();
        Self {
            secret,
            public_key,
            rng,
            backend: Box::new(She),
            config: ProtocolConfig::default(),
            strategies,
        }
    }

    pub fn with_config(mut self, config: ProtocolConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_backend(mut self, backend: impl CipherBackend + 'static) -> Self {
        self.backend = Box::new(backend);
        self
    }

    /// `x·G`.
    pub fn public_key(&self) -> &Point {
        &self.public_key
    }

    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    /// Registered strategy names in lexicographic order.
    pub fn strategies(&self) -> impl Iterator<Item = &str> {
        self.strategies.keys().map(String::as_str)
    }

    /// Insert a strategy under `name`, returning the one it replaces.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        strategy: Box<dyn ProofStrategy>,
    ) -> Option<Box<dyn ProofStrategy>> {
        let name = name.into();
        trace!(target: "prover", "registering strategy {name}");
        self.strategies.insert(name, strategy)
    }

    /// Prefix the strategy under `name` would bind `request` to. Draws no
    /// randomness.
    pub fn prefix(&self, name: &str, request: &ProofRequest) -> Result<Felt, ProverError> {
        let strategy = self
            .strategies
            .get(name)
            .ok_or_else(|| ProverError::UnknownProofType(name.to_string()))?;
        let ctx = PrefixContext {
            public_key: &self.public_key,
            config: &self.config,
        };
        strategy.prefix(&ctx, request)
    }

    /// Run the strategy registered under `name`.
    ///
    /// # Errors
    /// * `ProverError::UnknownProofType` - If nothing is registered under `name`
    /// * Any error of the strategy itself
    pub fn prove(
        &mut self,
        name: &str,
        request: &ProofRequest,
    ) -> Result<ProofBundle, ProverError> {
        let strategy = self
            .strategies
            .get(name)
            .ok_or_else(|| ProverError::UnknownProofType(name.to_string()))?;
        let mut ctx = ProofContext::new(
            &self.secret,
            &self.public_key,
            &mut self.rng,
            self.backend.as_ref(),
            &self.config,
        );
        let bundle = strategy.prove(&mut ctx, request);
        if let Err(err) = &bundle {
            debug!(target: "prover", "{name} proof failed: {err}");
        }
        bundle
    }

    pub fn fund(
        &mut self,
        params: FundParams,
    ) -> Result<ProofOutput<FundInputs, FundProof>, ProverError> {
        match self.prove(OperationKind::Fund.name(), &ProofRequest::Fund(params))? {
            ProofBundle::Fund(out) => Ok(out),
            _ => Err(ProverError::MismatchedRequest("fund strategy returned another operation")),
        }
    }

    pub fn withdraw_all(
        &mut self,
        params: WithdrawAllParams,
    ) -> Result<ProofOutput<WithdrawAllInputs, WithdrawAllProof>, ProverError> {
        match self.prove(OperationKind::WithdrawAll.name(), &ProofRequest::WithdrawAll(params))? {
            ProofBundle::WithdrawAll(out) => Ok(out),
            _ => Err(ProverError::MismatchedRequest(
                "withdraw_all strategy returned another operation",
            )),
        }
    }

    pub fn withdraw(
        &mut self,
        params: WithdrawParams,
    ) -> Result<ProofOutput<WithdrawInputs, WithdrawProof>, ProverError> {
        match self.prove(OperationKind::Withdraw.name(), &ProofRequest::Withdraw(params))? {
            ProofBundle::Withdraw(out) => Ok(out),
            _ => Err(ProverError::MismatchedRequest(
                "withdraw strategy returned another operation",
            )),
        }
    }

    pub fn transfer(
        &mut self,
        params: TransferParams,
    ) -> Result<ProofOutput<TransferInputs, TransferProof>, ProverError> {
        match self.prove(OperationKind::Transfer.name(), &ProofRequest::Transfer(params))? {
            ProofBundle::Transfer(out) => Ok(out),
            _ => Err(ProverError::MismatchedRequest(
                "transfer strategy returned another operation",
            )),
        }
    }

    pub fn audit_ex_post(
        &mut self,
        params: ExPostParams,
    ) -> Result<ProofOutput<ExPostInputs, ExPostProof>, ProverError> {
        match self.prove(OperationKind::ExPost.name(), &ProofRequest::ExPost(params))? {
            ProofBundle::ExPost(out) => Ok(out),
            _ => Err(ProverError::MismatchedRequest("expost strategy returned another operation")),
        }
    }
}
