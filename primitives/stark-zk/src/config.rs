use serde::{Deserialize, Serialize};
use starknet_types_core::felt::Felt;

use crate::challenge::short_string;
use crate::curve::Point;
use crate::generators::{hash_to_curve, AUDITOR_TAG};

/// Deployment-wide protocol parameters shared by provers and verifiers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolConfig {
    /// Folded into every operation prefix; binds proofs to one deployment
    /// (e.g. a hash of chain id and contract address).
    pub domain: Felt,
    /// Public key that every transfer amount is additionally encrypted to.
    pub auditor_key: Point,
}

impl ProtocolConfig {
    pub fn new(domain: Felt, auditor_key: Point) -> Self {
        Self {
            domain,
            auditor_key,
        }
    }
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            domain: short_string("stark-zk/v1"),
            auditor_key: hash_to_curve(AUDITOR_TAG),
        }
    }
}
