//! Dual-key stealth addresses.
//!
//! A recipient publishes a spend key `X = x·G` and a view key `Y = y·G`. The
//! sender picks `r`, publishes `R = r·G` and pays to `P = X + k·G` where
//! `k = H(tag, r·Y)`. With `y` alone the recipient recognises `P` (since
//! `y·R == r·Y`); with `x` as well it derives the spending key `x + k`.
//!
//! Sender and recipient must use the same tag, otherwise the recomputed
//! address simply does not match.

use rand::RngCore;
use serde::{Deserialize, Serialize};
use stark_zk_primitives::challenge::{challenge_compressed, short_string};
use stark_zk_primitives::{random_scalar, Felt, Point, Scalar, SecretKey};
use subtle::ConstantTimeEq;

use crate::ProverError;

const DEFAULT_TAG: &str = "stark-zk/stealth";

/// Sender-side result of [`StealthScheme::create`]. `r` is the ephemeral
/// secret and should be discarded once `ephemeral_key` is published.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StealthAddress {
    pub r: Scalar,
    pub ephemeral_key: Point,
    pub address: Point,
}

/// What a recipient sees on chain: `(R, P)`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Announcement {
    pub ephemeral_key: Point,
    pub address: Point,
}

impl From<&StealthAddress> for Announcement {
    fn from(s: &StealthAddress) -> Self {
        Self {
            ephemeral_key: s.ephemeral_key.clone(),
            address: s.address.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StealthScheme {
    tag: Felt,
}

impl Default for StealthScheme {
    fn default() -> Self {
        Self {
            tag: short_string(DEFAULT_TAG),
        }
    }
}

impl StealthScheme {
    pub fn new(tag: Felt) -> Self {
        Self { tag }
    }

    pub fn tag(&self) -> &Felt {
        &self.tag
    }

    /// `k = H(tag, shared)` over the compressed shared point.
    pub fn tweak(&self, shared: &Point) -> Scalar {
        challenge_compressed(&self.tag, &[shared])
    }

    /// Create a one-time address for the owner of `(spend_key, view_key)`.
    pub fn create<R: RngCore + ?Sized>(
        &self,
        spend_key: &Point,
        view_key: &Point,
        rng: &mut R,
    ) -> Result<StealthAddress, ProverError> {
        spend_key.ensure_public_key()?;
        view_key.ensure_public_key()?;

        let r = random_scalar(rng);
        let ephemeral_key = Point::generator().mul(&r);
        let k = self.tweak(&view_key.mul(&r));
        let address = spend_key + &Point::generator().mul(&k);
        Ok(StealthAddress {
            r,
            ephemeral_key,
            address,
        })
    }

    /// Whether `address` was created for `(spend_key, view_secret)`.
    /// Invalid or malformed inputs are reported as not owned.
    pub fn check_ownership(
        &self,
        view_secret: &SecretKey,
        spend_key: &Point,
        ephemeral_key: &Point,
        address: &Point,
    ) -> bool {
        if ephemeral_key.ensure_public_key().is_err() || spend_key.ensure_public_key().is_err() {
            return false;
        }
        let k = self.tweak(&ephemeral_key.mul(&view_secret.scalar()));
        let expected = spend_key + &Point::generator().mul(&k);
        bool::from(expected.to_encoded(false).ct_eq(&address.to_encoded(false)))
    }

    /// Spending key `x + k` for an owned address.
    ///
    /// # Errors
    /// * `ProverError::DegenerateKey` - If `x + k == 0 mod n`
    pub fn derive_private_key(
        &self,
        spend_secret: &SecretKey,
        view_secret: &SecretKey,
        ephemeral_key: &Point,
    ) -> Result<SecretKey, ProverError> {
        ephemeral_key.ensure_public_key()?;
        let k = self.tweak(&ephemeral_key.mul(&view_secret.scalar()));
        let derived = spend_secret.scalar() + k;
        if derived.is_zero() {
            return Err(ProverError::DegenerateKey);
        }
        Ok(SecretKey::from_scalar(derived)?)
    }

    /// Indices of the announcements owned by `(spend_key, view_secret)`.
    pub fn scan(
        &self,
        view_secret: &SecretKey,
        spend_key: &Point,
        announcements: &[Announcement],
    ) -> Vec<usize> {
        announcements
            .iter()
            .enumerate()
            .filter(|(_, a)| {
                self.check_ownership(view_secret, spend_key, &a.ephemeral_key, &a.address)
            })
            .map(|(i, _)| i)
            .collect()
    }
}
