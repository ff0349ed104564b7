//! Secret key holder.
//!
//! `SecretKey` implements none of `Clone`, `Debug`, `Display`
//! or `Serialize`; the bytes are wiped on drop.

use rand::RngCore;
use zeroize::Zeroizing;

use crate::curve::{random_scalar, Point, Scalar};
use crate::{Error, Result};

pub struct SecretKey {
    bytes: Zeroizing<[u8; 32]>,
}

impl SecretKey {
    /// Wrap a scalar; zero is not a valid key.
    pub fn from_scalar(scalar: Scalar) -> Result<Self> {
        if scalar.is_zero() {
            return Err(Error::InvalidScalar("zero is not a valid private key"));
        }
        Ok(Self {
            bytes: Zeroizing::new(scalar.to_bytes_be()),
        })
    }

    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self> {
        Self::from_scalar(Scalar::from_bytes_be(bytes)?)
    }

    pub fn from_hex(s: &str) -> Result<Self> {
        Self::from_scalar(Scalar::from_hex(s)?)
    }

    pub fn random<R: RngCore + ?Sized>(rng: &mut R) -> Self {
        Self {
            bytes: Zeroizing::new(random_scalar(rng).to_bytes_be()),
        }
    }

    /// The secret scalar. Callers must not log or persist it.
    pub fn scalar(&self) -> Scalar {
        // Stored bytes were canonical and non-zero when the key was built.
        Scalar::from_bytes_mod_order(&self.bytes[..])
    }

    /// `x·G`.
    pub fn public_key(&self) -> Point {
        Point::generator().mul(&self.scalar())
    }
}
