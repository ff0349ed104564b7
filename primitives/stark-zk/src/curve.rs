//! Scalars and points on the Stark curve.
//!
//! The curve is `y^2 = x^3 + x + beta` over the Starknet field. Arithmetic is
//! delegated to `starknet-types-core`; this module adds the scalar field
//! (integers modulo the group order `n`), hex/byte codecs and the handling of
//! the point at infinity, whose affine coordinates are `(0, 0)`.
//!
//! Encodings:
//! ```text
//! scalar        0x || 32-byte big-endian
//! uncompressed  0x04 || x(32) || y(32)
//! compressed    0x02|0x03 || x(32)      (by parity of y)
//! infinity      0x00
//! ```

use core::fmt;
use core::ops::{Add, Mul, Neg, Sub};
use std::sync::LazyLock;

use num_bigint::BigUint;
use num_traits::Zero;
use rand::RngCore;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use starknet_types_core::curve::ProjectivePoint;
use starknet_types_core::felt::Felt;

use crate::{Error, Result};

/// `n` as 32 big-endian bytes.
const CURVE_ORDER_BE: [u8; 32] = [
    0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x10, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xb7, 0x81, 0x12, 0x6d, 0xca, 0xe7, 0xb2, 0x32, 0x1e, 0x66, 0xa2, 0x41, 0xad, 0xc6, 0x4d, 0x2f,
];
const GENERATOR_X: Felt =
    Felt::from_hex_unchecked("0x01ef15c18599971b7beced415a40f0c7deacfd9b0d1819e03d723d8bc943cfca");
const GENERATOR_Y: Felt =
    Felt::from_hex_unchecked("0x005668060aa49730b7be4801df46ec62de53ecd11abe43a32873000c36e8dc1f");
/// Curve constant `beta` (`alpha` is one).
pub const BETA: Felt =
    Felt::from_hex_unchecked("0x06f21413efbe40de150e596d72f7a8c5609ad26c15c915c1f4cdfcb99cee9e89");

static ORDER: LazyLock<BigUint> = LazyLock::new(|| BigUint::from_bytes_be(&CURVE_ORDER_BE));

// Fixed curve constants; membership is asserted in `generator_is_on_the_curve`.
static GENERATOR: LazyLock<Point> =
    LazyLock::new(|| Point(ProjectivePoint::from_affine_unchecked(GENERATOR_X, GENERATOR_Y)));

/// Group order `n` of the Stark curve.
pub fn curve_order() -> &'static BigUint {
    &ORDER
}

// ========================= Scalars =========================

/// Integer modulo the curve order. Always held in canonical form (`< n`).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Scalar(Felt);

impl Scalar {
    pub const ZERO: Scalar = Scalar(Felt::ZERO);
    pub const ONE: Scalar = Scalar(Felt::ONE);

    /// Parse a canonical 32-byte big-endian scalar. Values `>= n` are rejected.
    pub fn from_bytes_be(bytes: &[u8; 32]) -> Result<Self> {
        let felt = Felt::from_bytes_be(bytes);
        if felt.to_bytes_be() != *bytes {
            return Err(Error::InvalidScalar("scalar exceeds the field modulus"));
        }
        Self::try_from_felt(&felt)
            .ok_or(Error::InvalidScalar("scalar is not below the curve order"))
    }

    /// Reduce an arbitrary big-endian byte string modulo `n`.
    pub fn from_bytes_mod_order(bytes: &[u8]) -> Self {
        Self::from_biguint(&BigUint::from_bytes_be(bytes))
    }

    /// `Some` when the field element is already below `n`.
    pub fn try_from_felt(felt: &Felt) -> Option<Self> {
        (to_biguint(felt) < *ORDER).then_some(Scalar(*felt))
    }

    /// Reduce a field element modulo `n`.
    pub fn from_felt_mod_order(felt: &Felt) -> Self {
        Self::from_biguint(&to_biguint(felt))
    }

    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = decode_hex(s)?;
        if bytes.len() > 32 {
            return Err(Error::MalformedEncoding("scalar longer than 32 bytes"));
        }
        let mut out = [0u8; 32];
        out[32 - bytes.len()..].copy_from_slice(&bytes);
        Self::from_bytes_be(&out)
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.to_bytes_be()))
    }

    pub fn to_bytes_be(&self) -> [u8; 32] {
        self.0.to_bytes_be()
    }

    pub fn to_felt(&self) -> Felt {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == Felt::ZERO
    }

    fn from_biguint(v: &BigUint) -> Self {
        let reduced = v % &*ORDER;
        Scalar(felt_from_biguint(&reduced))
    }

    fn to_biguint(self) -> BigUint {
        to_biguint(&self.0)
    }
}

impl From<u64> for Scalar {
    fn from(v: u64) -> Self {
        Scalar(Felt::from(v))
    }
}

impl From<u32> for Scalar {
    fn from(v: u32) -> Self {
        Scalar(Felt::from(v))
    }
}

impl Add for Scalar {
    type Output = Scalar;
    fn add(self, rhs: Scalar) -> Scalar {
        Scalar::from_biguint(&(self.to_biguint() + rhs.to_biguint()))
    }
}

impl Sub for Scalar {
    type Output = Scalar;
    fn sub(self, rhs: Scalar) -> Scalar {
        self + (-rhs)
    }
}

impl Mul for Scalar {
    type Output = Scalar;
    fn mul(self, rhs: Scalar) -> Scalar {
        Scalar::from_biguint(&(self.to_biguint() * rhs.to_biguint()))
    }
}

impl Neg for Scalar {
    type Output = Scalar;
    fn neg(self) -> Scalar {
        let v = self.to_biguint();
        if v.is_zero() {
            return self;
        }
        Scalar(felt_from_biguint(&(&*ORDER - v)))
    }
}

impl fmt::Debug for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Scalar({})", self.to_hex())
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Scalar {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> core::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Scalar::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Uniform scalar in `[1, n-1]`.
///
/// Draws 64 bytes and reduces them modulo `n` so the bias is negligible; a
/// zero result is re-drawn.
pub fn random_scalar<R: RngCore + ?Sized>(rng: &mut R) -> Scalar {
    loop {
        let mut bytes = [0u8; 64];
        rng.fill_bytes(&mut bytes);
        let s = Scalar::from_bytes_mod_order(&bytes);
        if !s.is_zero() {
            return s;
        }
    }
}

// ========================= Points =========================

/// Element of the Stark curve group. Only valid curve points can be built.
#[derive(Clone)]
pub struct Point(ProjectivePoint);

impl Point {
    /// The standard Stark generator `G`.
    pub fn generator() -> Point {
        GENERATOR.clone()
    }

    pub fn identity() -> Point {
        Point(ProjectivePoint::identity())
    }

    pub fn is_identity(&self) -> bool {
        self.0 == ProjectivePoint::identity()
    }

    /// Build from affine coordinates; `(0, 0)` is the point at infinity.
    pub fn from_affine(x: Felt, y: Felt) -> Result<Point> {
        if x == Felt::ZERO && y == Felt::ZERO {
            return Ok(Point::identity());
        }
        ProjectivePoint::from_affine(x, y)
            .map(Point)
            .map_err(|_| Error::InvalidPoint("coordinates are not on the Stark curve"))
    }

    /// Recover a point from its x-coordinate and the parity of y.
    pub fn decompress(x: Felt, odd: bool) -> Result<Point> {
        let rhs = x * x * x + x + BETA;
        let root = rhs
            .sqrt()
            .ok_or(Error::InvalidPoint("x-coordinate has no point on the curve"))?;
        let y = if is_odd(&root) == odd { root } else { Felt::ZERO - root };
        Point::from_affine(x, y)
    }

    /// Affine coordinates, `(0, 0)` for infinity.
    pub fn affine(&self) -> (Felt, Felt) {
        if self.is_identity() {
            return (Felt::ZERO, Felt::ZERO);
        }
        self.0
            .to_affine()
            .map(|p| (p.x(), p.y()))
            .unwrap_or((Felt::ZERO, Felt::ZERO))
    }

    pub fn x(&self) -> Felt {
        self.affine().0
    }

    /// Parity bit of the affine y-coordinate.
    pub fn y_parity(&self) -> bool {
        is_odd(&self.affine().1)
    }

    /// Re-check curve membership from the affine coordinates.
    ///
    /// The curve has cofactor one, so membership implies subgroup membership.
    pub fn validate(&self) -> Result<()> {
        let (x, y) = self.affine();
        Point::from_affine(x, y).map(|_| ())
    }

    /// Reject the point at infinity where a public key is expected.
    pub fn ensure_public_key(&self) -> Result<()> {
        self.validate()?;
        if self.is_identity() {
            return Err(Error::InvalidPoint("point at infinity is not a valid public key"));
        }
        Ok(())
    }

    pub fn mul(&self, k: &Scalar) -> Point {
        Point(&self.0 * k.to_felt())
    }

    /// SEC1-style bytes; infinity is the single byte `0x00`.
    pub fn to_encoded(&self, compressed: bool) -> Vec<u8> {
        if self.is_identity() {
            return vec![0x00];
        }
        let (x, y) = self.affine();
        let mut out = Vec::with_capacity(65);
        if compressed {
            out.push(if is_odd(&y) { 0x03 } else { 0x02 });
            out.extend_from_slice(&x.to_bytes_be());
        } else {
            out.push(0x04);
            out.extend_from_slice(&x.to_bytes_be());
            out.extend_from_slice(&y.to_bytes_be());
        }
        out
    }

    pub fn from_encoded(bytes: &[u8]) -> Result<Point> {
        match bytes {
            [0x00] => Ok(Point::identity()),
            [0x04, rest @ ..] if rest.len() == 64 => {
                let x = canonical_felt(&rest[..32])?;
                let y = canonical_felt(&rest[32..])?;
                Point::from_affine(x, y)
            }
            [tag @ (0x02 | 0x03), rest @ ..] if rest.len() == 32 => {
                let x = canonical_felt(rest)?;
                Point::decompress(x, *tag == 0x03)
            }
            _ => Err(Error::MalformedEncoding("unrecognized point encoding")),
        }
    }

    pub fn to_hex(&self, compressed: bool) -> String {
        format!("0x{}", hex::encode(self.to_encoded(compressed)))
    }

    /// Accepts the compressed, uncompressed and infinity forms.
    pub fn from_hex(s: &str) -> Result<Point> {
        Point::from_encoded(&decode_hex(s)?)
    }
}

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        self.affine() == other.affine()
    }
}

impl Eq for Point {}

impl Add<&Point> for &Point {
    type Output = Point;
    fn add(self, rhs: &Point) -> Point {
        Point(&self.0 + &rhs.0)
    }
}

impl Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        &self + &rhs
    }
}

impl Neg for &Point {
    type Output = Point;
    fn neg(self) -> Point {
        if self.is_identity() {
            return Point::identity();
        }
        let (x, y) = self.affine();
        // (x, -y) is on the curve whenever (x, y) is.
        Point::from_affine(x, Felt::ZERO - y).unwrap_or_else(|_| Point::identity())
    }
}

impl Sub<&Point> for &Point {
    type Output = Point;
    fn sub(self, rhs: &Point) -> Point {
        self + &(-rhs)
    }
}

impl Mul<&Scalar> for &Point {
    type Output = Point;
    fn mul(self, k: &Scalar) -> Point {
        Point::mul(self, k)
    }
}

impl fmt::Debug for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Point({})", self.to_hex(false))
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex(false))
    }
}

impl Serialize for Point {
    fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex(false))
    }
}

impl<'de> Deserialize<'de> for Point {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> core::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Point::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Check raw affine coordinates for curve membership.
pub fn assert_on_curve(x: Felt, y: Felt) -> Result<()> {
    Point::from_affine(x, y).map(|_| ())
}

// ========================= helpers =========================

fn is_odd(f: &Felt) -> bool {
    f.to_bytes_be()[31] & 1 == 1
}

fn to_biguint(f: &Felt) -> BigUint {
    BigUint::from_bytes_be(&f.to_bytes_be())
}

fn felt_from_biguint(v: &BigUint) -> Felt {
    let bytes = v.to_bytes_be();
    let mut out = [0u8; 32];
    out[32 - bytes.len()..].copy_from_slice(&bytes);
    Felt::from_bytes_be(&out)
}

/// Field element from exactly 32 bytes, rejecting values `>= p`.
pub(crate) fn canonical_felt(bytes: &[u8]) -> Result<Felt> {
    let arr: [u8; 32] = bytes
        .try_into()
        .map_err(|_| Error::MalformedEncoding("field element must be 32 bytes"))?;
    let felt = Felt::from_bytes_be(&arr);
    if felt.to_bytes_be() != arr {
        return Err(Error::MalformedEncoding("field element is not canonical"));
    }
    Ok(felt)
}

/// Decode `0x`-prefixed (or bare) hex; odd lengths are left-padded.
pub(crate) fn decode_hex(s: &str) -> Result<Vec<u8>> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    if digits.is_empty() {
        return Err(Error::MalformedEncoding("empty hex string"));
    }
    let decoded = if digits.len() % 2 == 1 {
        hex::decode(format!("0{digits}"))
    } else {
        hex::decode(digits)
    };
    decoded.map_err(|_| Error::MalformedEncoding("invalid hex digit"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn generator_is_on_the_curve() {
        assert!(assert_on_curve(GENERATOR_X, GENERATOR_Y).is_ok());
        assert_eq!(Point::generator().affine(), (GENERATOR_X, GENERATOR_Y));
        assert!(!Point::generator().is_identity());
    }

    #[test]
    fn order_constant_matches_hex() {
        assert_eq!(
            hex::encode(CURVE_ORDER_BE),
            "0800000000000010ffffffffffffffffb781126dcae7b2321e66a241adc64d2f"
        );
        assert!(!curve_order().is_zero());
    }

    #[test]
    fn scalar_arithmetic_wraps_at_the_order() {
        let minus_one = -Scalar::ONE;
        assert_eq!(minus_one + Scalar::ONE, Scalar::ZERO);
        assert_eq!(Scalar::from(7u64) * Scalar::from(6u64), Scalar::from(42u64));
        assert_eq!(Scalar::from(3u64) - Scalar::from(5u64), -Scalar::from(2u64));
        assert_eq!(-Scalar::ZERO, Scalar::ZERO);
    }

    #[test]
    fn order_times_generator_is_identity() {
        let g = Point::generator();
        let n_minus_one = -Scalar::ONE;
        assert_eq!(&g.mul(&n_minus_one) + &g, Point::identity());
        assert_eq!(g.mul(&n_minus_one), -&g);
    }

    #[test]
    fn scalar_hex_rejects_order_and_garbage() {
        let order_hex = format!("0x{}", hex::encode(CURVE_ORDER_BE));
        assert!(matches!(Scalar::from_hex(&order_hex), Err(Error::InvalidScalar(_))));
        assert!(matches!(Scalar::from_hex("0xzz"), Err(Error::MalformedEncoding(_))));
        assert!(matches!(Scalar::from_hex("0x"), Err(Error::MalformedEncoding(_))));
        assert_eq!(Scalar::from_hex("0x3039").unwrap(), Scalar::from(12345u64));
        assert_eq!(Scalar::from_hex("abc").unwrap(), Scalar::from(0xabcu64));
    }

    #[test]
    fn point_hex_both_forms_decode_to_same_point() {
        let mut rng = ChaCha20Rng::from_seed([3u8; 32]);
        for _ in 0..4 {
            let p = Point::generator().mul(&random_scalar(&mut rng));
            let full = p.to_hex(false);
            let short = p.to_hex(true);
            assert_eq!(full.len(), 2 + 130);
            assert_eq!(short.len(), 2 + 66);
            assert_eq!(Point::from_hex(&full).unwrap(), p);
            assert_eq!(Point::from_hex(&short).unwrap(), p);
            assert_eq!(Point::from_hex(&full.to_uppercase().replace("0X", "0x")).unwrap(), p);
        }
    }

    #[test]
    fn infinity_encodings() {
        let inf = Point::identity();
        assert_eq!(inf.affine(), (Felt::ZERO, Felt::ZERO));
        assert_eq!(inf.to_hex(true), "0x00");
        assert_eq!(Point::from_hex("0x00").unwrap(), inf);
        let zeros = format!("0x04{}", "0".repeat(128));
        assert!(Point::from_hex(&zeros).unwrap().is_identity());
        assert!(inf.ensure_public_key().is_err());
    }

    #[test]
    fn off_curve_coordinates_are_rejected() {
        let (x, y) = Point::generator().affine();
        assert!(assert_on_curve(x, y).is_ok());
        assert!(matches!(
            assert_on_curve(x, y + Felt::ONE),
            Err(Error::InvalidPoint(_))
        ));
        let bad = format!(
            "0x04{}{}",
            hex::encode(x.to_bytes_be()),
            hex::encode((y + Felt::ONE).to_bytes_be())
        );
        assert!(matches!(Point::from_hex(&bad), Err(Error::InvalidPoint(_))));
    }

    #[test]
    fn malformed_point_hex_fails_before_arithmetic() {
        assert!(matches!(Point::from_hex("0x05abcd"), Err(Error::MalformedEncoding(_))));
        assert!(matches!(Point::from_hex("not hex"), Err(Error::MalformedEncoding(_))));
        assert!(matches!(
            Point::from_hex(&format!("0x02{}", "ff".repeat(32))),
            Err(Error::MalformedEncoding(_))
        ));
    }

    #[test]
    fn serde_uses_hex_strings() {
        let p = Point::generator();
        let json = serde_json::to_string(&p).unwrap();
        assert!(json.starts_with("\"0x04"));
        let back: Point = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);

        let s = Scalar::from(123u64);
        let back: Scalar = serde_json::from_str(&serde_json::to_string(&s).unwrap()).unwrap();
        assert_eq!(back, s);
    }
}
