//! Default [`CipherBackend`]: exponential ElGamal balances and bit-decomposition
//! range proofs.
//!
//! Decryption solves `b·G = L - x·R` by baby-step giant-step over `[0, 2^32)`.
//! The baby-step table (`2^16` entries) is built once per process.
//!
//! Range proof for `V = b·G + r·H`:
//! ```text
//! V_i = b_i·G + r_i·H           r = Σ 2^i·r_i
//! OR-proof per bit:  V_i = r_i·H   or   V_i - G = r_i·H
//! check:             Σ 2^i·V_i == V
//! ```

use std::collections::HashMap;
use std::sync::LazyLock;

use log::debug;
use rand::RngCore;

use crate::challenge::{challenge, short_string};
use crate::cipher::{Amount, BitProof, CipherBackend, Ciphertext, RangeProof, RANGE_BITS};
use crate::curve::{random_scalar, Point, Scalar};
use crate::generators::pedersen_h;
use crate::sigma::{poe_holds, respond};
use crate::{Error, Result};

const BABY_STEPS: u32 = 1 << 16;
const GIANT_STEPS: u32 = 1 << 16;
const RANGE_TAG: &str = "stark-zk/range-bit";

static BABY_TABLE: LazyLock<HashMap<[u8; 64], u32>> = LazyLock::new(|| {
    let g = Point::generator();
    let mut table = HashMap::with_capacity(BABY_STEPS as usize);
    let mut acc = Point::identity();
    for j in 0..BABY_STEPS {
        table.insert(table_key(&acc), j);
        acc = &acc + &g;
    }
    table
});

fn table_key(p: &Point) -> [u8; 64] {
    let (x, y) = p.affine();
    let mut key = [0u8; 64];
    key[..32].copy_from_slice(&x.to_bytes_be());
    key[32..].copy_from_slice(&y.to_bytes_be());
    key
}

/// Solve `m = b·G` for `b < 2^32`.
fn discrete_log(m: &Point) -> Option<Amount> {
    let giant = -&Point::generator().mul(&Scalar::from(BABY_STEPS));
    let mut cur = m.clone();
    for i in 0..GIANT_STEPS {
        if let Some(j) = BABY_TABLE.get(&table_key(&cur)) {
            return Some(i * BABY_STEPS + j);
        }
        cur = &cur + &giant;
    }
    None
}

#[derive(Clone, Copy, Debug, Default)]
pub struct She;

impl She {
    fn prove_bit(bit: bool, r: &Scalar, rng: &mut dyn RngCore) -> BitProof {
        let g = Point::generator();
        let h = pedersen_h();
        let v = &g.mul(&Scalar::from(u64::from(bit))) + &h.mul(r);
        let targets = [v.clone(), &v - &g];

        // Simulate the branch that does not hold.
        let fake = usize::from(!bit);
        let real = usize::from(bit);
        let c_fake = random_scalar(rng);
        let s_fake = random_scalar(rng);
        let a_fake = &h.mul(&s_fake) - &targets[fake].mul(&c_fake);

        let k = random_scalar(rng);
        let a_real = h.mul(&k);

        let (a0, a1) = if bit { (a_fake, a_real) } else { (a_real, a_fake) };
        let c = challenge(&short_string(RANGE_TAG), &[&v, &a0, &a1]);
        let c_real = c - c_fake;
        let s_real = respond(&k, &c_real, r);

        let mut c_parts = [Scalar::ZERO; 2];
        let mut s_parts = [Scalar::ZERO; 2];
        c_parts[fake] = c_fake;
        s_parts[fake] = s_fake;
        c_parts[real] = c_real;
        s_parts[real] = s_real;

        BitProof {
            v,
            a0,
            a1,
            c0: c_parts[0],
            s0: s_parts[0],
            s1: s_parts[1],
        }
    }

    fn verify_bit(proof: &BitProof) -> bool {
        let h = pedersen_h();
        let c = challenge(&short_string(RANGE_TAG), &[&proof.v, &proof.a0, &proof.a1]);
        let c1 = c - proof.c0;
        let shifted = &proof.v - &Point::generator();
        poe_holds(&proof.s0, &h, &proof.a0, &proof.c0, &proof.v)
            && poe_holds(&proof.s1, &h, &proof.a1, &c1, &shifted)
    }
}

impl CipherBackend for She {
    fn cipher_balance(
        &self,
        public_key: &Point,
        amount: Amount,
        randomness: &Scalar,
    ) -> Ciphertext {
        let g = Point::generator();
        Ciphertext {
            l: &g.mul(&Scalar::from(amount)) + &public_key.mul(randomness),
            r: g.mul(randomness),
        }
    }

    fn decipher_balance(&self, secret: &Scalar, ciphertext: &Ciphertext) -> Result<Amount> {
        let m = &ciphertext.l - &ciphertext.r.mul(secret);
        discrete_log(&m).ok_or(Error::Undecipherable)
    }

    fn prove_range(
        &self,
        amount: Amount,
        bits: u32,
        rng: &mut dyn RngCore,
    ) -> Result<(Scalar, RangeProof)> {
        if bits == 0 || bits > RANGE_BITS {
            return Err(Error::RangeProof("unsupported bit width"));
        }
        if bits < RANGE_BITS && amount >> bits != 0 {
            return Err(Error::RangeProof("amount does not fit in the requested bit width"));
        }

        let mut proofs = Vec::with_capacity(bits as usize);
        let mut r = Scalar::ZERO;
        let mut weight = Scalar::ONE;
        for i in 0..bits {
            let r_i = random_scalar(rng);
            proofs.push(Self::prove_bit((amount >> i) & 1 == 1, &r_i, rng));
            r = r + weight * r_i;
            weight = weight + weight;
        }

        let commitment = &Point::generator().mul(&Scalar::from(amount)) + &pedersen_h().mul(&r);
        Ok((
            r,
            RangeProof {
                commitment,
                bits: proofs,
            },
        ))
    }

    fn verify_range(&self, proof: &RangeProof, bits: u32) -> Option<Point> {
        if proof.bits.len() != bits as usize {
            debug!(target: "she", "range proof has {} bits, expected {bits}", proof.bits.len());
            return None;
        }
        // Horner from the top bit: acc = 2·acc + V_i
        let mut acc = Point::identity();
        for bit in proof.bits.iter().rev() {
            if !Self::verify_bit(bit) {
                debug!(target: "she", "bit proof rejected");
                return None;
            }
            acc = &(&acc + &acc) + &bit.v;
        }
        (acc == proof.commitment).then(|| proof.commitment.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn cipher_then_decipher_recovers_amount() {
        let x = Scalar::from(777u64);
        let y = Point::generator().mul(&x);
        for amount in [0u32, 1, 42, 65_535, 65_536, 1_000_003] {
            let ct = She.cipher_balance(&y, amount, &Scalar::from(12345u64));
            assert_eq!(She.decipher_balance(&x, &ct).unwrap(), amount);
        }
    }

    #[test]
    fn decipher_with_wrong_key_does_not_return_the_amount() {
        let y = Point::generator().mul(&Scalar::from(777u64));
        let ct = She.cipher_balance(&y, 5, &Scalar::from(99u64));
        assert_ne!(She.decipher_balance(&Scalar::from(778u64), &ct).ok(), Some(5));
    }

    #[test]
    fn range_proof_round_trip_and_commitment_opening() {
        let mut rng = ChaCha20Rng::from_seed([9u8; 32]);
        let (r, proof) = She.prove_range(300, RANGE_BITS, &mut rng).unwrap();
        let v = She.verify_range(&proof, RANGE_BITS).expect("valid range proof");
        assert_eq!(v, &Point::generator().mul(&Scalar::from(300u64)) + &pedersen_h().mul(&r));
        assert!(She.verify_range(&proof, 16).is_none());
    }

    #[test]
    fn amount_wider_than_bits_cannot_be_proved() {
        let mut rng = ChaCha20Rng::from_seed([9u8; 32]);
        assert!(matches!(
            She.prove_range(300, 8, &mut rng),
            Err(Error::RangeProof(_))
        ));
        assert!(She.prove_range(255, 8, &mut rng).is_ok());
    }

    #[test]
    fn tampered_bit_or_commitment_is_rejected() {
        let mut rng = ChaCha20Rng::from_seed([4u8; 32]);
        let (_, proof) = She.prove_range(5, 8, &mut rng).unwrap();

        let mut bad = proof.clone();
        bad.bits[2].s1 = bad.bits[2].s1 + Scalar::ONE;
        assert!(She.verify_range(&bad, 8).is_none());

        let mut bad = proof.clone();
        bad.commitment = &bad.commitment + &Point::generator();
        assert!(She.verify_range(&bad, 8).is_none());

        // A commitment to 2 dressed up as a bit must fail the OR-proof.
        let mut bad = proof;
        let two_g = Point::generator().mul(&Scalar::from(2u64));
        bad.bits[0].v = &bad.bits[0].v + &two_g;
        assert!(She.verify_range(&bad, 8).is_none());
    }
}
