//! Built-in strategies, one module per operation.

mod expost;
mod fund;
mod transfer;
mod withdraw;
mod withdraw_all;

pub use expost::{prove_expost, ExPostParams, ExPostStrategy};
pub use fund::{prove_fund, FundParams, FundStrategy};
pub use transfer::{prove_transfer, TransferParams, TransferStrategy};
pub use withdraw::{prove_withdraw, WithdrawParams, WithdrawStrategy};
pub use withdraw_all::{prove_withdraw_all, WithdrawAllParams, WithdrawAllStrategy};

use stark_zk_primitives::{Amount, Ciphertext, Point, Scalar};

use crate::ProverError;

/// `CL - b·G == x·CR`: the ciphertext holds `b` under the prover's key.
fn holds_balance(balance: &Ciphertext, x: &Scalar, b: Amount) -> bool {
    let opened = &balance.l - &Point::generator().mul(&Scalar::from(b));
    opened == balance.r.mul(x)
}

fn ensure_balance(balance: &Ciphertext, x: &Scalar, b: Amount) -> Result<(), ProverError> {
    if holds_balance(balance, x, b) {
        Ok(())
    } else {
        Err(ProverError::InvalidInput("balance does not match the encrypted balance"))
    }
}
