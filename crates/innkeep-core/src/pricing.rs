use crate::error::{CoreError, Result};
use crate::money::Amount;
use crate::stay::Stay;
use jiff::Timestamp;

/// Charge for a stay from `check_in` to `check_out` at `nightly_rate`.
///
/// Partial nights round up, so a 25-hour stay bills two nights.
pub fn total_price(
    nightly_rate: Amount,
    check_in: Timestamp,
    check_out: Timestamp,
) -> Result<Amount> {
    price_for(nightly_rate, &Stay::new(check_in, check_out)?)
}

pub fn price_for(nightly_rate: Amount, stay: &Stay) -> Result<Amount> {
    let nights = stay.nights();
    nightly_rate
        .checked_mul(nights)
        .ok_or(CoreError::AmountOverflow {
            rate: nightly_rate.minor_units(),
            nights,
        })
}
