//! Checked arithmetic on smallest-unit amounts.
//!
//! Quantities come straight from user input, so every product and sum is
//! checked. Overflow is reported as a validation error, never wrapped.

use crate::error::{LedgerError, LedgerResult};

/// `qty * price`.
pub fn line_amount(qty: u64, price: u64) -> LedgerResult<u64> {
    qty.checked_mul(price)
        .ok_or_else(LedgerError::amount_too_large)
}

pub fn add(total: u64, amount: u64) -> LedgerResult<u64> {
    total
        .checked_add(amount)
        .ok_or_else(LedgerError::amount_too_large)
}

/// Sum of `amounts`, failing on the first overflow.
pub fn sum<I>(amounts: I) -> LedgerResult<u64>
where
    I: IntoIterator<Item = u64>,
{
    amounts.into_iter().try_fold(0, add)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overflow_is_a_validation_error() {
        assert_eq!(line_amount(3, 100).unwrap(), 300);
        assert!(matches!(
            line_amount(u64::MAX, 2),
            Err(LedgerError::Validation(_))
        ));
        assert!(matches!(sum([u64::MAX, 1]), Err(LedgerError::Validation(_))));
        assert_eq!(sum([1, 2, 3]).unwrap(), 6);
    }
}
