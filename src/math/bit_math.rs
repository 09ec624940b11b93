use crate::error::MathError;
use alloy_primitives::U256;

/// Index (0-255) of the highest set bit of `x`. Errors on zero input.
pub fn most_significant_bit(x: U256) -> Result<u8, MathError> {
    if x.is_zero() {
        return Err(MathError::ZeroValue);
    }
    Ok(255 - x.leading_zeros() as u8)
}

/// Index (0-255) of the lowest set bit of `x`. Errors on zero input.
pub fn least_significant_bit(x: U256) -> Result<u8, MathError> {
    if x.is_zero() {
        return Err(MathError::ZeroValue);
    }
    Ok(x.trailing_zeros() as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bit_scans_reject_zero() {
        assert_eq!(most_significant_bit(U256::ZERO), Err(MathError::ZeroValue));
        assert_eq!(least_significant_bit(U256::ZERO), Err(MathError::ZeroValue));
    }

    #[test]
    fn bit_scans_on_powers_of_two() {
        for shift in [0usize, 1, 63, 64, 128, 255] {
            let x = U256::ONE << shift;
            assert_eq!(most_significant_bit(x).unwrap() as usize, shift);
            assert_eq!(least_significant_bit(x).unwrap() as usize, shift);
        }
    }

    #[test]
    fn bit_scans_on_mixed_words() {
        // bits 3 and 9 set
        let x = U256::from(0b1000001000u64);
        assert_eq!(most_significant_bit(x).unwrap(), 9);
        assert_eq!(least_significant_bit(x).unwrap(), 3);

        assert_eq!(most_significant_bit(U256::MAX).unwrap(), 255);
        assert_eq!(least_significant_bit(U256::MAX).unwrap(), 0);
    }
}
