// ─────────────────────────────────────────────────────────────────────
// Resonance Kernel — Seed Generator
// ─────────────────────────────────────────────────────────────────────
//! Structural seed α(n):
//!
//!   α(1) = ±2,  α(even) = 1,  α(odd > 1) = 2
//!
//! Index 0 is an unused sentinel (0.0).

use resonance_types::{check_bound, KernelResult, SeedVariant};

/// α(n) for a single index. α(0) = 0.
#[inline]
pub fn seed_value(n: u64, variant: SeedVariant) -> f64 {
    match n {
        0 => 0.0,
        1 => variant.unit_value(),
        _ if n % 2 == 0 => 1.0,
        _ => 2.0,
    }
}

/// α over [0, n]; requires n ≥ 1.
pub fn generate_seed(n: usize, variant: SeedVariant) -> KernelResult<Vec<f64>> {
    check_bound("n", n as u64, 1)?;
    Ok((0..=n as u64).map(|i| seed_value(i, variant)).collect())
}

/// Integer seed used by Ω synthesis (always the signed variant).
#[inline]
pub(crate) fn signed_seed_int(n: usize) -> i64 {
    match n {
        0 => 0,
        1 => -2,
        _ if n % 2 == 0 => 1,
        _ => 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_values() {
        let alpha = generate_seed(7, SeedVariant::Unsigned).unwrap();
        assert_eq!(alpha, vec![0.0, 2.0, 1.0, 2.0, 1.0, 2.0, 1.0, 2.0]);
    }

    #[test]
    fn test_signed_seed_only_changes_unit() {
        let unsigned = generate_seed(50, SeedVariant::Unsigned).unwrap();
        let signed = generate_seed(50, SeedVariant::Signed).unwrap();
        assert_eq!(signed[1], -2.0);
        assert_eq!(&unsigned[2..], &signed[2..]);
        for i in 0..=50 {
            assert_eq!(signed[i], signed_seed_int(i) as f64, "i={i}");
        }
    }

    #[test]
    fn test_seed_rejects_zero() {
        assert!(generate_seed(0, SeedVariant::Unsigned).is_err());
    }

    #[test]
    fn test_seed_minimum_bound() {
        assert_eq!(generate_seed(1, SeedVariant::Signed).unwrap(), vec![0.0, -2.0]);
    }
}
