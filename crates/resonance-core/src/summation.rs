// ─────────────────────────────────────────────────────────────────────
// Resonance Kernel — Floating Accumulators
// ─────────────────────────────────────────────────────────────────────
//! Running sums for J(x) and π̃(x).
//!
//! `Compensated` is Neumaier's variant of Kahan summation: the lost
//! low-order bits of every addition are carried in `compensation` and
//! folded back in on read.

use resonance_types::SummationMode;

#[derive(Debug, Clone, Copy)]
pub struct Accumulator {
    mode: SummationMode,
    sum: f64,
    compensation: f64,
    abs_mass: f64,
    terms: u64,
}

impl Accumulator {
    pub fn new(mode: SummationMode) -> Self {
        Self {
            mode,
            sum: 0.0,
            compensation: 0.0,
            abs_mass: 0.0,
            terms: 0,
        }
    }

    #[inline]
    pub fn add(&mut self, x: f64) {
        self.abs_mass += x.abs();
        self.terms += 1;
        match self.mode {
            SummationMode::Naive => self.sum += x,
            SummationMode::Compensated => {
                let t = self.sum + x;
                if self.sum.abs() >= x.abs() {
                    self.compensation += (self.sum - t) + x;
                } else {
                    self.compensation += (x - t) + self.sum;
                }
                self.sum = t;
            }
        }
    }

    #[inline]
    pub fn value(&self) -> f64 {
        self.sum + self.compensation
    }

    /// A-priori bound on the accumulated rounding error.
    ///
    /// Naive: (n − 1)·u·Σ|x_i|. Compensated: 2u·Σ|x_i|.
    pub fn error_bound(&self) -> f64 {
        let u = f64::EPSILON / 2.0;
        match self.mode {
            SummationMode::Naive => self.terms.saturating_sub(1) as f64 * u * self.abs_mass,
            SummationMode::Compensated => 2.0 * u * self.abs_mass,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_naive_sum() {
        let mut acc = Accumulator::new(SummationMode::Naive);
        for x in [1.0, 2.0, 3.5] {
            acc.add(x);
        }
        assert_eq!(acc.value(), 6.5);
    }

    #[test]
    fn test_compensated_recovers_small_terms() {
        let mut naive = Accumulator::new(SummationMode::Naive);
        let mut comp = Accumulator::new(SummationMode::Compensated);
        for x in [1.0, 1e100, 1.0, -1e100] {
            naive.add(x);
            comp.add(x);
        }
        assert_eq!(naive.value(), 0.0);
        assert_eq!(comp.value(), 2.0);
    }

    #[test]
    fn test_error_bound_shrinks_with_compensation() {
        let mut naive = Accumulator::new(SummationMode::Naive);
        let mut comp = Accumulator::new(SummationMode::Compensated);
        for i in 0..1000 {
            let x = 0.1 * i as f64;
            naive.add(x);
            comp.add(x);
        }
        assert!(comp.error_bound() < naive.error_bound());
        assert!((comp.value() - 49_950.0).abs() < 1e-9);
    }
}
