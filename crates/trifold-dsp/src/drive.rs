//! Per-band drive — blend of the dry sample and a rational soft clipper.
//!
//!   y = (1 - a) * x + a * softclip(x / (1 - a))
//!
//! At a = 0 the stage is the identity; as a approaches 1 the pre-gain rises
//! towards 1000x and the clipped term dominates, so the output squashes
//! towards +/-1. The clipper saturates at |x| = 3, which keeps the output
//! bounded for any finite input once a > 0.

/// Upper end of the drive amount.
pub const MAX_DRIVE: f64 = 0.999;

/// Rational tanh approximation, exactly +/-1 beyond |x| = 3.
#[inline]
pub fn soft_clip(x: f64) -> f64 {
    if x < -3.0 {
        -1.0
    } else if x > 3.0 {
        1.0
    } else {
        x * (27.0 + x * x) / (27.0 + 9.0 * x * x)
    }
}

pub struct Overdrive {
    amount: f64,
    pre_gain: f64,
}

impl Default for Overdrive {
    fn default() -> Self {
        Self::new()
    }
}

impl Overdrive {
    pub fn new() -> Self {
        let mut od = Self {
            amount: 0.0,
            pre_gain: 1.0,
        };
        od.set_amount(0.5);
        od
    }

    /// Set the drive amount, clamped to `[0, MAX_DRIVE]`.
    pub fn set_amount(&mut self, amount: f64) {
        self.amount = amount.max(0.0).min(MAX_DRIVE);
        self.pre_gain = 1.0 / (1.0 - self.amount);
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    #[inline]
    pub fn process(&self, x: f64) -> f64 {
        (1.0 - self.amount) * x + self.amount * soft_clip(self.pre_gain * x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amplitudes() -> impl Iterator<Item = f64> {
        (-100..=100).map(|i| i as f64 / 100.0)
    }

    #[test]
    fn test_zero_amount_is_identity() {
        let mut od = Overdrive::new();
        od.set_amount(0.0);
        for x in amplitudes() {
            let y = od.process(x);
            assert!((y - x).abs() < 1e-12, "x={x} y={y}");
        }
    }

    #[test]
    fn test_max_amount_is_bounded() {
        let mut od = Overdrive::new();
        od.set_amount(MAX_DRIVE);
        for x in [10.0, -10.0, 1e6, -1e6, f64::MAX, f64::MIN] {
            let y = od.process(x);
            assert!(y.is_finite(), "x={x} produced {y}");
        }
        let y = od.process(10.0);
        assert!(y.abs() < 1.1, "amplitude 10 should be squashed: {y}");
    }

    #[test]
    fn test_more_drive_compresses_more() {
        let mut od = Overdrive::new();
        let mut previous_ratio = f64::MAX;
        for amount in [0.0, 0.25, 0.5, 0.75, 0.99] {
            od.set_amount(amount);
            // Crest ratio: loud peak relative to quiet peak
            let ratio = od.process(1.0) / od.process(0.05);
            assert!(
                ratio < previous_ratio,
                "amount {amount}: ratio {ratio} not below {previous_ratio}"
            );
            previous_ratio = ratio;
        }
    }

    #[test]
    fn test_transfer_is_monotonic_and_odd() {
        let mut od = Overdrive::new();
        for amount in [0.0, 0.3, 0.7, MAX_DRIVE] {
            od.set_amount(amount);
            let mut prev = f64::NEG_INFINITY;
            for i in -400..=400 {
                let x = i as f64 / 100.0;
                let y = od.process(x);
                assert!(y >= prev, "amount {amount}: not monotonic at x={x}");
                assert!((y + od.process(-x)).abs() < 1e-12, "amount {amount}: not odd at x={x}");
                prev = y;
            }
        }
    }

    #[test]
    fn test_amount_is_clamped() {
        let mut od = Overdrive::new();
        od.set_amount(2.0);
        assert_eq!(od.amount(), MAX_DRIVE);
        od.set_amount(-1.0);
        assert_eq!(od.amount(), 0.0);
    }

    #[test]
    fn test_soft_clip_is_continuous_at_knee() {
        assert!((soft_clip(3.0) - 1.0).abs() < 1e-12);
        assert!((soft_clip(-3.0) + 1.0).abs() < 1e-12);
        assert!((soft_clip(2.999_999) - 1.0).abs() < 1e-6);
    }
}
