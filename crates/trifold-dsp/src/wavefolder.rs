//! Triangle wavefolder: anything past +/-1 is reflected back into range
//! instead of being clipped.
//!
//!   v = (x + offset) * gain
//!   y = (-1)^k * (v - 2k),  k = floor((v + 1) / 2)

pub struct Wavefolder {
    gain: f64,
    offset: f64,
}

impl Default for Wavefolder {
    fn default() -> Self {
        Self::new()
    }
}

impl Wavefolder {
    pub fn new() -> Self {
        Self {
            gain: 1.0,
            offset: 0.0,
        }
    }

    pub fn set_gain(&mut self, gain: f64) {
        self.gain = gain;
    }

    /// DC offset added before the gain; shifts where the folds land.
    pub fn set_offset(&mut self, offset: f64) {
        self.offset = offset;
    }

    #[inline]
    pub fn process(&self, x: f64) -> f64 {
        let v = (x + self.offset) * self.gain;
        let fold = ((v + 1.0) * 0.5).floor();
        let sign = if fold.rem_euclid(2.0) == 0.0 { 1.0 } else { -1.0 };
        sign * (v - 2.0 * fold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passes_signal_inside_range() {
        let folder = Wavefolder::new();
        for i in -99..=99 {
            let x = i as f64 / 100.0;
            assert!((folder.process(x) - x).abs() < 1e-12, "x={x}");
        }
    }

    #[test]
    fn test_reflects_above_threshold() {
        let folder = Wavefolder::new();
        assert!((folder.process(1.5) - 0.5).abs() < 1e-12);
        assert!((folder.process(-1.5) + 0.5).abs() < 1e-12);
        assert!((folder.process(2.5) + 0.5).abs() < 1e-12);
        assert!((folder.process(3.0) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_output_stays_in_range() {
        let mut folder = Wavefolder::new();
        folder.set_gain(7.3);
        folder.set_offset(0.4);
        for i in -1000..=1000 {
            let y = folder.process(i as f64 / 100.0);
            assert!((-1.0..=1.0).contains(&y), "y={y}");
        }
    }

    #[test]
    fn test_fold_is_continuous() {
        let mut folder = Wavefolder::new();
        folder.set_gain(5.0);
        let step = 1e-4;
        let mut prev = folder.process(-2.0);
        let mut x = -2.0 + step;
        while x < 2.0 {
            let y = folder.process(x);
            // Slope is at most `gain`
            assert!((y - prev).abs() <= 5.0 * step + 1e-9, "jump at x={x}: {prev} -> {y}");
            prev = y;
            x += step;
        }
    }

    #[test]
    fn test_offset_shifts_before_gain() {
        let mut folder = Wavefolder::new();
        folder.set_offset(0.5);
        folder.set_gain(2.0);
        // (0.25 + 0.5) * 2 = 1.5 -> folds to 0.5
        assert!((folder.process(0.25) - 0.5).abs() < 1e-12);
    }
}
