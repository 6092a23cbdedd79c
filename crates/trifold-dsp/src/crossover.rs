//! Three-band crossover built from two cascaded two-way SVF splits.
//!
//!   x ──> A (low-mid) ──low──────────────────────────────> low
//!              └──high──> B (low-mid) ──high──┬─> C (mid-high) ──low──> mid
//!                                             └─> D (mid-high) ──high─> high
//!
//! The mid and high paths both go through two low-mid high-pass sections,
//! so the low band is rejected at 24 dB/oct there. Cutoff ordering is not
//! enforced: a low-mid frequency above the mid-high frequency simply makes
//! the bands overlap.

use crate::svf::{Svf, SvfConfig};

/// Saturation of every crossover filter. Fixed at the nominal amount.
pub const CROSSOVER_DRIVE: f64 = 1.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CrossoverConfig {
    pub low_mid_hz: f64,
    pub mid_high_hz: f64,
    pub resonance: f64,
}

/// One sample split into its three bands.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Bands {
    pub low: f64,
    pub mid: f64,
    pub high: f64,
}

impl Bands {
    pub fn to_array(self) -> [f64; 3] {
        [self.low, self.mid, self.high]
    }
}

pub struct Crossover {
    split_a: Svf,
    split_b: Svf,
    split_c: Svf,
    split_d: Svf,
}

impl Crossover {
    pub fn new(sample_rate: f64) -> Self {
        let split = || {
            let mut svf = Svf::new(sample_rate);
            svf.set_drive(CROSSOVER_DRIVE);
            svf
        };
        Self {
            split_a: split(),
            split_b: split(),
            split_c: split(),
            split_d: split(),
        }
    }

    /// Push cutoffs and resonance to all four filters. Call once per block,
    /// before any `process`.
    pub fn configure(&mut self, config: &CrossoverConfig) {
        let low_mid = SvfConfig {
            cutoff_hz: config.low_mid_hz,
            resonance: config.resonance,
        };
        let mid_high = SvfConfig {
            cutoff_hz: config.mid_high_hz,
            resonance: config.resonance,
        };
        self.split_a.configure(low_mid);
        self.split_b.configure(low_mid);
        self.split_c.configure(mid_high);
        self.split_d.configure(mid_high);
    }

    pub fn process(&mut self, input: f64) -> Bands {
        let a = self.split_a.process(input);
        let high_path = self.split_b.process(a.high).high;
        let mid = self.split_c.process(high_path).low;
        let high = self.split_d.process(high_path).high;
        Bands {
            low: a.low,
            mid,
            high,
        }
    }

    pub fn reset(&mut self) {
        self.split_a.reset();
        self.split_b.reset();
        self.split_c.reset();
        self.split_d.reset();
    }
}
