//! Double-sampled Chamberlin state-variable filter.
//!
//! Each call to `process` runs the two-integrator loop twice at the host
//! rate and averages the two passes, which keeps the topology stable up to
//! sr/3. The band integrator saturates with a strength of
//! `drive * resonance`, so the filter compresses gently when pushed.
//!
//!   notch = x - damp * band
//!   low  += f * band
//!   high  = notch - low
//!   band  = f * high + band / (1 + drive * band^2)
//!
//! The rational saturation matches `band - drive * band^3` for small
//! signals but can never overshoot, so loud input at high resonance stays
//! bounded.

use std::f64::consts::PI;

/// Lowest cutoff accepted by `configure`.
const CUTOFF_MIN_HZ: f64 = 1.0e-6;

/// Cutoff and resonance for one filter.
///
/// Both fields feed the damping coefficient, so they are always applied
/// together through [`Svf::configure`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SvfConfig {
    pub cutoff_hz: f64,
    /// 0.0 = heavily damped, 1.0 = edge of self-oscillation
    pub resonance: f64,
}

/// All simultaneous responses of one `process` call.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SvfOutputs {
    pub low: f64,
    pub high: f64,
    pub band: f64,
    pub notch: f64,
    pub peak: f64,
}

pub struct Svf {
    sample_rate: f64,
    cutoff_max: f64,
    /// Integrator coefficient, 2*sin(pi*fc/(2*sr))
    freq: f64,
    damp: f64,
    resonance: f64,
    pre_drive: f64,
    /// Effective saturation coefficient: pre_drive * resonance
    drive: f64,
    low: f64,
    band: f64,
}

impl Svf {
    pub fn new(sample_rate: f64) -> Self {
        let mut svf = Self {
            sample_rate,
            cutoff_max: sample_rate / 3.0,
            freq: 0.25,
            damp: 0.0,
            resonance: 0.5,
            pre_drive: 0.0,
            drive: 0.0,
            low: 0.0,
            band: 0.0,
        };
        svf.set_drive(0.5);
        svf.configure(SvfConfig {
            cutoff_hz: 200.0,
            resonance: 0.5,
        });
        svf
    }

    /// Apply cutoff and resonance. Integrator state is kept.
    pub fn configure(&mut self, config: SvfConfig) {
        let cutoff = config.cutoff_hz.max(CUTOFF_MIN_HZ).min(self.cutoff_max);
        // Double-sampled: the loop runs at 2*sr
        self.freq = 2.0 * (PI * (cutoff / (self.sample_rate * 2.0)).min(0.25)).sin();
        self.resonance = config.resonance.max(0.0).min(1.0);
        self.damp = (2.0 * (1.0 - self.resonance.powf(0.25)))
            .min(2.0f64.min(2.0 / self.freq - self.freq * 0.5));
        self.drive = self.pre_drive * self.resonance;
    }

    /// Set the saturation amount of the band integrator (1.0 = nominal).
    pub fn set_drive(&mut self, drive: f64) {
        self.pre_drive = (drive * 0.1).max(0.0).min(1.0);
        self.drive = self.pre_drive * self.resonance;
    }

    pub fn process(&mut self, input: f64) -> SvfOutputs {
        let mut out = SvfOutputs::default();
        for _ in 0..2 {
            let notch = input - self.damp * self.band;
            self.low += self.freq * self.band;
            let high = notch - self.low;
            self.band = self.freq * high + self.band / (1.0 + self.drive * self.band * self.band);

            out.low += 0.5 * self.low;
            out.high += 0.5 * high;
            out.band += 0.5 * self.band;
            out.notch += 0.5 * notch;
            out.peak += 0.5 * (self.low - high);
        }
        out
    }

    pub fn reset(&mut self) {
        self.low = 0.0;
        self.band = 0.0;
    }
}
