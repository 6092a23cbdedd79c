//! Per-band effect chain: delay -> drive -> (wavefolder).
//!
//! The wavefolder and delay feedback are both present and configured every
//! block, but only enter the signal path when switched on through
//! [`ChainTopology`]. The default topology is delay -> drive with no
//! feedback.

use crate::controls::{BandControls, delay_ms_to_samples, delay_time_ms};
use crate::delay::{DelayLine, MAX_DELAY_MS};
use crate::drive::Overdrive;
use crate::wavefolder::Wavefolder;

/// Optional stages of a band chain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ChainTopology {
    /// Fold the driven signal.
    pub wavefold: bool,
    /// Recirculate the delay output into the delay input.
    pub feedback: bool,
}

/// Coefficients of one band for one block.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BandSettings {
    pub drive: f64,
    pub fold_gain: f64,
    pub fold_offset: f64,
    pub delay_samples: f64,
    pub feedback: f64,
}

impl BandSettings {
    /// Derive coefficients from the band's control values.
    pub fn from_controls(controls: &BandControls, sample_rate: f64) -> Self {
        Self {
            drive: controls.drive as f64,
            fold_gain: controls.drive as f64,
            fold_offset: controls.fold_offset as f64,
            delay_samples: delay_ms_to_samples(delay_time_ms(controls.delay_time), sample_rate),
            feedback: controls.delay_feedback as f64,
        }
    }
}

pub struct BandChain {
    delay: DelayLine,
    drive: Overdrive,
    folder: Wavefolder,
    feedback: f64,
    /// Previous delay output, the feedback source
    last_delayed: f64,
    topology: ChainTopology,
}

impl BandChain {
    pub fn new(sample_rate: f64) -> Self {
        Self {
            delay: DelayLine::with_max_ms(MAX_DELAY_MS, sample_rate),
            drive: Overdrive::new(),
            folder: Wavefolder::new(),
            feedback: 0.0,
            last_delayed: 0.0,
            topology: ChainTopology::default(),
        }
    }

    pub fn set_topology(&mut self, topology: ChainTopology) {
        self.topology = topology;
    }

    pub fn topology(&self) -> ChainTopology {
        self.topology
    }

    pub fn configure(&mut self, settings: &BandSettings) {
        self.delay.set_delay(settings.delay_samples);
        self.drive.set_amount(settings.drive);
        self.folder.set_gain(settings.fold_gain);
        self.folder.set_offset(settings.fold_offset);
        self.feedback = settings.feedback.max(0.0).min(0.999);
    }

    /// Delay length actually in use, after clamping to the buffer.
    pub fn delay_samples(&self) -> f64 {
        self.delay.delay()
    }

    #[inline]
    pub fn process(&mut self, x: f64) -> f64 {
        let input = if self.topology.feedback {
            x + self.feedback * self.last_delayed
        } else {
            x
        };
        let delayed = self.delay.process(input);
        self.last_delayed = delayed;

        let driven = self.drive.process(delayed);
        if self.topology.wavefold {
            self.folder.process(driven)
        } else {
            driven
        }
    }

    pub fn reset(&mut self) {
        self.delay.reset();
        self.last_delayed = 0.0;
    }
}
