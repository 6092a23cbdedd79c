//! TriBandEngine — the block controller shared by the plugin and the CLI.
//!
//! Per block: push the snapshot into the crossover and the three band
//! chains, then run every sample through
//!
//!   input -> crossover -> {low, mid, high} chains -> mute/mix -> out0, out1
//!
//! Nothing on the block path allocates, locks or logs. The temp buffer is
//! sized by `prepare`; longer host blocks are rendered in chunks of that
//! size with the same coefficients.

use crate::band_chain::{BandChain, BandSettings, ChainTopology};
use crate::controls::ControlSnapshot;
use crate::crossover::{Crossover, CrossoverConfig};
use crate::mix::mix;

pub struct TriBandEngine {
    crossover: Crossover,
    chains: [BandChain; 3],
    mutes: [bool; 3],
    topology: ChainTopology,
    temp_buf: Vec<f32>,
    sample_rate: f64,
}

impl TriBandEngine {
    /// Engine ready to process blocks of up to `max_block` samples.
    pub fn new(sample_rate: f64, max_block: usize) -> Self {
        let mut engine = Self {
            crossover: Crossover::new(sample_rate),
            chains: std::array::from_fn(|_| BandChain::new(sample_rate)),
            mutes: [false; 3],
            topology: ChainTopology::default(),
            temp_buf: Vec::new(),
            sample_rate,
        };
        engine.prepare(sample_rate, max_block);
        engine
    }

    /// (Re)initialize every unit for a new sample rate and block size.
    /// All filter and delay state is cleared; calling it twice is the same
    /// as calling it once.
    pub fn prepare(&mut self, sample_rate: f64, max_block: usize) {
        let topology = self.topology;
        self.sample_rate = sample_rate;
        self.crossover = Crossover::new(sample_rate);
        self.chains = std::array::from_fn(|_| {
            let mut chain = BandChain::new(sample_rate);
            chain.set_topology(topology);
            chain
        });
        self.mutes = [false; 3];
        self.temp_buf.clear();
        self.temp_buf.resize(max_block.max(1), 0.0);

        log::debug!(
            "prepared: sample_rate={sample_rate} max_block={} topology={topology:?}",
            self.temp_buf.len()
        );
    }

    /// Clear filter and delay state without reallocating.
    pub fn reset(&mut self) {
        self.crossover.reset();
        for chain in &mut self.chains {
            chain.reset();
        }
    }

    /// Playback stopped. Nothing needs freeing; state is cleared so the
    /// next start is silent.
    pub fn release(&mut self) {
        self.reset();
        log::debug!("released");
    }

    pub fn set_topology(&mut self, topology: ChainTopology) {
        self.topology = topology;
        for chain in &mut self.chains {
            chain.set_topology(topology);
        }
    }

    pub fn topology(&self) -> ChainTopology {
        self.topology
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn max_block(&self) -> usize {
        self.temp_buf.len()
    }

    /// The band delays are part of the sound, not reported as latency.
    pub fn latency_samples(&self) -> u32 {
        0
    }

    /// Per-band delay lengths currently in use, in samples.
    pub fn delay_samples(&self) -> [f64; 3] {
        std::array::from_fn(|i| self.chains[i].delay_samples())
    }

    /// Push one block's control values into every unit.
    pub fn apply_controls(&mut self, controls: &ControlSnapshot) {
        self.crossover.configure(&CrossoverConfig {
            low_mid_hz: controls.low_mid_freq as f64,
            mid_high_hz: controls.mid_high_freq as f64,
            resonance: controls.resonance as f64,
        });
        for (i, band) in controls.bands.iter().enumerate() {
            self.chains[i].configure(&BandSettings::from_controls(band, self.sample_rate));
            self.mutes[i] = band.mute;
        }
    }

    /// Process one block from `input` into both output channels.
    ///
    /// All three slices are expected to have the block length; only the
    /// shortest length is touched.
    pub fn process(
        &mut self,
        input: &[f32],
        out0: &mut [f32],
        out1: &mut [f32],
        controls: &ControlSnapshot,
    ) {
        debug_assert!(input.len() == out0.len() && input.len() == out1.len());
        let num_samples = input.len().min(out0.len()).min(out1.len());
        self.apply_controls(controls);

        let mut start = 0;
        while start < num_samples {
            let end = (start + self.temp_buf.len()).min(num_samples);
            let len = end - start;
            self.render(&input[start..end]);
            out0[start..end].copy_from_slice(&self.temp_buf[..len]);
            out1[start..end].copy_from_slice(&self.temp_buf[..len]);
            start = end;
        }
    }

    /// Like [`process`](Self::process), for hosts that pass the input in the
    /// first output channel.
    pub fn process_in_place(
        &mut self,
        ch0: &mut [f32],
        ch1: &mut [f32],
        controls: &ControlSnapshot,
    ) {
        debug_assert_eq!(ch0.len(), ch1.len());
        let num_samples = ch0.len().min(ch1.len());
        self.apply_controls(controls);

        let mut start = 0;
        while start < num_samples {
            let end = (start + self.temp_buf.len()).min(num_samples);
            let len = end - start;
            self.render(&ch0[start..end]);
            ch0[start..end].copy_from_slice(&self.temp_buf[..len]);
            ch1[start..end].copy_from_slice(&self.temp_buf[..len]);
            start = end;
        }
    }

    /// Per-sample loop into `temp_buf[..input.len()]`.
    fn render(&mut self, input: &[f32]) {
        for (out, &x) in self.temp_buf.iter_mut().zip(input) {
            let bands = self.crossover.process(x as f64);
            let low = self.chains[0].process(bands.low);
            let mid = self.chains[1].process(bands.mid);
            let high = self.chains[2].process(bands.high);
            *out = mix([low, mid, high], self.mutes) as f32;
        }
    }
}
