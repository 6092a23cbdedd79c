// TriFold — three-band delay/drive effect plugin (CLAP + VST3).

use nih_plug::prelude::*;
use std::num::NonZeroU32;
use std::sync::Arc;
use trifold_dsp::TriBandEngine;

mod params;
use params::TriFoldParams;

const MAX_BLOCK_SIZE: usize = 8192;

struct TriFold {
    params: Arc<TriFoldParams>,
    engine: TriBandEngine,
}

impl Default for TriFold {
    fn default() -> Self {
        Self {
            params: Arc::new(TriFoldParams::default()),
            engine: TriBandEngine::new(44100.0, MAX_BLOCK_SIZE),
        }
    }
}

impl Plugin for TriFold {
    const NAME: &'static str = "TriFold";
    const VENDOR: &'static str = "TriFold";
    const URL: &'static str = "";
    const EMAIL: &'static str = "";
    const VERSION: &'static str = env!("CARGO_PKG_VERSION");

    // Only the first input channel is processed; both outputs carry the
    // same mono mix.
    const AUDIO_IO_LAYOUTS: &'static [AudioIOLayout] = &[
        AudioIOLayout {
            main_input_channels: NonZeroU32::new(2),
            main_output_channels: NonZeroU32::new(2),
            aux_input_ports: &[],
            aux_output_ports: &[],
            names: PortNames::const_default(),
        },
        AudioIOLayout {
            main_input_channels: NonZeroU32::new(1),
            main_output_channels: NonZeroU32::new(2),
            aux_input_ports: &[],
            aux_output_ports: &[],
            names: PortNames::const_default(),
        },
    ];

    const MIDI_INPUT: MidiConfig = MidiConfig::None;
    // Parameters apply per block
    const SAMPLE_ACCURATE_AUTOMATION: bool = false;

    type SysExMessage = ();
    type BackgroundTask = ();

    fn params(&self) -> Arc<dyn Params> {
        self.params.clone()
    }

    fn initialize(
        &mut self,
        audio_io_layout: &AudioIOLayout,
        buffer_config: &BufferConfig,
        context: &mut impl InitContext<Self>,
    ) -> bool {
        let sample_rate = buffer_config.sample_rate as f64;
        let max_block = buffer_config.max_buffer_size as usize;
        self.engine.prepare(sample_rate, max_block);
        context.set_latency_samples(self.engine.latency_samples());

        nih_log!(
            "TriFold initialized: {sample_rate} Hz, max block {max_block}, {} input channel(s)",
            audio_io_layout
                .main_input_channels
                .map_or(0, NonZeroU32::get)
        );
        true
    }

    fn reset(&mut self) {
        self.engine.reset();
    }

    fn deactivate(&mut self) {
        self.engine.release();
    }

    fn process(
        &mut self,
        buffer: &mut Buffer,
        _aux: &mut AuxiliaryBuffers,
        _context: &mut impl ProcessContext<Self>,
    ) -> ProcessStatus {
        // One read per parameter; the whole block uses these values
        let controls = self.params.snapshot();

        if let [ch0, ch1, ..] = buffer.as_slice() {
            self.engine.process_in_place(ch0, ch1, &controls);
        }

        ProcessStatus::Normal
    }
}

impl ClapPlugin for TriFold {
    const CLAP_ID: &'static str = "com.trifold.three-band";
    const CLAP_DESCRIPTION: Option<&'static str> =
        Some("Three-band crossover with per-band delay and drive");
    const CLAP_MANUAL_URL: Option<&'static str> = None;
    const CLAP_SUPPORT_URL: Option<&'static str> = None;
    const CLAP_FEATURES: &'static [ClapFeature] = &[
        ClapFeature::AudioEffect,
        ClapFeature::Stereo,
        ClapFeature::Distortion,
        ClapFeature::Delay,
    ];
}

impl Vst3Plugin for TriFold {
    const VST3_CLASS_ID: [u8; 16] = *b"TriFoldThreeBand";
    const VST3_SUBCATEGORIES: &'static [Vst3SubCategory] = &[
        Vst3SubCategory::Fx,
        Vst3SubCategory::Distortion,
        Vst3SubCategory::Delay,
    ];
}

nih_export_clap!(TriFold);
nih_export_vst3!(TriFold);
