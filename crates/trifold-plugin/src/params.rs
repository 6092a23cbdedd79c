use nih_plug::prelude::*;
use std::sync::Arc;
use trifold_dsp::ControlSnapshot;
use trifold_dsp::controls::{Param, delay_time_ms};

/// Host-facing parameters. Ids, ranges and defaults come from the DSP
/// crate's schema; values are read once per block, unsmoothed.
#[derive(Params)]
pub struct TriFoldParams {
    #[id = "mute-low"]
    pub mute_low: BoolParam,
    #[id = "mute-mid"]
    pub mute_mid: BoolParam,
    #[id = "mute-high"]
    pub mute_high: BoolParam,

    /// Low/mid crossover in Hz.
    #[id = "low-mid-freq"]
    pub low_mid_freq: FloatParam,

    /// Mid/high crossover in Hz.
    #[id = "mid-high-freq"]
    pub mid_high_freq: FloatParam,

    /// Resonance shared by all four crossover filters.
    #[id = "res"]
    pub resonance: FloatParam,

    /// Per-band drive amount (0 = clean).
    #[id = "low-band"]
    pub low_drive: FloatParam,
    #[id = "mid-band"]
    pub mid_drive: FloatParam,
    #[id = "high-band"]
    pub high_drive: FloatParam,

    /// Wavefolder offsets. Only audible with the fold stage switched in.
    #[id = "low-wf-offset"]
    pub low_fold_offset: FloatParam,
    #[id = "mid-wf-offset"]
    pub mid_fold_offset: FloatParam,
    #[id = "high-wf-offset"]
    pub high_fold_offset: FloatParam,

    /// Normalized delay time, 0.1..30 ms.
    #[id = "low-del-time"]
    pub low_delay_time: FloatParam,
    #[id = "mid-del-time"]
    pub mid_delay_time: FloatParam,
    #[id = "high-del-time"]
    pub high_delay_time: FloatParam,

    /// Delay feedback. Only audible with feedback switched in.
    #[id = "low-del-fbk"]
    pub low_delay_feedback: FloatParam,
    #[id = "mid-del-fbk"]
    pub mid_delay_feedback: FloatParam,
    #[id = "high-del-fbk"]
    pub high_delay_feedback: FloatParam,
}

fn toggle(param: Param) -> BoolParam {
    let spec = param.spec();
    BoolParam::new(spec.name, spec.default >= 0.5)
}

fn linear(param: Param) -> FloatParam {
    let spec = param.spec();
    let (min, max) = spec.range();
    FloatParam::new(spec.name, spec.default, FloatRange::Linear { min, max })
}

fn frequency(param: Param) -> FloatParam {
    linear(param)
        .with_step_size(0.01)
        .with_value_to_string(formatters::v2s_f32_hz_then_khz(2))
        .with_string_to_value(formatters::s2v_f32_hz_then_khz())
}

fn amount(param: Param) -> FloatParam {
    linear(param)
        .with_unit(" %")
        .with_value_to_string(formatters::v2s_f32_percentage(1))
        .with_string_to_value(formatters::s2v_f32_percentage())
}

fn delay_time(param: Param) -> FloatParam {
    linear(param).with_value_to_string(Arc::new(|v| format!("{:.2} ms", delay_time_ms(v))))
}

impl Default for TriFoldParams {
    fn default() -> Self {
        Self {
            mute_low: toggle(Param::MuteLow),
            mute_mid: toggle(Param::MuteMid),
            mute_high: toggle(Param::MuteHigh),

            low_mid_freq: frequency(Param::LowMidFreq),
            mid_high_freq: frequency(Param::MidHighFreq),
            resonance: amount(Param::Resonance),

            low_drive: amount(Param::LowDrive),
            mid_drive: amount(Param::MidDrive),
            high_drive: amount(Param::HighDrive),

            low_fold_offset: amount(Param::LowFoldOffset),
            mid_fold_offset: amount(Param::MidFoldOffset),
            high_fold_offset: amount(Param::HighFoldOffset),

            low_delay_time: delay_time(Param::LowDelayTime),
            mid_delay_time: delay_time(Param::MidDelayTime),
            high_delay_time: delay_time(Param::HighDelayTime),

            low_delay_feedback: amount(Param::LowDelayFeedback),
            mid_delay_feedback: amount(Param::MidDelayFeedback),
            high_delay_feedback: amount(Param::HighDelayFeedback),
        }
    }
}

impl TriFoldParams {
    fn value_of(&self, param: Param) -> f32 {
        let flag = |p: &BoolParam| if p.value() { 1.0 } else { 0.0 };
        match param {
            Param::MuteLow => flag(&self.mute_low),
            Param::MuteMid => flag(&self.mute_mid),
            Param::MuteHigh => flag(&self.mute_high),
            Param::LowMidFreq => self.low_mid_freq.value(),
            Param::MidHighFreq => self.mid_high_freq.value(),
            Param::Resonance => self.resonance.value(),
            Param::LowDrive => self.low_drive.value(),
            Param::MidDrive => self.mid_drive.value(),
            Param::HighDrive => self.high_drive.value(),
            Param::LowFoldOffset => self.low_fold_offset.value(),
            Param::MidFoldOffset => self.mid_fold_offset.value(),
            Param::HighFoldOffset => self.high_fold_offset.value(),
            Param::LowDelayTime => self.low_delay_time.value(),
            Param::MidDelayTime => self.mid_delay_time.value(),
            Param::HighDelayTime => self.high_delay_time.value(),
            Param::LowDelayFeedback => self.low_delay_feedback.value(),
            Param::MidDelayFeedback => self.mid_delay_feedback.value(),
            Param::HighDelayFeedback => self.high_delay_feedback.value(),
        }
    }

    /// Every value for the coming block, one atomic load each.
    pub fn snapshot(&self) -> ControlSnapshot {
        ControlSnapshot::from_fn(|p| self.value_of(p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_ids_match_schema() {
        let params = TriFoldParams::default();
        let mut host_ids: Vec<String> = params.param_map().into_iter().map(|(id, _, _)| id).collect();
        let mut schema_ids: Vec<String> = Param::ALL.iter().map(|p| p.id().to_string()).collect();
        host_ids.sort();
        schema_ids.sort();
        assert_eq!(host_ids, schema_ids);
    }

    #[test]
    fn test_default_snapshot_matches_schema() {
        let params = TriFoldParams::default();
        assert_eq!(params.snapshot(), ControlSnapshot::default());
    }
}
