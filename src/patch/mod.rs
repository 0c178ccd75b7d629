//! Serializable descriptions of resamplers and oscillators.
//!
//! Descriptors are plain data: they can be loaded from JSON, compared and
//! cloned freely, and turned into realtime objects with `build()`. Building
//! allocates, so it happens off the audio thread.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use std::sync::Arc;

use crate::dsp::{
    delay::{CutoffTracking, Interpolation, Resampler, DEFAULT_MAX_TAP},
    oscillator::{OscillatorBlock, OscillatorWaveform},
    residual::ResidualOrder,
    sinc::{Evaluation, MAX_CUTOFF},
    wavetable::{Mipmap, DEFAULT_TABLE_SIZE},
    window::WindowKind,
};

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct ResamplerDescriptor {
    pub max_delay: usize,
    pub max_tap: usize,
    pub window: WindowKind,
    pub evaluation: Evaluation,
    pub interpolation: Interpolation,
    pub tracking: CutoffTracking,
    pub slew_rate: Option<f64>,
    /// Cutoff cap in cycles/sample.
    pub cutoff: f64,
}

impl Default for ResamplerDescriptor {
    fn default() -> Self {
        Self {
            max_delay: 1024,
            max_tap: DEFAULT_MAX_TAP,
            window: WindowKind::default(),
            evaluation: Evaluation::default(),
            interpolation: Interpolation::default(),
            tracking: CutoffTracking::default(),
            slew_rate: None,
            cutoff: MAX_CUTOFF,
        }
    }
}

impl ResamplerDescriptor {
    pub fn build(&self) -> Resampler {
        tracing::debug!(
            max_delay = self.max_delay,
            max_tap = self.max_tap,
            window = self.window.name(),
            "building resampler"
        );
        let mut resampler = Resampler::new(self.max_delay, self.max_tap)
            .with_window(self.window)
            .with_evaluation(self.evaluation)
            .with_interpolation(self.interpolation)
            .with_tracking(self.tracking)
            .with_slew_rate(self.slew_rate);
        resampler.set_cutoff(self.cutoff);
        resampler
    }
}

/// How a non-sine waveform is band-limited.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OscillatorStrategy {
    Residual { order: ResidualOrder },
    Wavetable { table_size: usize },
}

impl Default for OscillatorStrategy {
    fn default() -> Self {
        OscillatorStrategy::Residual {
            order: ResidualOrder::default(),
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OscillatorDescriptor {
    pub waveform: OscillatorWaveform,
    pub strategy: OscillatorStrategy,
    pub detune_cents: f64,
}

impl OscillatorDescriptor {
    pub fn build(&self) -> OscillatorBlock {
        match self.strategy {
            OscillatorStrategy::Residual { order } => {
                tracing::debug!(
                    waveform = self.waveform.name(),
                    points = order.points(),
                    "building residual oscillator"
                );
                OscillatorBlock::residual(self.waveform, order)
            }
            OscillatorStrategy::Wavetable { table_size } => {
                let size = if table_size == 0 {
                    DEFAULT_TABLE_SIZE
                } else {
                    table_size
                };
                OscillatorBlock::wavetable(Arc::new(Mipmap::new(self.waveform, size)))
            }
        }
    }

    /// Frequency ratio from `detune_cents`.
    pub fn detune_ratio(&self) -> f64 {
        (self.detune_cents / 1200.0).exp2()
    }
}

/// Settings shared by the scenario harness.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct LabConfig {
    pub sample_rate: f64,
    pub resampler: ResamplerDescriptor,
    pub oscillator: OscillatorDescriptor,
}

impl Default for LabConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000.0,
            resampler: ResamplerDescriptor::default(),
            oscillator: OscillatorDescriptor::default(),
        }
    }
}

#[cfg(feature = "serde")]
impl LabConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resampler_descriptor_builds_configured_resampler() {
        let descriptor = ResamplerDescriptor {
            max_delay: 300,
            max_tap: 32,
            window: WindowKind::lanczos(8.0),
            cutoff: 0.3,
            ..ResamplerDescriptor::default()
        };
        let mut resampler = descriptor.build();
        assert_eq!(resampler.max_delay(), 300);
        assert_eq!(resampler.max_tap(), 32);
        assert_eq!(resampler.window(), WindowKind::lanczos(8.0));

        resampler.process(0.0, 10.0);
        resampler.process(0.0, 10.0);
        assert_eq!(resampler.last_cutoff(), 0.3);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn interpolation_is_read_from_json() {
        let config =
            LabConfig::from_json(r#"{ "resampler": { "interpolation": "Cubic" } }"#).unwrap();
        let resampler = config.resampler.build();
        assert_eq!(resampler.interpolation(), Interpolation::Cubic);
    }

    #[test]
    fn oscillator_descriptor_selects_strategy() {
        let residual = OscillatorDescriptor {
            waveform: OscillatorWaveform::Saw,
            strategy: OscillatorStrategy::Residual {
                order: ResidualOrder::Six,
            },
            detune_cents: 0.0,
        };
        assert_eq!(residual.build().latency(), 3);

        let table = OscillatorDescriptor {
            waveform: OscillatorWaveform::Square,
            strategy: OscillatorStrategy::Wavetable { table_size: 0 },
            detune_cents: 1200.0,
        };
        match table.build() {
            OscillatorBlock::Wavetable(osc) => assert_eq!(osc.mipmap().size(), DEFAULT_TABLE_SIZE),
            other => panic!("expected wavetable, got {other:?}"),
        }
        assert!((table.detune_ratio() - 2.0).abs() < 1e-12);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn lab_config_fills_missing_fields() {
        let config = LabConfig::from_json(
            r#"{
                "sample_rate": 44100.0,
                "resampler": { "max_tap": 64, "window": { "Lanczos": { "a": 4.0 } } },
                "oscillator": { "waveform": "Triangle" }
            }"#,
        )
        .unwrap();

        assert_eq!(config.sample_rate, 44_100.0);
        assert_eq!(config.resampler.max_tap, 64);
        assert_eq!(config.resampler.max_delay, 1024);
        assert_eq!(config.resampler.window, WindowKind::lanczos(4.0));
        assert_eq!(config.resampler.interpolation, Interpolation::Sinc);
        assert_eq!(config.oscillator.waveform, OscillatorWaveform::Triangle);
        assert_eq!(config.oscillator.strategy, OscillatorStrategy::default());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn lab_config_round_trips_through_json() {
        let config = LabConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(LabConfig::from_json(&json).unwrap(), config);
    }
}
