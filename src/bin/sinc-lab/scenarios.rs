use color_eyre::eyre::{eyre, Result};
use rustfft::{num_complex::Complex, FftPlanner};
use serde_json::{json, Value};
use std::sync::Arc;

use sinc_dsp::{
    dsp::{
        oscillator::{Oscillator, OscillatorBlock, OscillatorWaveform},
        recursive_sine::{SineGenerator, StableQuadrature},
        residual::ResidualOrder,
        sinc::{build_fir, build_fir_with, cutoff_for_read_rate, Evaluation},
        wavetable::{Mipmap, DEFAULT_TABLE_SIZE},
        window::WindowKind,
    },
    patch::{LabConfig, OscillatorStrategy},
    MAX_BLOCK_SIZE,
};

#[derive(Debug, Clone, Copy)]
pub enum Scenario {
    StaticDelay,
    Sweep,
    QuadratureFm,
    BoundaryTaps,
    WindowEquivalence,
    PolyblepNyquist,
}

impl Scenario {
    pub const ALL: [Scenario; 6] = [
        Scenario::StaticDelay,
        Scenario::Sweep,
        Scenario::QuadratureFm,
        Scenario::BoundaryTaps,
        Scenario::WindowEquivalence,
        Scenario::PolyblepNyquist,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Scenario::StaticDelay => "static-delay",
            Scenario::Sweep => "sweep",
            Scenario::QuadratureFm => "quadrature-fm",
            Scenario::BoundaryTaps => "boundary-taps",
            Scenario::WindowEquivalence => "window-equivalence",
            Scenario::PolyblepNyquist => "polyblep-nyquist",
        }
    }

    pub fn run(&self, config: &LabConfig) -> Value {
        let mut report = match self {
            Scenario::StaticDelay => static_delay(config),
            Scenario::Sweep => sweep(config),
            Scenario::QuadratureFm => quadrature_fm(),
            Scenario::BoundaryTaps => boundary_taps(config),
            Scenario::WindowEquivalence => window_equivalence(config),
            Scenario::PolyblepNyquist => polyblep_nyquist(config),
        };
        report["scenario"] = json!(self.name());
        report
    }
}

/// Scenarios matching `name`; `all` selects every one.
pub fn select(name: &str) -> Result<Vec<Scenario>> {
    if name == "all" {
        return Ok(Scenario::ALL.to_vec());
    }
    Scenario::ALL
        .into_iter()
        .find(|scenario| scenario.name() == name)
        .map(|scenario| vec![scenario])
        .ok_or_else(|| {
            let known: Vec<&str> = Scenario::ALL.iter().map(Scenario::name).collect();
            eyre!("unknown scenario `{name}` (expected one of: all, {})", known.join(", "))
        })
}

fn static_delay(config: &LabConfig) -> Value {
    let delay = 10.5;
    let mut descriptor = config.resampler.clone();
    descriptor.max_delay = descriptor.max_delay.max(1024);
    let mut resampler = descriptor.build();

    let response: Vec<f64> = (0..128)
        .map(|n| resampler.process(if n == 0 { 1.0 } else { 0.0 }, delay) as f64)
        .collect();

    let peak = (1..response.len() - 1)
        .max_by(|&a, &b| response[a].abs().total_cmp(&response[b].abs()))
        .unwrap_or(1);
    let (y0, y1, y2) = (response[peak - 1], response[peak], response[peak + 1]);
    let curvature = y0 - 2.0 * y1 + y2;
    let offset = if curvature != 0.0 {
        0.5 * (y0 - y2) / curvature
    } else {
        0.0
    };
    let position = peak as f64 + offset;

    let spectrum = magnitude_spectrum(&response, 4096, WindowKind::Rectangular);
    let passband_peak = spectrum
        .iter()
        .take((0.4 * 4096.0) as usize + 1)
        .fold(0.0, |peak: f64, &m| peak.max(m.sqrt()));

    json!({
        "delay": delay,
        "peak_index": position,
        "peak_value": y1,
        "passband_peak": passband_peak,
        "taps": resampler.last_tap_count(),
        "pass": (10.4..=10.6).contains(&position) && (0.95..=1.05).contains(&passband_peak),
    })
}

/// Bins on each side of a partial that belong to its Blackman-Harris main lobe.
const SWEEP_GUARD_BINS: usize = 8;

fn sweep(config: &LabConfig) -> Value {
    let sample_rate = config.sample_rate;
    let len = sample_rate.round() as usize;
    let (start, end) = (8000.0, 1.0);
    let slope = (start - end) / len as f64;
    let input_hz = 4000.0;

    let mut descriptor = config.resampler.clone();
    descriptor.max_delay = descriptor.max_delay.max(8192);
    let mut resampler = descriptor.build();

    // The input must be free of aliases itself, or the measurement only
    // shows the source.
    let mut source = OscillatorBlock::wavetable(Arc::new(Mipmap::new(
        OscillatorWaveform::Square,
        sweep_table_size(config),
    )));
    source.reset(input_hz / sample_rate, 0.0);

    let mut output = Vec::with_capacity(len);
    let mut block = [0.0f32; MAX_BLOCK_SIZE];
    let mut delays = [0.0f64; MAX_BLOCK_SIZE];
    let mut n = 0;
    while n < len {
        let count = (len - n).min(MAX_BLOCK_SIZE);
        source.render(&mut block[..count]);
        for (i, delay) in delays[..count].iter_mut().enumerate() {
            *delay = start - slope * (n + i) as f64;
        }
        resampler.render_modulated(&mut block[..count], &delays[..count]);
        output.extend_from_slice(&block[..count]);
        n += count;
    }

    let rate = 1.0 + slope;
    let expected_cutoff = cutoff_for_read_rate(rate).min(config.resampler.cutoff);
    let output_hz = input_hz * rate;

    // Steady part of the sweep, once the read head has real input under it.
    let size = 1usize << (len / 2).max(2).ilog2().min(14);
    let start_at = (len - size) / 2;
    let segment: Vec<f64> = output[start_at..start_at + size]
        .iter()
        .map(|&s| s as f64)
        .collect();
    let spectrum = magnitude_spectrum(&segment, size, WindowKind::BlackmanHarris);
    let bin_hz = sample_rate / size as f64;
    let guard = SWEEP_GUARD_BINS as f64;
    let bins_from_harmonic = |bin: usize| {
        let freq = bin as f64 * bin_hz;
        let harmonic = (freq / output_hz).round().max(1.0);
        (freq - harmonic * output_hz).abs() / bin_hz
    };

    let fundamental_bin = output_hz / bin_hz;
    let fundamental = spectrum
        .iter()
        .enumerate()
        .filter(|&(bin, _)| (bin as f64 - fundamental_bin).abs() <= guard)
        .fold(0.0, |peak: f64, (_, &power)| peak.max(power));
    let (signal, alias, worst) = spectrum.iter().enumerate().skip(SWEEP_GUARD_BINS).fold(
        (0.0, 0.0, 0.0),
        |(signal, alias, worst): (f64, f64, f64), (bin, &power)| {
            if bins_from_harmonic(bin) <= guard {
                (signal + power, alias, worst)
            } else {
                (signal, alias + power, worst.max(power))
            }
        },
    );
    let worst_alias_db = db(worst / fundamental);

    json!({
        "sample_rate": sample_rate,
        "read_rate": rate,
        "cutoff": resampler.last_cutoff(),
        "expected_cutoff": expected_cutoff,
        "output_frequency_hz": output_hz,
        "alias_to_signal_db": db(alias / signal),
        "worst_alias_db": worst_alias_db,
        "pass": (resampler.last_cutoff() - expected_cutoff).abs() < 1e-6
            && worst_alias_db < -60.0,
    })
}

fn quadrature_fm() -> Value {
    let mut osc = StableQuadrature::new(0.01, 0.0);
    let mut worst: f64 = 0.0;
    for n in 0..1024 {
        if n == 512 {
            osc.set_frequency(0.1);
        }
        let (s, c) = osc.step_quadrature();
        worst = worst.max((s * s + c * c - 1.0).abs());
    }

    json!({
        "switch_at": 512,
        "max_radius_error": worst,
        "pass": worst < 1e-4,
    })
}

fn boundary_taps(config: &LabConfig) -> Value {
    let mut fir = [0.0; 16];
    let window = config.resampler.window;
    let kernel = build_fir(&mut fir, 0.5, 0.0, window);
    let error = kernel
        .iter()
        .enumerate()
        .map(|(i, &h)| (h - if i == 8 { 1.0 } else { 0.0 }).abs())
        .fold(0.0, f64::max);

    json!({
        "window": window.name(),
        "max_error": error,
        "pass": error < 1e-6,
    })
}

fn window_equivalence(config: &LabConfig) -> Value {
    let mut windows: Vec<WindowKind> = WindowKind::FIXED.to_vec();
    windows.push(WindowKind::lanczos(4.0));
    if !windows.contains(&config.resampler.window) {
        windows.push(config.resampler.window);
    }

    let mut direct = [0.0; 128];
    let mut recursive = [0.0; 128];
    let results: Vec<Value> = windows
        .iter()
        .map(|&window| {
            build_fir_with(&mut direct, 0.25, 0.5, window, Evaluation::Direct);
            build_fir_with(&mut recursive, 0.25, 0.5, window, Evaluation::Recursive);
            let difference = direct
                .iter()
                .zip(&recursive)
                .map(|(a, b)| (a - b).abs())
                .fold(0.0, f64::max);
            json!({ "window": window.name(), "max_difference": difference })
        })
        .collect();

    let pass = results
        .iter()
        .all(|r| r["max_difference"].as_f64().is_some_and(|d| d < 1e-10));
    json!({ "windows": results, "pass": pass })
}

fn polyblep_nyquist(config: &LabConfig) -> Value {
    let size = 16384;
    let order = residual_order(config);
    let mut osc = OscillatorBlock::residual(OscillatorWaveform::Saw, order);
    osc.reset(0.25, 0.0);

    let mut warmup = [0.0f32; 64];
    osc.render(&mut warmup);
    let mut signal = vec![0.0f32; size];
    osc.render(&mut signal);
    let signal: Vec<f64> = signal.iter().map(|&s| s as f64).collect();

    // Period 4 divides the transform length: every partial sits on a bin.
    let spectrum = magnitude_spectrum(&signal, size, WindowKind::Rectangular);
    let fundamental = spectrum[size / 4];
    let near_nyquist: f64 = spectrum[(0.49 * size as f64) as usize..].iter().sum();

    let ratio = db(near_nyquist / fundamental);
    json!({
        "points": order.points(),
        "nyquist_to_fundamental_db": ratio,
        "pass": ratio < -60.0,
    })
}

fn residual_order(config: &LabConfig) -> ResidualOrder {
    match config.oscillator.strategy {
        OscillatorStrategy::Residual { order } => order,
        OscillatorStrategy::Wavetable { .. } => ResidualOrder::default(),
    }
}

fn sweep_table_size(config: &LabConfig) -> usize {
    match config.oscillator.strategy {
        OscillatorStrategy::Wavetable { table_size } if table_size > 0 => table_size,
        _ => DEFAULT_TABLE_SIZE,
    }
}

/// Power spectrum (bins 0..=size/2) of `signal` zero-padded to `size`,
/// weighted by `window` across the signal's length.
fn magnitude_spectrum(signal: &[f64], size: usize, window: WindowKind) -> Vec<f64> {
    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(size);

    let len = signal.len().min(size);
    let mut buffer: Vec<Complex<f64>> = (0..size)
        .map(|n| {
            if n >= len {
                return Complex::new(0.0, 0.0);
            }
            Complex::new(signal[n] * window.evaluate(n, len, 0.0, 0.5), 0.0)
        })
        .collect();
    fft.process(&mut buffer);

    buffer[..=size / 2].iter().map(|c| c.norm_sqr()).collect()
}

fn db(power_ratio: f64) -> f64 {
    10.0 * power_ratio.max(1e-30).log10()
}
