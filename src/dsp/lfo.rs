//! Unit conversions and control-rate helpers.

use std::f64::consts::TAU;

/*
Units
=====

Everything inside the DSP core speaks normalized frequency:

  cycles/sample     f_norm = f_hz / sample_rate      (Nyquist = 0.5)

The sample rate only shows up at the edges, when a user types "5 Hz" or
"A4". These helpers do that conversion and nothing else.

  A4 = MIDI 69 = 440 Hz,  one semitone = 2^(1/12)


Modulating a delay line
-----------------------

Sweeping a delay time with an LFO is how vibrato, chorus and flanging work.
If the delay follows

    d[n] = center + depth · sin(2π·f_lfo·n)

then the read head advances by 1 − (d[n] − d[n−1]) input samples per output
sample, and the heard pitch ratio swings by at most

    1 ± depth · 2π·f_lfo          (f_lfo in cycles/sample)

so a vibrato of ±c cents needs depth = (2^(c/1200) − 1) / (2π·f_lfo).

Typical LFO rates:

    0.1 - 0.5 Hz    slow chorus drift
    0.5 - 2 Hz      chorus, ensemble
    4 - 7 Hz        vibrato
*/

/// Hz to cycles/sample.
///
/// ```
/// use sinc_dsp::dsp::lfo::hz_to_normalized;
/// assert_eq!(hz_to_normalized(12_000.0, 48_000.0), 0.25);
/// ```
#[inline]
pub fn hz_to_normalized(hz: f64, sample_rate: f64) -> f64 {
    hz / sample_rate
}

/// Cycles/sample to Hz.
#[inline]
pub fn normalized_to_hz(freq: f64, sample_rate: f64) -> f64 {
    freq * sample_rate
}

/// MIDI note number (fractional for pitch bend) to Hz.
///
/// ```
/// use sinc_dsp::dsp::lfo::midi_note_to_hz;
/// assert!((midi_note_to_hz(69.0) - 440.0).abs() < 1e-9);
/// assert!((midi_note_to_hz(81.0) - 880.0).abs() < 1e-9);
/// ```
#[inline]
pub fn midi_note_to_hz(note: f64) -> f64 {
    440.0 * ((note - 69.0) / 12.0).exp2()
}

/// Hz to MIDI note number.
#[inline]
pub fn hz_to_midi_note(hz: f64) -> f64 {
    69.0 + 12.0 * (hz / 440.0).log2()
}

/// Milliseconds to (fractional) samples.
#[inline]
pub fn ms_to_samples(ms: f64, sample_rate: f64) -> f64 {
    ms * 0.001 * sample_rate
}

/// Delay modulation depth (samples) giving a pitch swing of ±`cents` at `rate` cycles/sample.
#[inline]
pub fn vibrato_depth_samples(cents: f64, rate: f64) -> f64 {
    if rate <= 0.0 {
        return 0.0;
    }
    ((cents / 1200.0).exp2() - 1.0) / (TAU * rate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_frequency_round_trips() {
        for &hz in &[0.5, 5.0, 440.0, 19_000.0] {
            let norm = hz_to_normalized(hz, 44_100.0);
            assert!((normalized_to_hz(norm, 44_100.0) - hz).abs() < 1e-9);
        }
        assert_eq!(hz_to_normalized(24_000.0, 48_000.0), 0.5);
    }

    #[test]
    fn midi_conversion_round_trips() {
        for &note in &[0.0, 21.0, 60.0, 69.0, 100.5, 127.0] {
            let back = hz_to_midi_note(midi_note_to_hz(note));
            assert!((back - note).abs() < 1e-9, "note {note} came back as {back}");
        }
        assert!((midi_note_to_hz(60.0) - 261.625_565_300_6).abs() < 1e-6);
    }

    #[test]
    fn ms_to_samples_uses_sample_rate() {
        assert_eq!(ms_to_samples(10.0, 48_000.0), 480.0);
        assert!((ms_to_samples(0.5, 44_100.0) - 22.05).abs() < 1e-9);
    }

    #[test]
    fn vibrato_depth_produces_requested_pitch_swing() {
        let rate = hz_to_normalized(5.0, 48_000.0);
        let depth = vibrato_depth_samples(50.0, rate);
        // Peak delay slope equals the pitch ratio excursion.
        let slope = depth * TAU * rate;
        assert!((1.0 + slope - (50.0_f64 / 1200.0).exp2()).abs() < 1e-12);
        assert_eq!(vibrato_depth_samples(50.0, 0.0), 0.0);
    }
}
