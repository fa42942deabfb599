/// Sound engine: procedural sound effects via rodio.
///
/// Every effect is synthesized into an in-memory WAV buffer at startup and
/// played fire-and-forget on a detached Sink.
///
/// Without the "sound" feature the stub SoundEngine does nothing.

use std::f32::consts::TAU;

#[cfg_attr(not(feature = "sound"), allow(dead_code))]
const SAMPLE_RATE: u32 = 22050;

#[cfg(feature = "sound")]
mod inner {
    use std::io::Cursor;
    use std::sync::Arc;

    use log::warn;
    use rodio::{OutputStream, OutputStreamHandle, Sink};

    use super::{gen_die, gen_escape, gen_smash, gen_victory, make_wav};

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sfx_smash: Arc<Vec<u8>>,
        sfx_die: Arc<Vec<u8>>,
        sfx_escape: Arc<Vec<u8>>,
        sfx_victory: Arc<Vec<u8>>,
    }

    impl SoundEngine {
        /// None when no output device is available.
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    warn!("sound disabled: {e}");
                    return None;
                }
            };

            Some(SoundEngine {
                _stream: stream,
                handle,
                sfx_smash: Arc::new(make_wav(&gen_smash())),
                sfx_die: Arc::new(make_wav(&gen_die())),
                sfx_escape: Arc::new(make_wav(&gen_escape())),
                sfx_victory: Arc::new(make_wav(&gen_victory())),
            })
        }

        fn play(&self, buf: &Arc<Vec<u8>>) {
            let Ok(sink) = Sink::try_new(&self.handle) else { return };
            if let Ok(src) = rodio::Decoder::new(Cursor::new(buf.as_ref().clone())) {
                sink.append(src);
                sink.detach();
            }
        }

        pub fn play_smash(&self) { self.play(&self.sfx_smash); }
        pub fn play_die(&self) { self.play(&self.sfx_die); }
        pub fn play_escape(&self) { self.play(&self.sfx_escape); }
        pub fn play_victory(&self) { self.play(&self.sfx_victory); }
    }
}

// ════════════════════════════════════════════════════════════
//  Waveform generators: mono f32 samples in [-1, 1]
// ════════════════════════════════════════════════════════════

/// Play `notes` back to back as (frequency, seconds), each shaped by a
/// decaying envelope. `partials` weights the 1st, 2nd, 3rd harmonic.
#[cfg_attr(not(feature = "sound"), allow(dead_code))]
fn gen_notes(notes: &[(f32, f32)], partials: [f32; 3], volume: f32) -> Vec<f32> {
    let mut samples = Vec::new();
    for &(freq, dur) in notes {
        let n = (SAMPLE_RATE as f32 * dur) as usize;
        for i in 0..n {
            let t = i as f32 / SAMPLE_RATE as f32;
            let env = 1.0 - (i as f32 / n as f32).powf(0.7);
            let wave: f32 = partials
                .iter()
                .enumerate()
                .map(|(h, &w)| (t * freq * (h + 1) as f32 * TAU).sin() * w)
                .sum();
            samples.push(wave * env * volume);
        }
    }
    samples
}

/// Wall smash: a crunchy noise burst over a low thud.
#[cfg_attr(not(feature = "sound"), allow(dead_code))]
fn gen_smash() -> Vec<f32> {
    let n = (SAMPLE_RATE as f32 * 0.18) as usize;
    let mut rng: u32 = 0x2545_f491;
    (0..n)
        .map(|i| {
            let p = i as f32 / n as f32;
            let t = i as f32 / SAMPLE_RATE as f32;
            let thud = (t * (140.0 - p * 80.0) * TAU).sin();
            // xorshift noise
            rng ^= rng << 13;
            rng ^= rng >> 17;
            rng ^= rng << 5;
            let noise = (rng as f32 / u32::MAX as f32) * 2.0 - 1.0;
            (thud * 0.5 + noise * 0.5) * (1.0 - p).powi(2) * 0.4
        })
        .collect()
}

/// Falling into the void: a long downward slide.
#[cfg_attr(not(feature = "sound"), allow(dead_code))]
fn gen_die() -> Vec<f32> {
    let n = (SAMPLE_RATE as f32 * 0.6) as usize;
    let mut phase = 0.0_f32;
    (0..n)
        .map(|i| {
            let p = i as f32 / n as f32;
            let freq = 520.0 * (1.0 - p * 0.8);
            phase += freq / SAMPLE_RATE as f32;
            (phase * TAU).sin() * (1.0 - p) * 0.3
        })
        .collect()
}

/// Exit reached: rising arpeggio G4 → C5 → E5 → G5.
#[cfg_attr(not(feature = "sound"), allow(dead_code))]
fn gen_escape() -> Vec<f32> {
    gen_notes(
        &[(392.0, 0.07), (523.0, 0.07), (659.0, 0.07), (784.0, 0.2)],
        [0.7, 0.2, 0.1],
        0.3,
    )
}

/// Last level cleared: a longer fanfare ending on a held C6.
#[cfg_attr(not(feature = "sound"), allow(dead_code))]
fn gen_victory() -> Vec<f32> {
    gen_notes(
        &[
            (523.0, 0.1), (523.0, 0.1), (659.0, 0.1), (784.0, 0.15),
            (659.0, 0.1), (784.0, 0.1), (1047.0, 0.45),
        ],
        [0.6, 0.3, 0.1],
        0.3,
    )
}

// ════════════════════════════════════════════════════════════
//  WAV encoder, 16-bit PCM mono
// ════════════════════════════════════════════════════════════

#[cfg_attr(not(feature = "sound"), allow(dead_code))]
fn make_wav(samples: &[f32]) -> Vec<u8> {
    let channels: u16 = 1;
    let bits: u16 = 16;
    let block_align = channels * bits / 8;
    let byte_rate = SAMPLE_RATE * block_align as u32;
    let data_size = samples.len() as u32 * block_align as u32;

    let mut buf = Vec::with_capacity(44 + data_size as usize);
    buf.extend_from_slice(b"RIFF");
    buf.extend_from_slice(&(36 + data_size).to_le_bytes());
    buf.extend_from_slice(b"WAVE");

    buf.extend_from_slice(b"fmt ");
    buf.extend_from_slice(&16u32.to_le_bytes());
    buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
    buf.extend_from_slice(&channels.to_le_bytes());
    buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
    buf.extend_from_slice(&byte_rate.to_le_bytes());
    buf.extend_from_slice(&block_align.to_le_bytes());
    buf.extend_from_slice(&bits.to_le_bytes());

    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&data_size.to_le_bytes());
    for &s in samples {
        buf.extend_from_slice(&((s.clamp(-1.0, 1.0) * 32767.0) as i16).to_le_bytes());
    }
    buf
}

// ════════════════════════════════════════════════════════════
//  Public API, compiles to no-ops when sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play_smash(&self) {}
    pub fn play_die(&self) {}
    pub fn play_escape(&self) {}
    pub fn play_victory(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wav_header_describes_the_samples() {
        let wav = make_wav(&[0.0, 1.0, -1.0, 2.0]);
        assert_eq!(wav.len(), 44 + 8);
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(u32::from_le_bytes(wav[4..8].try_into().unwrap()), 36 + 8);
        assert_eq!(&wav[8..16], b"WAVEfmt ");
        assert_eq!(u32::from_le_bytes(wav[24..28].try_into().unwrap()), SAMPLE_RATE);
        assert_eq!(&wav[36..40], b"data");
        assert_eq!(u32::from_le_bytes(wav[40..44].try_into().unwrap()), 8);
        // Out-of-range samples are clamped.
        assert_eq!(i16::from_le_bytes([wav[46], wav[47]]), 32767);
        assert_eq!(i16::from_le_bytes([wav[50], wav[51]]), 32767);
    }

    #[test]
    fn effects_are_audible_and_in_range() {
        for (name, samples) in [
            ("smash", gen_smash()),
            ("die", gen_die()),
            ("escape", gen_escape()),
            ("victory", gen_victory()),
        ] {
            assert!(!samples.is_empty(), "{name}");
            assert!(samples.iter().all(|s| s.abs() <= 1.0), "{name}");
            assert!(samples.iter().any(|s| s.abs() > 0.05), "{name}");
        }
    }
}
