//! Mel-scaled power frames over a 16 kHz waveform.

use mel_spec::prelude::*;
use ndarray::Array1;
use num_complex::Complex;
use tracing::debug;

use crate::SpectrogramError;

/// FFT window length in samples (25 ms at 16 kHz).
pub const N_FFT: usize = 400;
/// Hop between analysis frames in samples (10 ms at 16 kHz).
pub const HOP_LENGTH: usize = 160;
/// Number of mel filterbank bins.
pub const N_MELS: usize = 80;
/// Dynamic range kept below the peak, in dB.
pub const TOP_DB: f64 = 80.0;

/// Compute log-power mel frames for a mono waveform.
///
/// Returns one `N_MELS`-length column per hop, time-ordered. The waveform
/// must already be at `sample_rate` (the service decodes everything to
/// 16 kHz before calling in here).
pub fn mel_frames(
    samples: &[f32],
    sample_rate: u32,
) -> Result<Vec<Vec<f64>>, SpectrogramError> {
    if samples.len() < HOP_LENGTH {
        return Err(SpectrogramError::EmptySignal(samples.len()));
    }

    let mut stft = Spectrogram::new(N_FFT, HOP_LENGTH);
    let mut mel = MelSpectrogram::new(N_FFT, f64::from(sample_rate), N_MELS);

    let mut frames: Vec<Vec<f64>> = Vec::new();
    let mut offset = 0;
    while offset + HOP_LENGTH <= samples.len() {
        let hop = &samples[offset..offset + HOP_LENGTH];

        // The STFT buffers hops until a full window is available.
        if let Some(fft_frame) = stft.add(hop) {
            let spectrum: Array1<Complex<f64>> =
                Array1::from_iter(fft_frame.into_iter().map(|c: Complex<f64>| c));
            let column: Vec<f64> = mel.add(&spectrum).iter().copied().collect();
            frames.push(column);
        }

        offset += HOP_LENGTH;
    }

    if frames.is_empty() {
        return Err(SpectrogramError::EmptySignal(samples.len()));
    }

    debug!(frames = frames.len(), bins = N_MELS, "mel frames computed");
    Ok(frames)
}

/// Rescale log-power frames to dB referenced to the peak value.
///
/// After this the loudest cell sits at 0 dB and everything quieter is
/// negative, floored at `-TOP_DB` — the same presentation convention the
/// usual plotting stacks apply before drawing a spectrogram.
pub fn scale_db(frames: &mut [Vec<f64>]) {
    let peak = frames
        .iter()
        .flat_map(|col| col.iter().copied())
        .fold(f64::NEG_INFINITY, f64::max);

    if !peak.is_finite() {
        return;
    }

    for col in frames.iter_mut() {
        for v in col.iter_mut() {
            *v = (10.0 * (*v - peak)).max(-TOP_DB);
        }
    }
}
