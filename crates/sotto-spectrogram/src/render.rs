//! Heatmap rendering and data-URI encoding.

use base64::Engine;
use png::{BitDepth, ColorType, Encoder};

use crate::mel;
use crate::SpectrogramError;

/// Render dB-scaled mel frames as a grayscale PNG heatmap.
///
/// Layout follows the usual spectrogram presentation: time runs left to
/// right (one pixel column per frame), mel bins run bottom to top with the
/// lowest frequencies at the bottom, and pixel intensity tracks the dB
/// scale (peak = white).
pub fn render_png(frames: &[Vec<f64>]) -> Result<Vec<u8>, SpectrogramError> {
    let width = frames.len();
    let height = frames.first().map_or(0, Vec::len);
    if width == 0 || height == 0 {
        return Err(SpectrogramError::EmptySignal(0));
    }

    let (mut min_v, mut max_v) = (f64::INFINITY, f64::NEG_INFINITY);
    for v in frames.iter().flat_map(|c| c.iter().copied()) {
        min_v = min_v.min(v);
        max_v = max_v.max(v);
    }
    let range = if (max_v - min_v).abs() < 1e-12 {
        1.0
    } else {
        max_v - min_v
    };

    // Row-major, top row first; flip bins so low frequencies land at the bottom.
    let mut pixels = Vec::with_capacity(width * height);
    for y in 0..height {
        let bin = height - 1 - y;
        for frame in frames {
            let norm = ((frame[bin] - min_v) / range).clamp(0.0, 1.0);
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            pixels.push((norm * 255.0) as u8);
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    let (w, h) = (width as u32, height as u32);
    encode_gray_png(w, h, &pixels)
}

/// Encode 8-bit grayscale pixels into an in-memory PNG.
fn encode_gray_png(width: u32, height: u32, pixels: &[u8]) -> Result<Vec<u8>, SpectrogramError> {
    let mut buf = Vec::new();
    {
        let mut encoder = Encoder::new(&mut buf, width, height);
        encoder.set_color(ColorType::Grayscale);
        encoder.set_depth(BitDepth::Eight);
        let mut writer = encoder
            .write_header()
            .map_err(|e| SpectrogramError::Encode(format!("header: {e}")))?;
        writer
            .write_image_data(pixels)
            .map_err(|e| SpectrogramError::Encode(format!("image data: {e}")))?;
    }
    Ok(buf)
}

/// Wrap PNG bytes in a `data:image/png;base64,...` URI.
pub fn data_uri(png: &[u8]) -> String {
    format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(png)
    )
}

/// Full pipeline: waveform → mel frames → dB → PNG → data URI.
pub fn spectrogram_data_uri(
    samples: &[f32],
    sample_rate: u32,
) -> Result<String, SpectrogramError> {
    let mut frames = mel::mel_frames(samples, sample_rate)?;
    mel::scale_db(&mut frames);
    let png = render_png(&frames)?;
    Ok(data_uri(&png))
}
