//! Minimal RIFF/WAVE writer for 16-bit PCM.

use anyhow::{anyhow, bail, Result};

use crate::capture::AudioClip;

pub const HEADER_LEN: usize = 44;
const BITS_PER_SAMPLE: u16 = 16;

/// Encode a clip as a PCM16 WAV file. Samples are scaled by `i16::MAX` and
/// clamped, so out-of-range input saturates instead of wrapping.
pub fn encode(clip: &AudioClip) -> Result<Vec<u8>> {
    if clip.channels == 0 || clip.sample_rate == 0 {
        bail!(
            "cannot encode audio with {} channels at {} Hz",
            clip.channels,
            clip.sample_rate
        );
    }

    let bytes_per_sample = u32::from(BITS_PER_SAMPLE / 8);
    let block_align = u32::from(clip.channels) * bytes_per_sample;
    let byte_rate = clip.sample_rate * block_align;
    let data_len = u32::try_from(clip.samples.len() * bytes_per_sample as usize)
        .map_err(|_| anyhow!("audio clip too long for a WAV file"))?;

    let mut out = Vec::with_capacity(HEADER_LEN + data_len as usize);
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(data_len + 36).to_le_bytes());
    out.extend_from_slice(b"WAVE");
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&clip.channels.to_le_bytes());
    out.extend_from_slice(&clip.sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&(block_align as u16).to_le_bytes());
    out.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());

    for &sample in &clip.samples {
        let value = (sample * f32::from(i16::MAX)).clamp(f32::from(i16::MIN), f32::from(i16::MAX));
        out.extend_from_slice(&(value as i16).to_le_bytes());
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u32_at(bytes: &[u8], offset: usize) -> u32 {
        u32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
    }

    fn u16_at(bytes: &[u8], offset: usize) -> u16 {
        u16::from_le_bytes(bytes[offset..offset + 2].try_into().unwrap())
    }

    #[test]
    fn one_second_mono_header() {
        let clip = AudioClip {
            channels: 1,
            sample_rate: 44_100,
            samples: vec![0.0; 44_100],
        };
        let bytes = encode(&clip).unwrap();

        assert_eq!(bytes.len(), HEADER_LEN + 88_200);
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(u32_at(&bytes, 4), 88_236);
        assert_eq!(&bytes[8..16], b"WAVEfmt ");
        assert_eq!(u32_at(&bytes, 16), 16);
        assert_eq!(u16_at(&bytes, 20), 1);
        assert_eq!(u16_at(&bytes, 22), 1);
        assert_eq!(u32_at(&bytes, 24), 44_100);
        assert_eq!(u32_at(&bytes, 28), 88_200);
        assert_eq!(u16_at(&bytes, 32), 2);
        assert_eq!(u16_at(&bytes, 34), 16);
        assert_eq!(&bytes[36..40], b"data");
        assert_eq!(u32_at(&bytes, 40), 88_200);
    }

    #[test]
    fn samples_saturate() {
        let clip = AudioClip {
            channels: 1,
            sample_rate: 8_000,
            samples: vec![1.0, -1.0, 2.0, -2.0, 0.5],
        };
        let bytes = encode(&clip).unwrap();
        let pcm: Vec<i16> = bytes[HEADER_LEN..]
            .chunks_exact(2)
            .map(|b| i16::from_le_bytes([b[0], b[1]]))
            .collect();
        assert_eq!(pcm, [32767, -32767, 32767, -32768, 16383]);
    }

    #[test]
    fn zero_channels_is_an_error() {
        assert!(encode(&AudioClip::default()).is_err());
    }
}
