//! WAV Codec - 基于 symphonia 的解码与 RIFF/PCM16 编码
//!
//! 固定无损容器：16-bit PCM 单声道 WAV，无格式协商

use std::fs::File;
use std::io::Cursor;
use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::application::ports::{AudioInfo, AudioIoError, AudioProbePort};

/// 解码出的 PCM 音频
#[derive(Debug)]
pub struct DecodedAudio {
    /// 交织的 f32 采样
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u8,
    pub duration_ms: u64,
}

/// 将 PCM f32 样本编码为 16-bit 单声道 WAV
pub fn encode_wav(samples: &[f32], sample_rate: u32) -> Vec<u8> {
    let bits_per_sample: u16 = 16;
    let num_channels: u16 = 1;
    let byte_rate = sample_rate * num_channels as u32 * (bits_per_sample / 8) as u32;
    let block_align = num_channels * (bits_per_sample / 8);

    // 转换 f32 样本到 i16
    let pcm_data: Vec<i16> = samples
        .iter()
        .map(|&s| {
            let clamped = s.clamp(-1.0, 1.0);
            (clamped * 32767.0) as i16
        })
        .collect();

    let data_size = pcm_data.len() * 2;
    let file_size = 36 + data_size;

    let mut wav = Vec::with_capacity(44 + data_size);

    // RIFF header
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&(file_size as u32).to_le_bytes());
    wav.extend_from_slice(b"WAVE");

    // fmt chunk
    wav.extend_from_slice(b"fmt ");
    wav.extend_from_slice(&16u32.to_le_bytes()); // chunk size
    wav.extend_from_slice(&1u16.to_le_bytes()); // PCM format
    wav.extend_from_slice(&num_channels.to_le_bytes());
    wav.extend_from_slice(&sample_rate.to_le_bytes());
    wav.extend_from_slice(&byte_rate.to_le_bytes());
    wav.extend_from_slice(&block_align.to_le_bytes());
    wav.extend_from_slice(&bits_per_sample.to_le_bytes());

    // data chunk
    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&(data_size as u32).to_le_bytes());

    for sample in pcm_data {
        wav.extend_from_slice(&sample.to_le_bytes());
    }

    wav
}

/// 使用 symphonia 解码 WAV 字节获取 PCM 数据
pub fn decode_wav(data: &[u8]) -> Result<DecodedAudio, AudioIoError> {
    let cursor = Cursor::new(data.to_vec());
    let mss = MediaSourceStream::new(Box::new(cursor), Default::default());

    let mut hint = Hint::new();
    hint.with_extension("wav");

    decode_stream(mss, hint)
}

/// 解码音频文件
pub fn decode_file(path: &Path) -> Result<DecodedAudio, AudioIoError> {
    let file = open_media(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    decode_stream(mss, hint)
}

fn open_media(path: &Path) -> Result<File, AudioIoError> {
    if !path.exists() {
        return Err(AudioIoError::NotFound(path.display().to_string()));
    }
    File::open(path).map_err(|e| AudioIoError::Unreadable(format!("{}: {}", path.display(), e)))
}

fn decode_stream(mss: MediaSourceStream, hint: Hint) -> Result<DecodedAudio, AudioIoError> {
    let format_opts = FormatOptions::default();
    let metadata_opts = MetadataOptions::default();

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &format_opts, &metadata_opts)
        .map_err(|e| AudioIoError::DecodingError(format!("Probe failed: {}", e)))?;

    let mut format = probed.format;

    let track = format
        .default_track()
        .ok_or_else(|| AudioIoError::DecodingError("No audio track found".to_string()))?;

    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| AudioIoError::DecodingError("Unknown sample rate".to_string()))?;

    let channels = track
        .codec_params
        .channels
        .map(|c| c.count() as u8)
        .ok_or_else(|| AudioIoError::DecodingError("Unknown channel count".to_string()))?;

    let decoder_opts = DecoderOptions::default();
    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &decoder_opts)
        .map_err(|e| AudioIoError::DecodingError(format!("Decoder creation failed: {}", e)))?;

    let mut samples: Vec<f32> = Vec::new();
    let track_id = track.id;

    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(symphonia::core::errors::Error::IoError(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => {
                return Err(AudioIoError::DecodingError(format!(
                    "Packet read error: {}",
                    e
                )));
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(e) => {
                tracing::warn!("Decode error (skipping packet): {}", e);
                continue;
            }
        };

        let spec = *decoded.spec();
        let num_frames = decoded.frames();
        let mut sample_buf = SampleBuffer::<f32>::new(num_frames as u64, spec);
        sample_buf.copy_interleaved_ref(decoded);
        // Only take the actual samples, not the entire buffer capacity
        let actual_samples = num_frames * spec.channels.count();
        samples.extend(&sample_buf.samples()[..actual_samples]);
    }

    let duration_ms = if sample_rate > 0 && channels > 0 {
        (samples.len() as u64 * 1000) / (sample_rate as u64 * channels as u64)
    } else {
        0
    };

    Ok(DecodedAudio {
        samples,
        sample_rate,
        channels,
        duration_ms,
    })
}

/// 基于 symphonia 的输入音频探测器
pub struct SymphoniaProbe;

impl AudioProbePort for SymphoniaProbe {
    fn probe(&self, path: &Path) -> Result<AudioInfo, AudioIoError> {
        let decoded = decode_file(path)?;
        Ok(AudioInfo {
            sample_rate: decoded.sample_rate,
            channels: decoded.channels,
            duration_ms: decoded.duration_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode_round_trip() {
        let samples = vec![0.0f32, 0.5, -0.5, 1.0, -1.0, 0.25];
        let wav = encode_wav(&samples, 16000);

        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");

        let decoded = decode_wav(&wav).unwrap();
        assert_eq!(decoded.sample_rate, 16000);
        assert_eq!(decoded.channels, 1);
        assert_eq!(decoded.samples.len(), samples.len());

        // i16 量化容差内逐样本一致
        for (a, b) in samples.iter().zip(decoded.samples.iter()) {
            assert!((a - b).abs() < 1e-3, "sample mismatch: {a} vs {b}");
        }
    }

    #[test]
    fn test_out_of_range_samples_are_clamped_on_encode() {
        let wav = encode_wav(&[2.0, -2.0], 8000);
        let decoded = decode_wav(&wav).unwrap();
        assert!((decoded.samples[0] - 1.0).abs() < 1e-3);
        assert!((decoded.samples[1] + 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_probe_missing_file() {
        let probe = SymphoniaProbe;
        let err = probe
            .probe(Path::new("/nonexistent/audio.wav"))
            .unwrap_err();
        assert!(matches!(err, AudioIoError::NotFound(_)));
    }

    #[test]
    fn test_probe_reads_header_of_written_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("probe.wav");
        std::fs::write(&path, encode_wav(&vec![0.1f32; 22050], 22050)).unwrap();

        let probe = SymphoniaProbe;
        let info = probe.probe(&path).unwrap();
        assert_eq!(info.sample_rate, 22050);
        assert_eq!(info.channels, 1);
        assert!(info.duration_ms >= 990 && info.duration_ms <= 1010);
    }

    #[test]
    fn test_garbage_bytes_fail_decoding() {
        let err = decode_wav(&[0u8; 32]).unwrap_err();
        assert!(matches!(err, AudioIoError::DecodingError(_)));
    }
}
