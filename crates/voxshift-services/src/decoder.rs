//! WAV decoding into planar sample buffers.
//!
//! hound handles the common cases; a manual RIFF chunk walker picks up
//! files hound rejects (odd extended `fmt ` chunks, truncated headers).

use std::io::{Cursor, Read, Seek, SeekFrom};
use std::path::Path;

use tracing::{debug, warn};
use voxshift_core::SampleBuffer;

use crate::error::{Result, ServiceError};

/// Matches the upload guard: any `audio/*` media type is accepted
pub fn is_audio_media_type(media_type: &str) -> bool {
    media_type.starts_with("audio/")
}

/// Read and decode a WAV file from disk
pub fn decode_wav_file(path: &Path) -> Result<SampleBuffer> {
    let bytes = std::fs::read(path)?;
    debug!(path = %path.display(), bytes = bytes.len(), "Read audio file");
    decode_wav_bytes(&bytes)
}

/// Decode WAV bytes to a [`SampleBuffer`]. Integer samples are scaled by
/// `1 / 2^(bits - 1)`.
pub fn decode_wav_bytes(bytes: &[u8]) -> Result<SampleBuffer> {
    let (samples, channels, sample_rate) = match read_with_hound(bytes) {
        Ok(decoded) => decoded,
        Err(e) => {
            warn!(error = %e, "hound rejected input, falling back to manual RIFF parsing");
            parse_riff(bytes)?
        }
    };

    if samples.is_empty() {
        return Err(ServiceError::Decode("WAV file has no samples".into()));
    }

    debug!(samples = samples.len(), channels, sample_rate, "Decoded WAV");
    Ok(SampleBuffer::from_interleaved(&samples, channels, sample_rate)?)
}

fn read_with_hound(bytes: &[u8]) -> std::result::Result<(Vec<f32>, u16, u32), hound::Error> {
    let reader = hound::WavReader::new(Cursor::new(bytes))?;
    let spec = reader.spec();
    let samples = match spec.sample_format {
        hound::SampleFormat::Float => reader.into_samples::<f32>().collect::<std::result::Result<Vec<_>, _>>()?,
        hound::SampleFormat::Int => {
            let max_val = (1_i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|x| x as f32 / max_val))
                .collect::<std::result::Result<Vec<_>, _>>()?
        }
    };
    Ok((samples, spec.channels, spec.sample_rate))
}

fn decode_err(what: &str) -> impl Fn(std::io::Error) -> ServiceError + '_ {
    move |e| ServiceError::Decode(format!("{what}: {e}"))
}

/// Walk RIFF chunks by hand. Returns (interleaved samples, channels, sample_rate).
fn parse_riff(bytes: &[u8]) -> Result<(Vec<f32>, u16, u32)> {
    let mut f = Cursor::new(bytes);
    let mut buf4 = [0u8; 4];
    let mut buf2 = [0u8; 2];

    f.read_exact(&mut buf4).map_err(decode_err("read RIFF"))?;
    if &buf4 != b"RIFF" {
        return Err(ServiceError::Decode("not a RIFF file".into()));
    }
    f.read_exact(&mut buf4).map_err(decode_err("read RIFF size"))?;
    f.read_exact(&mut buf4).map_err(decode_err("read WAVE"))?;
    if &buf4 != b"WAVE" {
        return Err(ServiceError::Decode("not a WAVE file".into()));
    }

    let mut sample_rate = 0u32;
    let mut channels = 0u16;
    let mut bits_per_sample = 0u16;
    let mut audio_format = 0u16;
    let mut data_bytes: Vec<u8> = Vec::new();

    loop {
        let Ok(()) = f.read_exact(&mut buf4) else { break };
        let chunk_id = buf4;
        let Ok(()) = f.read_exact(&mut buf4) else { break };
        let chunk_size = u32::from_le_bytes(buf4);
        let padded = chunk_size as i64 + (chunk_size & 1) as i64;

        if &chunk_id == b"fmt " {
            if chunk_size < 16 {
                return Err(ServiceError::Decode(format!("fmt chunk too short ({chunk_size} bytes)")));
            }
            f.read_exact(&mut buf2).map_err(decode_err("fmt"))?;
            audio_format = u16::from_le_bytes(buf2);
            f.read_exact(&mut buf2).map_err(decode_err("fmt"))?;
            channels = u16::from_le_bytes(buf2);
            f.read_exact(&mut buf4).map_err(decode_err("fmt"))?;
            sample_rate = u32::from_le_bytes(buf4);
            f.read_exact(&mut buf4).map_err(decode_err("fmt"))?; // byte rate
            f.read_exact(&mut buf2).map_err(decode_err("fmt"))?; // block align
            f.read_exact(&mut buf2).map_err(decode_err("fmt"))?;
            bits_per_sample = u16::from_le_bytes(buf2);
            f.seek(SeekFrom::Current(padded - 16)).map_err(decode_err("fmt"))?;
            continue;
        }

        if &chunk_id == b"data" {
            // Tolerate a data size that overruns the file
            let available = bytes.len().saturating_sub(f.position() as usize);
            data_bytes.resize((chunk_size as usize).min(available), 0);
            f.read_exact(&mut data_bytes).map_err(decode_err("data"))?;
            break;
        }

        f.seek(SeekFrom::Current(padded)).map_err(decode_err("skip chunk"))?;
    }

    if channels == 0 || sample_rate == 0 {
        return Err(ServiceError::Decode("missing or invalid fmt chunk".into()));
    }
    if data_bytes.is_empty() {
        return Err(ServiceError::Decode("no data chunk".into()));
    }
    // 1 = PCM, 3 = IEEE float, 65534 = WAVE_FORMAT_EXTENSIBLE
    if audio_format != 1 && audio_format != 3 && audio_format != 65534 {
        return Err(ServiceError::Decode(format!("unsupported format {audio_format}")));
    }

    let samples = samples_from_le(&data_bytes, audio_format, bits_per_sample)?;
    Ok((samples, channels, sample_rate))
}

/// Convert little-endian sample bytes to floats. Integer widths are
/// left-aligned into an i32 so one scale covers 16, 24 and 32 bits.
fn samples_from_le(data: &[u8], audio_format: u16, bits: u16) -> Result<Vec<f32>> {
    match (audio_format, bits) {
        (3, 32) => Ok(data
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect()),
        (_, 16 | 24 | 32) => {
            let shift = 32 - u32::from(bits);
            Ok(data
                .chunks_exact(usize::from(bits / 8))
                .map(|b| {
                    let raw = b.iter().rev().fold(0u32, |acc, &x| (acc << 8) | u32::from(x));
                    (raw << shift) as i32 as f32 / 2_147_483_648.0
                })
                .collect())
        }
        _ => Err(ServiceError::Decode(format!("unsupported bits {bits}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voxshift_core::encode_to_container;

    fn write_wav(spec: hound::WavSpec, write: impl FnOnce(&mut hound::WavWriter<Cursor<&mut Vec<u8>>>)) -> Vec<u8> {
        let mut bytes = Vec::new();
        {
            let mut writer = hound::WavWriter::new(Cursor::new(&mut bytes), spec).unwrap();
            write(&mut writer);
            writer.finalize().unwrap();
        }
        bytes
    }

    /// PCM16 WAV with a 20-byte fmt chunk and a LIST chunk before the data
    fn extended_fmt_wav(samples: &[i16], channels: u16, sample_rate: u32) -> Vec<u8> {
        let data: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
        let mut b = Vec::new();
        b.extend_from_slice(b"RIFF");
        b.extend_from_slice(&(4 + 28 + 14 + 8 + data.len() as u32).to_le_bytes());
        b.extend_from_slice(b"WAVE");
        b.extend_from_slice(b"fmt ");
        b.extend_from_slice(&20u32.to_le_bytes());
        b.extend_from_slice(&1u16.to_le_bytes());
        b.extend_from_slice(&channels.to_le_bytes());
        b.extend_from_slice(&sample_rate.to_le_bytes());
        b.extend_from_slice(&(sample_rate * channels as u32 * 2).to_le_bytes());
        b.extend_from_slice(&(channels * 2).to_le_bytes());
        b.extend_from_slice(&16u16.to_le_bytes());
        b.extend_from_slice(&[0u8; 4]);
        b.extend_from_slice(b"LIST");
        b.extend_from_slice(&5u32.to_le_bytes());
        b.extend_from_slice(b"INFOx\0"); // 5 bytes + pad
        b.extend_from_slice(b"data");
        b.extend_from_slice(&(data.len() as u32).to_le_bytes());
        b.extend_from_slice(&data);
        b
    }

    #[test]
    fn test_media_type_guard() {
        assert!(is_audio_media_type("audio/wav"));
        assert!(is_audio_media_type("audio/webm"));
        assert!(!is_audio_media_type("video/mp4"));
        assert!(!is_audio_media_type(""));
    }

    #[test]
    fn test_decodes_own_encoding() {
        let buf = SampleBuffer::new(vec![vec![0.5, -0.5, 0.0], vec![0.25, -1.0, 1.0]], 16000).unwrap();
        let wav = encode_to_container(&buf).unwrap();
        let decoded = decode_wav_bytes(wav.bytes()).unwrap();
        assert_eq!(decoded.channel_count(), 2);
        assert_eq!(decoded.sample_rate(), 16000);
        assert_eq!(decoded.frame_count(), 3);
        for (a, b) in decoded.to_interleaved().iter().zip(buf.to_interleaved()) {
            // decoder divides by 32768 while the encoder scales positives by 32767
            assert!((a - b).abs() <= 2.0 / 32768.0, "{a} vs {b}");
        }
    }

    #[test]
    fn test_decodes_float_wav() {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 48000,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let bytes = write_wav(spec, |w| {
            for s in [0.1f32, -0.2, 0.3] {
                w.write_sample(s).unwrap();
            }
        });
        let decoded = decode_wav_bytes(&bytes).unwrap();
        assert_eq!(decoded.channel(0).unwrap(), &[0.1, -0.2, 0.3]);
        assert_eq!(decoded.sample_rate(), 48000);
    }

    #[test]
    fn test_decodes_24_bit() {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 44100,
            bits_per_sample: 24,
            sample_format: hound::SampleFormat::Int,
        };
        let bytes = write_wav(spec, |w| {
            w.write_sample(4_194_304i32).unwrap();
            w.write_sample(-8_388_608i32).unwrap();
        });
        let decoded = decode_wav_bytes(&bytes).unwrap();
        assert_eq!(decoded.channel(0).unwrap(), &[0.5, -1.0]);
    }

    #[test]
    fn test_manual_parser_skips_extra_chunks() {
        let bytes = extended_fmt_wav(&[16384, -16384, 0, 32767], 2, 8000);
        let (samples, channels, rate) = parse_riff(&bytes).unwrap();
        assert_eq!(channels, 2);
        assert_eq!(rate, 8000);
        assert_eq!(samples.len(), 4);
        assert_eq!(samples[0], 0.5);
        assert_eq!(samples[1], -0.5);

        let buf = decode_wav_bytes(&bytes).unwrap();
        assert_eq!(buf.frame_count(), 2);
    }

    #[test]
    fn test_integer_widths_share_one_scale() {
        let pcm16: Vec<u8> = [16384i16, -32768].iter().flat_map(|s| s.to_le_bytes()).collect();
        assert_eq!(samples_from_le(&pcm16, 1, 16).unwrap(), vec![0.5, -1.0]);

        // 0x400000 and 0xC00000 as 24-bit little-endian
        let pcm24 = [0x00, 0x00, 0x40, 0x00, 0x00, 0xC0];
        assert_eq!(samples_from_le(&pcm24, 1, 24).unwrap(), vec![0.5, -0.5]);

        let pcm32: Vec<u8> = [i32::MIN, 1 << 30].iter().flat_map(|s| s.to_le_bytes()).collect();
        assert_eq!(samples_from_le(&pcm32, 65534, 32).unwrap(), vec![-1.0, 0.5]);

        let float: Vec<u8> = [0.25f32, -0.75].iter().flat_map(|s| s.to_le_bytes()).collect();
        assert_eq!(samples_from_le(&float, 3, 32).unwrap(), vec![0.25, -0.75]);

        assert!(matches!(samples_from_le(&[0; 4], 1, 8), Err(ServiceError::Decode(_))));
    }

    #[test]
    fn test_decode_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("take.wav");
        let buf = SampleBuffer::mono(vec![0.0, 0.5, -0.5], 22050).unwrap();
        std::fs::write(&path, encode_to_container(&buf).unwrap().bytes()).unwrap();

        let decoded = decode_wav_file(&path).unwrap();
        assert_eq!(decoded.sample_rate(), 22050);
        assert_eq!(decoded.frame_count(), 3);

        assert!(matches!(decode_wav_file(&dir.path().join("missing.wav")), Err(ServiceError::Io(_))));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(decode_wav_bytes(b"not audio at all"), Err(ServiceError::Decode(_))));
        assert!(matches!(decode_wav_bytes(&[]), Err(ServiceError::Decode(_))));
    }

    #[test]
    fn test_rejects_empty_data() {
        let buf = SampleBuffer::mono(Vec::new(), 8000).unwrap();
        let wav = encode_to_container(&buf).unwrap();
        assert!(matches!(decode_wav_bytes(wav.bytes()), Err(ServiceError::Decode(_))));
    }
}
