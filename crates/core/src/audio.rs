//! MP3 duration probing.

use std::io::Cursor;

use symphonia::core::codecs::CODEC_TYPE_NULL;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("Failed to detect audio format: {0}")]
    UnknownFormat(String),

    #[error("No audio track found")]
    NoTrack,

    #[error("Audio stream has no sample rate")]
    MissingSampleRate,
}

/// Duration of an MP3 stream in seconds.
///
/// Uses the frame count from the stream header when present and otherwise
/// sums packet durations, which covers files without a Xing/Info header.
pub fn duration_seconds(bytes: Vec<u8>) -> Result<f64, AudioError> {
    let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes)), Default::default());

    let mut hint = Hint::new();
    hint.with_extension("mp3");

    let detected = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| AudioError::UnknownFormat(e.to_string()))?;
    let mut format = detected.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or(AudioError::NoTrack)?;
    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or(AudioError::MissingSampleRate)?;

    if let Some(frames) = track.codec_params.n_frames {
        return Ok(frames as f64 / f64::from(sample_rate));
    }

    let mut frames: u64 = 0;
    loop {
        match format.next_packet() {
            Ok(packet) if packet.track_id() == track_id => frames += packet.dur(),
            Ok(_) => continue,
            Err(SymphoniaError::IoError(ref e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break
            }
            Err(e) => {
                tracing::warn!(error = %e, "Stopped reading packets early");
                break;
            }
        }
    }
    Ok(frames as f64 / f64::from(sample_rate))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    /// MPEG-1 Layer III frames at 128 kbps / 44.1 kHz holding silence.
    fn silent_frames(count: usize) -> Vec<u8> {
        let mut frame = vec![0u8; 417];
        frame[..4].copy_from_slice(&[0xFF, 0xFB, 0x90, 0x04]);
        frame.repeat(count)
    }

    #[test]
    fn silent_stream_has_positive_duration() {
        // 100 frames of 1152 samples is about 2.6 seconds.
        let seconds = duration_seconds(silent_frames(100)).unwrap();
        assert!(seconds > 1.0 && seconds < 3.0, "got {seconds}");
    }

    #[test]
    fn empty_input_is_rejected() {
        assert_matches!(duration_seconds(Vec::new()), Err(AudioError::UnknownFormat(_)));
    }

    #[test]
    fn non_audio_input_is_rejected() {
        let bytes = b"definitely not an mp3 file, just some text".repeat(64);
        assert!(duration_seconds(bytes).is_err());
    }
}
