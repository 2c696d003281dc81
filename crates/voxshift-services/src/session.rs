//! Voice changer session state, owned by the host application

use tracing::{debug, info};
use voxshift_core::{apply_effect, encode_to_container, EffectKind, EffectPreset, EncodedAudio, SampleBuffer};

use crate::decoder::{decode_wav_bytes, is_audio_media_type};
use crate::error::{Result, ServiceError};

/// What `select_effect` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectOutcome {
    /// No clip loaded; the effect is only remembered
    Selected(EffectKind),
    /// The current clip was replaced by the processed one
    Applied { effect: EffectKind, frames: usize },
}

/// Current clip, selected effect, and recording flag.
///
/// Failed operations leave the previous clip in place.
#[derive(Debug, Clone, Default)]
pub struct VoiceSession {
    current_clip: Option<EncodedAudio>,
    selected_effect: Option<EffectKind>,
    recording: bool,
}

impl VoiceSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_clip(&self) -> Option<&EncodedAudio> {
        self.current_clip.as_ref()
    }

    pub fn selected_effect(&self) -> Option<EffectKind> {
        self.selected_effect
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    /// Replace the current clip with uploaded bytes
    pub fn load_clip(&mut self, bytes: Vec<u8>, media_type: &str) -> Result<()> {
        if !is_audio_media_type(media_type) {
            return Err(ServiceError::UnsupportedMedia(media_type.to_string()));
        }
        info!(bytes = bytes.len(), media_type, "Audio clip loaded");
        self.current_clip = Some(EncodedAudio::new(bytes, media_type));
        Ok(())
    }

    pub fn begin_recording(&mut self) -> Result<()> {
        if self.recording {
            return Err(ServiceError::AlreadyRecording);
        }
        self.recording = true;
        info!("Recording started");
        Ok(())
    }

    /// Stop recording and make the captured samples the current clip
    pub fn finish_recording(&mut self, captured: &SampleBuffer) -> Result<()> {
        if !self.recording {
            return Err(ServiceError::NotRecording);
        }
        let encoded = encode_to_container(captured)?;
        self.recording = false;
        info!(
            frames = captured.frame_count(),
            duration_secs = captured.duration_secs(),
            "Recording completed"
        );
        self.current_clip = Some(encoded);
        Ok(())
    }

    /// Select an effect and, if a clip is loaded, process it in place.
    ///
    /// The processed clip becomes the input for the next effect.
    pub fn select_effect(&mut self, effect: EffectKind) -> Result<EffectOutcome> {
        self.selected_effect = Some(effect);

        if self.current_clip.is_none() {
            info!(%effect, "Effect selected");
            return Ok(EffectOutcome::Selected(effect));
        }

        let frames = self.apply_preset(&effect.preset())?;
        info!(%effect, output_frames = frames, "Effect applied");
        Ok(EffectOutcome::Applied { effect, frames })
    }

    /// Process the current clip with an arbitrary preset, leaving the
    /// selected effect untouched. Returns the new frame count.
    pub fn apply_preset(&mut self, preset: &EffectPreset) -> Result<usize> {
        let clip = self.current_clip.as_ref().ok_or(ServiceError::NoClip)?;
        let input = decode_wav_bytes(clip.bytes())?;
        let processed = apply_effect(&input, preset)?;
        let encoded = encode_to_container(&processed)?;

        let frames = processed.frame_count();
        debug!(
            input_frames = input.frame_count(),
            output_frames = frames,
            pitch = preset.pitch_factor,
            speed = preset.speed_factor,
            echo = preset.echo_mix,
            "Preset applied"
        );
        self.current_clip = Some(encoded);
        Ok(frames)
    }

    pub fn select_effect_by_name(&mut self, name: &str) -> Result<EffectOutcome> {
        let effect = name.parse::<EffectKind>()?;
        self.select_effect(effect)
    }
}
