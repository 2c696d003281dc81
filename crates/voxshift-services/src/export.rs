//! Writing processed clips to disk

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::info;
use voxshift_core::EffectKind;

use crate::error::{Result, ServiceError};
use crate::session::VoiceSession;

/// ISO-8601 timestamp to the second with `:` replaced by `-`, e.g. `2026-10-14T09-30-05`
pub fn timestamp_label(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%dT%H-%M-%S").to_string()
}

/// `voice-changed[-<effect>]-<timestamp>.wav`
pub fn download_filename(effect: Option<EffectKind>, now: DateTime<Utc>) -> String {
    let suffix = effect.map(|e| format!("-{e}")).unwrap_or_default();
    format!("voice-changed{suffix}-{}.wav", timestamp_label(now))
}

impl VoiceSession {
    pub fn download_filename(&self, now: DateTime<Utc>) -> String {
        download_filename(self.selected_effect(), now)
    }
}

/// Write the session's current clip into `dir`, creating it if needed.
/// Returns the path written.
pub fn export_clip(session: &VoiceSession, dir: &Path, now: DateTime<Utc>) -> Result<PathBuf> {
    let clip = session.current_clip().ok_or(ServiceError::NoClip)?;
    std::fs::create_dir_all(dir)?;
    let path = dir.join(session.download_filename(now));
    std::fs::write(&path, clip.bytes())?;
    info!(
        path = %path.display(),
        bytes = clip.len(),
        effect = session.selected_effect().map(EffectKind::name),
        "Audio exported"
    );
    Ok(path)
}
