use super::defaults::{FORBIDDEN_MEDIA_CHARS, MAX_TIMING_MS, MIN_TIMING_MS};
use super::AppConfig;
use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::Path;

impl AppConfig {
    /// Parse CLI arguments and validate them right away.
    pub fn parse_args() -> Result<Self> {
        let mut config = Self::parse();
        config.validate()?;
        Ok(config)
    }

    /// Check CLI values and make sure the exhibit's data files exist.
    pub fn validate(&mut self) -> Result<()> {
        for (flag, value) in [
            ("--confirm-ms", self.confirm_ms),
            ("--settle-ms", self.settle_ms),
            ("--wiggle-ms", self.wiggle_ms),
            ("--blink-ms", self.blink_ms),
            ("--start-delay-ms", self.start_delay_ms),
            ("--recall-delay-ms", self.recall_delay_ms),
            ("--mute-track-ms", self.mute_track_ms),
        ] {
            if !(MIN_TIMING_MS..=MAX_TIMING_MS).contains(&value) {
                bail!("{flag} must be between {MIN_TIMING_MS} and {MAX_TIMING_MS} ms, got {value}");
            }
        }
        if self.wiggle_ms >= self.confirm_ms {
            bail!(
                "--wiggle-ms ({}) must be shorter than --confirm-ms ({})",
                self.wiggle_ms,
                self.confirm_ms
            );
        }

        for (flag, value) in [
            ("--ring-track", &self.ring_track),
            ("--tone-track", &self.tone_track),
            ("--finished-track", &self.finished_track),
        ] {
            validate_media_ref(flag, value)?;
        }

        require_file("--script", &self.script)?;
        require_file("--persons", &self.persons)?;
        require_dir("--captions-dir", &self.captions_dir)?;
        if !self.mute {
            require_dir("--audio-dir", &self.audio_dir)?;
        }
        Ok(())
    }
}

pub(super) fn validate_media_ref(flag: &str, value: &str) -> Result<()> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        bail!("{flag} cannot be empty");
    }
    if trimmed.contains(FORBIDDEN_MEDIA_CHARS) || trimmed == ".." {
        bail!("{flag} must be a bare media name, got {value:?}");
    }
    Ok(())
}

fn require_file(flag: &str, path: &Path) -> Result<()> {
    let meta = path
        .metadata()
        .with_context(|| format!("{flag} {} is not readable", path.display()))?;
    if !meta.is_file() {
        bail!("{flag} {} is not a file", path.display());
    }
    Ok(())
}

fn require_dir(flag: &str, path: &Path) -> Result<()> {
    let meta = path
        .metadata()
        .with_context(|| format!("{flag} {} is not readable", path.display()))?;
    if !meta.is_dir() {
        bail!("{flag} {} is not a directory", path.display());
    }
    Ok(())
}
