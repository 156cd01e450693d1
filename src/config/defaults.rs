pub const DEFAULT_CONFIRM_MS: u64 = 300;
pub const DEFAULT_SETTLE_MS: u64 = 150;
pub const DEFAULT_WIGGLE_MS: u64 = 80;
pub const DEFAULT_BLINK_MS: u64 = 600;
pub const DEFAULT_START_DELAY_MS: u64 = 2000;
pub const DEFAULT_RECALL_DELAY_MS: u64 = 1000;
pub const DEFAULT_MUTE_TRACK_MS: u64 = 1500;

pub const DEFAULT_RING_TRACK: &str = "buzzer";
pub const DEFAULT_TONE_TRACK: &str = "outgoing-ring";
pub const DEFAULT_FINISHED_TRACK: &str = "FinishedActivity";

pub(super) const MIN_TIMING_MS: u64 = 10;
pub(super) const MAX_TIMING_MS: u64 = 10_000;
// Media refs are joined onto the audio dir, so keep them to one path component.
pub(super) const FORBIDDEN_MEDIA_CHARS: &[char] = &['/', '\\', '\0'];
