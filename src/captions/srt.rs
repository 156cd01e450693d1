use regex::Regex;
use std::sync::OnceLock;

/// One timed caption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cue {
    pub start_ms: u64,
    pub end_ms: u64,
    pub text: String,
}

impl Cue {
    pub fn duration_ms(&self) -> u64 {
        self.end_ms.saturating_sub(self.start_ms)
    }
}

fn timing_regex() -> &'static Regex {
    static TIMING: OnceLock<Regex> = OnceLock::new();
    TIMING.get_or_init(|| {
        Regex::new(
            r"^\s*(\d+):(\d{1,2}):(\d{1,2})[,.](\d{1,3})\s*-->\s*(\d+):(\d{1,2}):(\d{1,2})[,.](\d{1,3})",
        )
        .expect("caption timing regex")
    })
}

fn millis(hours: &str, minutes: &str, seconds: &str, fraction: &str) -> Option<u64> {
    let hours: u64 = hours.parse().ok()?;
    let minutes: u64 = minutes.parse().ok()?;
    let seconds: u64 = seconds.parse().ok()?;
    // "5" after the comma means 500 ms, not 5 ms.
    let fraction_ms: u64 = format!("{fraction:0<3}").parse().ok()?;
    hours
        .checked_mul(3_600_000)?
        .checked_add(minutes * 60_000 + seconds * 1000 + fraction_ms)
}

/// Parse SubRip text into cues, skipping blocks that have no timing line.
pub fn parse_srt(text: &str) -> Vec<Cue> {
    let normalized = text.replace("\r\n", "\n");
    let mut cues = Vec::new();
    for block in normalized.split("\n\n") {
        let mut lines = block.lines().skip_while(|line| line.trim().is_empty());
        let Some(first) = lines.next() else {
            continue;
        };
        // The sequence number is optional in practice; accept a block that starts with timing.
        let timing_line = if timing_regex().is_match(first) {
            first
        } else {
            match lines.next() {
                Some(line) => line,
                None => continue,
            }
        };
        let Some(caps) = timing_regex().captures(timing_line) else {
            crate::log_debug(&format!("caption block without timing skipped: {first:?}"));
            continue;
        };
        let start = millis(&caps[1], &caps[2], &caps[3], &caps[4]);
        let end = millis(&caps[5], &caps[6], &caps[7], &caps[8]);
        let (Some(start_ms), Some(end_ms)) = (start, end) else {
            crate::log_debug(&format!("caption timing out of range skipped: {timing_line:?}"));
            continue;
        };
        let text = lines.collect::<Vec<_>>().join("\n").trim().to_string();
        cues.push(Cue {
            start_ms,
            end_ms,
            text,
        });
    }
    cues
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "1\n00:00:00,000 --> 00:00:02,500\nHello, Olive?\n\n\
2\n00:00:02,500 --> 00:00:05,000\nCharlie! How are you?\nIt's been ages.\n\n";

    #[test]
    fn parses_numbered_blocks() {
        let cues = parse_srt(SAMPLE);
        assert_eq!(cues.len(), 2);
        assert_eq!(cues[0].start_ms, 0);
        assert_eq!(cues[0].end_ms, 2500);
        assert_eq!(cues[0].text, "Hello, Olive?");
        assert_eq!(cues[1].duration_ms(), 2500);
        assert_eq!(cues[1].text, "Charlie! How are you?\nIt's been ages.");
    }

    #[test]
    fn handles_crlf_and_hours() {
        let cues = parse_srt("7\r\n01:02:03,004 --> 01:02:04,000\r\nLate line\r\n");
        assert_eq!(cues.len(), 1);
        assert_eq!(cues[0].start_ms, 3_723_004);
        assert_eq!(cues[0].duration_ms(), 996);
    }

    #[test]
    fn skips_blocks_without_timing() {
        let cues = parse_srt("garbage\nmore garbage\n\n1\n00:00:01,000 --> 00:00:02,000\nok\n");
        assert_eq!(cues.len(), 1);
        assert_eq!(cues[0].text, "ok");
    }

    #[test]
    fn oversized_hours_skip_the_block() {
        let text = "1\n99999999999999:00:00,000 --> 99999999999999:00:01,000\nx\n\n\
2\n00:00:01,000 --> 00:00:02,000\nkept\n";
        let cues = parse_srt(text);
        assert_eq!(cues.len(), 1);
        assert_eq!(cues[0].text, "kept");
    }

    #[test]
    fn reversed_timing_has_zero_duration() {
        let cue = Cue {
            start_ms: 900,
            end_ms: 100,
            text: String::new(),
        };
        assert_eq!(cue.duration_ms(), 0);
    }
}
