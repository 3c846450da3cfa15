use std::sync::OnceLock;

use regex::Regex;

/// Seconds a caption stays visible after its start time.
///
/// Windows do not look at the next caption's start, so neighbouring windows may overlap.
pub const SUBTITLE_DISPLAY_SECS: f64 = 5.0;

/// One timed caption line.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Subtitle {
    /// Start time in seconds (>= 0).
    #[serde(rename = "startTime")]
    pub start_time: f64,
    /// Caption text with the time token stripped.
    pub text: String,
}

impl Subtitle {
    /// Return `true` when `time_secs` is inside `[start, start + SUBTITLE_DISPLAY_SECS)`.
    pub fn is_visible_at(&self, time_secs: f64) -> bool {
        time_secs >= self.start_time && time_secs < self.start_time + SUBTITLE_DISPLAY_SECS
    }
}

/// Captions in the order they appeared in the source text.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Timeline {
    entries: Vec<Subtitle>,
}

impl Timeline {
    /// Parse a timestamp-tagged block. See [`parse_timeline`].
    pub fn parse(text: &str) -> Self {
        parse_timeline(text)
    }

    /// Caption visible at `time_secs`. See [`active_subtitle`].
    pub fn active_at(&self, time_secs: f64) -> Option<&Subtitle> {
        active_subtitle(self, time_secs)
    }

    /// Entries in source order.
    pub fn entries(&self) -> &[Subtitle] {
        &self.entries
    }

    /// Number of captions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Return `true` when nothing was captioned.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<Vec<Subtitle>> for Timeline {
    fn from(entries: Vec<Subtitle>) -> Self {
        Self { entries }
    }
}

fn time_token_re() -> &'static Regex {
    static TIME_TOKEN_RE: OnceLock<Regex> = OnceLock::new();
    TIME_TOKEN_RE.get_or_init(|| {
        Regex::new(r"\[?([0-9]{1,2}):([0-9]{2})(?::([0-9]{2}))?\]?")
            .expect("time token regex should compile")
    })
}

fn leading_separators_re() -> &'static Regex {
    static LEADING_RE: OnceLock<Regex> = OnceLock::new();
    LEADING_RE.get_or_init(|| {
        Regex::new(r"^[\s\-:\])]+").expect("separator regex should compile")
    })
}

fn line_breaks_re() -> &'static Regex {
    static LINE_BREAKS_RE: OnceLock<Regex> = OnceLock::new();
    LINE_BREAKS_RE
        .get_or_init(|| Regex::new(r"[\n\r]+").expect("line break regex should compile"))
}

/// Parse lines of the form `[MM:SS] text` or `[HH:MM:SS] text` (brackets optional).
///
/// With two groups the token reads as `MM:SS`; with three it reads as `HH:MM:SS`. The first
/// time token and the separators right after it are removed from the caption text. Lines
/// without a time token, or with nothing left after stripping it, are dropped silently.
pub fn parse_timeline(text: &str) -> Timeline {
    let re = time_token_re();
    let mut entries = Vec::new();

    for line in text.split('\n') {
        let Some(caps) = re.captures(line) else {
            continue;
        };
        let group = |i: usize| -> Option<u64> {
            caps.get(i).and_then(|m| m.as_str().parse::<u64>().ok())
        };
        let (Some(first), Some(second)) = (group(1), group(2)) else {
            continue;
        };
        let start_secs = match group(3) {
            Some(third) => (first * 60 + second) * 60 + third,
            None => first * 60 + second,
        };

        let without_token = re.replace(line, "");
        let cleaned = leading_separators_re().replace(&without_token, "");
        let cleaned = cleaned.trim();
        if cleaned.is_empty() {
            continue;
        }
        entries.push(Subtitle {
            start_time: start_secs as f64,
            text: cleaned.to_owned(),
        });
    }

    Timeline { entries }
}

/// First caption in timeline order whose visible window contains `time_secs`.
///
/// Overlapping windows resolve to the earliest entry in source order, not the most recent.
pub fn active_subtitle(timeline: &Timeline, time_secs: f64) -> Option<&Subtitle> {
    timeline
        .entries
        .iter()
        .find(|s| s.is_visible_at(time_secs))
}

/// Turn a translation block into plain text for speech synthesis.
///
/// Every time token is removed and runs of line breaks become `". "`.
pub fn strip_timestamps_for_speech(text: &str) -> String {
    let without_tokens = time_token_re().replace_all(text, "");
    line_breaks_re()
        .replace_all(&without_tokens, ". ")
        .into_owned()
}

#[cfg(test)]
#[path = "../../tests/unit/captions/timeline.rs"]
mod tests;
