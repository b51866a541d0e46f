//! Filename-derived fields.
//!
//! Content files follow a `some-track-name-042.mp3` convention: hyphenated
//! words plus a numeric library suffix. Both helpers degrade gracefully for
//! names that do not match it.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

static TRAILING_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-\d+$").expect("static pattern"));

/// Track id: the file name with its extension removed.
pub fn track_id(filename: &str) -> String {
    stem(filename).to_string()
}

/// Human-readable title: extension and trailing `-<digits>` suffix removed,
/// separators replaced with spaces, each word capitalized.
pub fn track_title(filename: &str) -> String {
    let stem = stem(filename);
    let stripped = TRAILING_NUMBER.replace(stem, "");
    let spaced = stripped.replace(['-', '_'], " ");
    capitalize_words(&spaced)
}

fn stem(filename: &str) -> &str {
    Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename)
}

fn capitalize_words(s: &str) -> String {
    s.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_id_strips_only_the_extension() {
        assert_eq!(track_id("epic-dubstep-drop-042.mp3"), "epic-dubstep-drop-042");
        assert_eq!(track_id("intro.mp3"), "intro");
        assert_eq!(track_id("no-extension"), "no-extension");
    }

    #[test]
    fn track_title_strips_numeric_suffix_and_capitalizes() {
        assert_eq!(track_title("epic-dubstep-drop-042.mp3"), "Epic Dubstep Drop");
    }

    #[test]
    fn track_title_without_numeric_suffix() {
        assert_eq!(track_title("intro.mp3"), "Intro");
        assert_eq!(track_title("deep-house-groove.mp3"), "Deep House Groove");
    }

    #[test]
    fn track_title_handles_underscores_and_mixed_case() {
        assert_eq!(track_title("NIGHT_drive_99.mp3"), "Night Drive 99");
        assert_eq!(track_title("LOUD-DROP-7.mp3"), "Loud Drop");
    }

    #[test]
    fn track_title_keeps_inner_numbers() {
        // Only a trailing suffix is a library number; inner digits are part
        // of the name.
        assert_eq!(track_title("route-66-cruise.mp3"), "Route 66 Cruise");
    }
}
