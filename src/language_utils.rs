use anyhow::{Result, anyhow};
use isolang::Language;

/// Language utilities for recognizer hints
///
/// This module normalizes caller-supplied language tags into the two-letter
/// ISO 639-1 form the recognizer accepts, and turns detected tags back into
/// readable names for log output.

/// Map an ISO 639-2/B code to its 639-2/T twin where the two differ
fn part2b_to_part2t(code: &str) -> &str {
    match code {
        "fre" => "fra",
        "ger" => "deu",
        "dut" => "nld",
        "gre" => "ell",
        "chi" => "zho",
        "cze" => "ces",
        "ice" => "isl",
        "alb" => "sqi",
        "arm" => "hye",
        "baq" => "eus",
        "bur" => "mya",
        "per" => "fas",
        "geo" => "kat",
        "may" => "msa",
        "mac" => "mkd",
        "rum" => "ron",
        "slo" => "slk",
        "wel" => "cym",
        _ => code,
    }
}

/// Normalize a language tag into a recognizer hint.
///
/// Returns `None` when the caller asked for auto-detection (empty or `auto`).
/// Accepts ISO 639-1, ISO 639-2 (both B and T forms) and full English
/// language names; anything else is an error.
pub fn recognizer_hint(tag: &str) -> Result<Option<String>> {
    let normalized = tag.trim().to_lowercase();

    if normalized.is_empty() || normalized == "auto" {
        return Ok(None);
    }

    if normalized.len() == 2 {
        if Language::from_639_1(&normalized).is_some() {
            return Ok(Some(normalized));
        }
    } else if normalized.len() == 3 {
        let part2t = part2b_to_part2t(&normalized);
        if let Some(lang) = Language::from_639_3(part2t) {
            if let Some(code_639_1) = lang.to_639_1() {
                return Ok(Some(code_639_1.to_string()));
            }
            return Err(anyhow!("Language {} has no two-letter form the recognizer accepts", tag));
        }
    } else if let Some(lang) = Language::from_name(&capitalize_name(&normalized)) {
        if let Some(code_639_1) = lang.to_639_1() {
            return Ok(Some(code_639_1.to_string()));
        }
        return Err(anyhow!("Language {} has no two-letter form the recognizer accepts", tag));
    }

    Err(anyhow!("Invalid language tag: {}", tag))
}

/// Get a readable language name for log lines, falling back to the tag itself
pub fn language_display_name(tag: &str) -> String {
    let normalized = tag.trim().to_lowercase();

    let language = if normalized.len() == 2 {
        Language::from_639_1(&normalized)
    } else if normalized.len() == 3 {
        Language::from_639_3(part2b_to_part2t(&normalized))
    } else {
        None
    };

    match language {
        Some(lang) => lang.to_name().to_string(),
        None => tag.to_string(),
    }
}

/// Uppercase the first letter so lowercase CLI input matches English names
fn capitalize_name(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
