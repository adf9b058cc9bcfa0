//! Cleaning and extraction for model output that is supposed to be JSON.
//!
//! Local models wrap their JSON in markdown fences, prose, smart quotes and
//! trailing commas. Extraction tries the cheapest strategy first and only
//! falls back to a balanced-delimiter scan when the text is noisy.

use crate::error::RevosError;

/// Normalize raw model output before extraction: strip code fences, replace
/// smart quotes, drop trailing commas.
pub fn sanitize_raw_output(raw: &str) -> String {
    let mut s = raw.replace("```json", "").replace("```", "");
    s = s
        .replace('\u{201C}', "\"")
        .replace('\u{201D}', "\"")
        .replace('\u{2018}', "'")
        .replace('\u{2019}', "'");
    remove_trailing_commas(s.trim())
}

/// Remove trailing commas before `}` or `]`, invalid JSON but common in
/// model output. String contents are left untouched.
pub fn remove_trailing_commas(json: &str) -> String {
    let chars: Vec<char> = json.chars().collect();
    let mut result = String::with_capacity(json.len());
    let mut in_string = false;
    let mut escape_next = false;
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        if escape_next {
            escape_next = false;
            result.push(ch);
            i += 1;
            continue;
        }
        match ch {
            '\\' if in_string => {
                escape_next = true;
                result.push(ch);
            }
            '"' => {
                in_string = !in_string;
                result.push(ch);
            }
            ',' if !in_string => {
                let mut j = i + 1;
                while j < chars.len() && chars[j].is_whitespace() {
                    j += 1;
                }
                if j < chars.len() && matches!(chars[j], '}' | ']') {
                    i += 1;
                    continue;
                }
                result.push(ch);
            }
            _ => result.push(ch),
        }
        i += 1;
    }
    result
}

/// Scan for the first balanced `{...}` or `[...]` starting at `open`.
fn balanced_slice(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let mut depth = 0i32;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, ch) in text[start..].char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }
        match ch {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            c if c == open && !in_string => depth += 1,
            c if c == close && !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + i + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Extract the JSON payload from noisy model output.
///
/// Strategies, in order:
/// 1. the trimmed text already parses;
/// 2. after sanitizing (fences, smart quotes, trailing commas) it parses;
/// 3. the first balanced object or array inside the sanitized text parses.
pub fn extract_json(text: &str) -> Result<String, RevosError> {
    let trimmed = text.trim();
    if serde_json::from_str::<serde_json::Value>(trimmed).is_ok() {
        return Ok(trimmed.to_string());
    }

    let sanitized = sanitize_raw_output(trimmed);
    if serde_json::from_str::<serde_json::Value>(&sanitized).is_ok() {
        return Ok(sanitized);
    }

    // Whichever delimiter appears first wins, so an array of objects is not
    // mistaken for its first element.
    let mut pairs = [('{', '}'), ('[', ']')];
    if sanitized.find('[').unwrap_or(usize::MAX) < sanitized.find('{').unwrap_or(usize::MAX) {
        pairs.swap(0, 1);
    }
    for (open, close) in pairs {
        if let Some(candidate) = balanced_slice(&sanitized, open, close) {
            if serde_json::from_str::<serde_json::Value>(candidate).is_ok() {
                tracing::debug!(strategy = "balanced_scan", "Extracted embedded JSON");
                return Ok(candidate.to_string());
            }
        }
    }

    let preview: String = trimmed.chars().take(120).collect();
    Err(RevosError::generation(
        "extractor",
        format!("No parseable JSON in model output (starts: {:?})", preview),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_json_passes_through() {
        let out = extract_json(r#"{"a": 1}"#).unwrap();
        assert_eq!(out, r#"{"a": 1}"#);
    }

    #[test]
    fn fenced_json_is_unwrapped() {
        let raw = "```json\n{\"questions\": []}\n```";
        let out = extract_json(raw).unwrap();
        assert_eq!(out, r#"{"questions": []}"#);
    }

    #[test]
    fn prose_around_json_is_discarded() {
        let raw = "Sure! Here is your quiz:\n{\"questions\": [{\"id\": \"q1\"}]}\nHope that helps.";
        let out = extract_json(raw).unwrap();
        assert!(serde_json::from_str::<serde_json::Value>(&out).is_ok());
        assert!(out.starts_with('{') && out.ends_with('}'));
    }

    #[test]
    fn trailing_commas_are_removed() {
        let raw = r#"{"items": [1, 2, 3,],}"#;
        let out = extract_json(raw).unwrap();
        assert_eq!(out, r#"{"items": [1, 2, 3]}"#);
    }

    #[test]
    fn smart_quotes_are_normalized() {
        let raw = "{\u{201C}key\u{201D}: \u{201C}value\u{201D}}";
        let out = extract_json(raw).unwrap();
        assert_eq!(out, r#"{"key": "value"}"#);
    }

    #[test]
    fn braces_inside_strings_do_not_confuse_the_scan() {
        let raw = r#"noise {"text": "set {a, b}", "n": 1} more noise"#;
        let out = extract_json(raw).unwrap();
        assert_eq!(out, r#"{"text": "set {a, b}", "n": 1}"#);
    }

    #[test]
    fn top_level_arrays_are_extracted() {
        let raw = "The cards:\n[{\"front\": \"F?\", \"back\": \"ma\"}]";
        let out = extract_json(raw).unwrap();
        assert!(out.starts_with('['));
    }

    #[test]
    fn hopeless_output_is_an_error() {
        assert!(extract_json("I could not generate a quiz, sorry.").is_err());
        assert!(extract_json("{\"unterminated\": ").is_err());
    }
}
