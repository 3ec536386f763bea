//! The coerce module turns free-text model answers into typed values and
//! owns the fallback policy for steps that may serve a default instead of
//! failing.

use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::constants::THINK_STRIPPER;
use crate::error::{WizardError, WizardResult};

static THINK_STRIPPER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(THINK_STRIPPER).expect("Failed to compile THINK_STRIPPER regex"));

static JSON_OBJECT_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{[\s\S]*\}").expect("Failed to compile JSON object regex"));

static NUMBERED_LINE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\.\s*").expect("Failed to compile numbered line regex"));

/// Removes reasoning blocks some models prepend to their answer.
pub fn strip_think(text: &str) -> String {
    THINK_STRIPPER_REGEX.replace_all(text, "").trim().to_owned()
}

/// Extracts the outermost `{...}` substring of a model answer and decodes it.
///
/// Markdown fences and chatter around the object are ignored.
///
/// # Errors
///
/// Returns [`WizardError::Shape`] when the answer has no `{...}` substring or
/// when the substring does not decode into `T`.
pub fn extract_json_object<T: DeserializeOwned>(text: &str) -> WizardResult<T> {
    let text = strip_think(text);
    let object = JSON_OBJECT_REGEX
        .find(&text)
        .ok_or_else(|| WizardError::shape("no JSON object found in model response"))?;

    serde_json::from_str(object.as_str())
        .map_err(|e| WizardError::shape(format!("malformed JSON object in model response: {e}")))
}

/// Collects the items of a numbered list (`1. ...`, `2. ...`) from a model
/// answer, with the numbering stripped.
///
/// # Errors
///
/// Returns [`WizardError::Shape`] when no non-empty numbered line is found.
pub fn parse_numbered_lines(text: &str) -> WizardResult<Vec<String>> {
    let lines: Vec<String> = strip_think(text)
        .lines()
        .map(str::trim)
        .filter(|line| NUMBERED_LINE_REGEX.is_match(line))
        .map(|line| NUMBERED_LINE_REGEX.replace(line, "").trim().to_owned())
        .filter(|line| !line.is_empty())
        .collect();

    if lines.is_empty() {
        return Err(WizardError::shape("no numbered lines found in model response"));
    }

    Ok(lines)
}

/// A value together with a flag telling whether it is a deterministic
/// substitute rather than a live answer.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Fallback<T> {
    pub value: T,
    pub fallback: bool,
}

impl<T> Fallback<T> {
    pub fn live(value: T) -> Self {
        Self {
            value,
            fallback: false,
        }
    }

    pub fn substitute(value: T) -> Self {
        Self {
            value,
            fallback: true,
        }
    }
}

/// Serves `default` when `result` failed, logging the substituted error.
///
/// Only for steps where an unblocked flow matters more than the real answer;
/// everywhere else errors propagate.
pub fn with_fallback<T>(
    step: &str,
    result: WizardResult<T>,
    default: impl FnOnce() -> T,
) -> Fallback<T> {
    match result {
        Ok(value) => Fallback::live(value),
        Err(error) => {
            warn!("{step}: serving fallback value after {error}");
            Fallback::substitute(default())
        }
    }
}
