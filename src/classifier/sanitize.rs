//! Repairs the loosely formatted JSON that text models tend to produce.
//!
//! The heuristics are not a JSON parser: a string value that itself contains
//! `, word:` can still be mangled by the bare-key pass. Everything produced
//! here goes through strict validation afterwards.

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use serde_json::Value;

use super::{schema::ClassifiedQuery, ClassifyError};

lazy_static! {
    static ref FENCE_RE: Regex = Regex::new(r"```[A-Za-z]*").unwrap();
    static ref SINGLE_QUOTED_RE: Regex = Regex::new(r#"([{\[,:]\s*)'([^'"\\]*)'"#).unwrap();
    static ref BARE_KEY_RE: Regex = Regex::new(r"([{,]\s*)([A-Za-z_][A-Za-z0-9_]*)\s*:").unwrap();
    static ref TRAILING_COMMA_RE: Regex = Regex::new(r",\s*([}\]])").unwrap();
    static ref QUOTED_AMOUNT_RE: Regex =
        Regex::new(r#""amount"\s*:\s*"\s*\$?\s*(-?[0-9][0-9,]*(?:\.[0-9]+)?)\s*""#).unwrap();
    static ref QUOTED_NULL_AMOUNT_RE: Regex =
        Regex::new(r#""amount"\s*:\s*"\s*(?i:null|none)?\s*""#).unwrap();
}

pub fn sanitize(raw: &str) -> String {
    let mut text = FENCE_RE.replace_all(raw, "").into_owned();
    text = text.replace(['\r', '\n', '\t'], " ");

    let trimmed = text.trim();
    text = match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if start < end => trimmed[start..=end].to_string(),
        _ => trimmed.to_string(),
    };

    text = text
        .replace(['\u{201C}', '\u{201D}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");
    text = SINGLE_QUOTED_RE
        .replace_all(&text, "${1}\"${2}\"")
        .into_owned();

    text = BARE_KEY_RE.replace_all(&text, "${1}\"${2}\":").into_owned();
    text = TRAILING_COMMA_RE.replace_all(&text, "${1}").into_owned();

    text = QUOTED_AMOUNT_RE
        .replace_all(&text, |caps: &Captures| {
            format!("\"amount\": {}", caps[1].replace(',', ""))
        })
        .into_owned();
    text = QUOTED_NULL_AMOUNT_RE
        .replace_all(&text, "\"amount\": null")
        .into_owned();

    text
}

/// Sanitize, parse and validate one model response.
pub fn parse_classification(raw: &str) -> Result<ClassifiedQuery, ClassifyError> {
    let cleaned = sanitize(raw);
    let value: Value = serde_json::from_str(&cleaned)
        .map_err(|e| ClassifyError::Format(format!("{e} in {cleaned:?}")))?;
    ClassifiedQuery::from_value(&value)
}
