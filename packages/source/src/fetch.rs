//! Single-shot JSON fetch and provider payload classification.
//!
//! Requests are sent exactly once. A failed request is reported to the
//! caller, which keeps whatever data it already has; the next scheduled
//! load is the only "retry".

use crate::SourceError;

/// Maximum length of the response body preview included in error logs.
const BODY_PREVIEW_LEN: usize = 500;

/// Sends a request once and parses the body as JSON.
///
/// The body is read as text first so a parse failure can log what the
/// provider actually sent.
///
/// # Errors
///
/// * [`SourceError::Http`] on transport failure.
/// * [`SourceError::DataUnavailable`] on a non-2xx status.
/// * [`SourceError::Json`] if the body is not JSON.
pub async fn send_json(request: reqwest::RequestBuilder) -> Result<serde_json::Value, SourceError> {
    let response = request.send().await?;

    let url = response.url().to_string();
    let status = response.status();
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    if !status.is_success() {
        log::warn!("Provider answered HTTP {status}\n  url: {url}");
        return Err(SourceError::DataUnavailable {
            reason: format!("HTTP {status}"),
        });
    }

    let text = response.text().await?;

    serde_json::from_str(&text).map_err(|json_err| {
        log::error!(
            "JSON parse failed.\n  \
             url: {url}\n  \
             status: {status}\n  \
             content-type: {content_type:?}\n  \
             received: {} bytes\n  \
             parse error: {json_err}\n  \
             body preview: {}",
            text.len(),
            preview(&text),
        );
        SourceError::Json(json_err)
    })
}

fn preview(text: &str) -> &str {
    if text.len() <= BODY_PREVIEW_LEN {
        return text;
    }
    let mut end = BODY_PREVIEW_LEN;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// Splits a provider payload into its record array.
///
/// The provider answers with either a JSON array of records or an object
/// carrying an `error` field.
///
/// # Errors
///
/// * [`SourceError::DataUnavailable`] for an error payload or any shape
///   other than an array.
/// * [`SourceError::NoData`] for an empty array.
pub fn records_from_payload(
    payload: serde_json::Value,
    context: &str,
) -> Result<Vec<serde_json::Value>, SourceError> {
    match payload {
        serde_json::Value::Array(records) if records.is_empty() => Err(SourceError::NoData {
            context: context.to_string(),
        }),
        serde_json::Value::Array(records) => Ok(records),
        serde_json::Value::Object(obj) if obj.contains_key("error") => {
            let reason = obj
                .get("message")
                .and_then(serde_json::Value::as_str)
                .or_else(|| obj.get("error").and_then(serde_json::Value::as_str))
                .map_or_else(
                    || format!("provider reported an error for {context}"),
                    String::from,
                );
            Err(SourceError::DataUnavailable { reason })
        }
        other => Err(SourceError::DataUnavailable {
            reason: format!(
                "unexpected payload for {context}: expected an array, found {}",
                json_kind(&other)
            ),
        }),
    }
}

const fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
