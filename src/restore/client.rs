/// Gemini restoration client
///
/// Sends one `generateContent` request per generation: the photo as inline
/// base64 data plus the built prompt, asking for an image response. The first
/// inline-image part of the first candidate is the result; everything else in
/// the response is ignored.

use std::time::Duration;

use base64::{engine::general_purpose, Engine as _};
use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::config::CONFIG;
use crate::restore::codec::{self, CodecError};
use crate::restore::prompt::build_prompt;
use crate::state::options::RestorationOptions;
use crate::state::session::SourceImage;

const MAX_RETRY_ATTEMPTS: usize = 2;
const RETRY_BASE_DELAY_MS: u64 = 900;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(90);

static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .build()
        .expect("Failed to build HTTP client")
});

/// What went wrong during a restoration call.
///
/// Transport problems and "the model answered but produced no image" are
/// separate variants so the log shows which one actually happened, even
/// though the UI renders both as one friendly message.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RestoreError {
    #[error("GEMINI_API_KEY is not set; add it to the environment or a .env file")]
    MissingApiKey,

    #[error("could not reach the restoration service: {0}")]
    Transport(String),

    #[error("the restoration service returned status {status}: {detail}")]
    Api { status: u16, detail: String },

    #[error("the model did not return an image: {0}")]
    NoImage(String),

    #[error("the photo could not be prepared for upload: {0}")]
    Source(#[from] CodecError),
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    parts: Option<Vec<GeminiPart>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GeminiPart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: GeminiInlineData,
    },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiInlineData {
    mime_type: String,
    data: String,
}

fn redact_api_key(text: &str) -> String {
    let key = CONFIG.gemini_api_key.trim();
    if key.is_empty() {
        return text.to_string();
    }
    text.replace(key, "[redacted]")
}

fn should_retry_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect()
}

fn should_retry_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS
        || status == StatusCode::REQUEST_TIMEOUT
        || status.is_server_error()
}

fn retry_delay(attempt: usize) -> Duration {
    let attempt = attempt.max(1) as u64;
    Duration::from_millis(RETRY_BASE_DELAY_MS.saturating_mul(attempt))
}

fn truncate_for_log(value: &str, limit: usize) -> String {
    if value.chars().count() <= limit {
        return value.to_string();
    }
    let truncated: String = value.chars().take(limit).collect();
    format!("{truncated}... (truncated)")
}

/// Pull a human-readable message out of a Gemini error body, falling back to
/// a truncated dump of the body itself
fn summarize_error_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "empty response body".to_string();
    }

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        if let Some(message) = value.pointer("/error/message").and_then(|v| v.as_str()) {
            return message.to_string();
        }
        return truncate_for_log(&value.to_string(), 2000);
    }

    truncate_for_log(trimmed, 2000)
}

/// Assemble the request body the way the service expects it: the photo first
/// as inline data, then the instruction text, asking for an image back
fn build_request_body(source: &SourceImage, prompt: &str) -> Result<Value, CodecError> {
    let (mime_type, payload) = codec::split_data_url(&source.data_url)?;

    Ok(json!({
        "contents": [{
            "role": "user",
            "parts": [
                {
                    "inlineData": {
                        "mimeType": mime_type,
                        "data": payload,
                    }
                },
                {
                    "text": prompt,
                },
            ],
        }],
        "generationConfig": {
            "responseModalities": ["IMAGE", "TEXT"],
        },
    }))
}

/// Return the first inline image of the first candidate, decoded.
///
/// A response with candidates but no image part usually means the model
/// declined and answered in text; that text is carried in the error so the
/// log tells the user why.
fn extract_image(response: GeminiResponse) -> Result<Vec<u8>, RestoreError> {
    let parts = response
        .candidates
        .unwrap_or_default()
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts)
        .unwrap_or_default();

    let mut text_reply = Vec::new();
    for part in parts {
        match part {
            GeminiPart::InlineData { inline_data } => {
                if inline_data.mime_type.starts_with("image/") {
                    return general_purpose::STANDARD
                        .decode(inline_data.data)
                        .map_err(|e| {
                            RestoreError::NoImage(format!("the image payload was invalid ({})", e))
                        });
                }
            }
            GeminiPart::Text { text } => {
                if !text.trim().is_empty() {
                    text_reply.push(text);
                }
            }
        }
    }

    if text_reply.is_empty() {
        Err(RestoreError::NoImage(
            "the response contained no image data, possibly due to a safety block".to_string(),
        ))
    } else {
        Err(RestoreError::NoImage(truncate_for_log(
            &text_reply.join(" "),
            200,
        )))
    }
}

/// Send one photo for restoration and return the restored PNG bytes.
///
/// Transient transport failures and retryable statuses (408/429/5xx) get a
/// second attempt with a short backoff; everything else fails immediately.
pub async fn restore_photo(
    source: &SourceImage,
    options: &RestorationOptions,
) -> Result<Vec<u8>, RestoreError> {
    if CONFIG.gemini_api_key.trim().is_empty() {
        return Err(RestoreError::MissingApiKey);
    }

    let prompt = build_prompt(options);
    let payload = build_request_body(source, &prompt)?;
    let model = &CONFIG.gemini_image_model;
    let url = format!(
        "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
        model, CONFIG.gemini_api_key
    );

    debug!(
        model = %model,
        mime_type = %source.mime_type,
        image_bytes = source.bytes.len(),
        prompt_chars = prompt.len(),
        "sending restoration request"
    );

    let mut attempt = 0usize;
    loop {
        attempt += 1;
        let response = match HTTP_CLIENT
            .post(&url)
            .timeout(REQUEST_TIMEOUT)
            .json(&payload)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                let err_text = redact_api_key(&err.to_string());
                let should_retry = should_retry_error(&err) && attempt < MAX_RETRY_ATTEMPTS;
                warn!(
                    "restoration request failed to send: {} (timeout={}, connect={}, retrying={})",
                    err_text,
                    err.is_timeout(),
                    err.is_connect(),
                    should_retry
                );
                if should_retry {
                    tokio::time::sleep(retry_delay(attempt)).await;
                    continue;
                }
                return Err(RestoreError::Transport(err_text));
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail = redact_api_key(&summarize_error_body(&body));
            let should_retry = should_retry_status(status) && attempt < MAX_RETRY_ATTEMPTS;
            warn!(
                "restoration service error: status={}, detail={}, retrying={}",
                status, detail, should_retry
            );
            if should_retry {
                tokio::time::sleep(retry_delay(attempt)).await;
                continue;
            }
            return Err(RestoreError::Api {
                status: status.as_u16(),
                detail,
            });
        }

        let parsed = response
            .json::<GeminiResponse>()
            .await
            .map_err(|e| RestoreError::Transport(redact_api_key(&e.to_string())))?;

        return extract_image(parsed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::options::{Gender, MainRequest};
    use std::path::PathBuf;

    fn sample_source() -> SourceImage {
        let bytes = vec![0x89, 0x50, 0x4e, 0x47];
        SourceImage {
            path: PathBuf::from("/photos/old.png"),
            mime_type: "image/png".to_string(),
            data_url: codec::to_data_url("image/png", &bytes),
            bytes,
        }
    }

    fn response_from(value: Value) -> GeminiResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_request_body_shape() {
        let source = sample_source();
        let options = RestorationOptions {
            main_request: MainRequest::Portrait,
            gender: Gender::Female,
            ..RestorationOptions::default()
        };
        let prompt = build_prompt(&options);
        let body = build_request_body(&source, &prompt).unwrap();

        assert_eq!(
            body.pointer("/contents/0/parts/0/inlineData/mimeType")
                .and_then(Value::as_str),
            Some("image/png")
        );
        // the inline payload is the original bytes, base64 encoded
        assert_eq!(
            body.pointer("/contents/0/parts/0/inlineData/data")
                .and_then(Value::as_str),
            Some(general_purpose::STANDARD.encode(&source.bytes).as_str())
        );
        let text = body
            .pointer("/contents/0/parts/1/text")
            .and_then(Value::as_str)
            .unwrap();
        assert!(text.contains("close-up portrait"));
        assert_eq!(
            body.pointer("/generationConfig/responseModalities/0")
                .and_then(Value::as_str),
            Some("IMAGE")
        );
    }

    #[test]
    fn test_extract_first_image_part() {
        let encoded = general_purpose::STANDARD.encode(b"png bytes");
        let response = response_from(json!({
            "candidates": [{
                "content": {
                    "parts": [
                        { "text": "Here is your photo" },
                        { "inlineData": { "mimeType": "image/png", "data": encoded } },
                        { "inlineData": { "mimeType": "image/png", "data": "aWdub3JlZA==" } },
                    ]
                }
            }]
        }));

        assert_eq!(extract_image(response).unwrap(), b"png bytes");
    }

    #[test]
    fn test_text_only_response_is_an_error_not_a_crash() {
        let response = response_from(json!({
            "candidates": [{
                "content": {
                    "parts": [{ "text": "I cannot restore this photo." }]
                }
            }]
        }));

        match extract_image(response) {
            Err(RestoreError::NoImage(reason)) => {
                assert!(reason.contains("I cannot restore this photo."));
            }
            other => panic!("expected NoImage, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_response_is_an_error() {
        let response = response_from(json!({}));
        assert!(matches!(
            extract_image(response),
            Err(RestoreError::NoImage(_))
        ));
    }

    #[test]
    fn test_non_image_inline_data_is_skipped() {
        let response = response_from(json!({
            "candidates": [{
                "content": {
                    "parts": [
                        { "inlineData": { "mimeType": "application/octet-stream", "data": "AAAA" } },
                    ]
                }
            }]
        }));

        assert!(matches!(
            extract_image(response),
            Err(RestoreError::NoImage(_))
        ));
    }

    #[test]
    fn test_retry_predicates() {
        assert!(should_retry_status(StatusCode::TOO_MANY_REQUESTS));
        assert!(should_retry_status(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(should_retry_status(StatusCode::REQUEST_TIMEOUT));
        assert!(!should_retry_status(StatusCode::BAD_REQUEST));
        assert!(!should_retry_status(StatusCode::UNAUTHORIZED));
    }

    #[test]
    fn test_error_body_summary_prefers_the_api_message() {
        let detail = summarize_error_body(
            r#"{"error": {"code": 400, "message": "Invalid image payload"}}"#,
        );
        assert_eq!(detail, "Invalid image payload");

        assert_eq!(summarize_error_body("   "), "empty response body");
        assert_eq!(summarize_error_body("plain text"), "plain text");
    }
}
