use gw_core::error::{ApiError, ValidationDetail};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

/// Decodes a response body, mapping every failure onto [`ApiError`].
pub(crate) async fn decode_response<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ApiError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|err| ApiError::transport(format!("failed to read response body: {err}")))?;

    // An HTML page means the request never reached the API.
    if body.trim_start().starts_with("<!") {
        return Err(ApiError::transport(
            "received an HTML page instead of JSON; check the API base URL",
        ));
    }

    if !status.is_success() {
        return Err(error_from_status(status.as_u16(), &body));
    }

    serde_json::from_str(&body)
        .map_err(|err| ApiError::transport(format!("invalid JSON response: {err}")))
}

/// Maps a non-success status and its body onto an [`ApiError`].
pub fn error_from_status(status: u16, body: &str) -> ApiError {
    let detail = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| value.get("detail").cloned());
    let detail_text = detail
        .as_ref()
        .and_then(Value::as_str)
        .map(str::to_string);

    match status {
        401 => ApiError::auth(detail_text.unwrap_or_else(|| "session expired".to_string())),
        402 => ApiError::payment_required(
            detail_text.unwrap_or_else(|| "payment required".to_string()),
        ),
        422 => validation_error(detail, detail_text),
        _ => ApiError::http(
            status,
            detail_text.unwrap_or_else(|| format!("request failed with status {status}")),
        ),
    }
}

fn validation_error(detail: Option<Value>, detail_text: Option<String>) -> ApiError {
    if let Some(text) = detail_text {
        return ApiError::validation(text, Vec::new());
    }
    let entries: Vec<ValidationDetail> = detail
        .and_then(|value| serde_json::from_value(value).ok())
        .unwrap_or_default();
    let Some(first) = entries.first() else {
        return ApiError::validation("validation failed", Vec::new());
    };
    let message = first.msg.clone();
    for extra in entries.iter().skip(1) {
        warn!(loc = ?extra.loc, msg = %extra.msg, "additional validation error");
    }
    ApiError::validation(message, entries)
}
