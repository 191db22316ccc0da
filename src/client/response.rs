//! Interpretation of the download station's loosely-structured responses.
//!
//! The server's API is undocumented and differs across firmware versions,
//! so both the login page and the submission endpoint are matched against a
//! prioritized rule list instead of a single schema. Everything here is a
//! pure function of the response, testable without a network.

use crate::error::NasError;
use serde_json::Value;

const LOGIN_FAILURE_INDICATORS: [&str; 1] = ["id or password is not correct"];
const LOGIN_SUCCESS_INDICATORS: [&str; 3] = ["Welcome", "youtube-dl", "/youtube-dl"];

const DOWNLOAD_SUCCESS_HINTS: [&str; 4] = [
    "success",
    "Success",
    "received your download",
    "download has started",
];
const DOWNLOAD_FAILURE_HINTS: [&str; 4] = ["error", "Error", "fail", "wrong"];
const DOWNLOAD_STARTED_PHRASES: [&str; 2] = ["received your download", "download has started"];

/// Login verdict from status and body text.
///
/// The trailing status-200 arm is a lenient fallback: an unrelated page
/// with no failure marker passes. Real firmware quirks motivated it, so it
/// is kept as documented behavior rather than tightened.
pub fn interpret_login_response(status: u16, body: &str, user_id: &str) -> bool {
    if status == 302 {
        return true;
    }
    if LOGIN_FAILURE_INDICATORS
        .iter()
        .any(|indicator| body.contains(indicator))
    {
        return false;
    }
    let has_success_indicator = LOGIN_SUCCESS_INDICATORS
        .iter()
        .any(|indicator| body.contains(indicator));
    let has_welcome_message = body.contains("Welcome") && body.contains(user_id);

    has_success_indicator || has_welcome_message || status == 200
}

/// Submission verdict, applied to the raw body text in priority order:
/// HTTP status, then structured JSON, then substring sniffing.
pub fn interpret_download_response(
    status: u16,
    status_text: &str,
    body: &str,
) -> Result<(), NasError> {
    if !(200..300).contains(&status) {
        return Err(NasError::HttpError {
            status,
            status_text: status_text.to_string(),
        });
    }

    let parsed: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(_) => return sniff_raw_text(body),
    };

    match parsed.get("success").and_then(Value::as_bool) {
        Some(true) => Ok(()),
        Some(false) => {
            let message = ["msg", "error", "message"]
                .iter()
                .find_map(|field| parsed.get(field).and_then(Value::as_str))
                .unwrap_or("unknown error");
            Err(NasError::DownloadRejected(message.to_string()))
        }
        None => {
            if let Some(msg) = parsed.get("msg").and_then(Value::as_str) {
                if DOWNLOAD_STARTED_PHRASES
                    .iter()
                    .any(|phrase| msg.contains(phrase))
                {
                    return Ok(());
                }
            }
            if parsed.get("status").and_then(Value::as_str) == Some("success")
                || parsed.get("message").and_then(Value::as_str) == Some("success")
            {
                return Ok(());
            }
            Err(NasError::UnrecognizedResponse(parsed.to_string()))
        }
    }
}

fn sniff_raw_text(body: &str) -> Result<(), NasError> {
    if DOWNLOAD_SUCCESS_HINTS.iter().any(|hint| body.contains(hint)) {
        return Ok(());
    }
    if DOWNLOAD_FAILURE_HINTS.iter().any(|hint| body.contains(hint)) {
        return Err(NasError::DownloadRejected(body.to_string()));
    }
    Err(NasError::UnparseableResponse(body.to_string()))
}

/// Any response in this range means a server is answering at the address,
/// even a 404 from a probe path that does not exist on this firmware.
pub fn indicates_reachable(status: u16) -> bool {
    (200..500).contains(&status)
}
