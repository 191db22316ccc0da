//! User-facing strings shown by the shells. Raw server text may be appended
//! for diagnosability, but no stack traces.

pub const ERR_NAS_URL_NOT_SET: &str = "The NAS address is not configured.";
pub const ERR_NO_URL: &str = "Could not determine a URL to download.";
pub const ERR_INVALID_URL: &str = "The URL is not valid.";
pub const ERR_DOWNLOAD_FAILED: &str = "The download request failed: ";
pub const MSG_DOWNLOAD_STARTED: &str = "The download has started on the NAS.";
pub const MSG_CONNECTED: &str = "Connected to the NAS.";
pub const MSG_SETUP_REQUIRED: &str = "Please complete the NAS settings first.";
