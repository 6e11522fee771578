#[cfg(test)]
#[path = "generation_test.rs"]
mod tests;

use anyhow::Result;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

pub const OUTPUT_FORMAT: &str = "png";
pub const ASPECT_RATIO: &str = "9:16";

pub struct GenerationRequest {
    pub prompt: String,
    pub output_format: String,
    pub aspect_ratio: String,
}

impl GenerationRequest {
    pub fn new(prompt: &str) -> GenerationRequest {
        return GenerationRequest {
            prompt: prompt.trim().to_string(),
            output_format: OUTPUT_FORMAT.to_string(),
            aspect_ratio: ASPECT_RATIO.to_string(),
        };
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedImage {
    base64: String,
}

impl GeneratedImage {
    pub fn new(base64: String) -> GeneratedImage {
        return GeneratedImage { base64 };
    }

    /// The display form used by image views that accept data URIs.
    pub fn as_data_uri(&self) -> String {
        return format!("data:image/png;base64,{}", self.base64);
    }

    pub fn decode(&self) -> Result<Vec<u8>> {
        return Ok(STANDARD.decode(&self.base64)?);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    EmptyInput,
    Authentication,
    PermissionOrQuota,
    InvalidRequest,
    UnsupportedLanguage,
    UnexpectedFormat,
    Transport,
    CorruptState,
}

impl ErrorKind {
    /// User-facing title shown alongside the failure message.
    pub fn title(&self) -> &'static str {
        match self {
            ErrorKind::EmptyInput => return "Input Required",
            ErrorKind::Authentication => return "Authentication Error",
            ErrorKind::PermissionOrQuota => return "Permission/Quota Error",
            ErrorKind::InvalidRequest => return "Invalid Request",
            ErrorKind::UnsupportedLanguage => return "Language Not Supported",
            ErrorKind::UnexpectedFormat => return "Unexpected Response",
            ErrorKind::Transport => return "Connection Error",
            ErrorKind::CorruptState => return "Corrupt History",
        }
    }
}

/// A failed generation outcome. The status code and raw response body are
/// carried from the point of capture so nothing downstream has to re-parse a
/// formatted message string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerationFailure {
    pub kind: ErrorKind,
    pub message: String,
    pub status: Option<u16>,
    pub body: Option<String>,
}

impl GenerationFailure {
    pub fn new(kind: ErrorKind, message: &str) -> GenerationFailure {
        return GenerationFailure {
            kind,
            message: message.to_string(),
            status: None,
            body: None,
        };
    }

    pub fn with_response(
        kind: ErrorKind,
        message: &str,
        status: u16,
        body: &str,
    ) -> GenerationFailure {
        return GenerationFailure {
            kind,
            message: message.to_string(),
            status: Some(status),
            body: Some(body.to_string()),
        };
    }
}

pub enum GenerationResult {
    Success(GeneratedImage),
    Failure(GenerationFailure),
}
