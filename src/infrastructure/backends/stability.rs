#[cfg(test)]
#[path = "stability_test.rs"]
mod tests;

use std::time::Duration;

use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::BackendName;
use crate::domain::models::ErrorKind;
use crate::domain::models::GeneratedImage;
use crate::domain::models::GenerationBackend;
use crate::domain::models::GenerationFailure;
use crate::domain::models::GenerationRequest;
use crate::domain::models::GenerationResult;

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Artifact {
    base64: String,
}

// Successful responses carry the image either as a direct `image` field or
// as an `artifacts` array. Only the first artifact is used.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    artifacts: Option<Vec<Artifact>>,
}

// Error bodies are not guaranteed to be valid JSON, and when they are, only
// these fields matter.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    errors: Option<Vec<String>>,
}

fn classify_failure(status: u16, body: &str, token_length: usize) -> GenerationFailure {
    let parsed = serde_json::from_str::<ErrorResponse>(body).unwrap_or_default();

    if parsed.name.as_deref() == Some("invalid_language") {
        return GenerationFailure::with_response(
            ErrorKind::UnsupportedLanguage,
            "The API only accepts prompts in English.",
            status,
            body,
        );
    }

    match status {
        401 => {
            return GenerationFailure::with_response(
                ErrorKind::Authentication,
                &format!("Invalid API key (401). Check your token ({token_length} chars)."),
                status,
                body,
            );
        }
        403 => {
            return GenerationFailure::with_response(
                ErrorKind::PermissionOrQuota,
                "Permission denied or quota exceeded (403).",
                status,
                body,
            );
        }
        400 | 422 => {
            let details = match parsed.errors {
                Some(errors) if !errors.is_empty() => errors.join(", "),
                _ => "No details".to_string(),
            };

            return GenerationFailure::with_response(
                ErrorKind::InvalidRequest,
                &format!("Invalid parameters ({status}). Check prompt. ({details})"),
                status,
                body,
            );
        }
        _ => {
            return GenerationFailure::with_response(
                ErrorKind::Transport,
                &format!("Image generation failed with status {status}."),
                status,
                body,
            );
        }
    }
}

pub struct Stability {
    url: String,
    token: String,
    timeout: String,
}

impl Default for Stability {
    fn default() -> Stability {
        return Stability {
            url: Config::get(ConfigKey::StabilityURL),
            token: Config::get(ConfigKey::StabilityToken),
            timeout: Config::get(ConfigKey::RequestTimeout),
        };
    }
}

#[async_trait]
impl GenerationBackend for Stability {
    fn name(&self) -> BackendName {
        return BackendName::Stability;
    }

    #[allow(clippy::implicit_return)]
    async fn health_check(&self) -> Result<()> {
        if self.url.is_empty() {
            bail!("Stability URL is not defined");
        }
        if self.token.is_empty() {
            bail!("Stability API key is not defined. Set it with --stability-token or EASEL_STABILITY_TOKEN");
        }

        return Ok(());
    }

    #[allow(clippy::implicit_return)]
    async fn generate(&self, request: GenerationRequest) -> GenerationResult {
        let form = reqwest::multipart::Form::new()
            .text("prompt", request.prompt.clone())
            .text("output_format", request.output_format.clone())
            .text("aspect_ratio", request.aspect_ratio.clone());

        let mut builder = reqwest::Client::new()
            .post(format!(
                "{url}/v2beta/stable-image/generate/ultra",
                url = self.url
            ))
            .header("Accept", "application/json")
            .bearer_auth(&self.token)
            .multipart(form);

        if let Ok(timeout) = self.timeout.parse::<u64>() {
            builder = builder.timeout(Duration::from_millis(timeout));
        }

        let res = match builder.send().await {
            Ok(res) => res,
            Err(err) => {
                tracing::error!(error = ?err, "Stability is not reachable");
                return GenerationResult::Failure(GenerationFailure::new(
                    ErrorKind::Transport,
                    &format!("Image generation failed: {err}"),
                ));
            }
        };

        let status = res.status().as_u16();
        if !res.status().is_success() {
            // The body is captured as text before any JSON parsing. Error
            // bodies do not follow the success schema.
            let body = res
                .text()
                .await
                .unwrap_or_else(|_| return "Error body unreadable".to_string());

            tracing::error!(status = status, body = body, "generation request failed");
            return GenerationResult::Failure(classify_failure(status, &body, self.token.len()));
        }

        let body = match res.text().await {
            Ok(body) => body,
            Err(err) => {
                tracing::error!(error = ?err, "failed to read response body");
                return GenerationResult::Failure(GenerationFailure::new(
                    ErrorKind::Transport,
                    &format!("Image generation failed: {err}"),
                ));
            }
        };

        let parsed = match serde_json::from_str::<GenerateResponse>(&body) {
            Ok(parsed) => parsed,
            Err(_) => {
                return GenerationResult::Failure(GenerationFailure::with_response(
                    ErrorKind::UnexpectedFormat,
                    "Unexpected response format.",
                    status,
                    &body,
                ));
            }
        };

        let image = parsed.image.or_else(|| {
            return parsed
                .artifacts
                .and_then(|artifacts| return artifacts.into_iter().next())
                .map(|artifact| return artifact.base64);
        });

        match image {
            Some(base64) if !base64.is_empty() => {
                return GenerationResult::Success(GeneratedImage::new(base64));
            }
            _ => {
                return GenerationResult::Failure(GenerationFailure::with_response(
                    ErrorKind::UnexpectedFormat,
                    "Unexpected response format.",
                    status,
                    &body,
                ));
            }
        }
    }
}
