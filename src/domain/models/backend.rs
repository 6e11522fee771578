use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;
use strum::EnumVariantNames;

use super::GenerationRequest;
use super::GenerationResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumVariantNames, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum BackendName {
    Stability,
}

impl BackendName {
    pub fn parse(text: String) -> Result<BackendName> {
        if text == "stability" {
            return Ok(BackendName::Stability);
        }

        bail!(format!("{text} is not a valid backend"))
    }
}

#[async_trait]
pub trait GenerationBackend {
    fn name(&self) -> BackendName;

    /// Used before submitting to verify all configurations are available to
    /// work with the backend.
    async fn health_check(&self) -> Result<()>;

    /// Submits one generation request and interprets the response. Every
    /// outcome is reported as a value, including transport failures. This
    /// never propagates an error to the caller.
    async fn generate(&self, request: GenerationRequest) -> GenerationResult;
}

pub type GenerationBackendBox = Box<dyn GenerationBackend + Send + Sync>;
