pub mod stability;

use anyhow::bail;
use anyhow::Result;

use crate::domain::models::BackendName;
use crate::domain::models::GenerationBackendBox;

pub struct BackendManager {}

impl BackendManager {
    pub fn get(name: BackendName) -> Result<GenerationBackendBox> {
        if name == BackendName::Stability {
            return Ok(Box::<stability::Stability>::default());
        }

        bail!(format!("No backend implemented for {name}"))
    }
}
