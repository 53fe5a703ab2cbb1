//! External generation collaborators.
//!
//! The studio treats these as opaque async functions `(input) -> Result<Artifact>`.
//! `GeminiClient` is the production implementation; tests plug in fakes.

use std::sync::Arc;

use crate::artifact::{Artifact, ReferenceImage};
use crate::credentials::ApiKey;
use crate::error::StudioResult;

/// One image generation call, prompt already templated.
#[derive(Debug, Clone)]
pub struct ImageRequest {
    pub reference: Arc<ReferenceImage>,
    pub prompt_text: String,
}

/// One video generation call, prompt already templated.
#[derive(Debug, Clone)]
pub struct VideoRequest {
    pub reference: Arc<ReferenceImage>,
    pub prompt_text: String,
}

#[async_trait::async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate_image(&self, key: &ApiKey, request: &ImageRequest) -> StudioResult<Artifact>;
}

/// Video generation is a long-running job: start, poll until done, fetch.
/// Implementations own the polling; callers see a single future per clip.
#[async_trait::async_trait]
pub trait VideoGenerator: Send + Sync {
    async fn generate_video(&self, key: &ApiKey, request: &VideoRequest) -> StudioResult<Artifact>;
}

#[async_trait::async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate_text(&self, key: &ApiKey, prompt: &str) -> StudioResult<String>;
}

#[async_trait::async_trait]
pub trait ImageEditor: Send + Sync {
    /// Apply an already templated edit prompt to `source`.
    async fn edit_image(
        &self,
        key: &ApiKey,
        source: &ReferenceImage,
        prompt_text: &str,
    ) -> StudioResult<Artifact>;
}
