//! Content studio service: carousel, video and single-post generation plus
//! single-image edits, all routed through one reconciliation routine.
//!
//! Every entry point validates its inputs and the session credential before
//! dispatching anything. The only state shared across calls is the
//! [`CredentialHolder`] and the [`BatchSupervisor`].

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::artifact::{Artifact, ReferenceImage};
use crate::collaborator::{
    ImageEditor, ImageGenerator, ImageRequest, TextGenerator, VideoGenerator, VideoRequest,
};
use crate::config::StudioConfig;
use crate::credentials::{ApiKey, CredentialHolder};
use crate::error::{StudioError, StudioResult};
use crate::gemini::GeminiClient;
use crate::orchestrator::{is_blank, reconcile_with_report, BatchReport};
use crate::prompt_entry::PromptEntry;
use crate::prompts::{
    carousel_image_prompt, edit_image_prompt, post_image_prompts, post_text_prompt, video_prompt,
    SceneDirectives,
};
use crate::supervisor::{BatchSupervisor, BatchTicket, Lane};

#[derive(Debug, Clone)]
pub struct CarouselRequest {
    pub reference: Option<ReferenceImage>,
    pub prompts: PromptEntry,
    pub directives: SceneDirectives,
}

#[derive(Debug, Clone)]
pub struct VideoBatchRequest {
    pub reference: Option<ReferenceImage>,
    pub prompts: PromptEntry,
    pub directives: SceneDirectives,
    pub with_speech: bool,
}

#[derive(Debug, Clone)]
pub struct SinglePostRequest {
    pub reference: Option<ReferenceImage>,
    pub draft: String,
    pub platform: String,
    pub text_style: String,
}

/// Generated post: text plus image suggestions.
#[derive(Debug, Clone, Serialize)]
pub struct SinglePost {
    pub text: String,
    pub images: Vec<Option<Artifact>>,
    /// Set when no suggestion image could be produced; the text is still valid.
    pub image_error: Option<String>,
}

/// A result tagged with the batch that produced it.
#[derive(Debug, Clone, Serialize)]
pub struct Ticketed<T> {
    pub ticket: BatchTicket,
    pub value: T,
}

/// Collaborators the studio dispatches to.
#[derive(Clone)]
pub struct Collaborators {
    pub image: Arc<dyn ImageGenerator>,
    pub video: Arc<dyn VideoGenerator>,
    pub text: Arc<dyn TextGenerator>,
    pub editor: Arc<dyn ImageEditor>,
}

impl Collaborators {
    /// Every role served by one Gemini client.
    pub fn gemini(client: GeminiClient) -> Self {
        let client = Arc::new(client);
        Self {
            image: client.clone(),
            video: client.clone(),
            text: client.clone(),
            editor: client,
        }
    }
}

#[derive(Clone)]
pub struct ContentStudio {
    config: StudioConfig,
    credentials: CredentialHolder,
    supervisor: BatchSupervisor,
    collaborators: Collaborators,
}

impl ContentStudio {
    pub fn new(config: StudioConfig, credentials: CredentialHolder, collaborators: Collaborators) -> Self {
        Self {
            config,
            credentials,
            supervisor: BatchSupervisor::new(),
            collaborators,
        }
    }

    /// Studio backed by the Gemini REST API.
    pub fn with_gemini(config: StudioConfig, credentials: CredentialHolder) -> StudioResult<Self> {
        let client = GeminiClient::new(&config)?;
        Ok(Self::new(config, credentials, Collaborators::gemini(client)))
    }

    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    pub fn credentials(&self) -> &CredentialHolder {
        &self.credentials
    }

    pub fn supervisor(&self) -> &BatchSupervisor {
        &self.supervisor
    }

    /// Generate one carousel card per active prompt.
    pub async fn generate_carousel(
        &self,
        request: CarouselRequest,
    ) -> StudioResult<Ticketed<BatchReport<Artifact>>> {
        let slots = self.slots_for(&request.prompts)?;
        let reference = require_reference(request.reference, &slots)?;
        let key = self.credentials.require().await?;

        let ticket = self.supervisor.begin(Lane::Carousel);
        let image = Arc::clone(&self.collaborators.image);
        let directives = request.directives;
        let report = self
            .fan_out(&ticket, &slots, key, |key, scene| {
                let image = Arc::clone(&image);
                let request = ImageRequest {
                    reference: Arc::clone(&reference),
                    prompt_text: carousel_image_prompt(&scene, &directives),
                };
                async move { image.generate_image(&key, &request).await }
            })
            .await
            .map_err(|err| self.superseded_or(&ticket, err))?;
        Ok(Ticketed { ticket, value: report })
    }

    /// Generate one video clip per active prompt. Each clip polls its own
    /// operation; a slow clip only delays its own slot.
    pub async fn generate_videos(
        &self,
        request: VideoBatchRequest,
    ) -> StudioResult<Ticketed<BatchReport<Artifact>>> {
        let slots = self.slots_for(&request.prompts)?;
        let reference = require_reference(request.reference, &slots)?;
        let key = self.credentials.require().await?;

        let ticket = self.supervisor.begin(Lane::Videos);
        let video = Arc::clone(&self.collaborators.video);
        let directives = request.directives;
        let with_speech = request.with_speech;
        let report = self
            .fan_out(&ticket, &slots, key, |key, scene| {
                let video = Arc::clone(&video);
                let request = VideoRequest {
                    reference: Arc::clone(&reference),
                    prompt_text: video_prompt(&scene, &directives, with_speech),
                };
                async move { video.generate_video(&key, &request).await }
            })
            .await
            .map_err(|err| self.superseded_or(&ticket, err))?;
        Ok(Ticketed { ticket, value: report })
    }

    /// Post text (must succeed) plus image suggestions (best effort).
    pub async fn generate_single_post(
        &self,
        request: SinglePostRequest,
    ) -> StudioResult<Ticketed<SinglePost>> {
        if is_blank(&request.draft) {
            return Err(StudioError::Precondition(
                "Upload a reference image and write the post idea or draft".to_string(),
            ));
        }
        let reference = match request.reference {
            Some(r) if !r.is_empty() => Arc::new(r),
            _ => {
                return Err(StudioError::Precondition(
                    "Upload a reference image and write the post idea or draft".to_string(),
                ))
            }
        };
        let key = self.credentials.require().await?;
        let ticket = self.supervisor.begin(Lane::SinglePost);

        let text_prompt = post_text_prompt(&request.draft, &request.platform, &request.text_style);
        let text = match self.collaborators.text.generate_text(&key, &text_prompt).await {
            Ok(text) => text,
            Err(err) => {
                self.credentials.observe(&err).await;
                return Err(self.superseded_or(&ticket, err));
            }
        };

        let slots = post_image_prompts(&request.draft, &request.platform);
        let image = Arc::clone(&self.collaborators.image);
        let images = self
            .fan_out(&ticket, &slots, key, |key, prompt_text| {
                let image = Arc::clone(&image);
                let request = ImageRequest {
                    reference: Arc::clone(&reference),
                    prompt_text,
                };
                async move { image.generate_image(&key, &request).await }
            })
            .await;

        let post = match images {
            Ok(report) => SinglePost {
                text,
                images: report.into_outputs(),
                image_error: None,
            },
            // Batch failure or a rejected key: the text is still delivered. A
            // rejected key has already been cleared by `fan_out`.
            Err(err) => {
                warn!(error = %err, "Post text generated without image suggestions");
                SinglePost {
                    text,
                    images: vec![None; slots.len()],
                    image_error: Some(err.to_string()),
                }
            }
        };
        Ok(Ticketed { ticket, value: post })
    }

    /// Edit one previously produced image. No fan-out and no `None` fallback:
    /// any failure goes straight back to the caller.
    pub async fn edit_image(&self, source: &Artifact, instruction: &str) -> StudioResult<Artifact> {
        if is_blank(instruction) {
            return Err(StudioError::Precondition("Describe the edit to apply".to_string()));
        }
        let reference = source.as_reference().ok_or_else(|| {
            StudioError::Precondition("Original image not found for editing".to_string())
        })?;
        let key = self.credentials.require().await?;

        let prompt = edit_image_prompt(instruction);
        match self.collaborators.editor.edit_image(&key, &reference, &prompt).await {
            Ok(artifact) => {
                info!("🖌️ Image edit applied");
                Ok(artifact)
            }
            Err(err) => {
                self.credentials.observe(&err).await;
                Err(err)
            }
        }
    }

    /// Errors of a batch that is no longer current are reported as
    /// `Superseded` so the caller can drop them like stale results.
    fn superseded_or(&self, ticket: &BatchTicket, err: StudioError) -> StudioError {
        if self.supervisor.is_current(ticket) {
            err
        } else {
            info!(lane = ?ticket.lane, batch = %ticket.batch_id, error = %err, "Discarding error of superseded batch");
            StudioError::Superseded {
                batch_id: ticket.batch_id,
            }
        }
    }

    /// Canonical slots for `entry`, capped at the configured slot count.
    fn slots_for(&self, entry: &PromptEntry) -> StudioResult<Vec<String>> {
        let slots = entry.to_slots();
        if slots.len() > self.config.max_slots {
            return Err(StudioError::Precondition(format!(
                "At most {} descriptions per batch ({} given)",
                self.config.max_slots,
                slots.len()
            )));
        }
        Ok(slots)
    }

    /// Shared adapter around the orchestrator. A batch in which the service
    /// rejected the key for every item is reported as a credential failure,
    /// which also clears the session key.
    async fn fan_out<F, Fut>(
        &self,
        ticket: &BatchTicket,
        slots: &[String],
        key: ApiKey,
        call: F,
    ) -> StudioResult<BatchReport<Artifact>>
    where
        F: Fn(ApiKey, String) -> Fut,
        Fut: Future<Output = StudioResult<Artifact>>,
    {
        let rejected = AtomicBool::new(false);
        let result = reconcile_with_report(ticket.batch_id, slots, |prompt| {
            let pending = call(key.clone(), prompt);
            let rejected = &rejected;
            async move {
                let out = pending.await;
                if matches!(&out, Err(e) if e.is_credential_failure()) {
                    rejected.store(true, Ordering::Relaxed);
                }
                out
            }
        })
        .await;

        match result {
            Err(StudioError::BatchFailed { attempted }) if rejected.load(Ordering::Relaxed) => {
                let err = StudioError::InvalidCredential(format!(
                    "the service rejected the API key for all {} item(s)",
                    attempted
                ));
                self.credentials.observe(&err).await;
                Err(err)
            }
            other => other,
        }
    }
}

/// Reference image present and at least one active slot, or nothing is dispatched.
fn require_reference(
    reference: Option<ReferenceImage>,
    slots: &[String],
) -> StudioResult<Arc<ReferenceImage>> {
    let has_active = slots.iter().any(|s| !is_blank(s));
    match reference {
        Some(r) if !r.is_empty() && has_active => Ok(Arc::new(r)),
        _ => Err(StudioError::Precondition(
            "Upload a reference image and fill in at least one description".to_string(),
        )),
    }
}
