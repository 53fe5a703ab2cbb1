//! # Studio Core - Batch Content Generation
//!
//! Collects a reference image plus a batch of scene prompts, fans them out to
//! a hosted generative service, and re-aligns the sparse results onto the
//! original prompt positions.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        ContentStudio                          │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────────┐    │
//! │  │ PromptEntry  │→ │ Orchestrator │→ │  Collaborators   │    │
//! │  │ (list/bulk)  │  │  (join_all)  │  │ (GeminiClient)   │    │
//! │  └──────────────┘  └──────────────┘  └──────────────────┘    │
//! │         ↑                  ↓                   ↓             │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────────┐    │
//! │  │  Credential  │← │  Supervisor  │  │  ZIP/PDF export  │    │
//! │  │    Holder    │  │ (stale drop) │  │                  │    │
//! │  └──────────────┘  └──────────────┘  └──────────────────┘    │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod artifact;
pub mod collaborator;
pub mod config;
pub mod credentials;
pub mod error;
pub mod export;
pub mod gemini;
pub mod orchestrator;
pub mod prompt_entry;
pub mod prompts;
pub mod studio;
pub mod supervisor;

pub use artifact::{Artifact, ReferenceImage};
pub use collaborator::{
    ImageEditor, ImageGenerator, ImageRequest, TextGenerator, VideoGenerator, VideoRequest,
};
pub use config::StudioConfig;
pub use credentials::{ApiKey, CredentialHolder, CredentialState};
pub use error::{StudioError, StudioResult};
pub use export::{archive_naming, export_pdf, export_zip, CAROUSEL_PDF_NAME};
pub use gemini::GeminiClient;
pub use orchestrator::{
    is_blank, reconcile, reconcile_with_report, BatchPhase, BatchReport, SlotFailure, SlotOutcome,
};
pub use prompt_entry::{PromptEntry, BULK_SEPARATOR, DEFAULT_MAX_SLOTS};
pub use prompts::SceneDirectives;
pub use studio::{
    CarouselRequest, Collaborators, ContentStudio, SinglePost, SinglePostRequest, Ticketed,
    VideoBatchRequest,
};
pub use supervisor::{BatchSupervisor, BatchTicket, Lane};
