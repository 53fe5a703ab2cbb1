//! Prompt templates for carousel images, videos, single posts and edits.

pub mod carousel;
pub mod edit;
pub mod post;
pub mod video;

pub use carousel::{carousel_image_prompt, CAROUSEL_IMAGE_TEMPLATE};
pub use edit::{edit_image_prompt, EDIT_IMAGE_TEMPLATE};
pub use post::{
    post_image_prompts, post_text_prompt, POST_IMAGE_VARIANTS, POST_TEXT_TEMPLATE,
};
pub use video::{video_prompt, VIDEO_TEMPLATE};

/// Named art style presets. An empty value keeps the style of the reference image.
pub const STYLE_PRESETS: &[(&str, &str)] = &[
    ("Default (from image)", ""),
    ("Flat Illustration", "flat illustration, vector art, minimalist"),
    ("3D Art", "3D render, cinematic lighting, octane render, high detail"),
    ("Watercolor", "watercolor painting, soft edges, paper texture"),
    ("Anime/Manga", "anime style, vibrant colors, dynamic lines, manga aesthetic"),
    ("Pixel Art", "pixel art, 16-bit, retro gaming style"),
];

/// Target platforms for a single post.
pub const PLATFORMS: &[&str] = &["Instagram", "Facebook", "LinkedIn", "X"];

/// Text styles for a single post.
pub const TEXT_STYLES: &[&str] = &["Default", "Formal", "Professional", "Technical", "Friendly", "Casual"];

/// Directives shared by every scene prompt. Blank directives are omitted.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct SceneDirectives {
    /// General scene instructions applied to every slot.
    #[serde(default)]
    pub general: String,
    /// Art style directive (see [`STYLE_PRESETS`]).
    #[serde(default)]
    pub style: String,
}

impl SceneDirectives {
    pub(crate) fn general_line(&self) -> String {
        let g = self.general.trim();
        if g.is_empty() {
            String::new()
        } else {
            format!("**General Scene Instructions:** {}.", g)
        }
    }

    pub(crate) fn style_line(&self) -> String {
        let s = self.style.trim();
        if s.is_empty() {
            String::new()
        } else {
            format!("**Art Style:** {}.", s)
        }
    }
}

/// Drop lines left empty by omitted directives.
pub(crate) fn collapse_blank_lines(s: &str) -> String {
    s.lines()
        .filter(|l| !l.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
