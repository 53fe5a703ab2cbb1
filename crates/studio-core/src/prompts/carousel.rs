//! Carousel card generation: one 1080x1920 portrait image per scene, keeping the
//! reference character and style consistent across cards.

use super::{collapse_blank_lines, SceneDirectives};

pub const CAROUSEL_IMAGE_TEMPLATE: &str = r#"**Critical Task:** Generate a new image.
**Mandatory Requirement:** The output image MUST be exactly 1080 pixels wide by 1920 pixels tall (9:16 aspect ratio, vertical portrait format). This is the most important requirement.
**Instructions:** Use the provided image only as a reference for the art style and the main character. Character and style must stay consistent across all images.
{general}
{style}
**Specific Scene Description:** Create a scene based on the following description: "{scene}". Change the pose and the setting as described, but keep the character and the style.
**Remember, the 1080x1920 dimension is non-negotiable.**"#;

/// Build the full image prompt for one carousel card.
pub fn carousel_image_prompt(scene: &str, directives: &SceneDirectives) -> String {
    collapse_blank_lines(
        &CAROUSEL_IMAGE_TEMPLATE
            .replace("{general}", &directives.general_line())
            .replace("{style}", &directives.style_line())
            .replace("{scene}", scene.trim()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn omits_blank_directives() {
        let p = carousel_image_prompt("waving hello", &SceneDirectives::default());
        assert!(p.contains("\"waving hello\""));
        assert!(!p.contains("Art Style"));
        assert!(!p.contains("General Scene"));
        assert!(!p.contains("\n\n"));
    }

    #[test]
    fn includes_style_and_general() {
        let d = SceneDirectives {
            general: "blue sky".into(),
            style: "pixel art, 16-bit".into(),
        };
        let p = carousel_image_prompt("reading", &d);
        assert!(p.contains("**General Scene Instructions:** blue sky."));
        assert!(p.contains("**Art Style:** pixel art, 16-bit."));
        assert!(p.contains("1080x1920"));
    }
}
