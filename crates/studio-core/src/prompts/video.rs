//! Short video clips animated from the reference image.

use super::{collapse_blank_lines, SceneDirectives};

pub const VIDEO_TEMPLATE: &str = r#"Create a short vertical video (9:16 portrait) based on the provided reference image.
Keep the main character and the art style of the reference consistent.
{general}
{style}
{speech}
Scene: {scene}"#;

/// Build the full prompt for one video scene.
pub fn video_prompt(scene: &str, directives: &SceneDirectives, with_speech: bool) -> String {
    let speech = if with_speech {
        "Audio: the character speaks naturally, with dialogue that fits the scene."
    } else {
        "Audio: no speech or dialogue; ambient sound and music only."
    };
    collapse_blank_lines(
        &VIDEO_TEMPLATE
            .replace("{general}", &directives.general_line())
            .replace("{style}", &directives.style_line())
            .replace("{speech}", speech)
            .replace("{scene}", scene.trim()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speech_toggle() {
        let d = SceneDirectives::default();
        assert!(video_prompt("x", &d, true).contains("speaks naturally"));
        assert!(video_prompt("x", &d, false).contains("no speech"));
    }
}
