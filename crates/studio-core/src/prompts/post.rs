//! Single post: platform-ready text plus a few image suggestions.

pub const POST_TEXT_TEMPLATE: &str = r#"You are a social media copywriter.
Write a complete post for {platform} in a {text_style} tone, based on the idea or draft below.
Follow the conventions of {platform} (length, hashtags, calls to action).
Use **Subheading** lines for sections when the post is long. Return only the post text.

Idea or draft:
---
{draft}
---"#;

/// Variants for the image suggestions; each becomes one slot of a batch.
pub const POST_IMAGE_VARIANTS: &[&str] = &[
    "a striking cover image that captures the main idea",
    "a close-up detail that supports the message",
    "a wide scene that gives the post context",
];

/// Build the text-generation prompt for a single post.
pub fn post_text_prompt(draft: &str, platform: &str, text_style: &str) -> String {
    let style = if text_style.trim().is_empty() || text_style.eq_ignore_ascii_case("default") {
        "natural"
    } else {
        text_style.trim()
    };
    POST_TEXT_TEMPLATE
        .replace("{platform}", platform.trim())
        .replace("{text_style}", &style.to_lowercase())
        .replace("{draft}", draft.trim())
}

/// One image prompt per variant, grounded on the reference image and the post idea.
pub fn post_image_prompts(draft: &str, platform: &str) -> Vec<String> {
    POST_IMAGE_VARIANTS
        .iter()
        .map(|variant| {
            format!(
                "Generate {} for a {} post. Use the provided image as the reference for style and main subject. Post idea: \"{}\"",
                variant,
                platform.trim(),
                draft.trim()
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_style_becomes_natural() {
        let p = post_text_prompt("launch day", "LinkedIn", "Default");
        assert!(p.contains("LinkedIn"));
        assert!(p.contains("natural tone"));
        assert!(p.contains("launch day"));
    }

    #[test]
    fn one_image_prompt_per_variant() {
        let prompts = post_image_prompts("launch day", "X");
        assert_eq!(prompts.len(), POST_IMAGE_VARIANTS.len());
        assert!(prompts.iter().all(|p| p.contains("launch day")));
    }
}
