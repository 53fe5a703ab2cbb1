//! Edit an already generated image with a free-form instruction.

pub const EDIT_IMAGE_TEMPLATE: &str = r#"Edit the provided image following this instruction: "{instruction}".
Change only what the instruction asks for; keep the character, the art style and the composition otherwise intact.
The output must keep the exact dimensions of the input image (1080x1920, 9:16 portrait)."#;

pub fn edit_image_prompt(instruction: &str) -> String {
    EDIT_IMAGE_TEMPLATE.replace("{instruction}", instruction.trim())
}
