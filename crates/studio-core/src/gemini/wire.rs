//! Gemini REST wire types (camelCase JSON).

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub(crate) struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }

    pub fn inline(mime_type: impl Into<String>, data: String) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData {
                mime_type: mime_type.into(),
                data,
            }),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InlineData {
    pub mime_type: String,
    /// Base64 payload.
    pub data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerationConfig {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub response_modalities: Vec<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize, Default)]
pub(crate) struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
}

impl GenerateContentResponse {
    /// First inline payload of the first candidate.
    pub fn first_inline_data(&self) -> Option<&InlineData> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .iter()
            .find_map(|p| p.inline_data.as_ref())
    }

    /// Concatenated text parts of the first candidate.
    pub fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: Vec<&str> = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        if text.is_empty() {
            None
        } else {
            Some(text.concat())
        }
    }
}

// -- Video (predictLongRunning) --

#[derive(Debug, Serialize)]
pub(crate) struct PredictRequest {
    pub instances: Vec<VideoInstance>,
    pub parameters: VideoParameters,
}

#[derive(Debug, Serialize)]
pub(crate) struct VideoInstance {
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<VideoImage>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VideoImage {
    pub bytes_base64_encoded: String,
    pub mime_type: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VideoParameters {
    pub aspect_ratio: String,
    pub sample_count: u32,
}

/// Long-running operation handle.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Operation {
    pub name: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub error: Option<ApiErrorBody>,
    #[serde(default)]
    pub response: Option<OperationResponse>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OperationResponse {
    #[serde(default)]
    pub generate_video_response: Option<GenerateVideoResponse>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateVideoResponse {
    #[serde(default)]
    pub generated_samples: Vec<GeneratedSample>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeneratedSample {
    pub video: Option<VideoRef>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VideoRef {
    pub uri: Option<String>,
}

impl Operation {
    pub fn video_uri(&self) -> Option<&str> {
        self.response
            .as_ref()?
            .generate_video_response
            .as_ref()?
            .generated_samples
            .iter()
            .find_map(|s| s.video.as_ref()?.uri.as_deref())
    }
}

// -- Errors --

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorEnvelope {
    pub error: ApiErrorBody,
}

#[derive(Debug, Deserialize, Default)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_camel_case() {
        let req = GenerateContentRequest {
            contents: vec![Content {
                role: None,
                parts: vec![Part::inline("image/png", "AAAA".into()), Part::text("hi")],
            }],
            generation_config: Some(GenerationConfig {
                response_modalities: vec!["IMAGE".into(), "TEXT".into()],
            }),
        };
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v["contents"][0]["parts"][0]["inlineData"]["mimeType"], "image/png");
        assert_eq!(v["contents"][0]["parts"][1]["text"], "hi");
        assert!(v["contents"][0]["parts"][1].get("inlineData").is_none());
        assert_eq!(v["generationConfig"]["responseModalities"][0], "IMAGE");
    }

    #[test]
    fn finds_inline_data_after_text_part() {
        let json = r#"{"candidates":[{"content":{"parts":[
            {"text":"Here is your image"},
            {"inlineData":{"mimeType":"image/png","data":"iVBO"}}
        ]}}]}"#;
        let resp: GenerateContentResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.first_inline_data().unwrap().data, "iVBO");
        assert_eq!(resp.text().unwrap(), "Here is your image");
    }

    #[test]
    fn no_candidates_means_no_artifact() {
        let resp: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.first_inline_data().is_none());
        assert!(resp.text().is_none());
    }

    #[test]
    fn operation_video_uri() {
        let json = r#"{"name":"models/veo/operations/1","done":true,"response":{
            "generateVideoResponse":{"generatedSamples":[{"video":{"uri":"https://files/v.mp4?alt=media"}}]}}}"#;
        let op: Operation = serde_json::from_str(json).unwrap();
        assert!(op.done);
        assert_eq!(op.video_uri(), Some("https://files/v.mp4?alt=media"));

        let pending: Operation = serde_json::from_str(r#"{"name":"x"}"#).unwrap();
        assert!(!pending.done);
        assert!(pending.video_uri().is_none());
    }

    #[test]
    fn error_envelope_parses() {
        let json = r#"{"error":{"code":400,"message":"API key not valid. Please pass a valid API key.","status":"INVALID_ARGUMENT"}}"#;
        let env: ApiErrorEnvelope = serde_json::from_str(json).unwrap();
        assert_eq!(env.error.code, Some(400));
        assert!(env.error.message.contains("API key not valid"));
    }
}
