use std::time::Duration;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{de::DeserializeOwned, Serialize};

use super::poll::poll_until_done;
use super::wire::{
    ApiErrorEnvelope, Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
    Operation, Part, PredictRequest, VideoImage, VideoInstance, VideoParameters,
};
use crate::artifact::{Artifact, ReferenceImage};
use crate::collaborator::{
    ImageEditor, ImageGenerator, ImageRequest, TextGenerator, VideoGenerator, VideoRequest,
};
use crate::config::StudioConfig;
use crate::credentials::ApiKey;
use crate::error::{StudioError, StudioResult};

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini REST client. One instance serves every lane; it holds no credential,
/// the key is passed per call.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    api_base: String,
    image_model: String,
    text_model: String,
    video_model: String,
    poll_interval: Duration,
    max_polls: u32,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(config: &StudioConfig) -> StudioResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self {
            api_base: config.api_base.trim_end_matches('/').to_string(),
            image_model: config.image_model.clone(),
            text_model: config.text_model.clone(),
            video_model: config.video_model.clone(),
            poll_interval: config.poll_interval(),
            max_polls: config.max_polls,
            client,
        })
    }

    fn model_url(&self, model: &str, method: &str) -> String {
        format!("{}/models/{}:{}", self.api_base, model, method)
    }

    async fn post_json<B, R>(&self, key: &ApiKey, url: &str, body: &B) -> StudioResult<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let res = self
            .client
            .post(url)
            .header(API_KEY_HEADER, key.expose())
            .json(body)
            .send()
            .await?;
        Self::decode(res).await
    }

    async fn get_json<R: DeserializeOwned>(&self, key: &ApiKey, url: &str) -> StudioResult<R> {
        let res = self
            .client
            .get(url)
            .header(API_KEY_HEADER, key.expose())
            .send()
            .await?;
        Self::decode(res).await
    }

    async fn decode<R: DeserializeOwned>(res: reqwest::Response) -> StudioResult<R> {
        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(vendor_error(status.as_u16(), &body));
        }
        Ok(res.json().await?)
    }

    /// `generateContent` with an optional image part followed by the prompt text.
    async fn generate_content(
        &self,
        key: &ApiKey,
        model: &str,
        image: Option<&ReferenceImage>,
        prompt_text: &str,
        modalities: &[&str],
    ) -> StudioResult<GenerateContentResponse> {
        let mut parts = Vec::with_capacity(2);
        if let Some(image) = image {
            parts.push(Part::inline(image.mime_type.clone(), image.to_base64()));
        }
        parts.push(Part::text(prompt_text));

        let body = GenerateContentRequest {
            contents: vec![Content { role: None, parts }],
            generation_config: (!modalities.is_empty()).then(|| GenerationConfig {
                response_modalities: modalities.iter().map(|m| m.to_string()).collect(),
            }),
        };
        let url = self.model_url(model, "generateContent");
        tracing::debug!(%url, "Gemini generateContent");
        self.post_json(key, &url, &body).await
    }

    async fn image_from(
        &self,
        key: &ApiKey,
        image: &ReferenceImage,
        prompt_text: &str,
    ) -> StudioResult<Artifact> {
        let resp = self
            .generate_content(key, &self.image_model, Some(image), prompt_text, &["IMAGE", "TEXT"])
            .await?;
        let inline = resp.first_inline_data().ok_or(StudioError::NoArtifact)?;
        Ok(Artifact::image(BASE64.decode(&inline.data)?, inline.mime_type.clone()))
    }
}

/// Map a non-2xx body onto the studio taxonomy.
fn vendor_error(status: u16, body: &str) -> StudioError {
    let message = serde_json::from_str::<ApiErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string());
    let message = if message.trim().is_empty() {
        format!("HTTP {}", status)
    } else {
        message
    };
    StudioError::from_vendor_message(Some(status), message)
}

#[async_trait::async_trait]
impl ImageGenerator for GeminiClient {
    async fn generate_image(&self, key: &ApiKey, request: &ImageRequest) -> StudioResult<Artifact> {
        self.image_from(key, &request.reference, &request.prompt_text).await
    }
}

#[async_trait::async_trait]
impl ImageEditor for GeminiClient {
    async fn edit_image(
        &self,
        key: &ApiKey,
        source: &ReferenceImage,
        prompt_text: &str,
    ) -> StudioResult<Artifact> {
        self.image_from(key, source, prompt_text).await
    }
}

#[async_trait::async_trait]
impl TextGenerator for GeminiClient {
    async fn generate_text(&self, key: &ApiKey, prompt: &str) -> StudioResult<String> {
        let resp = self
            .generate_content(key, &self.text_model, None, prompt, &[])
            .await?;
        resp.text().ok_or(StudioError::NoArtifact)
    }
}

#[async_trait::async_trait]
impl VideoGenerator for GeminiClient {
    async fn generate_video(&self, key: &ApiKey, request: &VideoRequest) -> StudioResult<Artifact> {
        let body = PredictRequest {
            instances: vec![VideoInstance {
                prompt: request.prompt_text.clone(),
                image: Some(VideoImage {
                    bytes_base64_encoded: request.reference.to_base64(),
                    mime_type: request.reference.mime_type.clone(),
                }),
            }],
            parameters: VideoParameters {
                aspect_ratio: "9:16".to_string(),
                sample_count: 1,
            },
        };
        let url = self.model_url(&self.video_model, "predictLongRunning");
        let started: Operation = self.post_json(key, &url, &body).await?;
        tracing::info!(operation = %started.name, "🎬 Video operation started");

        let op_url = format!("{}/{}", self.api_base, started.name);
        let op_url = op_url.as_str();
        let finished = if started.done {
            started
        } else {
            poll_until_done(
                self.poll_interval,
                self.max_polls,
                move || self.get_json::<Operation>(key, op_url),
                |op| op.done,
            )
            .await?
        };

        if let Some(err) = finished.error.as_ref() {
            return Err(StudioError::from_vendor_message(err.code, err.message.clone()));
        }
        let uri = finished.video_uri().ok_or(StudioError::NoArtifact)?.to_string();

        let res = self
            .client
            .get(&uri)
            .header(API_KEY_HEADER, key.expose())
            .send()
            .await?;
        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(vendor_error(status.as_u16(), &body));
        }
        let mime_type = res
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .filter(|v| v.starts_with("video/"))
            .unwrap_or("video/mp4")
            .to_string();
        let data = res.bytes().await?.to_vec();
        tracing::info!(bytes = data.len(), "Video fetched");
        Ok(Artifact::Video { uri, data, mime_type })
    }
}
