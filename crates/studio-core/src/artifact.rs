//! Artifacts: the opaque output of a generation request (image bytes, video, or text).

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};

use crate::error::StudioResult;

/// Reference image uploaded by the user. Shared read-only across a batch.
#[derive(Clone, PartialEq, Eq)]
pub struct ReferenceImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl ReferenceImage {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }

    /// Build from base64 payload (as sent by the browser).
    pub fn from_base64(data: &str, mime_type: impl Into<String>) -> StudioResult<Self> {
        Ok(Self::new(BASE64.decode(strip_data_url(data))?, mime_type))
    }

    pub fn to_base64(&self) -> String {
        BASE64.encode(&self.bytes)
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl std::fmt::Debug for ReferenceImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReferenceImage")
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Output of one generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Artifact {
    Image {
        #[serde(with = "base64_bytes")]
        data: Vec<u8>,
        mime_type: String,
    },
    Video {
        /// Vendor URI the bytes were fetched from.
        uri: String,
        #[serde(with = "base64_bytes")]
        data: Vec<u8>,
        mime_type: String,
    },
    Text {
        text: String,
    },
}

impl Artifact {
    pub fn image(data: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Artifact::Image {
            data,
            mime_type: mime_type.into(),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Artifact::Text { text: text.into() }
    }

    pub fn mime_type(&self) -> &str {
        match self {
            Artifact::Image { mime_type, .. } | Artifact::Video { mime_type, .. } => mime_type,
            Artifact::Text { .. } => "text/plain",
        }
    }

    /// Raw payload bytes.
    pub fn bytes(&self) -> &[u8] {
        match self {
            Artifact::Image { data, .. } | Artifact::Video { data, .. } => data,
            Artifact::Text { text } => text.as_bytes(),
        }
    }

    /// File extension for exports.
    pub fn extension(&self) -> &'static str {
        match self.mime_type() {
            "image/jpeg" | "image/jpg" => "jpg",
            "image/webp" => "webp",
            "video/mp4" => "mp4",
            "text/plain" => "txt",
            m if m.starts_with("video/") => "mp4",
            _ => "png",
        }
    }

    /// `data:` URL for direct display in a browser.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type(), BASE64.encode(self.bytes()))
    }

    /// Turn an image artifact back into a reference for an edit request.
    pub fn as_reference(&self) -> Option<ReferenceImage> {
        match self {
            Artifact::Image { data, mime_type } => Some(ReferenceImage::new(data.clone(), mime_type.clone())),
            _ => None,
        }
    }
}

/// Accept either plain base64 or a full `data:<mime>;base64,<payload>` URL.
pub(crate) fn strip_data_url(data: &str) -> &str {
    let data = data.trim();
    match data.split_once(";base64,") {
        Some((prefix, payload)) if prefix.starts_with("data:") => payload,
        _ => data,
    }
}

mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&BASE64.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(d)?;
        BASE64
            .decode(super::strip_data_url(&s))
            .map_err(serde::de::Error::custom)
    }
}
