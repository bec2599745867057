//! Backend upload.
//!
//! Sends the rendered PNG plus a JSON metadata envelope to the hosting
//! service as a multipart form. Blocking on purpose: uploads run from
//! the export flow after rasterization has finished, not from the
//! interactive loop.

use crate::error::{ExportError, ExportResult};
use log::info;
use plakat_raster::RenderedImage;
use reqwest::blocking::Client;
use reqwest::blocking::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Metadata sent alongside the image bytes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadMeta {
    /// Composition id the export came from.
    pub composition_id: String,
    /// Raster width in pixels.
    pub width: u32,
    /// Raster height in pixels.
    pub height: u32,
    /// Optional caption for the published image.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

/// What the backend returns for a stored export.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadReceipt {
    /// Server-side identifier of the stored image.
    pub id: String,
    /// Public URL, when the backend exposes one.
    #[serde(default)]
    pub url: Option<String>,
}

/// Uploads rendered images to the hosting service.
pub struct BackendUploader {
    client: Client,
    endpoint: Url,
}

impl BackendUploader {
    /// Create an uploader for an endpoint URL.
    pub fn new(endpoint: &str) -> ExportResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            endpoint: Url::parse(endpoint)?,
        })
    }

    /// Upload one rendered image with its metadata.
    pub fn upload(&self, image: &RenderedImage, meta: &UploadMeta) -> ExportResult<UploadReceipt> {
        let file_name = format!("{}.png", meta.composition_id);
        let form = Form::new()
            .part(
                "file",
                Part::bytes(image.png.clone())
                    .file_name(file_name)
                    .mime_str("image/png")?,
            )
            .text("meta", serde_json::to_string(meta)?);

        let response = self
            .client
            .post(self.endpoint.clone())
            .multipart(form)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExportError::Rejected {
                status: status.as_u16(),
                body: response.text().unwrap_or_default(),
            });
        }

        let receipt: UploadReceipt = response.json()?;
        info!(
            "uploaded {}x{} export for composition {} as {}",
            image.width, image.height, meta.composition_id, receipt.id
        );
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meta_envelope_shape() {
        let meta = UploadMeta {
            composition_id: "abc".into(),
            width: 800,
            height: 800,
            caption: None,
        };
        let json = serde_json::to_string(&meta).unwrap();
        assert_eq!(json, r#"{"composition_id":"abc","width":800,"height":800}"#);

        let with_caption = UploadMeta {
            caption: Some("Friday gig".into()),
            ..meta
        };
        let json = serde_json::to_string(&with_caption).unwrap();
        assert!(json.contains(r#""caption":"Friday gig""#));
    }

    #[test]
    fn test_receipt_parses_without_url() {
        let receipt: UploadReceipt = serde_json::from_str(r#"{"id":"img-7"}"#).unwrap();
        assert_eq!(receipt.id, "img-7");
        assert!(receipt.url.is_none());
    }

    #[test]
    fn test_uploader_rejects_bad_endpoint() {
        assert!(BackendUploader::new("definitely not a url").is_err());
    }
}
