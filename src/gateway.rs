use std::time::Instant;

use axum::body::Bytes;
use base64::{Engine as _, engine::general_purpose::STANDARD};

use crate::{
    config::GatewayConfig,
    error::GatewayError,
    extract::{ComparisonResult, extract_comparison},
    model::{ModelQuery, OllamaModel, VisionModel},
};

/// Multipart field carrying the design reference.
pub const WIREFRAME_FIELD: &str = "wireframe";

/// Multipart field carrying the rendered page.
pub const WEBPAGE_FIELD: &str = "webpage";

/// One uploaded image as received from the client.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub filename: String,
    pub bytes: Bytes,
}

impl ImageUpload {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }

    /// Text after the last `.` of the filename, if there is a dot.
    pub fn extension(&self) -> Option<&str> {
        self.filename.rsplit_once('.').map(|(_, ext)| ext)
    }

    fn validate(&self, field: &'static str, config: &GatewayConfig) -> Result<(), GatewayError> {
        if self.filename.is_empty() {
            return Err(GatewayError::InvalidFile(field));
        }
        let ext = self.extension().ok_or(GatewayError::InvalidFile(field))?;
        if !config.is_allowed_extension(ext) {
            return Err(GatewayError::UnsupportedFileType(field));
        }
        Ok(())
    }

    /// Standard padded base64 of the image bytes.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }
}

/// A validated pair of uploads.
#[derive(Debug, Clone)]
pub struct ComparisonRequest {
    pub wireframe: ImageUpload,
    pub webpage: ImageUpload,
}

impl ComparisonRequest {
    /// Checks presence first, then the wireframe, then the webpage.
    pub fn validate(
        wireframe: Option<ImageUpload>,
        webpage: Option<ImageUpload>,
        config: &GatewayConfig,
    ) -> Result<Self, GatewayError> {
        let (Some(wireframe), Some(webpage)) = (wireframe, webpage) else {
            return Err(GatewayError::MissingFiles);
        };
        wireframe.validate(WIREFRAME_FIELD, config)?;
        webpage.validate(WEBPAGE_FIELD, config)?;
        Ok(Self { wireframe, webpage })
    }
}

/// Turns a pair of uploads into a comparison using a vision model.
pub struct ComparisonGateway<M: VisionModel> {
    config: GatewayConfig,
    model: M,
}

impl ComparisonGateway<OllamaModel> {
    /// Gateway backed by the Ollama endpoint named in `config`.
    pub fn ollama(config: GatewayConfig) -> Result<Self, GatewayError> {
        let model = OllamaModel::new(&config)?;
        Ok(Self::new(config, model))
    }
}

impl<M: VisionModel> ComparisonGateway<M> {
    pub fn new(config: GatewayConfig, model: M) -> Self {
        Self { config, model }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Validates the uploads and runs the comparison.
    pub async fn handle(
        &self,
        wireframe: Option<ImageUpload>,
        webpage: Option<ImageUpload>,
    ) -> Result<ComparisonResult, GatewayError> {
        let request = ComparisonRequest::validate(wireframe, webpage, &self.config)?;
        self.compare(request).await
    }

    /// Sends both images to the model and extracts the comparison.
    ///
    /// Only the model call can fail; a reply that holds no usable JSON
    /// still yields a result.
    pub async fn compare(
        &self,
        request: ComparisonRequest,
    ) -> Result<ComparisonResult, GatewayError> {
        let query = ModelQuery::new(
            &self.config,
            request.wireframe.to_base64(),
            request.webpage.to_base64(),
        );
        drop(request);

        let start_time = Instant::now();
        log::debug!("Querying model {}", query.model);

        let reply = self.model.generate(query).await.inspect_err(|e| {
            log::error!("Model call failed after {:?}: {e}", start_time.elapsed());
        })?;

        log::debug!(
            "Model answered {} in {:?} ({} chars)",
            reply.status,
            start_time.elapsed(),
            reply.response.len()
        );

        Ok(extract_comparison(&reply.response, self.config.brace_match))
    }
}
