use std::time::Duration;

use crate::extract::BraceMatch;

/// Generate endpoint of a local Ollama instance.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434/api/generate";

/// Vision model used for the comparison.
pub const DEFAULT_MODEL: &str = "llava:7b-v1.6";

/// Upper bound on a single model call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Upload extensions accepted for both images, lowercase.
pub const DEFAULT_ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Request body limit for the comparison endpoint.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

/// Instruction sent with every comparison request.
pub const DEFAULT_PROMPT: &str = r#"
I have two images:
1. A wireframe design (first image)
2. A webpage implementation (second image)

Please analyze both images and provide a detailed comparison in JSON format with the following structure:
{
    "wireframe_elements": ["list of UI elements/components identified in wireframe"],
    "webpage_elements": ["list of UI elements/components identified in webpage"],
    "implemented_elements": ["elements from wireframe that are clearly implemented in webpage"],
    "missing_elements": ["elements from wireframe that are missing in webpage"],
    "additional_elements": ["elements in webpage that weren't in wireframe"],
    "layout_differences": ["differences in layout, positioning, styling"],
    "overall_similarity_score": "score from 0-100 indicating how well wireframe was implemented",
    "implementation_status": "summary of implementation completeness"
}

Focus on identifying UI components like headers, navigation, buttons, forms, content sections, sidebars, footers, etc.
"#;

/// Immutable settings shared by every request the gateway handles.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Full URL of the model's generate endpoint.
    pub ollama_url: String,
    /// Model identifier forwarded in every query.
    pub model: String,
    /// Instruction prompt forwarded in every query.
    pub prompt: String,
    /// Request timeout for the model call.
    pub timeout: Duration,
    /// Accepted filename extensions, lowercase and without the dot.
    pub allowed_extensions: Vec<String>,
    /// Maximum accepted request body size in bytes.
    pub max_upload_bytes: usize,
    /// How the JSON object is located in the model reply.
    pub brace_match: BraceMatch,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            ollama_url: DEFAULT_OLLAMA_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            prompt: DEFAULT_PROMPT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            brace_match: BraceMatch::default(),
        }
    }
}

impl GatewayConfig {
    pub fn with_ollama_url(mut self, url: impl Into<String>) -> Self {
        self.ollama_url = url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_upload_bytes(mut self, limit: usize) -> Self {
        self.max_upload_bytes = limit;
        self
    }

    pub fn with_brace_match(mut self, brace_match: BraceMatch) -> Self {
        self.brace_match = brace_match;
        self
    }

    /// Returns true if `ext` is one of the allowed extensions, ignoring case.
    pub fn is_allowed_extension(&self, ext: &str) -> bool {
        let ext = ext.to_lowercase();
        self.allowed_extensions.iter().any(|allowed| *allowed == ext)
    }
}
