//! Configuration for document analysis.
//!
//! All pipeline behaviour is controlled through [`AnalysisConfig`], built via
//! its [`AnalysisConfigBuilder`] and treated as immutable for the lifetime of
//! the pipeline. Keeping every knob in one struct makes it trivial to share
//! configs across tasks and diff two runs to understand why their outputs
//! differ.
//!
//! The vision-model and text-model slots are independent settings even though
//! the defaults are identical: image-bearing prompts and text-only prompts may
//! be routed to different models without touching any other code.

use crate::error::PipelineError;
use serde::{Deserialize, Serialize};

/// Default OpenAI-compatible endpoint (OpenRouter).
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Default model for both the vision and text slots.
pub const DEFAULT_MODEL: &str = "anthropic/claude-3.5-sonnet";

/// Configuration for a document-analysis pipeline.
///
/// Built via [`AnalysisConfig::builder()`], [`AnalysisConfig::from_env()`],
/// or [`AnalysisConfig::default()`].
///
/// # Example
/// ```rust
/// use doctriage::AnalysisConfig;
///
/// let config = AnalysisConfig::builder()
///     .api_key("sk-or-...")
///     .text_model("anthropic/claude-3.5-sonnet")
///     .api_timeout_secs(30)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Base URL of the OpenAI-compatible endpoint. Default: OpenRouter.
    pub base_url: String,

    /// Bearer token for the endpoint. Optional for local endpoints.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Model used for image-bearing prompts.
    pub vision_model: String,

    /// Model used for text-only prompts.
    pub text_model: String,

    /// Maximum tokens the model may generate per reply. Default: 2048.
    ///
    /// The extraction schema rarely needs more than ~1500 tokens; 2048 leaves
    /// headroom for verbose entity lists without letting a runaway reply burn
    /// budget.
    pub max_tokens: u32,

    /// Sampling temperature. Default: 0.1.
    ///
    /// Low temperature biases the model toward deterministic structured
    /// output — exactly what the JSON-schema prompt asks for.
    pub temperature: f32,

    /// Maximum normalized image dimension (width or height) in pixels.
    /// Default: 1024.
    ///
    /// Screenshots and phone photos routinely exceed 3000 px; vision models
    /// tile large images and charge per tile. 1024 px keeps one upload to a
    /// handful of tiles while leaving invoice line items legible.
    pub max_image_dim: u32,

    /// JPEG re-encoding quality, 1–100. Default: 85.
    pub jpeg_quality: u8,

    /// Per-call deadline for the remote model in seconds. Default: 60.
    ///
    /// The call is the pipeline's only external I/O; an unbounded hang would
    /// pin the request forever. Expiry surfaces as
    /// [`PipelineError::InvocationTimeout`] and follows the normal
    /// invocation-failure path.
    pub api_timeout_secs: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            vision_model: DEFAULT_MODEL.to_string(),
            text_model: DEFAULT_MODEL.to_string(),
            max_tokens: 2048,
            temperature: 0.1,
            max_image_dim: 1024,
            jpeg_quality: 85,
            api_timeout_secs: 60,
        }
    }
}

impl AnalysisConfig {
    /// Create a new builder.
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder {
            config: Self::default(),
        }
    }

    /// Load configuration from the environment.
    ///
    /// Reads `OPENROUTER_API_KEY` and `OPENROUTER_BASE_URL`; everything else
    /// keeps its default. Missing variables are not an error — a missing key
    /// simply means unauthenticated requests, which the endpoint will reject
    /// at invocation time.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("OPENROUTER_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            api_key: std::env::var("OPENROUTER_API_KEY").ok(),
            ..Self::default()
        }
    }

    /// Select the model for the given modality.
    pub fn model_for(&self, is_image: bool) -> &str {
        if is_image {
            &self.vision_model
        } else {
            &self.text_model
        }
    }
}

/// Builder for [`AnalysisConfig`].
#[derive(Debug)]
pub struct AnalysisConfigBuilder {
    config: AnalysisConfig,
}

impl AnalysisConfigBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn vision_model(mut self, model: impl Into<String>) -> Self {
        self.config.vision_model = model.into();
        self
    }

    pub fn text_model(mut self, model: impl Into<String>) -> Self {
        self.config.text_model = model.into();
        self
    }

    pub fn max_tokens(mut self, n: u32) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_image_dim(mut self, px: u32) -> Self {
        self.config.max_image_dim = px.max(64);
        self
    }

    pub fn jpeg_quality(mut self, q: u8) -> Self {
        self.config.jpeg_quality = q.clamp(1, 100);
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<AnalysisConfig, PipelineError> {
        let c = &self.config;
        if c.base_url.is_empty() {
            return Err(PipelineError::InvalidConfig("base_url is empty".into()));
        }
        if c.max_tokens == 0 {
            return Err(PipelineError::InvalidConfig("max_tokens must be ≥ 1".into()));
        }
        if c.api_timeout_secs == 0 {
            return Err(PipelineError::InvalidConfig(
                "api_timeout_secs must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = AnalysisConfig::default();
        assert_eq!(c.base_url, DEFAULT_BASE_URL);
        assert_eq!(c.vision_model, DEFAULT_MODEL);
        assert_eq!(c.text_model, DEFAULT_MODEL);
        assert_eq!(c.max_tokens, 2048);
        assert_eq!(c.temperature, 0.1);
        assert_eq!(c.max_image_dim, 1024);
        assert_eq!(c.jpeg_quality, 85);
        assert_eq!(c.api_timeout_secs, 60);
        assert!(c.api_key.is_none());
    }

    #[test]
    fn builder_clamps_out_of_range_values() {
        let c = AnalysisConfig::builder()
            .temperature(9.0)
            .jpeg_quality(0)
            .max_image_dim(1)
            .build()
            .unwrap();
        assert_eq!(c.temperature, 2.0);
        assert_eq!(c.jpeg_quality, 1);
        assert_eq!(c.max_image_dim, 64);
    }

    #[test]
    fn builder_rejects_zero_max_tokens() {
        let err = AnalysisConfig::builder().max_tokens(0).build().unwrap_err();
        assert!(err.to_string().contains("max_tokens"));
    }

    #[test]
    fn builder_rejects_empty_base_url() {
        assert!(AnalysisConfig::builder().base_url("").build().is_err());
    }

    #[test]
    fn model_slot_selection() {
        let c = AnalysisConfig::builder()
            .vision_model("vision-a")
            .text_model("text-b")
            .build()
            .unwrap();
        assert_eq!(c.model_for(true), "vision-a");
        assert_eq!(c.model_for(false), "text-b");
    }
}
