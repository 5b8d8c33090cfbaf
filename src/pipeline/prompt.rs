//! Prompt construction: one document → a two-message chat exchange.
//!
//! The exchange is always the static system instruction from
//! [`crate::prompts`] followed by exactly one user turn. The user turn
//! carries either the normalized image as a JPEG data-URI or the extracted
//! text embedded in a fixed instruction template — never both. Construction
//! is a pure function of the document body and the configuration; there is no
//! randomness and no I/O here.

use crate::config::AnalysisConfig;
use crate::pipeline::invoke::{ChatMessage, ChatRequest};
use crate::prompts;

/// The single modality attached to the user turn.
#[derive(Debug, Clone)]
pub enum DocumentBody {
    /// A normalized, base64-encoded JPEG.
    Image { base64_jpeg: String },
    /// Text extracted from a PDF.
    Text { content: String },
}

impl DocumentBody {
    /// The text available for fallback synthesis: the extracted text for
    /// text documents, empty for images.
    pub fn source_text(&self) -> &str {
        match self {
            DocumentBody::Image { .. } => "",
            DocumentBody::Text { content } => content,
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, DocumentBody::Image { .. })
    }
}

/// Assemble the full chat-completions request for a document.
///
/// Model selection follows the modality: the vision slot for images, the
/// text slot for extracted text. Decoding parameters come straight from the
/// configuration.
pub fn build_request(config: &AnalysisConfig, body: &DocumentBody) -> ChatRequest {
    let user = match body {
        DocumentBody::Image { base64_jpeg } => {
            ChatMessage::user_with_image(prompts::IMAGE_INSTRUCTION, base64_jpeg)
        }
        DocumentBody::Text { content } => ChatMessage::user(prompts::text_instruction(content)),
    };

    ChatRequest {
        model: config.model_for(body.is_image()).to_string(),
        messages: vec![ChatMessage::system(prompts::SYSTEM_PROMPT), user],
        max_tokens: config.max_tokens,
        temperature: config.temperature,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AnalysisConfig {
        AnalysisConfig::builder()
            .vision_model("vision-model")
            .text_model("text-model")
            .build()
            .unwrap()
    }

    #[test]
    fn image_request_uses_vision_model_and_data_uri() {
        let body = DocumentBody::Image {
            base64_jpeg: "QUJD".into(),
        };
        let req = build_request(&config(), &body);
        assert_eq!(req.model, "vision-model");
        assert_eq!(req.messages.len(), 2);

        let v = serde_json::to_value(&req.messages[1]).unwrap();
        assert_eq!(
            v["content"][1]["image_url"]["url"],
            serde_json::json!("data:image/jpeg;base64,QUJD")
        );
    }

    #[test]
    fn text_request_uses_text_model_and_embeds_content() {
        let body = DocumentBody::Text {
            content: "INVOICE #123".into(),
        };
        let req = build_request(&config(), &body);
        assert_eq!(req.model, "text-model");

        let v = serde_json::to_value(&req.messages[1]).unwrap();
        let content = v["content"].as_str().unwrap();
        assert!(content.contains("INVOICE #123"));
    }

    #[test]
    fn system_turn_is_always_first() {
        let req = build_request(
            &config(),
            &DocumentBody::Text {
                content: String::new(),
            },
        );
        assert_eq!(req.messages[0].role, "system");
        let v = serde_json::to_value(&req.messages[0]).unwrap();
        assert!(v["content"]
            .as_str()
            .unwrap()
            .contains("document analysis expert"));
    }

    #[test]
    fn source_text_is_empty_for_images() {
        let body = DocumentBody::Image {
            base64_jpeg: "x".into(),
        };
        assert_eq!(body.source_text(), "");
        let body = DocumentBody::Text {
            content: "abc".into(),
        };
        assert_eq!(body.source_text(), "abc");
    }
}
