//! Prompt text for document analysis.
//!
//! Centralising every prompt here serves two purposes:
//!
//! 1. **Single source of truth** — the taxonomy and the required JSON schema
//!    live in exactly one place; the response parser and category mapper are
//!    written against this text.
//!
//! 2. **Testability** — unit tests can inspect prompts directly without
//!    calling a real model.
//!
//! The system instruction is static and never parameterized; the only dynamic
//! prompt content is the user turn built by [`crate::pipeline::prompt`].

/// System instruction: analysis persona, required JSON schema, taxonomy, and
/// fraud-prevention framing.
pub const SYSTEM_PROMPT: &str = r#"You are a document analysis expert specializing in categorization and content extraction for fraud prevention.

Analyze the provided document and return a JSON response with the following structure:
{
    "category": "one of: invoice, marketplace_listing_screenshot, chat_screenshot, website_screenshot, other",
    "confidence": "float between 0.0 and 1.0",
    "extracted_content": {
        "text": "extracted or transcribed text",
        "key_entities": {
            "company_names": [],
            "person_names": [],
            "amounts": [],
            "addresses": [],
            "phone_numbers": [],
            "email_addresses": [],
            "urls": [],
            "product_names": [],
            "other_relevant": []
        },
        "dates": [],
        "metadata": {
            "document_type": "more specific type if applicable",
            "urgency_indicators": [],
            "fraud_risk_indicators": [],
            "quality_score": "float between 0.0 and 1.0"
        }
    }
}

Categories:
- invoice: Bills, receipts, payment requests
- marketplace_listing_screenshot: Product listings from e-commerce sites
- chat_screenshot: Screenshots of messaging apps, social media conversations
- website_screenshot: Screenshots of websites, web pages
- other: Documents that don't fit the above categories

Focus on fraud prevention - look for suspicious patterns, inconsistencies, or red flags."#;

/// User-turn text accompanying an inlined document image.
pub const IMAGE_INSTRUCTION: &str = "Please analyze this document image.";

/// Build the user-turn text for an extracted-text document.
pub fn text_instruction(content: &str) -> String {
    format!("Please analyze this document text:\n\n{content}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_prompt_names_all_categories() {
        for label in [
            "invoice",
            "marketplace_listing_screenshot",
            "chat_screenshot",
            "website_screenshot",
            "other",
        ] {
            assert!(SYSTEM_PROMPT.contains(label), "missing {label}");
        }
    }

    #[test]
    fn text_instruction_embeds_content() {
        let prompt = text_instruction("INVOICE #123");
        assert!(prompt.starts_with("Please analyze this document text:"));
        assert!(prompt.ends_with("INVOICE #123"));
    }
}
