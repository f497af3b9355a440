//! Named prompt profiles: the system instruction and sampling parameters used
//! for one flavour of analysis.

use crate::analysis::AnalysisRequest;
use crate::types::openai::{ChatCompletionRequest, ChatMessage, ResponseFormat};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const ECO_LENS: &str = "eco-lens";
pub const CATEGORY_EXPERT: &str = "category-expert";

const ECO_LENS_PROMPT: &str = include_str!("../prompts/eco_lens.txt");
const CATEGORY_EXPERT_PROMPT: &str = include_str!("../prompts/category_expert.txt");

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct PromptProfile {
    pub system_prompt: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    /// Send `response_format: {"type": "json_object"}`.
    #[serde(default = "default_json_mode")]
    pub json_mode: bool,
    /// Overrides `upstream.model` for this profile.
    #[serde(default)]
    pub model: Option<String>,
}

fn default_temperature() -> f64 {
    0.3
}

fn default_json_mode() -> bool {
    true
}

impl PromptProfile {
    /// Build the upstream request: system message, then the user message.
    pub fn build_request(&self, default_model: &str, input: &AnalysisRequest) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self
                .model
                .clone()
                .unwrap_or_else(|| default_model.to_string()),
            messages: vec![
                ChatMessage::system(self.system_prompt.clone()),
                ChatMessage::user(user_prompt(input)),
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            response_format: self.json_mode.then(ResponseFormat::json_object),
        }
    }
}

/// Product fields are interpolated verbatim.
pub fn user_prompt(input: &AnalysisRequest) -> String {
    format!(
        "Product: {}\nDescription/Ingredients: {}",
        input.product_name, input.ingredients_text
    )
}

/// Profiles compiled into the binary. Config entries with the same name replace them.
pub fn builtin_profiles() -> HashMap<String, PromptProfile> {
    HashMap::from([
        (
            ECO_LENS.to_string(),
            PromptProfile {
                system_prompt: ECO_LENS_PROMPT.to_string(),
                temperature: 0.5,
                max_tokens: Some(800),
                json_mode: true,
                model: None,
            },
        ),
        (
            CATEGORY_EXPERT.to_string(),
            PromptProfile {
                system_prompt: CATEGORY_EXPERT_PROMPT.to_string(),
                temperature: 0.2,
                max_tokens: Some(1000),
                json_mode: true,
                model: None,
            },
        ),
    ])
}
