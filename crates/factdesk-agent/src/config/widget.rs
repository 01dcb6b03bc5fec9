//! Widget display configuration.
//!
//! The host supplies a [`PartialWidgetConfig`] with any subset of the five
//! recognised options.  [`WidgetConfig::merged`] overlays it on the built-in
//! defaults; the result is immutable for the life of the assistant.

use serde::{Deserialize, Serialize};

/// Default browser tab title.
pub const DEFAULT_PAGE_TITLE: &str = "Website Assistant";

/// Default heading shown above the input.
pub const DEFAULT_HEADER_TITLE: &str = "How can I help you?";

/// Default placeholder text for the question input.
pub const DEFAULT_INPUT_PLACEHOLDER: &str = "Ask about our products or services...";

/// Default label on the submit control.
pub const DEFAULT_SUBMIT_BUTTON_TEXT: &str = "Send";

/// Default text shown in the answer area before the first question.
pub const DEFAULT_INITIAL_ANSWER_TEXT: &str =
    "Hello! I can answer questions based on the information I have. How can I assist you today?";

/// The effective widget configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetConfig {
    pub page_title: String,
    pub header_title: String,
    pub input_placeholder: String,
    pub submit_button_text: String,
    pub initial_answer_text: String,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            page_title: DEFAULT_PAGE_TITLE.to_owned(),
            header_title: DEFAULT_HEADER_TITLE.to_owned(),
            input_placeholder: DEFAULT_INPUT_PLACEHOLDER.to_owned(),
            submit_button_text: DEFAULT_SUBMIT_BUTTON_TEXT.to_owned(),
            initial_answer_text: DEFAULT_INITIAL_ANSWER_TEXT.to_owned(),
        }
    }
}

impl WidgetConfig {
    /// Overlay `partial` on the defaults.
    ///
    /// Every option present in `partial` wins; every absent option keeps its
    /// default.
    pub fn merged(partial: &PartialWidgetConfig) -> Self {
        let defaults = Self::default();
        Self {
            page_title: pick(&partial.page_title, defaults.page_title),
            header_title: pick(&partial.header_title, defaults.header_title),
            input_placeholder: pick(&partial.input_placeholder, defaults.input_placeholder),
            submit_button_text: pick(&partial.submit_button_text, defaults.submit_button_text),
            initial_answer_text: pick(&partial.initial_answer_text, defaults.initial_answer_text),
        }
    }
}

impl From<PartialWidgetConfig> for WidgetConfig {
    fn from(partial: PartialWidgetConfig) -> Self {
        Self::merged(&partial)
    }
}

fn pick(supplied: &Option<String>, default: String) -> String {
    supplied.clone().unwrap_or(default)
}

/// Caller-supplied widget options.
///
/// Keys use the camelCase names hosts already know (`pageTitle`,
/// `headerTitle`, ...).  Unknown keys are ignored during deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialWidgetConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submit_button_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_answer_text: Option<String>,
}

// -------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------
