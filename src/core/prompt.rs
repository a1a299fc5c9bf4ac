//! Prompt text: the sticker template, structured prompt fields and the idea
//! request sent to the text model.

use serde::{Deserialize, Serialize};

/// Used by the generate step when the input is left empty.
pub const DEFAULT_PROMPT: &str = "a Shiba Inu wearing sunglasses, surfing";

/// Separator between non-empty [`PromptFields`] when combined.
pub const FIELD_SEPARATOR: &str = ", ";

/// Instruction sent to the text model when asking for a prompt idea.
pub const IDEA_REQUEST: &str = "Come up with a single, creative and fun sticker idea. \
Break it down into five parts: Who (the subject), What (what it is doing), \
When (the mood or time of day), Where (the setting) and Style (the art style). \
The idea should be whimsical and suit a cute sticker. Keep every field short \
and imaginative.";

/// Wrap a user prompt in the fixed sticker style.
pub fn sticker_prompt(prompt: &str) -> String {
    format!(
        "A cute sticker of {}, vector illustration, vibrant colors, with a distinct white border, on a simple light gray background.",
        prompt
    )
}

/// Edit instruction used by the style-transfer tab.
pub fn style_instruction(style: &str) -> String {
    format!("Transform this image into a {} style", style)
}

/// A prompt broken into five labelled parts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptFields {
    pub who: String,
    pub what: String,
    pub when: String,
    pub r#where: String,
    pub style: String,
}

/// Field identifiers in combination order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptField {
    Who,
    What,
    When,
    Where,
    Style,
}

impl PromptField {
    pub const ALL: [PromptField; 5] = [
        PromptField::Who,
        PromptField::What,
        PromptField::When,
        PromptField::Where,
        PromptField::Style,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PromptField::Who => "Who",
            PromptField::What => "What",
            PromptField::When => "When",
            PromptField::Where => "Where",
            PromptField::Style => "Style",
        }
    }

    pub fn hint(&self) -> &'static str {
        match self {
            PromptField::Who => "the subject, e.g. a sleepy panda",
            PromptField::What => "what it is doing, e.g. eating ramen",
            PromptField::When => "mood or time, e.g. a rainy evening",
            PromptField::Where => "the setting, e.g. a tiny kitchen",
            PromptField::Style => "art style, e.g. pastel watercolor",
        }
    }
}

impl PromptFields {
    pub fn get(&self, field: PromptField) -> &str {
        match field {
            PromptField::Who => &self.who,
            PromptField::What => &self.what,
            PromptField::When => &self.when,
            PromptField::Where => &self.r#where,
            PromptField::Style => &self.style,
        }
    }

    pub fn set(&mut self, field: PromptField, value: impl Into<String>) {
        let value = value.into();
        match field {
            PromptField::Who => self.who = value,
            PromptField::What => self.what = value,
            PromptField::When => self.when = value,
            PromptField::Where => self.r#where = value,
            PromptField::Style => self.style = value,
        }
    }

    /// Join the trimmed, non-empty fields in who, what, when, where, style
    /// order. Returns an empty string when every field is blank.
    pub fn combine(&self) -> String {
        PromptField::ALL
            .iter()
            .map(|f| self.get(*f).trim())
            .filter(|v| !v.is_empty())
            .collect::<Vec<_>>()
            .join(FIELD_SEPARATOR)
    }

    /// Fixed idea returned by the first magic fill of a session.
    pub fn placeholder() -> Self {
        Self {
            who: "a cute fox".to_string(),
            what: "wearing a birthday hat, holding a cake".to_string(),
            when: "a bright and cheerful mood".to_string(),
            r#where: "a clean white background".to_string(),
            style: "cartoon sticker style, white border, vector art".to_string(),
        }
    }
}

/// JSON schema handed to the text model so its reply parses as
/// [`PromptFields`].
pub fn idea_response_schema() -> serde_json::Value {
    let field = |description: &str| {
        serde_json::json!({ "type": "STRING", "description": description })
    };

    serde_json::json!({
        "type": "OBJECT",
        "properties": {
            "who": field("The main character or subject of the sticker."),
            "what": field("What the character is doing."),
            "when": field("The atmosphere, time of day, or mood."),
            "where": field("The setting or background."),
            "style": field("The artistic style of the sticker."),
        },
        "required": ["who", "what", "when", "where", "style"],
    })
}
