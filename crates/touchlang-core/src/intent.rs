#![forbid(unsafe_code)]

//! Intent and response tables.
//!
//! A classified gesture means different things in different contexts. This
//! module maps `(kind, context)` to a short intent label, to a canned
//! response payload, and to the prompt text handed to a response service.
//!
//! # Lookup order
//!
//! - Intents: context table, then the general table, then
//!   [`FALLBACK_INTENT`].
//! - Responses: context table, then the default table, then a generated
//!   neutral payload naming the gesture and context.
//!
//! Keys are canonical gesture tags (see [`GestureKind`]'s `Display`), so a
//! table entry like `swipe-right-medium` never matches `swipe-right-fast`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::context::Context;
use crate::gesture::{GestureClassification, GestureKind};

/// Label used when no table has an entry for the gesture.
pub const FALLBACK_INTENT: &str = "Gesture recognized";

type IntentTable = &'static [(&'static str, &'static str)];

const WRITING_INTENTS: IntentTable = &[
    ("swipe-right-medium", "Suggest next sentence"),
    ("swipe-right-fast", "Auto-complete paragraph"),
    ("swipe-left-medium", "Undo last edit"),
    ("swipe-left-fast", "Revert to previous version"),
    ("tap-medium", "Accept suggestion"),
    ("double-tap-medium", "Reject suggestion"),
    ("circle-clockwise", "Expand on this idea"),
    ("circle-counter-clockwise", "Simplify language"),
    ("2f-tap", "Show writing options"),
    ("long-press-medium", "Start voice dictation"),
];

const BRAINSTORMING_INTENTS: IntentTable = &[
    ("swipe-right-medium", "Next idea"),
    ("swipe-left-medium", "Previous idea"),
    ("tap-medium", "Rate this idea"),
    ("tap-heavy", "Love this idea!"),
    ("circle-clockwise", "Generate variations"),
    ("circle-counter-clockwise", "Merge ideas"),
    ("2f-swipe-up", "Expand idea cluster"),
    ("2f-swipe-down", "Collapse idea cluster"),
    ("double-tap-medium", "Mark as favorite"),
    ("long-press-medium", "Deep dive into concept"),
];

const LEARNING_INTENTS: IntentTable = &[
    ("swipe-up-medium", "Go deeper / More detail"),
    ("swipe-up-fast", "Show expert level"),
    ("swipe-down-medium", "Simplify explanation"),
    ("swipe-down-fast", "ELI5 mode"),
    ("swipe-right-medium", "Next topic"),
    ("swipe-left-medium", "Previous topic"),
    ("tap-medium", "I understand"),
    ("double-tap-medium", "Show examples"),
    ("circle-clockwise", "Show related concepts"),
    ("long-press-medium", "Quiz me on this"),
    ("3f-tap", "Show concept map"),
];

const DECISION_INTENTS: IntentTable = &[
    ("swipe-left-medium", "Show pros"),
    ("swipe-right-medium", "Show cons"),
    ("tap-medium", "Compare options"),
    ("double-tap-medium", "Final decision"),
    ("circle-clockwise", "Show alternatives"),
    ("long-press-medium", "Deep analysis"),
    ("2f-swipe-left", "Option A"),
    ("2f-swipe-right", "Option B"),
    ("swipe-up-medium", "Show impact"),
    ("swipe-down-medium", "Show risks"),
];

const GENERAL_INTENTS: IntentTable = &[
    ("tap-medium", "Yes / Acknowledge"),
    ("tap-light", "Maybe / Soft yes"),
    ("tap-heavy", "Definitely yes!"),
    ("double-tap-medium", "No / Cancel"),
    ("long-press-medium", "Start listening"),
    ("long-press-heavy", "Deep focus mode"),
    ("swipe-right-medium", "Next / Continue"),
    ("swipe-left-medium", "Previous / Go back"),
    ("swipe-up-medium", "More / Expand"),
    ("swipe-down-medium", "Less / Minimize"),
    ("circle-clockwise", "Show options"),
    ("circle-counter-clockwise", "Cycle contexts"),
    ("2f-tap", "Menu"),
    ("3f-tap", "Settings"),
    ("2f-swipe-up", "Help"),
    ("2f-swipe-down", "Close"),
];

fn intent_table(context: Context) -> IntentTable {
    match context {
        Context::Writing => WRITING_INTENTS,
        Context::Brainstorming => BRAINSTORMING_INTENTS,
        Context::Learning => LEARNING_INTENTS,
        Context::Decision => DECISION_INTENTS,
        Context::General => GENERAL_INTENTS,
    }
}

fn lookup<T: Copy>(table: &[(&'static str, T)], tag: &str) -> Option<T> {
    table.iter().find(|(key, _)| *key == tag).map(|(_, v)| *v)
}

/// Map a gesture to its intent label in `context`.
#[must_use]
pub fn resolve_intent(kind: &GestureKind, context: Context) -> &'static str {
    let tag = kind.to_string();
    lookup(intent_table(context), &tag)
        .or_else(|| lookup(GENERAL_INTENTS, &tag))
        .unwrap_or(FALLBACK_INTENT)
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// Tone attached to a response. Drives the reply haptic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Helpful,
    #[default]
    Neutral,
    Creative,
    Excited,
    Joyful,
    Educational,
    Friendly,
    Analytical,
    Confident,
    Attentive,
    Curious,
}

impl Emotion {
    /// Lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Helpful => "helpful",
            Self::Neutral => "neutral",
            Self::Creative => "creative",
            Self::Excited => "excited",
            Self::Joyful => "joyful",
            Self::Educational => "educational",
            Self::Friendly => "friendly",
            Self::Analytical => "analytical",
            Self::Confident => "confident",
            Self::Attentive => "attentive",
            Self::Curious => "curious",
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text, tone, and follow-up options for one reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponsePayload {
    pub text: String,
    pub emotion: Emotion,
    #[serde(default)]
    pub options: Vec<String>,
}

#[derive(Clone, Copy)]
struct CannedResponse {
    text: &'static str,
    emotion: Emotion,
    options: &'static [&'static str],
}

impl CannedResponse {
    const fn new(text: &'static str, emotion: Emotion, options: &'static [&'static str]) -> Self {
        Self {
            text,
            emotion,
            options,
        }
    }

    fn to_payload(self) -> ResponsePayload {
        ResponsePayload {
            text: self.text.to_string(),
            emotion: self.emotion,
            options: self.options.iter().map(|s| (*s).to_string()).collect(),
        }
    }
}

type ResponseTable = &'static [(&'static str, CannedResponse)];

const WRITING_RESPONSES: ResponseTable = &[
    (
        "swipe-right-medium",
        CannedResponse::new(
            "📝 \"The concept evolved naturally, building upon the foundation we established...\"",
            Emotion::Helpful,
            &["Continue", "Rephrase", "Expand"],
        ),
    ),
    (
        "swipe-left-medium",
        CannedResponse::new(
            "↶ Undid last edit. Previous version restored.",
            Emotion::Neutral,
            &[],
        ),
    ),
    (
        "circle-clockwise",
        CannedResponse::new(
            "💡 Here are 3 ways to expand this:\n1. Add examples\n2. Include data\n3. Show contrasts",
            Emotion::Creative,
            &["Option 1", "Option 2", "Option 3"],
        ),
    ),
];

const BRAINSTORMING_RESPONSES: ResponseTable = &[
    (
        "circle-clockwise",
        CannedResponse::new(
            "🌟 Generated 5 variations of your idea! Swipe to explore each one.",
            Emotion::Excited,
            &[
                "Variation 1",
                "Variation 2",
                "Variation 3",
                "Variation 4",
                "Variation 5",
            ],
        ),
    ),
    (
        "tap-heavy",
        CannedResponse::new(
            "❤️ Added to favorites! This idea has great potential!",
            Emotion::Joyful,
            &[],
        ),
    ),
];

const LEARNING_RESPONSES: ResponseTable = &[
    (
        "swipe-up-medium",
        CannedResponse::new(
            "🎓 Going deeper: This concept connects to advanced principles in...",
            Emotion::Educational,
            &["Show details", "Examples", "Quiz me"],
        ),
    ),
    (
        "swipe-down-medium",
        CannedResponse::new(
            "🌱 Simplified: Think of it like making a sandwich - each layer adds to the whole!",
            Emotion::Friendly,
            &["Good analogy!", "More examples", "I get it"],
        ),
    ),
];

const DECISION_RESPONSES: ResponseTable = &[
    (
        "swipe-left-medium",
        CannedResponse::new(
            "✅ Pros:\n• Cost effective\n• Quick implementation\n• Low risk",
            Emotion::Analytical,
            &["Show cons", "Compare", "Decide"],
        ),
    ),
    (
        "double-tap-medium",
        CannedResponse::new(
            "🎯 Decision recorded! Based on analysis, this is a strong choice.",
            Emotion::Confident,
            &[],
        ),
    ),
];

const DEFAULT_RESPONSES: ResponseTable = &[
    ("tap-medium", CannedResponse::new("✓ Acknowledged", Emotion::Neutral, &[])),
    ("tap-heavy", CannedResponse::new("💪 Strong agreement!", Emotion::Joyful, &[])),
    ("double-tap-medium", CannedResponse::new("✗ Cancelled", Emotion::Neutral, &[])),
    ("long-press-medium", CannedResponse::new("🎤 Listening...", Emotion::Attentive, &[])),
    (
        "swipe-right-medium",
        CannedResponse::new("→ Moving forward", Emotion::Neutral, &["Continue", "Stop"]),
    ),
    ("swipe-left-medium", CannedResponse::new("← Going back", Emotion::Neutral, &[])),
    ("swipe-up-medium", CannedResponse::new("↑ Showing more details", Emotion::Helpful, &[])),
    ("swipe-down-medium", CannedResponse::new("↓ Showing summary", Emotion::Helpful, &[])),
    (
        "circle-clockwise",
        CannedResponse::new(
            "⭕ Exploring options...",
            Emotion::Curious,
            &["Option A", "Option B", "Option C"],
        ),
    ),
    (
        "circle-counter-clockwise",
        CannedResponse::new("🔄 Cycling through contexts", Emotion::Neutral, &[]),
    ),
];

fn response_table(context: Context) -> ResponseTable {
    match context {
        Context::Writing => WRITING_RESPONSES,
        Context::Brainstorming => BRAINSTORMING_RESPONSES,
        Context::Learning => LEARNING_RESPONSES,
        Context::Decision => DECISION_RESPONSES,
        Context::General => &[],
    }
}

/// Canned response for a gesture in `context`.
#[must_use]
pub fn resolve_response(kind: &GestureKind, context: Context) -> ResponsePayload {
    let tag = kind.to_string();
    match lookup(response_table(context), &tag).or_else(|| lookup(DEFAULT_RESPONSES, &tag)) {
        Some(canned) => canned.to_payload(),
        None => ResponsePayload {
            text: format!("Gesture \"{tag}\" detected in {context} mode"),
            emotion: Emotion::Neutral,
            options: Vec::new(),
        },
    }
}

// ---------------------------------------------------------------------------
// Prompts
// ---------------------------------------------------------------------------

const FAMILY_PROMPTS: &[(&str, &str)] = &[
    (
        "tap",
        "The user tapped once (acknowledgment/yes). Respond briefly and positively.",
    ),
    (
        "double-tap",
        "The user double-tapped (cancel/no). Acknowledge their choice briefly.",
    ),
    (
        "long-press",
        "The user long-pressed (deep focus/listening mode). Ask them what's on their mind or offer to help.",
    ),
    (
        "swipe-right",
        "The user swiped right (next/continue). Move forward or suggest the next step.",
    ),
    (
        "swipe-left",
        "The user swiped left (previous/back). Go back or offer an alternative.",
    ),
    (
        "swipe-up",
        "The user swiped up (more/expand). Provide more detail or expand on the topic.",
    ),
    (
        "swipe-down",
        "The user swiped down (less/minimize). Provide a brief summary or simplify.",
    ),
    (
        "multi-touch",
        "The user used multiple fingers (menu/options). Offer them choices or options.",
    ),
];

/// Prompt text describing a gesture for a response service.
#[must_use]
pub fn intent_prompt(
    classification: &GestureClassification,
    context: Context,
    label: &str,
) -> String {
    let family = classification.kind.family();
    let base = match lookup(FAMILY_PROMPTS, &family) {
        Some(prompt) => prompt.to_string(),
        None => format!(
            "The user performed a {} gesture. Respond appropriately.",
            classification.kind
        ),
    };
    format!("{base} Context: {context} mode. Intent: {label}.")
}
