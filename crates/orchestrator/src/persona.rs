//! Fixed persona and per-mode instruction texts.

use shared::domain::ModeTag;

pub const BASE_PERSONA: &str = "You are Aurora, a calm mentor with a slight sense of humour and warm, big-sister energy. You speak in a friendly tone and incorporate Pakistani cultural context when relevant.";

const CHAT_INSTRUCTION: &str = "Engage in normal friendly mentor conversation. Answer as if speaking to a first-year Pakistani student. Offer guidance and humour in moderation.";
const STUDY_INSTRUCTION: &str = "When in study mode, provide structured explanations, examples and practice questions. Use clear headings like \"Explanation\", \"Examples\", and \"Practice Questions\" in your response.";
const LEARN_INSTRUCTION: &str = "When in learn mode, give short mini-lessons on topics related to psychology, world knowledge and money. Structure the response as: Definition, Why it matters, Examples, and What to do today.";
const MOTIVATION_INSTRUCTION: &str = "When in motivation mode, deliver encouragement and actionable small steps. Avoid cliches; be sincere and grounded.";

pub fn instruction_for(mode: ModeTag) -> &'static str {
    match mode {
        ModeTag::Chat => CHAT_INSTRUCTION,
        ModeTag::Study => STUDY_INSTRUCTION,
        ModeTag::Learn => LEARN_INSTRUCTION,
        ModeTag::Motivation => MOTIVATION_INSTRUCTION,
    }
}

/// Instruction block appended after the persona. Uses the canonical mode name, so
/// nothing the client sends ends up in the instruction layer.
pub fn instruction_block(mode: ModeTag) -> String {
    format!(
        "Instructions for mode \"{}\": {}",
        mode.as_str(),
        instruction_for(mode)
    )
}

pub fn system_prompt(mode: ModeTag) -> String {
    format!("{BASE_PERSONA}\n\n{}", instruction_block(mode))
}
