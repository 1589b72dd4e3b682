//! Default system prompts and user-prompt assembly for the text stages.
//!
//! A model config may carry its own system prompt and a user prompt
//! template; these constants are the fallback when it does not. The
//! storyboard prompt pins the model to the JSON shape the parser expects,
//! though the parser still tolerates deviation.

/// Placeholder substituted with the story outline in user prompt templates.
pub const OUTLINE_PLACEHOLDER: &str = "{story_outline}";

/// Fallback system prompt for script generation.
pub const DEFAULT_SCRIPT_SYSTEM_PROMPT: &str = "\
You are a professional short-video scriptwriter. Given a story outline, \
write a complete video script with a clear beginning, development, climax, \
and ending. Keep dialogue natural, describe settings concretely enough to \
drive later shot generation, and target a 3-5 minute runtime. Output the \
script text only, with no surrounding commentary.";

/// Fallback system prompt for storyboard generation.
pub const DEFAULT_STORYBOARD_SYSTEM_PROMPT: &str = "\
You are a professional storyboard artist. Break the given video script \
into individual shots. Each shot needs a clear visual description, any \
character action or dialogue, a camera framing note, and an estimated \
duration in seconds. Output a JSON array where every element is an object \
with the fields \"sequence_number\" (integer, starting at 1), \"content\" \
(string), and \"duration\" (number, seconds). Output strictly the JSON \
array and nothing else.";

/// Build the user prompt for script generation.
///
/// When the config provides a template, every occurrence of
/// [`OUTLINE_PLACEHOLDER`] is replaced with the outline; otherwise a
/// default framing is used.
pub fn build_script_prompt(outline: &str, template: Option<&str>) -> String {
    match template {
        Some(template) => template.replace(OUTLINE_PLACEHOLDER, outline),
        None => format!(
            "Story outline:\n{outline}\n\nWrite the complete video script for this outline."
        ),
    }
}

/// Build the user prompt for storyboard generation from a script.
pub fn build_storyboard_prompt(script: &str) -> String {
    format!("Video script:\n{script}\n\nBreak this script into a detailed shot-by-shot storyboard.")
}
