/// Longest transcript, in characters, sent to the model. Longer input is cut.
pub const MAX_TRANSCRIPT_CHARS: usize = 180_000;

/// Directive used when no summary instructions are configured.
pub const DEFAULT_INSTRUCTIONS: &str = "Write the summary in the language of the transcript. \
Use only information present in the transcript and write 'None' for empty sections.";

/// Build the meeting-summary prompt.
///
/// The transcript is cut to [`MAX_TRANSCRIPT_CHARS`]; instructions, when not
/// blank, follow the transcript block.
pub fn build_summary_prompt(transcript: &str, instructions: &str) -> String {
    let mut prompt = format!(
        "You are a meeting assistant.\n\
Produce:\n\
1) A short summary (3-5 sentences)\n\
2) Decisions / risks / owners\n\
3) Action items: who / what / deadline\n\
4) Open questions\n\
\n\
Transcript:\n\
\"\"\"{}\"\"\"",
        truncate_chars(transcript, MAX_TRANSCRIPT_CHARS)
    );

    if !instructions.trim().is_empty() {
        prompt.push_str("\nAdditional instructions:\n");
        prompt.push_str(instructions);
        prompt.push('\n');
    }

    prompt
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
