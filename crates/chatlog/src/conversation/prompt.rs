//! Prompt formatting from stored history.

/// Compose the prompt for the reply generator.
///
/// `history` is newest-first, exactly as the store returns it; the prompt lists
/// it oldest-first so the dialogue reads top to bottom.
pub fn build_prompt<S: AsRef<str>>(history: &[S], current: &str) -> String {
    let mut prompt = String::from("Conversation history:\n");
    for line in history.iter().rev() {
        prompt.push_str(line.as_ref());
        prompt.push('\n');
    }
    prompt.push_str("\nUser: ");
    prompt.push_str(current);
    prompt.push_str("\nAssistant:");
    prompt
}
