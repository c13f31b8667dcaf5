//! Conversation title derivation.

/// Derive a conversation title from the first redacted user message.
///
/// The title is `prefix` + the first `max_chars` characters of `text`, with
/// an ellipsis marker appended when the text was truncated. Computed once
/// at creation and never recomputed.
pub fn derive_title(text: &str, prefix: &str, max_chars: usize) -> String {
    let mut title = String::from(prefix);
    let char_count = text.chars().count();
    if char_count > max_chars {
        title.extend(text.chars().take(max_chars));
        title.push_str("...");
    } else {
        title.push_str(text);
    }
    title
}
