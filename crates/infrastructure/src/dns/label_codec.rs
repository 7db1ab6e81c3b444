//! Turns free text into DNS-legal query names.
//!
//! Labels only ever contain `[a-z0-9-]`, so byte length equals character
//! length once a string has passed through [`sanitize`].

use dnschat_domain::LabelMode;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Longest label permitted by RFC 1035 §2.3.4.
pub const MAX_LABEL_LEN: usize = 63;

/// Substituted when sanitising leaves nothing behind.
pub const FALLBACK_LABEL: &str = "prompt";

/// Sanitises `input` into a single label of at most 63 bytes.
///
/// Never returns an empty string.
pub fn sanitize(input: &str) -> String {
    let mut label = normalize(input);
    if label.is_empty() {
        return FALLBACK_LABEL.to_string();
    }
    if label.len() > MAX_LABEL_LEN {
        label.truncate(MAX_LABEL_LEN);
        // Truncation may land right after a separator.
        let trimmed = label.trim_end_matches('-').len();
        label.truncate(trimmed);
    }
    label
}

/// Splits `input` into consecutive slices of at most 63 bytes.
///
/// Slices end on character boundaries; concatenating them yields `input`.
pub fn chunk(input: &str) -> Vec<String> {
    chunk_with(input, MAX_LABEL_LEN)
}

fn chunk_with(input: &str, max_len: usize) -> Vec<String> {
    let mut chunks = Vec::with_capacity(input.len() / max_len + 1);
    let mut current = String::with_capacity(max_len);

    for ch in input.chars() {
        if !current.is_empty() && current.len() + ch.len_utf8() > max_len {
            chunks.push(std::mem::take(&mut current));
        }
        current.push(ch);
    }
    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

/// Builds the multi-label query name for a chat message.
///
/// The sanitised message comes first, followed by the sanitised conversation
/// id; an id that sanitises to nothing is left out. The composite is split
/// into labels of at most 63 bytes joined with `.`. Only a `-` that lands on
/// a label boundary is dropped; every other character is kept.
pub fn build_query_label(message: &str, conversation_id: &str) -> String {
    let mut composite = normalize(message);
    if composite.is_empty() {
        composite.push_str(FALLBACK_LABEL);
    }

    let conversation = normalize(conversation_id);
    if !conversation.is_empty() {
        composite.push('-');
        composite.push_str(&conversation);
    }

    split_labels(&composite).join(".")
}

/// Splits a normalised name into hostname-legal labels: none empty, none
/// longer than 63 bytes, none starting or ending with `-`.
fn split_labels(name: &str) -> Vec<String> {
    chunk(name)
        .into_iter()
        .map(|label| label.trim_matches('-').to_string())
        .filter(|label| !label.is_empty())
        .collect()
}

/// Legacy encoding: the sanitised message as one label.
///
/// Lossy by construction. Anything past 63 bytes is cut off and the
/// conversation id is not transmitted at all.
pub fn build_single_label(message: &str) -> String {
    sanitize(message)
}

/// Query name for `message` under the configured [`LabelMode`].
pub fn encode_question(mode: LabelMode, message: &str, conversation_id: &str) -> String {
    match mode {
        LabelMode::Chunked => build_query_label(message, conversation_id),
        // Truncates long prompts; see `build_single_label`.
        LabelMode::SingleLabel => build_single_label(message),
    }
}

/// Fold accents (NFKD, combining marks dropped), lower-case, whitespace to
/// `-`, drop anything outside `[a-z0-9-]`, collapse separator runs and trim
/// them at both ends. No length limit.
fn normalize(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending_separator = false;

    let folded = input.nfkd().filter(|ch| !is_combining_mark(*ch));
    for ch in folded.flat_map(char::to_lowercase) {
        if ch.is_whitespace() || ch == '-' {
            pending_separator = true;
        } else if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_separator && !out.is_empty() {
                out.push('-');
            }
            pending_separator = false;
            out.push(ch);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_basic() {
        assert_eq!(sanitize("Hello World"), "hello-world");
        assert_eq!(sanitize("  What's   the time?  "), "whats-the-time");
    }

    #[test]
    fn test_sanitize_collapses_separators() {
        assert_eq!(sanitize("a -- b"), "a-b");
        assert_eq!(sanitize("a ! b"), "a-b");
        assert_eq!(sanitize("---x---"), "x");
    }

    #[test]
    fn test_sanitize_fallback() {
        assert_eq!(sanitize(""), "prompt");
        assert_eq!(sanitize("?!?"), "prompt");
        assert_eq!(sanitize("   "), "prompt");
    }

    #[test]
    fn test_sanitize_truncates_to_label_limit() {
        let long = "a".repeat(200);
        assert_eq!(sanitize(&long).len(), MAX_LABEL_LEN);
    }

    #[test]
    fn test_sanitize_never_ends_with_separator_after_truncation() {
        let input = format!("{} b", "a".repeat(62));
        let label = sanitize(&input);
        assert_eq!(label, "a".repeat(62));
    }

    #[test]
    fn test_chunk_reconstructs_input() {
        let input = "x".repeat(130);
        let chunks = chunk(&input);
        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.len() <= MAX_LABEL_LEN));
        assert_eq!(chunks.concat(), input);
    }

    #[test]
    fn test_chunk_respects_char_boundaries() {
        let input = "é".repeat(40);
        let chunks = chunk(&input);
        assert!(chunks.iter().all(|c| c.len() <= MAX_LABEL_LEN));
        assert_eq!(chunks.concat(), input);
    }

    #[test]
    fn test_chunk_empty() {
        assert!(chunk("").is_empty());
    }

    #[test]
    fn test_build_query_label_joins_message_and_conversation() {
        assert_eq!(build_query_label("Hi there", "Conv 42"), "hi-there-conv-42");
        assert_eq!(build_query_label("Hi there", ""), "hi-there");
        assert_eq!(build_query_label("", "c1"), "prompt-c1");
    }

    #[test]
    fn test_separator_on_label_boundary_is_dropped() {
        let message = format!("{} b", "a".repeat(63));
        assert_eq!(build_query_label(&message, ""), format!("{}.b", "a".repeat(63)));

        let message = format!("{} b", "a".repeat(62));
        assert_eq!(build_query_label(&message, ""), format!("{}.b", "a".repeat(62)));
    }

    #[test]
    fn test_build_query_label_segments_long_messages() {
        let message = "word ".repeat(40);
        let label = build_query_label(&message, "abc");
        let parts: Vec<&str> = label.split('.').collect();
        assert!(parts.len() > 1);
        assert!(parts.iter().all(|p| !p.is_empty() && p.len() <= MAX_LABEL_LEN));
        assert!(parts.concat().ends_with("-abc"));
    }

    #[test]
    fn test_single_label_mode_truncates() {
        let message = "z".repeat(100);
        let label = encode_question(LabelMode::SingleLabel, &message, "conv");
        assert_eq!(label, "z".repeat(MAX_LABEL_LEN));
    }
}
