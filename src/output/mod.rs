// Output formatting: terminal summaries of each analysis.

pub mod terminal;

/// Truncate a string to at most `max_chars` characters, appending "..." if truncated.
///
/// Counts characters rather than bytes, so multi-byte labels never split.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_chars).collect();
        format!("{truncated}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_multibyte_label() {
        assert_eq!(truncate_chars("café crème", 4), "café...");
        assert_eq!(truncate_chars("short", 10), "short");
    }
}
