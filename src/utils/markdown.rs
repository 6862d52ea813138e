/// Utility functions for handling Telegram MarkdownV2 formatting
///
/// MarkdownV2 requires escaping of special characters to prevent formatting issues.
/// Escapes markdown special characters for MarkdownV2 parsing mode
///
/// # Example
/// ```
/// use playroom_booking_bot::utils::markdown::escape_markdown;
///
/// let text = "Reserved for 2024-06-01 at 14:00!";
/// let escaped = escape_markdown(text);
/// assert_eq!(escaped, "Reserved for 2024\\-06\\-01 at 14:00\\!");
/// ```
pub fn escape_markdown(text: &str) -> String {
    const SPECIAL: &[char] = &[
        '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!', '\\',
    ];

    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if SPECIAL.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_basic_markdown() {
        assert_eq!(escape_markdown("Hello *world*"), "Hello \\*world\\*");
        assert_eq!(escape_markdown("_italic_"), "\\_italic\\_");
    }

    #[test]
    fn test_escape_reservation_text() {
        let input = "Reservation for 2024-06-01 at 14:00 (pending).";
        let expected = "Reservation for 2024\\-06\\-01 at 14:00 \\(pending\\)\\.";
        assert_eq!(escape_markdown(input), expected);
    }

    #[test]
    fn test_escape_backslash() {
        assert_eq!(escape_markdown("a\\b"), "a\\\\b");
    }

    #[test]
    fn test_escape_empty_and_plain_text() {
        assert_eq!(escape_markdown(""), "");
        assert_eq!(escape_markdown("plain text 10:00"), "plain text 10:00");
    }
}
