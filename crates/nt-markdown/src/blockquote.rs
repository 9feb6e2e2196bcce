//! Trailing blockquote ("comment") extraction.

/// If the last contiguous blockquote block of `text` is preceded by a blank
/// line and is not an attribution line (starting with `—` or `--`), split
/// it off and return `(remaining_body, Some(comment))`. Otherwise, returns
/// `(text, None)` unchanged.
pub fn extract_trailing_comment(text: &str) -> (String, Option<String>) {
    let lines: Vec<&str> = text.lines().collect();

    let mut end = lines.len();
    while end > 0 && lines[end - 1].trim().is_empty() {
        end -= 1;
    }
    if end == 0 {
        return (text.to_string(), None);
    }

    let mut start = end;
    while start > 0 && lines[start - 1].trim_start().starts_with('>') {
        start -= 1;
    }
    if start == end {
        return (text.to_string(), None);
    }

    let preceded_by_blank = start == 0 || lines[start - 1].trim().is_empty();
    if !preceded_by_blank {
        return (text.to_string(), None);
    }

    let first_content = lines[start]
        .trim_start()
        .trim_start_matches('>')
        .trim_start();
    if first_content.starts_with('\u{2014}') || first_content.starts_with("--") {
        return (text.to_string(), None);
    }

    let comment = lines[start..end]
        .iter()
        .map(|l| l.trim_start().trim_start_matches('>').trim_start())
        .collect::<Vec<_>>()
        .join("\n");

    let remaining_end = if start > 0 { start - 1 } else { 0 };
    let remaining = lines[..remaining_end].join("\n");

    (remaining, Some(comment))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_trailing_blockquote() {
        let text = "Some body text.\n\n> A quoted comment.\n> second line.";
        let (body, comment) = extract_trailing_comment(text);
        assert_eq!(body.trim(), "Some body text.");
        assert_eq!(comment.unwrap(), "A quoted comment.\nsecond line.");
    }

    #[test]
    fn no_trailing_blockquote() {
        let text = "Just plain text.";
        let (body, comment) = extract_trailing_comment(text);
        assert_eq!(body, text);
        assert!(comment.is_none());
    }

    #[test]
    fn attribution_line_is_not_extracted() {
        let text = "Body.\n\n> -- Some Author";
        let (body, comment) = extract_trailing_comment(text);
        assert_eq!(body, text);
        assert!(comment.is_none());
    }

    #[test]
    fn blockquote_not_preceded_by_blank_is_not_extracted() {
        let text = "Body.\n> not a comment";
        let (body, comment) = extract_trailing_comment(text);
        assert_eq!(body, text);
        assert!(comment.is_none());
    }
}
