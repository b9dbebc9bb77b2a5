use serde_json::Value;

const ELLIPSIS: &str = "...";

/// Caps `text` at `max_chars` characters. Longer input is cut on a word
/// boundary when one is close by and ends with `...`, staying within the cap.
pub fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let ellipsis_len = ELLIPSIS.chars().count();
    if max_chars <= ellipsis_len {
        return text.chars().take(max_chars).collect();
    }

    let keep = max_chars - ellipsis_len;
    let byte_end = text
        .char_indices()
        .nth(keep)
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    let head = &text[..byte_end];

    let cut = head
        .rfind(char::is_whitespace)
        .filter(|&i| i >= byte_end * 3 / 4)
        .unwrap_or(byte_end);

    format!("{}{}", head[..cut].trim_end(), ELLIPSIS)
}

/// Pulls a human-readable message out of a JSON error body. Falls back to
/// the raw body, or `fallback` when the body is empty.
pub fn remote_error_message(body: &str, fallback: &str) -> String {
    let from_json = serde_json::from_str::<Value>(body).ok().and_then(|v| {
        let detail = v.get("detail");
        [
            detail.and_then(|d| d.get("message")),
            detail,
            v.get("message"),
            v.get("error").and_then(|e| e.get("message")),
            v.get("error"),
        ]
        .into_iter()
        .flatten()
        .find_map(|m| m.as_str().map(String::from))
    });

    match from_json {
        Some(message) => message,
        None if body.trim().is_empty() => fallback.to_string(),
        None => body.trim().to_string(),
    }
}

/// Splits a configured command line into program and arguments.
pub fn split_command(command: &str) -> Option<(&str, Vec<&str>)> {
    let mut parts = command.split_whitespace();
    let program = parts.next()?;
    Some((program, parts.collect()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_from_nested_detail() {
        let body = r#"{"detail":{"status":"quota_exceeded","message":"Out of credits"}}"#;
        assert_eq!(remote_error_message(body, "x"), "Out of credits");
    }

    #[test]
    fn error_message_from_flat_fields() {
        assert_eq!(remote_error_message(r#"{"message":"bad replica"}"#, "x"), "bad replica");
        assert_eq!(remote_error_message(r#"{"error":"nope"}"#, "x"), "nope");
        assert_eq!(remote_error_message("plain failure", "x"), "plain failure");
        assert_eq!(remote_error_message("", "fallback"), "fallback");
    }

    #[test]
    fn command_line_is_split() {
        let (program, args) = split_command("mpg123 -q -").unwrap();
        assert_eq!(program, "mpg123");
        assert_eq!(args, vec!["-q", "-"]);
        assert!(split_command("   ").is_none());
    }

    #[test]
    fn short_text_is_untouched() {
        assert_eq!(truncate_with_ellipsis("hello mama", 20), "hello mama");
    }

    #[test]
    fn long_text_ends_with_ellipsis_within_cap() {
        let text = "word ".repeat(100);
        let out = truncate_with_ellipsis(&text, 42);
        assert!(out.ends_with("..."));
        assert!(out.chars().count() <= 42);
    }

    #[test]
    fn multibyte_text_is_cut_on_char_boundary() {
        let text = "ü".repeat(50);
        let out = truncate_with_ellipsis(&text, 10);
        assert_eq!(out, format!("{}...", "ü".repeat(7)));
    }

    #[test]
    fn tiny_cap_has_no_room_for_ellipsis() {
        assert_eq!(truncate_with_ellipsis("abcdef", 2), "ab");
    }
}
