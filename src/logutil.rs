//! Log helpers for quest free text.

/// Longest stretch of quest text echoed into one log line.
pub const MAX_PREVIEW: usize = 120;

/// Render quest text (names, quit text, NPC failure reasons) as one log line.
///
/// Text blocks in the record file may span several lines, so line breaks and
/// tabs are shown as their escapes, backslashes are doubled and any other
/// control character becomes `\xNN`. Text past [`MAX_PREVIEW`] characters is
/// cut and marked with an ellipsis.
pub fn escape_log(s: &str) -> String {
    let mut out = String::with_capacity(s.len().min(MAX_PREVIEW) + 8);
    let mut chars = s.chars();
    for ch in chars.by_ref().take(MAX_PREVIEW) {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\x{:02X}", c as u32)),
            c => out.push(c),
        }
    }
    if chars.next().is_some() {
        out.push('…');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_multiline_quest_text() {
        let esc = escape_log("Bring me\nthe head\r\tof the rat king");
        assert_eq!(esc, "Bring me\\nthe head\\r\\tof the rat king");
    }

    #[test]
    fn control_characters_and_backslashes() {
        assert_eq!(escape_log("a\\b\u{7}"), "a\\\\b\\x07");
    }

    #[test]
    fn truncates_long_blocks() {
        let long = "x".repeat(MAX_PREVIEW + 10);
        let esc = escape_log(&long);
        assert_eq!(esc.chars().count(), MAX_PREVIEW + 1);
        assert!(esc.ends_with('…'));

        let exact = "y".repeat(MAX_PREVIEW);
        assert_eq!(escape_log(&exact), exact);
    }
}
