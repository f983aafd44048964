//! Outbound encoding.
//!
//! Clients are plain telnet terminals, so text goes out as single-byte
//! Latin-1. Characters outside that range have no byte to map to and are
//! sent as `?`.

/// Appended to every outbound line.
///
/// Newline first, then carriage return.
pub const LINE_TERMINATOR: &str = "\n\r";

/// Encodes `text` as one Latin-1 line, terminator included.
pub fn encode_line(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len() + LINE_TERMINATOR.len());
    out.extend(text.chars().map(latin1_byte));
    out.extend_from_slice(LINE_TERMINATOR.as_bytes());
    out
}

fn latin1_byte(c: char) -> u8 {
    u8::try_from(u32::from(c)).unwrap_or(b'?')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_line_appends_terminator() {
        assert_eq!(encode_line("What is your name?"), b"What is your name?\n\r");
    }

    #[test]
    fn test_encode_line_empty_text_is_just_terminator() {
        assert_eq!(encode_line(""), b"\n\r");
    }

    #[test]
    fn test_encode_line_latin1_characters_are_single_bytes() {
        assert_eq!(encode_line("café"), vec![b'c', b'a', b'f', 0xE9, b'\n', b'\r']);
    }

    #[test]
    fn test_encode_line_wide_characters_become_question_marks() {
        assert_eq!(encode_line("a→b"), b"a?b\n\r");
    }
}
