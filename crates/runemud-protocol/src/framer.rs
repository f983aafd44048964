//! Byte-to-line framing for telnet clients.
//!
//! A telnet client interleaves ordinary text with control sequences that
//! start with the "interpret as command" byte (`IAC`, 255). We do not take
//! part in option negotiation; every control sequence is consumed and
//! dropped, and only the text around it reaches the game.
//!
//! The framer keeps its state between calls, so a control sequence or a
//! line may be split across any number of reads.

/// Interpret as command: starts every control sequence.
const IAC: u8 = 255;
/// Subnegotiation begin.
const SB: u8 = 250;
/// Subnegotiation end.
const SE: u8 = 240;
const WILL: u8 = 251;
const WONT: u8 = 252;
const DO: u8 = 253;
const DONT: u8 = 254;

const BACKSPACE: u8 = 0x08;
const NEWLINE: u8 = b'\n';

/// Longest pending line kept by [`TelnetFramer::new`], in characters.
pub const DEFAULT_MAX_LINE_LEN: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum State {
    /// Ordinary text.
    #[default]
    Normal,
    /// Saw `IAC`. When `expect_option` is set, the previous byte was one of
    /// WILL/WONT/DO/DONT and the next byte is the option id.
    InControlSequence { expect_option: bool },
    /// Inside `IAC SB ...`; everything up to `SE` is dropped.
    InOptionNegotiation,
}

/// Per-connection decoder from raw bytes to text lines.
///
/// ```
/// use runemud_protocol::TelnetFramer;
///
/// let mut framer = TelnetFramer::new();
/// // "lo" + IAC AYT + "ok\n"
/// let lines = framer.feed(&[b'l', b'o', 255, 246, b'o', b'k', b'\n']);
/// assert_eq!(lines, vec!["look"]);
/// ```
#[derive(Debug, Clone)]
pub struct TelnetFramer {
    state: State,
    line: String,
    line_len: usize,
    max_line_len: usize,
    overflowed: bool,
}

impl TelnetFramer {
    /// Creates a framer with the default line length cap.
    pub fn new() -> Self {
        Self::with_max_line_len(DEFAULT_MAX_LINE_LEN)
    }

    /// Creates a framer that keeps at most `max` characters of a pending
    /// line. Characters past the cap are dropped until the next newline.
    pub fn with_max_line_len(max: usize) -> Self {
        Self {
            state: State::Normal,
            line: String::new(),
            line_len: 0,
            max_line_len: max.max(1),
            overflowed: false,
        }
    }

    /// Feeds a chunk of bytes and returns every line it completed, in order.
    ///
    /// Lines are returned without the trailing newline. Bytes are decoded
    /// as Latin-1, one byte per character.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<String> {
        let mut lines = Vec::new();
        for &byte in bytes {
            if let Some(line) = self.step(byte) {
                lines.push(line);
            }
        }
        lines
    }

    /// The partially received line, if any.
    pub fn pending(&self) -> &str {
        &self.line
    }

    fn step(&mut self, byte: u8) -> Option<String> {
        match self.state {
            State::Normal => return self.text_byte(byte),
            State::InControlSequence {
                expect_option: true,
            } => {
                // The option id itself; nothing to do with it.
                self.state = State::Normal;
            }
            State::InControlSequence {
                expect_option: false,
            } => {
                self.state = match byte {
                    SB => State::InOptionNegotiation,
                    WILL | WONT | DO | DONT => State::InControlSequence {
                        expect_option: true,
                    },
                    // Single-byte command (AYT, NOP, GA, escaped IAC, ...).
                    _ => State::Normal,
                };
            }
            State::InOptionNegotiation => {
                if byte == SE {
                    self.state = State::Normal;
                }
            }
        }
        None
    }

    fn text_byte(&mut self, byte: u8) -> Option<String> {
        match byte {
            IAC => {
                self.state = State::InControlSequence {
                    expect_option: false,
                };
                None
            }
            NEWLINE => {
                self.overflowed = false;
                self.line_len = 0;
                Some(std::mem::take(&mut self.line))
            }
            BACKSPACE => {
                if !self.overflowed && self.line.pop().is_some() {
                    self.line_len -= 1;
                }
                None
            }
            _ => {
                if self.line_len < self.max_line_len {
                    self.line.push(char::from(byte));
                    self.line_len += 1;
                } else if !self.overflowed {
                    self.overflowed = true;
                    tracing::debug!(
                        max = self.max_line_len,
                        "line too long, dropping input until newline"
                    );
                }
                None
            }
        }
    }
}

impl Default for TelnetFramer {
    fn default() -> Self {
        Self::new()
    }
}
