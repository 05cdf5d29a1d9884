//! Escape sequence parser for terminal replies and key reports.
//!
//! The parser is a byte-at-a-time state machine with four states: ground,
//! escape, SS3 and CSI. It performs no I/O and holds no locks; every completed
//! sequence is returned as a [`Dispatch`] for the decoder to act on.
//!
//! A lone ESC cannot be told apart from the start of a sequence without a
//! timeout, so two consecutive ESC bytes are reported as one Escape key press
//! instead. Malformed or unknown sequences drop back to ground silently.

use arrayvec::ArrayVec;

use crate::keymap::{ascii_key, csi_key, is_interrupt, map_vkey, ss3_key};
use crate::params::{CsiParams, MAX_PARAMS};
use crate::types::{KeyCode, Modifiers};

const ESC: u8 = 0x1b;
const CTRL_C: u8 = 0x03;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParserState {
    #[default]
    Ground,
    Escape,
    Ss3,
    Csi,
}

/// A completed input item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Ctrl+C, either as byte 3 or as an enhanced key report.
    Interrupt,
    /// A key press from a protocol without release events.
    Key { code: KeyCode, mods: Modifiers },
    /// An enhanced key report with explicit press/release state.
    KeyTransition { code: KeyCode, pressed: bool },
    /// Primary device attributes reply (`CSI ? Ps ; ... c`).
    DeviceAttributes(ArrayVec<u32, MAX_PARAMS>),
    /// Cell size reply (`CSI 6 ; height ; width t`).
    CellSize { height: u32, width: u32 },
    /// Cursor position report (`CSI row ; col R`).
    CursorPosition { row: u32, col: u32 },
    /// Device status reply (`CSI Ps n`).
    StatusReport,
}

#[derive(Debug, Clone, Default)]
pub struct Parser {
    state: ParserState,
    params: CsiParams,
}

impl Parser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ParserState {
        self.state
    }

    /// Advance the state machine by one byte.
    pub fn advance(&mut self, byte: u8) -> Option<Dispatch> {
        if byte == CTRL_C {
            return Some(Dispatch::Interrupt);
        }

        if byte == ESC {
            if self.state == ParserState::Escape {
                self.state = ParserState::Ground;
                return Some(Dispatch::Key {
                    code: KeyCode::Escape,
                    mods: Modifiers::NONE,
                });
            }
            self.state = ParserState::Escape;
            return None;
        }

        match self.state {
            ParserState::Ground => ascii_key(byte).map(|(code, mods)| Dispatch::Key { code, mods }),
            ParserState::Escape => {
                self.params.reset();
                self.state = match byte {
                    b'O' => ParserState::Ss3,
                    b'[' => ParserState::Csi,
                    _ => ParserState::Ground,
                };
                None
            }
            ParserState::Ss3 => {
                self.state = ParserState::Ground;
                ss3_key(byte).map(|code| Dispatch::Key {
                    code,
                    mods: Modifiers::NONE,
                })
            }
            ParserState::Csi => self.csi_byte(byte),
        }
    }

    fn csi_byte(&mut self, byte: u8) -> Option<Dispatch> {
        match byte {
            b'0'..=b'9' => {
                self.params.push_digit(byte);
                None
            }
            b'<'..=b'?' => {
                self.params.set_prefix(byte);
                None
            }
            b';' => {
                self.params.finish_param();
                None
            }
            _ => {
                self.params.finish_param();
                self.state = ParserState::Ground;
                self.dispatch_csi(byte)
            }
        }
    }

    fn dispatch_csi(&self, final_byte: u8) -> Option<Dispatch> {
        let p = &self.params;
        let unprefixed = !p.has_prefix();

        match final_byte {
            b'n' => Some(Dispatch::StatusReport),
            b'c' => (p.prefix() == b'?')
                .then(|| Dispatch::DeviceAttributes(p.as_slice().iter().copied().collect())),
            b't' => (unprefixed && p.len() == 3 && p.raw(0) == 6).then(|| Dispatch::CellSize {
                height: p.raw(1),
                width: p.raw(2),
            }),
            b'R' => (unprefixed && p.len() == 2).then(|| Dispatch::CursorPosition {
                row: p.raw(0),
                col: p.raw(1),
            }),
            b'_' if unprefixed && p.len() >= 5 => {
                let vkey = p.raw(0);
                let control_state = p.raw(4);
                if is_interrupt(vkey, control_state) {
                    return Some(Dispatch::Interrupt);
                }
                map_vkey(vkey).map(|code| Dispatch::KeyTransition {
                    code,
                    pressed: p.raw(3) != 0,
                })
            }
            _ if unprefixed => {
                csi_key(final_byte, p.raw(0), p.raw(1)).map(|(code, mods)| Dispatch::Key { code, mods })
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(parser: &mut Parser, bytes: &[u8]) -> Vec<Dispatch> {
        bytes.iter().filter_map(|&b| parser.advance(b)).collect()
    }

    fn key(code: KeyCode) -> Dispatch {
        Dispatch::Key {
            code,
            mods: Modifiers::NONE,
        }
    }

    #[test]
    fn double_escape_is_one_escape_key() {
        let mut p = Parser::new();
        assert_eq!(feed(&mut p, b"\x1b\x1b"), vec![key(KeyCode::Escape)]);
        assert_eq!(p.state(), ParserState::Ground);
    }

    #[test]
    fn single_escape_waits_for_more() {
        let mut p = Parser::new();
        assert!(feed(&mut p, b"\x1b").is_empty());
        assert_eq!(p.state(), ParserState::Escape);
    }

    #[test]
    fn plain_bytes_map_in_ground() {
        let mut p = Parser::new();
        assert_eq!(
            feed(&mut p, b"w1 "),
            vec![key(KeyCode::Char(b'w')), key(KeyCode::Char(b'1')), key(KeyCode::Space)]
        );
    }

    #[test]
    fn ctrl_c_is_interrupt_in_any_state() {
        let mut p = Parser::new();
        assert_eq!(feed(&mut p, b"\x03"), vec![Dispatch::Interrupt]);

        assert!(feed(&mut p, b"\x1b[12").is_empty());
        assert_eq!(feed(&mut p, b"\x03"), vec![Dispatch::Interrupt]);
        assert_eq!(p.state(), ParserState::Csi);
    }

    #[test]
    fn ss3_function_keys() {
        let mut p = Parser::new();
        assert_eq!(feed(&mut p, b"\x1bOP\x1bOS"), vec![key(KeyCode::F(1)), key(KeyCode::F(4))]);
        assert!(feed(&mut p, b"\x1bOx").is_empty());
        assert_eq!(p.state(), ParserState::Ground);
    }

    #[test]
    fn csi_arrows_and_tilde_keys() {
        let mut p = Parser::new();
        assert_eq!(
            feed(&mut p, b"\x1b[A\x1b[D\x1b[15~\x1b[24~"),
            vec![key(KeyCode::Up), key(KeyCode::Left), key(KeyCode::F(5)), key(KeyCode::F(12))]
        );
    }

    #[test]
    fn csi_arrow_with_modifier_parameter() {
        let mut p = Parser::new();
        assert_eq!(
            feed(&mut p, b"\x1b[1;5C"),
            vec![Dispatch::Key {
                code: KeyCode::Right,
                mods: Modifiers::CTRL
            }]
        );
    }

    #[test]
    fn device_attributes_reply() {
        let mut p = Parser::new();
        let out = feed(&mut p, b"\x1b[?64;1;4c");
        assert_eq!(out.len(), 1);
        match &out[0] {
            Dispatch::DeviceAttributes(values) => assert_eq!(values.as_slice(), &[64, 1, 4]),
            other => panic!("unexpected dispatch: {other:?}"),
        }
    }

    #[test]
    fn device_attributes_without_prefix_is_ignored() {
        let mut p = Parser::new();
        assert!(feed(&mut p, b"\x1b[64;4c").is_empty());
        assert_eq!(p.state(), ParserState::Ground);
    }

    #[test]
    fn cell_size_and_cursor_reports() {
        let mut p = Parser::new();
        assert_eq!(
            feed(&mut p, b"\x1b[6;20;10t\x1b[40;30R"),
            vec![
                Dispatch::CellSize {
                    height: 20,
                    width: 10
                },
                Dispatch::CursorPosition { row: 40, col: 30 }
            ]
        );
    }

    #[test]
    fn window_reports_with_wrong_shape_are_ignored() {
        let mut p = Parser::new();
        assert!(feed(&mut p, b"\x1b[4;600;800t").is_empty());
        assert!(feed(&mut p, b"\x1b[6;20t").is_empty());
        assert!(feed(&mut p, b"\x1b[>40;30R").is_empty());
        assert!(feed(&mut p, b"\x1b[1;2;3R").is_empty());
    }

    #[test]
    fn enhanced_key_reports() {
        let mut p = Parser::new();
        assert_eq!(
            feed(&mut p, b"\x1b[65;30;97;1;0;1_\x1b[65;30;97;0;0;1_"),
            vec![
                Dispatch::KeyTransition {
                    code: KeyCode::Char(b'a'),
                    pressed: true
                },
                Dispatch::KeyTransition {
                    code: KeyCode::Char(b'a'),
                    pressed: false
                },
            ]
        );
    }

    #[test]
    fn enhanced_ctrl_c_is_interrupt() {
        let mut p = Parser::new();
        assert_eq!(feed(&mut p, b"\x1b[67;46;3;1;8;1_"), vec![Dispatch::Interrupt]);
    }

    #[test]
    fn enhanced_unknown_vkey_is_ignored() {
        let mut p = Parser::new();
        assert!(feed(&mut p, b"\x1b[91;0;0;1;0;1_").is_empty());
        // Too few parameters.
        assert!(feed(&mut p, b"\x1b[65;30;97;1_").is_empty());
    }

    #[test]
    fn status_report_dispatches() {
        let mut p = Parser::new();
        assert_eq!(feed(&mut p, b"\x1b[0n"), vec![Dispatch::StatusReport]);
    }

    #[test]
    fn escape_inside_csi_restarts_sequence() {
        let mut p = Parser::new();
        assert_eq!(feed(&mut p, b"\x1b[12\x1b[B"), vec![key(KeyCode::Down)]);
    }

    #[test]
    fn unknown_sequences_return_to_ground() {
        let mut p = Parser::new();
        assert!(feed(&mut p, b"\x1b[?1049h").is_empty());
        assert_eq!(p.state(), ParserState::Ground);
        assert!(feed(&mut p, b"\x1bx").is_empty());
        assert_eq!(p.state(), ParserState::Ground);
        assert_eq!(feed(&mut p, b"a"), vec![key(KeyCode::Char(b'a'))]);
    }

    #[test]
    fn parameter_overflow_is_dropped_silently() {
        let mut p = Parser::new();
        let mut seq = b"\x1b[?".to_vec();
        for i in 0..40 {
            if i > 0 {
                seq.push(b';');
            }
            seq.push(b'4');
        }
        seq.push(b'c');
        let out = feed(&mut p, &seq);
        match &out[0] {
            Dispatch::DeviceAttributes(values) => assert_eq!(values.len(), MAX_PARAMS),
            other => panic!("unexpected dispatch: {other:?}"),
        }
    }
}
