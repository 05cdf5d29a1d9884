//! Key mapping from terminal reports to game keys.

use crate::types::{KeyCode, Modifiers};

/// Virtual key code of the `C` key in enhanced key reports.
pub const VK_C: u32 = b'C' as u32;

/// Left and right Ctrl bits of the enhanced report's control key state.
const CONTROL_STATE_CTRL: u32 = 0x04 | 0x08;

/// Map a plain byte received outside any escape sequence.
///
/// This path serves terminals without the enhanced key report extension, so
/// only keys with an unambiguous single-byte encoding are covered.
pub fn ascii_key(byte: u8) -> Option<(KeyCode, Modifiers)> {
    let key = match byte {
        // Ctrl+Space arrives as NUL.
        0x00 => return Some((KeyCode::Space, Modifiers::CTRL)),
        0x7f | 0x08 => KeyCode::Backspace,
        b'\t' => KeyCode::Tab,
        b'\n' | b'\r' => KeyCode::Enter,
        b' ' => KeyCode::Space,
        b'\'' => KeyCode::Apostrophe,
        b'*' => KeyCode::Multiply,
        b',' => KeyCode::Comma,
        b'-' => KeyCode::Minus,
        b'.' => KeyCode::Period,
        b'/' => KeyCode::Slash,
        b';' => KeyCode::Semicolon,
        b'=' => KeyCode::Equals,
        b'[' => KeyCode::LeftBracket,
        b']' => KeyCode::RightBracket,
        b'0'..=b'9' | b'a'..=b'z' => KeyCode::Char(byte),
        _ => return None,
    };
    Some((key, Modifiers::NONE))
}

/// Map the final byte of an `SS3` sequence.
pub fn ss3_key(byte: u8) -> Option<KeyCode> {
    match byte {
        b'P' => KeyCode::function(1),
        b'Q' => KeyCode::function(2),
        b'R' => KeyCode::function(3),
        b'S' => KeyCode::function(4),
        _ => None,
    }
}

/// Map an unprefixed CSI key sequence.
///
/// Cursor keys carry the xterm modifier code in their second parameter
/// (`CSI 1 ; 5 A` is Ctrl+Up); `~` sequences select F5-F12 by first parameter.
pub fn csi_key(final_byte: u8, param1: u32, param2: u32) -> Option<(KeyCode, Modifiers)> {
    let mods = Modifiers::from_xterm(param2);
    match final_byte {
        b'A' => Some((KeyCode::Up, mods)),
        b'B' => Some((KeyCode::Down, mods)),
        b'C' => Some((KeyCode::Right, mods)),
        b'D' => Some((KeyCode::Left, mods)),
        b'~' => {
            let n = match param1 {
                15 => 5,
                17 => 6,
                18 => 7,
                19 => 8,
                20 => 9,
                21 => 10,
                23 => 11,
                24 => 12,
                _ => return None,
            };
            KeyCode::function(n).map(|key| (key, Modifiers::NONE))
        }
        _ => None,
    }
}

/// Map a Windows virtual key code from an enhanced key report.
pub fn map_vkey(vkey: u32) -> Option<KeyCode> {
    match vkey {
        8 => Some(KeyCode::Backspace),
        9 => Some(KeyCode::Tab),
        13 => Some(KeyCode::Enter),
        16 => Some(KeyCode::Shift),
        17 => Some(KeyCode::Ctrl),
        18 => Some(KeyCode::Alt),
        27 => Some(KeyCode::Escape),
        32 => Some(KeyCode::Space),
        37 => Some(KeyCode::Left),
        38 => Some(KeyCode::Up),
        39 => Some(KeyCode::Right),
        40 => Some(KeyCode::Down),
        112..=123 => KeyCode::function((vkey - 111) as u8),
        48..=57 | 65..=90 => KeyCode::from_alnum(vkey as u8),
        _ => None,
    }
}

/// True when an enhanced key report is Ctrl+C.
pub fn is_interrupt(vkey: u32, control_state: u32) -> bool {
    vkey == VK_C && control_state & CONTROL_STATE_CTRL != 0
}
