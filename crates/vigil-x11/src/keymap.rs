//! Keycode-to-character translation from the server's keyboard mapping.
//!
//! The mapping is fetched once at capture time; lookups afterwards are pure,
//! so the whole translation path is testable without a running server.

/// Keysym produced by the Return key.
pub const XK_RETURN: u32 = 0xFF0D;

const NO_SYMBOL: u32 = 0;

/// Snapshot of the server's keycode-to-keysym table.
#[derive(Debug, Clone)]
pub struct KeyboardMap {
    min_keycode: u8,
    keysyms_per_keycode: u8,
    keysyms: Vec<u32>,
}

impl KeyboardMap {
    pub fn new(min_keycode: u8, keysyms_per_keycode: u8, keysyms: Vec<u32>) -> Self {
        Self {
            min_keycode,
            keysyms_per_keycode,
            keysyms,
        }
    }

    /// Resolve `keycode` to a keysym, honouring the shift column.
    ///
    /// Column 0 holds the unshifted keysym, column 1 the shifted one. Keys
    /// whose shifted column is unset fall back to ASCII case conversion of
    /// the unshifted keysym, which is how servers encode plain letter keys.
    pub fn lookup(&self, keycode: u8, shifted: bool) -> Option<u32> {
        let per = usize::from(self.keysyms_per_keycode);
        if per == 0 {
            return None;
        }

        let offset = usize::from(keycode.checked_sub(self.min_keycode)?) * per;
        let group = self.keysyms.get(offset..offset + per)?;
        let unshifted = group.first().copied().filter(|&sym| sym != NO_SYMBOL)?;

        if !shifted {
            return Some(unshifted);
        }

        match group.get(1).copied().filter(|&sym| sym != NO_SYMBOL) {
            Some(sym) => Some(sym),
            None => Some(ascii_upper(unshifted)),
        }
    }
}

/// Whether `keysym` is the designated submission key.
pub fn is_submission(keysym: u32) -> bool {
    keysym == XK_RETURN
}

/// Character produced by `keysym`, if any.
///
/// Printable ASCII and Latin-1 keysyms map directly to their character;
/// everything else (control keys, function keys, modifiers) produces no
/// input.
pub fn text_for_keysym(keysym: u32) -> Option<char> {
    match keysym {
        0x20..=0x7E | 0xA0..=0xFF => char::from_u32(keysym),
        _ => None,
    }
}

fn ascii_upper(keysym: u32) -> u32 {
    if (0x61..=0x7A).contains(&keysym) {
        keysym - 0x20
    } else {
        keysym
    }
}
