// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Key events and their mapping to menu commands.

/// A key relevant to menu navigation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    /// Up arrow.
    ArrowUp,
    /// Down arrow.
    ArrowDown,
    /// Left arrow.
    ArrowLeft,
    /// Right arrow.
    ArrowRight,
    /// Home.
    Home,
    /// End.
    End,
    /// Page up.
    PageUp,
    /// Page down.
    PageDown,
    /// Enter / Return.
    Enter,
    /// Escape.
    Escape,
    /// Backspace.
    Backspace,
    /// Tab.
    Tab,
    /// A printable character.
    Char(char),
}

bitflags::bitflags! {
    /// Modifier keys held during a key event.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// Shift.
        const SHIFT = 0b0001;
        /// Control.
        const CTRL  = 0b0010;
        /// Alt / Option.
        const ALT   = 0b0100;
        /// Meta / Command / Super.
        const META  = 0b1000;
    }
}

/// A key press.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    /// The key.
    pub key: Key,
    /// Held modifiers.
    pub modifiers: Modifiers,
}

impl KeyEvent {
    /// A key press without modifiers.
    pub const fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::empty(),
        }
    }

    /// A printable character without modifiers.
    pub const fn char(c: char) -> Self {
        Self::new(Key::Char(c))
    }

    /// A control chord, as used by the vim bindings.
    pub const fn ctrl(c: char) -> Self {
        Self {
            key: Key::Char(c),
            modifiers: Modifiers::CTRL,
        }
    }

    /// Add modifiers.
    #[must_use]
    pub const fn with(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = self.modifiers.union(modifiers);
        self
    }
}

/// Reading direction; swaps the open/close arrows.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Left to right: `ArrowRight` opens, `ArrowLeft` closes.
    #[default]
    Ltr,
    /// Right to left: `ArrowLeft` opens, `ArrowRight` closes.
    Rtl,
}

/// Keyboard behavior.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct KeyboardOptions {
    /// Enable `Ctrl+j`/`Ctrl+k` (next/previous) and `Ctrl+l`/`Ctrl+h` (open/close submenu).
    pub vim: bool,
    /// Reading direction.
    pub direction: Direction,
    /// Rows moved by `PageUp`/`PageDown`.
    pub page_size: usize,
}

impl Default for KeyboardOptions {
    fn default() -> Self {
        Self {
            vim: true,
            direction: Direction::Ltr,
            page_size: 10,
        }
    }
}

/// What a key press asks the menu to do.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Activate the next row (wrapping).
    Next,
    /// Activate the previous row (wrapping).
    Prev,
    /// Activate the first row.
    First,
    /// Activate the last row.
    Last,
    /// Move forward a page (clamped).
    PageDown,
    /// Move back a page (clamped).
    PageUp,
    /// Open the active submenu trigger.
    OpenSubmenu,
    /// Close the focused submenu. `by_arrow` is set for arrow keys, which
    /// defer to caret movement while the surface has a query.
    CloseSubmenu {
        /// Whether an arrow key (rather than a chord) asked for it.
        by_arrow: bool,
    },
    /// Select the active row.
    Activate,
    /// Close the focused surface.
    Dismiss,
    /// Append a character to the query.
    Type(char),
    /// Remove the last character of the query.
    Backspace,
}

/// Map a key press to a command.
pub fn command_for(event: &KeyEvent, options: &KeyboardOptions) -> Option<Command> {
    let chord = event
        .modifiers
        .intersects(Modifiers::CTRL | Modifiers::ALT | Modifiers::META);
    let (open, close) = match options.direction {
        Direction::Ltr => (Key::ArrowRight, Key::ArrowLeft),
        Direction::Rtl => (Key::ArrowLeft, Key::ArrowRight),
    };
    let command = match event.key {
        Key::ArrowDown => Command::Next,
        Key::ArrowUp => Command::Prev,
        Key::Home => Command::First,
        Key::End => Command::Last,
        Key::PageDown => Command::PageDown,
        Key::PageUp => Command::PageUp,
        Key::Enter => Command::Activate,
        Key::Escape => Command::Dismiss,
        Key::Backspace => Command::Backspace,
        Key::Tab => return None,
        k if k == open => Command::OpenSubmenu,
        k if k == close => Command::CloseSubmenu { by_arrow: true },
        Key::Char(c) if event.modifiers == Modifiers::CTRL && options.vim => {
            match c.to_ascii_lowercase() {
                'j' => Command::Next,
                'k' => Command::Prev,
                'l' => Command::OpenSubmenu,
                'h' => Command::CloseSubmenu { by_arrow: false },
                _ => return None,
            }
        }
        Key::Char(c) if !chord && !c.is_control() => Command::Type(c),
        Key::Char(_) | Key::ArrowLeft | Key::ArrowRight => return None,
    };
    Some(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrows_follow_direction() {
        let ltr = KeyboardOptions::default();
        let rtl = KeyboardOptions {
            direction: Direction::Rtl,
            ..ltr
        };
        let right = KeyEvent::new(Key::ArrowRight);
        let left = KeyEvent::new(Key::ArrowLeft);
        assert_eq!(command_for(&right, &ltr), Some(Command::OpenSubmenu));
        assert_eq!(
            command_for(&left, &ltr),
            Some(Command::CloseSubmenu { by_arrow: true })
        );
        assert_eq!(command_for(&left, &rtl), Some(Command::OpenSubmenu));
        assert_eq!(
            command_for(&right, &rtl),
            Some(Command::CloseSubmenu { by_arrow: true })
        );
    }

    #[test]
    fn vim_chords_are_optional() {
        let on = KeyboardOptions::default();
        let off = KeyboardOptions { vim: false, ..on };
        assert_eq!(command_for(&KeyEvent::ctrl('j'), &on), Some(Command::Next));
        assert_eq!(command_for(&KeyEvent::ctrl('k'), &on), Some(Command::Prev));
        assert_eq!(command_for(&KeyEvent::ctrl('l'), &on), Some(Command::OpenSubmenu));
        assert_eq!(
            command_for(&KeyEvent::ctrl('h'), &on),
            Some(Command::CloseSubmenu { by_arrow: false })
        );
        assert_eq!(command_for(&KeyEvent::ctrl('j'), &off), None);
    }

    #[test]
    fn printable_characters_type() {
        let o = KeyboardOptions::default();
        assert_eq!(command_for(&KeyEvent::char('a'), &o), Some(Command::Type('a')));
        let shifted = KeyEvent::char('A').with(Modifiers::SHIFT);
        assert_eq!(command_for(&shifted, &o), Some(Command::Type('A')));
        let meta = KeyEvent::char('a').with(Modifiers::META);
        assert_eq!(command_for(&meta, &o), None, "shortcuts are not typed");
        assert_eq!(command_for(&KeyEvent::char('\u{7f}'), &o), None);
    }

    #[test]
    fn standard_keys() {
        let o = KeyboardOptions::default();
        for (key, cmd) in [
            (Key::ArrowDown, Command::Next),
            (Key::ArrowUp, Command::Prev),
            (Key::Home, Command::First),
            (Key::End, Command::Last),
            (Key::PageDown, Command::PageDown),
            (Key::PageUp, Command::PageUp),
            (Key::Enter, Command::Activate),
            (Key::Escape, Command::Dismiss),
            (Key::Backspace, Command::Backspace),
        ] {
            assert_eq!(command_for(&KeyEvent::new(key), &o), Some(cmd), "{key:?}");
        }
        assert_eq!(command_for(&KeyEvent::new(Key::Tab), &o), None);
    }
}
