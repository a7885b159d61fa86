use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use super::{Button, InputSource};
use crate::error::UiError;

/// A chord: every button must be held at once.
///
/// Written as `"LeftControl + S"`. An empty keybind is unbound and never
/// activates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Keybind {
    buttons: BTreeSet<Button>,
}

impl Keybind {
    /// Creates a keybind from any set of buttons.
    pub fn new(buttons: impl IntoIterator<Item = Button>) -> Self {
        Self {
            buttons: buttons.into_iter().collect(),
        }
    }

    /// A single-button keybind.
    #[must_use]
    pub fn single(button: Button) -> Self {
        Self::new([button])
    }

    /// Buttons in the chord.
    #[must_use]
    pub const fn buttons(&self) -> &BTreeSet<Button> {
        &self.buttons
    }

    /// `true` if the chord has at least one button.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        !self.buttons.is_empty()
    }

    /// `true` if `button` is part of the chord.
    #[must_use]
    pub fn contains(&self, button: Button) -> bool {
        self.buttons.contains(&button)
    }

    /// `true` if the chord is bound and every button is held.
    pub fn is_down(&self, input: &dyn InputSource) -> bool {
        self.is_bound() && self.buttons.iter().all(|button| input.is_down(*button))
    }
}

impl fmt::Display for Keybind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, button) in self.buttons.iter().enumerate() {
            if index > 0 {
                f.write_str(" + ")?;
            }
            f.write_str(button.name())?;
        }
        Ok(())
    }
}

impl FromStr for Keybind {
    type Err = UiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Ok(Self::default());
        }
        s.split('+')
            .map(|part| {
                if part.trim().is_empty() {
                    Err(UiError::InvalidKeybind(s.to_string()))
                } else {
                    part.parse::<Button>()
                }
            })
            .collect::<Result<BTreeSet<_>, _>>()
            .map(|buttons| Self { buttons })
    }
}

impl From<Button> for Keybind {
    fn from(button: Button) -> Self {
        Self::single(button)
    }
}

/// Alternative keybinds for one action, written `"LeftControl + S, F5"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct KeybindList {
    keybinds: Vec<Keybind>,
}

impl KeybindList {
    /// Creates a list, dropping unbound entries.
    pub fn new(keybinds: impl IntoIterator<Item = Keybind>) -> Self {
        Self {
            keybinds: keybinds.into_iter().filter(Keybind::is_bound).collect(),
        }
    }

    /// One single-button keybind per button.
    pub fn of_buttons(buttons: impl IntoIterator<Item = Button>) -> Self {
        Self::new(buttons.into_iter().map(Keybind::single))
    }

    /// Keybinds in order.
    #[must_use]
    pub fn keybinds(&self) -> &[Keybind] {
        &self.keybinds
    }

    /// `true` if any keybind is bound.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        !self.keybinds.is_empty()
    }

    /// `true` if any keybind's chord is fully held.
    pub fn is_down(&self, input: &dyn InputSource) -> bool {
        self.keybinds.iter().any(|keybind| keybind.is_down(input))
    }
}

impl fmt::Display for KeybindList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, keybind) in self.keybinds.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{keybind}")?;
        }
        Ok(())
    }
}

impl FromStr for KeybindList {
    type Err = UiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Ok(Self::default());
        }
        s.split(',')
            .map(str::parse::<Keybind>)
            .collect::<Result<Vec<_>, _>>()
            .map(Self::new)
    }
}
