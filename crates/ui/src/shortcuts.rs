/// Keyboard shortcuts of the progress management panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    /// Ctrl/Cmd+E
    Export,
    /// Ctrl/Cmd+I
    Import,
}

impl Shortcut {
    /// Match a key press. Either Ctrl or Cmd (meta) must be held.
    #[must_use]
    pub fn from_key(key: &str, ctrl: bool, meta: bool) -> Option<Self> {
        if !(ctrl || meta) {
            return None;
        }
        match key {
            "e" | "E" => Some(Self::Export),
            "i" | "I" => Some(Self::Import),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modifier_is_required() {
        assert_eq!(Shortcut::from_key("e", true, false), Some(Shortcut::Export));
        assert_eq!(Shortcut::from_key("I", false, true), Some(Shortcut::Import));
        assert_eq!(Shortcut::from_key("e", false, false), None);
        assert_eq!(Shortcut::from_key("x", true, true), None);
    }
}
