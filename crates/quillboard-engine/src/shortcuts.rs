//! Keyboard shortcut registry and documentation.

/// A keyboard shortcut definition.
#[derive(Debug, Clone)]
pub struct Shortcut {
    pub key: &'static str,
    pub ctrl: bool,
    pub shift: bool,
    pub description: &'static str,
}

impl Shortcut {
    pub const fn new(
        key: &'static str,
        ctrl: bool,
        shift: bool,
        description: &'static str,
    ) -> Self {
        Self {
            key,
            ctrl,
            shift,
            description,
        }
    }

    /// Format the shortcut for display (e.g., "Ctrl+Shift+Z").
    pub fn format(&self) -> String {
        let mut parts = Vec::new();
        if self.ctrl {
            parts.push("Ctrl");
        }
        if self.shift {
            parts.push("Shift");
        }
        parts.push(self.key);
        parts.join("+")
    }
}

/// Registry of all whiteboard shortcuts. Only active while the whiteboard
/// view is visible and focus is not inside a text field.
pub struct ShortcutRegistry;

impl ShortcutRegistry {
    pub fn all() -> Vec<Shortcut> {
        vec![
            Shortcut::new("V", false, false, "Select tool"),
            Shortcut::new("P", false, false, "Pen tool"),
            Shortcut::new("E", false, false, "Eraser tool"),
            Shortcut::new("Space", false, false, "Pan while held"),
            Shortcut::new("Z", true, false, "Undo"),
            Shortcut::new("Z", true, true, "Redo"),
            Shortcut::new("Y", true, false, "Redo"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format() {
        assert_eq!(Shortcut::new("Z", true, true, "Redo").format(), "Ctrl+Shift+Z");
        assert_eq!(Shortcut::new("P", false, false, "Pen").format(), "P");
    }

    #[test]
    fn test_registry_covers_undo_redo() {
        let all = ShortcutRegistry::all();
        assert!(all.iter().any(|s| s.key == "Z" && s.ctrl && !s.shift));
        assert!(all.iter().any(|s| s.key == "Z" && s.ctrl && s.shift));
        assert!(all.iter().any(|s| s.key == "Y" && s.ctrl));
    }
}
