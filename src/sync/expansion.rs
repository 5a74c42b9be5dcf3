use std::collections::HashSet;

/// Nicknames whose detail panel the user has opened.
///
/// Only user toggles change this set; roster fetches read it but never write
/// it, so a flag outlives its peer dropping out of the roster.
#[derive(Debug, Default)]
pub struct ExpansionState {
    expanded: HashSet<String>,
}

impl ExpansionState {
    /// Flips the panel for `nickname` and returns the new state.
    pub fn toggle(&mut self, nickname: &str) -> bool {
        if self.expanded.remove(nickname) {
            false
        } else {
            self.expanded.insert(nickname.to_string());
            true
        }
    }

    pub fn is_expanded(&self, nickname: &str) -> bool {
        self.expanded.contains(nickname)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_opens_then_closes() {
        let mut state = ExpansionState::default();
        assert!(state.toggle("bob"));
        assert!(state.is_expanded("bob"));
        assert!(!state.toggle("bob"));
        assert!(!state.is_expanded("bob"));
        assert!(state.expanded.is_empty());
    }
}
