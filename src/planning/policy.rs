use std::collections::HashMap;

use super::types::ShiftConcept;

/// What selecting a concept does to the manual time fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutoFill {
    /// Overwrite both fields with the default window
    Window { start: String, end: String },
    /// Empty both fields (non-workable concepts)
    Clear,
    /// Leave the fields as the user last set them
    Keep,
}

/// Default time window per concept code, kept apart from the concept
/// catalog so it can be swapped or extended without touching the entities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultWindowPolicy {
    windows: HashMap<String, (String, String)>,
}

impl DefaultWindowPolicy {
    /// Policy with no default windows at all
    fn empty() -> Self {
        Self {
            windows: HashMap::new(),
        }
    }

    /// The reference table: T1 08:00-18:00, T2 12:00-22:00
    pub fn standard() -> Self {
        Self::empty()
            .with_window("T1", "08:00", "18:00")
            .with_window("T2", "12:00", "22:00")
    }

    fn with_window(mut self, code: &str, start: &str, end: &str) -> Self {
        self.windows
            .insert(normalize(code), (start.to_string(), end.to_string()));
        self
    }

    /// Resolves the auto-fill for a freshly selected concept
    pub fn resolve(&self, concept: &ShiftConcept) -> AutoFill {
        if !concept.is_workable {
            return AutoFill::Clear;
        }
        match self.windows.get(&normalize(&concept.code)) {
            Some((start, end)) => AutoFill::Window {
                start: start.clone(),
                end: end.clone(),
            },
            None => AutoFill::Keep,
        }
    }
}

fn normalize(code: &str) -> String {
    code.trim().to_uppercase()
}
