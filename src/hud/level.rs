/// Level naming.
///
/// Level scenes are named `"<label> <number>"`, e.g. `"Forest 3"`. The next
/// level is the same label with the number incremented: `"Forest 4"`.
/// Scene names are split on single spaces, so the label may itself contain
/// spaces (`"Dark Forest 2"` -> `"Dark Forest 3"`).

use crate::hud::error::HudError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelIdentity {
    name: String,
    number: i64,
    next_name: String,
}

impl LevelIdentity {
    pub fn parse(name: &str) -> Result<Self, HudError> {
        let (label, last) = match name.rsplit_once(' ') {
            Some((label, last)) => (Some(label), last),
            None => (None, name),
        };

        let number: i64 = last.parse().map_err(|source| HudError::SceneName {
            name: name.to_string(),
            source,
        })?;
        let next = number
            .checked_add(1)
            .ok_or_else(|| HudError::LevelNumberOverflow { name: name.to_string() })?;

        let next_name = match label {
            Some(label) => format!("{label} {next}"),
            None => next.to_string(),
        };

        Ok(LevelIdentity {
            name: name.to_string(),
            number,
            next_name,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn number(&self) -> i64 {
        self.number
    }

    pub fn next_name(&self) -> &str {
        &self.next_name
    }

    /// Text shown in every canvas's level-number label.
    pub fn display_label(&self) -> String {
        self.name.to_uppercase()
    }
}
