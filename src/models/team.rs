//! Team data structure.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a team (used in matches and lookups).
pub type TeamId = Uuid;

/// A team in a competition: name plus an ordered player roster.
/// Rosters are frozen once the competition has matches.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    /// Player names in roster order (may be empty for casual play).
    pub players: Vec<String>,
}

impl Team {
    /// Create a new team with the given name and an empty roster.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            players: Vec::new(),
        }
    }

    /// Create a team with a roster (e.g. from competition setup).
    pub fn with_players(name: impl Into<String>, players: Vec<String>) -> Self {
        Self {
            players,
            ..Self::new(name)
        }
    }
}
