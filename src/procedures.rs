//! Mission procedure lookup.
//!
//! A fixed set of onboard checklists addressed by keyword. Queries match by
//! case-insensitive substring against an ordered key table, so "begin EVA
//! prep" finds the EVA checklist; the first matching key wins.

use serde::{Deserialize, Serialize};

/// An onboard procedure checklist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Procedure {
    /// Extravehicular activity.
    Eva,
    /// Equipment repair.
    Repair,
    /// Contingency response.
    Emergency,
}

/// Reply for queries that match no procedure key.
const NOT_FOUND: &str = "Procedure not found. Please specify: EVA, repair, or emergency.";

impl Procedure {
    /// Every procedure, in match order.
    pub const ALL: [Self; 3] = [Self::Eva, Self::Repair, Self::Emergency];

    /// The lookup key this procedure answers to.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Eva => "eva",
            Self::Repair => "repair",
            Self::Emergency => "emergency",
        }
    }

    /// The checklist text.
    #[must_use]
    pub const fn text(self) -> &'static str {
        match self {
            Self::Eva => {
                "Extravehicular Activity Procedure: 1. Suit check, \
                 2. Airlock depressurization, 3. EVA tasks, 4. Return and repressurization"
            }
            Self::Repair => {
                "Repair Procedure: 1. Assess damage, 2. Gather tools, \
                 3. Execute repair, 4. Test functionality"
            }
            Self::Emergency => {
                "Emergency Procedure: 1. Assess situation, 2. Alert mission control, \
                 3. Execute contingency plan"
            }
        }
    }

    /// Whether a query addresses this procedure (case-insensitive substring).
    #[must_use]
    pub fn matches(self, query: &str) -> bool {
        query.to_lowercase().contains(self.key())
    }

    /// First procedure in match order whose key appears in the query.
    #[must_use]
    pub fn find(query: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.matches(query))
    }
}

impl std::fmt::Display for Procedure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Resolves a free-form query to a checklist, or to the not-found reply
/// naming the valid keys. Never fails.
#[must_use]
pub fn lookup_procedure(query: &str) -> &'static str {
    match Procedure::find(query) {
        Some(procedure) => procedure.text(),
        None => NOT_FOUND,
    }
}
