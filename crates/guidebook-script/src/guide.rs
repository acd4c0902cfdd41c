//! Campaign guide and scenario definitions.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::steps::Step;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wraps a raw identifier.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the raw identifier.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }
    };
}

string_id!(
    /// Identifier of a scenario within a guide.
    ScenarioId
);
string_id!(
    /// Identifier of a step within a scenario.
    StepId
);

/// Campaign difficulty; selects the starting chaos bag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    #[default]
    Standard,
    Hard,
    Expert,
}

/// The declarative rules document for one campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignGuide {
    /// Stable guide identifier, recorded by every campaign created from it.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Revision of this guide document.
    pub version: u32,
    /// Oldest campaign revision this guide can still replay.
    #[serde(default)]
    pub min_compatible_version: u32,
    /// Scenarios in play order. Side scenarios are listed too.
    pub scenarios: Vec<ScenarioGuide>,
    /// Campaign log sections and their known entries.
    #[serde(default)]
    pub log_sections: Vec<LogSectionDef>,
    #[serde(default)]
    pub achievements: Vec<AchievementDef>,
    /// Starting chaos bag per difficulty.
    #[serde(default)]
    pub chaos_bags: BTreeMap<Difficulty, BTreeMap<String, u32>>,
}

impl CampaignGuide {
    /// Looks up a scenario by id.
    #[must_use]
    pub fn scenario(&self, id: &ScenarioId) -> Option<&ScenarioGuide> {
        self.scenarios.iter().find(|s| &s.id == id)
    }

    #[must_use]
    pub fn log_section(&self, section: &str) -> Option<&LogSectionDef> {
        self.log_sections.iter().find(|s| s.id == section)
    }

    /// Looks up an entry declared under a log section.
    #[must_use]
    pub fn log_entry(&self, section: &str, id: &str) -> Option<&LogEntryDef> {
        self.log_section(section)
            .and_then(|s| s.entries.iter().find(|e| e.id == id))
    }

    #[must_use]
    pub fn achievement(&self, id: &str) -> Option<&AchievementDef> {
        self.achievements.iter().find(|a| a.id == id)
    }

    /// Returns the starting chaos bag for a difficulty, empty when the guide
    /// does not define one.
    #[must_use]
    pub fn chaos_bag(&self, difficulty: Difficulty) -> BTreeMap<String, u32> {
        self.chaos_bags.get(&difficulty).cloned().unwrap_or_default()
    }

    /// Returns whether a campaign created against `campaign_version` may be
    /// replayed with this guide.
    #[must_use]
    pub fn accepts_version(&self, campaign_version: u32) -> bool {
        campaign_version >= self.min_compatible_version && campaign_version <= self.version
    }
}

/// One scenario: an ordered list of steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioGuide {
    pub id: ScenarioId,
    pub name: String,
    /// Side scenarios are only played when explicitly started.
    #[serde(default)]
    pub side: bool,
    /// Played without a start record (prologues, interludes).
    #[serde(default)]
    pub implicit_start: bool,
    pub steps: Vec<Step>,
}

impl ScenarioGuide {
    #[must_use]
    pub fn step(&self, id: &StepId) -> Option<&Step> {
        self.steps.iter().find(|s| &s.id == id)
    }

    /// Position of a step in the step list.
    #[must_use]
    pub fn step_index(&self, id: &StepId) -> Option<usize> {
        self.steps.iter().position(|s| &s.id == id)
    }
}

/// A campaign log section, e.g. "Campaign Notes".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogSectionDef {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub entries: Vec<LogEntryDef>,
    /// Accepts player-written text entries.
    #[serde(default)]
    pub freeform: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntryDef {
    pub id: String,
    pub text: String,
}

/// An achievement tracked across the whole campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AchievementDef {
    pub id: String,
    pub title: String,
    #[serde(flatten)]
    pub kind: AchievementKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AchievementKind {
    /// Earned or not.
    Binary,
    /// A counter bounded below by 0 and above by `max` when present.
    Count {
        #[serde(default)]
        max: Option<u32>,
    },
}
