//! The append-only input log of a campaign.
//!
//! Entries are never removed. Undo, redo and reset are markers appended to
//! the log; which records are in effect is recomputed by replaying the
//! entries in order.

use std::collections::{BTreeMap, HashSet};

use guidebook_script::{Difficulty, ScenarioId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::records::{InputIdentity, InputKind, InputRecord};

/// One member of the investigator roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvestigatorSetup {
    pub id: String,
    pub name: String,
    /// Physical trauma at or above this eliminates the investigator.
    pub health: u32,
    /// Mental trauma at or above this eliminates the investigator.
    pub sanity: u32,
}

/// Everything fixed when a campaign is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignSetup {
    pub name: String,
    pub guide_id: String,
    /// Guide version the campaign was created against.
    pub guide_version: u32,
    #[serde(default)]
    pub difficulty: Difficulty,
    pub investigators: Vec<InvestigatorSetup>,
}

/// An entry of the input log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEntry {
    Input(InputRecord),
    /// Retracts the most recent active record of a bucket.
    Undo { scenario: Option<ScenarioId> },
    /// Re-activates the most recently retracted record of a bucket.
    Redo { scenario: Option<ScenarioId> },
    /// Retracts every earlier record of a scenario except achievement
    /// operations.
    Reset { scenario: ScenarioId },
}

type Bucket = Option<ScenarioId>;

/// Result of replaying the log: the active records, in log order, and the
/// per-bucket redo stacks.
#[derive(Default)]
struct Replay<'a> {
    active: Vec<(usize, &'a InputRecord)>,
    redo: BTreeMap<Bucket, Vec<(usize, &'a InputRecord)>>,
}

impl<'a> Replay<'a> {
    fn run(entries: &'a [LogEntry]) -> Self {
        let mut replay = Self::default();
        for (position, entry) in entries.iter().enumerate() {
            match entry {
                LogEntry::Input(record) => {
                    replay.active.push((position, record));
                    replay.redo.remove(&record.scenario);
                }
                LogEntry::Undo { scenario } => {
                    if let Some(index) = replay
                        .active
                        .iter()
                        .rposition(|(_, r)| &r.scenario == scenario)
                    {
                        let undone = replay.active.remove(index);
                        replay.redo.entry(scenario.clone()).or_default().push(undone);
                    }
                }
                LogEntry::Redo { scenario } => {
                    if let Some(redone) = replay.redo.get_mut(scenario).and_then(Vec::pop) {
                        let index = replay.active.partition_point(|(p, _)| *p < redone.0);
                        replay.active.insert(index, redone);
                    }
                }
                LogEntry::Reset { scenario } => {
                    replay.active.retain(|(_, r)| {
                        r.scenario.as_ref() != Some(scenario)
                            || r.kind() == InputKind::AchievementOp
                    });
                    replay.redo.remove(&Some(scenario.clone()));
                }
            }
        }
        replay
    }

    fn has_active(&self, bucket: Option<&ScenarioId>) -> bool {
        self.active
            .iter()
            .any(|(_, r)| r.scenario.as_ref() == bucket)
    }

    fn has_redo(&self, bucket: Option<&ScenarioId>) -> bool {
        self.redo
            .get(&bucket.cloned())
            .is_some_and(|stack| !stack.is_empty())
    }
}

/// The ordered entries of one campaign plus its setup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputLog {
    setup: CampaignSetup,
    entries: Vec<LogEntry>,
}

impl InputLog {
    #[must_use]
    pub fn new(setup: CampaignSetup) -> Self {
        Self {
            setup,
            entries: Vec::new(),
        }
    }

    #[must_use]
    pub fn setup(&self) -> &CampaignSetup {
        &self.setup
    }

    /// Appends a record and returns its sequence number (its position in the
    /// log). Duplicate identities are resolved when the log is folded.
    pub fn append(&mut self, record: InputRecord) -> usize {
        self.entries.push(LogEntry::Input(record));
        self.entries.len() - 1
    }

    /// Whether the bucket has an active record to undo.
    #[must_use]
    pub fn can_undo(&self, scenario: Option<&ScenarioId>) -> bool {
        Replay::run(&self.entries).has_active(scenario)
    }

    #[must_use]
    pub fn can_redo(&self, scenario: Option<&ScenarioId>) -> bool {
        Replay::run(&self.entries).has_redo(scenario)
    }

    /// Appends an undo marker for the bucket. Returns `false` (and appends
    /// nothing) when there is nothing to undo.
    pub fn undo(&mut self, scenario: Option<&ScenarioId>) -> bool {
        if !self.can_undo(scenario) {
            return false;
        }
        self.entries.push(LogEntry::Undo {
            scenario: scenario.cloned(),
        });
        true
    }

    /// Appends a redo marker for the bucket. Returns `false` (and appends
    /// nothing) when nothing was undone since the last new record.
    pub fn redo(&mut self, scenario: Option<&ScenarioId>) -> bool {
        if !self.can_redo(scenario) {
            return false;
        }
        self.entries.push(LogEntry::Redo {
            scenario: scenario.cloned(),
        });
        true
    }

    /// Appends a reset marker for the scenario.
    pub fn reset_scenario(&mut self, scenario: &ScenarioId) {
        self.entries.push(LogEntry::Reset {
            scenario: scenario.clone(),
        });
    }

    /// The active records of one bucket, in log order. `None` selects the
    /// campaign-wide bucket.
    #[must_use]
    pub fn records_for(&self, scenario: Option<&ScenarioId>) -> Vec<&InputRecord> {
        Replay::run(&self.entries)
            .active
            .into_iter()
            .filter(|(_, r)| r.scenario.as_ref() == scenario)
            .map(|(_, r)| r)
            .collect()
    }

    /// Every active record, in log order.
    #[must_use]
    pub fn active(&self) -> Vec<&InputRecord> {
        Replay::run(&self.entries)
            .active
            .into_iter()
            .map(|(_, r)| r)
            .collect()
    }

    #[must_use]
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ids of records present in the log but retracted by an undo or reset.
    #[must_use]
    pub fn retracted_ids(&self) -> HashSet<Uuid> {
        let active: HashSet<Uuid> = self.active().iter().map(|r| r.id).collect();
        self.entries
            .iter()
            .filter_map(|entry| match entry {
                LogEntry::Input(record) if !active.contains(&record.id) => Some(record.id),
                _ => None,
            })
            .collect()
    }

    /// Combines the active records of two logs of the same campaign.
    ///
    /// A record retracted on either side stays retracted, even if the other
    /// side still holds it. Records are ordered by `recorded_at`, ties
    /// keeping `self` before `other` and log order within each. Duplicate
    /// record ids are dropped. For last-writer-wins kinds only the latest
    /// record per identity survives; cumulative records are all kept. The
    /// setup of `self` is kept.
    #[must_use]
    pub fn merge(&self, other: &InputLog) -> InputLog {
        let mut retracted = self.retracted_ids();
        retracted.extend(other.retracted_ids());

        let mut combined: Vec<&InputRecord> = self.active();
        combined.extend(other.active());
        combined.retain(|r| !retracted.contains(&r.id));
        combined.sort_by_key(|r| r.recorded_at);

        let mut seen_ids = HashSet::new();
        combined.retain(|r| seen_ids.insert(r.id));

        let mut last_for_identity: BTreeMap<InputIdentity, usize> = BTreeMap::new();
        for (index, record) in combined.iter().enumerate() {
            if !record.kind().is_cumulative() {
                last_for_identity.insert(record.identity(), index);
            }
        }

        let mut merged = InputLog::new(self.setup.clone());
        for (index, record) in combined.into_iter().enumerate() {
            let keep = record.kind().is_cumulative()
                || last_for_identity.get(&record.identity()) == Some(&index);
            if keep {
                merged.append(record.clone());
            }
        }
        merged
    }
}
