//! The derived campaign log.
//!
//! A `CampaignLog` is never edited by players: the builder produces a fresh
//! one from the guide and the input log on every build.

use std::collections::BTreeMap;

use guidebook_script::{
    AchievementDef, AchievementKind, AchievementOperation, CountOperation, Difficulty, ScenarioId,
    StepId,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::input_log::InvestigatorSetup;
use super::records::TraumaAdjustment;

/// A recorded campaign log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntryState {
    pub id: String,
    pub crossed_out: bool,
    /// Player-written text for freeform sections.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum AchievementValue {
    Binary(bool),
    Count(u32),
}

impl AchievementValue {
    /// Whether the achievement counts as earned.
    #[must_use]
    pub fn is_earned(self) -> bool {
        match self {
            Self::Binary(earned) => earned,
            Self::Count(count) => count > 0,
        }
    }
}

/// An achievement operation that does not fit the achievement's kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("achievement {achievement} does not support operation {operation:?}")]
pub struct AchievementMismatch {
    pub achievement: String,
    pub operation: AchievementOperation,
}

/// Per-investigator state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvestigatorLog {
    pub name: String,
    pub health: u32,
    pub sanity: u32,
    pub physical: u32,
    pub mental: u32,
    pub killed: bool,
    pub insane: bool,
    pub spent_xp: u32,
    /// Experience credited by completed scenarios.
    pub total_xp: u32,
    pub supplies: BTreeMap<String, i32>,
}

impl InvestigatorLog {
    #[must_use]
    pub fn new(setup: &InvestigatorSetup) -> Self {
        Self {
            name: setup.name.clone(),
            health: setup.health,
            sanity: setup.sanity,
            physical: 0,
            mental: 0,
            killed: false,
            insane: false,
            spent_xp: 0,
            total_xp: 0,
            supplies: BTreeMap::new(),
        }
    }

    /// Killed, driven insane, or carrying trauma equal to health or sanity.
    #[must_use]
    pub fn eliminated(&self) -> bool {
        self.killed || self.insane || self.physical >= self.health || self.mental >= self.sanity
    }

    pub fn apply_trauma(&mut self, trauma: &TraumaAdjustment) {
        self.physical = self.physical.saturating_add(trauma.physical);
        self.mental = self.mental.saturating_add(trauma.mental);
        self.killed |= trauma.killed;
        self.insane |= trauma.insane;
        self.spent_xp = self.spent_xp.saturating_add(trauma.spent_xp);
    }

    /// Adds (or removes) supplies; counts never drop below zero.
    pub fn adjust_supply(&mut self, supply: &str, delta: i32) {
        let count = self.supplies.entry(supply.to_owned()).or_insert(0);
        *count = count.saturating_add(delta).max(0);
    }

    /// Experience available to spend.
    #[must_use]
    pub fn available_xp(&self) -> u32 {
        self.total_xp.saturating_sub(self.spent_xp)
    }
}

/// A consumed answer to an input step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Answer {
    Decision {
        value: bool,
    },
    Count {
        value: i32,
    },
    Choice {
        index: usize,
        label: String,
    },
    ChoiceList {
        choices: BTreeMap<String, Vec<i32>>,
    },
    StringChoices {
        choices: BTreeMap<String, Vec<String>>,
    },
    Text {
        text: String,
    },
    Supplies {
        supplies: BTreeMap<String, BTreeMap<String, i32>>,
    },
    InterScenarioTrauma {
        investigators: BTreeMap<String, TraumaAdjustment>,
    },
    CampaignLink {
        decision: String,
    },
}

/// Campaign state derived by folding the input log over the guide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignLog {
    pub difficulty: Difficulty,
    pub sections: BTreeMap<String, Vec<LogEntryState>>,
    pub counts: BTreeMap<String, i32>,
    pub achievements: BTreeMap<String, AchievementValue>,
    pub investigators: BTreeMap<String, InvestigatorLog>,
    pub chaos_bag: BTreeMap<String, u32>,
    /// Resolution reached by each completed scenario.
    pub resolutions: BTreeMap<ScenarioId, String>,
    pub lead_investigators: BTreeMap<ScenarioId, String>,
    pub answers: BTreeMap<ScenarioId, BTreeMap<StepId, Answer>>,
}

impl CampaignLog {
    #[must_use]
    pub fn new(difficulty: Difficulty, chaos_bag: BTreeMap<String, u32>) -> Self {
        Self {
            difficulty,
            sections: BTreeMap::new(),
            counts: BTreeMap::new(),
            achievements: BTreeMap::new(),
            investigators: BTreeMap::new(),
            chaos_bag,
            resolutions: BTreeMap::new(),
            lead_investigators: BTreeMap::new(),
            answers: BTreeMap::new(),
        }
    }

    pub fn add_investigator(&mut self, setup: &InvestigatorSetup) {
        self.investigators
            .insert(setup.id.clone(), InvestigatorLog::new(setup));
    }

    /// Ensures the section is present, even without entries.
    pub fn open_section(&mut self, section: &str) {
        self.sections.entry(section.to_owned()).or_default();
    }

    /// Records an entry. Recording an entry again restores it if it was
    /// crossed out and replaces its text.
    pub fn record_entry(&mut self, section: &str, id: &str, text: Option<String>) {
        let entries = self.sections.entry(section.to_owned()).or_default();
        match entries.iter_mut().find(|e| e.id == id) {
            Some(entry) => {
                entry.crossed_out = false;
                entry.text = text;
            }
            None => entries.push(LogEntryState {
                id: id.to_owned(),
                crossed_out: false,
                text,
            }),
        }
    }

    /// Crosses out an entry, recording it crossed out if it was never
    /// recorded.
    pub fn cross_out(&mut self, section: &str, id: &str) {
        let entries = self.sections.entry(section.to_owned()).or_default();
        match entries.iter_mut().find(|e| e.id == id) {
            Some(entry) => entry.crossed_out = true,
            None => entries.push(LogEntryState {
                id: id.to_owned(),
                crossed_out: true,
                text: None,
            }),
        }
    }

    /// Whether the entry is recorded and not crossed out.
    #[must_use]
    pub fn is_recorded(&self, section: &str, id: &str) -> bool {
        self.sections
            .get(section)
            .is_some_and(|entries| entries.iter().any(|e| e.id == id && !e.crossed_out))
    }

    /// The counter's value; counters never touched are zero.
    #[must_use]
    pub fn count(&self, counter: &str) -> i32 {
        self.counts.get(counter).copied().unwrap_or(0)
    }

    pub fn apply_count(&mut self, counter: &str, operation: CountOperation, value: i32) {
        let current = self.counts.entry(counter.to_owned()).or_insert(0);
        *current = match operation {
            CountOperation::Set => value,
            CountOperation::Add => current.saturating_add(value),
            CountOperation::Subtract => current.saturating_sub(value),
        };
    }

    /// Applies an achievement operation. Counters are clamped to zero and to
    /// `max_override`, or the definition's max when no override is given.
    ///
    /// # Errors
    ///
    /// Returns `AchievementMismatch` for counter operations on a binary
    /// achievement and vice versa.
    pub fn apply_achievement(
        &mut self,
        def: &AchievementDef,
        operation: AchievementOperation,
        max_override: Option<u32>,
    ) -> Result<(), AchievementMismatch> {
        let mismatch = || AchievementMismatch {
            achievement: def.id.clone(),
            operation,
        };
        let value = match (def.kind, operation) {
            (AchievementKind::Binary, AchievementOperation::Set) => AchievementValue::Binary(true),
            (AchievementKind::Binary, AchievementOperation::Clear) => {
                AchievementValue::Binary(false)
            }
            (AchievementKind::Count { max }, AchievementOperation::Inc) => {
                let current = self.achievement_count(&def.id);
                let cap = max_override.or(max);
                if cap.is_none_or(|cap| current < cap) {
                    AchievementValue::Count(current.saturating_add(1))
                } else {
                    AchievementValue::Count(current)
                }
            }
            (AchievementKind::Count { .. }, AchievementOperation::Dec) => {
                AchievementValue::Count(self.achievement_count(&def.id).saturating_sub(1))
            }
            (AchievementKind::Binary, _) | (AchievementKind::Count { .. }, _) => {
                return Err(mismatch());
            }
        };
        self.achievements.insert(def.id.clone(), value);
        Ok(())
    }

    fn achievement_count(&self, id: &str) -> u32 {
        match self.achievements.get(id) {
            Some(AchievementValue::Count(count)) => *count,
            Some(AchievementValue::Binary(_)) | None => 0,
        }
    }

    /// Whether an achievement is earned (binary set, or counter above zero).
    #[must_use]
    pub fn achievement_earned(&self, id: &str) -> bool {
        self.achievements
            .get(id)
            .is_some_and(|value| value.is_earned())
    }

    /// Adds or removes chaos tokens. Tokens that reach zero leave the bag.
    pub fn adjust_chaos_bag(&mut self, token: &str, delta: i32) {
        let count = self
            .chaos_bag
            .get(token)
            .copied()
            .unwrap_or(0)
            .saturating_add_signed(delta);
        if count == 0 {
            self.chaos_bag.remove(token);
        } else {
            self.chaos_bag.insert(token.to_owned(), count);
        }
    }

    #[must_use]
    pub fn answer(&self, scenario: &ScenarioId, step: &StepId) -> Option<&Answer> {
        self.answers.get(scenario).and_then(|a| a.get(step))
    }

    pub fn record_answer(&mut self, scenario: &ScenarioId, step: &StepId, answer: Answer) {
        self.answers
            .entry(scenario.clone())
            .or_default()
            .insert(step.clone(), answer);
    }

    #[must_use]
    pub fn lead_investigator(&self, scenario: &ScenarioId) -> Option<&str> {
        self.lead_investigators.get(scenario).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter(max: Option<u32>) -> AchievementDef {
        AchievementDef {
            id: "elder_sign_count".to_owned(),
            title: "Elder signs".to_owned(),
            kind: AchievementKind::Count { max },
        }
    }

    fn binary() -> AchievementDef {
        AchievementDef {
            id: "arkham_saved".to_owned(),
            title: "Arkham saved".to_owned(),
            kind: AchievementKind::Binary,
        }
    }

    fn empty_log() -> CampaignLog {
        CampaignLog::new(Difficulty::Standard, BTreeMap::new())
    }

    #[test]
    fn test_counter_achievement_is_clamped_to_max() {
        // Arrange
        let mut log = empty_log();
        let def = counter(Some(3));

        // Act
        for _ in 0..5 {
            log.apply_achievement(&def, AchievementOperation::Inc, None)
                .unwrap();
        }

        // Assert
        assert_eq!(
            log.achievements["elder_sign_count"],
            AchievementValue::Count(3)
        );
    }

    #[test]
    fn test_max_override_takes_precedence_over_definition() {
        let mut log = empty_log();
        let def = counter(Some(3));

        for _ in 0..4 {
            log.apply_achievement(&def, AchievementOperation::Inc, Some(2))
                .unwrap();
        }

        assert_eq!(
            log.achievements["elder_sign_count"],
            AchievementValue::Count(2)
        );
    }

    #[test]
    fn test_counter_achievement_never_drops_below_zero() {
        let mut log = empty_log();
        let def = counter(None);

        log.apply_achievement(&def, AchievementOperation::Inc, None)
            .unwrap();
        log.apply_achievement(&def, AchievementOperation::Dec, None)
            .unwrap();
        log.apply_achievement(&def, AchievementOperation::Dec, None)
            .unwrap();

        assert_eq!(
            log.achievements["elder_sign_count"],
            AchievementValue::Count(0)
        );
        assert!(!log.achievement_earned("elder_sign_count"));
    }

    #[test]
    fn test_uncapped_counter_saturates_instead_of_overflowing() {
        let mut log = empty_log();
        log.achievements
            .insert("elder_sign_count".to_owned(), AchievementValue::Count(u32::MAX));

        log.apply_achievement(&counter(None), AchievementOperation::Inc, None)
            .unwrap();

        assert_eq!(
            log.achievements["elder_sign_count"],
            AchievementValue::Count(u32::MAX)
        );
    }

    #[test]
    fn test_binary_achievement_rejects_counter_operations() {
        let mut log = empty_log();

        let result = log.apply_achievement(&binary(), AchievementOperation::Inc, None);

        assert!(result.is_err());
        assert!(log.achievements.is_empty());
    }

    #[test]
    fn test_cross_out_and_rerecord_entry() {
        let mut log = empty_log();
        log.record_entry("campaign_notes", "house_burned", None);

        log.cross_out("campaign_notes", "house_burned");
        assert!(!log.is_recorded("campaign_notes", "house_burned"));

        log.record_entry("campaign_notes", "house_burned", None);
        assert!(log.is_recorded("campaign_notes", "house_burned"));
        assert_eq!(log.sections["campaign_notes"].len(), 1);
    }

    #[test]
    fn test_chaos_bag_tokens_saturate_and_disappear_at_zero() {
        let mut log = CampaignLog::new(
            Difficulty::Easy,
            BTreeMap::from([("skull".to_owned(), 2)]),
        );

        log.adjust_chaos_bag("skull", -5);
        log.adjust_chaos_bag("elder_thing", 1);

        assert_eq!(
            log.chaos_bag,
            BTreeMap::from([("elder_thing".to_owned(), 1)])
        );
    }

    #[test]
    fn test_count_operations() {
        let mut log = empty_log();

        log.apply_count("doom", CountOperation::Add, 3);
        log.apply_count("doom", CountOperation::Subtract, 1);
        assert_eq!(log.count("doom"), 2);

        log.apply_count("doom", CountOperation::Set, 7);
        assert_eq!(log.count("doom"), 7);
        assert_eq!(log.count("untouched"), 0);
    }

    #[test]
    fn test_investigator_eliminated_by_trauma_threshold() {
        let mut investigator = InvestigatorLog::new(&InvestigatorSetup {
            id: "roland".to_owned(),
            name: "Roland Banks".to_owned(),
            health: 3,
            sanity: 3,
        });
        assert!(!investigator.eliminated());

        investigator.apply_trauma(&TraumaAdjustment {
            mental: 3,
            ..TraumaAdjustment::default()
        });

        assert!(investigator.eliminated());
    }
}
