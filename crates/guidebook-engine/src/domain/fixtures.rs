//! Record builders shared by the engine's unit tests.

use chrono::{DateTime, Duration, TimeZone, Utc};
use guidebook_script::{AchievementOperation, Difficulty, ScenarioId, StepId};
use uuid::Uuid;

use super::input_log::{CampaignSetup, InputLog, InvestigatorSetup};
use super::records::{InputPayload, InputRecord};

/// `minute` minutes after the fixed test instant.
pub(crate) fn at(minute: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap() + Duration::minutes(minute)
}

pub(crate) fn setup() -> CampaignSetup {
    CampaignSetup {
        name: "Arkham nights".to_owned(),
        guide_id: "night_of_the_zealot".to_owned(),
        guide_version: 2,
        difficulty: Difficulty::Standard,
        investigators: vec![
            InvestigatorSetup {
                id: "roland".to_owned(),
                name: "Roland Banks".to_owned(),
                health: 9,
                sanity: 5,
            },
            InvestigatorSetup {
                id: "agnes".to_owned(),
                name: "Agnes Baker".to_owned(),
                health: 6,
                sanity: 8,
            },
        ],
    }
}

pub(crate) fn new_log() -> InputLog {
    InputLog::new(setup())
}

pub(crate) fn answer(scenario: &str, step: &str, payload: InputPayload, minute: i64) -> InputRecord {
    InputRecord::new(
        Uuid::new_v4(),
        Some(ScenarioId::new(scenario)),
        Some(StepId::new(step)),
        payload,
        at(minute),
    )
}

pub(crate) fn start(scenario: &str, minute: i64) -> InputRecord {
    InputRecord::new(
        Uuid::new_v4(),
        Some(ScenarioId::new(scenario)),
        None,
        InputPayload::StartScenario {
            lead_investigator: None,
        },
        at(minute),
    )
}

pub(crate) fn start_side(scenario: &str, after: Option<&str>, minute: i64) -> InputRecord {
    InputRecord::new(
        Uuid::new_v4(),
        Some(ScenarioId::new(scenario)),
        None,
        InputPayload::StartSideScenario {
            after: after.map(ScenarioId::new),
            lead_investigator: None,
        },
        at(minute),
    )
}

pub(crate) fn start_custom(scenario: &str, name: &str, after: Option<&str>, xp_cost: u32, minute: i64) -> InputRecord {
    InputRecord::new(
        Uuid::new_v4(),
        Some(ScenarioId::new(scenario)),
        None,
        InputPayload::StartCustomSideScenario {
            name: name.to_owned(),
            after: after.map(ScenarioId::new),
            xp_cost,
        },
        at(minute),
    )
}

pub(crate) fn decision(scenario: &str, step: &str, value: bool, minute: i64) -> InputRecord {
    answer(scenario, step, InputPayload::Decision { decision: value }, minute)
}

pub(crate) fn count(scenario: &str, step: &str, value: i32, minute: i64) -> InputRecord {
    answer(scenario, step, InputPayload::Count { count: value }, minute)
}

pub(crate) fn choice(scenario: &str, step: &str, index: usize, minute: i64) -> InputRecord {
    answer(scenario, step, InputPayload::Choice { choice: index }, minute)
}

pub(crate) fn achievement_inc(achievement: &str, minute: i64) -> InputRecord {
    InputRecord::new(
        Uuid::new_v4(),
        None,
        None,
        InputPayload::AchievementOp {
            achievement: achievement.to_owned(),
            operation: AchievementOperation::Inc,
            max: None,
        },
        at(minute),
    )
}
