//! Structural validation of campaign guides.
//!
//! Fatal issues break the step graph (duplicate ids, jumps to nowhere,
//! references to prompts that do not exist) and make a guide unloadable.
//! Unknown campaign log or achievement references are only warnings here:
//! the interpreter reports them per step at build time.

use std::collections::BTreeSet;

use thiserror::Error;

use crate::guide::{CampaignGuide, ScenarioGuide, ScenarioId, StepId};
use crate::steps::{ConditionTest, Effect, StepKind, Value};

/// A problem found in a guide document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptIssue {
    #[error("scenario {0} is declared more than once")]
    DuplicateScenario(ScenarioId),

    #[error("scenario {0} has no steps")]
    EmptyScenario(ScenarioId),

    #[error("scenario {scenario}: step {step} is declared more than once")]
    DuplicateStep { scenario: ScenarioId, step: StepId },

    #[error("scenario {scenario}: step {step} jumps to unknown step {target}")]
    UnknownTarget {
        scenario: ScenarioId,
        step: StepId,
        target: StepId,
    },

    #[error("scenario {scenario}: step {step} reads {input_step}, which is not an input step")]
    UnknownInputStep {
        scenario: ScenarioId,
        step: StepId,
        input_step: StepId,
    },

    #[error("scenario {scenario}: step {step} references unknown campaign log {reference}")]
    UnknownLogReference {
        scenario: ScenarioId,
        step: StepId,
        reference: String,
    },

    #[error("scenario {scenario}: step {step} references unknown achievement {achievement}")]
    UnknownAchievement {
        scenario: ScenarioId,
        step: StepId,
        achievement: String,
    },
}

impl ScriptIssue {
    /// Whether the issue prevents the guide from loading.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Self::UnknownLogReference { .. } | Self::UnknownAchievement { .. }
        )
    }
}

/// Returns every issue found in `guide`, fatal ones and warnings alike.
#[must_use]
pub fn validate(guide: &CampaignGuide) -> Vec<ScriptIssue> {
    let mut issues = Vec::new();
    let mut seen = BTreeSet::new();
    for scenario in &guide.scenarios {
        if !seen.insert(&scenario.id) {
            issues.push(ScriptIssue::DuplicateScenario(scenario.id.clone()));
        }
        validate_scenario(guide, scenario, &mut issues);
    }
    issues
}

fn validate_scenario(guide: &CampaignGuide, scenario: &ScenarioGuide, issues: &mut Vec<ScriptIssue>) {
    if scenario.steps.is_empty() {
        issues.push(ScriptIssue::EmptyScenario(scenario.id.clone()));
        return;
    }

    let mut step_ids = BTreeSet::new();
    for step in &scenario.steps {
        if !step_ids.insert(&step.id) {
            issues.push(ScriptIssue::DuplicateStep {
                scenario: scenario.id.clone(),
                step: step.id.clone(),
            });
        }
    }
    let input_steps: BTreeSet<&StepId> = scenario
        .steps
        .iter()
        .filter(|s| matches!(s.kind, StepKind::Input { .. }))
        .map(|s| &s.id)
        .collect();

    for step in &scenario.steps {
        let mut targets: Vec<&StepId> = step.next.iter().collect();
        let mut reads: Vec<&StepId> = Vec::new();
        let mut log_refs: Vec<String> = Vec::new();
        let mut achievement_refs: Vec<&String> = Vec::new();

        match &step.kind {
            StepKind::Branch { condition } => {
                targets.extend(condition.options.iter().map(|o| &o.goto));
                match &condition.test {
                    ConditionTest::Decision { step: read } | ConditionTest::Choice { step: read } => {
                        reads.push(read);
                    }
                    ConditionTest::CampaignLog { section, id } => {
                        if guide.log_entry(section, id).is_none() {
                            log_refs.push(format!("{section}/{id}"));
                        }
                    }
                    ConditionTest::Achievement { id } => achievement_refs.push(id),
                    ConditionTest::Trauma { .. } | ConditionTest::CampaignLogCount { .. } => {}
                }
            }
            StepKind::Effects { effects } => {
                for effect in effects {
                    match effect {
                        Effect::CampaignLog {
                            section, id: Some(id), ..
                        } => {
                            if guide.log_entry(section, id).is_none() {
                                log_refs.push(format!("{section}/{id}"));
                            }
                        }
                        Effect::CampaignLog { section, id: None, .. } => {
                            if guide.log_section(section).is_none() {
                                log_refs.push(section.clone());
                            }
                        }
                        Effect::FreeformCampaignLog { section, input_step }
                        | Effect::CampaignLogCards { section, input_step } => {
                            reads.push(input_step);
                            if guide.log_section(section).is_none() {
                                log_refs.push(section.clone());
                            }
                        }
                        Effect::CampaignLogCount {
                            value: Value::FromInput { input_step },
                            ..
                        }
                        | Effect::EarnXp {
                            amount: Value::FromInput { input_step },
                            ..
                        } => reads.push(input_step),
                        Effect::Achievement { id, .. } => achievement_refs.push(id),
                        Effect::CampaignLogCount { .. }
                        | Effect::EarnXp { .. }
                        | Effect::Trauma { .. }
                        | Effect::ChaosBag { .. }
                        | Effect::Supplies { .. } => {}
                    }
                }
            }
            StepKind::Story { .. } | StepKind::Input { .. } | StepKind::Resolution { .. } => {}
        }

        for target in targets.into_iter().filter(|t| !step_ids.contains(t)) {
            issues.push(ScriptIssue::UnknownTarget {
                scenario: scenario.id.clone(),
                step: step.id.clone(),
                target: target.clone(),
            });
        }
        for read in reads.into_iter().filter(|r| !input_steps.contains(r)) {
            issues.push(ScriptIssue::UnknownInputStep {
                scenario: scenario.id.clone(),
                step: step.id.clone(),
                input_step: read.clone(),
            });
        }
        for reference in log_refs {
            issues.push(ScriptIssue::UnknownLogReference {
                scenario: scenario.id.clone(),
                step: step.id.clone(),
                reference,
            });
        }
        for achievement in achievement_refs.into_iter().filter(|a| guide.achievement(a).is_none()) {
            issues.push(ScriptIssue::UnknownAchievement {
                scenario: scenario.id.clone(),
                step: step.id.clone(),
                achievement: achievement.clone(),
            });
        }
    }
}
