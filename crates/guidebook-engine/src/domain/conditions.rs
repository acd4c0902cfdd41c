//! Branch condition evaluation.
//!
//! `evaluate` is a pure function of the condition and the campaign log built
//! so far. A decision or choice that has not been answered yet is not an
//! error: the branch is pending.

use guidebook_script::{
    CampaignGuide, Condition, ConditionTest, Decision, InvestigatorScope, ScenarioId, StepId,
};

use super::campaign_log::{Answer, CampaignLog};
use super::diagnostics::ScriptReferenceError;

/// The decision reached by a condition and the jump it selects. Without a
/// matching option the walk falls through to the following step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionResult {
    pub decision: Decision,
    pub next_step: Option<StepId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evaluation {
    Resolved(ConditionResult),
    /// The condition reads an input step that has no answer yet.
    Pending { awaiting: StepId },
}

/// Evaluates a branch condition inside `scenario`.
///
/// # Errors
///
/// Returns `ScriptReferenceError` when the condition names a log entry,
/// achievement or investigator that does not exist, or reads an answer of
/// the wrong kind.
pub fn evaluate(
    condition: &Condition,
    scenario: &ScenarioId,
    log: &CampaignLog,
    guide: &CampaignGuide,
) -> Result<Evaluation, ScriptReferenceError> {
    let decision = match &condition.test {
        ConditionTest::Trauma { investigator } => {
            Decision::Binary(eliminated(*investigator, scenario, log)?)
        }
        ConditionTest::CampaignLog { section, id } => {
            if guide.log_entry(section, id).is_none() {
                return Err(ScriptReferenceError::new(format!(
                    "unknown campaign log entry {section}/{id}"
                )));
            }
            Decision::Binary(log.is_recorded(section, id))
        }
        ConditionTest::CampaignLogCount {
            counter,
            comparison,
            value,
        } => Decision::Binary(comparison.holds(log.count(counter), *value)),
        ConditionTest::Decision { step } => match log.answer(scenario, step) {
            None => return Ok(Evaluation::Pending {
                awaiting: step.clone(),
            }),
            Some(Answer::Decision { value }) => Decision::Binary(*value),
            Some(_) => {
                return Err(ScriptReferenceError::new(format!(
                    "step {step} is not a decision"
                )));
            }
        },
        ConditionTest::Choice { step } => match log.answer(scenario, step) {
            None => return Ok(Evaluation::Pending {
                awaiting: step.clone(),
            }),
            Some(Answer::Choice { label, .. }) => Decision::Option(label.clone()),
            Some(Answer::CampaignLink { decision }) => Decision::Option(decision.clone()),
            Some(_) => {
                return Err(ScriptReferenceError::new(format!(
                    "step {step} is not a choice"
                )));
            }
        },
        ConditionTest::Achievement { id } => {
            if guide.achievement(id).is_none() {
                return Err(ScriptReferenceError::new(format!(
                    "unknown achievement {id}"
                )));
            }
            Decision::Binary(log.achievement_earned(id))
        }
    };

    let next_step = condition.target_for(&decision).cloned();
    Ok(Evaluation::Resolved(ConditionResult {
        decision,
        next_step,
    }))
}

fn eliminated(
    scope: InvestigatorScope,
    scenario: &ScenarioId,
    log: &CampaignLog,
) -> Result<bool, ScriptReferenceError> {
    match scope {
        InvestigatorScope::LeadInvestigator => {
            let lead = log.lead_investigator(scenario).ok_or_else(|| {
                ScriptReferenceError::new(format!("scenario {scenario} has no lead investigator"))
            })?;
            let investigator = log.investigators.get(lead).ok_or_else(|| {
                ScriptReferenceError::new(format!("unknown investigator {lead}"))
            })?;
            Ok(investigator.eliminated())
        }
        InvestigatorScope::All => {
            if log.investigators.is_empty() {
                return Err(ScriptReferenceError::new("campaign has no investigators"));
            }
            Ok(log.investigators.values().all(|i| i.eliminated()))
        }
    }
}
