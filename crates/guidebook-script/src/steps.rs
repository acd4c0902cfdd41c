//! Scenario steps, effects, prompts and branch conditions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::guide::StepId;

/// A single step of a scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub id: StepId,
    /// Explicit jump taken once this step completes. Without it the walk
    /// continues with the following step.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<StepId>,
    #[serde(flatten)]
    pub kind: StepKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StepKind {
    /// Narrative text. No effect on the campaign log.
    Story { text: String },
    /// Effects applied in order.
    Effects { effects: Vec<Effect> },
    /// Jump selected by a condition.
    Branch { condition: Condition },
    /// A prompt the player must answer before the walk can continue.
    Input { prompt: Prompt },
    /// Ends the scenario with the given resolution.
    Resolution { resolution: String },
}

/// What a player is asked at an input step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Prompt {
    /// Yes/no.
    Decision,
    Count {
        #[serde(default)]
        min: i32,
        #[serde(default)]
        max: Option<i32>,
    },
    /// Pick exactly one option.
    Choice { options: Vec<String> },
    /// Assign numbers to any of the options.
    ChoiceList { options: Vec<String> },
    /// Assign strings (usually card codes) to any of the options.
    StringChoices { options: Vec<String> },
    Text,
    /// Distribute supplies among investigators.
    Supplies { supplies: Vec<String> },
    /// Trauma and spent experience recorded between scenarios.
    InterScenarioTrauma,
    /// A decision forwarded to a linked campaign.
    CampaignLink,
}

/// Which investigators an effect or condition targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvestigatorScope {
    LeadInvestigator,
    All,
}

/// A numeric operand: a literal or the count recorded at an input step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Literal(i32),
    FromInput { input_step: StepId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountOperation {
    Set,
    Add,
    Subtract,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementOperation {
    /// Earn a binary achievement.
    Set,
    /// Revoke a binary achievement.
    Clear,
    /// Increment a counter achievement, clamped at its max.
    Inc,
    /// Decrement a counter achievement, clamped at zero.
    Dec,
}

/// A change applied to the campaign log by an effects step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Effect {
    /// Record (or cross out) a declared entry. Without an id the section is
    /// only opened.
    CampaignLog {
        section: String,
        #[serde(default)]
        id: Option<String>,
        #[serde(default)]
        cross_out: bool,
    },
    /// Record the text answered at `input_step`.
    FreeformCampaignLog { section: String, input_step: StepId },
    /// Record the selections made at `input_step` as entries of `section`:
    /// every string (usually a card code) of a string-choices answer, or
    /// every option given a non-zero number in a choice-list answer.
    CampaignLogCards { section: String, input_step: StepId },
    CampaignLogCount {
        counter: String,
        operation: CountOperation,
        value: Value,
    },
    Trauma {
        investigator: InvestigatorScope,
        #[serde(default)]
        physical: u32,
        #[serde(default)]
        mental: u32,
        #[serde(default)]
        killed: bool,
        #[serde(default)]
        insane: bool,
    },
    /// Experience earned in this scenario; credited at its resolution.
    EarnXp {
        investigator: InvestigatorScope,
        amount: Value,
    },
    /// Add (positive) or remove (negative) chaos tokens.
    ChaosBag { tokens: BTreeMap<String, i32> },
    Achievement {
        id: String,
        operation: AchievementOperation,
    },
    Supplies {
        investigator: InvestigatorScope,
        supply: String,
        count: i32,
    },
}

/// A branch condition together with the jump table for its decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    #[serde(flatten)]
    pub test: ConditionTest,
    #[serde(default)]
    pub options: Vec<BranchOption>,
}

impl Condition {
    /// Returns the jump target for a decision, if any option matches.
    #[must_use]
    pub fn target_for(&self, decision: &Decision) -> Option<&StepId> {
        self.options
            .iter()
            .find(|o| &o.when == decision)
            .map(|o| &o.goto)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConditionTest {
    /// Whether the lead investigator (or every investigator) is eliminated.
    Trauma { investigator: InvestigatorScope },
    /// Whether an entry is recorded and not crossed out.
    CampaignLog { section: String, id: String },
    CampaignLogCount {
        counter: String,
        comparison: Comparison,
        value: i32,
    },
    /// The yes/no answer given at `step`.
    Decision { step: StepId },
    /// The option label chosen at `step`, or a campaign link decision.
    Choice { step: StepId },
    Achievement { id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    AtLeast,
    AtMost,
    Equals,
}

impl Comparison {
    #[must_use]
    pub fn holds(self, actual: i32, expected: i32) -> bool {
        match self {
            Self::AtLeast => actual >= expected,
            Self::AtMost => actual <= expected,
            Self::Equals => actual == expected,
        }
    }
}

/// The outcome of a condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Decision {
    Binary(bool),
    Option(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchOption {
    pub when: Decision,
    pub goto: StepId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comparison_holds() {
        assert!(Comparison::AtLeast.holds(3, 3));
        assert!(!Comparison::AtLeast.holds(2, 3));
        assert!(Comparison::AtMost.holds(2, 3));
        assert!(Comparison::Equals.holds(0, 0));
        assert!(!Comparison::Equals.holds(1, 0));
    }

    #[test]
    fn test_condition_target_for_matches_first_option() {
        // Arrange
        let condition = Condition {
            test: ConditionTest::Decision {
                step: StepId::new("d1"),
            },
            options: vec![
                BranchOption {
                    when: Decision::Binary(true),
                    goto: StepId::new("r1"),
                },
                BranchOption {
                    when: Decision::Binary(false),
                    goto: StepId::new("r2"),
                },
            ],
        };

        // Act / Assert
        assert_eq!(
            condition.target_for(&Decision::Binary(false)),
            Some(&StepId::new("r2"))
        );
        assert_eq!(condition.target_for(&Decision::Option("x".into())), None);
    }

    #[test]
    fn test_branch_step_deserializes_from_yaml() {
        // Arrange
        let yaml = r"
id: house
type: branch
condition:
  type: decision
  step: burn
  options:
    - when: true
      goto: burned
    - when: false
      goto: spared
";

        // Act
        let step: Step = serde_yaml::from_str(yaml).unwrap();

        // Assert
        assert_eq!(step.id, StepId::new("house"));
        match step.kind {
            StepKind::Branch { condition } => {
                assert_eq!(
                    condition.test,
                    ConditionTest::Decision {
                        step: StepId::new("burn")
                    }
                );
                assert_eq!(condition.options.len(), 2);
            }
            other => panic!("expected Branch, got {other:?}"),
        }
    }

    #[test]
    fn test_value_deserializes_literal_and_input_reference() {
        let literal: Value = serde_json::from_str("2").unwrap();
        let input: Value = serde_json::from_str(r#"{ "input_step": "xp" }"#).unwrap();

        assert_eq!(literal, Value::Literal(2));
        assert_eq!(
            input,
            Value::FromInput {
                input_step: StepId::new("xp")
            }
        );
    }
}
