//! Per-scenario progress.

use std::collections::BTreeMap;

use guidebook_script::{ScenarioId, StepId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ScenarioStatus {
    NotStarted,
    /// In progress. `pending_at` names the step waiting for input; `None`
    /// means the walk ran off the end of the script or was abandoned.
    Started { pending_at: Option<StepId> },
    Completed { resolution: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("scenario {0} has not been started")]
    NotStarted(ScenarioId),

    #[error("scenario {0} is already started")]
    AlreadyStarted(ScenarioId),

    #[error("scenario {0} is already completed")]
    AlreadyCompleted(ScenarioId),
}

/// Progress through one scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioState {
    pub scenario_id: ScenarioId,
    /// Display name of a side scenario played outside the guide.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_name: Option<String>,
    #[serde(flatten)]
    pub status: ScenarioStatus,
    /// Input steps answered, in walk order.
    pub answered_steps: Vec<StepId>,
    /// Experience earned by each investigator during this scenario. It is
    /// credited to the investigators only once the scenario completes.
    pub xp_earned: BTreeMap<String, u32>,
}

impl ScenarioState {
    #[must_use]
    pub fn new(scenario_id: ScenarioId) -> Self {
        Self {
            scenario_id,
            custom_name: None,
            status: ScenarioStatus::NotStarted,
            answered_steps: Vec::new(),
            xp_earned: BTreeMap::new(),
        }
    }

    /// # Errors
    ///
    /// Fails unless the scenario is not started.
    pub fn start(&mut self) -> Result<(), TransitionError> {
        match self.status {
            ScenarioStatus::NotStarted => {
                self.status = ScenarioStatus::Started { pending_at: None };
                Ok(())
            }
            ScenarioStatus::Started { .. } => {
                Err(TransitionError::AlreadyStarted(self.scenario_id.clone()))
            }
            ScenarioStatus::Completed { .. } => {
                Err(TransitionError::AlreadyCompleted(self.scenario_id.clone()))
            }
        }
    }

    /// Marks the scenario as waiting for input at `step`.
    ///
    /// # Errors
    ///
    /// Fails unless the scenario is started.
    pub fn await_input(&mut self, step: StepId) -> Result<(), TransitionError> {
        match self.status {
            ScenarioStatus::Started { .. } => {
                self.status = ScenarioStatus::Started {
                    pending_at: Some(step),
                };
                Ok(())
            }
            ScenarioStatus::NotStarted => {
                Err(TransitionError::NotStarted(self.scenario_id.clone()))
            }
            ScenarioStatus::Completed { .. } => {
                Err(TransitionError::AlreadyCompleted(self.scenario_id.clone()))
            }
        }
    }

    /// # Errors
    ///
    /// Fails unless the scenario is started. Completed is terminal.
    pub fn complete(&mut self, resolution: String) -> Result<(), TransitionError> {
        match self.status {
            ScenarioStatus::Started { .. } => {
                self.status = ScenarioStatus::Completed { resolution };
                Ok(())
            }
            ScenarioStatus::NotStarted => {
                Err(TransitionError::NotStarted(self.scenario_id.clone()))
            }
            ScenarioStatus::Completed { .. } => {
                Err(TransitionError::AlreadyCompleted(self.scenario_id.clone()))
            }
        }
    }

    /// Forces the scenario back to not started, forgetting its progress.
    pub fn reset(&mut self) {
        self.status = ScenarioStatus::NotStarted;
        self.answered_steps.clear();
        self.xp_earned.clear();
    }

    #[must_use]
    pub fn pending_at(&self) -> Option<&StepId> {
        match &self.status {
            ScenarioStatus::Started { pending_at } => pending_at.as_ref(),
            ScenarioStatus::NotStarted | ScenarioStatus::Completed { .. } => None,
        }
    }

    #[must_use]
    pub fn resolution(&self) -> Option<&str> {
        match &self.status {
            ScenarioStatus::Completed { resolution } => Some(resolution),
            ScenarioStatus::NotStarted | ScenarioStatus::Started { .. } => None,
        }
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        matches!(self.status, ScenarioStatus::Completed { .. })
    }
}
