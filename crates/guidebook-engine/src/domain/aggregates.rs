//! The guided campaign aggregate root.

use std::collections::BTreeSet;

use guidebook_core::aggregate::AggregateRoot;
use guidebook_core::clock::Clock;
use guidebook_core::error::DomainError;
use guidebook_core::event::EventMetadata;
use guidebook_script::ScenarioId;
use uuid::Uuid;

use super::events::{
    CampaignCreated, GuidedCampaignEvent, GuidedCampaignEventKind, InputRecorded, InputRedone,
    InputUndone, ScenarioReset,
};
use super::input_log::{CampaignSetup, InputLog};
use super::records::InputRecord;

/// A campaign being played through a guide. Its state is the input log;
/// everything else is derived by the builder.
#[derive(Debug)]
pub struct GuidedCampaign {
    pub id: Uuid,
    /// Number of persisted events applied.
    pub(crate) version: i64,
    input_log: Option<InputLog>,
    uncommitted_events: Vec<GuidedCampaignEvent>,
}

impl GuidedCampaign {
    #[must_use]
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            version: 0,
            input_log: None,
            uncommitted_events: Vec::new(),
        }
    }

    /// The input log, once the campaign has been created.
    #[must_use]
    pub fn input_log(&self) -> Option<&InputLog> {
        self.input_log.as_ref()
    }

    #[allow(clippy::cast_possible_wrap)]
    fn next_sequence_number(&self) -> i64 {
        self.version + self.uncommitted_events.len() as i64 + 1
    }

    fn raise(&mut self, kind: GuidedCampaignEventKind, correlation_id: Uuid, clock: &dyn Clock) {
        let event = GuidedCampaignEvent {
            metadata: EventMetadata {
                event_id: Uuid::new_v4(),
                event_type: kind.event_type().to_owned(),
                aggregate_id: self.id,
                sequence_number: self.next_sequence_number(),
                correlation_id,
                causation_id: correlation_id,
                occurred_at: clock.now(),
            },
            kind,
        };
        self.mutate(&event.kind);
        self.uncommitted_events.push(event);
    }

    fn created_log(&self) -> Result<&InputLog, DomainError> {
        self.input_log
            .as_ref()
            .ok_or(DomainError::CampaignNotFound(self.id))
    }

    /// Creates the campaign, producing a `CampaignCreated` event.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the campaign already exists or
    /// the investigator roster is empty, has duplicate ids, or has an
    /// investigator without health or sanity.
    pub fn create(
        &mut self,
        setup: CampaignSetup,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        if self.input_log.is_some() {
            return Err(DomainError::Validation(format!(
                "campaign {} already exists",
                self.id
            )));
        }
        if setup.name.trim().is_empty() {
            return Err(DomainError::Validation(
                "campaign name must not be empty".to_owned(),
            ));
        }
        if setup.investigators.is_empty() {
            return Err(DomainError::Validation(
                "a campaign needs at least one investigator".to_owned(),
            ));
        }
        let mut ids = BTreeSet::new();
        for investigator in &setup.investigators {
            if !ids.insert(investigator.id.as_str()) {
                return Err(DomainError::Validation(format!(
                    "investigator {} is listed more than once",
                    investigator.id
                )));
            }
            if investigator.health == 0 || investigator.sanity == 0 {
                return Err(DomainError::Validation(format!(
                    "investigator {} needs positive health and sanity",
                    investigator.id
                )));
            }
        }

        self.raise(
            GuidedCampaignEventKind::CampaignCreated(CampaignCreated {
                campaign_id: self.id,
                setup,
            }),
            correlation_id,
            clock,
        );
        Ok(())
    }

    /// Appends an input record, producing an `InputRecorded` event.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::CampaignNotFound` before creation and
    /// `DomainError::Validation` for records of the wrong shape.
    pub fn record_input(
        &mut self,
        record: InputRecord,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        self.created_log()?;
        record.validate()?;
        self.raise(
            GuidedCampaignEventKind::InputRecorded(InputRecorded { record }),
            correlation_id,
            clock,
        );
        Ok(())
    }

    /// Retracts the latest active record of a bucket. Returns `false`, and
    /// produces no event, when there is nothing to undo.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::CampaignNotFound` before creation.
    pub fn undo_input(
        &mut self,
        scenario: Option<ScenarioId>,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<bool, DomainError> {
        if !self.created_log()?.can_undo(scenario.as_ref()) {
            return Ok(false);
        }
        self.raise(
            GuidedCampaignEventKind::InputUndone(InputUndone { scenario }),
            correlation_id,
            clock,
        );
        Ok(true)
    }

    /// Re-activates the latest undone record of a bucket. Returns `false`,
    /// and produces no event, when there is nothing to redo.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::CampaignNotFound` before creation.
    pub fn redo_input(
        &mut self,
        scenario: Option<ScenarioId>,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<bool, DomainError> {
        if !self.created_log()?.can_redo(scenario.as_ref()) {
            return Ok(false);
        }
        self.raise(
            GuidedCampaignEventKind::InputRedone(InputRedone { scenario }),
            correlation_id,
            clock,
        );
        Ok(true)
    }

    /// Clears a scenario's records, keeping achievement operations.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::CampaignNotFound` before creation.
    pub fn reset_scenario(
        &mut self,
        scenario: ScenarioId,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        self.created_log()?;
        self.raise(
            GuidedCampaignEventKind::ScenarioReset(ScenarioReset { scenario }),
            correlation_id,
            clock,
        );
        Ok(())
    }

    fn mutate(&mut self, kind: &GuidedCampaignEventKind) {
        match kind {
            GuidedCampaignEventKind::CampaignCreated(payload) => {
                self.input_log = Some(InputLog::new(payload.setup.clone()));
            }
            GuidedCampaignEventKind::InputRecorded(payload) => {
                if let Some(log) = self.input_log.as_mut() {
                    log.append(payload.record.clone());
                }
            }
            GuidedCampaignEventKind::InputUndone(payload) => {
                if let Some(log) = self.input_log.as_mut() {
                    log.undo(payload.scenario.as_ref());
                }
            }
            GuidedCampaignEventKind::InputRedone(payload) => {
                if let Some(log) = self.input_log.as_mut() {
                    log.redo(payload.scenario.as_ref());
                }
            }
            GuidedCampaignEventKind::ScenarioReset(payload) => {
                if let Some(log) = self.input_log.as_mut() {
                    log.reset_scenario(&payload.scenario);
                }
            }
        }
    }
}

impl AggregateRoot for GuidedCampaign {
    type Event = GuidedCampaignEvent;

    fn aggregate_id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn apply(&mut self, event: &Self::Event) {
        self.mutate(&event.kind);
        self.version += 1;
    }

    fn uncommitted_events(&self) -> &[Self::Event] {
        &self.uncommitted_events
    }

    fn clear_uncommitted_events(&mut self) {
        self.uncommitted_events.clear();
    }
}
