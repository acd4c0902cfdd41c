//! The campaign log builder.
//!
//! `build` folds the active records of an input log over a campaign guide
//! and produces a fresh `ProcessedCampaign`. The fold is deterministic: it
//! reads nothing but its two arguments, and every map it produces is
//! ordered.

use std::collections::{BTreeMap, BTreeSet};

use guidebook_script::{
    CampaignGuide, Effect, InvestigatorScope, Prompt, ScenarioGuide, ScenarioId, Step, StepId,
    StepKind, Value,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::campaign_log::{Answer, CampaignLog};
use super::conditions::{Evaluation, evaluate};
use super::diagnostics::{BuildDiagnostic, EngineError, ScriptReferenceError};
use super::input_log::{CampaignSetup, InputLog};
use super::records::{InputIdentity, InputKind, InputPayload, InputRecord};
use super::scenario_state::{ScenarioState, ScenarioStatus};

/// The output of a build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedCampaign {
    pub guide_id: String,
    pub guide_version: u32,
    pub campaign_log: CampaignLog,
    /// Played scenarios in play order, followed by the scenarios not yet
    /// started in guide order.
    pub scenarios: Vec<ScenarioState>,
    pub diagnostics: Vec<BuildDiagnostic>,
}

impl ProcessedCampaign {
    #[must_use]
    pub fn scenario(&self, id: &ScenarioId) -> Option<&ScenarioState> {
        self.scenarios.iter().find(|s| &s.scenario_id == id)
    }
}

/// Builds the processed campaign for `input_log` under `guide`.
///
/// # Errors
///
/// Returns `EngineError` when the guide is not the campaign's guide or its
/// version cannot replay the campaign. Every other problem is reported as a
/// diagnostic on the result.
pub fn build(guide: &CampaignGuide, input_log: &InputLog) -> Result<ProcessedCampaign, EngineError> {
    let setup = input_log.setup();
    check_compatibility(guide, setup)?;

    let active = input_log.active();
    let mut builder = Builder::new(guide, setup, &active);
    builder.apply_achievement_ops(&active);

    let mut scenarios = Vec::new();
    for played in builder.play_order(&active) {
        scenarios.push(match played {
            Played::Scripted(scenario, start) => builder.walk(scenario, start),
            Played::Custom { id, name, xp_cost } => builder.play_custom(id, name, xp_cost),
        });
    }
    for scenario in &guide.scenarios {
        if !scenarios.iter().any(|s| s.scenario_id == scenario.id) {
            scenarios.push(ScenarioState::new(scenario.id.clone()));
        }
    }

    Ok(ProcessedCampaign {
        guide_id: guide.id.clone(),
        guide_version: guide.version,
        campaign_log: builder.log,
        scenarios,
        diagnostics: builder.diagnostics,
    })
}

fn check_compatibility(guide: &CampaignGuide, setup: &CampaignSetup) -> Result<(), EngineError> {
    if guide.id != setup.guide_id {
        return Err(EngineError::GuideMismatch {
            campaign_guide: setup.guide_id.clone(),
            guide: guide.id.clone(),
        });
    }
    if !guide.accepts_version(setup.guide_version) {
        return Err(EngineError::IncompatibleGuide {
            guide_id: guide.id.clone(),
            guide_version: guide.version,
            min_compatible_version: guide.min_compatible_version,
            campaign_version: setup.guide_version,
        });
    }
    Ok(())
}

/// The last active record per identity.
struct ActiveIndex<'a> {
    records: BTreeMap<InputIdentity, &'a InputRecord>,
}

impl<'a> ActiveIndex<'a> {
    fn new(active: &[&'a InputRecord]) -> Self {
        let records = active
            .iter()
            .filter(|r| !r.kind().is_cumulative())
            .map(|r| (r.identity(), *r))
            .collect();
        Self { records }
    }

    fn answer(&self, scenario: &ScenarioId, step: &StepId, kind: InputKind) -> Option<&'a InputRecord> {
        self.records
            .get(&InputIdentity {
                scenario: Some(scenario.clone()),
                step: Some(step.clone()),
                kind,
            })
            .copied()
    }

    /// Any active record at the step, whatever its kind.
    fn any_at(&self, scenario: &ScenarioId, step: &StepId) -> Option<&'a InputRecord> {
        self.records
            .iter()
            .find(|(identity, _)| {
                identity.scenario.as_ref() == Some(scenario) && identity.step.as_ref() == Some(step)
            })
            .map(|(_, record)| *record)
    }
}

/// Resolution recorded for side scenarios played outside the guide.
pub const CUSTOM_RESOLUTION: &str = "played";

/// A scenario in play order.
enum Played<'a> {
    /// A guide scenario and its start record, absent for implicit starts.
    Scripted(&'a ScenarioGuide, Option<&'a InputRecord>),
    Custom {
        id: &'a ScenarioId,
        name: &'a str,
        xp_cost: u32,
    },
}

/// How a walk left a step.
enum Flow {
    Continue(Option<StepId>),
    Halt,
}

struct Builder<'a> {
    guide: &'a CampaignGuide,
    setup: &'a CampaignSetup,
    index: ActiveIndex<'a>,
    log: CampaignLog,
    diagnostics: Vec<BuildDiagnostic>,
}

impl<'a> Builder<'a> {
    fn new(guide: &'a CampaignGuide, setup: &'a CampaignSetup, active: &[&'a InputRecord]) -> Self {
        let mut log = CampaignLog::new(setup.difficulty, guide.chaos_bag(setup.difficulty));
        for investigator in &setup.investigators {
            log.add_investigator(investigator);
        }
        Self {
            guide,
            setup,
            index: ActiveIndex::new(active),
            log,
            diagnostics: Vec::new(),
        }
    }

    fn report(&mut self, diagnostic: BuildDiagnostic) {
        warn!(%diagnostic, "campaign build diagnostic");
        self.diagnostics.push(diagnostic);
    }

    fn malformed(&mut self, record: &InputRecord, detail: impl Into<String>) {
        self.report(BuildDiagnostic::MalformedInput {
            record_id: record.id,
            scenario: record.scenario.clone(),
            step: record.step.clone(),
            detail: detail.into(),
        });
    }

    /// Applies every active achievement operation, in log order.
    fn apply_achievement_ops(&mut self, active: &[&InputRecord]) {
        for record in active {
            let InputPayload::AchievementOp {
                achievement,
                operation,
                max,
            } = &record.payload
            else {
                continue;
            };
            let Some(def) = self.guide.achievement(achievement) else {
                self.malformed(record, format!("unknown achievement {achievement}"));
                continue;
            };
            if let Err(mismatch) = self.log.apply_achievement(def, *operation, *max) {
                self.malformed(record, mismatch.to_string());
            }
        }
    }

    /// Main scenarios in guide order, each followed by the side scenarios
    /// started after it. Side scenarios without a played anchor come last,
    /// in the order they were started. Custom side scenarios are tracked
    /// under the record's scenario id and may not reuse a guide scenario id.
    fn play_order(&mut self, active: &[&'a InputRecord]) -> Vec<Played<'a>> {
        let guide = self.guide;
        let mut starts: BTreeMap<&'a ScenarioId, &'a InputRecord> = BTreeMap::new();
        let mut side_order: Vec<&'a ScenarioId> = Vec::new();
        for record in active.iter().copied().filter(|r| r.kind().is_start()) {
            let Some(scenario_id) = record.scenario.as_ref() else {
                continue;
            };
            let custom = record.kind() == InputKind::StartCustomSideScenario;
            let (id, side) = match (guide.scenario(scenario_id), custom) {
                (Some(scenario), false) => (&scenario.id, scenario.side),
                (None, true) => (scenario_id, true),
                (Some(_), true) => {
                    self.malformed(
                        record,
                        format!("custom side scenario {scenario_id} reuses a guide scenario id"),
                    );
                    continue;
                }
                (None, false) => {
                    self.malformed(record, format!("unknown scenario {scenario_id}"));
                    continue;
                }
            };
            if side && !side_order.contains(&id) {
                side_order.push(id);
            }
            starts.insert(id, record);
        }

        let mut children: BTreeMap<&'a ScenarioId, Vec<&'a ScenarioId>> = BTreeMap::new();
        for side in &side_order {
            let Some(record) = starts.get(side).copied() else {
                continue;
            };
            let (InputPayload::StartSideScenario {
                after: Some(after), ..
            }
            | InputPayload::StartCustomSideScenario {
                after: Some(after), ..
            }) = &record.payload
            else {
                continue;
            };
            let anchor = guide
                .scenario(after)
                .map(|anchor| &anchor.id)
                .or_else(|| starts.get_key_value(after).map(|(id, _)| *id));
            match anchor {
                Some(anchor) if anchor != *side => children.entry(anchor).or_default().push(*side),
                _ => self.malformed(record, format!("unknown anchor scenario {after}")),
            }
        }

        let mut ordered: Vec<&'a ScenarioId> = Vec::new();
        let mut emitted = BTreeSet::new();
        for scenario in guide.scenarios.iter().filter(|s| !s.side) {
            if scenario.implicit_start || starts.contains_key(&scenario.id) {
                place(&scenario.id, &children, &mut emitted, &mut ordered);
            }
        }
        // Side scenarios whose anchor was never played keep their start order.
        for side in side_order {
            place(side, &children, &mut emitted, &mut ordered);
        }

        ordered
            .into_iter()
            .filter_map(|id| match guide.scenario(id) {
                Some(scenario) => Some(Played::Scripted(scenario, starts.get(id).copied())),
                None => match starts.get(id).copied().map(|r| &r.payload) {
                    Some(InputPayload::StartCustomSideScenario { name, xp_cost, .. }) => {
                        Some(Played::Custom {
                            id,
                            name,
                            xp_cost: *xp_cost,
                        })
                    }
                    _ => None,
                },
            })
            .collect()
    }

    /// Plays a side scenario the guide does not script: it completes at
    /// once and every investigator still in the campaign spends its cost.
    fn play_custom(&mut self, id: &ScenarioId, name: &str, xp_cost: u32) -> ScenarioState {
        let mut state = ScenarioState {
            custom_name: Some(name.to_owned()),
            ..ScenarioState::new(id.clone())
        };
        self.transition(id, state.start());
        for investigator in self.log.investigators.values_mut() {
            if !investigator.eliminated() {
                investigator.spent_xp = investigator.spent_xp.saturating_add(xp_cost);
            }
        }
        self.log
            .resolutions
            .insert(id.clone(), CUSTOM_RESOLUTION.to_owned());
        debug!(scenario = %id, name, xp_cost, "custom side scenario played");
        self.transition(id, state.complete(CUSTOM_RESOLUTION.to_owned()));
        state
    }

    /// Resolves the lead investigator: the one named at start, or the first
    /// member of the roster.
    fn lead_for(&mut self, start: Option<&InputRecord>) -> Option<String> {
        let default_lead = self.setup.investigators.first().map(|i| i.id.clone());
        let requested = match start.map(|r| &r.payload) {
            Some(
                InputPayload::StartScenario { lead_investigator }
                | InputPayload::StartSideScenario {
                    lead_investigator, ..
                },
            ) => lead_investigator.as_ref(),
            _ => None,
        };
        match (requested, start) {
            (Some(lead), _) if self.log.investigators.contains_key(lead) => Some(lead.clone()),
            (Some(lead), Some(record)) => {
                self.malformed(record, format!("unknown lead investigator {lead}"));
                default_lead
            }
            _ => default_lead,
        }
    }

    fn walk(&mut self, scenario: &'a ScenarioGuide, start: Option<&'a InputRecord>) -> ScenarioState {
        let mut state = ScenarioState::new(scenario.id.clone());
        if let Err(error) = state.start() {
            self.report(BuildDiagnostic::InvalidTransition {
                scenario: scenario.id.clone(),
                detail: error.to_string(),
            });
            return state;
        }

        let snapshot = self.log.clone();
        if let Some(lead) = self.lead_for(start) {
            self.log.lead_investigators.insert(scenario.id.clone(), lead);
        }

        let mut pending_xp: BTreeMap<String, u32> = BTreeMap::new();
        let mut cursor = 0;
        let mut visits = 0;
        while let Some(step) = scenario.steps.get(cursor) {
            visits += 1;
            if visits > scenario.steps.len() {
                self.report(BuildDiagnostic::CyclicScript {
                    scenario: scenario.id.clone(),
                    step: step.id.clone(),
                });
                self.log = snapshot;
                return ScenarioState {
                    status: ScenarioStatus::Started { pending_at: None },
                    ..ScenarioState::new(scenario.id.clone())
                };
            }

            let flow = match &step.kind {
                StepKind::Story { .. } => Flow::Continue(None),
                StepKind::Effects { effects } => {
                    self.apply_effects(scenario, step, effects, &mut pending_xp);
                    Flow::Continue(None)
                }
                StepKind::Input { prompt } => {
                    if self.consume_input(scenario, step, prompt) {
                        state.answered_steps.push(step.id.clone());
                        Flow::Continue(None)
                    } else {
                        Flow::Halt
                    }
                }
                StepKind::Branch { condition } => {
                    match evaluate(condition, &scenario.id, &self.log, self.guide) {
                        Ok(Evaluation::Resolved(result)) => Flow::Continue(result.next_step),
                        Ok(Evaluation::Pending { awaiting }) => {
                            debug!(scenario = %scenario.id, step = %step.id, %awaiting, "branch awaiting input");
                            Flow::Halt
                        }
                        Err(error) => {
                            self.script_reference(scenario, step, &error);
                            Flow::Continue(None)
                        }
                    }
                }
                StepKind::Resolution { resolution } => {
                    self.resolve(scenario, &mut state, resolution, &pending_xp);
                    state.xp_earned = pending_xp;
                    return state;
                }
            };

            match flow {
                Flow::Halt => {
                    debug!(scenario = %scenario.id, step = %step.id, "scenario pending input");
                    self.transition(&scenario.id, state.await_input(step.id.clone()));
                    state.xp_earned = pending_xp;
                    return state;
                }
                Flow::Continue(jump) => {
                    cursor = match jump.or_else(|| step.next.clone()) {
                        Some(target) => match scenario.step_index(&target) {
                            Some(index) => index,
                            None => {
                                self.script_reference(
                                    scenario,
                                    step,
                                    &ScriptReferenceError::new(format!("unknown step {target}")),
                                );
                                cursor + 1
                            }
                        },
                        None => cursor + 1,
                    };
                }
            }
        }

        debug!(scenario = %scenario.id, "scenario walk reached the end of its steps");
        state.xp_earned = pending_xp;
        state
    }

    fn transition(&mut self, scenario: &ScenarioId, result: Result<(), impl std::fmt::Display>) {
        if let Err(error) = result {
            self.report(BuildDiagnostic::InvalidTransition {
                scenario: scenario.clone(),
                detail: error.to_string(),
            });
        }
    }

    fn script_reference(&mut self, scenario: &ScenarioGuide, step: &Step, error: &ScriptReferenceError) {
        self.report(BuildDiagnostic::ScriptReference {
            scenario: scenario.id.clone(),
            step: step.id.clone(),
            detail: error.to_string(),
        });
    }

    fn resolve(
        &mut self,
        scenario: &ScenarioGuide,
        state: &mut ScenarioState,
        resolution: &str,
        pending_xp: &BTreeMap<String, u32>,
    ) {
        self.log
            .resolutions
            .insert(scenario.id.clone(), resolution.to_owned());
        for (investigator, xp) in pending_xp {
            if let Some(entry) = self.log.investigators.get_mut(investigator) {
                entry.total_xp = entry.total_xp.saturating_add(*xp);
            }
        }
        debug!(scenario = %scenario.id, resolution, "scenario completed");
        self.transition(&scenario.id, state.complete(resolution.to_owned()));
    }

    /// Applies the effects of a step atomically: either all of them take
    /// effect or, on the first reference error, none do.
    fn apply_effects(
        &mut self,
        scenario: &ScenarioGuide,
        step: &Step,
        effects: &[Effect],
        pending_xp: &mut BTreeMap<String, u32>,
    ) {
        let mut staged = self.log.clone();
        let mut staged_xp = pending_xp.clone();
        for effect in effects {
            if let Err(error) = self.apply_effect(&mut staged, &mut staged_xp, &scenario.id, effect) {
                self.script_reference(scenario, step, &error);
                return;
            }
        }
        self.log = staged;
        *pending_xp = staged_xp;
    }

    fn apply_effect(
        &self,
        log: &mut CampaignLog,
        pending_xp: &mut BTreeMap<String, u32>,
        scenario: &ScenarioId,
        effect: &Effect,
    ) -> Result<(), ScriptReferenceError> {
        match effect {
            Effect::CampaignLog {
                section,
                id,
                cross_out,
            } => {
                self.require_section(section)?;
                match id {
                    Some(id) => {
                        if self.guide.log_entry(section, id).is_none() {
                            return Err(ScriptReferenceError::new(format!(
                                "unknown campaign log entry {section}/{id}"
                            )));
                        }
                        if *cross_out {
                            log.cross_out(section, id);
                        } else {
                            log.record_entry(section, id, None);
                        }
                    }
                    None => log.open_section(section),
                }
            }
            Effect::FreeformCampaignLog {
                section,
                input_step,
            } => {
                self.require_section(section)?;
                let text = match log.answer(scenario, input_step) {
                    Some(Answer::Text { text }) => text.clone(),
                    _ => {
                        return Err(ScriptReferenceError::new(format!(
                            "step {input_step} has no text answer"
                        )));
                    }
                };
                log.record_entry(section, input_step.as_str(), Some(text));
            }
            Effect::CampaignLogCards {
                section,
                input_step,
            } => {
                self.require_section(section)?;
                let ids: Vec<String> = match log.answer(scenario, input_step) {
                    Some(Answer::StringChoices { choices }) => {
                        choices.values().flatten().cloned().collect()
                    }
                    Some(Answer::ChoiceList { choices }) => choices
                        .iter()
                        .filter(|(_, values)| values.iter().any(|v| *v != 0))
                        .map(|(option, _)| option.clone())
                        .collect(),
                    _ => {
                        return Err(ScriptReferenceError::new(format!(
                            "step {input_step} has no choice list or string choices answer"
                        )));
                    }
                };
                for id in ids {
                    log.record_entry(section, &id, None);
                }
            }
            Effect::CampaignLogCount {
                counter,
                operation,
                value,
            } => {
                let value = resolve_value(log, scenario, value)?;
                log.apply_count(counter, *operation, value);
            }
            Effect::Trauma {
                investigator,
                physical,
                mental,
                killed,
                insane,
            } => {
                for target in targets(log, scenario, *investigator)? {
                    if let Some(entry) = log.investigators.get_mut(&target) {
                        entry.physical = entry.physical.saturating_add(*physical);
                        entry.mental = entry.mental.saturating_add(*mental);
                        entry.killed |= *killed;
                        entry.insane |= *insane;
                    }
                }
            }
            Effect::EarnXp {
                investigator,
                amount,
            } => {
                let amount = resolve_value(log, scenario, amount)?;
                let amount = u32::try_from(amount).map_err(|_| {
                    ScriptReferenceError::new(format!("experience cannot be negative: {amount}"))
                })?;
                for target in targets(log, scenario, *investigator)? {
                    let earned = pending_xp.entry(target).or_insert(0);
                    *earned = earned.saturating_add(amount);
                }
            }
            Effect::ChaosBag { tokens } => {
                for (token, delta) in tokens {
                    log.adjust_chaos_bag(token, *delta);
                }
            }
            Effect::Achievement { id, operation } => {
                let def = self
                    .guide
                    .achievement(id)
                    .ok_or_else(|| ScriptReferenceError::new(format!("unknown achievement {id}")))?;
                log.apply_achievement(def, *operation, None)
                    .map_err(|mismatch| ScriptReferenceError::new(mismatch.to_string()))?;
            }
            Effect::Supplies {
                investigator,
                supply,
                count,
            } => {
                for target in targets(log, scenario, *investigator)? {
                    if let Some(entry) = log.investigators.get_mut(&target) {
                        entry.adjust_supply(supply, *count);
                    }
                }
            }
        }
        Ok(())
    }

    fn require_section(&self, section: &str) -> Result<(), ScriptReferenceError> {
        match self.guide.log_section(section) {
            Some(_) => Ok(()),
            None => Err(ScriptReferenceError::new(format!(
                "unknown campaign log section {section}"
            ))),
        }
    }

    /// Looks up the answer to an input step. Returns `false` when the step
    /// is unanswered or its answer does not fit the prompt. A record of
    /// another kind at the step is only consulted when none of the prompt's
    /// kind exists, and is reported as malformed.
    fn consume_input(&mut self, scenario: &ScenarioGuide, step: &Step, prompt: &Prompt) -> bool {
        let Some(record) = self
            .index
            .answer(&scenario.id, &step.id, InputKind::for_prompt(prompt))
            .or_else(|| self.index.any_at(&scenario.id, &step.id))
        else {
            return false;
        };
        let answer = match self.answer_for(prompt, record) {
            Ok(answer) => answer,
            Err(detail) => {
                self.malformed(record, detail);
                return false;
            }
        };

        match &answer {
            Answer::Supplies { supplies } => {
                for (investigator, counts) in supplies {
                    if let Some(entry) = self.log.investigators.get_mut(investigator) {
                        for (supply, count) in counts {
                            entry.adjust_supply(supply, *count);
                        }
                    }
                }
            }
            Answer::InterScenarioTrauma { investigators } => {
                for (investigator, trauma) in investigators {
                    if let Some(entry) = self.log.investigators.get_mut(investigator) {
                        entry.apply_trauma(trauma);
                    }
                }
            }
            Answer::Decision { .. }
            | Answer::Count { .. }
            | Answer::Choice { .. }
            | Answer::ChoiceList { .. }
            | Answer::StringChoices { .. }
            | Answer::Text { .. }
            | Answer::CampaignLink { .. } => {}
        }
        self.log.record_answer(&scenario.id, &step.id, answer);
        true
    }

    /// Checks a recorded input against the prompt it answers.
    fn answer_for(&self, prompt: &Prompt, record: &InputRecord) -> Result<Answer, String> {
        match (prompt, &record.payload) {
            (Prompt::Decision, InputPayload::Decision { decision }) => {
                Ok(Answer::Decision { value: *decision })
            }
            (Prompt::Count { min, max }, InputPayload::Count { count }) => {
                if count < min || max.is_some_and(|max| *count > max) {
                    return Err(format!("count {count} is outside the allowed range"));
                }
                Ok(Answer::Count { value: *count })
            }
            (Prompt::Choice { options }, InputPayload::Choice { choice }) => options
                .get(*choice)
                .map(|label| Answer::Choice {
                    index: *choice,
                    label: label.clone(),
                })
                .ok_or_else(|| format!("choice {choice} is out of range")),
            (Prompt::ChoiceList { options }, InputPayload::ChoiceList { choices }) => {
                check_keys(options, choices.keys(), "option")?;
                Ok(Answer::ChoiceList {
                    choices: choices.clone(),
                })
            }
            (Prompt::StringChoices { options }, InputPayload::StringChoices { choices }) => {
                check_keys(options, choices.keys(), "option")?;
                Ok(Answer::StringChoices {
                    choices: choices.clone(),
                })
            }
            (Prompt::Text, InputPayload::Text { text }) => {
                if text.trim().is_empty() {
                    return Err("text answer is empty".to_owned());
                }
                Ok(Answer::Text { text: text.clone() })
            }
            (Prompt::Supplies { supplies: allowed }, InputPayload::Supplies { supplies }) => {
                self.check_roster(supplies.keys())?;
                for counts in supplies.values() {
                    check_keys(allowed, counts.keys(), "supply")?;
                    if let Some((supply, count)) = counts.iter().find(|(_, count)| **count < 0) {
                        return Err(format!("supply {supply} has negative count {count}"));
                    }
                }
                Ok(Answer::Supplies {
                    supplies: supplies.clone(),
                })
            }
            (Prompt::InterScenarioTrauma, InputPayload::InterScenarioTrauma { investigators }) => {
                self.check_roster(investigators.keys())?;
                Ok(Answer::InterScenarioTrauma {
                    investigators: investigators.clone(),
                })
            }
            (Prompt::CampaignLink, InputPayload::CampaignLink { decision }) => {
                if decision.is_empty() {
                    return Err("campaign link decision is empty".to_owned());
                }
                Ok(Answer::CampaignLink {
                    decision: decision.clone(),
                })
            }
            (_, payload) => Err(format!(
                "{} record does not answer this prompt",
                payload.kind().as_str()
            )),
        }
    }

    fn check_roster<'k>(&self, ids: impl Iterator<Item = &'k String>) -> Result<(), String> {
        for id in ids {
            if !self.log.investigators.contains_key(id) {
                return Err(format!("unknown investigator {id}"));
            }
        }
        Ok(())
    }
}

fn place<'s>(
    id: &'s ScenarioId,
    children: &BTreeMap<&ScenarioId, Vec<&'s ScenarioId>>,
    emitted: &mut BTreeSet<&'s ScenarioId>,
    ordered: &mut Vec<&'s ScenarioId>,
) {
    if !emitted.insert(id) {
        return;
    }
    ordered.push(id);
    if let Some(sides) = children.get(id) {
        for side in sides {
            place(side, children, emitted, ordered);
        }
    }
}

fn check_keys<'k>(
    allowed: &[String],
    keys: impl Iterator<Item = &'k String>,
    what: &str,
) -> Result<(), String> {
    for key in keys {
        if !allowed.contains(key) {
            return Err(format!("unknown {what} {key}"));
        }
    }
    Ok(())
}

fn resolve_value(log: &CampaignLog, scenario: &ScenarioId, value: &Value) -> Result<i32, ScriptReferenceError> {
    match value {
        Value::Literal(value) => Ok(*value),
        Value::FromInput { input_step } => match log.answer(scenario, input_step) {
            Some(Answer::Count { value }) => Ok(*value),
            _ => Err(ScriptReferenceError::new(format!(
                "step {input_step} has no count answer"
            ))),
        },
    }
}

fn targets(
    log: &CampaignLog,
    scenario: &ScenarioId,
    scope: InvestigatorScope,
) -> Result<Vec<String>, ScriptReferenceError> {
    match scope {
        InvestigatorScope::LeadInvestigator => log
            .lead_investigator(scenario)
            .map(|lead| vec![lead.to_owned()])
            .ok_or_else(|| {
                ScriptReferenceError::new(format!("scenario {scenario} has no lead investigator"))
            }),
        InvestigatorScope::All => Ok(log.investigators.keys().cloned().collect()),
    }
}
