//! Session state shared by all step invocations.

use crate::error::StepError;
use crate::models::{AnalysisStep, Competitor};
use std::collections::BTreeSet;

/// Everything the dashboard displays.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub brand_name: String,
    /// Replaced wholesale by the finder step or a refresh call.
    pub competitors: Vec<Competitor>,
    loading: BTreeSet<AnalysisStep>,
    complete: BTreeSet<AnalysisStep>,
    /// Single error slot, overwritten per attempt.
    pub error: Option<String>,
    /// Refresh calls that failed and were not surfaced.
    pub refresh_failures: usize,
}

/// Derived state of one step's control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Control {
    pub step: AnalysisStep,
    pub enabled: bool,
    pub loading: bool,
    pub done: bool,
}

impl Session {
    pub fn with_brand(brand_name: impl Into<String>) -> Self {
        Self {
            brand_name: brand_name.into(),
            ..Self::default()
        }
    }

    pub fn is_loading(&self, step: AnalysisStep) -> bool {
        self.loading.contains(&step)
    }

    pub fn is_complete(&self, step: AnalysisStep) -> bool {
        self.complete.contains(&step)
    }

    /// Completed steps in dashboard order.
    pub fn completed_steps(&self) -> Vec<AnalysisStep> {
        self.complete.iter().copied().collect()
    }

    pub fn has_brand_name(&self) -> bool {
        !self.brand_name.trim().is_empty()
    }

    /// Check preconditions and mark `step` as in flight.
    pub(crate) fn begin(&mut self, step: AnalysisStep) -> Result<(), StepError> {
        if step.is_finder() && !self.has_brand_name() {
            return Err(StepError::MissingBrandName);
        }
        if self.is_loading(step) {
            return Err(StepError::AlreadyRunning);
        }

        self.loading.insert(step);
        self.error = None;
        Ok(())
    }

    pub(crate) fn finish(&mut self, step: AnalysisStep) {
        self.loading.remove(&step);
    }

    pub(crate) fn mark_complete(&mut self, step: AnalysisStep) {
        self.complete.insert(step);
    }

    pub(crate) fn record_error(&mut self, step: AnalysisStep, err: &StepError) {
        self.error = Some(err.slot_message(step));
    }

    /// Control state for one step.
    ///
    /// The find control needs a brand name; every other control needs at
    /// least one competitor. A control is disabled while its step loads.
    pub fn control(&self, step: AnalysisStep) -> Control {
        let loading = self.is_loading(step);
        let ready = if step.is_finder() {
            self.has_brand_name()
        } else {
            !self.competitors.is_empty()
        };

        Control {
            step,
            enabled: ready && !loading,
            loading,
            done: self.is_complete(step),
        }
    }

    /// Controls for every step, in dashboard order.
    pub fn controls(&self) -> Vec<Control> {
        AnalysisStep::ALL
            .into_iter()
            .map(|step| self.control(step))
            .collect()
    }
}
