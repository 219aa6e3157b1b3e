//! Visibility decision types.

use crate::debug::DebugRecord;
use serde::{Deserialize, Serialize};

/// The outcome of evaluating one element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisibilityDecision {
    /// Whether the element is suppressed.
    pub hide: bool,

    /// Whether the condition itself was met, before polarity.
    pub condition_met: bool,

    /// Reason for the decision.
    pub reason: String,

    /// Whether no condition was evaluated at all.
    pub is_default: bool,

    /// Time taken to evaluate (in microseconds).
    pub evaluation_time_us: Option<u64>,

    /// Diagnostic record, for editors who turned on debugging.
    #[serde(default)]
    pub diagnostic: Option<DebugRecord>,
}

impl VisibilityDecision {
    fn visible_by_default(reason: impl Into<String>) -> Self {
        Self {
            hide: false,
            condition_met: false,
            reason: reason.into(),
            is_default: true,
            evaluation_time_us: None,
            diagnostic: None,
        }
    }

    /// No operator or no value source configured.
    pub fn no_condition() -> Self {
        Self::visible_by_default("No condition configured - visible")
    }

    /// Rendering inside the editor, where nothing is hidden.
    pub fn editor() -> Self {
        Self::visible_by_default("Edit mode - visible")
    }

    /// Values could not be resolved; the element stays visible.
    pub fn unresolved(reason: impl Into<String>) -> Self {
        Self::visible_by_default(format!("Unresolved condition - visible: {}", reason.into()))
    }

    /// A condition was evaluated.
    pub fn evaluated(hide: bool, condition_met: bool) -> Self {
        let reason = match (condition_met, hide) {
            (true, true) => "Condition met - hidden",
            (true, false) => "Condition met - visible",
            (false, true) => "Condition not met - hidden",
            (false, false) => "Condition not met - visible",
        };
        Self {
            hide,
            condition_met,
            reason: reason.to_string(),
            is_default: false,
            evaluation_time_us: None,
            diagnostic: None,
        }
    }

    /// Sets the evaluation time.
    pub fn with_evaluation_time(mut self, time_us: u64) -> Self {
        self.evaluation_time_us = Some(time_us);
        self
    }

    /// Attaches a diagnostic record.
    pub fn with_diagnostic(mut self, record: DebugRecord) -> Self {
        self.diagnostic = Some(record);
        self
    }

    /// Returns true if the element is suppressed.
    pub fn is_hidden(&self) -> bool {
        self.hide
    }
}
