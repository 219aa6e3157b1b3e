//! Condition evaluation engine.

use crate::comparator;
use crate::context::{EvaluationContext, Host};
use crate::debug::DebugRecord;
use crate::decision::VisibilityDecision;
use crate::resolver::{ValueResolver, ValueSource};
use crate::settings::ElementSettings;
use std::time::Instant;
use tracing::{debug, warn};

/// Decides whether elements are hidden.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConditionEvaluator;

impl ConditionEvaluator {
    pub fn new() -> Self {
        Self
    }

    /// Evaluates the condition of one element.
    ///
    /// Never fails: anything that keeps the condition from being evaluated
    /// leaves the element visible.
    pub fn evaluate(
        &self,
        settings: &ElementSettings,
        ctx: &EvaluationContext,
        host: &dyn Host,
    ) -> VisibilityDecision {
        let start = Instant::now();
        let elapsed = |start: Instant| start.elapsed().as_micros() as u64;

        let Some(operator) = settings.condition else {
            return VisibilityDecision::no_condition().with_evaluation_time(elapsed(start));
        };

        if ValueSource::of(settings).is_err() {
            return VisibilityDecision::no_condition().with_evaluation_time(elapsed(start));
        }

        if ctx.is_edit() {
            return VisibilityDecision::editor().with_evaluation_time(elapsed(start));
        }

        let resolved = match ValueResolver::new(ctx, host).resolve(settings) {
            Ok(resolved) => resolved,
            Err(err) => {
                warn!(element = %settings.element, error = %err, "could not resolve condition, keeping element visible");
                return VisibilityDecision::unresolved(err.to_string()).with_evaluation_time(elapsed(start));
            }
        };

        let result = comparator::compare_all(operator, &resolved.actual, &resolved.check, &resolved.check2);
        let hide = settings.visibility().hides(result.met);

        debug!(
            element = %settings.element,
            operator = operator.as_str(),
            condition_met = result.met,
            inspected = result.inspected,
            hide,
            "evaluated condition"
        );

        let mut decision = VisibilityDecision::evaluated(hide, result.met);
        if settings.debug && ctx.can_edit {
            decision = decision.with_diagnostic(DebugRecord::new(
                settings,
                operator,
                &resolved,
                result.inspected,
                result.met,
            ));
        }

        decision.with_evaluation_time(elapsed(start))
    }

    /// Returns true if the element is hidden.
    pub fn should_hide(&self, settings: &ElementSettings, ctx: &EvaluationContext, host: &dyn Host) -> bool {
        self.evaluate(settings, ctx, host).is_hidden()
    }
}
