//! Render gate: suppresses the markup of hidden elements.
//!
//! The host calls [`RenderPass::before_render`] before an element renders and
//! hands the returned ticket, together with the captured markup, to
//! [`RenderPass::after_render`]. Tickets nest with the element tree.

use crate::context::{EvaluationContext, Host};
use crate::debug::{escape_html, DEBUG_CSS};
use crate::evaluator::ConditionEvaluator;
use crate::settings::ElementSettings;
use crate::types::{ElementIdentity, RenderMode};
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

/// Renders the wrapper of an element without its content.
pub trait ElementShell {
    fn open_wrapper(&self) -> String;
    fn close_wrapper(&self) -> String;
}

/// A location holding popup documents.
pub trait PopupLocation {
    /// Settings of every popup document in the location.
    fn popups(&self) -> Vec<ElementSettings>;

    /// Removes a popup document before it renders.
    fn remove_popup(&mut self, id: &str);
}

/// Settings needed to write placeholder markup for a suppressed element.
#[derive(Debug, Clone, PartialEq)]
pub struct SuppressionSnapshot {
    pub hide_content_only: bool,
    pub resize_other_columns: bool,
    pub column_size: Option<f64>,
    pub hide_wrapper_selector: Option<String>,
    pub hide_others_selector: Option<String>,
}

impl SuppressionSnapshot {
    fn of(settings: &ElementSettings) -> Self {
        Self {
            hide_content_only: settings.hide_content_only,
            resize_other_columns: settings.resize_other_columns,
            column_size: settings.column_size,
            hide_wrapper_selector: settings.hide_wrapper_selector().map(String::from),
            hide_others_selector: settings.hide_others_selector().map(String::from),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GateState {
    Visible,
    Suppressed(SuppressionSnapshot),
}

/// Suppression state of one element between before and after render.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderTicket {
    pub element: ElementIdentity,
    pub state: GateState,
    /// Diagnostic markup to emit before the element.
    pub debug_markup: Option<String>,
}

impl RenderTicket {
    pub fn is_suppressed(&self) -> bool {
        matches!(self.state, GateState::Suppressed(_))
    }
}

fn link_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"<link.*?/?>").expect("link pattern is valid"))
}

/// One render pass over a page.
pub struct RenderPass {
    evaluator: ConditionEvaluator,
    ctx: EvaluationContext,
    debug_css_emitted: bool,
}

impl RenderPass {
    pub fn new(ctx: EvaluationContext) -> Self {
        Self {
            evaluator: ConditionEvaluator::new(),
            ctx,
            debug_css_emitted: false,
        }
    }

    pub fn context(&self) -> &EvaluationContext {
        &self.ctx
    }

    /// Decides whether the element renders.
    pub fn before_render(&mut self, settings: &ElementSettings, host: &dyn Host) -> RenderTicket {
        let element = settings.element.clone();
        if self.ctx.is_edit() {
            return RenderTicket {
                element,
                state: GateState::Visible,
                debug_markup: None,
            };
        }

        let decision = self.evaluator.evaluate(settings, &self.ctx, host);

        let debug_markup = decision.diagnostic.as_ref().map(|record| {
            let mut markup = record.render_html();
            if !self.debug_css_emitted {
                self.debug_css_emitted = true;
                markup.push_str(DEBUG_CSS);
            }
            markup
        });

        let state = if decision.is_hidden() {
            debug!(element = %element, reason = %decision.reason, "suppressing element");
            GateState::Suppressed(SuppressionSnapshot::of(settings))
        } else {
            GateState::Visible
        };

        RenderTicket {
            element,
            state,
            debug_markup,
        }
    }

    /// Produces the final markup of an element from its captured output.
    pub fn after_render(&self, ticket: RenderTicket, captured: String, shell: &dyn ElementShell) -> String {
        let snapshot = match ticket.state {
            GateState::Visible => return captured,
            GateState::Suppressed(snapshot) => snapshot,
        };

        let mut output: String = link_pattern()
            .find_iter(&captured)
            .map(|link| link.as_str())
            .collect();

        if snapshot.hide_content_only {
            output.push_str(&shell.open_wrapper());
            output.push_str(&shell.close_wrapper());
        } else if ticket.element.is_column() && snapshot.resize_other_columns {
            let size = snapshot.column_size.map(|size| size.to_string()).unwrap_or_default();
            output.push_str(&format!(
                "<div class=\"dc-hidden-column\" data-size=\"{}\"></div>",
                escape_html(&size)
            ));
        }

        if let Some(selector) = &snapshot.hide_wrapper_selector {
            output.push_str(&format!(
                "<div class=\"dc-hide-wrapper\" data-selector=\"{}\"></div>",
                escape_html(selector)
            ));
        }

        if let Some(selector) = &snapshot.hide_others_selector {
            output.push_str(&format!(
                "<div class=\"dc-hide-others\" data-selector=\"{}\"></div>",
                escape_html(selector)
            ));
        }

        output.push_str(&format!("<!-- hidden {} -->", ticket.element.element_type));
        output
    }

    /// Runs the gate around `render`, returning debug markup and element output.
    pub fn render_element<F>(
        &mut self,
        settings: &ElementSettings,
        host: &dyn Host,
        shell: &dyn ElementShell,
        render: F,
    ) -> String
    where
        F: FnOnce() -> String,
    {
        let mut ticket = self.before_render(settings, host);
        let mut output = ticket.debug_markup.take().unwrap_or_default();
        let captured = render();
        output.push_str(&self.after_render(ticket, captured, shell));
        output
    }

    /// Removes popups whose condition hides them. Only on the live site.
    ///
    /// Returns the ids of the removed popups.
    pub fn suppress_popups(&mut self, location: &mut dyn PopupLocation, host: &dyn Host) -> Vec<String> {
        if self.ctx.mode != RenderMode::Website {
            return Vec::new();
        }

        let mut removed = Vec::new();
        for popup in location.popups() {
            if self.evaluator.should_hide(&popup, &self.ctx, host) {
                location.remove_popup(&popup.element.id);
                removed.push(popup.element.id);
            }
        }

        if !removed.is_empty() {
            debug!(count = removed.len(), "removed hidden popups");
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::StaticHost;
    use crate::types::Operator;

    struct Shell;

    impl ElementShell for Shell {
        fn open_wrapper(&self) -> String {
            "<div class=\"wrap\">".to_string()
        }

        fn close_wrapper(&self) -> String {
            "</div>".to_string()
        }
    }

    fn hidden(element_type: &str) -> ElementSettings {
        ElementSettings::new(ElementIdentity::new("e1", element_type, element_type))
            .with_dynamic_value("x")
            .with_condition(Operator::NotEmpty)
    }

    #[test]
    fn test_visible_passes_through() {
        let mut pass = RenderPass::new(EvaluationContext::default());
        let settings = hidden("widget").with_condition(Operator::Empty);
        let ticket = pass.before_render(&settings, &StaticHost::new());
        assert!(!ticket.is_suppressed());
        assert_eq!(pass.after_render(ticket, "<p>hi</p>".to_string(), &Shell), "<p>hi</p>");
    }

    #[test]
    fn test_suppressed_keeps_links() {
        let mut pass = RenderPass::new(EvaluationContext::default());
        let ticket = pass.before_render(&hidden("widget"), &StaticHost::new());
        let captured = "<link rel=\"stylesheet\" href=\"a.css\"/><p>secret</p><link href=\"b.css\">".to_string();

        let output = pass.after_render(ticket, captured, &Shell);
        assert_eq!(
            output,
            "<link rel=\"stylesheet\" href=\"a.css\"/><link href=\"b.css\"><!-- hidden widget -->"
        );
    }

    #[test]
    fn test_hide_content_only_renders_shell() {
        let mut pass = RenderPass::new(EvaluationContext::default());
        let mut settings = hidden("section");
        settings.hide_content_only = true;
        settings.hide_wrapper_selector = Some(".row \"x\"".to_string());

        let ticket = pass.before_render(&settings, &StaticHost::new());
        let output = pass.after_render(ticket, "<p>secret</p>".to_string(), &Shell);
        assert_eq!(
            output,
            "<div class=\"wrap\"></div><div class=\"dc-hide-wrapper\" data-selector=\".row &quot;x&quot;\"></div><!-- hidden section -->"
        );
    }

    #[test]
    fn test_edit_mode_skips_evaluation() {
        let mut pass = RenderPass::new(EvaluationContext::new(RenderMode::Edit));
        let ticket = pass.before_render(&hidden("widget"), &StaticHost::new());
        assert_eq!(ticket.state, GateState::Visible);
    }
}
