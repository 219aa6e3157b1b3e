//! Diagnostic output for editors.

use crate::resolver::ResolvedValues;
use crate::settings::ElementSettings;
use crate::types::{CompareType, Operator, Visibility};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Styles for the debug fragment; emitted once per render pass.
pub const DEBUG_CSS: &str = "<style>\
.dynamicconditions-debug{position:relative;margin:10px 0;padding:10px 30px 10px 10px;\
font:12px/1.4 monospace;color:#1d2327;background:#fff8e5;border:1px solid #dba617}\
.dynamicconditions-debug .dc-debug-row{display:flex;gap:10px}\
.dynamicconditions-debug .dc-debug-label{flex:0 0 160px;font-weight:bold}\
.dynamicconditions-debug .dc-debug-value{flex:1;word-break:break-all}\
.dynamicconditions-debug .dc-debug-remove{position:absolute;top:6px;right:8px;cursor:pointer}\
</style>";

/// What the engine saw while evaluating one element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebugRecord {
    /// `name-id (type)`.
    pub element: String,
    pub selected_tag: String,
    pub tag_key: Option<String>,
    /// Normalized dynamic values, one per inspected value.
    pub dynamic_value: Vec<String>,
    pub dynamic_value_raw: String,
    pub check_value: String,
    pub check_value2: String,
    pub compare_type: CompareType,
    pub condition: Operator,
    pub visibility: Visibility,
    pub condition_met: bool,
}

impl DebugRecord {
    /// Builds the record from a finished evaluation.
    pub fn new(
        settings: &ElementSettings,
        operator: Operator,
        resolved: &ResolvedValues,
        inspected: usize,
        condition_met: bool,
    ) -> Self {
        Self {
            element: settings.element.to_string(),
            selected_tag: resolved.selected_tag.clone(),
            tag_key: resolved.tag_key.clone(),
            dynamic_value: resolved
                .actual
                .iter()
                .take(inspected)
                .map(|value| value.to_text())
                .collect(),
            dynamic_value_raw: settings.dynamic_value_raw.clone().unwrap_or_default(),
            check_value: resolved.check.to_text(),
            check_value2: resolved.check2.to_text(),
            compare_type: settings.compare_type(),
            condition: operator,
            visibility: settings.visibility(),
            condition_met,
        }
    }

    /// Renders the record as an HTML fragment.
    ///
    /// Values are escaped and `[` is written as `&#91;` so shortcodes in
    /// them are never expanded by the host.
    pub fn render_html(&self) -> String {
        let dynamic_value = self
            .dynamic_value
            .iter()
            .map(|value| escape_value(value))
            .collect::<Vec<_>>()
            .join("<br />");

        let visibility = match self.visibility {
            Visibility::Show => "Show",
            Visibility::Hide => "Hide",
        };

        let rows = [
            ("Element:", escape_html(&self.element)),
            ("DynamicTag-Tag:", escape_html(&self.selected_tag)),
            ("DynamicTag-Key:", escape_html(self.tag_key.as_deref().unwrap_or_default())),
            ("DynamicTag-Value:", dynamic_value),
            ("DynamicTag-Value-Raw:", escape_value(&self.dynamic_value_raw)),
            ("Check-Value:", escape_value(&self.check_value)),
            ("Check-Value2:", escape_value(&self.check_value2)),
            ("Condition-Type:", self.compare_type.as_str().to_string()),
            ("Condition:", format!("{} if {}", visibility, self.condition)),
            ("Condition met:", if self.condition_met { "yes" } else { "no" }.to_string()),
        ];

        let mut html = String::from("<div class=\"dynamicconditions-debug\">");
        for (label, value) in rows {
            // writing to a String cannot fail
            let _ = write!(
                html,
                "<div class=\"dc-debug-row\"><div class=\"dc-debug-label\">{}</div><div class=\"dc-debug-value\">{}</div></div>",
                label, value
            );
        }
        html.push_str(
            "<i class=\"fa fa-window-close dc-debug-remove\" aria-hidden=\"true\" onclick=\"this.parentNode.remove();\"></i></div>",
        );
        html
    }
}

/// Escapes text for use in HTML content and attribute values.
pub(crate) fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn escape_value(text: &str) -> String {
    escape_html(text).replace('[', "&#91;")
}
