//! Render pass behaviour across a page.

use dynamic_conditions::locale::{DayMonthTable, Locale};
use dynamic_conditions::prelude::*;
use dynamic_conditions::tags::TagRegistry;
use chrono::DateTime;

struct Shell;

impl ElementShell for Shell {
    fn open_wrapper(&self) -> String {
        "<div class=\"elementor-column\">".to_string()
    }

    fn close_wrapper(&self) -> String {
        "</div>".to_string()
    }
}

#[derive(Default)]
struct PopupArea {
    popups: Vec<ElementSettings>,
    removed: Vec<String>,
}

impl PopupLocation for PopupArea {
    fn popups(&self) -> Vec<ElementSettings> {
        self.popups
            .iter()
            .filter(|popup| !self.removed.contains(&popup.element.id))
            .cloned()
            .collect()
    }

    fn remove_popup(&mut self, id: &str) {
        self.removed.push(id.to_string());
    }
}

fn website() -> EvaluationContext {
    EvaluationContext::new(RenderMode::Website)
        .with_now(DateTime::parse_from_rfc3339("2024-03-13T10:30:00+00:00").unwrap())
}

fn column(resize: bool) -> ElementSettings {
    let mut settings = ElementSettings::new(ElementIdentity::new("c1", "column", "column"))
        .with_dynamic_value("yes")
        .with_condition(Operator::NotEmpty);
    settings.resize_other_columns = resize;
    settings.column_size = Some(33.3);
    settings
}

#[test]
fn test_hidden_column_emits_one_placeholder() {
    let mut pass = RenderPass::new(website());
    let host = StaticHost::new();

    let output = pass.render_element(&column(true), &host, &Shell, || "<p>column</p>".to_string());

    assert_eq!(output.matches("dc-hidden-column").count(), 1);
    assert!(output.contains("data-size=\"33.3\""));
    assert!(!output.contains("<p>column</p>"));
    assert!(output.ends_with("<!-- hidden column -->"));
}

#[test]
fn test_no_placeholder_without_resize_or_column() {
    let mut pass = RenderPass::new(website());
    let host = StaticHost::new();

    let output = pass.render_element(&column(false), &host, &Shell, String::new);
    assert!(!output.contains("dc-hidden-column"));

    let mut widget = column(true);
    widget.element = ElementIdentity::new("w1", "widget", "heading");
    let output = pass.render_element(&widget, &host, &Shell, String::new);
    assert!(!output.contains("dc-hidden-column"));
    assert_eq!(output, "<!-- hidden widget -->");
}

#[test]
fn test_placeholders_in_order() {
    let mut pass = RenderPass::new(website());
    let mut settings = column(true);
    settings.hide_wrapper_selector = Some(".hero".to_string());
    settings.hide_others_selector = Some("#cta".to_string());

    let output = pass.render_element(&settings, &StaticHost::new(), &Shell, || {
        "<link rel=\"stylesheet\" href=\"col.css\" /><p>text</p>".to_string()
    });

    assert_eq!(
        output,
        concat!(
            "<link rel=\"stylesheet\" href=\"col.css\" />",
            "<div class=\"dc-hidden-column\" data-size=\"33.3\"></div>",
            "<div class=\"dc-hide-wrapper\" data-selector=\".hero\"></div>",
            "<div class=\"dc-hide-others\" data-selector=\"#cta\"></div>",
            "<!-- hidden column -->",
        )
    );
}

#[test]
fn test_nested_tickets() {
    let mut pass = RenderPass::new(website());
    let host = StaticHost::new();

    let section = ElementSettings::new(ElementIdentity::new("s1", "section", "section"))
        .with_dynamic_value("a")
        .with_condition(Operator::Equal)
        .with_check_value("b");
    let widget = ElementSettings::new(ElementIdentity::new("w1", "widget", "text"))
        .with_dynamic_value("a")
        .with_condition(Operator::Equal)
        .with_check_value("a");

    let outer = pass.before_render(&section, &host);
    let inner = pass.before_render(&widget, &host);
    assert!(!outer.is_suppressed());
    assert!(inner.is_suppressed());

    let inner_html = pass.after_render(inner, "<p>inner</p>".to_string(), &Shell);
    let outer_html = pass.after_render(outer, format!("<section>{}</section>", inner_html), &Shell);
    assert_eq!(outer_html, "<section><!-- hidden widget --></section>");
}

#[test]
fn test_debug_css_once_per_pass() {
    let mut pass = RenderPass::new(website().with_can_edit(true));
    let host = StaticHost::new();
    let settings = ElementSettings::new(ElementIdentity::new("w1", "widget", "text"))
        .with_dynamic_value("[shortcode]")
        .with_condition(Operator::Empty)
        .with_debug();

    let first = pass.render_element(&settings, &host, &Shell, || "<p>one</p>".to_string());
    let second = pass.render_element(&settings, &host, &Shell, || "<p>two</p>".to_string());

    assert!(first.contains("dynamicconditions-debug"));
    assert!(first.contains("&#91;shortcode]"));
    assert_eq!(first.matches("<style>").count(), 1);
    assert!(second.contains("dynamicconditions-debug"));
    assert!(!second.contains("<style>"));
    assert!(second.ends_with("<p>two</p>"));

    let mut next_pass = RenderPass::new(website().with_can_edit(true));
    let third = next_pass.render_element(&settings, &host, &Shell, String::new);
    assert!(third.contains("<style>"));
}

#[test]
fn test_popups_only_suppressed_on_website() {
    let host = StaticHost::new();
    let hidden = ElementSettings::new(ElementIdentity::new("p1", "popup", "popup"))
        .with_dynamic_value("x")
        .with_condition(Operator::NotEmpty);
    let shown = ElementSettings::new(ElementIdentity::new("p2", "popup", "popup"))
        .with_dynamic_value("x")
        .with_condition(Operator::Empty);

    let mut area = PopupArea {
        popups: vec![hidden.clone(), shown.clone()],
        removed: Vec::new(),
    };
    let mut preview = RenderPass::new(EvaluationContext::new(RenderMode::Preview));
    assert!(preview.suppress_popups(&mut area, &host).is_empty());
    assert!(area.removed.is_empty());

    let mut pass = RenderPass::new(website());
    assert_eq!(pass.suppress_popups(&mut area, &host), vec!["p1".to_string()]);
    assert_eq!(area.popups().len(), 1);
}

#[test]
fn test_unknown_operator_is_inert() {
    let settings = ElementSettings::from_json(
        r#"{"element": {"id": "w1", "type": "widget"}, "dynamicValue": "x", "condition": "regex", "checkValue": "x"}"#,
    )
    .unwrap();
    let mut pass = RenderPass::new(website());
    let ticket = pass.before_render(&settings, &StaticHost::new());
    assert_eq!(ticket.state, GateState::Visible);
}

#[test]
fn test_german_weekday_condition() {
    let german = Locale::with_table(
        "de_DE",
        DayMonthTable::from_names(
            ["Montag", "Dienstag", "Mittwoch", "Donnerstag", "Freitag", "Samstag", "Sonntag"],
            [
                "Januar", "Februar", "März", "April", "Mai", "Juni", "Juli", "August", "September",
                "Oktober", "November", "Dezember",
            ],
        ),
    );
    let mut settings = ElementSettings::new(ElementIdentity::new("w1", "widget", "text"))
        .with_dynamic_value("Dienstag, 2. Januar 2024")
        .with_condition(Operator::InArray)
        .with_compare_type(CompareType::Days);
    settings.day_array_value = vec!["1".to_string(), "2".to_string()];

    let ctx = website().with_locale(german);
    assert!(ConditionEvaluator::new().should_hide(&settings, &ctx, &StaticHost::new()));
}

#[test]
fn test_number_posts_tag_feeds_condition() {
    let host = StaticHost::new().with_item_count(3);
    let count = TagRegistry::with_defaults()
        .render("numberposts", &serde_json::json!({"posttypes": ["post"]}), &host)
        .unwrap();

    let settings = ElementSettings::new(ElementIdentity::new("w1", "widget", "text"))
        .with_dynamic_tag(r#"[elementor-tag id="7" name="numberposts" settings="%7B%7D"]"#)
        .with_dynamic_value(count.as_str())
        .with_condition(Operator::Greater)
        .with_check_value("2");

    let decision = ConditionEvaluator::new().evaluate(&settings, &website(), &host);
    assert!(decision.is_hidden());
    assert!(decision.condition_met);
}
