//! Turns an [`Event`] into the [`MessageCard`] posted to Teams.

use std::collections::BTreeMap;

use crate::card::{MessageCard, Section};
use crate::config::HandlerConfig;
use crate::error::TemplateError;
use crate::event::Event;
use crate::template;

pub const REDACTED: &str = "**REDACTED**";

/// Severity bucket of a check status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Resolved,
    Warning,
    Critical,
}

impl Severity {
    /// Only 0 and 2 are distinguished; every other status is a warning.
    #[must_use]
    pub fn from_status(status: i64) -> Self {
        match status {
            0 => Severity::Resolved,
            2 => Severity::Critical,
            _ => Severity::Warning,
        }
    }

    #[must_use]
    pub fn color(self) -> &'static str {
        match self {
            // Green
            Severity::Resolved => "#008450",
            // Red
            Severity::Critical => "#B81D13",
            // Yellow
            Severity::Warning => "#EFB700",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Severity::Resolved => "Resolved",
            Severity::Critical => "Critical",
            Severity::Warning => "Warning",
        }
    }
}

/// Theme color and status label for the event's check status.
#[must_use]
pub fn classify(event: &Event) -> (&'static str, &'static str) {
    let severity = Severity::from_status(event.check.status);
    (severity.color(), severity.label())
}

/// Builds the notification card for `event`.
///
/// Template errors are reported and replaced by an empty string; building a
/// card never fails.
#[must_use]
pub fn build_card(event: &Event, config: &HandlerConfig) -> MessageCard {
    let context = event.template_context();
    let render = |name: &str, source: &str| {
        template::evaluate(name, source, &context).unwrap_or_else(|err| {
            report_template_error(name, &err);
            String::new()
        })
    };

    let summary = render("summary", &config.summary_template);
    let text = if config.message_template.is_empty() {
        String::new()
    } else {
        render("message", &config.message_template)
    };

    let (color, label) = classify(event);
    let mut section = Section {
        activity_image: config.icon_url.clone(),
        facts: Vec::new(),
    };

    // A custom message replaces the default facts.
    if text.is_empty() {
        section.add_fact("Entity", event.entity.metadata.name.as_str());
        section.add_fact("Check", event.check.metadata.name.as_str());
        section.add_fact("State", event.check.state.as_str());
        section.add_fact("Occurrences", event.check.occurrences.to_string());
        section.add_fact("Output", format!("```\n{}```", event.check.output));
    }

    if config.include_entity_labels && !event.entity.metadata.labels.is_empty() {
        section.add_fact(
            "Entity Labels",
            render_labels(&event.entity.metadata.labels, config, ""),
        );
    }

    // Check label lines end in an extra <br>, entity label lines do not.
    if config.include_check_labels && !event.check.metadata.labels.is_empty() {
        section.add_fact(
            "Check Labels",
            render_labels(&event.check.metadata.labels, config, "<br>"),
        );
    }

    MessageCard {
        summary,
        title: format!("Sensu Event ({label})"),
        text,
        theme_color: color.to_string(),
        sections: vec![section],
        ..MessageCard::default()
    }
}

/// One `key: value` line per label, in key order.
fn render_labels(labels: &BTreeMap<String, String>, config: &HandlerConfig, suffix: &str) -> String {
    let mut buf = String::new();
    for (key, value) in labels {
        let value = if config.redacts(key) { REDACTED } else { value.as_str() };
        buf.push_str(&format!("{key}: {value}\n{suffix}"));
    }
    buf
}

#[cfg(feature = "telemetry")]
fn report_template_error(name: &str, err: &TemplateError) {
    tracing::warn!(template = name, error = %err, "error processing template");
}

#[cfg(not(feature = "telemetry"))]
fn report_template_error(name: &str, err: &TemplateError) {
    eprintln!(
        "{}: Error processing {name} template: {err}",
        crate::config::PLUGIN_NAME
    );
}
