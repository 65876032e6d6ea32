//! Handler configuration: raw options, annotation overrides and validation.
//!
//! Options arrive as [`HandlerOptions`] (from flags or environment), may be
//! overridden per event by `sensu.io/plugins/teams/config/<option>`
//! annotations, and are then validated once into an immutable
//! [`HandlerConfig`].

use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{ConfigError, Result};
use crate::event::Event;

pub const PLUGIN_NAME: &str = "sensu-teams-handler";
/// Annotation prefix for per-event configuration overrides.
pub const KEYSPACE: &str = "sensu.io/plugins/teams/config";
pub const DEFAULT_SUMMARY_TEMPLATE: &str =
    "Sensu Event: {{.Entity.Name}}/{{.Check.Name}}: {{.Check.State}}";
pub const DEFAULT_REDACT_MATCH: &str = "(?i).*(pass|key).*";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigOption {
    WebhookUrl,
    IconUrl,
    MessageTemplate,
    SummaryTemplate,
    RedactMatch,
    Redact,
    IncludeCheckLabels,
    IncludeEntityLabels,
}

impl ConfigOption {
    pub const ALL: [ConfigOption; 8] = [
        ConfigOption::WebhookUrl,
        ConfigOption::IconUrl,
        ConfigOption::MessageTemplate,
        ConfigOption::SummaryTemplate,
        ConfigOption::RedactMatch,
        ConfigOption::Redact,
        ConfigOption::IncludeCheckLabels,
        ConfigOption::IncludeEntityLabels,
    ];

    /// Name used for the command line flag and the annotation suffix.
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            ConfigOption::WebhookUrl => "webhook-url",
            ConfigOption::IconUrl => "icon-url",
            ConfigOption::MessageTemplate => "message-template",
            ConfigOption::SummaryTemplate => "summary-template",
            ConfigOption::RedactMatch => "redact-match",
            ConfigOption::Redact => "redact",
            ConfigOption::IncludeCheckLabels => "include-check-labels",
            ConfigOption::IncludeEntityLabels => "include-entity-labels",
        }
    }

    /// Secret options are never taken from annotations.
    #[must_use]
    pub fn is_secret(self) -> bool {
        matches!(self, ConfigOption::WebhookUrl)
    }

    #[must_use]
    pub fn annotation_key(self) -> String {
        format!("{KEYSPACE}/{}", self.path())
    }
}

/// An annotation that replaced a configured value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedOverride {
    pub option: ConfigOption,
    /// `Check.Annotations` or `Entity.Annotations`.
    pub source: &'static str,
    pub annotation: String,
    pub value: String,
}

/// Unvalidated handler options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerOptions {
    pub webhook_url: String,
    pub icon_url: Option<String>,
    pub message_template: String,
    pub summary_template: String,
    pub redact_match: String,
    pub redact: bool,
    pub include_check_labels: bool,
    pub include_entity_labels: bool,
}

impl Default for HandlerOptions {
    fn default() -> Self {
        Self {
            webhook_url: String::new(),
            icon_url: None,
            message_template: String::new(),
            summary_template: DEFAULT_SUMMARY_TEMPLATE.to_string(),
            redact_match: DEFAULT_REDACT_MATCH.to_string(),
            redact: false,
            include_check_labels: false,
            include_entity_labels: false,
        }
    }
}

impl HandlerOptions {
    /// Applies configuration overrides found in the event's annotations.
    ///
    /// Check annotations take precedence over entity annotations; empty
    /// annotation values are ignored.
    pub fn apply_annotations(&mut self, event: &Event) -> Result<Vec<AppliedOverride>> {
        let mut applied = Vec::new();

        for option in ConfigOption::ALL {
            if option.is_secret() {
                continue;
            }
            let key = option.annotation_key();
            let found = non_empty(&event.check.metadata.annotations, &key)
                .map(|v| ("Check.Annotations", v))
                .or_else(|| {
                    non_empty(&event.entity.metadata.annotations, &key)
                        .map(|v| ("Entity.Annotations", v))
                });
            let Some((source, value)) = found else {
                continue;
            };

            self.set(option, &key, value)?;
            applied.push(AppliedOverride {
                option,
                source,
                annotation: key,
                value: value.to_string(),
            });
        }

        Ok(applied)
    }

    fn set(&mut self, option: ConfigOption, annotation: &str, value: &str) -> Result<()> {
        let flag = |value: &str| {
            parse_bool(value).ok_or_else(|| ConfigError::InvalidOverride {
                option: option.path(),
                annotation: annotation.to_string(),
                value: value.to_string(),
            })
        };

        match option {
            ConfigOption::WebhookUrl => self.webhook_url = value.to_string(),
            ConfigOption::IconUrl => self.icon_url = Some(value.to_string()),
            ConfigOption::MessageTemplate => self.message_template = value.to_string(),
            ConfigOption::SummaryTemplate => self.summary_template = value.to_string(),
            ConfigOption::RedactMatch => self.redact_match = value.to_string(),
            ConfigOption::Redact => self.redact = flag(value)?,
            ConfigOption::IncludeCheckLabels => self.include_check_labels = flag(value)?,
            ConfigOption::IncludeEntityLabels => self.include_entity_labels = flag(value)?,
        }
        Ok(())
    }

    /// Checks the options and compiles the redact pattern.
    pub fn validate(self) -> Result<HandlerConfig> {
        if self.webhook_url.is_empty() {
            return Err(ConfigError::MissingWebhookUrl);
        }
        let redact_match =
            Regex::new(&self.redact_match).map_err(|source| ConfigError::InvalidRedactMatch {
                pattern: self.redact_match.clone(),
                source,
            })?;

        Ok(HandlerConfig {
            webhook_url: self.webhook_url,
            icon_url: self.icon_url.unwrap_or_default(),
            message_template: self.message_template,
            summary_template: self.summary_template,
            redact_match,
            redact: self.redact,
            include_check_labels: self.include_check_labels,
            include_entity_labels: self.include_entity_labels,
        })
    }
}

fn non_empty<'a>(annotations: &'a BTreeMap<String, String>, key: &str) -> Option<&'a str> {
    annotations
        .get(key)
        .map(String::as_str)
        .filter(|v| !v.is_empty())
}

/// Accepts the spellings of Go's `strconv.ParseBool`.
#[must_use]
pub fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

/// Validated, immutable handler configuration.
#[derive(Clone)]
pub struct HandlerConfig {
    webhook_url: String,
    pub(crate) icon_url: String,
    pub(crate) message_template: String,
    pub(crate) summary_template: String,
    pub(crate) redact_match: Regex,
    pub(crate) redact: bool,
    pub(crate) include_check_labels: bool,
    pub(crate) include_entity_labels: bool,
}

impl HandlerConfig {
    #[must_use]
    pub fn webhook_url(&self) -> &str {
        &self.webhook_url
    }

    /// Whether `key` names a label whose value must be masked.
    #[must_use]
    pub fn redacts(&self, key: &str) -> bool {
        self.redact && self.redact_match.is_match(key)
    }
}

impl fmt::Debug for HandlerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerConfig")
            .field("webhook_url", &"<secret>")
            .field("icon_url", &self.icon_url)
            .field("message_template", &self.message_template)
            .field("summary_template", &self.summary_template)
            .field("redact_match", &self.redact_match.as_str())
            .field("redact", &self.redact)
            .field("include_check_labels", &self.include_check_labels)
            .field("include_entity_labels", &self.include_entity_labels)
            .finish()
    }
}
