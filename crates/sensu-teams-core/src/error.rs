use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("--webhook-url or TEAMS_WEBHOOK_URL environment variable is required")]
    MissingWebhookUrl,
    #[error("regexp ({pattern}) specified by TEAMS_REDACTMATCH or --redact-match is invalid: {source}")]
    InvalidRedactMatch {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("invalid value {value:?} for {option} in annotation {annotation}")]
    InvalidOverride {
        option: &'static str,
        annotation: String,
        value: String,
    },
}

#[derive(Debug, Error)]
pub enum EventError {
    #[error("event entity is missing a name")]
    MissingEntityName,
    #[error("event check is missing a name")]
    MissingCheckName,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("template {template}: unclosed action starting at byte {offset}")]
    Unclosed { template: String, offset: usize },
    #[error("template {template}: missing value for action")]
    EmptyAction { template: String },
    #[error("template {template}: can't evaluate field {path}")]
    UnknownField { template: String, path: String },
    #[error("template {template}: function {function:?} not defined")]
    UnknownFunction { template: String, function: String },
    #[error("template {template}: wrong arguments for {function}: {reason}")]
    BadArguments {
        template: String,
        function: String,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;
