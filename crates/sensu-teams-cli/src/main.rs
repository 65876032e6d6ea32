//! Sensu Go handler that posts events to Microsoft Teams.
//!
//! Reads one event from stdin, applies configuration overrides from the
//! event's annotations, builds the message card and posts it to the
//! configured incoming webhook.

mod teams;

use anyhow::{Context, Result};
use clap::Parser;
use sensu_teams_core::config::{
    parse_bool, DEFAULT_REDACT_MATCH, DEFAULT_SUMMARY_TEMPLATE, PLUGIN_NAME,
};
use sensu_teams_core::{build_card, Event, HandlerConfig, HandlerOptions};
use std::io::{self, Read};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::teams::TeamsClient;

#[derive(Parser)]
#[command(name = PLUGIN_NAME, version, about = "The Sensu Go Teams handler", long_about = None)]
struct Cli {
    /// The webhook url to send messages to
    #[arg(
        short = 'w',
        long,
        env = "TEAMS_WEBHOOK_URL",
        hide_env_values = true,
        default_value = ""
    )]
    webhook_url: String,

    /// The URL for an icon to display in the message
    #[arg(short = 'i', long, env = "TEAMS_ICON_URL")]
    icon_url: Option<String>,

    /// The Teams notification output template, in Go text/template format
    #[arg(short = 't', long, env = "TEAMS_MESSAGE_TEMPLATE", default_value = "")]
    message_template: String,

    /// The Teams summary template, in Go text/template format
    #[arg(short = 's', long, env = "TEAMS_SUMMARY_TEMPLATE", default_value = DEFAULT_SUMMARY_TEMPLATE)]
    summary_template: String,

    /// Regex to redact values of matching labels
    #[arg(short = 'm', long, env = "TEAMS_REDACTMATCH", default_value = DEFAULT_REDACT_MATCH)]
    redact_match: String,

    /// Enable redaction of labels
    #[arg(short = 'r', long, env = "TEAMS_REDACT", value_parser = flag_value)]
    redact: bool,

    /// Include check labels in Teams message?
    #[arg(short = 'l', long, env = "TEAMS_INCLUDE_CHECK_LABELS", value_parser = flag_value)]
    include_check_labels: bool,

    /// Include entity labels in Teams message?
    #[arg(short = 'e', long, env = "TEAMS_INCLUDE_ENTITY_LABELS", value_parser = flag_value)]
    include_entity_labels: bool,
}

/// Boolean flag values, from the command line or the environment.
fn flag_value(value: &str) -> Result<bool, String> {
    parse_bool(value).ok_or_else(|| format!("invalid boolean {value:?}"))
}

impl From<Cli> for HandlerOptions {
    fn from(cli: Cli) -> Self {
        Self {
            webhook_url: cli.webhook_url,
            icon_url: cli.icon_url.filter(|url| !url.is_empty()),
            message_template: cli.message_template,
            summary_template: cli.summary_template,
            redact_match: cli.redact_match,
            redact: cli.redact,
            include_check_labels: cli.include_check_labels,
            include_entity_labels: cli.include_entity_labels,
        }
    }
}

fn read_event(mut input: impl Read) -> Result<Event> {
    let mut buf = String::new();
    input
        .read_to_string(&mut buf)
        .context("Failed to read event from stdin")?;
    let event: Event = serde_json::from_str(&buf).context("Failed to parse event")?;
    event.validate().context("Invalid event")?;
    Ok(event)
}

fn configure(mut options: HandlerOptions, event: &Event) -> Result<HandlerConfig> {
    for applied in options.apply_annotations(event)? {
        info!(
            option = applied.option.path(),
            value = %applied.value,
            "overriding handler configuration with value of {}.{}",
            applied.source,
            applied.annotation
        );
    }
    Ok(options.validate()?)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let options = HandlerOptions::from(Cli::parse());

    // Fail on bad flags before blocking on stdin.
    options
        .clone()
        .validate()
        .context("error validating input")?;

    let event = read_event(io::stdin().lock())?;
    let config = configure(options, &event).context("error validating input")?;
    let card = build_card(&event, &config);

    TeamsClient::new()?
        .send(config.webhook_url(), &card)
        .await
        .context("Failed to send Teams message")?;

    println!("Notification sent to Teams.");
    Ok(())
}
