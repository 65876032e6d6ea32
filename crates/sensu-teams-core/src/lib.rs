//! Core of the Sensu Microsoft Teams handler.
//!
//! Turns a Sensu [`Event`] into a Teams [`MessageCard`]: the check status
//! picks the title and theme color, templates produce the summary and
//! optional body, and labels are rendered as facts with optional redaction.

pub mod card;
pub mod config;
pub mod error;
pub mod event;
pub mod message;
pub mod template;

pub use card::{Fact, MessageCard, Section};
pub use config::{AppliedOverride, ConfigOption, HandlerConfig, HandlerOptions};
pub use error::{ConfigError, EventError, TemplateError};
pub use event::{Check, Entity, Event, ObjectMeta};
pub use message::{build_card, classify, Severity};
