//! Evaluation of notification templates against an event.
//!
//! Templates use the action syntax of Go's `text/template`, which is what
//! Sensu users write for every other handler:
//!
//! - `{{ .Entity.Name }}` looks up a field path (the leading dot is optional);
//!   a missing label or annotation key renders as `<no value>`,
//! - `{{ . }}` renders the whole context as JSON,
//! - `{{- ` and ` -}}` trim the surrounding whitespace,
//! - `{{/* ... */}}` is a comment,
//! - `{{ UnixTime .Check.Executed }}` and `{{ toJSON .Check.Labels }}` call
//!   one of the built-in functions.
//!
//! Pipelines, conditionals and ranges are not supported.

use serde_json::Value;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

use crate::error::TemplateError;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";
/// What Go prints for a nil value.
const NO_VALUE: &str = "<no value>";
/// Context fields holding free-form maps rather than fixed fields. A missing
/// key below them renders as [`NO_VALUE`] instead of failing.
const MAP_FIELDS: [&str; 2] = ["Labels", "Annotations"];
static MISSING_KEY: Value = Value::Null;

/// Renders `source` against `context`.
///
/// `name` only identifies the template in error messages.
pub fn evaluate(name: &str, source: &str, context: &Value) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(source.len());
    let mut rest = source;
    let mut offset = 0;
    let mut trim_next = false;

    while let Some(start) = rest.find(OPEN) {
        let after_open = &rest[start + OPEN.len()..];
        let trim_before = has_left_trim_marker(after_open);

        let mut text = &rest[..start];
        if trim_next {
            text = text.trim_start();
        }
        if trim_before {
            text = text.trim_end();
        }
        out.push_str(text);

        let end = after_open.find(CLOSE).ok_or_else(|| TemplateError::Unclosed {
            template: name.to_string(),
            offset: offset + start,
        })?;
        let mut action = &after_open[..end];
        if trim_before {
            action = &action[1..];
        }
        trim_next = has_right_trim_marker(action);
        if trim_next {
            action = &action[..action.len() - 1];
        }

        out.push_str(&render_action(name, action.trim(), context)?);

        let consumed = start + OPEN.len() + end + CLOSE.len();
        offset += consumed;
        rest = &rest[consumed..];
    }

    out.push_str(if trim_next { rest.trim_start() } else { rest });
    Ok(out)
}

fn has_left_trim_marker(action: &str) -> bool {
    action
        .strip_prefix('-')
        .is_some_and(|rest| rest.starts_with(char::is_whitespace))
}

fn has_right_trim_marker(action: &str) -> bool {
    action
        .strip_suffix('-')
        .is_some_and(|rest| rest.ends_with(char::is_whitespace))
}

fn render_action(name: &str, action: &str, context: &Value) -> Result<String, TemplateError> {
    if action.starts_with("/*") && action.ends_with("*/") {
        return Ok(String::new());
    }

    let tokens: Vec<&str> = action.split_whitespace().collect();
    let Some((first, args)) = tokens.split_first() else {
        return Err(TemplateError::EmptyAction {
            template: name.to_string(),
        });
    };
    if args.is_empty() {
        resolve(name, first, context).map(render_value)
    } else {
        call(name, first, args, context)
    }
}

fn resolve<'a>(name: &str, token: &str, context: &'a Value) -> Result<&'a Value, TemplateError> {
    if token == "." {
        return Ok(context);
    }
    let path = token.strip_prefix('.').unwrap_or(token);

    let mut current = context;
    let mut parent = "";
    for field in path.split('.') {
        current = match current {
            Value::Object(map) => match map.get(field) {
                Some(value) => value,
                None if MAP_FIELDS.contains(&parent) => &MISSING_KEY,
                None => return Err(unknown_field(name, token)),
            },
            _ => return Err(unknown_field(name, token)),
        };
        parent = field;
    }
    Ok(current)
}

fn unknown_field(name: &str, token: &str) -> TemplateError {
    TemplateError::UnknownField {
        template: name.to_string(),
        path: token.to_string(),
    }
}

fn call(
    name: &str,
    function: &str,
    args: &[&str],
    context: &Value,
) -> Result<String, TemplateError> {
    let bad_arguments = |reason: String| TemplateError::BadArguments {
        template: name.to_string(),
        function: function.to_string(),
        reason,
    };

    match function {
        "UnixTime" | "toJSON" => {}
        _ => {
            return Err(TemplateError::UnknownFunction {
                template: name.to_string(),
                function: function.to_string(),
            })
        }
    }

    let [arg] = args else {
        return Err(bad_arguments(format!("expected 1 argument, got {}", args.len())));
    };
    let value = resolve(name, arg, context)?;

    if function == "toJSON" {
        return serde_json::to_string(value).map_err(|e| bad_arguments(e.to_string()));
    }

    let seconds = value
        .as_i64()
        .ok_or_else(|| bad_arguments(format!("{arg} is not an integer")))?;
    OffsetDateTime::from_unix_timestamp(seconds)
        .map_err(|e| bad_arguments(e.to_string()))?
        .format(&Rfc3339)
        .map_err(|e| bad_arguments(e.to_string()))
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => NO_VALUE.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}
