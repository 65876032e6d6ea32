//! End-to-end runs of the `sensu-teams-handler` binary against a mock webhook.

use assert_cmd::Command;
use predicates::prelude::*;
use sensu_teams_core::Event;
use serde_json::{json, Value};
use wiremock::{matchers, Mock, MockServer, ResponseTemplate};

fn handler() -> Command {
    let mut cmd = Command::cargo_bin("sensu-teams-handler").unwrap();
    for var in [
        "TEAMS_WEBHOOK_URL",
        "TEAMS_ICON_URL",
        "TEAMS_MESSAGE_TEMPLATE",
        "TEAMS_SUMMARY_TEMPLATE",
        "TEAMS_REDACTMATCH",
        "TEAMS_REDACT",
        "TEAMS_INCLUDE_CHECK_LABELS",
        "TEAMS_INCLUDE_ENTITY_LABELS",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

fn fixture_event() -> String {
    serde_json::to_string(&Event::fixture("entity1", "check1")).unwrap()
}

async fn received_body(server: &MockServer) -> Value {
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    serde_json::from_slice(&requests[0].body).unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn test_posts_default_card() {
    let server = MockServer::start().await;

    Mock::given(matchers::method("POST"))
        .and(matchers::body_json(json!({
            "@type": "MessageCard",
            "@context": "https://schema.org/extensions",
            "summary": "Sensu Event: entity1/check1: passing",
            "title": "Sensu Event (Resolved)",
            "themeColor": "#008450",
            "sections": [{
                "facts": [
                    {"name": "Entity", "value": "entity1"},
                    {"name": "Check", "value": "check1"},
                    {"name": "State", "value": "passing"},
                    {"name": "Occurrences", "value": "0"},
                    {"name": "Output", "value": "```\n```"}
                ]
            }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string("1"))
        .expect(1)
        .mount(&server)
        .await;

    handler()
        .arg("-w")
        .arg(server.uri())
        .write_stdin(fixture_event())
        .assert()
        .success()
        .stdout(predicate::str::contains("Notification sent to Teams."));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_env_configuration_and_redaction() {
    let server = MockServer::start().await;

    Mock::given(matchers::method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("1"))
        .expect(1)
        .mount(&server)
        .await;

    let mut event = Event::fixture("entity1", "check1");
    event.check.status = 1;
    event
        .entity
        .metadata
        .labels
        .insert("password".to_string(), "hunter2".to_string());
    event
        .entity
        .metadata
        .labels
        .insert("region".to_string(), "eu-west-1".to_string());

    handler()
        .env("TEAMS_WEBHOOK_URL", server.uri())
        .env("TEAMS_INCLUDE_ENTITY_LABELS", "true")
        .env("TEAMS_REDACT", "true")
        .env("TEAMS_MESSAGE_TEMPLATE", "{{.Entity.Name}} needs attention")
        .env("TEAMS_ICON_URL", "https://example.org/sensu.png")
        .write_stdin(serde_json::to_string(&event).unwrap())
        .assert()
        .success();

    let body = received_body(&server).await;
    assert_eq!(body["title"], "Sensu Event (Warning)");
    assert_eq!(body["themeColor"], "#EFB700");
    assert_eq!(body["text"], "entity1 needs attention");
    assert_eq!(
        body["sections"][0]["activityImage"],
        "https://example.org/sensu.png"
    );
    assert_eq!(
        body["sections"][0]["facts"],
        json!([{
            "name": "Entity Labels",
            "value": "password: **REDACTED**\nregion: eu-west-1\n"
        }])
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_go_style_env_booleans_and_null_collections() {
    let server = MockServer::start().await;

    Mock::given(matchers::method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("1"))
        .expect(1)
        .mount(&server)
        .await;

    let event = json!({
        "entity": {
            "metadata": {"name": "entity1", "labels": {"api_key": "abc123"}, "annotations": null},
            "subscriptions": null
        },
        "check": {
            "metadata": {"name": "check1", "labels": null, "annotations": null},
            "handlers": null,
            "status": 2,
            "state": "failing"
        }
    });

    handler()
        .env("TEAMS_WEBHOOK_URL", server.uri())
        .env("TEAMS_REDACT", "1")
        .env("TEAMS_INCLUDE_ENTITY_LABELS", "t")
        .env("TEAMS_INCLUDE_CHECK_LABELS", "0")
        .write_stdin(event.to_string())
        .assert()
        .success();

    let body = received_body(&server).await;
    assert_eq!(body["title"], "Sensu Event (Critical)");
    let facts = body["sections"][0]["facts"].as_array().unwrap();
    assert_eq!(
        facts.last().unwrap(),
        &json!({"name": "Entity Labels", "value": "api_key: **REDACTED**\n"})
    );
    assert!(facts.iter().all(|fact| fact["name"] != "Check Labels"));
}

#[test]
fn test_invalid_env_boolean() {
    handler()
        .args(["-w", "http://127.0.0.1:9"])
        .env("TEAMS_REDACT", "yes")
        .write_stdin(fixture_event())
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid boolean"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_annotation_enables_check_labels() {
    let server = MockServer::start().await;

    Mock::given(matchers::method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut event = Event::fixture("entity1", "check1");
    event
        .check
        .metadata
        .labels
        .insert("team".to_string(), "ops".to_string());
    event.check.metadata.annotations.insert(
        "sensu.io/plugins/teams/config/include-check-labels".to_string(),
        "true".to_string(),
    );

    handler()
        .arg("-w")
        .arg(server.uri())
        .write_stdin(serde_json::to_string(&event).unwrap())
        .assert()
        .success();

    let body = received_body(&server).await;
    assert_eq!(body["sections"][0]["facts"][5]["name"], "Check Labels");
    assert_eq!(body["sections"][0]["facts"][5]["value"], "team: ops\n<br>");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_webhook_error_fails_run() {
    let server = MockServer::start().await;

    Mock::given(matchers::method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_string("Summary or Text is required."))
        .expect(1)
        .mount(&server)
        .await;

    handler()
        .arg("-w")
        .arg(server.uri())
        .write_stdin(fixture_event())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to send Teams message"))
        .stdout(predicate::str::contains("Notification sent").not());
}

#[test]
fn test_missing_webhook_url() {
    handler()
        .write_stdin(fixture_event())
        .assert()
        .failure()
        .stderr(predicate::str::contains("TEAMS_WEBHOOK_URL environment variable is required"));
}

#[test]
fn test_invalid_redact_match() {
    handler()
        .args(["-w", "http://127.0.0.1:9", "--redact-match", "(oops"])
        .write_stdin(fixture_event())
        .assert()
        .failure()
        .stderr(predicate::str::contains("regexp ((oops)"));
}

#[test]
fn test_invalid_event() {
    handler()
        .args(["-w", "http://127.0.0.1:9"])
        .write_stdin("{}")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse event"));
}
