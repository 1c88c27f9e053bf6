// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow};
use prochist_rest::{Client, DownloadOutcome, RecordingTrigger, resolve_download};
use std::thread;
use std::time::Duration;
use tiny_http::{Header, Response, Server};

fn json_response(body: &str, status: u16) -> Response<std::io::Cursor<Vec<u8>>> {
    Response::from_string(body)
        .with_status_code(status)
        .with_header(
            Header::from_bytes("Content-Type", "application/json")
                .expect("valid content type header"),
        )
}

fn start_server() -> Result<(Server, String)> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let base_url = format!("http://{}/engine-rest", server.server_addr());
    Ok((server, base_url))
}

#[test]
fn empty_instance_id_issues_zero_network_calls() -> Result<()> {
    let (server, base_url) = start_server()?;
    let client = Client::new(&base_url, Duration::from_secs(1))?;
    let trigger = RecordingTrigger::new();

    let outcome = resolve_download(&client, &trigger, "");
    assert_eq!(outcome, DownloadOutcome::MissingIdentifier);
    assert!(trigger.urls().is_empty());

    let pending = server.try_recv().map_err(|error| anyhow!("{error}"))?;
    assert!(pending.is_none(), "no request should have been issued");
    Ok(())
}

#[test]
fn primary_hit_triggers_download_and_skips_fallback() -> Result<()> {
    let (server, base_url) = start_server()?;

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        assert_eq!(
            request.url(),
            "/engine-rest/process-instance/inst-1/variables/download-s3"
        );
        request
            .respond(json_response(r#"{"value":"https://x/a.zip"}"#, 200))
            .expect("response should succeed");

        let pending = server.try_recv().expect("try_recv should succeed");
        assert!(pending.is_none(), "fallback must not be called");
    });

    let client = Client::new(&base_url, Duration::from_secs(1))?;
    let trigger = RecordingTrigger::new();
    let outcome = resolve_download(&client, &trigger, "inst-1");

    assert_eq!(
        outcome,
        DownloadOutcome::Triggered("https://x/a.zip".to_owned())
    );
    assert_eq!(trigger.urls(), vec!["https://x/a.zip"]);

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn primary_404_falls_back_to_history_variables() -> Result<()> {
    let (server, base_url) = start_server()?;

    let handle = thread::spawn(move || {
        let request = server.recv().expect("primary request expected");
        request
            .respond(json_response("{}", 404))
            .expect("response should succeed");

        let request = server.recv().expect("fallback request expected");
        assert_eq!(
            request.url(),
            "/engine-rest/history/variable-instance?processInstanceId=inst-2"
        );
        request
            .respond(json_response(
                r#"[{"name":"other","value":"z"},{"name":"download-s3","value":"https://y/b.zip"}]"#,
                200,
            ))
            .expect("response should succeed");
    });

    let client = Client::new(&base_url, Duration::from_secs(1))?;
    let trigger = RecordingTrigger::new();
    let outcome = resolve_download(&client, &trigger, "inst-2");

    assert_eq!(
        outcome,
        DownloadOutcome::Triggered("https://y/b.zip".to_owned())
    );
    assert_eq!(trigger.urls(), vec!["https://y/b.zip"]);

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn undecodable_primary_body_falls_back_to_history_variables() -> Result<()> {
    let (server, base_url) = start_server()?;

    let handle = thread::spawn(move || {
        let request = server.recv().expect("primary request expected");
        request
            .respond(json_response("not json", 200))
            .expect("response should succeed");

        let request = server.recv().expect("fallback request expected");
        request
            .respond(json_response(
                r#"[{"name":"download-s3","value":"https://y/c.zip"}]"#,
                200,
            ))
            .expect("response should succeed");
    });

    let client = Client::new(&base_url, Duration::from_secs(1))?;
    let trigger = RecordingTrigger::new();
    let outcome = resolve_download(&client, &trigger, "inst-8");

    assert_eq!(
        outcome,
        DownloadOutcome::Triggered("https://y/c.zip".to_owned())
    );

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn fallback_without_marker_variable_reports_not_found() -> Result<()> {
    let (server, base_url) = start_server()?;

    let handle = thread::spawn(move || {
        let request = server.recv().expect("primary request expected");
        request
            .respond(json_response("{}", 404))
            .expect("response should succeed");

        let request = server.recv().expect("fallback request expected");
        request
            .respond(json_response(r#"[{"name":"other","value":"z"}]"#, 200))
            .expect("response should succeed");
    });

    let client = Client::new(&base_url, Duration::from_secs(1))?;
    let trigger = RecordingTrigger::new();
    let outcome = resolve_download(&client, &trigger, "inst-3");

    assert_eq!(outcome, DownloadOutcome::VariableNotFoundInFallback);
    assert!(trigger.urls().is_empty());

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn primary_success_with_null_value_is_terminal_without_fallback() -> Result<()> {
    let (server, base_url) = start_server()?;

    let handle = thread::spawn(move || {
        let request = server.recv().expect("primary request expected");
        request
            .respond(json_response(r#"{"value":null}"#, 200))
            .expect("response should succeed");

        let pending = server.try_recv().expect("try_recv should succeed");
        assert!(pending.is_none(), "fallback must not be called");
    });

    let client = Client::new(&base_url, Duration::from_secs(1))?;
    let trigger = RecordingTrigger::new();
    let outcome = resolve_download(&client, &trigger, "inst-4");

    assert_eq!(outcome, DownloadOutcome::LinkAbsentInPrimary);
    assert!(trigger.urls().is_empty());

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn fallback_marker_with_empty_value_reports_link_absent() -> Result<()> {
    let (server, base_url) = start_server()?;

    let handle = thread::spawn(move || {
        let request = server.recv().expect("primary request expected");
        request
            .respond(json_response("{}", 500))
            .expect("response should succeed");

        let request = server.recv().expect("fallback request expected");
        request
            .respond(json_response(r#"[{"name":"download-s3","value":null}]"#, 200))
            .expect("response should succeed");
    });

    let client = Client::new(&base_url, Duration::from_secs(1))?;
    let trigger = RecordingTrigger::new();
    let outcome = resolve_download(&client, &trigger, "inst-5");

    assert_eq!(outcome, DownloadOutcome::LinkAbsentInFallback);
    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn fallback_transport_failure_is_terminal() -> Result<()> {
    let (server, base_url) = start_server()?;

    let handle = thread::spawn(move || {
        let request = server.recv().expect("primary request expected");
        request
            .respond(json_response("{}", 404))
            .expect("response should succeed");

        let request = server.recv().expect("fallback request expected");
        request
            .respond(json_response("boom", 503))
            .expect("response should succeed");
    });

    let client = Client::new(&base_url, Duration::from_secs(1))?;
    let trigger = RecordingTrigger::new();
    let outcome = resolve_download(&client, &trigger, "inst-6");

    assert_eq!(outcome, DownloadOutcome::TransportFailureFallback);
    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn unreachable_engine_lands_in_fallback_transport_failure() -> Result<()> {
    let client = Client::new("http://127.0.0.1:1/engine-rest", Duration::from_millis(50))?;
    let trigger = RecordingTrigger::new();
    let outcome = resolve_download(&client, &trigger, "inst-7");

    assert_eq!(outcome, DownloadOutcome::TransportFailureFallback);
    assert!(trigger.urls().is_empty());
    Ok(())
}
