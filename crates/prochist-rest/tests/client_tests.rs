// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow};
use prochist_rest::{Client, DownloadTrigger, FileSaver};
use std::thread;
use std::time::Duration;
use tiny_http::{Header, Response, Server};

#[test]
fn list_history_instances_decodes_engine_records() -> Result<()> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let base_url = format!("http://{}/engine-rest", server.server_addr());

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        assert_eq!(request.url(), "/engine-rest/history/process-instance");
        let body = r#"[
            {"id":"inst-1","state":"ACTIVE","businessKey":"order-1",
             "startTime":"2026-02-19T12:34:56.000+0000","endTime":null},
            {"id":"inst-2","state":"COMPLETED",
             "startTime":"2026-02-18T08:00:00.000+0000",
             "endTime":"2026-02-18T09:00:00.000+0000"}
        ]"#;
        let response = Response::from_string(body).with_status_code(200).with_header(
            Header::from_bytes("Content-Type", "application/json")
                .expect("valid content type header"),
        );
        request.respond(response).expect("response should succeed");
    });

    let client = Client::new(&base_url, Duration::from_secs(1))?;
    let instances = client.list_history_instances()?;

    assert_eq!(instances.len(), 2);
    assert_eq!(instances[0].id, "inst-1");
    assert_eq!(instances[0].business_key.as_deref(), Some("order-1"));
    assert!(instances[0].end_time.is_none());
    assert_eq!(instances[1].state, "COMPLETED");
    assert!(instances[1].end_time.is_some());

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn list_history_instances_surfaces_engine_error_message() -> Result<()> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let base_url = format!("http://{}/engine-rest", server.server_addr());

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        let response = Response::from_string(r#"{"message":"history disabled"}"#)
            .with_status_code(500);
        request.respond(response).expect("response should succeed");
    });

    let client = Client::new(&base_url, Duration::from_secs(1))?;
    let error = client
        .list_history_instances()
        .expect_err("engine error should propagate");
    let message = error.to_string();
    assert!(message.contains("history disabled"), "got: {message}");
    assert!(message.contains("500"), "got: {message}");

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn unreachable_engine_error_names_the_config_knob() -> Result<()> {
    let client = Client::new("http://127.0.0.1:1/engine-rest", Duration::from_millis(50))?;
    let error = client
        .list_history_instances()
        .expect_err("unreachable engine should fail");
    assert!(error.to_string().contains("engine.base_url"));
    Ok(())
}

#[test]
fn client_rejects_empty_base_url() {
    let error = Client::new("", Duration::from_secs(1)).expect_err("empty base url should fail");
    assert!(error.to_string().contains("must not be empty"));
}

#[test]
fn file_saver_writes_the_artifact_into_the_download_dir() -> Result<()> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let artifact_url = format!("http://{}/bucket/report.zip", server.server_addr());

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        assert_eq!(request.url(), "/bucket/report.zip");
        let response = Response::from_data(b"zip-bytes".to_vec()).with_status_code(200);
        request.respond(response).expect("response should succeed");
    });

    let dir = tempfile::tempdir()?;
    let saver = FileSaver::new(dir.path().to_path_buf(), Duration::from_secs(1))?;
    saver.trigger(&artifact_url)?;

    let saved = std::fs::read(dir.path().join("report.zip"))?;
    assert_eq!(saved, b"zip-bytes");
    assert!(
        !dir.path().join("report.zip.part").exists(),
        "staging file must not survive"
    );

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn file_saver_leaves_no_residue_when_the_host_errors() -> Result<()> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let artifact_url = format!("http://{}/bucket/broken.zip", server.server_addr());

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        let response = Response::from_string("denied").with_status_code(403);
        request.respond(response).expect("response should succeed");
    });

    let dir = tempfile::tempdir()?;
    let saver = FileSaver::new(dir.path().to_path_buf(), Duration::from_secs(1))?;
    let error = saver
        .trigger(&artifact_url)
        .expect_err("403 should fail the trigger");
    assert!(error.to_string().contains("403"));

    let leftovers: Vec<_> = std::fs::read_dir(dir.path())?.collect();
    assert!(leftovers.is_empty(), "download dir should stay clean");

    handle.join().expect("server thread should join");
    Ok(())
}
