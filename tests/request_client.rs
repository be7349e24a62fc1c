mod common;

use anyhow::anyhow;
use reqwest::StatusCode;
use serde_json::json;

use common::{RecordingPacer, ScriptedTransport, client_with_key, client_without_key, ok_json};
use fbr_match_stats::http_client::Reply;
use fbr_match_stats::models::SeasonId;
use fbr_match_stats::pacing::Pause;

#[test]
fn retries_server_errors_until_success() {
    let body = json!({"data": [{"season_id": "2023-2024"}]});
    let transport = ScriptedTransport::with_statuses(vec![500, 500, 200], body.clone());
    let pacer = RecordingPacer::default();
    let client = client_with_key(&transport, &pacer);

    let data = client.request("league-seasons", &[("league_id", "9".to_string())]);

    assert_eq!(data, Some(body));
    assert_eq!(transport.calls().len(), 3);
    assert_eq!(pacer.count(Pause::Backoff), 2);
    assert_eq!(pacer.count(Pause::PreRequest), 3);
    assert_eq!(
        pacer.pauses(),
        vec![
            Pause::PreRequest,
            Pause::Backoff,
            Pause::PreRequest,
            Pause::Backoff,
            Pause::PreRequest,
        ]
    );
}

#[test]
fn missing_key_makes_no_network_call() {
    let transport = ScriptedTransport::with_statuses(vec![200], json!({"data": []}));
    let pacer = RecordingPacer::default();
    let client = client_without_key(&transport, &pacer);

    assert!(client.request("matches", &[]).is_none());
    assert!(transport.calls().is_empty());
    assert!(pacer.pauses().is_empty());
}

#[test]
fn exhausted_attempts_read_as_absent_without_trailing_backoff() {
    let transport = ScriptedTransport::with_statuses(vec![500, 500, 500], json!({}));
    let pacer = RecordingPacer::default();
    let client = client_with_key(&transport, &pacer);

    assert!(client.request("matches", &[]).is_none());
    assert_eq!(transport.calls().len(), 3);
    assert_eq!(pacer.count(Pause::PreRequest), 3);
    assert_eq!(pacer.count(Pause::Backoff), 2);
}

#[test]
fn other_failures_share_the_retry_policy() {
    let mut step = 0;
    let transport = ScriptedTransport::new(move |_| {
        step += 1;
        match step {
            1 => Err(anyhow!("connection reset")),
            2 => Ok(Reply::new(StatusCode::NOT_FOUND, "not found")),
            3 => Ok(Reply::new(StatusCode::OK, "<html>oops</html>")),
            _ => ok_json(&json!({"data": []})),
        }
    });
    let pacer = RecordingPacer::default();
    let client = client_with_key(&transport, &pacer).with_api_key(
        fbr_match_stats::fbr_api::ApiKey::new("other-key"),
    );

    let data = client.request_with_attempts("matches", &[], 4);

    assert_eq!(data, Some(json!({"data": []})));
    assert_eq!(pacer.count(Pause::Backoff), 3);
    assert!(
        transport
            .calls()
            .iter()
            .all(|c| c.api_key.as_deref() == Some("other-key"))
    );
}

#[test]
fn sends_key_and_query_parameters() {
    let transport = ScriptedTransport::with_statuses(vec![200], json!({"data": []}));
    let pacer = RecordingPacer::default();
    let client = client_with_key(&transport, &pacer);
    let season = SeasonId::from("2023-2024");

    let items = client.team_matches("18bb7c10", &season);

    assert!(items.is_empty());
    let calls = transport.calls_to("matches");
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].method, "GET");
    assert_eq!(calls[0].api_key.as_deref(), Some("test-key"));
    assert_eq!(calls[0].param("team_id"), Some("18bb7c10"));
    assert_eq!(calls[0].param("league_id"), Some("9"));
    assert_eq!(calls[0].param("season_id"), Some("2023-2024"));
}

#[test]
fn generates_key_once() {
    let transport = ScriptedTransport::new(|call| {
        if call.method == "POST" {
            ok_json(&json!({"api_key": "fresh"}))
        } else {
            ok_json(&json!({"data": [{"season_id": "2024-2025"}, {"season_id": 2023}]}))
        }
    });
    let pacer = RecordingPacer::default();
    let mut client = client_without_key(&transport, &pacer);

    assert_eq!(client.ensure_api_key().expect("key").as_str(), "fresh");
    assert_eq!(client.ensure_api_key().expect("key").as_str(), "fresh");
    assert_eq!(transport.calls_to("generate_api_key").len(), 1);

    let seasons = client.available_seasons();
    assert_eq!(
        seasons,
        vec![SeasonId::from("2024-2025"), SeasonId::from("2023")]
    );
    assert_eq!(
        transport.calls_to("league-seasons")[0].api_key.as_deref(),
        Some("fresh")
    );
}

#[test]
fn key_generation_failure_is_an_error() {
    let transport =
        ScriptedTransport::new(|_| Ok(Reply::new(StatusCode::SERVICE_UNAVAILABLE, "down")));
    let pacer = RecordingPacer::default();
    let mut client = client_without_key(&transport, &pacer);

    assert!(client.refresh_api_key().is_err());
    assert!(client.api_key().is_none());
}
