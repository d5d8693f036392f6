// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests against a mocked cloud API using wiremock.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use insteon_cloud::command::{CommandKind, CommandRequest};
use insteon_cloud::protocol::HttpConfig;
use insteon_cloud::{
    ConnectionState, Error, ProtocolError, Session, SessionConfig, StreamError,
    UnknownDevicePolicy,
};
use serde_json::{Value, json};
use wiremock::matchers::{body_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Fixtures
// ============================================================================

const HOUSE_ID: i64 = 1234;

fn token_json(access: &str, refresh: &str) -> Value {
    json!({
        "access_token": access,
        "refresh_token": refresh,
        "expires_in": 3600,
        "token_type": "Bearer"
    })
}

fn devices_json() -> Value {
    json!({
        "DeviceList": [
            {"HouseID": HOUSE_ID, "DeviceID": 55, "DeviceName": "Porch Light",
             "DevCat": 1, "SubCat": 32, "InsteonID": "1A2B3C"},
            {"HouseID": HOUSE_ID, "DeviceID": 56, "DeviceName": "Hall Switch",
             "DevCat": 2, "SubCat": 42, "InsteonID": "4D5E6F"}
        ]
    })
}

fn scenes_json() -> Value {
    json!({
        "SceneList": [
            {"SceneID": 9, "HouseID": HOUSE_ID, "Group": 17, "SceneName": "Evening",
             "StatusDevice": "1A2B3C",
             "DeviceList": [{"DeviceID": 55, "OnLevel": 50, "DeviceRoleMask": 2,
                             "DeviceGroupDetailID": 700, "RampRate": 28}]}
        ]
    })
}

async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .and(body_string_contains("grant_type=password"))
        .and(body_string_contains("username=user"))
        .and(body_string_contains("client_id=client"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_json("access-1", "refresh-1")))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_houses(server: &MockServer, house_ids: &[i64]) {
    let houses: Vec<Value> = house_ids
        .iter()
        .map(|id| json!({"HouseID": id, "HouseName": format!("House {id}"), "IconID": 1}))
        .collect();

    Mock::given(method("GET"))
        .and(path("/houses"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "HouseList": houses })))
        .mount(server)
        .await;
}

async fn mount_lists(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/devices"))
        .and(query_param("properties", "all"))
        .respond_with(ResponseTemplate::new(200).set_body_json(devices_json()))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/scenes"))
        .and(query_param("properties", "all"))
        .respond_with(ResponseTemplate::new(200).set_body_json(scenes_json()))
        .mount(server)
        .await;
}

fn config(server: &MockServer) -> SessionConfig {
    SessionConfig::new("user", "pass", "client")
        .with_base_url(server.uri())
        .with_poll_interval(Duration::from_millis(10))
}

async fn connected_session(server: &MockServer, config: SessionConfig) -> Session {
    mount_login(server).await;
    mount_houses(server, &[HOUSE_ID]).await;
    mount_lists(server).await;

    let session = Session::new(config).unwrap();
    session.connect().await.unwrap();
    session
}

fn sse(frames: &[&str]) -> ResponseTemplate {
    let body: String = frames.iter().map(|f| format!("{f}\n")).collect();
    ResponseTemplate::new(200).set_body_raw(body, "text/event-stream")
}

async fn mount_stream(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(format!("/houses/{HOUSE_ID}/stream")))
        .respond_with(response)
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_command(server: &MockServer, request: Value, response: Value, calls: u64) {
    Mock::given(method("POST"))
        .and(path("/commands"))
        .and(body_json(request))
        .respond_with(ResponseTemplate::new(200).set_body_json(response))
        .expect(calls)
        .mount(server)
        .await;
}

// ============================================================================
// Connect
// ============================================================================

mod connect {
    use super::*;

    #[tokio::test]
    async fn connect_with_one_house_populates_cache() {
        let server = MockServer::start().await;
        let session = connected_session(&server, config(&server)).await;

        assert_eq!(session.state(), ConnectionState::Connected);
        assert_eq!(session.house_id(), Some(HOUSE_ID));
        assert_eq!(session.devices().unwrap().len(), 2);
        assert_eq!(session.scenes().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn connect_twice_fails() {
        let server = MockServer::start().await;
        let session = connected_session(&server, config(&server)).await;

        assert!(matches!(session.connect().await, Err(Error::AlreadyConnected)));
        assert!(session.is_connected());
    }

    #[tokio::test]
    async fn connect_with_zero_houses_fails() {
        let server = MockServer::start().await;
        mount_login(&server).await;
        mount_houses(&server, &[]).await;

        let session = Session::new(config(&server)).unwrap();
        let result = session.connect().await;

        assert!(matches!(result, Err(Error::HouseCount(0))));
        assert_eq!(session.state(), ConnectionState::Disconnected);
        assert!(matches!(session.devices(), Err(Error::NotConnected)));
    }

    #[tokio::test]
    async fn connect_with_two_houses_fails_without_loading_lists() {
        let server = MockServer::start().await;
        mount_login(&server).await;
        mount_houses(&server, &[1, 2]).await;

        Mock::given(method("GET"))
            .and(path("/devices"))
            .respond_with(ResponseTemplate::new(200).set_body_json(devices_json()))
            .expect(0)
            .mount(&server)
            .await;

        let session = Session::new(config(&server)).unwrap();
        assert!(matches!(session.connect().await, Err(Error::HouseCount(2))));
        assert!(!session.is_connected());
        assert!(session.house_id().is_none());
    }

    #[tokio::test]
    async fn connect_can_be_retried_after_failure() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/oauth2/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_json("a", "r")))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/houses"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"HouseList": []})))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        mount_houses(&server, &[HOUSE_ID]).await;
        mount_lists(&server).await;

        let session = Session::new(config(&server)).unwrap();
        assert!(session.connect().await.is_err());
        session.connect().await.unwrap();
        assert!(session.is_connected());
    }

    #[tokio::test]
    async fn rejected_login_surfaces_auth_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/oauth2/token"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "invalid_grant"})))
            .mount(&server)
            .await;

        let session = Session::new(config(&server)).unwrap();
        let result = session.connect().await;

        assert!(matches!(
            result,
            Err(Error::Auth(insteon_cloud::AuthError::Rejected { status: 401 }))
        ));
        assert_eq!(session.state(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn undecodable_token_surfaces_auth_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/oauth2/token"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&server)
            .await;

        let session = Session::new(config(&server)).unwrap();
        assert!(matches!(
            session.connect().await,
            Err(Error::Auth(insteon_cloud::AuthError::InvalidResponse(_)))
        ));
    }
}

// ============================================================================
// Transport
// ============================================================================

mod transport {
    use super::*;

    fn short_timeout_config(server: &MockServer) -> SessionConfig {
        config(server).with_http_config(
            HttpConfig::new("client")
                .with_base_url(server.uri())
                .with_timeout(Duration::from_millis(200)),
        )
    }

    async fn mount_refresh(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/oauth2/token"))
            .and(body_string_contains("grant_type=refresh_token"))
            .and(body_string_contains("refresh_token=refresh-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_json("access-2", "refresh-2")))
            .expect(1)
            .mount(server)
            .await;
    }

    fn stalled() -> ResponseTemplate {
        ResponseTemplate::new(200)
            .set_body_json(json!({"HouseList": []}))
            .set_delay(Duration::from_secs(2))
    }

    #[tokio::test]
    async fn requests_carry_api_key_and_bearer_token() {
        let server = MockServer::start().await;
        mount_login(&server).await;

        Mock::given(method("GET"))
            .and(path("/houses"))
            .and(header("authentication", "APIKey client"))
            .and(header("authorization", "Bearer access-1"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"HouseList": [{"HouseID": HOUSE_ID}]})),
            )
            .expect(1)
            .mount(&server)
            .await;
        mount_lists(&server).await;

        let session = Session::new(config(&server)).unwrap();
        session.connect().await.unwrap();
    }

    #[tokio::test]
    async fn transport_failure_refreshes_once_and_retries() {
        let server = MockServer::start().await;
        mount_login(&server).await;
        mount_refresh(&server).await;

        Mock::given(method("GET"))
            .and(path("/houses"))
            .respond_with(stalled())
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/houses"))
            .and(header("authorization", "Bearer access-2"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"HouseList": [{"HouseID": HOUSE_ID}]})),
            )
            .expect(1)
            .mount(&server)
            .await;
        mount_lists(&server).await;

        let session = Session::new(short_timeout_config(&server)).unwrap();
        session.connect().await.unwrap();
        assert_eq!(session.house_id(), Some(HOUSE_ID));
    }

    #[tokio::test]
    async fn refresh_without_new_refresh_token_keeps_previous_one() {
        let server = MockServer::start().await;
        mount_login(&server).await;

        Mock::given(method("POST"))
            .and(path("/oauth2/token"))
            .and(body_string_contains("grant_type=refresh_token"))
            .and(body_string_contains("refresh_token=refresh-1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"access_token": "access-2", "expires_in": 3600})),
            )
            .expect(2)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/houses"))
            .respond_with(stalled())
            .up_to_n_times(2)
            .expect(2)
            .mount(&server)
            .await;
        mount_houses(&server, &[HOUSE_ID]).await;
        mount_lists(&server).await;

        let session = Session::new(
            config(&server).with_http_config(
                HttpConfig::new("client")
                    .with_base_url(server.uri())
                    .with_timeout(Duration::from_millis(200))
                    .with_max_auth_retries(2),
            ),
        )
        .unwrap();

        session.connect().await.unwrap();
        assert!(session.is_connected());
    }

    #[tokio::test]
    async fn second_transport_failure_propagates() {
        let server = MockServer::start().await;
        mount_login(&server).await;
        mount_refresh(&server).await;

        Mock::given(method("GET"))
            .and(path("/houses"))
            .respond_with(stalled())
            .expect(2)
            .mount(&server)
            .await;

        let session = Session::new(short_timeout_config(&server)).unwrap();
        let result = session.connect().await;

        match result {
            Err(Error::Protocol(ProtocolError::Http(e))) => assert!(e.is_timeout()),
            other => panic!("expected transport error, got {other:?}"),
        }
        assert!(!session.is_connected());
    }

    #[tokio::test]
    async fn http_error_status_is_not_retried() {
        let server = MockServer::start().await;
        mount_login(&server).await;

        Mock::given(method("POST"))
            .and(path("/oauth2/token"))
            .and(body_string_contains("grant_type=refresh_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_json("x", "y")))
            .expect(0)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/houses"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .expect(1)
            .mount(&server)
            .await;

        let session = Session::new(config(&server)).unwrap();
        let result = session.connect().await;

        assert!(matches!(
            result,
            Err(Error::Protocol(ProtocolError::UnexpectedStatus { status: 500, ref body })) if body == "boom"
        ));
    }
}

// ============================================================================
// Cache
// ============================================================================

mod cache {
    use super::*;

    #[tokio::test]
    async fn lookup_by_insteon_id_returns_matching_device() {
        let server = MockServer::start().await;
        let session = connected_session(&server, config(&server)).await;

        for device in session.devices().unwrap() {
            let found = session.device(&device.insteon_id).unwrap();
            assert_eq!(found.insteon_id, device.insteon_id);
        }

        let porch = session.device("1A2B3C").unwrap();
        assert_eq!(porch.device_id, 55);
        assert_eq!(porch.device_name, "Porch Light");
    }

    #[tokio::test]
    async fn unknown_entities_are_reported() {
        let server = MockServer::start().await;
        let session = connected_session(&server, config(&server)).await;

        assert!(matches!(session.device("FFFFFF"), Err(Error::UnknownDevice(id)) if id == "FFFFFF"));
        assert!(matches!(session.scene(99), Err(Error::UnknownScene(99))));

        let scene = session.scene(9).unwrap();
        assert_eq!(scene.scene_name, "Evening");
        assert_eq!(scene.device_list[0].on_level, 50);
    }

    #[tokio::test]
    async fn refresh_overwrites_and_keeps_missing_entries() {
        let server = MockServer::start().await;
        mount_login(&server).await;
        mount_houses(&server, &[HOUSE_ID]).await;

        Mock::given(method("GET"))
            .and(path("/devices"))
            .respond_with(ResponseTemplate::new(200).set_body_json(devices_json()))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/devices"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "DeviceList": [
                    {"HouseID": HOUSE_ID, "DeviceID": 55, "DeviceName": "Front Porch",
                     "InsteonID": "1A2B3C"}
                ]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/scenes"))
            .respond_with(ResponseTemplate::new(200).set_body_json(scenes_json()))
            .expect(2)
            .mount(&server)
            .await;

        let session = Session::new(config(&server)).unwrap();
        session.connect().await.unwrap();
        session.refresh_devices_and_scenes().await.unwrap();

        assert_eq!(session.device("1A2B3C").unwrap().device_name, "Front Porch");
        assert_eq!(session.device("4D5E6F").unwrap().device_name, "Hall Switch");
        assert_eq!(session.devices().unwrap().len(), 2);
    }
}

// ============================================================================
// Commands
// ============================================================================

mod commands {
    use super::*;

    async fn mount_poll(server: &MockServer, id: i64, response: Value, times: u64) {
        let mock = Mock::given(method("GET"))
            .and(path(format!("/commands/{id}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(response));
        // wiremock panics on `up_to_n_times(0)`; `expect(0)` alone asserts no calls.
        let mock = if times > 0 { mock.up_to_n_times(times) } else { mock };
        mock.expect(times).mount(server).await;
    }

    #[tokio::test]
    async fn polls_until_succeeded_and_returns_payload() {
        let server = MockServer::start().await;
        let session = connected_session(&server, config(&server)).await;
        let request = CommandRequest::device(CommandKind::GetStatus, 55, 0);

        mount_command(
            &server,
            json!({"command": "get_status", "device_id": 55, "level": 0}),
            json!({"id": 7, "status": "pending", "link": "/api/v2/commands/7"}),
            1,
        )
        .await;
        mount_poll(&server, 7, json!({"id": 7, "status": "pending"}), 1).await;
        mount_poll(
            &server,
            7,
            json!({"id": 7, "status": "succeeded", "response": {"level": 42}}),
            1,
        )
        .await;

        let payload: Option<Value> = session.execute(&request).await.unwrap();

        assert_eq!(payload, Some(json!({"level": 42})));
    }

    #[tokio::test]
    async fn failed_status_after_one_poll() {
        let server = MockServer::start().await;
        let session = connected_session(&server, config(&server)).await;
        let request = CommandRequest::scene(CommandKind::On, 9);

        mount_command(
            &server,
            json!({"command": "on", "scene_id": 9}),
            json!({"id": 8, "status": "pending"}),
            1,
        )
        .await;
        mount_poll(&server, 8, json!({"id": 8, "status": "failed"}), 1).await;

        let result = session.execute::<Value>(&request).await;

        assert!(matches!(result, Err(Error::CommandFailed { id: 8 })));
    }

    #[tokio::test]
    async fn immediate_success_without_payload() {
        let server = MockServer::start().await;
        let session = connected_session(&server, config(&server)).await;
        let request = CommandRequest::device(CommandKind::Off, 55, 0);

        mount_command(
            &server,
            json!({"command": "off", "device_id": 55, "level": 0}),
            json!({"id": 3, "status": "succeeded"}),
            1,
        )
        .await;
        mount_poll(&server, 3, json!({"id": 3, "status": "succeeded"}), 0).await;

        let payload = session.execute::<Value>(&request).await.unwrap();

        assert!(payload.is_none());
    }

    #[tokio::test]
    async fn stuck_command_hits_deadline() {
        let server = MockServer::start().await;
        let session = connected_session(
            &server,
            config(&server).with_command_timeout(Some(Duration::from_millis(100))),
        )
        .await;
        let request = CommandRequest::device(CommandKind::On, 55, 100);

        mount_command(
            &server,
            json!({"command": "on", "device_id": 55, "level": 100}),
            json!({"id": 4, "status": "pending"}),
            1,
        )
        .await;
        Mock::given(method("GET"))
            .and(path("/commands/4"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 4, "status": "pending"})))
            .mount(&server)
            .await;

        let result = session.execute::<Value>(&request).await;

        assert!(matches!(result, Err(Error::Timeout(d)) if d == Duration::from_millis(100)));
    }

    #[tokio::test]
    async fn set_device_level_issues_on_with_level() {
        let server = MockServer::start().await;
        let session = connected_session(&server, config(&server)).await;

        mount_command(
            &server,
            json!({"command": "on", "device_id": 55, "level": 40}),
            json!({"id": 11, "status": "succeeded", "response": {"level": 40}}),
            1,
        )
        .await;

        session.set_device_level("1A2B3C", 40).await.unwrap();
    }

    #[tokio::test]
    async fn set_device_level_zero_issues_off() {
        let server = MockServer::start().await;
        let session = connected_session(&server, config(&server)).await;

        mount_command(
            &server,
            json!({"command": "off", "device_id": 56, "level": 0}),
            json!({"id": 12, "status": "succeeded"}),
            1,
        )
        .await;

        session.set_device_level("4D5E6F", 0).await.unwrap();
    }

    #[tokio::test]
    async fn set_device_level_out_of_range_sends_nothing() {
        let server = MockServer::start().await;
        let session = connected_session(&server, config(&server)).await;

        Mock::given(method("POST"))
            .and(path("/commands"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1, "status": "succeeded"})))
            .expect(0)
            .mount(&server)
            .await;

        for level in [101, 200, 255] {
            let result = session.set_device_level("1A2B3C", level).await;
            assert!(matches!(result, Err(Error::Value(_))));
        }
    }

    #[tokio::test]
    async fn set_device_level_unknown_device() {
        let server = MockServer::start().await;
        let session = connected_session(&server, config(&server)).await;

        let result = session.set_device_level("FFFFFF", 10).await;
        assert!(matches!(result, Err(Error::UnknownDevice(_))));
    }

    #[tokio::test]
    async fn set_scene_state_issues_scene_command() {
        let server = MockServer::start().await;
        let session = connected_session(&server, config(&server)).await;

        mount_command(
            &server,
            json!({"command": "on", "scene_id": 9}),
            json!({"id": 20, "status": "succeeded"}),
            1,
        )
        .await;
        mount_command(
            &server,
            json!({"command": "off", "scene_id": 9}),
            json!({"id": 21, "status": "succeeded"}),
            1,
        )
        .await;

        session.set_scene_state(9, true).await.unwrap();
        session.set_scene_state(9, false).await.unwrap();
        assert!(matches!(
            session.set_scene_state(99, true).await,
            Err(Error::UnknownScene(99))
        ));
    }

    #[tokio::test]
    async fn status_returns_reported_level() {
        let server = MockServer::start().await;
        let session = connected_session(&server, config(&server)).await;

        mount_command(
            &server,
            json!({"command": "get_status", "device_id": 55, "level": 0}),
            json!({"id": 30, "status": "pending"}),
            1,
        )
        .await;
        mount_poll(
            &server,
            30,
            json!({"id": 30, "status": "succeeded", "response": {"level": 73}}),
            1,
        )
        .await;

        let level = session.status("1A2B3C").await.unwrap();
        assert_eq!(level.value(), 73);
    }

    #[tokio::test]
    async fn status_without_payload_is_a_parse_error() {
        let server = MockServer::start().await;
        let session = connected_session(&server, config(&server)).await;

        mount_command(
            &server,
            json!({"command": "get_status", "device_id": 55, "level": 0}),
            json!({"id": 31, "status": "succeeded"}),
            1,
        )
        .await;

        let result = session.status("1A2B3C").await;
        assert!(matches!(result, Err(Error::Parse(_))));
    }
}

// ============================================================================
// Event stream
// ============================================================================

mod events {
    use super::*;

    type Seen = Arc<Mutex<Vec<(String, String)>>>;

    fn recorder() -> (Seen, impl FnMut(insteon_cloud::Device, String)) {
        let seen: Seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let callback = move |device: insteon_cloud::Device, status: String| {
            sink.lock().unwrap().push((device.insteon_id, status));
        };
        (seen, callback)
    }

    #[tokio::test]
    async fn data_frame_for_known_device_invokes_callback_once() {
        let server = MockServer::start().await;
        let session = connected_session(&server, config(&server)).await;

        mount_stream(
            &server,
            sse(&[
                ": keep-alive",
                "",
                "event: message",
                r#"data: {"hub_insteon_id": "4A5B6C", "device_insteon_id": "1A2B3C", "device_group": 1, "status": "on"}"#,
                "",
            ]),
        )
        .await;

        let (seen, callback) = recorder();
        session.subscribe(callback).await.unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(*seen, vec![("1A2B3C".to_string(), "on".to_string())]);
    }

    #[tokio::test]
    async fn unknown_device_terminates_subscription() {
        let server = MockServer::start().await;
        let session = connected_session(&server, config(&server)).await;

        mount_stream(
            &server,
            sse(&[
                r#"data: {"device_insteon_id": "1A2B3C", "status": "on"}"#,
                r#"data: {"device_insteon_id": "FFFFFF", "status": "on"}"#,
                r#"data: {"device_insteon_id": "4D5E6F", "status": "off"}"#,
            ]),
        )
        .await;

        let (seen, callback) = recorder();
        let result = session.subscribe(callback).await;

        assert!(matches!(result, Err(Error::UnknownDevice(id)) if id == "FFFFFF"));
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unknown_device_skipped_under_skip_policy() {
        let server = MockServer::start().await;
        let session = connected_session(
            &server,
            config(&server).with_unknown_device_policy(UnknownDevicePolicy::Skip),
        )
        .await;

        mount_stream(
            &server,
            sse(&[
                r#"data: {"device_insteon_id": "FFFFFF", "status": "on"}"#,
                r#"data: {"device_insteon_id": "4D5E6F", "status": "off"}"#,
            ]),
        )
        .await;

        let (seen, callback) = recorder();
        session.subscribe(callback).await.unwrap();

        assert_eq!(
            *seen.lock().unwrap(),
            vec![("4D5E6F".to_string(), "off".to_string())]
        );
    }

    #[tokio::test]
    async fn non_200_stream_fails() {
        let server = MockServer::start().await;
        let session = connected_session(&server, config(&server)).await;

        mount_stream(&server, ResponseTemplate::new(503)).await;

        let result = session.subscribe(|_, _| {}).await;
        assert!(matches!(
            result,
            Err(Error::Stream(StreamError::UnexpectedStatus(503)))
        ));
    }

    #[tokio::test]
    async fn malformed_frame_fails() {
        let server = MockServer::start().await;
        let session = connected_session(&server, config(&server)).await;

        mount_stream(&server, sse(&["data: {not json"])).await;

        let result = session.subscribe(|_, _| {}).await;
        assert!(matches!(
            result,
            Err(Error::Stream(StreamError::MalformedEvent(_)))
        ));
    }

    #[tokio::test]
    async fn spawned_stream_delivers_through_channel() {
        let server = MockServer::start().await;
        let session = connected_session(&server, config(&server)).await;

        mount_stream(
            &server,
            sse(&[
                r#"data: {"device_insteon_id": "1A2B3C", "status": "on"}"#,
                "",
                r#"data: {"device_insteon_id": "4D5E6F", "status": "off", "received_at": "2024-03-01T18:22:05Z"}"#,
            ]),
        )
        .await;

        let mut stream = session.spawn_event_stream(1).unwrap();

        let first = stream.recv().await.unwrap();
        assert_eq!(first.device.device_name, "Porch Light");
        assert_eq!(first.status(), "on");

        let second = stream.recv().await.unwrap();
        assert_eq!(second.device.insteon_id, "4D5E6F");
        assert!(second.message.received_at.is_some());

        assert!(stream.recv().await.is_none());
        stream.join().await.unwrap();
    }

    #[tokio::test]
    async fn spawned_stream_reports_error_on_join() {
        let server = MockServer::start().await;
        let session = connected_session(&server, config(&server)).await;

        mount_stream(&server, ResponseTemplate::new(401)).await;

        let mut stream = session.spawn_event_stream(4).unwrap();
        assert!(stream.recv().await.is_none());
        assert!(matches!(
            stream.join().await,
            Err(Error::Stream(StreamError::UnexpectedStatus(401)))
        ));
    }
}
