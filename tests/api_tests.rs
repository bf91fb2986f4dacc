use std::sync::Arc;

use actix_web::cookie::Cookie;
use actix_web::{App, test, web};
use relayctl::backend::MockGpioBackend;
use relayctl::{AppConfig, AppState, Level, build_controller};
use serde_json::Value;

fn sample_config() -> AppConfig {
    serde_json::from_str(
        r#"
        {
            "http": {
                "host": "localhost:8080",
                "path": "/api/v1",
                "timeout": 30
            },
            "gpio": {
                "chip": "/dev/gpiochip0",
                "blink": { "release_ms": 5, "hold_ms": 10 }
            },
            "key_pin_control": [
                {
                    "key": "alice",
                    "pins": [
                        { "name": "relay1", "number": 17, "active": "low" },
                        { "name": "relay2", "number": 27, "active": "high" }
                    ]
                },
                {
                    "key": "bob",
                    "pins": [
                        { "name": "gate", "number": 27, "active": "high" }
                    ]
                }
            ]
        }
        "#,
    )
    .expect("valid sample config")
}

fn app_state() -> (Arc<MockGpioBackend>, AppState<MockGpioBackend>, String) {
    let cfg = sample_config();
    let backend = Arc::new(MockGpioBackend::default());
    let controller = Arc::new(build_controller(&cfg, backend.clone()).expect("controller"));

    (backend, AppState { controller }, cfg.http.path.clone())
}

#[actix_rt::test]
async fn list_pins_for_credential() {
    let (_, state, scope_path) = app_state();
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state.clone()))
            .service(state.api_scope(&scope_path)),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/v1/pins")
        .cookie(Cookie::new("key", "alice"))
        .to_request();
    let pins: Vec<Value> = test::call_and_read_body_json(&app, req).await;

    assert_eq!(pins.len(), 2);
    assert_eq!(pins[0]["name"], "relay1");
    assert_eq!(pins[0]["number"], 17);
    assert_eq!(pins[0]["active_high"], false);
    assert_eq!(pins[1]["number"], 27);
    assert_eq!(pins[1]["active_high"], true);
}

#[actix_rt::test]
async fn list_pins_without_credential_is_empty() {
    let (_, state, scope_path) = app_state();
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state.clone()))
            .service(state.api_scope(&scope_path)),
    )
    .await;

    let req = test::TestRequest::get().uri("/api/v1/pins").to_request();
    let pins: Vec<Value> = test::call_and_read_body_json(&app, req).await;
    assert!(pins.is_empty());

    let req = test::TestRequest::get()
        .uri("/api/v1/pins")
        .cookie(Cookie::new("key", "mallory"))
        .to_request();
    let pins: Vec<Value> = test::call_and_read_body_json(&app, req).await;
    assert!(pins.is_empty());
}

#[actix_rt::test]
async fn pin_on_and_off_honor_polarity() {
    let (backend, state, scope_path) = app_state();
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state.clone()))
            .service(state.api_scope(&scope_path)),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/v1/pins/17/on")
        .cookie(Cookie::new("key", "alice"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let req = test::TestRequest::post()
        .uri("/api/v1/pins/17/off")
        .cookie(Cookie::new("key", "alice"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    assert_eq!(backend.writes(), vec![(17, Level::Low), (17, Level::High)]);
}

#[actix_rt::test]
async fn unauthorized_request_is_silently_ignored() {
    let (backend, state, scope_path) = app_state();
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state.clone()))
            .service(state.api_scope(&scope_path)),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/v1/pins/17/on")
        .cookie(Cookie::new("key", "bob"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let req = test::TestRequest::post()
        .uri("/api/v1/pins/17/blink")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    assert!(backend.writes().is_empty());
}

#[actix_rt::test]
async fn blink_runs_full_sequence() {
    let (backend, state, scope_path) = app_state();
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state.clone()))
            .service(state.api_scope(&scope_path)),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/v1/pins/27/blink")
        .cookie(Cookie::new("key", "bob"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    assert_eq!(
        backend.writes(),
        vec![(27, Level::Low), (27, Level::High), (27, Level::Low)]
    );
}

#[actix_rt::test]
async fn invalid_pin_number_returns_400() {
    let (_, state, scope_path) = app_state();
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state.clone()))
            .service(state.api_scope(&scope_path)),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/v1/pins/relay1/on")
        .cookie(Cookie::new("key", "alice"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_rt::test]
async fn wrong_method_returns_405() {
    let (_, state, scope_path) = app_state();
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state.clone()))
            .service(state.api_scope(&scope_path)),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/v1/pins/17/on")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 405);

    let req = test::TestRequest::post().uri("/api/v1/pins").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 405);
}

#[actix_rt::test]
async fn driver_failure_returns_500() {
    let (backend, state, scope_path) = app_state();
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state.clone()))
            .service(state.api_scope(&scope_path)),
    )
    .await;
    backend.set_fail_writes(true);

    let req = test::TestRequest::post()
        .uri("/api/v1/pins/17/on")
        .cookie(Cookie::new("key", "alice"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 500);

    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().starts_with("GPIO error"));
}
