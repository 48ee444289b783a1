//! Request dispatch: routing, middleware chains and failure handling.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::json;

use dispatch_kernel::http::Request;
use dispatch_kernel::middleware::builtin::ResponseHeaders;
use dispatch_kernel::middleware::MiddlewareSpec;
use dispatch_kernel::{AppConfig, AppContext, PathParams, Registry, RouteDeclaration};

mod common;

use common::{build, echo, entries, new_log, record, Broken, Deny, Explodes, Stamp};

#[tokio::test]
async fn test_middleware_order_around_controller() {
    let log = new_log();
    let built = Arc::new(AtomicUsize::new(0));
    let mut registry = Registry::new();
    for label in ["G1", "G2", "R1", "R2"] {
        record(&mut registry, label, &log, &built);
    }
    registry.controller(
        RouteDeclaration::new("GET", "/ordered", "echo")
            .middleware("R1")
            .middleware("R2"),
        echo(&log),
    );

    let mut config = AppConfig::default();
    config.global_middlewares = vec![MiddlewareSpec::new("G1"), MiddlewareSpec::new("G2")];
    let app = build(config, registry);

    let response = app.handle(Request::new("GET", "/ordered")).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        entries(&log),
        vec![
            "G1:before", "G2:before", "R1:before", "R2:before", "controller", "R2:after", "R1:after",
            "G2:after", "G1:after",
        ]
    );
    assert_eq!(built.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn test_short_circuit_skips_rest_of_chain() {
    let log = new_log();
    let built = Arc::new(AtomicUsize::new(0));
    let mut registry = Registry::new();
    record(&mut registry, "G", &log, &built);
    record(&mut registry, "R", &log, &built);
    let deny_log = log.clone();
    registry
        .middleware("deny", move || Deny { log: deny_log.clone() })
        .controller(
            RouteDeclaration::new("GET", "/guarded", "echo")
                .middleware("deny")
                .middleware("R"),
            echo(&log),
        );

    let mut config = AppConfig::default();
    config.global_middlewares = vec![MiddlewareSpec::new("G")];
    let app = build(config, registry);

    let response = app.handle(Request::new("GET", "/guarded")).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(entries(&log), vec!["G:before", "deny", "G:after"]);
    // "R" was never reached, so never built
    assert_eq!(built.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_empty_chain_builds_no_middleware() {
    let log = new_log();
    let built = Arc::new(AtomicUsize::new(0));
    let mut registry = Registry::new();
    record(&mut registry, "unused", &log, &built);
    registry.controller(RouteDeclaration::new("GET", "/plain", "echo"), echo(&log));
    let app = build(AppConfig::default(), registry);

    let response = app.handle(Request::new("GET", "/plain")).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(entries(&log), vec!["controller"]);
    assert_eq!(built.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_wildcard_parameter_reaches_controller() {
    let log = new_log();
    let mut registry = Registry::new();
    registry.controller(RouteDeclaration::new("GET", "/api/{v}/x", "echo"), echo(&log));
    let app = build(AppConfig::default(), registry);

    let response = app.handle(Request::new("GET", "/api/42/x")).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.body_json().unwrap()["params"], json!({"v": "42"}));
}

#[tokio::test]
async fn test_method_and_length_must_match() {
    let log = new_log();
    let mut registry = Registry::new();
    registry.controller(RouteDeclaration::new("POST", "/items/{id}", "echo"), echo(&log));
    let app = build(AppConfig::default(), registry);

    let lowercase = app
        .handle(Request::new("post", "/items/7").with_body("payload"))
        .await;
    let wrong_method = app.handle(Request::new("GET", "/items/7")).await;
    let too_long = app.handle(Request::new("POST", "/items/7/extra")).await;
    let trailing_slash = app.handle(Request::new("POST", "/items/7/")).await;

    assert_eq!(lowercase.status(), StatusCode::OK);
    assert_eq!(lowercase.body_json().unwrap()["body"], json!("payload"));
    assert_eq!(wrong_method.status(), StatusCode::NOT_FOUND);
    assert_eq!(too_long.status(), StatusCode::NOT_FOUND);
    assert_eq!(trailing_slash.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_first_registered_route_wins() {
    let log = new_log();
    let mut registry = Registry::new();
    registry
        .controller(RouteDeclaration::new("GET", "/users/{id}", "by_id"), echo(&log))
        .controller(RouteDeclaration::new("GET", "/users/me", "me"), |_p: PathParams, _c: &AppContext| {
            Explodes
        });
    let app = build(AppConfig::default(), registry);

    let response = app.handle(Request::new("GET", "/users/me")).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.body_json().unwrap()["params"], json!({"id": "me"}));
}

#[tokio::test]
async fn test_code_routes_precede_config_routes() {
    let log = new_log();
    let mut registry = Registry::new();
    registry
        .controller(RouteDeclaration::new("GET", "/shared", "echo"), echo(&log))
        .register_controller("boom", |_p: PathParams, _c: &AppContext| Explodes);

    let mut config = AppConfig::default();
    config.routes = vec![
        RouteDeclaration::new("GET", "/shared", "boom"),
        RouteDeclaration::new("GET", "/only-config/{name}", "echo"),
    ];
    let app = build(config, registry);

    let shared = app.handle(Request::new("GET", "/shared")).await;
    let from_config = app.handle(Request::new("GET", "/only-config/abc")).await;

    assert_eq!(shared.status(), StatusCode::OK);
    assert_eq!(from_config.body_json().unwrap()["params"], json!({"name": "abc"}));
}

#[tokio::test]
async fn test_not_found_bypasses_middleware() {
    let log = new_log();
    let built = Arc::new(AtomicUsize::new(0));
    let mut registry = Registry::new();
    record(&mut registry, "G", &log, &built);

    let mut config = AppConfig::default();
    config.global_middlewares = vec![MiddlewareSpec::new("G")];
    let app = build(config, registry);

    let response = app.handle(Request::new("GET", "/missing")).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        response.body_json().unwrap(),
        json!({"codeStatus": "404", "text": "Page not found"})
    );
    assert!(entries(&log).is_empty());
    assert_eq!(built.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_root_route_matches_empty_path() {
    let log = new_log();
    let mut registry = Registry::new();
    registry.controller(RouteDeclaration::new("GET", "/", "echo"), echo(&log));
    let app = build(AppConfig::default(), registry);

    assert_eq!(app.handle(Request::new("GET", "/")).await.status(), StatusCode::OK);
    assert_eq!(app.handle(Request::new("GET", "")).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unregistered_controller_answers_500() {
    let mut config = AppConfig::default();
    config.routes = vec![RouteDeclaration::new("GET", "/ghost", "nobody")];
    let app = build(config, Registry::new());

    let response = app.handle(Request::new("GET", "/ghost")).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body_json().unwrap()["text"], json!("Controller is not available"));
}

#[tokio::test]
async fn test_non_controller_target_answers_500() {
    let log = new_log();
    let built = Arc::new(AtomicUsize::new(0));
    let mut registry = Registry::new();
    record(&mut registry, "mw", &log, &built);
    registry.route(RouteDeclaration::new("GET", "/confused", "mw"));
    let app = build(AppConfig::default(), registry);

    let response = app.handle(Request::new("GET", "/confused")).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(built.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_unknown_route_middleware_answers_500() {
    let log = new_log();
    let mut registry = Registry::new();
    registry.controller(
        RouteDeclaration::new("GET", "/typo", "echo").middleware("not_registered"),
        echo(&log),
    );
    let app = build(AppConfig::default(), registry);

    let response = app.handle(Request::new("GET", "/typo")).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(entries(&log).is_empty());
}

#[tokio::test]
async fn test_middleware_error_answers_500() {
    let log = new_log();
    let mut registry = Registry::new();
    registry
        .middleware("broken", || Broken)
        .controller(RouteDeclaration::new("GET", "/broken", "echo").middleware("broken"), echo(&log));
    let app = build(AppConfig::default(), registry);

    let response = app.handle(Request::new("GET", "/broken")).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body_json().unwrap()["codeStatus"], json!("500"));
}

#[tokio::test]
async fn test_panicking_controller_answers_500_and_app_survives() {
    let log = new_log();
    let mut registry = Registry::new();
    registry
        .controller(RouteDeclaration::new("GET", "/panic", "boom"), |_p: PathParams, _c: &AppContext| {
            Explodes
        })
        .controller(RouteDeclaration::new("GET", "/fine", "echo"), echo(&log));
    let app = build(AppConfig::default(), registry);

    let panicked = app.handle(Request::new("GET", "/panic")).await;
    let after = app.handle(Request::new("GET", "/fine")).await;

    assert_eq!(panicked.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(after.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_response_changes_flow_both_ways() {
    let log = new_log();
    let mut registry = Registry::new();
    let mut headers = serde_json::Map::new();
    headers.insert("x-frame-options".into(), json!("DENY"));
    registry
        .middleware("stamp", || Stamp)
        .configurable_middleware(ResponseHeaders::NAME, ResponseHeaders::from_options)
        .controller(
            RouteDeclaration::new("GET", "/headers", "echo")
                .middleware_with(ResponseHeaders::NAME, headers)
                .middleware("stamp"),
            echo(&log),
        );
    let app = build(AppConfig::default(), registry);

    let response = app.handle(Request::new("GET", "/headers")).await;

    assert_eq!(response.header("x-stamp"), Some("in"));
    assert_eq!(response.header("x-frame-options"), Some("DENY"));
}

