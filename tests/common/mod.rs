//! Shared components and helpers for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::http::StatusCode;
use serde_json::{json, Map, Value};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use dispatch_kernel::http::{HttpServer, Request, Response};
use dispatch_kernel::{
    AppConfig, AppContext, Application, Controller, DispatchError, Middleware, Next, PathParams, Registry,
};

/// Ordered record of what ran.
pub type Log = Arc<Mutex<Vec<String>>>;

pub fn new_log() -> Log {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn entries(log: &Log) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// Records `<label>:before` and `<label>:after` around the rest of the chain.
pub struct Recording {
    pub label: String,
    pub log: Log,
}

#[async_trait]
impl Middleware for Recording {
    async fn process(
        &self,
        request: Request,
        response: Response,
        _ctx: &AppContext,
        next: Next<'_>,
    ) -> Result<Response, DispatchError> {
        self.log.lock().unwrap().push(format!("{}:before", self.label));
        let response = next.run(request, response).await?;
        self.log.lock().unwrap().push(format!("{}:after", self.label));
        Ok(response)
    }
}

/// Register a [`Recording`] middleware under `label`, counting instantiations.
pub fn record(registry: &mut Registry, label: &str, log: &Log, built: &Arc<AtomicUsize>) {
    let (name, log, built) = (label.to_string(), log.clone(), built.clone());
    registry.middleware(label, move || {
        built.fetch_add(1, Ordering::SeqCst);
        Recording {
            label: name.clone(),
            log: log.clone(),
        }
    });
}

/// Answers 403 without calling the rest of the chain.
pub struct Deny {
    pub log: Log,
}

#[async_trait]
impl Middleware for Deny {
    async fn process(
        &self,
        _request: Request,
        _response: Response,
        _ctx: &AppContext,
        _next: Next<'_>,
    ) -> Result<Response, DispatchError> {
        self.log.lock().unwrap().push("deny".to_string());
        Ok(Response::error(StatusCode::FORBIDDEN, "Forbidden"))
    }
}

/// Fails the exchange with an error.
pub struct Broken;

#[async_trait]
impl Middleware for Broken {
    async fn process(
        &self,
        _request: Request,
        _response: Response,
        _ctx: &AppContext,
        _next: Next<'_>,
    ) -> Result<Response, DispatchError> {
        Err(DispatchError::other("middleware exploded"))
    }
}

/// Sets a header on the way in, so the controller's response carries it.
pub struct Stamp;

#[async_trait]
impl Middleware for Stamp {
    async fn process(
        &self,
        request: Request,
        mut response: Response,
        _ctx: &AppContext,
        next: Next<'_>,
    ) -> Result<Response, DispatchError> {
        response.set_header("x-stamp", "in");
        next.run(request, response).await
    }
}

/// Echoes path params and body as JSON into the response it is handed.
pub struct Echo {
    pub params: PathParams,
    pub log: Log,
}

#[async_trait]
impl Controller for Echo {
    async fn execute(&mut self, request: Request, mut response: Response) -> Response {
        self.log.lock().unwrap().push("controller".to_string());
        let params: Map<String, Value> = self
            .params
            .iter()
            .map(|(name, value)| (name.to_string(), json!(value)))
            .collect();
        let body = json!({
            "params": params,
            "method": request.method(),
            "body": String::from_utf8_lossy(request.body()),
        });
        response.set_header("content-type", "application/json");
        response.set_body(body.to_string());
        response
    }
}

pub fn echo(log: &Log) -> impl Fn(PathParams, &AppContext) -> Echo + Send + Sync + 'static {
    let log = log.clone();
    move |params: PathParams, _ctx: &AppContext| Echo {
        params,
        log: log.clone(),
    }
}

/// Panics while handling.
pub struct Explodes;

#[async_trait]
impl Controller for Explodes {
    async fn execute(&mut self, _request: Request, _response: Response) -> Response {
        panic!("controller exploded")
    }
}

pub fn build(config: AppConfig, registry: Registry) -> Arc<Application> {
    Arc::new(Application::build(config, registry).expect("application builds"))
}

/// Serve `app` on an ephemeral port until its shutdown is triggered.
pub async fn serve(app: Arc<Application>) -> (SocketAddr, JoinHandle<Result<(), std::io::Error>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = app.server().shutdown().clone();
    let handle = tokio::spawn(HttpServer::new(app).run(listener, shutdown));
    (addr, handle)
}
