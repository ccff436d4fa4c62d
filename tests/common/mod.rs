//! Shared helpers for the integration tests

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use tempfile::TempDir;
use tower::ServiceExt;

use hysteria_panel::console::{build_router, ConsoleState, SessionKey};
use hysteria_panel::hysteria::{ApplyController, ConfigWriter};
use hysteria_panel::netinfo::PublicIpResolver;
use hysteria_panel::service::{ServiceError, ServiceManager};
use hysteria_panel::store::Store;

/// Service manager that records calls instead of running systemctl
#[derive(Default)]
pub struct FakeService {
    pub restarts: AtomicUsize,
    pub fail_restart: AtomicBool,
    pub active: AtomicBool,
    pub journal: Mutex<Option<String>>,
}

impl FakeService {
    pub fn restart_count(&self) -> usize {
        self.restarts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ServiceManager for FakeService {
    async fn restart(&self) -> Result<(), ServiceError> {
        self.restarts.fetch_add(1, Ordering::SeqCst);
        if self.fail_restart.load(Ordering::SeqCst) {
            return Err(ServiceError::Failed {
                command: "systemctl restart hysteria".to_string(),
                status: "exit status: 1".to_string(),
                stderr: "Job for hysteria.service failed".to_string(),
            });
        }
        Ok(())
    }

    async fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    async fn journal_tail(&self, _lines: usize) -> Result<String, ServiceError> {
        match self.journal.lock().unwrap().clone() {
            Some(journal) => Ok(journal),
            None => Err(ServiceError::Spawn {
                program: "journalctl".to_string(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            }),
        }
    }
}

/// A console wired to an in-memory store, a temp config path and a fake service
pub struct TestConsole {
    pub app: Router,
    pub state: ConsoleState,
    pub service: Arc<FakeService>,
    pub config_path: PathBuf,
    _dir: TempDir,
}

impl TestConsole {
    pub async fn new(base_path: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("hysteria").join("config.yaml");
        Self::with_config_path(base_path, dir, config_path).await
    }

    pub async fn with_config_path(base_path: &str, dir: TempDir, config_path: PathBuf) -> Self {
        let store = Store::open_in_memory().await.unwrap();
        let service = Arc::new(FakeService::default());
        let apply = ApplyController::new(ConfigWriter::new(&config_path), service.clone());

        // Nothing listens on the discard port; the probe fails immediately
        let resolver = PublicIpResolver::new("http://127.0.0.1:9/", Duration::from_millis(500))
            .with_probe("false", &[]);

        let state = ConsoleState::new(store, apply, resolver, 100, base_path)
            .with_session_key(SessionKey::from_bytes([42u8; 32]));

        Self {
            app: build_router(state.clone()),
            state,
            service,
            config_path,
            _dir: dir,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.app.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn post_form(&self, uri: &str, cookie: Option<&str>, body: &str) -> Response<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap()).await
    }

    /// Log in as the seeded administrator and return the session cookie pair
    pub async fn login(&self) -> String {
        let uri = format!("{}/login", self.state.base_path());
        let response = self.post_form(&uri, None, "username=admin&password=admin").await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        cookie_pair(&response, "hpanel_session").expect("session cookie")
    }

    pub fn config_yaml(&self) -> serde_yaml::Value {
        let content = std::fs::read_to_string(&self.config_path).unwrap();
        serde_yaml::from_str(&content).unwrap()
    }
}

/// `name=value` of a cookie set by `response`
pub fn cookie_pair(response: &Response<Body>, name: &str) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.split(';').next())
        .find(|pair| pair.starts_with(&format!("{}=", name)))
        .map(str::to_string)
}

pub fn location(response: &Response<Body>) -> &str {
    response.headers()[header::LOCATION].to_str().unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8_lossy(&bytes).into_owned()
}
