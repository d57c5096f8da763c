#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::{Mutex, OnceLock};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::{Response, StatusCode};
use serde_json::{json, Value};

static SERVER: OnceLock<TestServer> = OnceLock::new();

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Mutex<Child>,
}

// Statics are never dropped, so the shared server is stopped when the test binary exits
#[ctor::dtor]
fn stop_shared_server() {
    if let Some(server) = SERVER.get() {
        server.stop();
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.stop();
    }
}

impl TestServer {
    pub fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut cmd = Command::new(env!("CARGO_BIN_EXE_finance-api"));
        cmd.env("PORT", port.to_string())
            .env("HOST_ADDR", "127.0.0.1")
            .env("DATABASE_RUN_MIGRATIONS", "true")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        if std::env::var("JWT_SECRET_KEY").is_err() {
            cmd.env("JWT_SECRET_KEY", "integration-test-secret");
        }

        // Inherit environment so the server sees DATABASE_URL
        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self {
            port,
            base_url,
            child: Mutex::new(child),
        })
    }

    /// Kill the server process and reap it. Safe to call more than once.
    pub fn stop(&self) {
        let mut child = match self.child.lock() {
            Ok(child) => child,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Ok(None) = child.try_wait() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }

    pub async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Start the shared server, or `None` when no database is configured for this run.
pub async fn ensure_server() -> Result<Option<&'static TestServer>> {
    if !database_configured() {
        return Ok(None);
    }

    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(15)).await?;
    Ok(Some(server))
}

/// Whether `DATABASE_URL` is set, after loading `.env`.
pub fn database_configured() -> bool {
    let _ = dotenvy::dotenv();
    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("DATABASE_URL is not set; skipping integration test");
        return false;
    }
    true
}

/// Skip the current test when no database is configured.
macro_rules! server_or_skip {
    () => {
        match common::ensure_server().await? {
            Some(server) => server,
            None => return Ok(()),
        }
    };
}

pub fn unique_name(prefix: &str) -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    format!("{}_{}", prefix, &id[..12])
}

/// A freshly signed-up account and its bearer token.
pub struct Session {
    pub server: &'static TestServer,
    pub client: reqwest::Client,
    pub token: String,
    pub user: Value,
    pub password: String,
}

impl Session {
    pub async fn signup(server: &'static TestServer) -> Result<Self> {
        let client = reqwest::Client::new();
        let username = unique_name("user");
        let password = unique_name("pw");

        let res = client
            .post(server.url("/auth/signup"))
            .json(&json!({
                "username": username,
                "email": format!("{}@example.com", username),
                "password": password,
            }))
            .send()
            .await?;
        let (status, body) = read(res).await?;
        anyhow::ensure!(status == StatusCode::OK, "signup failed: {} {}", status, body);

        Ok(Self {
            server,
            client,
            token: body["results"]["jwt"].as_str().unwrap_or_default().to_string(),
            user: body["results"]["user"].clone(),
            password,
        })
    }

    pub fn user_id(&self) -> i64 {
        self.user["user_id"].as_i64().unwrap_or_default()
    }

    pub fn username(&self) -> &str {
        self.user["username"].as_str().unwrap_or_default()
    }

    pub async fn get(&self, path: &str) -> Result<(StatusCode, Value)> {
        let res = self.client.get(self.server.url(path)).bearer_auth(&self.token).send().await?;
        read(res).await
    }

    pub async fn post(&self, path: &str, body: Value) -> Result<(StatusCode, Value)> {
        let res = self
            .client
            .post(self.server.url(path))
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;
        read(res).await
    }

    pub async fn put(&self, path: &str, body: Value) -> Result<(StatusCode, Value)> {
        let res = self
            .client
            .put(self.server.url(path))
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;
        read(res).await
    }

    pub async fn delete(&self, path: &str) -> Result<(StatusCode, Value)> {
        let res = self.client.delete(self.server.url(path)).bearer_auth(&self.token).send().await?;
        read(res).await
    }
}

pub async fn read(res: Response) -> Result<(StatusCode, Value)> {
    let status = res.status();
    let body = res.json::<Value>().await.context("response body is not JSON")?;
    Ok((status, body))
}

pub fn error_type(body: &Value) -> &str {
    body["errorType"].as_str().unwrap_or_default()
}
