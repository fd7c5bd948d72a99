#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;

static SERVER: OnceLock<TestServer> = OnceLock::new();

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        // Spawn the already-built binary to keep start fast during tests
        // Assumes debug profile; adjust if you run tests with --release
        let mut cmd = Command::new("target/debug/ladle-api");
        cmd.env("LADLE_API_PORT", port.to_string())
            // Storage credentials so presign requests succeed against the
            // signer (signing is offline; no bucket is contacted)
            .env("STORAGE_BUCKET", "ladle-test")
            .env("STORAGE_ENDPOINT", "https://test.r2.cloudflarestorage.com")
            .env("STORAGE_ACCESS_KEY_ID", "AKIDTEST")
            .env("STORAGE_SECRET_ACCESS_KEY", "secretTEST")
            .env("STORAGE_PUBLIC_DOMAIN", "media.ladle.test")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        // Inherit environment so the server sees DATABASE_URL from .env
        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self {
            port,
            base_url,
            child,
        })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                // Ready on any non-404 response
                if resp.status() == StatusCode::OK
                    || resp.status() == StatusCode::SERVICE_UNAVAILABLE
                {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!(
            "server did not become ready on {} within {:?}",
            self.base_url,
            timeout
        )
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// Register a fresh user and return their bearer token.
pub async fn sign_up(client: &reqwest::Client, base_url: &str, name: &str) -> Result<String> {
    let email = format!("{}-{}@test.ladle", name, uuid_suffix());
    let resp = client
        .post(format!("{}/api/auth/sign-up", base_url))
        .json(&serde_json::json!({
            "name": name,
            "email": email,
            "password": "correct-horse-battery",
        }))
        .send()
        .await?;
    anyhow::ensure!(resp.status() == StatusCode::CREATED, "sign-up failed: {}", resp.status());
    let body: serde_json::Value = resp.json().await?;
    Ok(body["data"]["token"].as_str().context("missing token")?.to_string())
}

/// Create a recipe as the given user and return its JSON record.
pub async fn create_recipe(
    client: &reqwest::Client,
    base_url: &str,
    token: &str,
    title: &str,
) -> Result<serde_json::Value> {
    let resp = client
        .post(format!("{}/api/recipes", base_url))
        .bearer_auth(token)
        .json(&serde_json::json!({
            "title": title,
            "ingredients": ["water", "salt"],
            "steps": ["boil", "season"],
        }))
        .send()
        .await?;
    anyhow::ensure!(resp.status() == StatusCode::CREATED, "create failed: {}", resp.status());
    let body: serde_json::Value = resp.json().await?;
    Ok(body["data"].clone())
}

fn uuid_suffix() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..8].to_string()
}
