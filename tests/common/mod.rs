//! Test helpers for ipu-bridge integration tests.
//!
//! Spawns the real application on a random port against a wiremock server
//! standing in for the examination portal.

#![allow(dead_code)]

use ipu_bridge::config::{Config, PortalConfig, ServerConfig, SessionConfig};
use ipu_bridge::services::metrics::init_metrics;
use ipu_bridge::startup::Application;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A minimal PNG header, enough to stand in for a captcha image.
pub const FAKE_CAPTCHA_PNG: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub portal: MockServer,
}

impl TestApp {
    /// Spawn the bridge with the default 30-minute session TTL.
    pub async fn spawn() -> Self {
        Self::spawn_with_ttl(30).await
    }

    /// Spawn the bridge with a custom session TTL (0 = sessions expire
    /// immediately, for exercising the local liveness check).
    pub async fn spawn_with_ttl(ttl_minutes: i64) -> Self {
        let portal = MockServer::start().await;

        init_metrics();

        let config = Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0, // Random port
            },
            portal: PortalConfig {
                base_url: portal.uri(),
                user_agent: "ipu-bridge-test".to_string(),
                request_timeout_secs: 5,
            },
            session: SessionConfig { ttl_minutes },
            service_name: "ipu-bridge-test".to_string(),
        };

        let app = Application::build(config)
            .await
            .expect("Failed to build test application");
        let port = app.port();

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the HTTP server to be ready by polling the health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("http://127.0.0.1:{}/health", port);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        }

        Self {
            address: format!("http://127.0.0.1:{}", port),
            port,
            portal,
        }
    }

    pub fn client(&self) -> reqwest::Client {
        reqwest::Client::new()
    }
}

/// Mount a captcha servlet mock minting the given session token.
pub async fn mount_captcha(portal: &MockServer, token: &str) {
    Mock::given(method("GET"))
        .and(path("/CaptchaServlet"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header(
                    "set-cookie",
                    format!("JSESSIONID={}; Path=/; HttpOnly", token).as_str(),
                )
                .set_body_bytes(FAKE_CAPTCHA_PNG.to_vec()),
        )
        .mount(portal)
        .await;
}

/// Run the captcha step so the bridge tracks a session for `token`.
pub async fn establish_session(app: &TestApp, token: &str) {
    mount_captcha(&app.portal, token).await;

    let response = app
        .client()
        .get(format!("{}/captcha", app.address))
        .send()
        .await
        .expect("Failed to execute captcha request");
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["sessionId"], token);
}
