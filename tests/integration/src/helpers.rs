//! Test server lifecycle and request helpers

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use market_api::{create_app, create_app_state};
use market_common::{AppConfig, DatabaseConfig, JwtConfig};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// A server bound to an ephemeral local port
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    _handle: JoinHandle<()>,
}

impl TestServer {
    pub async fn start() -> Result<Self> {
        Self::start_with_config(test_config()?).await
    }

    pub async fn start_with_config(config: AppConfig) -> Result<Self> {
        let pool = market_db::create_pool(&market_db::PoolConfig::from(&config.database)).await?;
        let migrations = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../migrations");
        market_db::run_migrations(&pool, &migrations).await?;
        pool.close().await;

        let state = create_app_state(&config).await?;
        let app = create_app(state);

        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(Self {
            addr,
            client,
            _handle: handle,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    fn authed(builder: RequestBuilder, token: Option<&str>) -> RequestBuilder {
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> Result<Response> {
        let request = Self::authed(self.client.get(self.url(path)), token);
        Ok(request.send().await?)
    }

    pub async fn post<T: Serialize>(
        &self,
        path: &str,
        token: Option<&str>,
        body: &T,
    ) -> Result<Response> {
        let request = Self::authed(self.client.post(self.url(path)), token).json(body);
        Ok(request.send().await?)
    }

    pub async fn patch<T: Serialize>(&self, path: &str, token: &str, body: &T) -> Result<Response> {
        let request = Self::authed(self.client.patch(self.url(path)), Some(token)).json(body);
        Ok(request.send().await?)
    }

    pub async fn delete(&self, path: &str, token: &str) -> Result<Response> {
        let request = Self::authed(self.client.delete(self.url(path)), Some(token));
        Ok(request.send().await?)
    }
}

/// PostgreSQL-backed configuration with local image storage under a temp dir
pub fn test_config() -> Result<AppConfig> {
    let url = std::env::var("DATABASE_URL")?;
    let upload_dir = std::env::temp_dir().join("market-integration-uploads");

    let mut config = AppConfig {
        app: market_common::AppSettings::default(),
        api: market_common::ServerConfig::default(),
        database: DatabaseConfig {
            url,
            run_migrations: false,
            ..DatabaseConfig::default()
        },
        jwt: JwtConfig {
            secret: "integration-test-secret".to_string(),
            access_token_expiry: 900,
            refresh_token_expiry: 604_800,
        },
        rate_limit: market_common::RateLimitConfig::default(),
        cors: market_common::CorsConfig::default(),
        storage: market_common::StorageConfig::default(),
        snowflake: market_common::SnowflakeConfig::default(),
    };
    config.storage.upload_dir = upload_dir.to_string_lossy().into_owned();
    config.validate()?;
    Ok(config)
}

/// False (with a notice) when no database is configured
pub fn check_test_env() -> bool {
    dotenvy::dotenv().ok();
    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("Skipping test: DATABASE_URL not set");
        return false;
    }
    true
}

/// Check the status, then parse the `data` envelope
pub async fn assert_data<T: DeserializeOwned>(response: Response, expected: StatusCode) -> Result<T> {
    let envelope: crate::fixtures::Envelope<T> = assert_json(response, expected).await?;
    Ok(envelope.data)
}

/// Check the status, then parse the whole body
pub async fn assert_json<T: DeserializeOwned>(response: Response, expected: StatusCode) -> Result<T> {
    let status = response.status();
    if status != expected {
        let body = response.text().await?;
        anyhow::bail!("Expected status {expected}, got {status}. Body: {body}");
    }
    Ok(response.json().await?)
}

/// Check the status and return the error code, if any
pub async fn assert_error(response: Response, expected: StatusCode) -> Result<String> {
    let body: serde_json::Value = assert_json(response, expected).await?;
    Ok(body["error"]["code"].as_str().unwrap_or_default().to_string())
}

pub async fn assert_status(response: Response, expected: StatusCode) -> Result<()> {
    let status = response.status();
    if status != expected {
        let body = response.text().await?;
        anyhow::bail!("Expected status {expected}, got {status}. Body: {body}");
    }
    Ok(())
}
