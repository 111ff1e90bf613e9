use anyhow::{Context, Result};
use axum::http::{header, HeaderValue, Method};
use axum::Router;
use colored::Colorize;
use geniesite_model::{GeminiClient, PartSource};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::config::ServerConfig;
use crate::web::routes::{self, AppState};
use geniesite_client::GENERATE_ROUTE;

/// Web server instance
pub struct WebServer {
    config: ServerConfig,
    source: Arc<dyn PartSource>,
}

impl WebServer {
    /// Create a server backed by the configured Gemini model
    pub fn new(config: ServerConfig) -> Self {
        let source = Arc::new(GeminiClient::new(
            config.api_key.clone(),
            config.model.clone(),
            config.api_url.clone(),
        ));
        Self::with_source(config, source)
    }

    /// Create a server backed by any part source
    pub fn with_source(config: ServerConfig, source: Arc<dyn PartSource>) -> Self {
        Self { config, source }
    }

    /// Router with state and CORS applied
    pub fn router(&self) -> Result<Router> {
        let state = AppState {
            source: self.source.clone(),
            relay: self.config.relay.clone(),
            port: self.config.port(),
        };

        let cors = cors_layer(&self.config.allowed_origins)?;
        Ok(routes::create_router(state).layer(cors))
    }

    /// Start the web server
    pub async fn start(self) -> Result<()> {
        let app = self.router()?;
        let addr = self.config.bind_addr;

        println!("{} GenieSite relay listening on http://{}", "🚀".green(), addr);
        println!("   Generate endpoint: http://{}{}", addr, GENERATE_ROUTE);
        println!("   Health check:      http://{}/health", addr);
        if self.config.allows_any_origin() {
            println!("   {}", "CORS: any origin".yellow());
        } else {
            println!("   CORS origins:      {}", self.config.allowed_origins.join(", "));
        }

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .with_context(|| format!("failed to bind {}", addr))?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}

/// CORS for the configured origins; `*` allows any origin without credentials.
pub fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if origins.iter().any(|o| o == crate::config::ANY_ORIGIN) {
        return Ok(layer.allow_origin(Any));
    }

    let origins = origins
        .iter()
        .map(|o| HeaderValue::from_str(o).with_context(|| format!("invalid origin {:?}", o)))
        .collect::<Result<Vec<_>>>()?;

    Ok(layer
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_layer_rejects_invalid_origin() {
        assert!(cors_layer(&["http://ok.example".to_string()]).is_ok());
        assert!(cors_layer(&["*".to_string()]).is_ok());
        assert!(cors_layer(&["bad\norigin".to_string()]).is_err());
    }
}
