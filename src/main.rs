//! Profile Card server binary.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method};
use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use profile_card::adapters::ai::{GeminiConfig, GeminiProvider, OpenAIConfig, OpenAIProvider};
use profile_card::adapters::export::{HtmlCardRenderer, WkhtmltopdfRenderer};
use profile_card::adapters::http::{card_router, CardAppState};
use profile_card::adapters::profile::{LlmProfileInference, LlmProfileTranslator};
use profile_card::application::{ExportService, FlowController};
use profile_card::config::{AiConfig, AiProvider, AppConfig, ServerConfig};
use profile_card::ports::{AIError, AIProvider, DocumentRenderer};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config.server);
    config.validate()?;

    let provider = build_provider(&config.ai)?;
    let info = provider.provider_info();
    tracing::info!(provider = %info.name, model = %info.model, "ai provider ready");

    let flow = Arc::new(FlowController::new(
        Arc::new(LlmProfileInference::new(Arc::clone(&provider))),
        Arc::new(LlmProfileTranslator::new(provider)),
    ));

    let mut pdf = WkhtmltopdfRenderer::new();
    if let Some(path) = &config.export.renderer_path {
        pdf = pdf.with_binary_path(path);
    }
    if !pdf.is_available().await {
        tracing::warn!("wkhtmltopdf not found, PDF export will fail until it is installed");
    }
    let exports = Arc::new(
        ExportService::new(Arc::new(HtmlCardRenderer::new()), Arc::new(pdf))
            .with_options(config.export.document_options())
            .with_file_prefix(&config.export.file_prefix),
    );

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .merge(card_router(CardAppState::new(flow, exports)))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(config.server.body_limit_bytes))
        .layer(TimeoutLayer::new(config.server.request_timeout()))
        .layer(cors_layer(&config.server))
        .layer(TraceLayer::new_for_http());

    let addr = config.server.socket_addr()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, environment = ?config.server.environment, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown_signal())
        .await?;

    tracing::info!("shut down");
    Ok(())
}

fn build_provider(config: &AiConfig) -> Result<Arc<dyn AIProvider>, AIError> {
    let api_key = config.api_key().unwrap_or_default();
    let provider: Arc<dyn AIProvider> = match config.provider {
        AiProvider::Gemini => {
            let mut gemini = GeminiConfig::new(api_key).with_timeout(config.timeout());
            if let Some(model) = &config.model {
                gemini = gemini.with_model(model);
            }
            if let Some(url) = &config.base_url {
                gemini = gemini.with_base_url(url);
            }
            Arc::new(GeminiProvider::new(gemini)?)
        }
        AiProvider::OpenAI => {
            let mut openai = OpenAIConfig::new(api_key).with_timeout(config.timeout());
            if let Some(model) = &config.model {
                openai = openai.with_model(model);
            }
            if let Some(url) = &config.base_url {
                openai = openai.with_base_url(url);
            }
            Arc::new(OpenAIProvider::new(openai)?)
        }
    };
    Ok(provider)
}

fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = server
        .cors_origins_list()
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH])
        .allow_headers(Any);
    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(origins)
    }
}

fn init_tracing(server: &ServerConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&server.log_level));
    if server.is_production() {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
            (Ok(mut sigterm), Ok(mut sigint)) => {
                tokio::select! {
                    _ = sigterm.recv() => {}
                    _ = sigint.recv() => {}
                }
            }
            _ => {
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
