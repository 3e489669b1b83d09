use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use slog::{o, Drain, Logger};
use slog_async::Async;
use slog_term::{FullFormat, PlainDecorator, TermDecorator};
use std::sync::Arc;
use std::time::Instant;

use crate::tracing::current_request_id;

/// Configuration for the access logger
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub async_buffer_size: usize,
    pub use_color: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            async_buffer_size: 1024,
            use_color: true,
        }
    }
}

/// Builds the asynchronous terminal logger used for access lines.
pub fn setup_logger(config: LoggerConfig) -> Logger {
    let decorator = {
        let builder = TermDecorator::new();
        let builder = if config.use_color {
            builder.force_color()
        } else {
            builder
        };
        builder.build()
    };

    let drain = FullFormat::new(decorator).build().fuse();

    let drain = Async::new(drain)
        .chan_size(config.async_buffer_size)
        .build()
        .fuse();

    Logger::root(
        drain,
        o!("service" => env!("CARGO_PKG_NAME"), "version" => env!("CARGO_PKG_VERSION")),
    )
}

/// Logger writing plain lines into an arbitrary sink; used by tests.
pub fn plain_logger<W>(sink: W) -> Logger
where
    W: std::io::Write + Send + 'static,
{
    let decorator = PlainDecorator::new(sink);
    let drain = FullFormat::new(decorator).build().fuse();
    let drain = Async::new(drain).build().fuse();
    Logger::root(drain, o!())
}

/// State for the access-log middleware
#[derive(Clone)]
pub struct AccessLog {
    logger: Logger,
}

impl AccessLog {
    pub fn new(logger: Logger) -> Self {
        Self { logger }
    }
}

/// Writes one access line per request: method, path, status, latency.
pub async fn access_log_middleware(
    State(state): State<Arc<AccessLog>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let start_time = Instant::now();
    let method = req.method().to_string();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;
    let duration_ms = start_time.elapsed().as_millis() as u64;
    let status = response.status().as_u16();
    let request_id = current_request_id()
        .map(|id| id.as_str().to_string())
        .unwrap_or_else(|| "-".to_string());

    if status >= 500 {
        slog::error!(
            &state.logger,
            "request failed";
            "method" => method,
            "path" => path,
            "status" => status,
            "duration_ms" => duration_ms,
            "request_id" => request_id,
        );
    } else {
        slog::info!(
            &state.logger,
            "request handled";
            "method" => method,
            "path" => path,
            "status" => status,
            "duration_ms" => duration_ms,
            "request_id" => request_id,
        );
    }

    response
}
