//! Server start-up helpers
//!
//! Tracing goes to stderr because stdout carries the MCP protocol.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing for an MCP server binary
///
/// The crate named by `crate_name` logs at `info` unless `RUST_LOG` says
/// otherwise. `LOG_FORMAT=json` switches to one JSON object per line.
///
/// ```rust,ignore
/// mcp_common::init_tracing("retro_mcp")?;
/// ```
pub fn init_tracing(crate_name: &str) -> anyhow::Result<()> {
    let directive = format!("{}=info", crate_name);
    let filter = EnvFilter::from_default_env().add_directive(directive.parse()?);

    let registry = tracing_subscriber::registry().with(filter);

    if json_requested(std::env::var("LOG_FORMAT").ok().as_deref()) {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(false),
            )
            .try_init()?;
    }

    Ok(())
}

fn json_requested(log_format: Option<&str>) -> bool {
    log_format.is_some_and(|v| v.trim().eq_ignore_ascii_case("json"))
}

/// Generate a `#[tokio::main]` entry point that serves a tool server over stdio
///
/// `$constructor` is a path to a function returning `Result<Server, E>`
/// where `E` converts into `anyhow::Error`. Construction errors (bad
/// config, missing credentials) abort start-up before the transport opens.
///
/// ```rust,ignore
/// mcp_common::serve_stdio!(RetroMcpServer::from_env, "retro_mcp");
/// ```
#[macro_export]
macro_rules! serve_stdio {
    ($constructor:path, $crate_name:expr) => {
        #[tokio::main]
        async fn main() -> anyhow::Result<()> {
            use rmcp::ServiceExt;

            $crate::init_tracing($crate_name)?;

            tracing::info!(concat!("Starting ", $crate_name, " MCP server"));

            let server = $constructor()?;
            let service = server.serve(rmcp::transport::stdio()).await?;

            tracing::info!("Server running, waiting for requests...");

            service.waiting().await?;

            tracing::info!("Server shutting down");
            Ok(())
        }
    };
}
