// Server module entry point
// Binds the listener and serves files until Ctrl+C

pub mod connection;
pub mod handler;
pub mod listener;

use std::sync::Arc;

use crate::config::Config;
use crate::logger;

pub use listener::create_reusable_listener;

/// Accept connections until a shutdown signal arrives
///
/// Connections already accepted keep running on their own tasks.
pub async fn run(config: Config) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let addr = config.get_socket_addr()?;
    let listener = create_reusable_listener(addr)?;
    logger::log_server_start(&addr, &config);

    let config = Arc::new(config);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        connection::handle_connection(stream, peer_addr, Arc::clone(&config));
                    }
                    Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                }
            }
            _ = &mut shutdown => {
                logger::log_shutdown();
                return Ok(());
            }
        }
    }
}
