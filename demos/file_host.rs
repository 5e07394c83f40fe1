//! Serves files from a directory.
//!
//! Run with `cargo run --example file_host -- --root ./public --port 8080`.
//! Optional socket overrides can be given as JSON with `--socket-config`,
//! for example `'{"tcpNoDelay": true, "socketTimeoutMillis": 10000}'`.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use casual_http::toolkit::{resolve_path, serve_file};
use casual_http::{
    Handler, HttpServer, Request, Response, ServerConfig, ServerError, SocketConfig, StatusLine,
    WorkerPool,
};
use clap::Parser;
use log::{error, info};

struct FileHost {
    root: PathBuf,
}

#[async_trait]
impl Handler for FileHost {
    async fn on_get(&self, request: Request, response: &mut Response) -> Result<(), ServerError> {
        match resolve_path(&self.root, request.request_line().uri()) {
            Some(path) => serve_file(path, response).await,
            None => {
                response.set_status_line(StatusLine::new("HTTP/1.1", 404, "No such resource"))?;
                response.flush().await
            }
        }
    }
}

#[derive(Parser)]
#[command(name = "file_host")]
#[command(about = "Serve the files in a directory", long_about = None)]
struct Args {
    /// Directory to serve
    #[arg(long)]
    root: PathBuf,

    #[arg(short, long, default_value_t = 8080)]
    port: u16,

    /// Socket overrides as JSON, e.g. '{"tcpNoDelay": true}'
    #[arg(long)]
    socket_config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize the logger
    env_logger::init();

    let args = Args::parse();
    let socket = match &args.socket_config {
        Some(json) => SocketConfig::from_json_str(json)?,
        None => SocketConfig::default(),
    };
    info!("Serving files in {:?} on port {}", args.root, args.port);

    let config = ServerConfig::for_port(args.port).with_socket(socket);
    let handler = FileHost { root: args.root };
    let server = Arc::new(HttpServer::new(config, handler, WorkerPool::new(8, 64)));

    let stopper = server.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received Ctrl+C, initiating shutdown");
                stopper.stop();
            }
            Err(e) => error!("Error setting up Ctrl+C handler: {e}"),
        }
    });

    server.start().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args() {
        let args = Args::try_parse_from(["file_host", "--root", "./public"]).unwrap();
        assert_eq!(args.root, PathBuf::from("./public"));
        assert_eq!(args.port, 8080);
        assert!(args.socket_config.is_none());

        let json = r#"{"tcpNoDelay": true}"#;
        let argv = ["file_host", "--root", "/srv", "-p", "9000", "--socket-config", json];
        let args = Args::try_parse_from(argv).unwrap();
        assert_eq!(args.port, 9000);
        assert_eq!(args.socket_config.as_deref(), Some(json));

        // The root directory is required.
        assert!(Args::try_parse_from(["file_host", "--port", "80"]).is_err());
    }
}
