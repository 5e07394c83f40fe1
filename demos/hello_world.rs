//! A hello world server.
//!
//! Run with `cargo run --example hello_world -- --port 8080`.

use std::sync::Arc;

use async_trait::async_trait;
use casual_http::{
    Handler, HttpServer, Request, Response, ServerConfig, ServerError, Spawn, StatusCode,
};
use clap::Parser;
use log::{error, info};

const BASIC_CONTENT: &str = "<html><head></head><body><h1>yo!</h1></body></html>";

struct HelloWorld;

#[async_trait]
impl Handler for HelloWorld {
    async fn on_get(&self, request: Request, response: &mut Response) -> Result<(), ServerError> {
        info!("{} from {:?}", request.request_line(), request.first_header_value("user-agent"));

        response.set_status_line(StatusCode::Ok)?;
        response.add_header("Content-Type", "text/html; charset=utf-8")?;
        response.set_body_bytes(BASIC_CONTENT)?;
        response.flush().await
    }
}

#[derive(Parser)]
#[command(name = "hello_world")]
#[command(about = "Answer every GET with a small HTML page", long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize the logger
    env_logger::init();

    let port = Args::parse().port;
    let server = Arc::new(HttpServer::new(ServerConfig::for_port(port), HelloWorld, Spawn));

    // Stop accepting on Ctrl+C
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

    info!("Hello world server starting on port {port}");
    server.start().await?;
    Ok(())
}
