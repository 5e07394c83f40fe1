//! Request handlers.

use async_trait::async_trait;
use log::debug;

use crate::parser::{Method, Request};
use crate::server::error::Error;
use crate::server::response::Response;
use crate::server::status::{StatusLine, HTTP_1_1};

/// Handles requests, one hook per HTTP method.
///
/// Override the hooks you serve; everything else falls through to
/// [`on_unsupported_method`](Handler::on_unsupported_method), which answers
/// `405`. A hook is expected to flush the response before returning. If it
/// returns `Ok` without flushing, the connection closes with nothing sent;
/// if it returns `Err` before flushing, the server answers `500`.
#[async_trait]
pub trait Handler: Send + Sync + 'static {
    async fn on_get(&self, request: Request, response: &mut Response) -> Result<(), Error> {
        self.on_unsupported_method(request, response).await
    }

    async fn on_post(&self, request: Request, response: &mut Response) -> Result<(), Error> {
        self.on_unsupported_method(request, response).await
    }

    async fn on_put(&self, request: Request, response: &mut Response) -> Result<(), Error> {
        self.on_unsupported_method(request, response).await
    }

    async fn on_delete(&self, request: Request, response: &mut Response) -> Result<(), Error> {
        self.on_unsupported_method(request, response).await
    }

    async fn on_head(&self, request: Request, response: &mut Response) -> Result<(), Error> {
        self.on_unsupported_method(request, response).await
    }

    async fn on_options(&self, request: Request, response: &mut Response) -> Result<(), Error> {
        self.on_unsupported_method(request, response).await
    }

    async fn on_trace(&self, request: Request, response: &mut Response) -> Result<(), Error> {
        self.on_unsupported_method(request, response).await
    }

    /// Called for methods without a hook of their own, known or not.
    async fn on_unsupported_method(
        &self,
        request: Request,
        response: &mut Response,
    ) -> Result<(), Error> {
        debug!("No handler for {}", request.request_line());
        response.set_status_line(StatusLine::new(HTTP_1_1, 405, "Method not allowed."))?;
        response.flush().await
    }
}

/// Route a request to the hook for its method, matched case-insensitively.
pub async fn dispatch(
    handler: &dyn Handler,
    request: Request,
    response: &mut Response,
) -> Result<(), Error> {
    match request.request_line().known_method() {
        Some(Method::GET) => handler.on_get(request, response).await,
        Some(Method::POST) => handler.on_post(request, response).await,
        Some(Method::PUT) => handler.on_put(request, response).await,
        Some(Method::DELETE) => handler.on_delete(request, response).await,
        Some(Method::HEAD) => handler.on_head(request, response).await,
        Some(Method::OPTIONS) => handler.on_options(request, response).await,
        Some(Method::TRACE) => handler.on_trace(request, response).await,
        None => handler.on_unsupported_method(request, response).await,
    }
}
