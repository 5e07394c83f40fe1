//! HTTP server implementation.

use std::any::Any;
use std::net::SocketAddr;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, PoisonError};

use futures::FutureExt;
use log::{debug, error, info, warn};
use tokio::io::{AsyncRead, AsyncWrite, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;

use crate::parser::read_request;
use crate::server::config::ServerConfig;
use crate::server::deadline::Deadline;
use crate::server::error::Error;
use crate::server::executor::{Executor, Work};
use crate::server::handler::{dispatch, Handler};
use crate::server::response::Response;
use crate::server::socket::SocketConfigResolver;
use crate::server::status::StatusCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Created,
    Listening,
    Stopped,
}

/// An HTTP server.
///
/// Accepts connections, tunes them, and hands each one to the executor as a
/// unit of work that reads one request, dispatches it to the handler, and
/// closes the connection. A server runs once: after [`stop`](Self::stop) it
/// cannot be started again.
pub struct HttpServer {
    config: ServerConfig,
    handler: Arc<dyn Handler>,
    executor: Arc<dyn Executor>,
    resolver: Arc<SocketConfigResolver>,
    state: Mutex<State>,
    shutdown: watch::Sender<bool>,
}

impl HttpServer {
    pub fn new(config: ServerConfig, handler: impl Handler, executor: impl Executor) -> Self {
        let resolver = SocketConfigResolver::new(config.socket.clone());
        let (shutdown, _) = watch::channel(false);

        Self {
            config,
            handler: Arc::new(handler),
            executor: Arc::new(executor),
            resolver: Arc::new(resolver),
            state: Mutex::new(State::Created),
            shutdown,
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn socket_resolver(&self) -> &SocketConfigResolver {
        &self.resolver
    }

    pub fn is_listening(&self) -> bool {
        *self.lock_state() == State::Listening
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_created(&self) -> Result<(), Error> {
        match *self.lock_state() {
            State::Created => Ok(()),
            _ => Err(Error::AlreadyStarted),
        }
    }

    /// Bind the listening socket on the configured address.
    pub async fn bind(&self) -> Result<TcpListener, Error> {
        let addr = self.config.addr;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| Error::Bind { addr, source })?;
        info!("Server listening on http://{addr}", addr = listener.local_addr()?);
        Ok(listener)
    }

    /// Bind and run the accept loop until [`stop`](Self::stop) is called.
    pub async fn start(&self) -> Result<(), Error> {
        self.ensure_created()?;
        let listener = self.bind().await?;
        self.serve(listener).await
    }

    /// Run the accept loop on an already bound listener until
    /// [`stop`](Self::stop) is called. The listener is closed on return.
    pub async fn serve(&self, listener: TcpListener) -> Result<(), Error> {
        {
            let mut state = self.lock_state();
            if *state != State::Created {
                return Err(Error::AlreadyStarted);
            }
            *state = State::Listening;
        }

        let mut shutdown = self.shutdown.subscribe();
        let mut unfinished = None;

        loop {
            let stopped = *shutdown.borrow_and_update();
            if stopped {
                break;
            }

            tokio::select! {
                _ = shutdown.changed() => {}

                accepted = listener.accept() => {
                    match accepted {
                        Ok((stream, peer)) => {
                            let Some(work) = self.connection_work(stream, peer) else {
                                continue;
                            };
                            let mut submit = self.executor.submit(work);

                            // A saturated executor must not hold off stop().
                            tokio::select! {
                                _ = &mut submit => {}
                                _ = shutdown.changed() => {
                                    if self.executor.abandon_on_stop() {
                                        warn!("Stopped before {peer} was handed off; dropping it");
                                    } else {
                                        unfinished = Some(submit);
                                    }
                                    break;
                                }
                            }
                        }
                        Err(e) => {
                            error!("Error accepting connection: {e}");
                            tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
                        }
                    }
                }
            }
        }

        info!("Shutting down server...");
        *self.lock_state() = State::Stopped;
        drop(listener);

        if let Some(submit) = unfinished {
            debug!("Finishing the connection in progress");
            submit.await;
        }
        info!("Server stopped");
        Ok(())
    }

    /// Tune an accepted connection and wrap it up as a unit of work.
    fn connection_work(&self, stream: TcpStream, peer: SocketAddr) -> Option<Work> {
        debug!("Accepted connection from {peer}");
        let settings = match self.resolver.configure(&stream) {
            Ok(settings) => settings,
            Err(e) => {
                warn!("Dropping connection from {peer}, socket options not applied: {e}");
                return None;
            }
        };

        let stream = Deadline::new(stream, settings.socket_timeout);
        Some(Box::pin(handle_connection(stream, self.handler.clone())))
    }

    /// Stop accepting connections. Connections already handed to the
    /// executor run to completion. One still waiting for a full executor is
    /// dropped, unless the executor runs work inside `submit`.
    pub fn stop(&self) {
        *self.lock_state() = State::Stopped;
        self.shutdown.send_replace(true);
    }
}

/// Serve one request on a connection, then close it.
///
/// Errors and handler panics end the connection. If nothing was written yet
/// the client gets a bare `500 Internal Server Error` first.
pub async fn handle_connection<S>(stream: S, handler: Arc<dyn Handler>)
where
    S: AsyncRead + AsyncWrite + Send + Sync + Unpin + 'static,
{
    let (input, output) = tokio::io::split(stream);
    let mut response = Response::new(output);

    let outcome = AssertUnwindSafe(serve_request(input, handler.as_ref(), &mut response))
        .catch_unwind()
        .await
        .unwrap_or_else(|payload| Err(Error::Panic(panic_message(payload.as_ref()))));

    if let Err(e) = outcome {
        if !response.is_flushed() {
            if let Err(flush_err) = send_internal_error(&mut response).await {
                warn!("Failed to send error response: {flush_err}");
            }
        }
        if e.is_state_violation() {
            error!("Handler misused the response: {e}");
        } else {
            error!("Error handling connection: {e}");
        }
    }

    if let Err(e) = response.close().await {
        debug!("Error closing connection: {e}");
    }
}

async fn serve_request<R>(
    input: R,
    handler: &dyn Handler,
    response: &mut Response,
) -> Result<(), Error>
where
    R: AsyncRead + Send + Sync + Unpin + 'static,
{
    let request = read_request(BufReader::new(input)).await?;
    debug!("Dispatching {}", request.request_line());
    dispatch(handler, request, response).await
}

async fn send_internal_error(response: &mut Response) -> Result<(), Error> {
    response.set_status_line(StatusCode::InternalServerError)?;
    response.clear_all_headers()?;
    response.set_body(None)?;
    response.flush().await
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
