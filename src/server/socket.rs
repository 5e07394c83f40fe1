//! Per-connection socket tuning.
//!
//! The first accepted connection is sampled for the platform's defaults, the
//! configured overrides are laid over them, and the merged settings are
//! cached for the life of the server. Every connection, the first included,
//! then gets the overridden options applied without being sampled again.

use std::io;
use std::sync::{Mutex, OnceLock, PoisonError};
use std::time::Duration;

use log::debug;
use socket2::SockRef;
use tokio::net::TcpStream;

use crate::server::config::SocketConfig;

/// Socket options in effect for a connection, with nothing left unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedSocketSettings {
    pub keep_alive: bool,
    /// `None` means reads and writes never time out.
    pub socket_timeout: Option<Duration>,
    pub receive_buffer_size: usize,
    pub send_buffer_size: usize,
    pub tcp_no_delay: bool,
}

impl ResolvedSocketSettings {
    /// Read the current option values off a socket.
    ///
    /// Async sockets carry no kernel read timeout, so the sampled timeout is
    /// always `None`.
    pub fn sample<S: TunableSocket + ?Sized>(socket: &S) -> io::Result<Self> {
        Ok(Self {
            keep_alive: socket.keep_alive()?,
            socket_timeout: None,
            receive_buffer_size: socket.receive_buffer_size()?,
            send_buffer_size: socket.send_buffer_size()?,
            tcp_no_delay: socket.tcp_no_delay()?,
        })
    }

    /// Replace every field the overrides set.
    pub fn overlay(mut self, overrides: &SocketConfig) -> Self {
        if let Some(keep_alive) = overrides.keep_alive {
            self.keep_alive = keep_alive;
        }
        if let Some(timeout) = overrides.socket_timeout() {
            self.socket_timeout = timeout;
        }
        if let Some(size) = overrides.receive_buffer_size {
            self.receive_buffer_size = size;
        }
        if let Some(size) = overrides.send_buffer_size {
            self.send_buffer_size = size;
        }
        if let Some(no_delay) = overrides.tcp_no_delay {
            self.tcp_no_delay = no_delay;
        }
        self
    }
}

/// A connection whose socket options can be read and written.
pub trait TunableSocket {
    fn keep_alive(&self) -> io::Result<bool>;
    fn set_keep_alive(&self, keep_alive: bool) -> io::Result<()>;
    fn receive_buffer_size(&self) -> io::Result<usize>;
    fn set_receive_buffer_size(&self, size: usize) -> io::Result<()>;
    fn send_buffer_size(&self) -> io::Result<usize>;
    fn set_send_buffer_size(&self, size: usize) -> io::Result<()>;
    fn tcp_no_delay(&self) -> io::Result<bool>;
    fn set_tcp_no_delay(&self, no_delay: bool) -> io::Result<()>;
}

impl TunableSocket for TcpStream {
    fn keep_alive(&self) -> io::Result<bool> {
        SockRef::from(self).keepalive()
    }

    fn set_keep_alive(&self, keep_alive: bool) -> io::Result<()> {
        SockRef::from(self).set_keepalive(keep_alive)
    }

    fn receive_buffer_size(&self) -> io::Result<usize> {
        SockRef::from(self).recv_buffer_size()
    }

    fn set_receive_buffer_size(&self, size: usize) -> io::Result<()> {
        SockRef::from(self).set_recv_buffer_size(size)
    }

    fn send_buffer_size(&self) -> io::Result<usize> {
        SockRef::from(self).send_buffer_size()
    }

    fn set_send_buffer_size(&self, size: usize) -> io::Result<()> {
        SockRef::from(self).set_send_buffer_size(size)
    }

    fn tcp_no_delay(&self) -> io::Result<bool> {
        self.nodelay()
    }

    fn set_tcp_no_delay(&self, no_delay: bool) -> io::Result<()> {
        self.set_nodelay(no_delay)
    }
}

/// Resolves and applies socket settings for accepted connections.
#[derive(Debug, Default)]
pub struct SocketConfigResolver {
    overrides: SocketConfig,
    resolved: OnceLock<ResolvedSocketSettings>,
    init: Mutex<()>,
}

impl SocketConfigResolver {
    pub fn new(overrides: SocketConfig) -> Self {
        Self {
            overrides,
            resolved: OnceLock::new(),
            init: Mutex::new(()),
        }
    }

    pub fn overrides(&self) -> &SocketConfig {
        &self.overrides
    }

    /// The cached settings, once a connection has been resolved.
    pub fn resolved(&self) -> Option<ResolvedSocketSettings> {
        self.resolved.get().copied()
    }

    /// Tune `socket` and return the resolved settings.
    ///
    /// Only overridden options are written. Options left unset keep whatever
    /// the socket came with, which is normally the platform default the cache
    /// was sampled from. The return value is therefore the resolved intent,
    /// not a read-back: an unset option on a socket that started out
    /// differently from the sampled one is reported as sampled but left
    /// alone. A failure here concerns this socket alone and leaves the cache
    /// as it was.
    pub fn configure<S: TunableSocket + ?Sized>(
        &self,
        socket: &S,
    ) -> io::Result<ResolvedSocketSettings> {
        let settings = self.resolve(socket)?;

        if self.overrides.keep_alive.is_some() {
            socket.set_keep_alive(settings.keep_alive)?;
        }
        if self.overrides.receive_buffer_size.is_some() {
            socket.set_receive_buffer_size(settings.receive_buffer_size)?;
        }
        if self.overrides.send_buffer_size.is_some() {
            socket.set_send_buffer_size(settings.send_buffer_size)?;
        }
        if self.overrides.tcp_no_delay.is_some() {
            socket.set_tcp_no_delay(settings.tcp_no_delay)?;
        }

        Ok(settings)
    }

    fn resolve<S: TunableSocket + ?Sized>(
        &self,
        socket: &S,
    ) -> io::Result<ResolvedSocketSettings> {
        if let Some(settings) = self.resolved.get() {
            return Ok(*settings);
        }

        // Concurrent first connections wait here for whoever samples first.
        let _guard = self.init.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(settings) = self.resolved.get() {
            return Ok(*settings);
        }

        let settings = ResolvedSocketSettings::sample(socket)?.overlay(&self.overrides);
        debug!("Resolved socket settings: {settings:?}");
        Ok(*self.resolved.get_or_init(|| settings))
    }
}
