//! Server configuration.

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// The address to bind to.
    pub addr: SocketAddr,
    /// Socket options applied to every accepted connection.
    pub socket: SocketConfig,
}

impl ServerConfig {
    /// Listen on `port` on all interfaces.
    pub fn for_port(port: u16) -> Self {
        Self {
            addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)),
            socket: SocketConfig::default(),
        }
    }

    pub fn with_socket(mut self, socket: SocketConfig) -> Self {
        self.socket = socket;
        self
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 8080)),
            socket: SocketConfig::default(),
        }
    }
}

/// Socket option overrides.
///
/// Every field is optional; an unset field keeps whatever the platform
/// gives a freshly accepted connection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SocketConfig {
    pub keep_alive: Option<bool>,
    /// Read/write timeout in milliseconds. Zero disables the timeout.
    pub socket_timeout_millis: Option<u64>,
    pub receive_buffer_size: Option<usize>,
    pub send_buffer_size: Option<usize>,
    pub tcp_no_delay: Option<bool>,
}

impl SocketConfig {
    pub fn builder() -> SocketConfigBuilder {
        SocketConfigBuilder::default()
    }

    /// Load overrides from a JSON object such as
    /// `{"tcpNoDelay": true, "socketTimeoutMillis": 5000}`.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Whether no option is overridden.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// The timeout override, with zero meaning "no timeout".
    pub fn socket_timeout(&self) -> Option<Option<Duration>> {
        self.socket_timeout_millis
            .map(|millis| (millis > 0).then(|| Duration::from_millis(millis)))
    }
}

/// Builder for [`SocketConfig`].
#[derive(Debug, Clone, Default)]
pub struct SocketConfigBuilder {
    config: SocketConfig,
}

impl SocketConfigBuilder {
    pub fn keep_alive(mut self, keep_alive: bool) -> Self {
        self.config.keep_alive = Some(keep_alive);
        self
    }

    pub fn socket_timeout(mut self, timeout: Duration) -> Self {
        self.config.socket_timeout_millis = Some(timeout.as_millis() as u64);
        self
    }

    pub fn receive_buffer_size(mut self, size: usize) -> Self {
        self.config.receive_buffer_size = Some(size);
        self
    }

    pub fn send_buffer_size(mut self, size: usize) -> Self {
        self.config.send_buffer_size = Some(size);
        self
    }

    pub fn tcp_no_delay(mut self, no_delay: bool) -> Self {
        self.config.tcp_no_delay = Some(no_delay);
        self
    }

    pub fn build(self) -> SocketConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.addr, "127.0.0.1:8080".parse().unwrap());
        assert!(config.socket.is_empty());

        let config = ServerConfig::for_port(9000);
        assert_eq!(config.addr, "0.0.0.0:9000".parse().unwrap());
    }

    #[test]
    fn test_builder() {
        let socket = SocketConfig::builder()
            .tcp_no_delay(true)
            .socket_timeout(Duration::from_secs(2))
            .build();

        assert_eq!(socket.tcp_no_delay, Some(true));
        assert_eq!(socket.socket_timeout_millis, Some(2000));
        assert_eq!(socket.socket_timeout(), Some(Some(Duration::from_secs(2))));
        assert_eq!(socket.keep_alive, None);
        assert!(!socket.is_empty());
    }

    #[test]
    fn test_zero_timeout_means_none() {
        let socket = SocketConfig {
            socket_timeout_millis: Some(0),
            ..SocketConfig::default()
        };
        assert_eq!(socket.socket_timeout(), Some(None));
        assert_eq!(SocketConfig::default().socket_timeout(), None);
    }

    #[test]
    fn test_from_json() {
        let json = r#"{"keepAlive": false, "sendBufferSize": 65536}"#;
        let socket = SocketConfig::from_json_str(json).unwrap();
        assert_eq!(socket.keep_alive, Some(false));
        assert_eq!(socket.send_buffer_size, Some(65536));
        assert_eq!(socket.receive_buffer_size, None);

        assert!(SocketConfig::from_json_str(r#"{"keepalive": true}"#).is_err());
    }
}
