//! Device endpoint configuration.

use std::fmt;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

/// Telnet port the PDU's management console listens on.
pub const TELNET_PORT: u16 = 23;

/// Default deadline for every individual read and write.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Where and as whom to log in to the PDU.
#[derive(Clone)]
pub struct DeviceEndpoint {
    /// Target host (hostname or IP address).
    pub host: String,

    /// TCP port (default: 23).
    pub port: u16,

    /// Console user name.
    pub username: String,

    /// Console password.
    pub password: SecretString,

    /// Per-call read/write deadline, also used for connect.
    pub timeout: Duration,
}

impl DeviceEndpoint {
    /// Create an endpoint on the telnet port with the default timeout.
    pub fn new(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port: TELNET_PORT,
            username: username.into(),
            password: SecretString::from(password.into()),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Override the TCP port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Override the per-call deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Get the socket address for connection.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub(crate) fn password(&self) -> &str {
        self.password.expose_secret()
    }
}

impl fmt::Debug for DeviceEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceEndpoint")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"********")
            .field("timeout", &self.timeout)
            .finish()
    }
}
