//! Telnet transport over a TCP stream.

use std::time::Duration;

use log::{trace, warn};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::{Instant, timeout, timeout_at};

use super::config::DeviceEndpoint;
use crate::channel::{MarkerSet, NegotiationFilter, PatternBuffer};
use crate::error::{ChannelError, Result, TransportError};

const READ_CHUNK: usize = 1024;

/// Line-oriented telnet session with per-call deadlines.
///
/// Generic over the underlying stream so sessions can be scripted in tests.
pub struct TelnetTransport<S> {
    /// The byte stream to the device.
    stream: S,

    /// Received bytes not yet consumed by a match.
    buffer: PatternBuffer,

    /// Strips telnet commands from incoming data.
    filter: NegotiationFilter,

    /// Deadline applied to each read and write call.
    timeout: Duration,
}

impl TelnetTransport<TcpStream> {
    /// Connect to the endpoint, bounded by its timeout.
    pub async fn connect(endpoint: &DeviceEndpoint) -> Result<Self> {
        let stream = timeout(
            endpoint.timeout,
            TcpStream::connect((endpoint.host.as_str(), endpoint.port)),
        )
        .await
        .map_err(|_| TransportError::Timeout(endpoint.timeout))?
        .map_err(|source| TransportError::ConnectionFailed {
            host: endpoint.host.clone(),
            port: endpoint.port,
            source,
        })?;

        Ok(Self::from_stream(stream, endpoint.timeout))
    }
}

impl<S> TelnetTransport<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Wrap an already connected stream.
    pub fn from_stream(stream: S, timeout: Duration) -> Self {
        Self {
            stream,
            buffer: PatternBuffer::default(),
            filter: NegotiationFilter::new(),
            timeout,
        }
    }

    /// Read until any marker appears, discarding everything through it.
    ///
    /// Returns the marker that matched. Bytes received after the match are
    /// kept for the next read.
    pub async fn read_until_any(&mut self, markers: &MarkerSet) -> Result<String> {
        let (index, _, end) = self.fill_until(markers).await?;
        self.buffer.consume_through(end);
        Ok(markers.markers()[index].clone())
    }

    /// Read until any marker appears and return the text before it.
    pub async fn read_until_capture(&mut self, markers: &MarkerSet) -> Result<String> {
        let (_, start, end) = self.fill_until(markers).await?;
        let captured = self.buffer.take_until(start, end);
        Ok(String::from_utf8_lossy(&captured).into_owned())
    }

    /// Write `line` terminated by CR LF.
    pub async fn write_line(&mut self, line: &str) -> Result<()> {
        let mut data = Vec::with_capacity(line.len() + 2);
        data.extend_from_slice(line.as_bytes());
        data.extend_from_slice(b"\r\n");
        self.write_raw(&data).await
    }

    /// Shut down the connection. Errors are logged, not returned.
    pub async fn close(mut self) {
        if let Err(e) = self.stream.shutdown().await {
            warn!("Error closing connection: {}", e);
        }
    }

    async fn write_raw(&mut self, data: &[u8]) -> Result<()> {
        let deadline = self.timeout;
        timeout(deadline, async {
            self.stream.write_all(data).await?;
            self.stream.flush().await
        })
        .await
        .map_err(|_| TransportError::Timeout(deadline))?
        .map_err(TransportError::Io)?;
        Ok(())
    }

    /// Read into the buffer until a marker matches, returning its position.
    async fn fill_until(&mut self, markers: &MarkerSet) -> Result<(usize, usize, usize)> {
        let deadline = Instant::now() + self.timeout;
        let mut chunk = [0u8; READ_CHUNK];

        loop {
            if let Some(found) = markers.find_marker(self.buffer.as_slice()) {
                return Ok(found);
            }

            let n = timeout_at(deadline, self.stream.read(&mut chunk))
                .await
                .map_err(|_| ChannelError::PatternTimeout {
                    timeout: self.timeout,
                    markers: markers.markers().to_vec(),
                })?
                .map_err(TransportError::Io)?;

            if n == 0 {
                return Err(ChannelError::Closed {
                    markers: markers.markers().to_vec(),
                }
                .into());
            }

            trace!("recv {:?}", String::from_utf8_lossy(&chunk[..n]));

            let mut data = Vec::with_capacity(n);
            let mut replies = Vec::new();
            self.filter.filter(&chunk[..n], &mut data, &mut replies);
            self.buffer.extend(&data);

            if !replies.is_empty() {
                self.write_raw(&replies).await?;
            }
        }
    }
}
