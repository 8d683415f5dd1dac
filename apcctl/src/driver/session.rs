//! Session driver: one connection per outlet operation.

use std::time::Instant;

use log::{debug, info};
use tokio::io::{AsyncRead, AsyncWrite};

use super::menu::{MenuPlan, OutletCommand, SessionState};
use crate::error::{DriverError, Result};
use crate::port::PortNumber;
use crate::status::{OutletStatus, parse_status};
use crate::transport::{DeviceEndpoint, TelnetTransport};

/// Drives the PDU console for on/off/reset and status queries.
///
/// Holds no connection between calls: every operation connects, runs its
/// menu plan, and disconnects.
///
/// # Example
///
/// ```rust,no_run
/// use apcctl::{DeviceEndpoint, OutletController};
///
/// # async fn example() -> Result<(), apcctl::Error> {
/// let pdu = OutletController::new(DeviceEndpoint::new("10.0.0.5", "apc", "apc"))?;
/// pdu.reset(4).await?;
///
/// let status = pdu.status().await?;
/// println!("{status}");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct OutletController {
    endpoint: DeviceEndpoint,
}

impl OutletController {
    /// Create a controller for `endpoint`.
    pub fn new(endpoint: DeviceEndpoint) -> Result<Self> {
        if endpoint.host.is_empty() {
            return Err(DriverError::InvalidEndpoint {
                message: "host is required".to_string(),
            }
            .into());
        }
        if endpoint.username.is_empty() {
            return Err(DriverError::InvalidEndpoint {
                message: "username is required".to_string(),
            }
            .into());
        }
        Ok(Self { endpoint })
    }

    /// Switch `port` on.
    pub async fn on(&self, port: PortNumber) -> Result<()> {
        self.control(port, OutletCommand::On).await
    }

    /// Switch `port` off.
    pub async fn off(&self, port: PortNumber) -> Result<()> {
        self.control(port, OutletCommand::Off).await
    }

    /// Power-cycle `port`.
    pub async fn reset(&self, port: PortNumber) -> Result<()> {
        self.control(port, OutletCommand::Reset).await
    }

    /// Run `command` against `port` over a fresh connection.
    pub async fn control(&self, port: PortNumber, command: OutletCommand) -> Result<()> {
        info!("{} port {} on {}", command, port, self.endpoint.host);
        debug!("state: {:?}", SessionState::Connecting);
        let mut transport = TelnetTransport::connect(&self.endpoint).await?;
        let result = self.run_control(&mut transport, port, command).await;
        transport.close().await;
        result
    }

    /// Read every outlet's state over a fresh connection.
    pub async fn status(&self) -> Result<OutletStatus> {
        debug!("state: {:?}", SessionState::Connecting);
        let mut transport = TelnetTransport::connect(&self.endpoint).await?;
        let result = self.run_status(&mut transport).await;
        transport.close().await;
        result
    }

    /// Run the control plan over an already open transport.
    pub async fn run_control<S>(
        &self,
        transport: &mut TelnetTransport<S>,
        port: PortNumber,
        command: OutletCommand,
    ) -> Result<()>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let plan = MenuPlan::control(&self.endpoint, port, command);
        execute(transport, &plan).await.map(|_| ())
    }

    /// Run the status plan over an already open transport.
    pub async fn run_status<S>(&self, transport: &mut TelnetTransport<S>) -> Result<OutletStatus>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let plan = MenuPlan::status(&self.endpoint);
        let text = execute(transport, &plan).await?.unwrap_or_default();
        Ok(parse_status(&text)?)
    }
}

/// Run `plan` step by step, returning the captured text if the plan has a
/// capture marker.
///
/// Each step waits for its prompts in order and only then sends its line.
/// The first error aborts the plan; nothing is retried.
pub async fn execute<S>(
    transport: &mut TelnetTransport<S>,
    plan: &MenuPlan,
) -> Result<Option<String>>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let start = Instant::now();
    let mut state = SessionState::Connecting;

    let result = run_steps(transport, plan, &mut state).await;
    match &result {
        Ok(_) => {
            state = SessionState::Complete;
            debug!("state: {:?} after {:?}", state, start.elapsed());
        }
        Err(e) => {
            state = SessionState::Failed(e.to_string());
            debug!("state: {:?} after {:?}", state, start.elapsed());
        }
    }
    result
}

async fn run_steps<S>(
    transport: &mut TelnetTransport<S>,
    plan: &MenuPlan,
    state: &mut SessionState,
) -> Result<Option<String>>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    for step in plan.steps() {
        if *state != step.state {
            *state = step.state.clone();
            debug!("state: {:?}", state);
        }

        for markers in &step.expect {
            let matched = transport.read_until_any(markers).await?;
            debug!("matched {:?}", matched);
        }

        debug!("send {:?}", step.display_line());
        transport.write_line(&step.send).await?;
    }

    match plan.capture() {
        Some(marker) => {
            *state = SessionState::Capturing;
            debug!("state: {:?}", state);
            Ok(Some(transport.read_until_capture(marker).await?))
        }
        None => Ok(None),
    }
}
