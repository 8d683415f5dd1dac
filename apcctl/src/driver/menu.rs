//! Menu navigation plans.
//!
//! The PDU's console is a fixed tree of numbered menus. Reaching an outlet
//! action means answering a rigid sequence of prompts, so each operation is
//! described as data: an ordered list of [`MenuStep`]s, each waiting for one
//! or more prompts and then sending a line.
//!
//! ```text
//! User Name :  -> username
//! Password  :  -> password
//! <ESC> ... >  -> 1        (Outlet Manager)
//! <ESC> ... >  -> port
//! <ESC> ... >  -> 1        (Control Outlet)
//! <ESC> ... >  -> 1|2|3    (On / Off / Reboot)
//! ... cancel : -> YES
//! ```

use std::fmt;

use crate::channel::MarkerSet;
use crate::port::PortNumber;
use crate::transport::DeviceEndpoint;

/// Login prompt for the user name.
pub const USERNAME_PROMPT: &str = "User Name :";

/// Login prompt for the password (two spaces before the colon).
pub const PASSWORD_PROMPT: &str = "Password  :";

/// Printed before every menu screen.
pub const ESCAPE_MARKER: &str = "<ESC>";

/// Menu input prompt.
pub const MENU_PROMPT: &str = ">";

/// Tail of the "Enter 'YES' to continue or <ENTER> to cancel :" prompt.
pub const CONFIRM_PROMPT: &str = "cancel :";

/// Line that commits a control action.
pub const CONFIRM_LINE: &str = "YES";

/// Main menu entry for the outlet manager.
pub const OUTLET_MANAGER: &str = "1";

/// Outlet menu entry for the control console.
pub const CONTROL_OUTLET: &str = "1";

/// Action applied to a single outlet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutletCommand {
    On,
    Off,
    Reset,
}

impl OutletCommand {
    /// Menu digit for this command.
    pub fn digit(self) -> &'static str {
        match self {
            OutletCommand::On => "1",
            OutletCommand::Off => "2",
            OutletCommand::Reset => "3",
        }
    }
}

impl fmt::Display for OutletCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutletCommand::On => "on",
            OutletCommand::Off => "off",
            OutletCommand::Reset => "reset",
        };
        f.write_str(name)
    }
}

/// Menu screen a navigation step lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuLevel {
    OutletManager,
    PortSelect,
    OutletControl,
    Command,
}

/// Where a session is in its one connection's lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Connecting,
    Authenticating,
    Navigating(MenuLevel),
    AwaitingConfirmation,
    Capturing,
    Complete,
    Failed(String),
}

/// Wait for each marker set in order, then send one line.
#[derive(Debug, Clone)]
pub struct MenuStep {
    /// State the session is in while this step runs.
    pub state: SessionState,

    /// Prompts to observe, in order, before sending.
    pub expect: Vec<MarkerSet>,

    /// Line to send once every prompt has been seen.
    pub send: String,

    /// Whether the line must be masked in logs.
    pub hidden: bool,
}

impl MenuStep {
    /// The line as it may appear in logs.
    pub fn display_line(&self) -> &str {
        if self.hidden { "********" } else { &self.send }
    }
}

/// Ordered steps for one operation, with an optional trailing capture.
#[derive(Debug, Clone)]
pub struct MenuPlan {
    steps: Vec<MenuStep>,
    capture: Option<MarkerSet>,
}

impl MenuPlan {
    /// Start building a plan.
    pub fn builder() -> MenuPlanBuilder {
        MenuPlanBuilder::default()
    }

    /// Log in, walk to the outlet's control screen, issue `command`, confirm.
    pub fn control(endpoint: &DeviceEndpoint, port: PortNumber, command: OutletCommand) -> Self {
        let port = port.to_string();
        login(endpoint)
            .navigate(MenuLevel::OutletManager, OUTLET_MANAGER)
            .navigate(MenuLevel::PortSelect, &port)
            .navigate(MenuLevel::OutletControl, CONTROL_OUTLET)
            .navigate(MenuLevel::Command, command.digit())
            .state(SessionState::AwaitingConfirmation)
            .expect(CONFIRM_PROMPT)
            .send(CONFIRM_LINE)
            .build()
    }

    /// Log in and capture the screen text up to the first menu marker.
    pub fn status(endpoint: &DeviceEndpoint) -> Self {
        login(endpoint).capture(ESCAPE_MARKER).build()
    }

    /// The steps in execution order.
    pub fn steps(&self) -> &[MenuStep] {
        &self.steps
    }

    /// Marker whose preceding text is returned after the last step.
    pub fn capture(&self) -> Option<&MarkerSet> {
        self.capture.as_ref()
    }

    /// Every line the plan sends, in order (hidden lines included).
    pub fn lines(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.send.as_str()).collect()
    }

    /// Whether the plan ends by confirming with `YES`.
    pub fn is_confirmed(&self) -> bool {
        self.steps.last().is_some_and(|s| {
            s.state == SessionState::AwaitingConfirmation && s.send == CONFIRM_LINE
        })
    }
}

fn login(endpoint: &DeviceEndpoint) -> MenuPlanBuilder {
    MenuPlan::builder()
        .state(SessionState::Authenticating)
        .expect(USERNAME_PROMPT)
        .send(&endpoint.username)
        .expect(PASSWORD_PROMPT)
        .send_hidden(endpoint.password())
}

/// Builder for [`MenuPlan`]s.
///
/// `expect` calls accumulate until the next `send`, which closes the step.
///
/// ```rust
/// use apcctl::driver::{MenuPlan, SessionState};
///
/// let plan = MenuPlan::builder()
///     .state(SessionState::Authenticating)
///     .expect("User Name :")
///     .send("apc")
///     .build();
/// assert_eq!(plan.lines(), vec!["apc"]);
/// ```
#[derive(Debug)]
pub struct MenuPlanBuilder {
    steps: Vec<MenuStep>,
    pending: Vec<MarkerSet>,
    state: SessionState,
    capture: Option<MarkerSet>,
}

impl Default for MenuPlanBuilder {
    fn default() -> Self {
        Self {
            steps: Vec::new(),
            pending: Vec::new(),
            state: SessionState::Authenticating,
            capture: None,
        }
    }
}

impl MenuPlanBuilder {
    /// State for the steps that follow.
    pub fn state(mut self, state: SessionState) -> Self {
        self.state = state;
        self
    }

    /// Wait for `markers` before the next send.
    pub fn expect(mut self, markers: impl Into<MarkerSet>) -> Self {
        self.pending.push(markers.into());
        self
    }

    /// Send `line` once the pending prompts are seen.
    pub fn send(self, line: &str) -> Self {
        self.push(line, false)
    }

    /// Like `send`, but masked in logs.
    pub fn send_hidden(self, line: &str) -> Self {
        self.push(line, true)
    }

    /// One menu hop: wait for a fresh screen and its prompt, then choose.
    pub fn navigate(self, level: MenuLevel, choice: &str) -> Self {
        self.state(SessionState::Navigating(level))
            .expect(ESCAPE_MARKER)
            .expect(MENU_PROMPT)
            .send(choice)
    }

    /// After the last step, return the text preceding `marker`.
    pub fn capture(mut self, marker: impl Into<MarkerSet>) -> Self {
        self.capture = Some(marker.into());
        self
    }

    /// Finish the plan. Prompts with no following send are dropped.
    pub fn build(self) -> MenuPlan {
        MenuPlan {
            steps: self.steps,
            capture: self.capture,
        }
    }

    fn push(mut self, line: &str, hidden: bool) -> Self {
        self.steps.push(MenuStep {
            state: self.state.clone(),
            expect: std::mem::take(&mut self.pending),
            send: line.to_string(),
            hidden,
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint() -> DeviceEndpoint {
        DeviceEndpoint::new("pdu", "apc", "s3cret")
    }

    #[test]
    fn test_on_port_5_lines() {
        let plan = MenuPlan::control(&endpoint(), 5, OutletCommand::On);
        assert_eq!(plan.lines(), vec!["apc", "s3cret", "1", "5", "1", "1", "YES"]);
        assert!(plan.is_confirmed());
        assert!(plan.capture().is_none());
    }

    #[test]
    fn test_reset_command_digit() {
        let plan = MenuPlan::control(&endpoint(), 2, OutletCommand::Reset);
        let steps = plan.steps();
        let command = &steps[steps.len() - 2];
        assert_eq!(command.state, SessionState::Navigating(MenuLevel::Command));
        assert_eq!(command.send, "3");
    }

    #[test]
    fn test_off_command_digit() {
        let plan = MenuPlan::control(&endpoint(), 8, OutletCommand::Off);
        assert_eq!(plan.lines()[5], "2");
    }

    #[test]
    fn test_step_prompts() {
        let plan = MenuPlan::control(&endpoint(), 5, OutletCommand::On);
        let steps = plan.steps();
        assert_eq!(steps.len(), 7);

        assert_eq!(steps[0].expect, vec![MarkerSet::single("User Name :")]);
        assert_eq!(steps[1].expect, vec![MarkerSet::single("Password  :")]);
        assert!(steps[1].hidden);
        assert_eq!(steps[1].display_line(), "********");

        for step in &steps[2..6] {
            assert_eq!(
                step.expect,
                vec![MarkerSet::single("<ESC>"), MarkerSet::single(">")]
            );
            assert!(matches!(step.state, SessionState::Navigating(_)));
        }

        assert_eq!(steps[6].state, SessionState::AwaitingConfirmation);
        assert_eq!(steps[6].expect, vec![MarkerSet::single("cancel :")]);
    }

    #[test]
    fn test_status_plan() {
        let plan = MenuPlan::status(&endpoint());
        assert_eq!(plan.lines(), vec!["apc", "s3cret"]);
        assert_eq!(plan.capture(), Some(&MarkerSet::single("<ESC>")));
        assert!(!plan.is_confirmed());
    }

    #[test]
    fn test_builder_drops_dangling_expect() {
        let plan = MenuPlan::builder().expect(">").build();
        assert!(plan.steps().is_empty());
    }

    #[test]
    fn test_command_display() {
        assert_eq!(OutletCommand::Reset.to_string(), "reset");
        assert_eq!(OutletCommand::On.digit(), "1");
    }
}
