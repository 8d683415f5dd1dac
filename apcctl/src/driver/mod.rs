//! High-level driver for the PDU console.
//!
//! The driver layer turns an outlet operation into a [`MenuPlan`] and runs
//! it over a fresh telnet connection.

mod menu;
mod session;

pub use menu::{
    CONFIRM_LINE, CONFIRM_PROMPT, CONTROL_OUTLET, ESCAPE_MARKER, MENU_PROMPT, MenuLevel, MenuPlan,
    MenuPlanBuilder, MenuStep, OUTLET_MANAGER, OutletCommand, PASSWORD_PROMPT, SessionState,
    USERNAME_PROMPT,
};
pub use session::{OutletController, execute};
