//! Outlet status block parsing.
//!
//! The control console prints one fixed-layout block per screen:
//!
//! ```text
//! ------- Current MasterSwitch Status -------------------------------------------
//! Device 1:ON         Device 2:OFF        Device 3:OFF        Device 4:ON
//! Device 5:OFF        Device 6:OFF        Device 7:OFF        Device 8:ON
//! ```
//!
//! Each `Device N:` label is located in ascending order, starting after the
//! previous field, and must be followed by `OFF` or by `ON` and whitespace.

use std::fmt;

use memchr::memmem;
use thiserror::Error;

/// Number of switchable outlets on the supported device family.
pub const OUTLET_COUNT: usize = 8;

/// Errors from [`parse_status`], localized to the device index that failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StatusError {
    /// The label for this device was not found after its predecessor.
    #[error("missing 'Device {index}:' field")]
    MissingDevice { index: usize },

    /// The label was found but not followed by a state.
    #[error("invalid state {found:?} for device {index}")]
    InvalidState { index: usize, found: String },
}

/// Power state of every outlet, produced fresh by each status query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutletStatus {
    /// Number of outlets reported.
    pub port_count: usize,

    /// `true` = ON, index 0 is outlet 1.
    pub states: Vec<bool>,
}

impl OutletStatus {
    /// State of outlet `port` (1-based), or None if out of range.
    pub fn state(&self, port: usize) -> Option<bool> {
        port.checked_sub(1).and_then(|i| self.states.get(i).copied())
    }

    /// Iterate `(port, on)` pairs in port order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, bool)> + '_ {
        self.states.iter().enumerate().map(|(i, &on)| (i + 1, on))
    }
}

impl fmt::Display for OutletStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<String> = self
            .iter()
            .map(|(port, on)| format!("{}:{}", port, state_label(on)))
            .collect();
        write!(f, "{}", fields.join(" "))
    }
}

/// Display label for a state.
pub fn state_label(on: bool) -> &'static str {
    if on { "ON" } else { "OFF" }
}

/// Parse the eight-device status block out of raw console text.
pub fn parse_status(text: &str) -> Result<OutletStatus, StatusError> {
    let mut states = Vec::with_capacity(OUTLET_COUNT);
    let mut rest = text;

    for index in 1..=OUTLET_COUNT {
        let end = find_label(rest, index).ok_or(StatusError::MissingDevice { index })?;
        let field = &rest[end..];

        let (on, width) = if field.starts_with("OFF") {
            (false, 3)
        } else if field.starts_with("ON")
            && field[2..].chars().next().is_none_or(char::is_whitespace)
        {
            (true, 2)
        } else {
            return Err(StatusError::InvalidState {
                index,
                found: field.chars().take(3).collect(),
            });
        };

        states.push(on);
        rest = &field[width..];
    }

    Ok(OutletStatus {
        port_count: OUTLET_COUNT,
        states,
    })
}

/// Find `Device {index}:` at the start of `text` or after whitespace,
/// returning the offset just past the colon.
fn find_label(text: &str, index: usize) -> Option<usize> {
    let label = format!("Device {index}:");
    let bytes = text.as_bytes();
    memmem::find_iter(bytes, label.as_bytes())
        .find(|&pos| pos == 0 || bytes[pos - 1].is_ascii_whitespace())
        .map(|pos| pos + label.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "Device 1:ON  Device 2:OFF Device 3:OFF Device 4:ON \n Device 5:OFF Device 6:OFF Device 7:OFF Device 8:ON ";

    const SCREEN: &str = "\r\n------- Current MasterSwitch Status -------------------------------------------\r\n\
Device 1:ON         Device 2:OFF        Device 3:OFF        Device 4:ON \r\n\
Device 5:OFF        Device 6:OFF        Device 7:OFF        Device 8:ON \r\n\r\n\
------- Control Console -------------------------------------------------------\r\n";

    #[test]
    fn test_parse_sample() {
        let status = parse_status(SAMPLE).unwrap();
        assert_eq!(status.port_count, 8);
        assert_eq!(
            status.states,
            vec![true, false, false, true, false, false, false, true]
        );
    }

    #[test]
    fn test_parse_screen() {
        let status = parse_status(SCREEN).unwrap();
        assert_eq!(status.state(1), Some(true));
        assert_eq!(status.state(2), Some(false));
        assert_eq!(status.state(8), Some(true));
        assert_eq!(status.state(0), None);
        assert_eq!(status.state(9), None);
    }

    #[test]
    fn test_truncated_before_device_8() {
        let cut = SAMPLE.find("Device 8").unwrap();
        let err = parse_status(&SAMPLE[..cut]).unwrap_err();
        assert_eq!(err, StatusError::MissingDevice { index: 8 });
    }

    #[test]
    fn test_missing_block() {
        let err = parse_status("User Name : ").unwrap_err();
        assert_eq!(err, StatusError::MissingDevice { index: 1 });
    }

    #[test]
    fn test_out_of_order() {
        let text = SAMPLE.replace("Device 2:OFF Device 3:OFF", "Device 3:OFF Device 2:OFF");
        let err = parse_status(&text).unwrap_err();
        assert_eq!(err, StatusError::MissingDevice { index: 3 });
    }

    #[test]
    fn test_invalid_state() {
        let text = SAMPLE.replace("Device 6:OFF", "Device 6:N/A");
        let err = parse_status(&text).unwrap_err();
        assert_eq!(
            err,
            StatusError::InvalidState {
                index: 6,
                found: "N/A".to_string()
            }
        );
    }

    #[test]
    fn test_trailing_on_without_pad() {
        let text = SAMPLE.trim_end();
        let status = parse_status(text).unwrap();
        assert_eq!(status.state(8), Some(true));
    }

    #[test]
    fn test_on_at_line_end() {
        let text = SAMPLE.replace("Device 4:ON \n", "Device 4:ON\r\n");
        let status = parse_status(&text).unwrap();
        assert_eq!(status.state(4), Some(true));
    }

    #[test]
    fn test_on_without_separator_rejected() {
        let text = SAMPLE.replace("Device 1:ON ", "Device 1:ONX");
        let err = parse_status(&text).unwrap_err();
        assert_eq!(
            err,
            StatusError::InvalidState {
                index: 1,
                found: "ONX".to_string()
            }
        );
    }

    #[test]
    fn test_label_needs_leading_whitespace() {
        let text = SAMPLE.replace("Device 5:OFF", "XDevice 5:OFF");
        let err = parse_status(&text).unwrap_err();
        assert_eq!(err, StatusError::MissingDevice { index: 5 });
    }

    #[test]
    fn test_find_label_offsets() {
        assert_eq!(find_label("Device 1:ON", 1), Some(9));
        assert_eq!(find_label("  Device 2:OFF", 2), Some(11));
        assert_eq!(find_label("Device 10:ON", 1), None);
        assert_eq!(find_label("xDevice 3:ON Device 3:OFF", 3), Some(22));
    }

    #[test]
    fn test_display() {
        let status = parse_status(SAMPLE).unwrap();
        assert_eq!(
            status.to_string(),
            "1:ON 2:OFF 3:OFF 4:ON 5:OFF 6:OFF 7:OFF 8:ON"
        );
    }
}
