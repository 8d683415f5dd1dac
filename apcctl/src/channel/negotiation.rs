//! Telnet command filtering.
//!
//! The PDU opens the session with a few option negotiations. We refuse every
//! option and strip all IAC sequences from the data stream so prompt matching
//! only ever sees printable menu text.

const IAC: u8 = 255;
const DONT: u8 = 254;
const DO: u8 = 253;
const WONT: u8 = 252;
const WILL: u8 = 251;
const SB: u8 = 250;
const SE: u8 = 240;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum State {
    #[default]
    Data,
    Iac,
    Option(u8),
    Sub,
    SubIac,
}

/// Incremental telnet command stripper.
///
/// State is kept across calls, so a sequence split over two reads is still
/// removed.
#[derive(Debug, Default)]
pub struct NegotiationFilter {
    state: State,
}

impl NegotiationFilter {
    /// Create a filter in the data state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter `input`, appending data bytes to `data` and any refusal
    /// replies to `replies`.
    pub fn filter(&mut self, input: &[u8], data: &mut Vec<u8>, replies: &mut Vec<u8>) {
        for &byte in input {
            self.state = match (self.state, byte) {
                (State::Data, IAC) => State::Iac,
                (State::Data, b) => {
                    data.push(b);
                    State::Data
                }
                (State::Iac, IAC) => {
                    data.push(IAC);
                    State::Data
                }
                (State::Iac, cmd @ (DO | DONT | WILL | WONT)) => State::Option(cmd),
                (State::Iac, SB) => State::Sub,
                (State::Iac, _) => State::Data,
                (State::Option(cmd), opt) => {
                    match cmd {
                        DO => replies.extend_from_slice(&[IAC, WONT, opt]),
                        WILL => replies.extend_from_slice(&[IAC, DONT, opt]),
                        _ => {}
                    }
                    State::Data
                }
                (State::Sub, IAC) => State::SubIac,
                (State::Sub, _) => State::Sub,
                (State::SubIac, SE) => State::Data,
                (State::SubIac, _) => State::Sub,
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(filter: &mut NegotiationFilter, input: &[u8]) -> (Vec<u8>, Vec<u8>) {
        let mut data = Vec::new();
        let mut replies = Vec::new();
        filter.filter(input, &mut data, &mut replies);
        (data, replies)
    }

    #[test]
    fn test_plain_data_passes_through() {
        let mut filter = NegotiationFilter::new();
        let (data, replies) = run(&mut filter, b"User Name : ");
        assert_eq!(data, b"User Name : ");
        assert!(replies.is_empty());
    }

    #[test]
    fn test_refuses_options() {
        let mut filter = NegotiationFilter::new();
        let (data, replies) = run(&mut filter, &[IAC, DO, 1, b'a', IAC, WILL, 3, IAC, WONT, 5]);
        assert_eq!(data, b"a");
        assert_eq!(replies, vec![IAC, WONT, 1, IAC, DONT, 3]);
    }

    #[test]
    fn test_split_sequence() {
        let mut filter = NegotiationFilter::new();
        let (data, replies) = run(&mut filter, &[b'x', IAC]);
        assert_eq!(data, b"x");
        assert!(replies.is_empty());

        let (data, replies) = run(&mut filter, &[DO, 24, b'y']);
        assert_eq!(data, b"y");
        assert_eq!(replies, vec![IAC, WONT, 24]);
    }

    #[test]
    fn test_subnegotiation_dropped() {
        let mut filter = NegotiationFilter::new();
        let (data, _) = run(&mut filter, &[IAC, SB, 24, 1, IAC, SE, b'>']);
        assert_eq!(data, b">");
    }

    #[test]
    fn test_escaped_iac() {
        let mut filter = NegotiationFilter::new();
        let (data, _) = run(&mut filter, &[IAC, IAC]);
        assert_eq!(data, vec![IAC]);
    }
}
