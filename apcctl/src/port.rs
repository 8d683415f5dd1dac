//! Port token resolution.
//!
//! Users address outlets by number, by alias name, or not at all (meaning
//! "the last port I used"). [`resolve_port`] turns that token into an outlet
//! number without touching the network.

use indexmap::IndexMap;
use thiserror::Error;

/// Outlet number as typed by the user or stored in an alias.
///
/// Signed and 64-bit so any integer token reaches the device unchanged.
pub type PortNumber = i64;

/// The port token could not be mapped to an outlet number.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// Neither a number nor a known alias.
    #[error("unable to resolve port token '{token}'")]
    Unresolved { token: String },
}

/// Port ↔ name bindings. Ports and names are each unique within a table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasTable {
    entries: IndexMap<PortNumber, String>,
}

impl AliasTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to `port`, replacing any entry that already uses either.
    pub fn insert(&mut self, port: PortNumber, name: impl Into<String>) {
        let name = name.into();
        self.entries.retain(|&p, n| p != port && *n != name);
        self.entries.insert(port, name);
    }

    /// Remove the binding for `name`, returning its port.
    pub fn remove_name(&mut self, name: &str) -> Option<PortNumber> {
        let port = self.port_of(name)?;
        self.entries.shift_remove(&port);
        Some(port)
    }

    /// Port bound to `name`.
    pub fn port_of(&self, name: &str) -> Option<PortNumber> {
        self.entries
            .iter()
            .find(|(_, n)| n.as_str() == name)
            .map(|(&p, _)| p)
    }

    /// Name bound to `port`.
    pub fn name_of(&self, port: PortNumber) -> Option<&str> {
        self.entries.get(&port).map(String::as_str)
    }

    /// Iterate `(port, name)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (PortNumber, &str)> {
        self.entries.iter().map(|(&p, n)| (p, n.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(PortNumber, S)> for AliasTable {
    fn from_iter<I: IntoIterator<Item = (PortNumber, S)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (port, name) in iter {
            table.insert(port, name);
        }
        table
    }
}

/// Resolve a user-supplied port token.
///
/// First match wins: empty → `last_used`; integer → itself (not
/// bounds-checked, the device rejects bad outlets); alias → its port.
pub fn resolve_port(
    token: &str,
    last_used: PortNumber,
    aliases: &AliasTable,
) -> Result<PortNumber, ResolveError> {
    if token.is_empty() {
        return Ok(last_used);
    }

    if let Ok(num) = token.parse::<PortNumber>() {
        return Ok(num);
    }

    aliases
        .port_of(token)
        .ok_or_else(|| ResolveError::Unresolved {
            token: token.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> AliasTable {
        [(3, "printer"), (5, "router")].into_iter().collect()
    }

    #[test]
    fn test_empty_token_uses_last_port() {
        assert_eq!(resolve_port("", 6, &table()), Ok(6));
        assert_eq!(resolve_port("", 6, &AliasTable::new()), Ok(6));
    }

    #[test]
    fn test_numeric_token_is_exact() {
        for token in ["1", "5", "8", "9", "42", "003", "0", "-1", "+2", "4294967296"] {
            let expected: PortNumber = token.parse().unwrap();
            assert_eq!(resolve_port(token, 1, &table()), Ok(expected));
            assert_eq!(resolve_port(token, 1, &AliasTable::new()), Ok(expected));
        }
    }

    #[test]
    fn test_out_of_range_numbers_pass_through() {
        assert_eq!(resolve_port("-1", 3, &table()), Ok(-1));
        assert_eq!(resolve_port("4294967296", 3, &table()), Ok(4_294_967_296));
    }

    #[test]
    fn test_numeric_wins_over_alias() {
        let aliases: AliasTable = [(2, "7")].into_iter().collect();
        assert_eq!(resolve_port("7", 1, &aliases), Ok(7));
    }

    #[test]
    fn test_alias_token() {
        let aliases: AliasTable = [(3, "printer")].into_iter().collect();
        assert_eq!(resolve_port("printer", 1, &aliases), Ok(3));
    }

    #[test]
    fn test_unknown_token() {
        let err = resolve_port("toaster", 1, &table()).unwrap_err();
        assert_eq!(
            err,
            ResolveError::Unresolved {
                token: "toaster".to_string()
            }
        );
        assert!(resolve_port("9223372036854775808", 1, &table()).is_err());
        assert!(resolve_port("1.5", 1, &table()).is_err());
        assert!(resolve_port("Printer", 1, &table()).is_err());
    }

    #[test]
    fn test_insert_keeps_uniqueness() {
        let mut aliases = table();
        aliases.insert(3, "laser");
        assert_eq!(aliases.port_of("printer"), None);
        assert_eq!(aliases.name_of(3), Some("laser"));

        aliases.insert(7, "router");
        assert_eq!(aliases.port_of("router"), Some(7));
        assert_eq!(aliases.name_of(5), None);
        assert_eq!(aliases.len(), 2);
    }

    #[test]
    fn test_remove_name() {
        let mut aliases = table();
        assert_eq!(aliases.remove_name("printer"), Some(3));
        assert_eq!(aliases.remove_name("printer"), None);
        assert_eq!(aliases.iter().collect::<Vec<_>>(), vec![(5, "router")]);
    }
}
