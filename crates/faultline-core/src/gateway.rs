use std::collections::HashMap;

/// Display codes rewritten before they leave the service
///
/// Some internal codes must not be exposed as non-negative values (the RPC
/// status space is unsigned, so the catalog stores them positive). The table
/// flips them; every other code passes through unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayTable {
    entries: HashMap<i32, i32>,
}

impl GatewayTable {
    /// Build a table from explicit `(internal, external)` pairs
    pub fn new(entries: impl IntoIterator<Item = (i32, i32)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// The fixed web gateway mapping
    pub fn web() -> Self {
        Self::new([
            // generic
            (10000, -10000),
            // MySQL
            (11001, -11001),
            // MongoDB
            (12001, -12001),
            // object storage
            (16001, -16001),
        ])
    }

    /// Table that leaves every code untouched
    pub fn identity() -> Self {
        Self::new([])
    }

    /// Externally exposed code for `code`
    pub fn remap(&self, code: i32) -> i32 {
        self.entries.get(&code).copied().unwrap_or(code)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for GatewayTable {
    fn default() -> Self {
        Self::web()
    }
}
