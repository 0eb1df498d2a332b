use serde::{Deserialize, Serialize};

/// Where a jarsync component is running.
///
/// This replaces any ambient "are we in a browser" check: components receive
/// their runtime explicitly at construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Runtime {
    /// Client side. Cookies may change out of band (other tabs, scripts),
    /// so they are re-read on every access.
    Browser,
    /// Server side, scoped to a single request. Cookies are read once.
    Server,
}

impl Runtime {
    pub fn is_browser(self) -> bool {
        matches!(self, Runtime::Browser)
    }

    pub fn is_server(self) -> bool {
        matches!(self, Runtime::Server)
    }
}
