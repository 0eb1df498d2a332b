use std::fmt;

use jarsync_types::StateTree;

/// Type string of the hydration-merge action.
pub const HYDRATE: &str = "HYDRATE";
/// Type string of the cookie import action.
pub const IMPORT_COOKIE_STATE: &str = "jarsync/IMPORT_COOKIE_STATE";
/// Type string of the internal bootstrap marker.
pub const BOOTSTRAP: &str = "jarsync/BOOTSTRAP";

/// A state transition flowing through the middleware.
#[derive(Clone, PartialEq)]
pub enum Action {
    /// Fold `payload` into the store (server-computed or cookie-derived state).
    Hydrate { payload: StateTree },
    /// Fold the cookie state into the store. The middleware replaces the
    /// payload before the store sees it.
    ImportCookieState { payload: StateTree },
    /// Dispatched once after store creation.
    Bootstrap,
    /// Any application action.
    Custom { kind: String, payload: StateTree },
}

impl Action {
    pub fn hydrate(payload: StateTree) -> Self {
        Action::Hydrate { payload }
    }

    pub fn import_cookie_state() -> Self {
        Action::ImportCookieState {
            payload: StateTree::empty_object(),
        }
    }

    pub fn custom(kind: impl Into<String>, payload: StateTree) -> Self {
        Action::Custom {
            kind: kind.into(),
            payload,
        }
    }

    /// The action's type string.
    pub fn kind(&self) -> &str {
        match self {
            Action::Hydrate { .. } => HYDRATE,
            Action::ImportCookieState { .. } => IMPORT_COOKIE_STATE,
            Action::Bootstrap => BOOTSTRAP,
            Action::Custom { kind, .. } => kind,
        }
    }

    pub fn payload(&self) -> Option<&StateTree> {
        match self {
            Action::Hydrate { payload }
            | Action::ImportCookieState { payload }
            | Action::Custom { payload, .. } => Some(payload),
            Action::Bootstrap => None,
        }
    }

    /// Returns `true` for actions whose payload is merged into the store.
    pub fn is_hydration(&self) -> bool {
        matches!(
            self,
            Action::Hydrate { .. } | Action::ImportCookieState { .. }
        )
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.payload() {
            Some(payload) => write!(f, "Action({}, {payload})", self.kind()),
            None => write!(f, "Action({})", self.kind()),
        }
    }
}
