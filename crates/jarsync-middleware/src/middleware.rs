use std::fmt;
use std::sync::Arc;

use tracing::debug;

use jarsync_config::MiddlewareConfig;
use jarsync_cookies::{CookieTransport, StateCookies};
use jarsync_types::{Runtime, StateTree, SubtreeDescriptor};
use jarsync_walker::{try_walk, walk};

use crate::action::Action;
use crate::context::PageContext;
use crate::error::{SyncError, SyncResult};
use crate::store::Store;

enum Phase {
    /// No cookies are reachable yet (server before a request, or a static
    /// render). Actions pass through and nothing is written.
    AwaitingCookies,
    Active(StateCookies),
}

/// Keeps configured state subtrees in sync with cookies.
///
/// Every action goes through [`dispatch`](Self::dispatch), which forwards it
/// to the [`Store`] and then writes each changed subtree to its cookie.
/// Hydration actions are handled specially:
///
/// - In the browser, subtrees with `ignore_incoming_snapshot_state` take their
///   value from the cookie instead of the hydration payload.
/// - Changes are measured against the cookie state rather than the store's
///   previous state, so cookies that already hold the value are not rewritten.
pub struct CookieSyncMiddleware {
    descriptors: Vec<SubtreeDescriptor>,
    phase: Phase,
    hydrated: bool,
}

impl CookieSyncMiddleware {
    /// Create a middleware for `context`.
    ///
    /// Browser and request contexts make the middleware active right away. A
    /// static context leaves it waiting for [`serve_cookies`](Self::serve_cookies).
    pub fn new(descriptors: Vec<SubtreeDescriptor>, context: &PageContext) -> Self {
        let mut middleware = Self {
            descriptors,
            phase: Phase::AwaitingCookies,
            hydrated: false,
        };
        if let (Some(transport), Some(runtime)) = (context.transport(), context.runtime()) {
            middleware.phase = Phase::Active(middleware.jar(Arc::clone(transport), runtime));
        }
        middleware
    }

    /// Resolve `config` and create a middleware for `context`.
    pub fn from_config(config: &MiddlewareConfig, context: &PageContext) -> SyncResult<Self> {
        Ok(Self::new(config.resolve()?, context))
    }

    pub fn descriptors(&self) -> &[SubtreeDescriptor] {
        &self.descriptors
    }

    /// Runtime of the active cookie jar; `None` while awaiting cookies.
    pub fn runtime(&self) -> Option<Runtime> {
        self.cookies().map(StateCookies::runtime)
    }

    pub fn is_active(&self) -> bool {
        matches!(self.phase, Phase::Active(_))
    }

    pub fn cookies(&self) -> Option<&StateCookies> {
        match &self.phase {
            Phase::Active(cookies) => Some(cookies),
            Phase::AwaitingCookies => None,
        }
    }

    /// The configured subtrees as currently stored in cookies, assembled into
    /// a state tree. `None` while awaiting cookies.
    pub fn cookie_state(&self) -> Option<StateTree> {
        self.cookies()
            .map(|_| self.overlay_cookies(&StateTree::empty_object()))
    }

    /// Replace incoming hydration state with cookie state for every subtree
    /// that ignores incoming state.
    ///
    /// Returns `payload` itself when the cookies already agree with it.
    pub fn reconcile_hydration(&self, payload: &StateTree) -> StateTree {
        let Some(cookies) = self.cookies() else {
            return payload.clone();
        };
        let values = cookies.get_all();
        walk(
            &self.descriptors,
            |subtree, _, _| {
                if subtree.ignore_incoming_snapshot_state {
                    values.get(&subtree.cookie_name).cloned()
                } else {
                    None
                }
            },
            payload,
            None,
        )
    }

    /// Start serving one server request: read cookies through `transport` and
    /// hydrate `store` with them.
    pub fn serve_cookies<S>(&mut self, store: &mut S, transport: Arc<dyn CookieTransport>) -> SyncResult<()>
    where
        S: Store + ?Sized,
    {
        self.phase = Phase::Active(self.jar(transport, Runtime::Server));
        self.hydrated = false;

        let payload = self.cookie_state().unwrap_or_default();
        debug!(subtrees = self.descriptors.len(), "hydrating store from request cookies");
        self.dispatch(store, Action::hydrate(payload))
    }

    /// Drop the current cookie jar and wait for the next request.
    ///
    /// Call this when a served request ends. Until the next
    /// [`serve_cookies`](Self::serve_cookies) nothing is read or written.
    pub fn end_request(&mut self) {
        if self.is_active() {
            debug!("releasing cookie jar");
        }
        self.phase = Phase::AwaitingCookies;
        self.hydrated = false;
    }

    /// Pass `action` to `store` and persist the subtrees it changed.
    ///
    /// Cookie write failures are returned after the store has applied the
    /// action.
    pub fn dispatch<S>(&mut self, store: &mut S, action: Action) -> SyncResult<()>
    where
        S: Store + ?Sized,
    {
        match action {
            Action::Bootstrap => {
                if self.runtime() == Some(Runtime::Browser) && !self.hydrated {
                    debug!("bootstrapping store from browser cookies");
                    return self.dispatch(store, Action::hydrate(StateTree::empty_object()));
                }
                Ok(())
            }
            Action::Hydrate { payload } => {
                self.hydrated = true;
                let payload = if self.runtime() == Some(Runtime::Browser) {
                    self.reconcile_hydration(&payload)
                } else {
                    payload
                };
                let baseline = self.overlay_cookies(&store.state());
                self.forward(store, &Action::Hydrate { payload }, baseline)
            }
            Action::ImportCookieState { .. } => {
                let payload = self.cookie_state().unwrap_or_default();
                let baseline = self.overlay_cookies(&store.state());
                self.forward(store, &Action::ImportCookieState { payload }, baseline)
            }
            other => {
                let baseline = store.state();
                self.forward(store, &other, baseline)
            }
        }
    }

    fn forward<S>(&self, store: &mut S, action: &Action, baseline: StateTree) -> SyncResult<()>
    where
        S: Store + ?Sized,
    {
        store.apply(action);

        let Some(cookies) = self.cookies() else {
            return Ok(());
        };
        let state = store.state();
        if StateTree::ptr_eq(&state, &baseline) {
            return Ok(());
        }

        try_walk::<_, SyncError>(
            &self.descriptors,
            |subtree, new, old| {
                if new == old {
                    return Ok(None);
                }
                match new {
                    Some(value) if subtree.default_value.as_ref() != Some(value) => {
                        cookies.set(&subtree.cookie_name, value)?
                    }
                    _ => cookies.delete(&subtree.cookie_name)?,
                }
                Ok(None)
            },
            &state,
            Some(&baseline),
        )?;
        Ok(())
    }

    /// `state` with every subtree that has cookie state replaced by it.
    fn overlay_cookies(&self, state: &StateTree) -> StateTree {
        let Some(cookies) = self.cookies() else {
            return state.clone();
        };
        let values = cookies.get_all();
        walk(
            &self.descriptors,
            |subtree, _, _| values.get(&subtree.cookie_name).cloned(),
            state,
            None,
        )
    }

    fn jar(&self, transport: Arc<dyn CookieTransport>, runtime: Runtime) -> StateCookies {
        let mut cookies = StateCookies::new(transport, runtime);
        cookies.configure(&self.descriptors);
        cookies
    }
}

impl fmt::Debug for CookieSyncMiddleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CookieSyncMiddleware")
            .field("subtrees", &self.descriptors.len())
            .field("runtime", &self.runtime())
            .field("hydrated", &self.hydrated)
            .finish()
    }
}
