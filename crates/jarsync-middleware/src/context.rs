//! Page contexts and store bootstrapping.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use jarsync_cookies::CookieTransport;
use jarsync_types::Runtime;

use crate::action::Action;
use crate::error::SyncResult;
use crate::middleware::CookieSyncMiddleware;
use crate::store::Store;

/// Where a store is being created, and the cookies available there.
#[derive(Clone)]
pub enum PageContext {
    /// A browser page with access to the document's cookies.
    Browser(Arc<dyn CookieTransport>),
    /// A server render for one HTTP request.
    Request(Arc<dyn CookieTransport>),
    /// An application-level context wrapping a page context.
    App(Box<PageContext>),
    /// Build-time rendering: no request and no cookies.
    Static,
}

impl PageContext {
    /// The innermost context, with every [`PageContext::App`] layer removed.
    pub fn page(&self) -> &PageContext {
        match self {
            PageContext::App(inner) => inner.page(),
            other => other,
        }
    }

    /// The runtime this context implies; `None` for static rendering.
    pub fn runtime(&self) -> Option<Runtime> {
        match self.page() {
            PageContext::Browser(_) => Some(Runtime::Browser),
            PageContext::Request(_) => Some(Runtime::Server),
            _ => None,
        }
    }

    /// The cookie transport, if this context has one.
    pub fn transport(&self) -> Option<&Arc<dyn CookieTransport>> {
        match self.page() {
            PageContext::Browser(transport) | PageContext::Request(transport) => Some(transport),
            _ => None,
        }
    }
}

impl fmt::Debug for PageContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageContext::Browser(_) => f.write_str("PageContext::Browser(..)"),
            PageContext::Request(_) => f.write_str("PageContext::Request(..)"),
            PageContext::App(inner) => write!(f, "PageContext::App({inner:?})"),
            PageContext::Static => f.write_str("PageContext::Static"),
        }
    }
}

/// Run the one-time cookie sync for a freshly created store.
///
/// In the browser this dispatches [`Action::Bootstrap`]. For a server request
/// it hands the request's cookies to the middleware, which hydrates the store
/// from them. A static context detaches any jar left over from an earlier
/// request, so the render neither reads nor writes cookies.
pub fn bootstrap_store<S>(
    middleware: &mut CookieSyncMiddleware,
    store: &mut S,
    context: &PageContext,
) -> SyncResult<()>
where
    S: Store + ?Sized,
{
    match context.page() {
        PageContext::Browser(_) => middleware.dispatch(store, Action::Bootstrap),
        PageContext::Request(transport) => middleware.serve_cookies(store, Arc::clone(transport)),
        _ => {
            debug!("static context, skipping cookie bootstrap");
            middleware.end_request();
            Ok(())
        }
    }
}

/// Fold the current cookie state into `store`.
pub fn import_cookie_state<S>(middleware: &mut CookieSyncMiddleware, store: &mut S) -> SyncResult<()>
where
    S: Store + ?Sized,
{
    middleware.dispatch(store, Action::import_cookie_state())
}
