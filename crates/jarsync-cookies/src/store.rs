//! The isomorphic state cookie store.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use tracing::{debug, warn};

use jarsync_types::{Runtime, StateTree, SubtreeDescriptor};

use crate::codec;
use crate::error::{CookieError, CookieResult};
use crate::transport::CookieTransport;

/// Decoded subtree state keyed by cookie name.
pub type CookieState = BTreeMap<String, StateTree>;

/// Reads and writes subtree state cookies through a [`CookieTransport`].
///
/// In the [`Runtime::Server`] runtime one instance serves one request: the
/// decoded cookies are read once and cached, and the cache follows this
/// instance's own writes. In the [`Runtime::Browser`] runtime cookies may
/// change behind our back, so every [`get_all`](Self::get_all) re-reads them.
pub struct StateCookies {
    transport: Arc<dyn CookieTransport>,
    runtime: Runtime,
    configs: BTreeMap<String, SubtreeDescriptor>,
    cache: RwLock<Option<CookieState>>,
}

impl StateCookies {
    pub fn new(transport: Arc<dyn CookieTransport>, runtime: Runtime) -> Self {
        Self {
            transport,
            runtime,
            configs: BTreeMap::new(),
            cache: RwLock::new(None),
        }
    }

    pub fn browser(transport: Arc<dyn CookieTransport>) -> Self {
        Self::new(transport, Runtime::Browser)
    }

    pub fn server(transport: Arc<dyn CookieTransport>) -> Self {
        Self::new(transport, Runtime::Server)
    }

    pub fn runtime(&self) -> Runtime {
        self.runtime
    }

    pub fn transport(&self) -> &Arc<dyn CookieTransport> {
        &self.transport
    }

    /// Replace the set of known cookies. Drops any cached state.
    pub fn configure(&mut self, descriptors: &[SubtreeDescriptor]) {
        self.configs = descriptors
            .iter()
            .map(|d| (d.cookie_name.clone(), d.clone()))
            .collect();
        *self.cache.write().expect("lock poisoned") = None;
    }

    /// The descriptor configured for cookie `name`.
    pub fn descriptor(&self, name: &str) -> Option<&SubtreeDescriptor> {
        self.configs.get(name)
    }

    /// Decoded state of every configured cookie.
    ///
    /// Cookies that are absent, or that fail to decode, report their
    /// descriptor's default value; without one they are omitted.
    pub fn get_all(&self) -> CookieState {
        if self.runtime.is_browser() {
            return self.read_all();
        }

        if let Some(cached) = self.cache.read().expect("lock poisoned").as_ref() {
            return cached.clone();
        }
        let state = self.read_all();
        *self.cache.write().expect("lock poisoned") = Some(state.clone());
        state
    }

    /// Encode `state` and write it to cookie `name`.
    pub fn set(&self, name: &str, state: &StateTree) -> CookieResult<()> {
        let descriptor = self.lookup(name)?;
        let encoded = codec::encode(state, descriptor)?;
        self.transport
            .set(name, &encoded, &descriptor.cookie_options)?;
        debug!(cookie = name, bytes = encoded.len(), "state cookie written");

        if let Some(cache) = self.cache.write().expect("lock poisoned").as_mut() {
            cache.insert(name.to_string(), state.clone());
        }
        Ok(())
    }

    /// Remove cookie `name`.
    pub fn delete(&self, name: &str) -> CookieResult<()> {
        let descriptor = self.lookup(name)?;
        self.transport.delete(name, &descriptor.cookie_options)?;
        debug!(cookie = name, "state cookie deleted");

        if let Some(cache) = self.cache.write().expect("lock poisoned").as_mut() {
            match &descriptor.default_value {
                Some(default) => cache.insert(name.to_string(), default.clone()),
                None => cache.remove(name),
            };
        }
        Ok(())
    }

    fn lookup(&self, name: &str) -> CookieResult<&SubtreeDescriptor> {
        self.configs
            .get(name)
            .ok_or_else(|| CookieError::UnknownCookie(name.to_string()))
    }

    fn read_all(&self) -> CookieState {
        let mut state = CookieState::new();
        for (name, descriptor) in &self.configs {
            let decoded = match self.transport.get(name) {
                Some(raw) => match codec::decode(&raw, descriptor) {
                    Ok(value) => Some(value),
                    Err(e) => {
                        warn!(cookie = name.as_str(), error = %e, "ignoring undecodable cookie");
                        None
                    }
                },
                None => None,
            };
            if let Some(value) = decoded.or_else(|| descriptor.default_value.clone()) {
                state.insert(name.clone(), value);
            }
        }
        state
    }
}

impl fmt::Debug for StateCookies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateCookies")
            .field("runtime", &self.runtime)
            .field("cookies", &self.configs.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jarsync_types::{DeserializeFn, SerializeFn, StatePath};
    use serde_json::json;

    use crate::memory::MemoryCookieJar;
    use crate::request::HttpCookieJar;

    fn tree(value: serde_json::Value) -> StateTree {
        StateTree::from(value)
    }

    fn descriptor(path: &str) -> SubtreeDescriptor {
        SubtreeDescriptor::new(StatePath::parse(path).unwrap())
    }

    fn descriptors() -> Vec<SubtreeDescriptor> {
        vec![
            descriptor("compressed"),
            descriptor("plain").with_compress(false),
            descriptor("with.default").with_default_value(tree(json!("fallback"))),
            descriptor("locale")
                .with_cookie_name("NEXT_LOCALE")
                .with_compress(false)
                .with_codec(SerializeFn::plain_string(), DeserializeFn::plain_string()),
        ]
    }

    fn browser() -> (Arc<MemoryCookieJar>, StateCookies) {
        let jar = Arc::new(MemoryCookieJar::new());
        let mut cookies = StateCookies::browser(jar.clone());
        cookies.configure(&descriptors());
        (jar, cookies)
    }

    // -----------------------------------------------------------------------
    // Reading
    // -----------------------------------------------------------------------

    #[test]
    fn empty_jar_reports_only_defaults() {
        let (_, cookies) = browser();
        let all = cookies.get_all();
        assert_eq!(all.len(), 1);
        assert_eq!(all["with.default"], tree(json!("fallback")));
    }

    #[test]
    fn set_then_get_all() {
        let (jar, cookies) = browser();
        cookies.set("compressed", &tree(json!({"a": [1, 2]}))).unwrap();
        cookies.set("plain", &tree(json!("text"))).unwrap();
        cookies.set("NEXT_LOCALE", &tree(json!("de"))).unwrap();

        assert_eq!(jar.raw("plain").as_deref(), Some("%22text%22"));
        assert_eq!(jar.raw("NEXT_LOCALE").as_deref(), Some("de"));

        let all = cookies.get_all();
        assert_eq!(all["compressed"], tree(json!({"a": [1, 2]})));
        assert_eq!(all["plain"], tree(json!("text")));
        assert_eq!(all["NEXT_LOCALE"], tree(json!("de")));
    }

    #[test]
    fn unconfigured_cookies_are_ignored() {
        let (jar, cookies) = browser();
        jar.insert_raw("someone.else", "%22x%22");
        assert!(!cookies.get_all().contains_key("someone.else"));
    }

    #[test]
    fn tampered_cookie_is_treated_as_absent() {
        let (jar, cookies) = browser();
        jar.insert_raw("compressed", "garbage!");
        jar.insert_raw("with.default", "%7Bbroken");

        let all = cookies.get_all();
        assert!(!all.contains_key("compressed"));
        assert_eq!(all["with.default"], tree(json!("fallback")));
    }

    #[test]
    fn browser_rereads_out_of_band_changes() {
        let (jar, cookies) = browser();
        cookies.set("plain", &tree(json!(1))).unwrap();
        assert_eq!(cookies.get_all()["plain"], tree(json!(1)));

        jar.insert_raw("plain", "2");
        assert_eq!(cookies.get_all()["plain"], tree(json!(2)));
    }

    // -----------------------------------------------------------------------
    // Writing
    // -----------------------------------------------------------------------

    #[test]
    fn delete_falls_back_to_default() {
        let (jar, cookies) = browser();
        cookies.set("with.default", &tree(json!("custom"))).unwrap();
        assert_eq!(cookies.get_all()["with.default"], tree(json!("custom")));

        cookies.delete("with.default").unwrap();
        assert!(jar.raw("with.default").is_none());
        assert_eq!(cookies.get_all()["with.default"], tree(json!("fallback")));
    }

    #[test]
    fn unknown_cookie_is_an_error() {
        let (_, cookies) = browser();
        assert!(matches!(
            cookies.set("nope", &tree(json!(1))),
            Err(CookieError::UnknownCookie(name)) if name == "nope"
        ));
        assert!(matches!(
            cookies.delete("nope"),
            Err(CookieError::UnknownCookie(_))
        ));
    }

    #[test]
    fn cookie_options_are_forwarded() {
        let jar = Arc::new(MemoryCookieJar::new());
        let options = jarsync_types::CookieOptions {
            path: "/app".into(),
            secure: true,
            ..Default::default()
        };
        let mut cookies = StateCookies::browser(jar.clone());
        cookies.configure(&[descriptor("s").with_cookie_options(options.clone())]);

        cookies.set("s", &tree(json!(true))).unwrap();
        assert_eq!(jar.options("s"), Some(options));
    }

    #[test]
    fn oversized_state_is_an_error() {
        let (_, cookies) = browser();
        let huge: String = (0..6000).map(|i| char::from(b'a' + (i % 26) as u8)).collect();
        let err = cookies.set("plain", &tree(json!(huge))).unwrap_err();
        assert!(matches!(err, CookieError::TooLarge { .. }));
    }

    // -----------------------------------------------------------------------
    // Server caching
    // -----------------------------------------------------------------------

    #[test]
    fn server_caches_first_read() {
        let jar = Arc::new(HttpCookieJar::from_cookie_header("plain=1"));
        let mut cookies = StateCookies::server(jar);
        cookies.configure(&descriptors());

        let first = cookies.get_all();
        assert_eq!(first["plain"], tree(json!(1)));
        assert_eq!(cookies.get_all(), first);
    }

    #[test]
    fn server_cache_follows_own_writes() {
        let jar = Arc::new(HttpCookieJar::from_cookie_header("plain=1; with.default=%22x%22"));
        let mut cookies = StateCookies::server(jar.clone());
        cookies.configure(&descriptors());
        assert_eq!(cookies.get_all()["with.default"], tree(json!("x")));

        cookies.set("plain", &tree(json!(2))).unwrap();
        cookies.delete("with.default").unwrap();

        let all = cookies.get_all();
        assert_eq!(all["plain"], tree(json!(2)));
        assert_eq!(all["with.default"], tree(json!("fallback")));
        assert_eq!(jar.set_cookie_headers().len(), 2);
    }

    #[test]
    fn configure_drops_cache() {
        let jar = Arc::new(HttpCookieJar::from_cookie_header("plain=1"));
        let mut cookies = StateCookies::server(jar);
        cookies.configure(&descriptors());
        assert!(cookies.get_all().contains_key("plain"));

        cookies.configure(&[descriptor("compressed")]);
        assert!(cookies.get_all().is_empty());
        assert_eq!(cookies.runtime(), Runtime::Server);
    }
}
