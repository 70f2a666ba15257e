use std::sync::Mutex;

use gw_core::ports::PageLocationPort;
use tracing::info;
use url::Url;

/// Address bar of a page that never actually leaves.
///
/// Navigations are recorded so the host can follow them (open a browser,
/// print the link) and tests can assert on them.
pub struct SessionLocation {
    current: Mutex<Url>,
    navigations: Mutex<Vec<String>>,
}

impl SessionLocation {
    pub fn new(url: Url) -> Self {
        Self {
            current: Mutex::new(url),
            navigations: Mutex::new(Vec::new()),
        }
    }

    /// Simulates the page being loaded at `url`, e.g. after a redirect back.
    pub fn load(&self, url: Url) {
        if let Ok(mut current) = self.current.lock() {
            *current = url;
        }
    }

    pub fn navigations(&self) -> Vec<String> {
        self.navigations
            .lock()
            .map(|navigations| navigations.clone())
            .unwrap_or_default()
    }
}

impl PageLocationPort for SessionLocation {
    fn current_url(&self) -> Url {
        match self.current.lock() {
            Ok(current) => current.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn replace_url(&self, url: Url) {
        self.load(url);
    }

    fn navigate_away(&self, url: &str) {
        info!(url, "navigating away");
        if let Ok(mut navigations) = self.navigations.lock() {
            navigations.push(url.to_string());
        }
    }
}
