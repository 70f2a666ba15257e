use url::Url;

/// The page's address bar.
pub trait PageLocationPort: Send + Sync {
    fn current_url(&self) -> Url;

    /// Rewrites the address without navigating.
    fn replace_url(&self, url: Url);

    /// Leaves the page. Nothing held in memory survives this.
    fn navigate_away(&self, url: &str);
}
