//! Platform detection
//!
//! Hostnames are matched by substring containment against each platform's
//! domains; the first platform in table order wins.

use crate::platform::Platform;
use crate::registry::PlatformRegistry;

impl PlatformRegistry {
    /// Platform serving `hostname`, if any
    pub fn detect(&self, hostname: &str) -> Option<&Platform> {
        let host = hostname.to_ascii_lowercase();
        let found = self.iter().find(|p| p.matches_host(&host));
        match found {
            Some(p) => tracing::debug!("platform detected: {} ({})", p.display_name, p.id),
            None => tracing::debug!("no supported platform for {:?}", hostname),
        }
        found
    }

    pub fn is_supported(&self, hostname: &str) -> bool {
        self.detect(hostname).is_some()
    }

    /// Detect by the host of a full URL. Unparsable URLs detect nothing.
    pub fn detect_url(&self, url: &str) -> Option<&Platform> {
        let parsed = url::Url::parse(url).ok()?;
        self.detect(parsed.host_str()?)
    }
}
