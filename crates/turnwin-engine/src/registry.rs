//! Platform registry

use crate::platform::{BUILTIN, Platform, PlatformId, PlatformSpec};

/// Ordered table of compiled platforms. Table order breaks detection ties.
#[derive(Debug, Clone)]
pub struct PlatformRegistry {
    platforms: Vec<Platform>,
}

impl PlatformRegistry {
    /// Registry of the built-in chat sites
    pub fn builtin() -> Self {
        Self::from_specs(&BUILTIN)
    }

    pub fn from_specs(specs: &[PlatformSpec]) -> Self {
        let platforms: Vec<_> = specs.iter().map(PlatformSpec::compile).collect();
        tracing::debug!("compiled {} platforms", platforms.len());
        Self { platforms }
    }

    pub fn get(&self, id: PlatformId) -> Option<&Platform> {
        self.platforms.iter().find(|p| p.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Platform> {
        self.platforms.iter()
    }

    pub fn len(&self) -> usize {
        self.platforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.platforms.is_empty()
    }
}

impl Default for PlatformRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
