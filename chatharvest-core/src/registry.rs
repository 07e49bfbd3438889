use crate::error::{HarvestError, Result};
use crate::profile::SiteProfile;
use crate::provider::{Provider, SiteProvider};

/// Explicit identity → provider mapping, in listing order.
pub struct Registry {
    providers: Vec<Box<dyn Provider>>,
}

impl Registry {
    pub fn new(providers: Vec<Box<dyn Provider>>) -> Self {
        Self { providers }
    }

    /// Every site this build knows how to harvest.
    pub fn builtin() -> Self {
        Self::new(vec![
            Box::new(SiteProvider::new(SiteProfile::gemini())),
            Box::new(SiteProvider::new(SiteProfile::chatgpt())),
        ])
    }

    pub fn resolve(&self, identity: &str) -> Result<&dyn Provider> {
        let wanted = identity.trim();
        self.providers
            .iter()
            .find(|provider| provider.identity().eq_ignore_ascii_case(wanted))
            .map(|provider| &**provider)
            .ok_or_else(|| HarvestError::unknown_provider(wanted, &self.list_identities()))
    }

    pub fn list_identities(&self) -> Vec<&str> {
        self.providers.iter().map(|provider| provider.identity()).collect()
    }

    pub fn providers(&self) -> impl Iterator<Item = &dyn Provider> {
        self.providers.iter().map(|provider| &**provider)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::builtin()
    }
}
