use crate::features::tow_providers::models::TowProvider;

/// Source of the tow providers an operator can dispatch to
pub trait ProviderDirectory: Send + Sync {
    /// All providers, in the order they should be offered
    fn providers(&self) -> Vec<TowProvider>;

    fn find(&self, name: &str) -> Option<TowProvider> {
        self.providers().into_iter().find(|p| p.matches_name(name))
    }
}

/// Directory backed by a fixed list loaded at startup
#[derive(Debug, Clone)]
pub struct StaticProviderDirectory {
    providers: Vec<TowProvider>,
}

impl StaticProviderDirectory {
    pub fn new(providers: Vec<TowProvider>) -> Self {
        Self { providers }
    }
}

impl Default for StaticProviderDirectory {
    fn default() -> Self {
        Self::new(TowProvider::defaults())
    }
}

impl ProviderDirectory for StaticProviderDirectory {
    fn providers(&self) -> Vec<TowProvider> {
        self.providers.clone()
    }
}
