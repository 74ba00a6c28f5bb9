//! Page registry seam.
//!
//! The page object model lives outside this crate. The server only asks
//! whether a page identifier is registered; [`InMemoryPageRegistry`] is the
//! built-in implementation used by the binary and tests.

use std::sync::Arc;

use dashmap::DashMap;

/// A registered application page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Canonical identifier, `"<segment>/<segment>"`.
    pub name: String,
}

impl Page {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Read-only lookup of registered pages.
///
/// Implementations must tolerate concurrent lookups from any number of
/// requests; the server holds no lock around calls.
pub trait PageRegistry: Send + Sync {
    /// Exact, case-sensitive lookup.
    fn lookup(&self, identifier: &str) -> Option<Arc<Page>>;

    fn contains(&self, identifier: &str) -> bool {
        self.lookup(identifier).is_some()
    }
}

/// Concurrent in-memory registry.
#[derive(Debug, Default)]
pub struct InMemoryPageRegistry {
    pages: DashMap<String, Arc<Page>>,
}

impl InMemoryPageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a list of identifiers.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let registry = Self::new();
        for name in names {
            registry.register(Page::new(name));
        }
        registry
    }

    /// Add or replace a page. Returns the previous entry, if any.
    pub fn register(&self, page: Page) -> Option<Arc<Page>> {
        tracing::debug!(page = %page.name, "Page registered");
        self.pages.insert(page.name.clone(), Arc::new(page))
    }

    pub fn unregister(&self, identifier: &str) -> Option<Arc<Page>> {
        self.pages.remove(identifier).map(|(_, page)| page)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

impl PageRegistry for InMemoryPageRegistry {
    fn lookup(&self, identifier: &str) -> Option<Arc<Page>> {
        self.pages.get(identifier).map(|entry| Arc::clone(entry.value()))
    }
}
