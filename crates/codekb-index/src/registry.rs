//! Ordered extractor lookup built from the active extension selection.

use std::path::Path;

#[cfg(feature = "lang-go")]
use crate::extract::go::GoExtractor;
use crate::extract::javascript::JavaScriptExtractor;
use crate::extract::php::PhpExtractor;
use crate::extract::python::PythonExtractor;
use crate::extract::text::TextExtractor;
use crate::extract::{Extractor, extension_of, normalize_extension};

/// Extractors in registration order. Resolution is first-registered-wins.
#[derive(Default)]
pub struct ParserRegistry {
    extractors: Vec<Box<dyn Extractor>>,
}

impl ParserRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the registry for a set of configured extensions. Extractors are
    /// registered only when at least one of their extensions is selected.
    #[must_use]
    pub fn for_extensions(extensions: &[String], token_limit: usize) -> Self {
        let selected: Vec<String> = extensions.iter().map(|e| normalize_extension(e)).collect();
        let wants = |extractor: &dyn Extractor| selected.iter().any(|e| extractor.can_handle(e));

        let mut candidates: Vec<Box<dyn Extractor>> = vec![
            Box::new(PythonExtractor),
            Box::new(JavaScriptExtractor),
            Box::new(PhpExtractor),
        ];
        #[cfg(feature = "lang-go")]
        candidates.push(Box::new(GoExtractor));
        candidates.push(Box::new(TextExtractor::new(token_limit)));

        let mut registry = Self::new();
        for extractor in candidates {
            if wants(&*extractor) {
                registry.register(extractor);
            }
        }

        tracing::debug!(extractors = ?registry.names(), "parser registry built");
        registry
    }

    pub fn register(&mut self, extractor: Box<dyn Extractor>) {
        self.extractors.push(extractor);
    }

    /// First extractor that handles `extension` (case and leading dot ignored).
    #[must_use]
    pub fn resolve(&self, extension: &str) -> Option<&dyn Extractor> {
        let extension = normalize_extension(extension);
        self.extractors
            .iter()
            .find(|e| e.can_handle(&extension))
            .map(|e| &**e)
    }

    #[must_use]
    pub fn resolve_path(&self, path: &Path) -> Option<&dyn Extractor> {
        self.resolve(&extension_of(path)?)
    }

    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.extractors.iter().map(|e| e.name()).collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.extractors.is_empty()
    }
}

impl std::fmt::Debug for ParserRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParserRegistry")
            .field("extractors", &self.names())
            .finish()
    }
}
