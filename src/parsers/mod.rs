pub mod common;
pub mod cpp;
pub mod javascript;
pub mod pairing;
pub mod typescript;

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::core::error::Result;

/// A language capability: turns one source file into its raw import
/// targets, in source order. Each call re-reads the file.
pub trait ImportExtractor: Send + Sync {
    fn extract_imports(&self, file_path: &Path) -> Result<Vec<String>>;
    fn language_name(&self) -> &str;
    /// Extension appended to specifiers written without one.
    fn canonical_extension(&self) -> &str;
    /// Whether bare specifiers get the canonical extension. Resolution only
    /// tries sibling extensions for targets that were completed this way.
    fn appends_extension(&self) -> bool {
        true
    }
}

#[derive(Clone)]
struct Registration {
    extension: String,
    extractor: Arc<dyn ImportExtractor>,
}

/// File extension to [`ImportExtractor`] mapping.
#[derive(Clone, Default)]
pub struct ExtractorRegistry {
    registrations: Vec<Registration>,
    by_extension: HashMap<String, usize>,
}

impl ExtractorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the ECMAScript scanner, the TypeScript extractor and the
    /// C-family include extractor.
    pub fn with_builtins() -> Result<Self> {
        let mut registry = Self::new();
        let javascript: Arc<dyn ImportExtractor> = Arc::new(javascript::JavaScriptScanner::new()?);
        for ext in ["js", "mjs", "cjs", "jsx"] {
            registry.register(ext, Arc::clone(&javascript));
        }
        registry.register("ts", Arc::new(typescript::TypeScriptExtractor::new()));
        registry.register("tsx", Arc::new(typescript::TypeScriptExtractor::tsx()));
        let cpp: Arc<dyn ImportExtractor> = Arc::new(cpp::CppIncludeExtractor::new());
        for ext in pairing::HEADER_EXTENSIONS
            .iter()
            .chain(pairing::SOURCE_EXTENSIONS)
        {
            registry.register(ext, Arc::clone(&cpp));
        }
        Ok(registry)
    }

    /// Add or replace the capability for `extension` (without the dot).
    pub fn register(&mut self, extension: &str, extractor: Arc<dyn ImportExtractor>) {
        let extension = extension.trim_start_matches('.').to_lowercase();
        match self.by_extension.get(&extension) {
            Some(&slot) => self.registrations[slot].extractor = extractor,
            None => {
                self.by_extension
                    .insert(extension.clone(), self.registrations.len());
                self.registrations.push(Registration {
                    extension,
                    extractor,
                });
            }
        }
    }

    pub fn get(&self, extension: &str) -> Option<&Arc<dyn ImportExtractor>> {
        let slot = self.by_extension.get(&extension.to_lowercase())?;
        Some(&self.registrations[*slot].extractor)
    }

    pub fn for_path(&self, path: &Path) -> Option<&Arc<dyn ImportExtractor>> {
        let extension = path.extension()?.to_str()?;
        self.get(extension)
    }

    /// Extensions registered for `language`, in registration order.
    pub fn extensions_for(&self, language: &str) -> Vec<&str> {
        self.registrations
            .iter()
            .filter(|registration| registration.extractor.language_name() == language)
            .map(|registration| registration.extension.as_str())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }
}

/// Append `canonical` to `specifier` unless its last segment already ends
/// in one of the `known` extensions.
pub fn with_canonical_extension(specifier: &str, canonical: &str, known: &[&str]) -> String {
    let last_segment = specifier.rsplit('/').next().unwrap_or(specifier);
    if last_segment.is_empty() || last_segment == "." || last_segment == ".." {
        return specifier.to_string();
    }
    let has_known_extension = match last_segment.rsplit_once('.') {
        Some((stem, ext)) => {
            !stem.is_empty() && known.iter().any(|k| k.eq_ignore_ascii_case(ext))
        }
        None => false,
    };
    if has_known_extension {
        specifier.to_string()
    } else {
        format!("{specifier}.{canonical}")
    }
}
