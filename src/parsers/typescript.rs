use std::path::Path;
use tree_sitter::{Language, Node as TSNode};
use tracing::warn;

use super::common::{find_child_by_kind, read_source, string_literal_value, TreeSitterParser};
use super::{with_canonical_extension, ImportExtractor};
use crate::core::error::Result;

const CANONICAL_EXTENSION: &str = "ts";

const KNOWN_EXTENSIONS: &[&str] = &[
    "ts", "tsx", "mts", "cts", "mjs", "cjs", "json", "css", "scss", "sass", "less", "svg",
    "png", "jpg", "jpeg", "gif", "vue", "wasm",
];

/// Syntax-tree based import extractor for TypeScript.
///
/// Works from the original source so type-only imports, which the
/// compiler erases from its output, still count as dependencies.
pub struct TypeScriptExtractor {
    tsx: bool,
}

impl TypeScriptExtractor {
    pub fn new() -> Self {
        Self { tsx: false }
    }

    /// Extractor using the TSX grammar.
    pub fn tsx() -> Self {
        Self { tsx: true }
    }

    fn language(&self) -> Language {
        if self.tsx {
            tree_sitter_typescript::language_tsx()
        } else {
            tree_sitter_typescript::language_typescript()
        }
    }

    pub fn extract_from_source(&self, source: &str) -> Result<Option<Vec<String>>> {
        let mut parser = TreeSitterParser::new(self.language(), "typescript")?;
        let Some(tree) = parser.parse_source(source) else {
            return Ok(None);
        };

        let source_bytes = source.as_bytes();
        let root = tree.root_node();
        let mut targets = Vec::new();
        let mut cursor = root.walk();

        for child in root.children(&mut cursor) {
            let specifier = match child.kind() {
                "import_statement" => Self::import_source(&child, source_bytes),
                "export_statement" => child
                    .child_by_field_name("source")
                    .map(|node| string_literal_value(&node, source_bytes)),
                _ => None,
            };
            if let Some(specifier) = specifier.filter(|s| !s.is_empty()) {
                targets.push(normalize_specifier(specifier));
            }
        }

        Ok(Some(targets))
    }

    fn import_source<'a>(import_node: &TSNode, source: &'a [u8]) -> Option<&'a str> {
        if let Some(node) = import_node.child_by_field_name("source") {
            return Some(string_literal_value(&node, source));
        }
        // import x = require("y")
        if let Some(require_clause) = find_child_by_kind(import_node, "import_require_clause") {
            let string = find_child_by_kind(&require_clause, "string")?;
            return Some(string_literal_value(&string, source));
        }
        // side-effect import on grammars that leave the string unnamed
        let string = find_child_by_kind(import_node, "string")?;
        Some(string_literal_value(&string, source))
    }
}

impl Default for TypeScriptExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Map the `.js` spelling used by ESM TypeScript back to the source file,
/// then append the canonical extension where none is written.
fn normalize_specifier(specifier: &str) -> String {
    let specifier = match specifier.strip_suffix(".js") {
        Some(stem) => format!("{stem}.{CANONICAL_EXTENSION}"),
        None => specifier.to_string(),
    };
    with_canonical_extension(&specifier, CANONICAL_EXTENSION, KNOWN_EXTENSIONS)
}

impl ImportExtractor for TypeScriptExtractor {
    fn extract_imports(&self, file_path: &Path) -> Result<Vec<String>> {
        let source = read_source(file_path)?;
        match self.extract_from_source(&source)? {
            Some(targets) => Ok(targets),
            None => {
                warn!(
                    file = %file_path.display(),
                    "typescript parser produced no tree; no imports recorded"
                );
                Ok(Vec::new())
            }
        }
    }

    fn language_name(&self) -> &str {
        "typescript"
    }

    fn canonical_extension(&self) -> &str {
        CANONICAL_EXTENSION
    }
}
