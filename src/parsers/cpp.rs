use std::path::Path;
use tracing::warn;

use super::common::{read_source, string_literal_value, TreeSitterParser};
use super::ImportExtractor;
use crate::core::error::Result;

/// `#include "..."` extractor for C-family headers and translation units.
///
/// Only quoted includes are reported: angle-bracket includes name system or
/// toolchain headers that never live inside the analyzed tree. Includes
/// nested in preprocessor conditionals are found as well.
pub struct CppIncludeExtractor;

impl CppIncludeExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn extract_from_source(&self, source: &str) -> Result<Option<Vec<String>>> {
        let mut parser = TreeSitterParser::new(tree_sitter_cpp::language(), "cpp")?;
        let Some(tree) = parser.parse_source(source) else {
            return Ok(None);
        };

        let source_bytes = source.as_bytes();
        let mut targets = Vec::new();
        let mut stack = vec![tree.root_node()];

        // Depth-first, children pushed in reverse to keep source order.
        while let Some(node) = stack.pop() {
            if node.kind() == "preproc_include" {
                if let Some(path) = node.child_by_field_name("path") {
                    if path.kind() == "string_literal" {
                        let target = string_literal_value(&path, source_bytes);
                        if !target.is_empty() {
                            targets.push(target.to_string());
                        }
                    }
                }
                continue;
            }
            if is_include_container(node.kind()) {
                let mut cursor = node.walk();
                let children: Vec<_> = node.children(&mut cursor).collect();
                stack.extend(children.into_iter().rev());
            }
        }

        Ok(Some(targets))
    }
}

fn is_include_container(kind: &str) -> bool {
    matches!(
        kind,
        "translation_unit"
            | "preproc_if"
            | "preproc_ifdef"
            | "preproc_else"
            | "preproc_elif"
            | "linkage_specification"
            | "declaration_list"
            | "namespace_definition"
    )
}

impl Default for CppIncludeExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl ImportExtractor for CppIncludeExtractor {
    fn extract_imports(&self, file_path: &Path) -> Result<Vec<String>> {
        let source = read_source(file_path)?;
        match self.extract_from_source(&source)? {
            Some(targets) => Ok(targets),
            None => {
                warn!(
                    file = %file_path.display(),
                    "cpp parser produced no tree; no includes recorded"
                );
                Ok(Vec::new())
            }
        }
    }

    fn language_name(&self) -> &str {
        "cpp"
    }

    fn canonical_extension(&self) -> &str {
        "h"
    }

    // include paths are written out in full
    fn appends_extension(&self) -> bool {
        false
    }
}
