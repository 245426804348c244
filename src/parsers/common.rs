use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tree_sitter::{Language, Node as TSNode, Parser, Tree};

use crate::core::error::{AnalysisError, Result};

pub struct TreeSitterParser {
    parser: Parser,
}

impl TreeSitterParser {
    pub fn new(language: Language, language_name: &str) -> Result<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(language)
            .map_err(|err| AnalysisError::LanguageSetup {
                language: language_name.to_string(),
                message: err.to_string(),
            })?;
        Ok(Self { parser })
    }

    /// `None` when tree-sitter gives up on the input; callers treat that as
    /// a file without imports.
    pub fn parse_source(&mut self, source: &str) -> Option<Tree> {
        self.parser.parse(source, None)
    }
}

/// Buffered whole-file read. Any failure is an I/O error for that module;
/// invalid UTF-8 is replaced rather than rejected.
pub fn read_source(file_path: &Path) -> Result<String> {
    let read = || -> std::io::Result<Vec<u8>> {
        let file = File::open(file_path)?;
        let file_size = file.metadata()?.len() as usize;
        let mut reader = BufReader::with_capacity(file_size.clamp(1, 8192), file);
        let mut content = Vec::with_capacity(file_size);
        reader.read_to_end(&mut content)?;
        Ok(content)
    };
    let bytes = read().map_err(|err| AnalysisError::io(file_path, err))?;
    Ok(match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
    })
}

pub fn extract_text<'a>(node: &TSNode, source: &'a [u8]) -> &'a str {
    std::str::from_utf8(&source[node.byte_range()]).unwrap_or("")
}

/// Text of a string literal node without its delimiters.
pub fn string_literal_value<'a>(node: &TSNode, source: &'a [u8]) -> &'a str {
    extract_text(node, source).trim_matches(|c| c == '"' || c == '\'' || c == '`')
}

pub fn find_child_by_kind<'a>(node: &'a TSNode, kind: &str) -> Option<TSNode<'a>> {
    for child in node.children(&mut node.walk()) {
        if child.kind() == kind {
            return Some(child);
        }
    }
    None
}
