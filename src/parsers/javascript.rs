use regex::Regex;
use std::path::Path;

use super::common::read_source;
use super::{with_canonical_extension, ImportExtractor};
use crate::core::error::{AnalysisError, Result};

const CANONICAL_EXTENSION: &str = "js";

/// Extensions that already name a concrete file; specifiers ending in one of
/// these are left untouched.
const KNOWN_EXTENSIONS: &[&str] = &[
    "js", "mjs", "cjs", "jsx", "ts", "tsx", "mts", "cts", "json", "css", "scss", "sass", "less",
    "svg", "png", "jpg", "jpeg", "gif", "vue", "wasm", "node",
];

/// Line-oriented import scanner for ECMAScript modules.
///
/// Comments are stripped per physical line (block comment and template
/// literal state carries across lines), import statements spanning several
/// lines are joined, and each complete statement is matched against the
/// supported forms. Anything that does not match is skipped.
pub struct JavaScriptScanner {
    import_start: Regex,
    reexport_start: Regex,
    statement_end: Regex,
    import_from: Regex,
    side_effect: Regex,
    reexport_from: Regex,
}

impl JavaScriptScanner {
    pub fn new() -> Result<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|err| AnalysisError::LanguageSetup {
                language: "javascript".to_string(),
                message: err.to_string(),
            })
        };
        let binding = r"[\w$]+";
        let clause_tail = r#"\s*from\s*["']([^"'\s]+)["'](?:\s+(?:assert|with)\s*\{[^{}]*\})?\s*$"#;
        Ok(Self {
            import_start: compile(r#"^import(?:\s|[{*"'])"#)?,
            reexport_start: compile(r"^export\s+(?:type\s+)?(?:\*|\{)")?,
            statement_end: compile(r#"(?:;|["'](?:\s+(?:assert|with)\s*\{[^{}]*\})?)\s*$"#)?,
            import_from: compile(&format!(
                r"^import\s+(?:type\s+)?(?:{binding}\s*,\s*)?(?:{binding}|\*\s*as\s+{binding}|\{{[^{{}}]*\}}){clause_tail}"
            ))?,
            side_effect: compile(r#"^import\s*["']([^"'\s]+)["']\s*$"#)?,
            reexport_from: compile(&format!(
                r"^export\s+(?:type\s+)?(?:\*(?:\s*as\s+{binding})?|\{{[^{{}}]*\}}){clause_tail}"
            ))?,
        })
    }

    /// Raw import targets of `source`, in order of appearance.
    pub fn scan_source(&self, source: &str) -> Vec<String> {
        let mut stripper = CommentStripper::default();
        let mut targets = Vec::new();
        let mut pending: Option<String> = None;

        for physical_line in source.lines() {
            let line = stripper.strip_line(physical_line);
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            if let Some(mut buffer) = pending.take() {
                if !self.starts_statement(trimmed) {
                    buffer.push(' ');
                    buffer.push_str(trimmed);
                    if self.statement_end.is_match(&buffer) {
                        self.collect(&buffer, &mut targets);
                    } else {
                        pending = Some(buffer);
                    }
                    continue;
                }
                // A new statement starts before the previous one closed.
                self.collect(&buffer, &mut targets);
            }

            if let Some(start) = self.statement_start(trimmed) {
                let statement = &trimmed[start..];
                if self.statement_end.is_match(statement) {
                    self.collect(statement, &mut targets);
                } else {
                    pending = Some(statement.to_string());
                }
            }
        }

        if let Some(buffer) = pending {
            self.collect(&buffer, &mut targets);
        }

        targets
    }

    fn starts_statement(&self, line: &str) -> bool {
        self.import_start.is_match(line) || self.reexport_start.is_match(line)
    }

    /// Byte offset of the first import or re-export on `line`, which may
    /// follow other statements.
    fn statement_start(&self, line: &str) -> Option<usize> {
        split_statements(line).into_iter().find_map(|(offset, segment)| {
            let statement = segment.trim_start();
            self.starts_statement(statement)
                .then(|| offset + segment.len() - statement.len())
        })
    }

    fn collect(&self, logical_line: &str, targets: &mut Vec<String>) {
        for (_, statement) in split_statements(logical_line) {
            if let Some(target) = self.match_statement(statement.trim()) {
                targets.push(with_canonical_extension(
                    target,
                    CANONICAL_EXTENSION,
                    KNOWN_EXTENSIONS,
                ));
            }
        }
    }

    fn match_statement<'a>(&self, statement: &'a str) -> Option<&'a str> {
        [&self.import_from, &self.side_effect, &self.reexport_from]
            .into_iter()
            .find_map(|pattern| pattern.captures(statement))
            .and_then(|captures| captures.get(1))
            .map(|target| target.as_str())
    }
}

/// Split on `;` outside string and template literals, keeping each piece's
/// byte offset.
fn split_statements(text: &str) -> Vec<(usize, &str)> {
    let mut statements = Vec::new();
    let mut start = 0;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (index, c) in text.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' | '`' => quote = Some(c),
            ';' => {
                statements.push((start, &text[start..index]));
                start = index + 1;
            }
            _ => {}
        }
    }
    statements.push((start, &text[start..]));
    statements
}

impl ImportExtractor for JavaScriptScanner {
    fn extract_imports(&self, file_path: &Path) -> Result<Vec<String>> {
        let source = read_source(file_path)?;
        Ok(self.scan_source(&source))
    }

    fn language_name(&self) -> &str {
        "javascript"
    }

    fn canonical_extension(&self) -> &str {
        CANONICAL_EXTENSION
    }
}

/// Removes comments from one physical line at a time.
///
/// String literals on a line are kept verbatim so import specifiers survive.
/// The body of a template literal that began on an earlier line is blanked,
/// which keeps import-like text inside multi-line templates from matching.
#[derive(Debug, Default)]
struct CommentStripper {
    in_block_comment: bool,
    in_template: bool,
}

impl CommentStripper {
    fn strip_line(&mut self, line: &str) -> String {
        let mut out = String::with_capacity(line.len());
        let mut chars = line.chars().peekable();
        let mut quote: Option<char> = None;
        let mut carried_template = self.in_template;

        while let Some(c) = chars.next() {
            if self.in_block_comment {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    self.in_block_comment = false;
                    out.push(' ');
                }
                continue;
            }

            if self.in_template {
                match c {
                    '\\' => {
                        chars.next();
                    }
                    '`' => {
                        self.in_template = false;
                        if !carried_template {
                            out.push(c);
                        }
                        carried_template = false;
                        continue;
                    }
                    _ => {}
                }
                if !carried_template {
                    out.push(c);
                }
                continue;
            }

            if let Some(q) = quote {
                out.push(c);
                if c == '\\' {
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                } else if c == q {
                    quote = None;
                }
                continue;
            }

            match c {
                '/' if chars.peek() == Some(&'/') => break,
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    self.in_block_comment = true;
                }
                '"' | '\'' => {
                    quote = Some(c);
                    out.push(c);
                }
                '`' => {
                    self.in_template = true;
                    carried_template = false;
                    out.push(c);
                }
                _ => out.push(c),
            }
        }

        out
    }
}
