use anyhow::Result;
use serde_json::json;
use std::fs;
use std::path::Path;

use super::view_model::ViewModel;
use crate::core::{Analysis, EntityKind};

/// Writes the view model as JSON for the external viewer.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    pub fn new() -> Self {
        Self { pretty: true }
    }

    pub fn compact(mut self) -> Self {
        self.pretty = false;
        self
    }

    pub fn format_to_file(&self, analysis: &Analysis, output_path: &Path) -> Result<()> {
        let json_content = self.format(analysis)?;
        fs::write(output_path, json_content)?;
        Ok(())
    }

    pub fn format(&self, analysis: &Analysis) -> Result<String> {
        let model = ViewModel::from_analysis(analysis);
        let tree = &analysis.tree;
        let (packages, modules) = tree.ids().fold((0usize, 0usize), |(p, m), id| {
            match tree.entity(id).kind() {
                EntityKind::Package => (p + 1, m),
                EntityKind::Module => (p, m + 1),
            }
        });

        let output = json!({
            "meta": {
                "packages": packages,
                "modules": modules,
                "dependencies": model.dependencies.len(),
                "feedback": model.feedback.len()
            },
            "root": model.root,
            "dependencies": model.dependencies,
            "feedback": model.feedback
        });

        if self.pretty {
            Ok(serde_json::to_string_pretty(&output)?)
        } else {
            Ok(serde_json::to_string(&output)?)
        }
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}
