//! Template store
//!
//! Loads note templates and the variable pools used to fill their title
//! patterns from a JSON document of the form:
//!
//! ```json
//! {
//!   "templates": { "t1": { "name": "...", "title_pattern": "{pain}? try this", ... } },
//!   "variables": { "pain": ["Listing takes hours", "Prices drift"] }
//! }
//! ```

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use crate::config::ContentStrategyConfig;
use crate::error::{ConfigError, Result};
use crate::types::Template;

/// Variable name to candidate substitutions
pub type VariablePool = HashMap<String, Vec<String>>;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TemplateStore {
    templates: HashMap<String, Template>,
    #[serde(default)]
    variables: VariablePool,
}

impl TemplateStore {
    /// Load templates from a JSON file
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let mut store: TemplateStore =
            serde_json::from_str(content).map_err(ConfigError::TemplateParseError)?;
        for (id, template) in store.templates.iter_mut() {
            template.id = id.clone();
        }
        Ok(store)
    }

    /// Resolve a template id
    pub fn get(&self, id: &str) -> Result<&Template> {
        self.templates
            .get(id)
            .ok_or_else(|| ConfigError::UnknownTemplate(id.to_string()).into())
    }

    pub fn variables(&self) -> &VariablePool {
        &self.variables
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Check that every template referenced by a content type exists
    pub fn verify_references(&self, strategy: &ContentStrategyConfig) -> Result<()> {
        for content_type in &strategy.content_types {
            for id in &content_type.templates {
                self.get(id)?;
            }
        }
        Ok(())
    }
}
