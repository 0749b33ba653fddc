//! Content templates: reusable prompt bodies with `{variable}` placeholders.
//!
//! Built-in templates ship embedded from `config/builtin-templates.json`;
//! user templates live in `templates.json` under the config directory.

mod validation;

use std::collections::HashMap;
use std::fs;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::core::paths;

/// A prompt template for one kind of social post.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentTemplate {
    pub name: String,
    pub description: String,
    pub body: String,
}

/// Error loading, saving, or rendering templates.
#[derive(Debug, thiserror::Error)]
pub enum TemplatesError {
    #[error("Failed to read templates file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Missing value for template variable {{{0}}}")]
    MissingVariable(String),
}

impl TemplatesError {
    /// User-friendly message when falling back to built-in templates only (safe mode).
    pub fn safe_mode_message(&self) -> String {
        let detail = match self {
            TemplatesError::Io(_) => "could not read file".to_string(),
            TemplatesError::Json(_) => "invalid JSON".to_string(),
            TemplatesError::Validation(msg) => format!("validation error: {}", msg),
            TemplatesError::MissingVariable(name) => format!("missing variable '{}'", name),
        };
        format!("templates.json: {} — using built-in templates only", detail)
    }
}

fn variable_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\{([A-Za-z0-9_]+)\}").expect("valid regex"))
}

impl ContentTemplate {
    /// Placeholder names in the body, in order of first appearance.
    pub fn variables(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        variable_pattern()
            .captures_iter(&self.body)
            .map(|c| c[1].to_string())
            .filter(|name| seen.insert(name.clone()))
            .collect()
    }

    /// Substitute every placeholder. Errors on the first variable with no value.
    pub fn render(&self, values: &HashMap<String, String>) -> Result<String, TemplatesError> {
        let mut missing = None;
        let rendered = variable_pattern().replace_all(&self.body, |caps: &regex::Captures| {
            let name = &caps[1];
            match values.get(name) {
                Some(value) => value.clone(),
                None => {
                    if missing.is_none() {
                        missing = Some(name.to_string());
                    }
                    String::new()
                }
            }
        });
        if let Some(name) = missing {
            return Err(TemplatesError::MissingVariable(name));
        }
        Ok(rendered.into_owned())
    }
}

static BUILTIN_TEMPLATES: OnceLock<Vec<ContentTemplate>> = OnceLock::new();

/// Built-in templates, loaded from the embedded catalog on first access.
pub fn builtin_templates() -> &'static [ContentTemplate] {
    BUILTIN_TEMPLATES.get_or_init(|| {
        let json = include_str!("../../../config/builtin-templates.json");
        serde_json::from_str(json).expect("builtin-templates.json must be valid")
    })
}

/// Returns true if the given name conflicts with a built-in template (case-insensitive).
pub fn is_builtin_name(name: &str) -> bool {
    builtin_templates()
        .iter()
        .any(|t| t.name.eq_ignore_ascii_case(name))
}

/// Load user templates from `templates.json` in the config directory.
/// Returns empty vec if the file is absent. Errors on invalid content.
pub fn load_user_templates() -> Result<Vec<ContentTemplate>, TemplatesError> {
    let path = match paths::config_dir() {
        Some(dir) => dir.join("templates.json"),
        None => return Ok(vec![]),
    };

    if !path.exists() {
        return Ok(vec![]);
    }

    let content = fs::read_to_string(&path)?;
    let file: validation::TemplatesFile = serde_json::from_str(&content)?;
    let builtin_set: std::collections::HashSet<String> = builtin_templates()
        .iter()
        .map(|t| t.name.to_lowercase())
        .collect();
    validation::validate_and_convert(file, &builtin_set)
}

/// Save user templates to `templates.json` in the config directory.
/// Creates the config dir if needed.
pub fn save_user_templates(templates: &[ContentTemplate]) -> Result<(), TemplatesError> {
    let dir = paths::config_dir()
        .ok_or_else(|| TemplatesError::Validation("No config directory available".to_string()))?;
    fs::create_dir_all(&dir)?;

    let file = validation::TemplatesFile {
        templates: templates.to_vec(),
    };
    let path = dir.join("templates.json");
    let content = serde_json::to_string_pretty(&file)?;
    fs::write(path, content)?;
    Ok(())
}

/// Validate and add one user template, persisting the updated file.
pub fn add_user_template(template: ContentTemplate) -> Result<(), TemplatesError> {
    let mut user = load_user_templates()?;
    user.push(template);
    let builtin_set: std::collections::HashSet<String> = builtin_templates()
        .iter()
        .map(|t| t.name.to_lowercase())
        .collect();
    let validated =
        validation::validate_and_convert(validation::TemplatesFile { templates: user }, &builtin_set)?;
    save_user_templates(&validated)
}

/// Remove a user template by name. Returns false when no such template exists.
/// Built-in templates cannot be removed.
pub fn remove_user_template(name: &str) -> Result<bool, TemplatesError> {
    if is_builtin_name(name) {
        return Err(TemplatesError::Validation(format!(
            "'{}' is a built-in template and cannot be removed",
            name
        )));
    }
    let mut user = load_user_templates()?;
    let before = user.len();
    user.retain(|t| !t.name.eq_ignore_ascii_case(name));
    if user.len() == before {
        return Ok(false);
    }
    save_user_templates(&user)?;
    Ok(true)
}

/// Find a template by name among builtins and the given user templates.
/// User templates cannot shadow builtins, so lookup order does not matter.
pub fn find_template<'a>(
    name: &str,
    user_templates: &'a [ContentTemplate],
) -> Option<&'a ContentTemplate> {
    builtin_templates()
        .iter()
        .chain(user_templates.iter())
        .find(|t| t.name.eq_ignore_ascii_case(name))
}
