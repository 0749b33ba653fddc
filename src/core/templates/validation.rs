//! Template validation: disk format and conversion to ContentTemplate.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::{ContentTemplate, TemplatesError};

/// JSON structure on disk.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct TemplatesFile {
    pub(super) templates: Vec<ContentTemplate>,
}

/// Validate file entries and return the user template list.
pub(crate) fn validate_and_convert(
    file: TemplatesFile,
    builtin_names: &HashSet<String>,
) -> Result<Vec<ContentTemplate>, TemplatesError> {
    let mut seen = HashSet::new();
    let mut result = Vec::with_capacity(file.templates.len());

    for (i, entry) in file.templates.into_iter().enumerate() {
        // name: alphanumeric, hyphens, underscores
        if entry.name.is_empty() {
            return Err(TemplatesError::Validation(format!(
                "Template at index {}: name cannot be empty",
                i
            )));
        }
        if !entry
            .name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(TemplatesError::Validation(format!(
                "Template '{}': name must contain only letters, numbers, hyphens, and underscores",
                entry.name
            )));
        }
        let name_lower = entry.name.to_lowercase();

        // collision with built-in
        if builtin_names.contains(&name_lower) {
            return Err(TemplatesError::Validation(format!(
                "Template '{}': name conflicts with built-in template",
                entry.name
            )));
        }

        // duplicate within file
        if !seen.insert(name_lower) {
            return Err(TemplatesError::Validation(format!(
                "Duplicate template name '{}'",
                entry.name
            )));
        }

        // description and body non-empty
        if entry.description.trim().is_empty() {
            return Err(TemplatesError::Validation(format!(
                "Template '{}': description cannot be empty",
                entry.name
            )));
        }
        if entry.body.trim().is_empty() {
            return Err(TemplatesError::Validation(format!(
                "Template '{}': body cannot be empty",
                entry.name
            )));
        }

        result.push(entry);
    }

    Ok(result)
}
