//! Build script: validates the embedded JSON catalogs at compile time.

use std::path::PathBuf;

fn read_config(manifest_dir: &str, file: &str) -> String {
    let path: PathBuf = [manifest_dir, "config", file].iter().collect();
    std::fs::read_to_string(&path).unwrap_or_else(|e| {
        panic!(
            "Failed to read {}: {}. {} must exist and be valid.",
            path.display(),
            e,
            file
        )
    })
}

fn main() {
    let manifest_dir =
        std::env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR set by Cargo");

    #[derive(serde::Deserialize)]
    #[allow(dead_code)]
    struct ModelEntry {
        id: String,
        name: String,
        provider: String,
        max_tokens: u32,
        supports_images: bool,
    }
    #[derive(serde::Deserialize)]
    #[allow(dead_code)]
    struct ModelCatalog {
        default: String,
        models: Vec<ModelEntry>,
    }
    let json = read_config(&manifest_dir, "models.json");
    let catalog: ModelCatalog = serde_json::from_str(&json).unwrap_or_else(|e| {
        panic!("models.json is invalid JSON: {}. Fix the file and rebuild.", e)
    });
    assert!(
        catalog.models.iter().any(|m| m.id == catalog.default),
        "models.json: default '{}' is not in the catalog",
        catalog.default
    );

    #[derive(serde::Deserialize)]
    #[allow(dead_code)]
    struct PlanEntry {
        ai_generations: i64,
    }
    let json = read_config(&manifest_dir, "plans.json");
    let plans: std::collections::HashMap<String, PlanEntry> = serde_json::from_str(&json)
        .unwrap_or_else(|e| {
            panic!("plans.json is invalid JSON: {}. Fix the file and rebuild.", e)
        });
    assert!(plans.contains_key("free"), "plans.json must define a 'free' plan");

    #[derive(serde::Deserialize)]
    #[allow(dead_code)]
    struct TemplateEntry {
        name: String,
        description: String,
        body: String,
    }
    let json = read_config(&manifest_dir, "builtin-templates.json");
    let _: Vec<TemplateEntry> = serde_json::from_str(&json).unwrap_or_else(|e| {
        panic!(
            "builtin-templates.json is invalid JSON: {}. Fix the file and rebuild.",
            e
        )
    });
}
