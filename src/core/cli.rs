//! CLI-only command runners: config info, models, templates, history, generation.
//!
//! These produce plain text output and exit non-zero on user-facing errors.

use std::collections::HashMap;
use std::env;
use std::io::{self, Read};
use std::sync::Arc;

use crate::core::config::{self, Config, ConfigError};
use crate::core::generation::{GenerationInput, Generator, HttpGenerationClient};
use crate::core::history::{DurableStore, FallbackCache, HistoryStore, HttpHistoryStore};
use crate::core::models::ModelRegistry;
use crate::core::monitor::{LogMonitor, Monitor};
use crate::core::paths;
use crate::core::persistence;
use crate::core::quota::{self, PlanQuota, QuotaSource};
use crate::core::session;
use crate::core::templates;
use crate::core::util;

/// Run the `config` command: display paths, model, and session status.
pub fn run_config() {
    let registry = ModelRegistry::builtin();

    let config_dir = paths::config_dir()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "—".to_string());
    let data_dir = paths::data_dir()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "—".to_string());

    let model = config::resolve_model_id(&registry);

    println!("Config:   {}", config_dir);
    println!("History:  {}", data_dir);
    println!("Model:    {} ({})", model, model_source());
    match session::resolve() {
        Some(s) => {
            println!("Token:    set ✓");
            println!(
                "Account:  {}",
                s.user_id.as_deref().unwrap_or("anonymous")
            );
            println!("Plan:     {}", s.plan);
        }
        None => println!("Token:    not set"),
    }
}

fn model_source() -> &'static str {
    if persistence::load_default_model().is_some() {
        "from default_model"
    } else if env::var("POSTSMITH_MODEL")
        .ok()
        .filter(|s| !s.is_empty())
        .is_some()
    {
        "from POSTSMITH_MODEL"
    } else {
        "catalog default"
    }
}

/// Run the `config set-token` command: store the access token.
pub fn run_config_set_token(token: Option<String>) {
    let token = match token {
        Some(t) if !t.trim().is_empty() => t.trim().to_string(),
        _ => {
            let mut buf = String::new();
            if let Err(e) = io::stdin().read_to_string(&mut buf) {
                eprintln!("Error reading from stdin: {}", e);
                std::process::exit(1);
            }
            let trimmed = buf.trim().to_string();
            if trimmed.is_empty() {
                eprintln!("Error: no token provided");
                std::process::exit(1);
            }
            trimmed
        }
    };

    match session::store_token(&token) {
        Ok(()) => {
            let path = session::credentials_path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "config directory".to_string());
            println!("Access token saved to {}", path);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Run the `models` command: list the catalog, optionally filtered.
pub fn run_models(query: Option<&str>) {
    let registry = ModelRegistry::builtin();
    let filtered = match query {
        Some(q) => registry.filter(q),
        None => registry.all().iter().collect(),
    };

    if filtered.is_empty() {
        println!("No models found.");
        return;
    }

    let default_id = config::resolve_model_id(&registry);
    let id_w = filtered.iter().map(|m| m.id.len()).max().unwrap_or(20).max(20);
    let name_w = filtered.iter().map(|m| m.name.len()).max().unwrap_or(20).max(20);

    println!(
        "{:<id_w$}  {:<name_w$}  {:<10}  {:>8}  {}",
        "ID", "Name", "Provider", "Max tok", "Images"
    );
    for m in &filtered {
        let marker = if m.id == default_id { " (default)" } else { "" };
        println!(
            "{:<id_w$}  {:<name_w$}  {:<10}  {:>8}  {}{}",
            m.id,
            m.name,
            m.provider,
            m.max_tokens,
            if m.supports_images { "yes" } else { "no" },
            marker
        );
    }
}

/// Run the `models set-default` command: validate and persist a new default.
pub fn run_models_set_default(model_id: &str) {
    let mut registry = ModelRegistry::builtin();
    if let Err(e) = registry.set_default_model(model_id) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    match persistence::save_default_model(model_id) {
        Ok(()) => println!("Default model set to {}", model_id),
        Err(e) => {
            eprintln!("Error: failed to persist default model: {}", e);
            std::process::exit(1);
        }
    }
}

/// Run the `templates` command: list builtin and user templates.
pub fn run_templates() {
    let user = load_user_templates_or_warn();

    for t in templates::builtin_templates() {
        print_template(t, "builtin");
    }
    for t in &user {
        print_template(t, "user");
    }
}

fn print_template(t: &templates::ContentTemplate, kind: &str) {
    let vars = t.variables();
    let vars = if vars.is_empty() {
        "—".to_string()
    } else {
        vars.join(", ")
    };
    println!("{:<12}  [{}]  {}  (vars: {})", t.name, kind, t.description, vars);
}

/// Run the `templates add` command: validate and persist a user template.
pub fn run_templates_add(name: String, description: String, body: String) {
    let template = templates::ContentTemplate {
        name,
        description,
        body,
    };
    match templates::add_user_template(template) {
        Ok(()) => println!("Template added."),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Run the `templates remove` command.
pub fn run_templates_remove(name: &str) {
    match templates::remove_user_template(name) {
        Ok(true) => println!("Template '{}' removed.", name),
        Ok(false) => {
            eprintln!("Error: no user template named '{}'", name);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn load_user_templates_or_warn() -> Vec<templates::ContentTemplate> {
    templates::load_user_templates().unwrap_or_else(|e| {
        eprintln!("Warning: {}", e.safe_mode_message());
        vec![]
    })
}

/// Build the session's history store: durable + cache when signed in,
/// cache only otherwise.
async fn open_history_store(config: Option<&Config>, monitor: Arc<dyn Monitor>) -> HistoryStore {
    let cache = FallbackCache::open_default();
    let mut store = match config {
        Some(config) if config.session.user_id.is_some() => {
            let durable: Arc<dyn DurableStore> = Arc::new(HttpHistoryStore::new(
                config.endpoint_base.clone(),
                config.session.access_token.clone(),
            ));
            HistoryStore::new(
                Some(durable),
                config.session.user_id.clone(),
                cache,
                monitor,
            )
        }
        _ => HistoryStore::local(cache, monitor),
    };
    store.hydrate().await;
    store
}

fn try_load_config(registry: &ModelRegistry) -> Option<Config> {
    match config::load(registry) {
        Ok(c) => Some(c),
        Err(ConfigError::MissingAccessToken) => None,
    }
}

/// Run the `history list` command. Works without a token (local cache only).
pub async fn run_history_list(limit: Option<usize>) {
    let registry = ModelRegistry::builtin();
    let config = try_load_config(&registry);
    let store = open_history_store(config.as_ref(), Arc::new(LogMonitor)).await;

    let entries = store.entries();
    if entries.is_empty() {
        println!("No history yet.");
        return;
    }

    let take = limit.unwrap_or(entries.len());
    for e in entries.iter().take(take) {
        let created = e.created_at.format("%Y-%m-%d %H:%M");
        println!(
            "{}\t{}\t{}\t{}",
            e.id,
            created,
            e.model_id,
            util::preview(&e.prompt, 60)
        );
    }
}

/// Run the `history clear` command.
pub async fn run_history_clear() {
    let registry = ModelRegistry::builtin();
    let config = try_load_config(&registry);
    let mut store = open_history_store(config.as_ref(), Arc::new(LogMonitor)).await;
    store.clear().await;
    println!("History cleared.");
}

/// Run the `history save` command: persist one entry to the library.
pub async fn run_history_save(id: &str) {
    let registry = ModelRegistry::builtin();
    let config = try_load_config(&registry);
    let store = open_history_store(config.as_ref(), Arc::new(LogMonitor)).await;
    match store.save_to_library(id).await {
        Ok(()) => println!("Saved {} to library.", id),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Parameters for one CLI generation run (raw prompt or template-driven).
pub struct GenerateParams {
    pub prompt: Option<String>,
    pub template: Option<String>,
    pub vars: Vec<(String, String)>,
    pub model: Option<String>,
}

/// Run one generation and print the content to stdout.
pub async fn run_generate(params: GenerateParams) {
    let registry = Arc::new(ModelRegistry::builtin());
    let config = match config::load(&registry) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let (prompt, template_name, variables) = match &params.template {
        Some(name) => {
            let user = load_user_templates_or_warn();
            let Some(template) = templates::find_template(name, &user) else {
                eprintln!("Error: no template named '{}'", name);
                std::process::exit(1);
            };
            let values: HashMap<String, String> = params.vars.iter().cloned().collect();
            match template.render(&values) {
                Ok(prompt) => (prompt, Some(template.name.clone()), values),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }
        None => {
            let raw = match params.prompt {
                Some(p) => p,
                None => {
                    eprintln!("Error: no prompt provided (use -p or `generate -t`)");
                    std::process::exit(1);
                }
            };
            let prompt = if raw == "-" {
                let mut buf = String::new();
                if let Err(e) = io::stdin().read_to_string(&mut buf) {
                    eprintln!("Error reading from stdin: {}", e);
                    std::process::exit(1);
                }
                buf
            } else {
                raw
            };
            (prompt, None, HashMap::new())
        }
    };

    // The endpoint accepts empty prompts; rejecting them is this caller's job.
    if prompt.trim().is_empty() {
        eprintln!("Error: prompt is empty");
        std::process::exit(1);
    }

    let model_id = params.model.unwrap_or_else(|| config.model_id.clone());

    let monitor: Arc<dyn Monitor> = Arc::new(LogMonitor);
    let backend = Arc::new(HttpGenerationClient::new(
        config.endpoint_base.clone(),
        Some(config.session.access_token.clone()),
        registry.clone(),
    ));
    let history = open_history_store(Some(&config), monitor.clone()).await;
    let plan = PlanQuota::for_plan(&config.session.plan);
    log::info!(
        "plan '{}' allows {} generations",
        plan.plan_id(),
        plan.feature_limit(quota::AI_GENERATIONS)
    );
    let quota_source: Arc<dyn QuotaSource> = Arc::new(plan);

    let mut generator = Generator::new(backend, quota_source, history, monitor);

    let mut input = GenerationInput::new(prompt, model_id);
    input.template_id = template_name.clone();
    input.template_name = template_name;
    input.variables = variables;

    match generator.generate(input).await {
        Ok(entry) => println!("{}", entry.content),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
