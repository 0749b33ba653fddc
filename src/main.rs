//! # postsmith - AI-assisted social content generation CLI
//!
//! Entry point: loads the environment, parses arguments, and dispatches to
//! the command runners in `core::cli`.
//!
//! ## Features
//! - One-shot generation with `-p` or `--prompt`
//! - Template-driven generation with `generate -t <name> --var k=v`
//! - Model catalog, content templates, history, and config management

mod cli;
mod core;

use clap::{CommandFactory, Parser};
use dotenv::dotenv;

use cli::{
    Args, Commands, ConfigSubcommand, HistorySubcommand, ModelsSubcommand, TemplatesSubcommand,
};

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv().ok();

    let args = Args::parse();

    // Initialize logging; -v/-q adjust the default filter, RUST_LOG overrides.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(args.log_level()))
        .try_init()
        .ok();

    match args.command {
        Some(Commands::Generate {
            template,
            vars,
            model,
        }) => {
            core::cli::run_generate(core::cli::GenerateParams {
                prompt: None,
                template: Some(template),
                vars,
                model: model.or(args.model),
            })
            .await;
        }
        Some(Commands::Config { subcommand }) => match subcommand {
            None => core::cli::run_config(),
            Some(ConfigSubcommand::SetToken { token }) => core::cli::run_config_set_token(token),
        },
        Some(Commands::Models { query, subcommand }) => match subcommand {
            None => core::cli::run_models(query.as_deref()),
            Some(ModelsSubcommand::SetDefault { model_id }) => {
                core::cli::run_models_set_default(&model_id)
            }
        },
        Some(Commands::Templates { subcommand }) => match subcommand {
            None => core::cli::run_templates(),
            Some(TemplatesSubcommand::Add {
                name,
                description,
                body,
            }) => core::cli::run_templates_add(name, description, body),
            Some(TemplatesSubcommand::Remove { name }) => core::cli::run_templates_remove(&name),
        },
        Some(Commands::History { subcommand }) => match subcommand {
            HistorySubcommand::List { limit } => core::cli::run_history_list(limit).await,
            HistorySubcommand::Clear => core::cli::run_history_clear().await,
            HistorySubcommand::Save { id } => core::cli::run_history_save(&id).await,
        },
        Some(Commands::Completions { shell }) => {
            let mut cmd = Args::command();
            let name = cmd.get_name().to_string();
            cli::generate(shell, &mut cmd, name, &mut std::io::stdout());
        }
        None => {
            if args.prompt.is_some() {
                core::cli::run_generate(core::cli::GenerateParams {
                    prompt: args.prompt,
                    template: None,
                    vars: vec![],
                    model: args.model,
                })
                .await;
            } else {
                // No subcommand and no prompt: show usage.
                let _ = Args::command().print_help();
            }
        }
    }
}
