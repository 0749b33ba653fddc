//! CLI definitions: argument parsing, subcommands, and help text.

use clap::{ArgAction, Parser, Subcommand};
use clap_complete::Shell;

pub use clap_complete::generate;

const AFTER_HELP: &str = "\
EXAMPLES:
  postsmith -p \"announce our beta\"        One generation, content to stdout
  postsmith -p - < prompt.txt              Read the prompt from stdin
  postsmith generate -t caption --var topic=coffee --var tone=playful
  postsmith models --query gemini          List matching models
  postsmith models set-default gpt-4o      Change the default model
  postsmith templates                      List content templates
  postsmith history list                   List past generations
  postsmith config set-token               Store the access token (from stdin)
  postsmith completions bash               Generate bash completions
";

/// Command-line arguments for the application.
#[derive(Parser)]
#[command(
    author,
    version,
    about = "AI-assisted social content generation from the command line",
    after_help = AFTER_HELP
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Generate from a raw prompt then exit
    #[arg(
        short = 'p',
        long,
        help = "Prompt to generate from (use '-' to read from stdin)"
    )]
    pub prompt: Option<String>,

    /// Override the model for this run
    #[arg(short = 'm', long, help = "Model ID (e.g. gemini-pro)")]
    pub model: Option<String>,

    /// Increase log verbosity (use multiple times for debug)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Reduce log output (errors only)
    #[arg(short = 'q', long = "quiet", global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate from a content template
    Generate {
        /// Template name (builtin or user-defined)
        #[arg(short = 't', long)]
        template: String,
        /// Template variable as key=value (repeatable)
        #[arg(long = "var", value_name = "KEY=VALUE", value_parser = parse_key_val)]
        vars: Vec<(String, String)>,
        /// Override the model for this run
        #[arg(short = 'm', long)]
        model: Option<String>,
    },
    /// Show config paths, model, and session status
    Config {
        #[command(subcommand)]
        subcommand: Option<ConfigSubcommand>,
    },
    /// List models from the catalog
    Models {
        /// Filter models by id or name
        #[arg(long)]
        query: Option<String>,
        #[command(subcommand)]
        subcommand: Option<ModelsSubcommand>,
    },
    /// Manage content templates (builtin and user-defined)
    Templates {
        #[command(subcommand)]
        subcommand: Option<TemplatesSubcommand>,
    },
    /// Manage generation history
    History {
        #[command(subcommand)]
        subcommand: HistorySubcommand,
    },
    /// Generate shell completion script
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell, elvish)
        #[arg(value_parser = clap::value_parser!(Shell))]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Store the access token in the config directory
    SetToken {
        /// Token value; read from stdin when omitted
        token: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ModelsSubcommand {
    /// Persist a new default model
    SetDefault {
        /// Model ID from the catalog
        model_id: String,
    },
}

#[derive(Subcommand)]
pub enum TemplatesSubcommand {
    /// Add a user template
    Add {
        /// Template name (letters, numbers, hyphens, underscores)
        name: String,
        /// One-line description
        #[arg(long)]
        description: String,
        /// Prompt body; placeholders use {variable} syntax
        #[arg(long)]
        body: String,
    },
    /// Remove a user template
    Remove {
        /// Template name
        name: String,
    },
}

#[derive(Subcommand)]
pub enum HistorySubcommand {
    /// List past generations
    List {
        /// Maximum number of entries to show
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Delete all history (durable store and local cache)
    Clear,
    /// Persist one entry to the library (requires a signed-in session)
    Save {
        /// History entry id
        id: String,
    },
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid KEY=VALUE: no '=' found in '{}'", s))?;
    if key.is_empty() {
        return Err(format!("invalid KEY=VALUE: empty key in '{}'", s));
    }
    Ok((key.to_string(), value.to_string()))
}

impl Args {
    /// Log level based on -v/-q flags: error, warn, info, or debug.
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else if self.verbose >= 2 {
            "debug"
        } else if self.verbose >= 1 {
            "info"
        } else {
            "warn"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::parse_key_val;

    #[test]
    fn parse_key_val_splits_on_first_equals() {
        assert_eq!(
            parse_key_val("topic=a=b").unwrap(),
            ("topic".to_string(), "a=b".to_string())
        );
    }

    #[test]
    fn parse_key_val_rejects_missing_equals() {
        assert!(parse_key_val("topic").is_err());
    }

    #[test]
    fn parse_key_val_rejects_empty_key() {
        assert!(parse_key_val("=value").is_err());
    }
}
