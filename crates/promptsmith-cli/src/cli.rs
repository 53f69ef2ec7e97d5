use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "promptsmith")]
#[command(about = "Rewrite rough prompts into structured ones with an LLM", long_about = None)]
pub struct Cli {
    #[arg(long, global = true, help = "Settings file (defaults to the user config directory)")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Optimize a prompt and print the result")]
    Optimize {
        #[arg(help = "Prompt to optimize (reads stdin when omitted or '-')")]
        prompt: Option<String>,

        #[arg(short, long, help = "Provider: anthropic, openai, or google")]
        provider: Option<String>,

        #[arg(short, long, help = "Model to use (overrides settings)")]
        model: Option<String>,

        #[arg(short, long, help = "Context style: comprehensive, quick, structured, or creative")]
        style: Option<String>,

        #[arg(long, help = "API key (overrides settings and environment)")]
        api_key: Option<String>,
    },

    #[command(about = "Send a short request to check the stored credentials")]
    Test,

    #[command(about = "Show or change settings")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    #[command(about = "List context styles")]
    Styles,

    #[command(about = "List interface languages")]
    Languages,

    #[command(about = "Answer extension messages as JSON lines on stdin/stdout")]
    Serve,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    #[command(about = "Show settings with the API key masked")]
    Show {
        #[arg(long, help = "Print the whole settings file including endpoints")]
        full: bool,
    },

    #[command(about = "Print one setting")]
    Get {
        #[arg(help = "provider, apiKey, model, contextStyle, language, or maxTokens")]
        key: String,
    },

    #[command(about = "Change one setting (an empty value clears it)")]
    Set {
        #[arg(help = "provider, apiKey, model, contextStyle, language, or maxTokens")]
        key: String,

        #[arg(help = "New value")]
        value: String,
    },
}
