//! CLI argument parsing with clap.

use clap::{Args, Parser, Subcommand};

/// Turn the day's main news story into an AI image and post it.
#[derive(Parser, Debug)]
#[command(name = "newsgen", version, about)]
pub struct Cli {
    /// Config file path override.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Verbose output (debug logging).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// What to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch the main article, generate a prompt and an image, and publish it.
    Run {
        /// Cancel the run after this many seconds.
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,
    },

    /// Send text to the language model and print its answer.
    Prompt(PromptArgs),

    /// Generate an image from a prompt and print its URL.
    Image {
        /// Prompt source.
        #[command(flatten)]
        prompt: PromptArgs,

        /// Download the image to this path.
        #[arg(short, long)]
        output: Option<String>,

        /// Download format: jpeg, png, webp.
        #[arg(short, long)]
        format: Option<String>,
    },
}

/// Text given inline or read from a file.
#[derive(Args, Debug)]
pub struct PromptArgs {
    /// Text prompt.
    #[arg(conflicts_with = "prompt_file")]
    pub prompt: Option<String>,

    /// Path to a file containing the prompt text.
    #[arg(short = 'p', long, conflicts_with = "prompt")]
    pub prompt_file: Option<String>,
}

impl PromptArgs {
    /// Resolve the prompt from either the positional argument or the file flag.
    ///
    /// # Errors
    ///
    /// Returns an error if neither prompt nor prompt-file is provided,
    /// or if the file cannot be read.
    pub fn resolve_prompt(&self) -> Result<String, std::io::Error> {
        if let Some(ref text) = self.prompt {
            Ok(text.clone())
        } else if let Some(ref path) = self.prompt_file {
            std::fs::read_to_string(path)
        } else {
            Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Provide a prompt string or use -p/--prompt-file",
            ))
        }
    }
}
