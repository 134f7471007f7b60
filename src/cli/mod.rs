//! Command line interface for the prompt cache

pub mod serve;

use clap::{Parser, Subcommand};

/// Prompt Cache - semantic response cache for OpenAI-compatible chat APIs
#[derive(Parser)]
#[command(name = "prompt-cache")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the caching proxy
    Serve(serve::ServeArgs),
}
