use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "annotator")]
#[command(version)]
#[command(about = "Compare, tag and verify model outputs, saving judgments locally")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start an annotation session in the browser
    Serve {
        /// Config file (defaults to ./annotator.json when present)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print version information
    Version,
}
