//! Command-line argument parsing for the replay tool
//!
//! Supports:
//! - Replaying a YAML script of input events
//! - Layering an extra keymap file over the defaults
//! - Listing the effective bindings

use clap::Parser;
use std::path::PathBuf;

/// Replay input events through quill's shortcut routing
#[derive(Parser, Debug)]
#[command(name = "quill", version, about = "Replay input events through shortcut routing")]
pub struct CliArgs {
    /// YAML script of input events to replay
    #[arg(value_name = "SCRIPT")]
    pub script: Option<PathBuf>,

    /// Extra keymap merged over the default, project and user keymaps
    #[arg(short = 'k', long, value_name = "FILE")]
    pub keymap: Option<PathBuf>,

    /// Print the effective bindings and exit
    #[arg(short = 'p', long)]
    pub print_bindings: bool,

    /// Config file to use instead of ~/.config/quill/config.yaml
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// What the binary should do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunMode {
    PrintBindings,
    Replay(PathBuf),
}

impl CliArgs {
    pub fn mode(&self) -> Result<RunMode, String> {
        match (&self.script, self.print_bindings) {
            (_, true) => Ok(RunMode::PrintBindings),
            (Some(script), false) => Ok(RunMode::Replay(script.clone())),
            (None, false) => Err("Nothing to do: pass a script or --print-bindings".to_string()),
        }
    }
}
