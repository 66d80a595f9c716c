use anyhow::{anyhow, Result};
use clap::Parser;

use quill::cli::{CliArgs, RunMode};
use quill::config::InputConfig;
use quill::keymap::{load_layered_keymap, Keymap};
use quill::replay::{load_script, Replayer};

fn main() -> Result<()> {
    quill::tracing::init();

    let args = CliArgs::parse();
    let mode = args.mode().map_err(|e| anyhow!(e))?;

    let config = match &args.config {
        Some(path) => InputConfig::load_from(path),
        None => InputConfig::load(),
    };

    // The command line wins over the config file
    let extra = args.keymap.as_deref().or(config.keymap.as_deref());
    let keymap = Keymap::with_bindings(load_layered_keymap(extra));
    tracing::info!("Keymap ready with {} bindings", keymap.len());

    match mode {
        RunMode::PrintBindings => {
            for binding in keymap.bindings() {
                let scope = binding.scope.as_deref().unwrap_or("global");
                println!(
                    "{:<28} {:<16} {}",
                    binding.display_string(),
                    scope,
                    binding.command
                );
            }
        }
        RunMode::Replay(path) => {
            let script = load_script(&path)?;
            let mut replayer = Replayer::new(keymap, config.default_flags);

            for report in replayer.run_script(&script)? {
                println!("{}", report);
            }

            if replayer.has_pending() {
                let settled = replayer.settle();
                if !settled.is_empty() {
                    println!("     {}", quill::replay::StepOutcome::Ran(settled));
                }
            }

            let notepad = replayer.demo().notepad.borrow();
            println!();
            println!("documents: {:?}", notepad.documents);
            println!("active:    {:?}", notepad.active_document());
            println!("zoom:      {}%", notepad.zoom);
            println!("menu bar:  {}", if notepad.menu_bar_visible { "shown" } else { "hidden" });
            println!("selected:  {} line(s)", notepad.selected_lines);
        }
    }

    Ok(())
}
