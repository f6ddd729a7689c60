use crate::output::{print_json, print_table};
use anyhow::Context;
use buddy_core::site::Site;
use clap::Subcommand;
use serde::Serialize;
use std::path::Path;

#[derive(Subcommand)]
pub enum ThemeSubcommand {
    /// List installed themes
    List,
    /// Show the active theme
    Current,
    /// Switch to an installed theme
    Use {
        /// Theme directory name under themes/
        name: String,
    },
}

#[derive(Serialize)]
struct ThemeRow {
    name: String,
    current: bool,
}

pub fn run(root: &Path, subcmd: ThemeSubcommand, json: bool) -> anyhow::Result<()> {
    let themes = Site::open(root)?.themes();
    match subcmd {
        ThemeSubcommand::List => {
            let current = themes.current_theme()?;
            let rows: Vec<ThemeRow> = themes
                .installed_themes()?
                .into_iter()
                .map(|name| ThemeRow {
                    current: name == current,
                    name,
                })
                .collect();
            if json {
                return print_json(&rows);
            }
            if rows.is_empty() {
                println!("No themes installed (current: {current}).");
                return Ok(());
            }
            print_table(
                &["THEME", "ACTIVE"],
                rows.into_iter()
                    .map(|r| vec![r.name, if r.current { "*" } else { "" }.to_string()])
                    .collect(),
            );
        }
        ThemeSubcommand::Current => {
            let current = themes.current_theme()?;
            if json {
                return print_json(&serde_json::json!({ "theme": current }));
            }
            println!("{current}");
        }
        ThemeSubcommand::Use { name } => {
            themes
                .switch_theme(&name)
                .with_context(|| format!("failed to switch theme to '{name}'"))?;
            if json {
                return print_json(&serde_json::json!({ "theme": name }));
            }
            println!("Theme switched to {name}.");
        }
    }
    Ok(())
}
