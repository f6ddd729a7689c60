use crate::output::print_json;
use anyhow::{bail, Context};
use buddy_core::config::{ConfigValue, SiteSettings};
use buddy_core::site::Site;
use clap::Subcommand;
use std::path::Path;

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Print the whole _config.yml
    Show,

    /// Print one top-level key
    Get { key: String },

    /// Set one top-level key; the value is parsed as YAML
    Set { key: String, value: String },

    /// Update the site title, author and URL
    Site {
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        author: Option<String>,
        #[arg(long)]
        url: Option<String>,
    },
}

pub fn run(root: &Path, subcmd: ConfigSubcommand, json: bool) -> anyhow::Result<()> {
    let store = Site::open(root)?.config();
    match subcmd {
        ConfigSubcommand::Show => {
            let doc = store.read()?;
            if json {
                return print_json(&doc);
            }
            match doc {
                Some(doc) => print!("{}", serde_yaml::to_string(&doc)?),
                None => println!("No {} found.", store.path().display()),
            }
        }
        ConfigSubcommand::Get { key } => {
            let value = store.get(&key)?;
            if json {
                return print_json(&value);
            }
            match value {
                None => bail!("'{key}' is not set"),
                Some(v) => match v.scalar_text() {
                    Some(text) => println!("{text}"),
                    None => print!("{}", serde_yaml::to_string(&v)?),
                },
            }
        }
        ConfigSubcommand::Set { key, value } => {
            let value = ConfigValue::parse(&value);
            store
                .set(&key, value.clone())
                .context("failed to save config")?;
            if json {
                return print_json(&serde_json::json!({ "key": key, "value": value }));
            }
            println!("Config saved: {key}");
        }
        ConfigSubcommand::Site { title, author, url } => {
            let settings = SiteSettings { title, author, url };
            if settings.is_empty() {
                bail!("nothing to update: pass --title, --author or --url");
            }
            store
                .write(settings.into_partial())
                .context("failed to save config")?;
            let saved = store.site_settings()?;
            if json {
                return print_json(&saved);
            }
            println!("Config saved.");
            for (label, value) in [
                ("Title", &saved.title),
                ("Author", &saved.author),
                ("URL", &saved.url),
            ] {
                println!("  {label:<7} {}", value.as_deref().unwrap_or("-"));
            }
        }
    }
    Ok(())
}
