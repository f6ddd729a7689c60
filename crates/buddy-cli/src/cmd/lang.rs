use crate::output::print_json;
use anyhow::Context;
use buddy_core::language::Language;
use buddy_core::site::Site;
use std::path::Path;

pub fn run(root: &Path, code: Option<&str>, json: bool) -> anyhow::Result<()> {
    let config = Site::open(root)?.config();

    let lang = match code {
        Some(code) => {
            let lang: Language = code.parse()?;
            config
                .set_language(lang)
                .context("failed to save language")?;
            lang
        }
        None => config.language()?,
    };

    if json {
        print_json(&serde_json::json!({ "language": lang }))
    } else {
        if code.is_some() {
            println!("Language set to {lang}.");
        } else {
            println!("{lang}");
        }
        Ok(())
    }
}
