use crate::output::print_json;
use buddy_core::site::Site;
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let site = Site::open(root)?;
    let summary = site.summary()?;

    if json {
        return print_json(&summary);
    }

    println!("Root:      {}", site.root().display());
    println!(
        "Posts:     {} ({} draft{})",
        summary.post_count,
        summary.draft_count,
        if summary.draft_count == 1 { "" } else { "s" }
    );
    println!(
        "Theme:     {} ({} installed)",
        summary.current_theme, summary.installed_theme_count
    );
    println!("Language:  {}", summary.language);
    Ok(())
}
