use crate::output::{print_json, print_table};
use anyhow::{bail, Context};
use buddy_core::command::{HexoCli, SiteCommands};
use buddy_core::post::{DateSource, Post};
use buddy_core::site::Site;
use clap::Subcommand;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum PostSubcommand {
    /// List posts, newest first
    List {
        /// Only show drafts
        #[arg(long)]
        drafts: bool,
    },

    /// Create a post through `hexo new`
    New {
        /// Post title
        title: String,
        /// Write the file directly instead of running the Hexo CLI
        #[arg(long)]
        local: bool,
    },

    /// Show a single post's metadata
    Show {
        /// File under source/_posts (name or path)
        path: String,
    },

    /// Delete a post file
    Delete {
        /// File under source/_posts (name or path)
        path: String,
        /// Confirm the deletion
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

pub fn run(root: &Path, subcmd: PostSubcommand, hexo: &str, json: bool) -> anyhow::Result<()> {
    let site = Site::open(root)?;
    match subcmd {
        PostSubcommand::List { drafts } => list(&site, drafts, json),
        PostSubcommand::New { title, local } => new(&site, &title, local, hexo, json),
        PostSubcommand::Show { path } => show(&site, &path, json),
        PostSubcommand::Delete { path, yes } => delete(&site, &path, yes, json),
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

fn list(site: &Site, drafts: bool, json: bool) -> anyhow::Result<()> {
    let mut scan = site.posts().scan()?;
    if drafts {
        scan.posts.retain(|p| p.is_draft);
    }

    if json {
        return print_json(&scan);
    }

    for s in &scan.skipped {
        eprintln!("warning: skipped {}: {}", s.path.display(), s.reason);
    }
    if scan.posts.is_empty() {
        println!("No posts.");
        return Ok(());
    }

    let rows = scan
        .posts
        .iter()
        .map(|p| {
            vec![
                p.date.clone(),
                p.title.clone(),
                if p.is_draft { "yes" } else { "" }.to_string(),
                display_path(site, &p.file_path),
            ]
        })
        .collect();
    print_table(&["DATE", "TITLE", "DRAFT", "FILE"], rows);
    Ok(())
}

fn new(site: &Site, title: &str, local: bool, hexo: &str, json: bool) -> anyhow::Result<()> {
    if local {
        let post = site.posts().create(title)?;
        if json {
            return print_json(&post);
        }
        println!("Created {}", display_path(site, &post.file_path));
        return Ok(());
    }

    let cli = HexoCli::with_invocation(site.root(), hexo);
    let rt = tokio::runtime::Runtime::new()?;
    let output = rt
        .block_on(cli.new_post(title))
        .context("failed to create post")?;

    if json {
        print_json(&serde_json::json!({ "title": title.trim(), "output": output.stdout }))
    } else {
        print!("{}", output.stdout);
        Ok(())
    }
}

fn show(site: &Site, path: &str, json: bool) -> anyhow::Result<()> {
    let post = site.posts().load(&cli_path(path)?)?;

    if json {
        return print_json(&post);
    }
    println!("Title:  {}", post.title);
    println!("Date:   {} (from {})", post.date, date_source_label(&post));
    println!("Draft:  {}", if post.is_draft { "yes" } else { "no" });
    println!("File:   {}", post.file_path.display());
    Ok(())
}

fn delete(site: &Site, path: &str, yes: bool, json: bool) -> anyhow::Result<()> {
    let posts = site.posts();
    let path = cli_path(path)?;
    // Resolve first so a bad path is reported even without --yes.
    let post = posts.load(&path)?;
    if !yes {
        bail!(
            "refusing to delete '{}' without --yes",
            display_path(site, &post.file_path)
        );
    }
    posts
        .delete(&path)
        .with_context(|| format!("failed to delete {}", post.file_path.display()))?;

    if json {
        print_json(&serde_json::json!({ "deleted": post.file_path }))
    } else {
        println!("Deleted {}", display_path(site, &post.file_path));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// A relative path that exists from the working directory is taken as-is;
/// anything else is left for the index to resolve against source/_posts.
fn cli_path(arg: &str) -> anyhow::Result<PathBuf> {
    let path = Path::new(arg);
    if path.is_relative() && path.is_file() {
        return Ok(std::env::current_dir()?.join(path));
    }
    Ok(path.to_path_buf())
}

fn display_path(site: &Site, path: &Path) -> String {
    path.strip_prefix(site.root())
        .unwrap_or(path)
        .display()
        .to_string()
}

fn date_source_label(post: &Post) -> &'static str {
    match post.date_source {
        DateSource::FrontMatter => "front-matter",
        DateSource::FileName => "file name",
        DateSource::Modified => "modification time",
        DateSource::Unknown => "nowhere",
    }
}
