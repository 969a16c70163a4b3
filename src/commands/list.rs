//! List posts in the content directory

use anyhow::Result;

use crate::content::{ScanOutcome, SkipReason};
use crate::Site;

/// List published posts, or every `*.md` file with its status when `all` is set
pub fn run(site: &Site, all: bool) -> Result<()> {
    let repository = site.repository();

    if !all {
        let posts = repository.list();
        println!("Posts ({}):", posts.len());
        for post in posts {
            println!(
                "  {} - {} [{}]",
                post.publish_date.format("%Y-%m-%d"),
                post.title,
                post.slug
            );
        }
        return Ok(());
    }

    let entries = repository.scan();
    println!("Files ({}):", entries.len());
    for entry in entries {
        let name = entry
            .path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        match entry.outcome {
            ScanOutcome::Listed(meta) => println!(
                "  {} - {} [{}]",
                meta.publish_date.format("%Y-%m-%d"),
                meta.title,
                name
            ),
            ScanOutcome::Skipped(SkipReason::Draft) => println!("  draft      [{}]", name),
            ScanOutcome::Skipped(SkipReason::Invalid(e)) => {
                println!("  invalid    [{}] {}", name, e)
            }
        }
    }

    Ok(())
}
