//! Print a single post

use anyhow::Result;

use crate::Site;

/// Load, render and print the post as the API would return it
pub fn run(site: &Site, slug: &str) -> Result<()> {
    let post = site.repository().load(slug)?;
    println!("{}", serde_json::to_string_pretty(&post)?);
    Ok(())
}
