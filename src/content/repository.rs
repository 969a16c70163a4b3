//! Post repository - loads posts from the content directory

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use walkdir::WalkDir;

use super::{ContentError, FrontMatter, MarkdownRenderer, Post, PostMetadata};

/// Why a file was left out of the listing
#[derive(Debug)]
pub enum SkipReason {
    Draft,
    Invalid(ContentError),
}

#[derive(Debug)]
pub enum ScanOutcome {
    Listed(PostMetadata),
    Skipped(SkipReason),
}

/// The result of reading one file during a directory scan
#[derive(Debug)]
pub struct ScanEntry {
    pub path: PathBuf,
    pub outcome: ScanOutcome,
}

/// Reads posts from a directory of `<slug>.md` files.
///
/// Nothing is cached: every call goes back to disk.
#[derive(Clone)]
pub struct PostRepository {
    content_dir: PathBuf,
    renderer: Arc<MarkdownRenderer>,
}

impl PostRepository {
    pub fn new<P: Into<PathBuf>>(content_dir: P, renderer: MarkdownRenderer) -> Self {
        Self {
            content_dir: content_dir.into(),
            renderer: Arc::new(renderer),
        }
    }

    /// Load and render a single post, drafts included
    pub fn load(&self, slug: &str) -> Result<Post, ContentError> {
        if !is_valid_slug(slug) {
            return Err(ContentError::NotFound {
                slug: slug.to_string(),
            });
        }

        let path = self.content_dir.join(format!("{}.md", slug));
        if !path.is_file() {
            return Err(ContentError::NotFound {
                slug: slug.to_string(),
            });
        }

        let source = read_source(&path)?;
        let (fm, body) = parse_front_matter(slug, &source)?;
        let meta = build_metadata(slug, fm)?;
        let content = self.renderer.render(body);

        tracing::debug!("Loaded post {}", slug);
        Ok(Post { meta, content })
    }

    /// Metadata of all published posts, newest first.
    ///
    /// Drafts and files that cannot be read or validated are left out.
    pub fn list(&self) -> Vec<PostMetadata> {
        let mut posts: Vec<PostMetadata> = self
            .scan()
            .into_iter()
            .filter_map(|entry| match entry.outcome {
                ScanOutcome::Listed(meta) => Some(meta),
                ScanOutcome::Skipped(SkipReason::Draft) => {
                    tracing::debug!("Skipping draft {:?}", entry.path);
                    None
                }
                ScanOutcome::Skipped(SkipReason::Invalid(e)) => {
                    tracing::warn!("Skipping invalid post {:?}: {}", entry.path, e);
                    None
                }
            })
            .collect();

        sort_newest_first(&mut posts);
        posts
    }

    /// Read the metadata of every `*.md` file in the content directory,
    /// in file-name order, without rendering bodies
    pub fn scan(&self) -> Vec<ScanEntry> {
        if !self.content_dir.is_dir() {
            tracing::debug!("Content directory {:?} does not exist", self.content_dir);
            return Vec::new();
        }

        let mut entries = Vec::new();

        for entry in WalkDir::new(&self.content_dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Failed to read content directory entry: {}", e);
                    continue;
                }
            };

            let path = entry.path();
            let Some(slug) = markdown_slug(path) else {
                continue;
            };
            if !path.is_file() {
                continue;
            }

            let outcome = match read_metadata(path, &slug) {
                Ok(meta) if meta.draft => ScanOutcome::Skipped(SkipReason::Draft),
                Ok(meta) => ScanOutcome::Listed(meta),
                Err(e) => ScanOutcome::Skipped(SkipReason::Invalid(e)),
            };

            entries.push(ScanEntry {
                path: path.to_path_buf(),
                outcome,
            });
        }

        entries
    }
}

fn read_metadata(path: &Path, slug: &str) -> Result<PostMetadata, ContentError> {
    let source = read_source(path)?;
    let (fm, _) = parse_front_matter(slug, &source)?;
    build_metadata(slug, fm)
}

fn read_source(path: &Path) -> Result<String, ContentError> {
    fs::read_to_string(path).map_err(|source| ContentError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_front_matter<'a>(
    slug: &str,
    source: &'a str,
) -> Result<(FrontMatter, &'a str), ContentError> {
    FrontMatter::parse(source).map_err(|source| ContentError::FrontMatter {
        slug: slug.to_string(),
        source,
    })
}

fn build_metadata(slug: &str, fm: FrontMatter) -> Result<PostMetadata, ContentError> {
    PostMetadata::from_front_matter(slug, fm).map_err(|source| ContentError::Validation {
        slug: slug.to_string(),
        source,
    })
}

/// Newest first; posts published at the same instant are ordered by slug
fn sort_newest_first(posts: &mut [PostMetadata]) {
    posts.sort_by(|a, b| {
        b.publish_date
            .cmp(&a.publish_date)
            .then_with(|| a.slug.cmp(&b.slug))
    });
}

/// The slug of a `<slug>.md` path, if it is one
fn markdown_slug(path: &Path) -> Option<String> {
    if path.extension().and_then(|e| e.to_str()) != Some("md") {
        return None;
    }
    path.file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// A slug can only name a file directly inside the content directory
fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty() && !slug.starts_with('.') && !slug.contains(['/', '\\', '\0'])
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn write_post(dir: &Path, name: &str, content: &str) {
        fs::write(dir.join(name), content).unwrap();
    }

    fn post(title: &str, date: &str, extra: &str) -> String {
        format!(
            "---\ntitle: {}\npublish_date: {}\n{}---\n\n# {}\n\nBody of {}.\n",
            title, date, extra, title, title
        )
    }

    fn repository(dir: &TempDir) -> PostRepository {
        PostRepository::new(dir.path(), MarkdownRenderer::new())
    }

    #[test]
    fn test_drafts_hidden_from_list_but_loadable() {
        let dir = TempDir::new().unwrap();
        write_post(dir.path(), "a.md", &post("First", "2024-01-01", "draft: false\n"));
        write_post(dir.path(), "b.md", &post("Second", "2024-06-01", "draft: true\n"));
        let repo = repository(&dir);

        let posts = repo.list();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].slug, "a");
        assert_eq!(posts[0].title, "First");

        let draft = repo.load("b").unwrap();
        assert_eq!(draft.meta.title, "Second");
        assert!(draft.meta.draft);
        assert!(draft.content.contains("Body of Second."));
    }

    #[test]
    fn test_load_missing_post() {
        let dir = TempDir::new().unwrap();
        let repo = repository(&dir);

        let err = repo.load("missing").unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Post not found");
    }

    #[test]
    fn test_load_renders_body() {
        let dir = TempDir::new().unwrap();
        write_post(
            dir.path(),
            "hello.md",
            "---\ntitle: Hello\npublish_date: 2024-02-03T04:05:06Z\ntags: [rust]\n---\n\n## Intro\n\n| a | b |\n|---|---|\n| 1 | 2 |\n",
        );
        let repo = repository(&dir);

        let post = repo.load("hello").unwrap();
        assert_eq!(post.meta.slug, "hello");
        assert_eq!(post.meta.tags, vec!["rust"]);
        assert_eq!(
            post.meta.publish_date,
            Utc.with_ymd_and_hms(2024, 2, 3, 4, 5, 6).unwrap()
        );
        assert!(post.content.contains(r#"<h2 id="intro">Intro</h2>"#));
        assert!(post.content.contains("<table>"));
        assert!(!post.content.contains("publish_date"));
    }

    #[test]
    fn test_slug_in_front_matter_is_ignored() {
        let dir = TempDir::new().unwrap();
        write_post(dir.path(), "real.md", &post("T", "2024-01-01", "slug: fake\n"));
        let repo = repository(&dir);

        assert_eq!(repo.load("real").unwrap().meta.slug, "real");
        assert_eq!(repo.list()[0].slug, "real");
        assert!(repo.load("fake").unwrap_err().is_not_found());
    }

    #[test]
    fn test_load_invalid_metadata() {
        let dir = TempDir::new().unwrap();
        write_post(dir.path(), "bad.md", "---\ntitle: No date\n---\nBody\n");
        let repo = repository(&dir);

        let err = repo.load("bad").unwrap_err();
        assert!(matches!(err, ContentError::Validation { .. }));
    }

    #[test]
    fn test_load_broken_front_matter() {
        let dir = TempDir::new().unwrap();
        write_post(dir.path(), "broken.md", "---\ntitle: [oops\n---\nBody\n");
        let repo = repository(&dir);

        let err = repo.load("broken").unwrap_err();
        assert!(matches!(err, ContentError::FrontMatter { .. }));
    }

    #[test]
    fn test_malformed_files_are_skipped() {
        let dir = TempDir::new().unwrap();
        write_post(dir.path(), "one.md", &post("One", "2024-01-01", ""));
        write_post(dir.path(), "two.md", &post("Two", "2024-02-01", ""));
        write_post(dir.path(), "three.md", &post("Three", "2024-03-01", ""));
        write_post(dir.path(), "broken.md", "---\ntitle: [oops\n---\n");
        write_post(dir.path(), "nodate.md", "---\ntitle: Missing date\n---\n");
        write_post(dir.path(), "plain.md", "No front-matter at all.\n");
        let repo = repository(&dir);

        let posts = repo.list();
        let slugs: Vec<&str> = posts.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["three", "two", "one"]);
    }

    #[test]
    fn test_out_of_range_timestamp_does_not_break_listing() {
        let dir = TempDir::new().unwrap();
        write_post(dir.path(), "one.md", &post("One", "2024-01-01", ""));
        write_post(dir.path(), "two.md", &post("Two", "2024-02-01", ""));
        write_post(dir.path(), "huge.md", &post("Huge", "-9223372036854775808", ""));
        let repo = repository(&dir);

        let slugs: Vec<String> = repo.list().into_iter().map(|p| p.slug).collect();
        assert_eq!(slugs, vec!["two", "one"]);
        assert!(matches!(
            repo.load("huge").unwrap_err(),
            ContentError::Validation { .. }
        ));
    }

    #[test]
    fn test_scan_reports_skip_reasons() {
        let dir = TempDir::new().unwrap();
        write_post(dir.path(), "a.md", &post("A", "2024-01-01", ""));
        write_post(dir.path(), "b.md", &post("B", "2024-01-02", "draft: true\n"));
        write_post(dir.path(), "c.md", "---\ntitle: C\npublish_date: soon\n---\n");
        let repo = repository(&dir);

        let entries = repo.scan();
        assert_eq!(entries.len(), 3);
        assert!(matches!(entries[0].outcome, ScanOutcome::Listed(_)));
        assert!(matches!(
            entries[1].outcome,
            ScanOutcome::Skipped(SkipReason::Draft)
        ));
        assert!(matches!(
            entries[2].outcome,
            ScanOutcome::Skipped(SkipReason::Invalid(ContentError::Validation { .. }))
        ));
        assert_eq!(entries[2].path, dir.path().join("c.md"));
    }

    #[test]
    fn test_list_sorted_newest_first_with_slug_tiebreak() {
        let dir = TempDir::new().unwrap();
        write_post(dir.path(), "old.md", &post("Old", "2023-05-01", ""));
        write_post(dir.path(), "zeta.md", &post("Zeta", "2024-06-01", ""));
        write_post(dir.path(), "alpha.md", &post("Alpha", "2024-06-01", ""));
        write_post(dir.path(), "new.md", &post("New", "2024-12-25T08:00:00Z", ""));
        let repo = repository(&dir);

        let posts = repo.list();
        let slugs: Vec<&str> = posts.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["new", "alpha", "zeta", "old"]);
        assert!(posts
            .windows(2)
            .all(|pair| pair[0].publish_date >= pair[1].publish_date));
    }

    #[test]
    fn test_list_ignores_other_files_and_subdirectories() {
        let dir = TempDir::new().unwrap();
        write_post(dir.path(), "top.md", &post("Top", "2024-01-01", ""));
        write_post(dir.path(), "notes.txt", &post("Txt", "2024-01-01", ""));
        fs::create_dir(dir.path().join("nested")).unwrap();
        write_post(
            &dir.path().join("nested"),
            "deep.md",
            &post("Deep", "2024-01-01", ""),
        );
        fs::create_dir(dir.path().join("folder.md")).unwrap();
        let repo = repository(&dir);

        let posts = repo.list();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].slug, "top");
    }

    #[test]
    fn test_list_missing_directory_is_empty() {
        let dir = TempDir::new().unwrap();
        let repo = PostRepository::new(dir.path().join("nope"), MarkdownRenderer::new());

        assert!(repo.list().is_empty());
        assert!(repo.load("anything").unwrap_err().is_not_found());
    }

    #[test]
    fn test_slugs_cannot_escape_content_dir() {
        let dir = TempDir::new().unwrap();
        let content = dir.path().join("content");
        fs::create_dir(&content).unwrap();
        write_post(dir.path(), "secret.md", &post("Secret", "2024-01-01", ""));
        let repo = PostRepository::new(&content, MarkdownRenderer::new());

        for slug in ["../secret", "..", "", ".hidden", "a\\b"] {
            assert!(repo.load(slug).unwrap_err().is_not_found(), "{}", slug);
        }
    }

    #[test]
    fn test_load_is_idempotent() {
        let dir = TempDir::new().unwrap();
        write_post(
            dir.path(),
            "code.md",
            "---\ntitle: Code\npublish_date: 2024-01-01\n---\n[TOC]\n\n## Example\n\n```rust\nfn main() {}\n```\n",
        );
        let repo = repository(&dir);

        let first = repo.load("code").unwrap();
        let second = repo.load("code").unwrap();
        assert_eq!(first.content, second.content);
        assert_eq!(first, second);
    }

    #[test]
    fn test_extra_fields_survive_loading() {
        let dir = TempDir::new().unwrap();
        write_post(
            dir.path(),
            "extra.md",
            &post("Extra", "2024-01-01", "description: Short\ncover: /img/a.png\n"),
        );
        let repo = repository(&dir);

        let post = repo.load("extra").unwrap();
        assert_eq!(post.meta.description.as_deref(), Some("Short"));
        assert_eq!(
            post.meta.extra.get("cover"),
            Some(&serde_json::json!("/img/a.png"))
        );
    }
}
