use super::types::{Document, Frontmatter};

use anyhow::{Context, Result, bail};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Extensions recognised as post files.
const POST_EXTENSIONS: &[&str] = &["mdx", "md"];

static FRONTMATTER_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\A---[ \t]*\r?\n").expect("valid frontmatter regex"));

static FRONTMATTER_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\A---[ \t]*\r?\n(?:(.*?)\r?\n)?---[ \t]*(?:\r?\n|\z)")
        .expect("valid frontmatter regex")
});

/// Reads every post file in `dir` and parses it into a `Document`.
///
/// Files are visited in file-name order so the corpus order is stable across runs.
/// Each document's URL is `{url_prefix}/{file stem}`.
pub fn load_documents(dir: &Path, url_prefix: &str) -> Result<Vec<Document>> {
    let mut paths = post_files(dir)?;
    paths.sort();

    let prefix = url_prefix.trim_end_matches('/');
    let mut documents = Vec::with_capacity(paths.len());

    for path in paths {
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("failed to read post {}", path.display()))?;
        let (frontmatter, body) = split_frontmatter(&raw)
            .with_context(|| format!("failed to parse frontmatter of {}", path.display()))?;

        let slug = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();

        tracing::debug!("Parsed post '{}' ({} bytes of body)", slug, body.len());
        documents.push(Document::new(format!("{}/{}", prefix, slug), frontmatter, body));
    }

    Ok(documents)
}

fn post_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("failed to read posts directory {}", dir.display()))?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let path = entry.path();
        let is_post = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| POST_EXTENSIONS.contains(&ext));
        if is_post {
            paths.push(path);
        }
    }
    Ok(paths)
}

/// Splits a post into its YAML frontmatter and body.
///
/// Text that does not open with a `---` line has no frontmatter: the metadata is empty and
/// the whole text is the body. An opening delimiter without a closing one is an error.
pub fn split_frontmatter(raw: &str) -> Result<(Frontmatter, String)> {
    if !FRONTMATTER_OPEN.is_match(raw) {
        return Ok((Frontmatter::default(), raw.trim().to_string()));
    }

    let Some(caps) = FRONTMATTER_BLOCK.captures(raw) else {
        bail!("frontmatter block is not terminated");
    };

    let yaml = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
    let frontmatter = if yaml.trim().is_empty() {
        Frontmatter::default()
    } else {
        serde_yaml::from_str(yaml).context("invalid YAML in frontmatter")?
    };

    let consumed = caps.get(0).map(|m| m.end()).unwrap_or_default();
    Ok((frontmatter, raw[consumed..].trim().to_string()))
}
