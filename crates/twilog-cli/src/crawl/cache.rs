//! Raw fetch batches written beside the database for `--from-cache` replay.
//!
//! Files are `<cache_dir>/<screen_name>_timeline.json`,
//! `<screen_name>_likes.json` and `<screen_name>_identity.json`. Each write
//! overwrites the previous file.

use std::path::{Path, PathBuf};

use anyhow::Context;

use twilog_scraper::{FeedKind, Identity, RawNode};

pub(super) struct CacheDir {
    root: PathBuf,
}

impl CacheDir {
    pub(super) fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    fn path(&self, screen_name: &str, suffix: &str) -> PathBuf {
        self.root.join(format!("{screen_name}_{suffix}.json"))
    }

    fn write_json<T: serde::Serialize + ?Sized>(&self, path: &Path, value: &T) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.root)
            .with_context(|| format!("failed to create cache dir {}", self.root.display()))?;
        let body = serde_json::to_string_pretty(value)?;
        std::fs::write(path, body)
            .with_context(|| format!("failed to write cache file {}", path.display()))?;
        tracing::debug!(path = %path.display(), "cache file written");
        Ok(())
    }

    fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
        let body = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read cache file {}", path.display()))?;
        serde_json::from_str(&body)
            .with_context(|| format!("cache file {} is not valid", path.display()))
    }

    pub(super) fn store_nodes(
        &self,
        screen_name: &str,
        kind: FeedKind,
        nodes: &[RawNode],
    ) -> anyhow::Result<()> {
        self.write_json(&self.path(screen_name, kind.as_str()), nodes)
    }

    pub(super) fn load_nodes(&self, screen_name: &str, kind: FeedKind) -> anyhow::Result<Vec<RawNode>> {
        Self::read_json(&self.path(screen_name, kind.as_str()))
    }

    pub(super) fn store_identity(&self, screen_name: &str, identity: &Identity) -> anyhow::Result<()> {
        self.write_json(&self.path(screen_name, "identity"), identity)
    }

    pub(super) fn load_identity(&self, screen_name: &str) -> anyhow::Result<Identity> {
        Self::read_json(&self.path(screen_name, "identity"))
    }
}
