//! Where waterfall pages come from.

use async_trait::async_trait;
use color_eyre::eyre::{eyre, Result};
use std::path::PathBuf;

/// Placeholder in a path template replaced by the requested skip offset.
pub const SKIP_PLACEHOLDER: &str = "{skip}";

#[async_trait]
pub trait PageSource: Send + Sync {
    /// Raw page JSON for the page starting `skip` versions from the newest.
    async fn fetch_page(&self, skip: u64) -> Result<String>;
}

/// Reads pages from disk. The template may contain `{skip}`; without it the
/// same file serves every offset.
#[derive(Debug, Clone)]
pub struct FilePageSource {
    template: String,
}

impl FilePageSource {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    pub fn path_for(&self, skip: u64) -> PathBuf {
        PathBuf::from(self.template.replace(SKIP_PLACEHOLDER, &skip.to_string()))
    }
}

#[async_trait]
impl PageSource for FilePageSource {
    async fn fetch_page(&self, skip: u64) -> Result<String> {
        let path = self.path_for(skip);
        tracing::debug!("loading page skip={skip} from {}", path.display());
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| eyre!("Failed to read page {}: {e}", path.display()))
    }
}
