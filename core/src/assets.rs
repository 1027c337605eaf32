//! Request-scoped cache for fetched slide assets (images, narration audio).
//!
//! One cache instance belongs to exactly one generation request and is
//! replaced wholesale when a new request starts, so stale assets from an
//! abandoned run can never leak into the next one.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;

/// Fetches the asset behind a slide's `image_prompt` / `speaker_notes` text.
/// Implementations live at the application boundary (image search, TTS).
#[async_trait]
pub trait AssetPrefetcher {
    async fn fetch(&self, key: &str) -> Result<Vec<u8>>;
}

/// Prefetcher that fetches nothing. Default when the caller has no asset
/// backend wired up.
pub struct NoopPrefetcher;

#[async_trait]
impl AssetPrefetcher for NoopPrefetcher {
    async fn fetch(&self, _key: &str) -> Result<Vec<u8>> {
        Ok(Vec::new())
    }
}

#[derive(Debug, Default)]
pub struct AssetCache {
    entries: HashMap<String, Vec<u8>>,
}

impl AssetCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, bytes: Vec<u8>) {
        self.entries.insert(key.into(), bytes);
    }

    pub fn get(&self, key: &str) -> Option<&[u8]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
