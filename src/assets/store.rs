//! Directory-backed asset stores.
//!
//! # Design Decisions
//! - Request paths are percent-decoded and split into normal segments only;
//!   `..`, backslashes and NUL bytes never resolve
//! - Directories are never assets
//! - Reads go through `tokio::fs`; missing files are a silent miss, other IO
//!   errors are logged and also treated as a miss

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Bytes;

use crate::assets::mime::content_type_for;
use crate::config::ContentConfig;
use crate::routing::decode_path;

/// A file loaded from an asset store.
#[derive(Debug, Clone)]
pub struct Asset {
    pub bytes: Bytes,
    pub content_type: &'static str,
}

/// Read-only source of static files and the shell document.
///
/// Implementations must be safe for concurrent reads from any number of
/// requests.
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Open the file at `path` (URL form, leading slash optional).
    async fn open(&self, path: &str) -> Option<Asset>;
}

/// Serves files below a single directory.
#[derive(Debug, Clone)]
pub struct DirAssetStore {
    root: PathBuf,
}

impl DirAssetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a URL path to a file path under the root, rejecting traversal.
    pub fn resolve(&self, path: &str) -> Option<PathBuf> {
        let decoded = decode_path(path)?;
        let mut resolved = self.root.clone();
        let mut depth = 0;
        for segment in decoded.split('/') {
            match segment {
                "" | "." => continue,
                ".." => return None,
                s if s.contains('\\') || s.contains('\0') => return None,
                s => {
                    resolved.push(s);
                    depth += 1;
                }
            }
        }
        (depth > 0).then_some(resolved)
    }
}

#[async_trait]
impl AssetStore for DirAssetStore {
    async fn open(&self, path: &str) -> Option<Asset> {
        let file = self.resolve(path)?;

        match tokio::fs::metadata(&file).await {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => return None,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = %file.display(), error = %e, "Asset stat failed");
                return None;
            }
        }

        match tokio::fs::read(&file).await {
            Ok(bytes) => Some(Asset {
                bytes: Bytes::from(bytes),
                content_type: content_type_for(path),
            }),
            Err(e) => {
                tracing::warn!(path = %file.display(), error = %e, "Asset read failed");
                None
            }
        }
    }
}

/// Consults each layer in order and returns the first hit.
#[derive(Clone, Default)]
pub struct LayeredAssetStore {
    layers: Vec<Arc<dyn AssetStore>>,
}

impl LayeredAssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a layer with lower priority than the existing ones.
    pub fn with_layer(mut self, layer: Arc<dyn AssetStore>) -> Self {
        self.layers.push(layer);
        self
    }

    /// App assets (when configured) shadow the web client content.
    pub fn from_config(content: &ContentConfig) -> Self {
        let mut store = Self::new();
        if let Some(assets_dir) = &content.assets_dir {
            store = store.with_layer(Arc::new(DirAssetStore::new(assets_dir)));
        }
        store.with_layer(Arc::new(DirAssetStore::new(&content.content_dir)))
    }
}

#[async_trait]
impl AssetStore for LayeredAssetStore {
    async fn open(&self, path: &str) -> Option<Asset> {
        for layer in &self.layers {
            if let Some(asset) = layer.open(path).await {
                return Some(asset);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn store_with(files: &[(&str, &str)]) -> (tempfile::TempDir, DirAssetStore) {
        let dir = tempfile::tempdir().unwrap();
        for (name, body) in files {
            let path = dir.path().join(name);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, body).unwrap();
        }
        let store = DirAssetStore::new(dir.path());
        (dir, store)
    }

    #[tokio::test]
    async fn opens_nested_files() {
        let (_dir, store) = store_with(&[("icons/app.png", "png"), ("main.dart.js", "js")]);

        let asset = store.open("/icons/app.png").await.unwrap();
        assert_eq!(&asset.bytes[..], b"png");
        assert_eq!(asset.content_type, "image/png");

        let asset = store.open("main.dart.js").await.unwrap();
        assert_eq!(asset.content_type, "application/javascript");
    }

    #[tokio::test]
    async fn directories_and_missing_files_miss() {
        let (_dir, store) = store_with(&[("icons/app.png", "png")]);
        assert!(store.open("/icons").await.is_none());
        assert!(store.open("/").await.is_none());
        assert!(store.open("/nope.txt").await.is_none());
    }

    #[tokio::test]
    async fn traversal_is_rejected() {
        let outer = tempfile::tempdir().unwrap();
        fs::write(outer.path().join("secret.txt"), "secret").unwrap();
        let inner = outer.path().join("web");
        fs::create_dir(&inner).unwrap();
        let store = DirAssetStore::new(&inner);

        assert!(store.open("/../secret.txt").await.is_none());
        assert!(store.open("/%2e%2e/secret.txt").await.is_none());
        assert!(store.resolve("/a/../../secret.txt").is_none());
        assert!(store.resolve("/a%5c..%5csecret.txt").is_none());
        assert!(store.resolve("/a%00.txt").is_none());
    }

    #[tokio::test]
    async fn percent_encoded_names_resolve() {
        let (_dir, store) = store_with(&[("my file.txt", "hello")]);
        let asset = store.open("/my%20file.txt").await.unwrap();
        assert_eq!(&asset.bytes[..], b"hello");
        assert!(store.open("/bad%zzname").await.is_none());
        assert!(store.open("/%ff.txt").await.is_none());
    }

    #[tokio::test]
    async fn first_layer_wins() {
        let (_app_dir, app) = store_with(&[("favicon.png", "app")]);
        let (_web_dir, web) = store_with(&[("favicon.png", "web"), ("index.html", "<html>")]);

        let layered = LayeredAssetStore::new()
            .with_layer(Arc::new(app))
            .with_layer(Arc::new(web));

        assert_eq!(&layered.open("/favicon.png").await.unwrap().bytes[..], b"app");
        assert_eq!(&layered.open("/index.html").await.unwrap().bytes[..], b"<html>");
        assert!(layered.open("/missing").await.is_none());
    }
}
