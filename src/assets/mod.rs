//! Static asset subsystem.
//!
//! # Data Flow
//! ```text
//! Request path
//!     → store.rs (sanitize, layered lookup: app assets → web client)
//!     → mime.rs (content type from extension)
//!     → Asset { bytes, content_type } or miss
//! ```
//!
//! The same store also supplies the shell document to the fallback handler.

pub mod mime;
pub mod store;

pub use mime::content_type_for;
pub use store::{Asset, AssetStore, DirAssetStore, LayeredAssetStore};
