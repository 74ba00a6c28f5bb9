//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request (method, path)
//!     → table.rs (named routes: /ws, /api/, /api/oauth/redirect, /api/upload)
//!     → no match: table.rs classify_unmatched
//!         → /api/*  → structured 404
//!         → else    → page_name.rs (path → page identifier → base href)
//! ```
//!
//! # Design Decisions
//! - Routes are static data, immutable at runtime
//! - Deterministic: same input always resolves the same way
//! - The page registry is consulted read-only

pub mod page_name;
pub mod table;

pub use page_name::{decode_path, resolve, resolve_page, BaseHref};
pub use table::{classify_unmatched, is_api_path, RouteKind, Unmatched, ROUTES};
