//! Shell document templating.
//!
//! The web client ships one `index.html` for every client-side route. Each
//! response gets its own copy with the base href and runtime settings
//! written in; see [`rewriter`].

pub mod rewriter;

pub use rewriter::{rewrite, substitute, Placeholder};
