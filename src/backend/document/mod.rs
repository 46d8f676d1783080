//! Document Module
//!
//! Everything between a share token and the bytes the editor receives,
//! plus the per-document state the editor commands work on.
//!
//! # Architecture
//!
//! - **`url_decoder`** - Share token extraction from callback URLs
//! - **`storage`** - `FileResolver` trait and the token registry
//! - **`store`** - `DocumentStore` trait, rendition cache and streaming
//! - **`resolver`** - The open-document pipeline
//! - **`changes`** - Saved change log per document
//! - **`locks`** - Save lock per document
//! - **`handlers`** - HTTP handler for opening documents

pub mod url_decoder;

pub mod storage;

pub mod store;

pub mod resolver;

pub mod changes;

pub mod locks;

pub mod handlers;

pub use changes::{ChangeStore, StoredChange};
pub use locks::SaveLocks;
pub use resolver::DocumentResolver;
pub use storage::{FileResolver, ShareRegistry, SourceFile};
pub use store::{DocumentStore, FileStream, LocalDocumentStore, RenderedFile};
pub use handlers::open_document;
