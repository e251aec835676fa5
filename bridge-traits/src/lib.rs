//! # Host Bridge Traits
//!
//! Abstraction traits for every external collaborator of the playback
//! orchestration engine.
//!
//! ## Overview
//!
//! This crate defines the contract between the orchestration core and the
//! components it drives but does not implement itself: the native audio
//! engine, the remote catalog/stream-resolution service, the filesystem,
//! and a plain HTTP client for blob fetches. Each trait represents a
//! capability the core requires but that is implemented differently per
//! host (desktop, mobile, tests).
//!
//! ## Traits
//!
//! ### Playback
//! - [`PlayerEngine`](engine::PlayerEngine) - Native queue-based audio engine
//!
//! ### Catalog
//! - [`CatalogService`](catalog::CatalogService) - Metadata, stream URLs,
//!   radio continuations, and remote history
//!
//! ### Networking & I/O
//! - [`HttpClient`](http::HttpClient) - Plain HTTP fetches (audio, artwork)
//! - [`FileSystemAccess`](storage::FileSystemAccess) - Cache and downloads storage
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Host
//! implementations should convert platform-specific errors to `BridgeError`
//! and include enough context (paths, URLs, status codes) to act on.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` so implementations can be shared
//! across async tasks behind `Arc`.

pub mod catalog;
pub mod engine;
pub mod error;
pub mod http;
pub mod storage;

pub use error::BridgeError;

// Re-export commonly used types
pub use catalog::{CatalogService, SongMetadata, StreamSource, WatchPlaylist, WatchTrack};
pub use engine::{EngineState, PlayerEngine, QueueTrack};
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
pub use storage::{FileMetadata, FileSystemAccess};
