//! # FedSource
//!
//! Common traits and types for FedMusic sources.
//!
//! This crate provides the foundational abstractions shared by every music
//! provider plugged into the aggregation engine.
//!
//! ## Features
//!
//! - **Canonical track model**: [`Track`] and [`SourceId`], serialized with serde.
//! - **Normalization**: [`TrackBuilder`] and lenient deserialization helpers
//!   for the wildly inconsistent provider payloads.
//! - **Adapter trait**: [`SourceAdapter`], one implementation per provider
//!   (see the `fedproviders` crate).
//! - **Endpoint helpers**: [`MirrorSet`] for retry-with-fallback over mirror
//!   lists, [`HostResolver`] for providers that hand out a host at discovery.
//! - **Fallback content**: [`FallbackProvider`], static tracks that keep the
//!   engine useful when every provider is down.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use fedsource::{SourceAdapter, TrackBuilder, SourceId};
//!
//! let track = TrackBuilder::new(SourceId::Jamendo, 1234)
//!     .name(Some("Song"))
//!     .preview_url(Some("https://example.org/song.mp3"))
//!     .build();
//! assert_eq!(track.id, "jamendo_1234");
//! ```

pub mod adapter;
pub mod error;
pub mod fallback;
pub mod host;
pub mod mirror;
pub mod normalize;
pub mod track;

pub use adapter::{AdapterCapabilities, SourceAdapter};
pub use error::{Result, SourceError};
pub use fallback::FallbackProvider;
pub use host::HostResolver;
pub use mirror::{DEFAULT_MIRROR_BUDGET, MirrorSet};
pub use normalize::{
    TrackBuilder, first_non_empty, lenient_bool, lenient_f64, lenient_string,
    lenient_string_list,
};
pub use track::{SourceId, Track, UNKNOWN_ALBUM, UNKNOWN_ARTIST, UNKNOWN_TITLE, UnknownSource};
