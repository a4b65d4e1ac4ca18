//! Provider adapters for FedMusic
//!
//! One [`fedsource::SourceAdapter`] implementation per public music
//! provider, all sharing a single pooled [`HttpClient`].
//!
//! # Providers
//!
//! | Module               | Provider                      | Endpoint strategy          |
//! |----------------------|-------------------------------|----------------------------|
//! | [`audius`]           | Audius                        | host discovery             |
//! | [`jamendo`]          | Jamendo                       | single base URL            |
//! | [`radio`]            | Radio Browser                 | single base URL            |
//! | [`musiq`]            | Indian catalog mirrors        | mirror set, two paths each |
//! | [`archive`]          | Internet Archive (India)      | search + metadata lookups  |
//! | [`youtube`]          | YouTube Music proxies         | mirror set, empty = miss   |
//! | [`deezer`]           | Deezer                        | mirror set, empty = miss   |
//! | [`openverse`]        | Openverse                     | single base URL            |
//! | [`gateway`]          | self-hosted gateway           | optional base URL          |
//! | [`fma`]              | Free Music Archive            | single base URL            |
//! | [`ccmixter`]         | ccMixter                      | single base URL            |
//! | [`freesound`]        | Freesound                     | single base URL            |
//! | [`internet_archive`] | Internet Archive (generic)    | single base URL            |
//! | [`curated`]          | Incompetech, Bensound         | built-in catalog           |
//!
//! # Example
//!
//! ```no_run
//! use fedproviders::{ProvidersSettings, default_adapters};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let adapters = default_adapters(&ProvidersSettings::default())?;
//!     for adapter in &adapters {
//!         let tracks = adapter.search("lofi", 1, 5).await.unwrap_or_default();
//!         println!("{}: {} tracks", adapter.name(), tracks.len());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Configuration Extension
//!
//! With the `fedconfig` feature (enabled by default), [`ProvidersConfigExt`]
//! reads the `providers` section of the FedMusic configuration.

pub mod archive;
pub mod audius;
pub mod ccmixter;
pub mod curated;
pub mod deezer;
pub mod fma;
pub mod freesound;
pub mod gateway;
pub mod http;
pub mod internet_archive;
pub mod jamendo;
pub mod musiq;
pub mod openverse;
pub mod radio;
pub mod registry;
pub mod settings;
pub mod youtube;

#[cfg(feature = "fedconfig")]
pub mod config_ext;

pub use archive::ArchiveAdapter;
pub use audius::AudiusAdapter;
pub use ccmixter::CcMixterAdapter;
pub use curated::CuratedAdapter;
pub use deezer::DeezerAdapter;
pub use fma::FmaAdapter;
pub use freesound::FreesoundAdapter;
pub use gateway::GatewayAdapter;
pub use http::{ClientBuilder, HttpClient};
pub use internet_archive::InternetArchiveAdapter;
pub use jamendo::JamendoAdapter;
pub use musiq::MusiqAdapter;
pub use openverse::OpenverseAdapter;
pub use radio::RadioAdapter;
pub use registry::default_adapters;
pub use settings::{
    AudiusSettings, EndpointSettings, JamendoSettings, MirrorSettings, MusiqSettings,
    ProvidersSettings,
};
pub use youtube::YoutubeAdapter;

#[cfg(feature = "fedconfig")]
pub use config_ext::ProvidersConfigExt;
