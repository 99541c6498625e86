//! Multi-source media link aggregation and resolution engine.
//!
//! Fans a title request out across independent publishing-site scrapers,
//! reconciles candidates against a canonical catalog identity, and resolves
//! intermediate file-locker URLs down to directly-fetchable file URLs through
//! a shared headless-browser driver.
//!
//! The [`Orchestrator`] is the single caller-facing entry point; everything
//! else is plumbing it owns: the [`SharedDriver`] (one Chrome process for the
//! whole service lifetime), the [`SourceScraper`] variants, the
//! [`LinkResolver`] redirect state machine, and the TTL-based [`ResultCache`].

pub mod cache;
pub mod config;
pub mod driver;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod identity;
pub mod model;
pub mod orchestrator;
pub mod resolver;
pub mod sources;
pub mod state;
pub mod util;

pub use cache::{CacheClass, ResultCache};
pub use config::{EngineConfig, SourceConfig, SourceKind};
pub use driver::{Session, SharedDriver};
pub use error::{Error, Result};
pub use fetch::FetchClient;
pub use identity::CatalogClient;
pub use model::{
    AuthContext, Candidate, DownloadLink, EmbedLink, Extraction, Identity, ResolutionResult,
};
pub use orchestrator::Orchestrator;
pub use resolver::{CLICK_CANDIDATES, CLICK_KEYWORDS, HostTier, LinkResolver};
pub use sources::SourceScraper;
pub use state::SyncState;
