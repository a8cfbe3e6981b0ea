//! Service modules for the playlist export pipeline
//!
//! - `catalog_client`: two-stage search → detail lookup for one query
//! - `bounded_resolver`: concurrent resolution of a whole batch
//! - `query_extractor` / `result_assembler`: playlist in, response out
//! - `credential_provider` / `playlist_source`: playlist provider access

pub mod bounded_resolver;
pub mod catalog_client;
pub mod credential_provider;
pub mod playlist_exporter;
pub mod playlist_source;
pub mod query_extractor;
pub mod result_assembler;

pub use bounded_resolver::{BoundedResolver, ResolverError, ResolverSettings};
pub use catalog_client::{CatalogClient, HttpCatalogClient};
pub use credential_provider::{
    CredentialError, CredentialProvider, OAuthCredentials, RefreshTokenProvider,
};
pub use playlist_exporter::{ExportError, PlaylistExporter};
pub use playlist_source::{PlaylistError, PlaylistSource, SpotifyPlaylistSource};
pub use query_extractor::{extract_queries, track_query};
pub use result_assembler::assemble;
