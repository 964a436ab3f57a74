//! Client-side mirror of the REST collections.
//!
//! A [`RemoteCollection`] owns one entity list fetched from a [`Backend`],
//! applies mutations locally after they succeed, and refetches on timer
//! ticks and realtime change events.

pub mod backend;
pub mod collection;
pub mod error;
pub mod http;
pub mod resources;

pub use backend::{ApiRequest, Backend, ChangeStream, Verb};
pub use collection::{CollectionOptions, FetchMode, LoadState, RemoteCollection, Snapshot};
pub use error::ClientError;
pub use http::HttpBackend;
