//! Open Library catalog access: fetching, normalization, and the canonical book record

mod book;
mod client;
mod error;
mod normalize;
mod transport;

pub use book::Book;
pub use client::{CatalogClient, SearchPage, SearchRequest, DEFAULT_BASE_URL};
pub use error::FetchError;
pub use transport::ReqwestTransport;

#[cfg(test)]
pub(crate) use client::tests::{search_body, FakeTransport};
