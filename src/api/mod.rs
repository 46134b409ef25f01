//! SIEM REST API access.
//!
//! - [`client`] - Authenticated request wrapper and error classification
//! - [`pager`] - Offset/count pagination over any [`ApiTransport`]
//! - [`endpoints`] - Typed fetchers for each report data kind

pub mod client;
pub mod endpoints;
pub mod pager;

pub use client::{ApiBase, ApiClient, ApiError, ApiErrorKind, ApiTransport, HttpMethod, Params};
pub use endpoints::SiemApi;
pub use pager::{EmptyPagePolicy, ExtractWith, HttpResultPager, PageExtractor, PageShape, PAGE_SIZE};
