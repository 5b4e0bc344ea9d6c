//! Version model, parsing, catalog aggregation, and resolution.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  SpecParser │────▶│   Resolver  │◀────│   Catalog   │
//! │  (filter)   │     │  (select)   │     │  (fetch)    │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                            │                   │
//!                            ▼                   ▼
//!                     ┌─────────────┐     ┌─────────────┐
//!                     │   Ordering  │     │   Sources   │
//!                     │ (total ord) │     │(index,gh,fs)│
//!                     └─────────────┘     └─────────────┘
//! ```
//!
//! A raw specifier string becomes a [`types::VersionFilter`] via
//! [`spec::SpecParser`]. [`catalog::VersionCatalog`] (for remote queries)
//! or the local scan produces candidate [`types::VersionEntry`]s, and
//! [`resolver::VersionResolver`] narrows them to zero or one concrete
//! version using [`ordering`] for sort and tie-break.

pub mod catalog;
pub mod error;
pub mod ordering;
pub mod resolver;
pub mod sources;
pub mod spec;
pub mod types;
