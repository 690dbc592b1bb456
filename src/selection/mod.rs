//! Case-version selection for the suite editor.
//!
//! The `caseversions-selection` endpoint lists latest case versions for a
//! multi-select widget. When the request names a suite through `for_suite`, every
//! record is annotated with its position in that suite and the list is split into
//! the cases already in the suite (`selected`, by position) and the rest
//! (`unselected`).
//!
//! The flow for one request is:
//!
//! 1. [`OrderCache::load`] reads the suite's SuiteCase rows once.
//! 2. [`annotate`] adds denormalized case, product, creator and order fields to
//!    each bundle.
//! 3. [`partition`] splits the annotated bundles.
//!
//! The cache is an ordinary value owned by the request; nothing outlives the
//! response.

pub mod annotate;
pub mod cache;
pub mod partition;

pub use annotate::annotate;
pub use cache::OrderCache;
pub use partition::{Partition, partition, partition_by};
