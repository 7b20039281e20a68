//! Font services: metrics lookup, name parsing and substitution.

pub mod metrics;
pub mod names;
pub mod substitution;

pub use metrics::MetricsProvider;
pub use names::{family_distance, strip_subset_prefix, FontDescriptor};
pub use substitution::{SubstitutionCache, SubstitutionResolver};
