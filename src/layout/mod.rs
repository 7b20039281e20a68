//! Layout fitting and reconciliation.

mod cancel;
mod engine;
mod fit;
mod options;
mod progress;
mod validate;

pub use cancel::CancellationToken;
pub use engine::Engine;
pub use fit::{FitOutcome, FitSolver, GrowthLimit};
pub use options::{GrowthPolicy, LayoutOptions};
pub use progress::PageEvent;
pub use validate::validate;
