//! Package resolution state.
//!
//! Nothing is solved here. [`pins`] reads the versions Xcode already resolved,
//! [`reconcile`] matches the project's package declarations, target product
//! dependencies and those pins.

pub mod pins;
pub mod reconcile;

pub use pins::{Pin, PinKind, ResolvedPins};
pub use reconcile::{PackageReconciler, Reconciled};
