// Takeout Reconcile - pair photo-backup media with JSON sidecars and stamp capture metadata

pub mod constants;
pub mod error;
pub mod tools;
pub mod metadata;
pub mod ingest;

pub use error::{ReconcileError, Result};
pub use ingest::{run_reconcile, RunReport};
