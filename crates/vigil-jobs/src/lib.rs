//! `vigil-jobs` — composite job bodies and the dispatch router.
//!
//! The scheduler only knows plain [`vigil_core::JobKind`] payloads; this
//! crate maps each kind to its handler and injects the live collaborators
//! (store, price gateway, analysis provider, scraper, sink) at dispatch
//! time. It also hosts the admin-facing job management operations, which
//! keep the job store and the live schedule in lockstep.

pub mod analysis;
pub mod digest;
pub mod error;
pub mod manager;
pub mod router;

pub use error::{JobError, Result};
pub use manager::JobManager;
pub use router::JobRouter;
