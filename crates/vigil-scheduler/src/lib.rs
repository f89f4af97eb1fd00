//! `vigil-scheduler` — in-memory trigger engine over a fired-job channel.
//!
//! # Overview
//!
//! The schedule lives in memory as a map of job id to trigger plus payload.
//! A 1 s polling loop sends every due job over an mpsc channel to the
//! dispatch router; job bodies run as spawned tasks and never block the
//! loop. The map is a disposable projection of the job store — call
//! [`SchedulerCore::reconcile`] at startup to rebuild it.
//!
//! # Trigger variants
//!
//! | Variant | Behaviour                                              |
//! |---------|--------------------------------------------------------|
//! | `Daily` | Fire at HH:MM wall-clock time in the job's own timezone |
//! | `Every` | Repeat every N seconds                                 |

pub mod core;
pub mod error;
pub mod trigger;

pub use crate::core::SchedulerCore;
pub use error::{Result, SchedulerError};
pub use trigger::{next_run, Trigger};
