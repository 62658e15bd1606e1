//! Clause review flow: owns the document store, retriever, and reader for the
//! life of the process and drives a review session through upload, selection,
//! run, stop, and reset.

mod context;
mod error;
mod session;

pub use clausereview_core::load_categories_and_questions;
pub use context::{AppContext, DocumentView, IngestReport};
pub use error::ReviewError;
pub use session::{ReviewSession, RunOutcome, SessionState, run_review};
