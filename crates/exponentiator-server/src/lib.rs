//! HTTP trigger for the exponentiator.
//!
//! Runs the same orchestrator as the daemon, one cycle per request:
//!
//! - [`routes`]: `POST /`, `POST /withdraw`, `GET /health`
//! - [`state`]: shared [`AppState`](state::AppState); cycles are serialised
//!   through its mutex

pub mod routes;
pub mod state;
