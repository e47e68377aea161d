//! Submission pipeline: asynchronous uniqueness checks and the
//! submission gate.
//!
//! Builds on `formgate-core`: the gate intercepts a submit intent,
//! refreshes dependency state, runs the synchronous validation walk,
//! then coordinates the configured remote uniqueness checks before
//! allowing the real submission through. Remote transport, rule
//! evaluation, and error rendering are all trait boundaries owned by
//! the host.

pub mod checker;
pub mod coordinator;
pub mod gate;
