//! Pipeline stages for the paper-to-blog transformation.
//!
//! Each submodule implements exactly one transformation step: a prompt
//! built from the upstream records, one generative round trip through the
//! shared client, and the stage's deterministic post-parse fixups.
//! Keeping stages separate makes each independently testable with a
//! scripted backend and keeps prompt changes from touching control flow.
//!
//! ## Data Flow
//!
//! ```text
//! document ──▶ analyze ──▶ simplify ──▶ visualize ──▶ optimize
//! (raw text)  (findings)  (narrative)  (visual plan)  (artifact)
//! ```
//!
//! 1. [`generate`]  — the shared generation/validation client: one backend
//!    round trip, fence stripping, balanced-brace JSON extraction, typed
//!    parse-or-fail
//! 2. [`analyze`]   — extract structured findings; recomputes the word
//!    count locally
//! 3. [`simplify`]  — rewrite for the target audience; backfills the
//!    reading time
//! 4. [`visualize`] — derive visual/diagram specifications; permissive on
//!    list cardinalities
//! 5. [`optimize`]  — merge into the publish artifact; resolves keywords
//!    and timestamps

pub mod analyze;
pub mod generate;
pub mod optimize;
pub mod simplify;
pub mod visualize;
