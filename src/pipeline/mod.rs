//! Pipeline stages for guide generation.
//!
//! Each submodule implements exactly one transformation step.
//! Keeping stages separate makes each independently testable and lets us
//! swap implementations (e.g. switch the caption backend) without touching
//! other stages.
//!
//! ## Data Flow
//!
//! ```text
//! resolve ──▶ metadata ─┐
//!    │                  ├─▶ synthesize ──▶ enrich
//!    └─────▶ transcript ┘      (LLM)      (pure)
//! ```
//!
//! 1. [`resolve`]    — parse the raw URL into a validated video identifier;
//!    purely syntactic, no network
//! 2. [`metadata`]   — oEmbed lookup for title/author/thumbnail; never fails,
//!    degrades to defaults
//! 3. [`transcript`] — tiered caption acquisition (manual → preferred
//!    language → provider default)
//! 4. [`synthesize`] — schema-constrained model call and strict JSON parse;
//!    the only stage that talks to the generative service
//! 5. [`enrich`]     — deterministic media-URL derivation per step; no I/O

pub mod enrich;
pub mod metadata;
pub mod resolve;
pub mod synthesize;
pub mod transcript;
