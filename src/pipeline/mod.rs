//! Pipeline stages for Terms-of-Service simplification and summarization.
//!
//! Each submodule implements exactly one transformation step.
//!
//! ## Data Flow
//!
//! ```text
//! offline:  segment ──▶ rewrite            (per section, paced)
//! remote:   image ──▶ llm                  (one call per document)
//! ```
//!
//! 1. [`segment`]: split a document on blank-line runs into sections
//! 2. [`rewrite`]: apply the rule set to one section, producing spans with
//!    emphasis on rewritten risk phrases
//! 3. [`image`]: validate, downscale and base64-wrap an uploaded image
//! 4. [`llm`]: drive the summarizer call with timeout and optional retry;
//!    the only stage with network I/O

pub mod image;
pub mod llm;
pub mod rewrite;
pub mod segment;
