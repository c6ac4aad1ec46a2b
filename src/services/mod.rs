//! Services module - the extraction pipeline and its external tools.
//!
//! Everything here is framework-agnostic: no menu code, no CLI types, just
//! directory scanning and subprocess execution. The interactive menu and the
//! flag-driven entry point both funnel into [`ExtractionService::run`].
//!
//! # Components
//!
//! - [`ExtractionService`]: drives the four stages (unpack, decrypt, split,
//!   extract) strictly in order. Each stage is planned first - a pure
//!   filesystem scan that applies the already-done gate - and then executed
//!   by invoking one external tool per pending job.
//! - [`ToolKit`] / [`run_tool`]: resolved tool paths and the quiet
//!   subprocess runner (output discarded, exit status logged, never fatal).
//!
//! # Idempotence
//!
//! No manifest or database tracks progress. A job is "done" when its
//! expected output path exists, which makes interrupted runs resumable for
//! free: re-running a stage only touches entries whose artifact is missing.
//! The check is existence-only - a corrupt artifact from a killed tool looks
//! done and must be deleted by hand to be redone.

pub mod pipeline;
pub mod toolkit;

pub use pipeline::{
    plan_decrypt, plan_extract, plan_split, plan_unpack, resolve_sound_dir, ExtractionService,
    StagePlan, StageSummary, ToolJob,
};
pub use toolkit::{run_tool, ToolError, ToolKit};
