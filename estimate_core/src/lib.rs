//! # estimate_core - Construction Material Cost Estimation Engine
//!
//! `estimate_core` turns project metadata (building type, floor area, quality
//! level) into a priced material takeoff with advice and a report. All inputs
//! and outputs are JSON-serializable.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: each stage is a pure function of its inputs
//! - **Injected reference data**: coefficient and price tables are passed in,
//!   never looked up globally by the stages
//! - **Soft failure**: missing reference data shows up as empty or null
//!   fields, not errors
//!
//! ## Quick Start
//!
//! ```rust
//! use estimate_core::config::Settings;
//! use estimate_core::materials::ReferenceData;
//! use estimate_core::pipeline::run;
//! use estimate_core::project::ProjectInput;
//!
//! let input = ProjectInput::new("wood_frame_house", 200.0).with_quality_level("economic");
//! let outcome = run(&input, ReferenceData::builtin(), &Settings::default());
//! assert!(outcome.is_success());
//! ```
//!
//! ## Modules
//!
//! - [`project`] - Project input record and quality tiers
//! - [`materials`] - Coefficient and price tables
//! - [`quantities`] - Quantity derivation
//! - [`estimate`] - Cost estimation
//! - [`advisor`] - Rule-based advice
//! - [`report`] - Report assembly (JSON, HTML, PDF)
//! - [`pipeline`] - Stage orchestration
//! - [`config`] - Layered settings
//! - [`units`] - Area and material units
//! - [`errors`] - Structured error types
//! - [`file_io`] - File operations with atomic saves

pub mod advisor;
pub mod config;
pub mod errors;
pub mod estimate;
pub mod file_io;
pub mod materials;
pub mod pipeline;
pub mod project;
pub mod quantities;
pub mod report;
pub mod units;

// Re-export commonly used types at crate root for convenience
pub use config::Settings;
pub use errors::{EstimateError, EstimateResult};
pub use file_io::{load_project_input, save_report};
pub use materials::ReferenceData;
pub use pipeline::{run, PipelineOutcome};
pub use project::{ProjectInput, QualityTier};
pub use report::Report;
