// src/compliance/mod.rs
//
// Reference compliance of a sample against the WHO 2021 table.
//
//   SampleSummary ─┐
//                  ├→ ClinicalInput → ComplianceEngine → ComplianceReport
//   manual values ─┘

pub mod engine;
pub mod input;
pub mod reference;

pub use engine::{
    CasaOverall, ComplianceEngine, ComplianceReport, DeficiencyFlags, DiagnosticCategory,
    FertilityPotential, ParameterAssessment, Severity,
};
pub use input::{CasaMetrics, ClinicalInput};
pub use reference::{CasaParameter, ReferenceStandardSet};
