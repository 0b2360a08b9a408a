// src/compliance/reference.rs
//
// WHO Laboratory Manual, 6th edition (2021) lower reference limits
// (5th percentile), plus CASA kinematic lower bounds.

use serde::{Deserialize, Serialize};

/// Reference thresholds. Built once at startup (defaults or config file)
/// and shared read-only by every evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceStandardSet {
    pub volume_ml: f64,
    pub concentration_million_ml: f64,
    pub total_count_million: f64,
    pub total_motility_percent: f64,
    pub progressive_motility_percent: f64,
    pub normal_morphology_percent: f64,
    pub viability_percent: f64,

    pub vcl_um_s: f64,
    pub vsl_um_s: f64,
    pub vap_um_s: f64,
    pub lin_percent: f64,
    pub str_percent: f64,
    pub wob_percent: f64,
    pub alh_um: f64,
    pub bcf_hz: f64,

    pub ph_min: f64,
    pub ph_max: f64,
    /// Upper bound, minutes.
    pub liquefaction_time_min: f64,
    /// Leukocytes upper bound, million/mL.
    pub wbc_million_ml: f64,
}

impl ReferenceStandardSet {
    pub fn who_2021() -> Self {
        Self {
            volume_ml: 1.4,
            concentration_million_ml: 16.0,
            total_count_million: 39.0,
            total_motility_percent: 42.0,
            progressive_motility_percent: 30.0,
            normal_morphology_percent: 4.0,
            viability_percent: 54.0,

            vcl_um_s: 50.0,
            vsl_um_s: 25.0,
            vap_um_s: 35.0,
            lin_percent: 50.0,
            str_percent: 80.0,
            wob_percent: 70.0,
            alh_um: 2.5,
            bcf_hz: 10.0,

            ph_min: 7.2,
            ph_max: 8.0,
            liquefaction_time_min: 60.0,
            wbc_million_ml: 1.0,
        }
    }

    pub fn casa_threshold(&self, parameter: CasaParameter) -> f64 {
        match parameter {
            CasaParameter::Vcl => self.vcl_um_s,
            CasaParameter::Vsl => self.vsl_um_s,
            CasaParameter::Vap => self.vap_um_s,
            CasaParameter::Lin => self.lin_percent,
            CasaParameter::Str => self.str_percent,
            CasaParameter::Wob => self.wob_percent,
            CasaParameter::Alh => self.alh_um,
            CasaParameter::Bcf => self.bcf_hz,
        }
    }
}

impl Default for ReferenceStandardSet {
    fn default() -> Self {
        Self::who_2021()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CasaParameter {
    Vcl,
    Vsl,
    Vap,
    Lin,
    Str,
    Wob,
    Alh,
    Bcf,
}

impl CasaParameter {
    pub const ALL: [CasaParameter; 8] = [
        Self::Vcl,
        Self::Vsl,
        Self::Vap,
        Self::Lin,
        Self::Str,
        Self::Wob,
        Self::Alh,
        Self::Bcf,
    ];

    /// Parameters scored by the CASA compliance check. ALH and BCF keep
    /// reference values but are reported only, never scored.
    pub const ASSESSED: [CasaParameter; 6] = [
        Self::Vcl,
        Self::Vsl,
        Self::Vap,
        Self::Lin,
        Self::Str,
        Self::Wob,
    ];

    /// Key used in clinical input and in compliance reports.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Vcl => "vcl_um_s",
            Self::Vsl => "vsl_um_s",
            Self::Vap => "vap_um_s",
            Self::Lin => "lin_percent",
            Self::Str => "str_percent",
            Self::Wob => "wob_percent",
            Self::Alh => "alh_um",
            Self::Bcf => "bcf_hz",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Self::Vcl | Self::Vsl | Self::Vap => "µm/s",
            Self::Lin | Self::Str | Self::Wob => "%",
            Self::Alh => "µm",
            Self::Bcf => "Hz",
        }
    }
}
