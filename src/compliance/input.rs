// src/compliance/input.rs
//
// Values the compliance engine evaluates. Every field is optional: absent
// values skip their assessment.

use super::reference::CasaParameter;
use crate::analysis::SampleSummary;
use crate::error::ClinicalInputError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClinicalInput {
    pub volume_ml: Option<f64>,
    pub concentration_million_ml: Option<f64>,
    pub total_count_million: Option<f64>,
    pub total_motility_percent: Option<f64>,
    pub progressive_motility_percent: Option<f64>,
    pub normal_morphology_percent: Option<f64>,
    pub viability_percent: Option<f64>,
    pub ph: Option<f64>,
    pub liquefaction_time_min: Option<f64>,
    pub wbc_million_ml: Option<f64>,
    pub casa_metrics: Option<CasaMetrics>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CasaMetrics {
    pub vcl_um_s: Option<f64>,
    pub vsl_um_s: Option<f64>,
    pub vap_um_s: Option<f64>,
    pub lin_percent: Option<f64>,
    pub str_percent: Option<f64>,
    pub wob_percent: Option<f64>,
    pub alh_um: Option<f64>,
    pub bcf_hz: Option<f64>,
}

impl CasaMetrics {
    pub fn get(&self, parameter: CasaParameter) -> Option<f64> {
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

    /// Field-wise merge, `other` wins where it has a value.
    pub fn overlay(self, other: CasaMetrics) -> CasaMetrics {
        CasaMetrics {
            vcl_um_s: other.vcl_um_s.or(self.vcl_um_s),
            vsl_um_s: other.vsl_um_s.or(self.vsl_um_s),
            vap_um_s: other.vap_um_s.or(self.vap_um_s),
            lin_percent: other.lin_percent.or(self.lin_percent),
            str_percent: other.str_percent.or(self.str_percent),
            wob_percent: other.wob_percent.or(self.wob_percent),
            alh_um: other.alh_um.or(self.alh_um),
            bcf_hz: other.bcf_hz.or(self.bcf_hz),
        }
    }

    pub fn is_empty(&self) -> bool {
        CasaParameter::ALL.iter().all(|p| self.get(*p).is_none())
    }
}

impl ClinicalInput {
    /// Top-level values keyed by field name, CASA metrics excluded.
    pub fn fields(&self) -> [(&'static str, Option<f64>); 10] {
        [
            ("volume_ml", self.volume_ml),
            ("concentration_million_ml", self.concentration_million_ml),
            ("total_count_million", self.total_count_million),
            ("total_motility_percent", self.total_motility_percent),
            (
                "progressive_motility_percent",
                self.progressive_motility_percent,
            ),
            ("normal_morphology_percent", self.normal_morphology_percent),
            ("viability_percent", self.viability_percent),
            ("ph", self.ph),
            ("liquefaction_time_min", self.liquefaction_time_min),
            ("wbc_million_ml", self.wbc_million_ml),
        ]
    }

    /// Every present value, CASA metrics included, must be finite and
    /// non-negative.
    pub fn validate(&self) -> Result<(), ClinicalInputError> {
        let casa = self.casa_metrics.unwrap_or_default();
        let casa_fields = CasaParameter::ALL.map(|p| (p.key(), casa.get(p)));

        for (field, value) in self.fields().into_iter().chain(casa_fields) {
            let Some(value) = value else { continue };
            if !value.is_finite() {
                return Err(ClinicalInputError::NonFinite { field, value });
            }
            if value < 0.0 {
                return Err(ClinicalInputError::Negative { field, value });
            }
        }
        Ok(())
    }

    /// Values measurable from tracking alone: CASA means over valid tracks
    /// and the motility distribution over all tracks. Concentration,
    /// morphology and the rest need manual entry.
    pub fn from_summary(summary: &SampleSummary) -> Self {
        if summary.track_count == 0 {
            return Self::default();
        }

        let casa_metrics = if summary.valid_track_count > 0 {
            let m = summary.mean;
            Some(CasaMetrics {
                vcl_um_s: Some(m.vcl),
                vsl_um_s: Some(m.vsl),
                vap_um_s: Some(m.vap),
                lin_percent: Some(m.lin),
                str_percent: Some(m.str),
                wob_percent: Some(m.wob),
                alh_um: Some(m.alh),
                bcf_hz: Some(m.bcf),
            })
        } else {
            None
        };

        Self {
            total_motility_percent: Some(summary.total_motile_percent),
            progressive_motility_percent: Some(summary.total_progressive_percent),
            casa_metrics,
            ..Self::default()
        }
    }

    /// Field-wise merge, `manual` wins where it has a value.
    pub fn merged_with(self, manual: &ClinicalInput) -> ClinicalInput {
        let casa_metrics = match (self.casa_metrics, manual.casa_metrics) {
            (Some(base), Some(over)) => Some(base.overlay(over)),
            (base, over) => over.or(base),
        };

        ClinicalInput {
            volume_ml: manual.volume_ml.or(self.volume_ml),
            concentration_million_ml: manual
                .concentration_million_ml
                .or(self.concentration_million_ml),
            total_count_million: manual.total_count_million.or(self.total_count_million),
            total_motility_percent: manual
                .total_motility_percent
                .or(self.total_motility_percent),
            progressive_motility_percent: manual
                .progressive_motility_percent
                .or(self.progressive_motility_percent),
            normal_morphology_percent: manual
                .normal_morphology_percent
                .or(self.normal_morphology_percent),
            viability_percent: manual.viability_percent.or(self.viability_percent),
            ph: manual.ph.or(self.ph),
            liquefaction_time_min: manual.liquefaction_time_min.or(self.liquefaction_time_min),
            wbc_million_ml: manual.wbc_million_ml.or(self.wbc_million_ml),
            casa_metrics,
        }
    }
}
