// src/compliance/engine.rs
//
// Reference compliance: per-parameter checks, diagnostic category,
// fertility potential and recommendations.
//
// The engine is stateless apart from a borrowed ReferenceStandardSet, so a
// single table can back any number of concurrent evaluations.

use super::input::ClinicalInput;
use super::reference::{CasaParameter, ReferenceStandardSet};
use crate::analysis::SampleSummary;
use crate::error::ClinicalInputError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Concentration (million/mL) at or below which no cells are present.
const AZOOSPERMIA_CONCENTRATION: f64 = 0.0;
/// Concentration (million/mL) below which the deficiency is severe.
const SEVERE_OLIGO_CONCENTRATION: f64 = 5.0;

/// Concentration severity tier bounds (million/mL).
const SEVERITY_VERY_SEVERE_BELOW: f64 = 1.0;
const SEVERITY_SEVERE_BELOW: f64 = 5.0;
const SEVERITY_MODERATE_BELOW: f64 = 15.0;

/// Fertility tiers, `(lower bound, points)`, best first. Caps: 30 + 30 + 25.
const CONCENTRATION_POINTS: [(f64, u32); 4] = [(20.0, 30), (15.0, 25), (10.0, 20), (5.0, 10)];
const PROGRESSIVE_POINTS: [(f64, u32); 4] = [(40.0, 30), (32.0, 25), (25.0, 20), (15.0, 10)];
const MORPHOLOGY_POINTS: [(f64, u32); 4] = [(6.0, 25), (4.0, 20), (2.0, 15), (1.0, 10)];

/// Fertility levels by minimum score, best first.
const FERTILITY_LEVELS: [(u32, FertilityPotential); 4] = [
    (75, FertilityPotential::Excellent),
    (60, FertilityPotential::Good),
    (45, FertilityPotential::Moderate),
    (30, FertilityPotential::Low),
];

pub const RECOMMEND_RETEST: &str = "Repeat the analysis within 2-3 months to confirm the results";
pub const RECOMMEND_LIFESTYLE: &str = "Maintain a healthy lifestyle";
pub const RECOMMEND_ANDROLOGY: &str =
    "Consult an andrologist to evaluate the causes of low concentration";
pub const RECOMMEND_HORMONES: &str = "Hormone panel (FSH, LH, testosterone)";
pub const RECOMMEND_ANTIOXIDANTS: &str = "Evaluate oxidative stress and antioxidant status";
pub const RECOMMEND_AVOID_SMOKING: &str = "Avoid smoking and alcohol";
pub const RECOMMEND_GENETIC: &str = "Genetic screening";
pub const RECOMMEND_AVOID_HEAT: &str = "Avoid exposure to chemicals and high temperatures";

// ============================================================================
// TYPES
// ============================================================================

/// Concentration deficiency tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Normal,
    Mild,
    Moderate,
    Severe,
    VerySevere,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Mild => "mild",
            Self::Moderate => "moderate",
            Self::Severe => "severe",
            Self::VerySevere => "very_severe",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterAssessment {
    pub value: f64,
    /// Human-readable reference, e.g. `≥ 16 million/mL`.
    pub threshold: String,
    pub is_normal: bool,
    pub severity: Option<Severity>,
    pub interpretation: String,
    pub clinical_significance: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticCategory {
    Normozoospermia,
    Oligozoospermia,
    Asthenozoospermia,
    Teratozoospermia,
    Oligoasthenozoospermia,
    Oligoteratozoospermia,
    Asthenoteratozoospermia,
    Oligoasthenoteratozoospermia,
    Azoospermia,
    SevereOligozoospermia,
}

impl DiagnosticCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normozoospermia => "normozoospermia",
            Self::Oligozoospermia => "oligozoospermia",
            Self::Asthenozoospermia => "asthenozoospermia",
            Self::Teratozoospermia => "teratozoospermia",
            Self::Oligoasthenozoospermia => "oligoasthenozoospermia",
            Self::Oligoteratozoospermia => "oligoteratozoospermia",
            Self::Asthenoteratozoospermia => "asthenoteratozoospermia",
            Self::Oligoasthenoteratozoospermia => "oligoasthenoteratozoospermia",
            Self::Azoospermia => "azoospermia",
            Self::SevereOligozoospermia => "severe_oligozoospermia",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Normozoospermia => "Normal",
            Self::Oligozoospermia => "Low concentration",
            Self::Asthenozoospermia => "Low motility",
            Self::Teratozoospermia => "Abnormal morphology",
            Self::Oligoasthenozoospermia => "Low concentration and low motility",
            Self::Oligoteratozoospermia => "Low concentration and abnormal morphology",
            Self::Asthenoteratozoospermia => "Low motility and abnormal morphology",
            Self::Oligoasthenoteratozoospermia => {
                "Low concentration, low motility and abnormal morphology"
            }
            Self::Azoospermia => "No sperm cells present",
            Self::SevereOligozoospermia => "Severely low concentration",
        }
    }
}

/// Diagnostic table indexed by `oligo << 2 | astheno << 1 | terato`.
const CATEGORY_TABLE: [DiagnosticCategory; 8] = [
    DiagnosticCategory::Normozoospermia,
    DiagnosticCategory::Teratozoospermia,
    DiagnosticCategory::Asthenozoospermia,
    DiagnosticCategory::Asthenoteratozoospermia,
    DiagnosticCategory::Oligozoospermia,
    DiagnosticCategory::Oligoteratozoospermia,
    DiagnosticCategory::Oligoasthenozoospermia,
    DiagnosticCategory::Oligoasthenoteratozoospermia,
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeficiencyFlags {
    /// Concentration below reference.
    pub oligo: bool,
    /// Total motility below reference.
    pub astheno: bool,
    /// Normal morphology below reference.
    pub terato: bool,
}

impl DeficiencyFlags {
    pub fn any(&self) -> bool {
        self.oligo || self.astheno || self.terato
    }

    fn table_index(&self) -> usize {
        (self.oligo as usize) << 2 | (self.astheno as usize) << 1 | self.terato as usize
    }
}

/// Ordered from best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FertilityPotential {
    Excellent,
    Good,
    Moderate,
    Low,
    VeryPoor,
}

impl FertilityPotential {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Moderate => "moderate",
            Self::Low => "low",
            Self::VeryPoor => "very_poor",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent - high fertility potential",
            Self::Good => "Good - good fertility potential",
            Self::Moderate => "Moderate - moderate fertility potential",
            Self::Low => "Low - low fertility potential",
            Self::VeryPoor => "Very poor - very low fertility potential",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CasaOverall {
    pub normal_parameters: usize,
    pub total_parameters: usize,
    pub compliance_percent: f64,
    pub interpretation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceReport {
    pub per_parameter: BTreeMap<String, ParameterAssessment>,
    pub casa_overall: Option<CasaOverall>,
    pub deficiencies: DeficiencyFlags,
    pub diagnostic_category: DiagnosticCategory,
    /// Additive score out of 85.
    pub fertility_score: u32,
    pub fertility_potential: FertilityPotential,
    pub recommendations: Vec<String>,
}

impl ComplianceReport {
    pub fn is_normal(&self, key: &str) -> Option<bool> {
        self.per_parameter.get(key).map(|a| a.is_normal)
    }
}

// ============================================================================
// ENGINE
// ============================================================================

type ParameterCheck<'a> = fn(&ComplianceEngine<'a>, f64) -> ParameterAssessment;

pub struct ComplianceEngine<'a> {
    reference: &'a ReferenceStandardSet,
}

impl<'a> ComplianceEngine<'a> {
    pub fn new(reference: &'a ReferenceStandardSet) -> Self {
        Self { reference }
    }

    // ── PER-PARAMETER CHECKS ─────────────────────────────────────

    pub fn check_volume(&self, volume_ml: f64) -> ParameterAssessment {
        let is_normal = volume_ml >= self.reference.volume_ml;
        ParameterAssessment {
            value: volume_ml,
            threshold: format!("≥ {} mL", self.reference.volume_ml),
            is_normal,
            severity: None,
            interpretation: normal_or(is_normal, "Below reference"),
            clinical_significance: normal_or(
                is_normal,
                "May indicate an accessory gland problem",
            ),
        }
    }

    pub fn check_concentration(&self, concentration: f64) -> ParameterAssessment {
        let is_normal = concentration >= self.reference.concentration_million_ml;
        let severity = self.concentration_severity(concentration);
        ParameterAssessment {
            value: concentration,
            threshold: format!("≥ {} million/mL", self.reference.concentration_million_ml),
            is_normal,
            severity: Some(severity),
            interpretation: normal_or(is_normal, "Low concentration"),
            clinical_significance: self.concentration_significance(concentration),
        }
    }

    pub fn concentration_severity(&self, concentration: f64) -> Severity {
        if concentration < SEVERITY_VERY_SEVERE_BELOW {
            Severity::VerySevere
        } else if concentration < SEVERITY_SEVERE_BELOW {
            Severity::Severe
        } else if concentration < SEVERITY_MODERATE_BELOW {
            Severity::Moderate
        } else if concentration < self.reference.concentration_million_ml {
            Severity::Mild
        } else {
            Severity::Normal
        }
    }

    fn concentration_significance(&self, concentration: f64) -> String {
        let text = if concentration >= self.reference.concentration_million_ml {
            "Normal concentration"
        } else if concentration >= 10.0 {
            "Slight decrease - follow-up advised"
        } else if concentration >= 5.0 {
            "Moderate decrease - medical evaluation needed"
        } else {
            "Severe decrease - urgent medical attention needed"
        };
        text.to_string()
    }

    pub fn check_total_count(&self, total_count: f64) -> ParameterAssessment {
        let is_normal = total_count >= self.reference.total_count_million;
        ParameterAssessment {
            value: total_count,
            threshold: format!("≥ {} million", self.reference.total_count_million),
            is_normal,
            severity: None,
            interpretation: normal_or(is_normal, "Low total count"),
            clinical_significance: normal_or(is_normal, "May affect fertility"),
        }
    }

    pub fn check_total_motility(&self, total_motility: f64) -> ParameterAssessment {
        let is_normal = total_motility >= self.reference.total_motility_percent;
        ParameterAssessment {
            value: total_motility,
            threshold: format!("≥ {}%", self.reference.total_motility_percent),
            is_normal,
            severity: None,
            interpretation: normal_or(is_normal, "Low total motility"),
            clinical_significance: normal_or(is_normal, "Reduced motility may affect fertility"),
        }
    }

    pub fn check_progressive_motility(&self, progressive: f64) -> ParameterAssessment {
        let is_normal = progressive >= self.reference.progressive_motility_percent;
        ParameterAssessment {
            value: progressive,
            threshold: format!("≥ {}%", self.reference.progressive_motility_percent),
            is_normal,
            severity: None,
            interpretation: normal_or(is_normal, "Low progressive motility"),
            clinical_significance: normal_or(is_normal, "Reduced motility may affect fertility"),
        }
    }

    pub fn check_morphology(&self, normal_morphology: f64) -> ParameterAssessment {
        let is_normal = normal_morphology >= self.reference.normal_morphology_percent;
        ParameterAssessment {
            value: normal_morphology,
            threshold: format!("≥ {}%", self.reference.normal_morphology_percent),
            is_normal,
            severity: None,
            interpretation: normal_or(is_normal, "Abnormal morphology"),
            clinical_significance: normal_or(is_normal, "Abnormal forms may impair fertilization"),
        }
    }

    pub fn check_viability(&self, viability: f64) -> ParameterAssessment {
        let is_normal = viability >= self.reference.viability_percent;
        ParameterAssessment {
            value: viability,
            threshold: format!("≥ {}%", self.reference.viability_percent),
            is_normal,
            severity: None,
            interpretation: normal_or(is_normal, "Low vitality"),
            clinical_significance: normal_or(is_normal, "High proportion of non-viable cells"),
        }
    }

    pub fn check_ph(&self, ph: f64) -> ParameterAssessment {
        let is_normal = ph >= self.reference.ph_min && ph <= self.reference.ph_max;
        let interpretation = if is_normal {
            "Normal"
        } else if ph < self.reference.ph_min {
            "Acidic"
        } else {
            "Alkaline"
        };
        ParameterAssessment {
            value: ph,
            threshold: format!("{} - {}", self.reference.ph_min, self.reference.ph_max),
            is_normal,
            severity: None,
            interpretation: interpretation.to_string(),
            clinical_significance: normal_or(
                is_normal,
                "May indicate obstruction or infection of the accessory glands",
            ),
        }
    }

    pub fn check_liquefaction(&self, minutes: f64) -> ParameterAssessment {
        let is_normal = minutes <= self.reference.liquefaction_time_min;
        ParameterAssessment {
            value: minutes,
            threshold: format!("≤ {} min", self.reference.liquefaction_time_min),
            is_normal,
            severity: None,
            interpretation: normal_or(is_normal, "Delayed liquefaction"),
            clinical_significance: normal_or(is_normal, "May impair sperm transport"),
        }
    }

    pub fn check_leukocytes(&self, wbc_million_ml: f64) -> ParameterAssessment {
        let is_normal = wbc_million_ml <= self.reference.wbc_million_ml;
        ParameterAssessment {
            value: wbc_million_ml,
            threshold: format!("≤ {} million/mL", self.reference.wbc_million_ml),
            is_normal,
            severity: None,
            interpretation: normal_or(is_normal, "Leukocytospermia"),
            clinical_significance: normal_or(is_normal, "Possible genital tract infection"),
        }
    }

    pub fn check_casa(&self, parameter: CasaParameter, value: f64) -> ParameterAssessment {
        let reference = self.reference.casa_threshold(parameter);
        let is_normal = value >= reference;
        ParameterAssessment {
            value,
            threshold: format!("≥ {} {}", reference, parameter.unit()),
            is_normal,
            severity: None,
            interpretation: normal_or(is_normal, "Below reference"),
            clinical_significance: normal_or(is_normal, "Reduced kinematic quality"),
        }
    }

    pub fn casa_overall(normal: usize, total: usize) -> CasaOverall {
        let compliance_percent = if total > 0 {
            normal as f64 / total as f64 * 100.0
        } else {
            0.0
        };
        let interpretation = if compliance_percent >= 80.0 {
            "Excellent CASA parameters"
        } else if compliance_percent >= 60.0 {
            "Good CASA parameters"
        } else if compliance_percent >= 40.0 {
            "Acceptable CASA parameters"
        } else {
            "CASA parameters need improvement"
        };
        CasaOverall {
            normal_parameters: normal,
            total_parameters: total,
            compliance_percent,
            interpretation: interpretation.to_string(),
        }
    }

    // ── DIAGNOSIS ────────────────────────────────────────────────

    /// Flags are raised only by values that are present.
    pub fn deficiency_flags(&self, input: &ClinicalInput) -> DeficiencyFlags {
        let below = |value: Option<f64>, threshold: f64| value.map(|v| v < threshold).unwrap_or(false);
        DeficiencyFlags {
            oligo: below(
                input.concentration_million_ml,
                self.reference.concentration_million_ml,
            ),
            astheno: below(
                input.total_motility_percent,
                self.reference.total_motility_percent,
            ),
            terato: below(
                input.normal_morphology_percent,
                self.reference.normal_morphology_percent,
            ),
        }
    }

    pub fn diagnostic_category(&self, input: &ClinicalInput) -> DiagnosticCategory {
        if let Some(concentration) = input.concentration_million_ml {
            if concentration <= AZOOSPERMIA_CONCENTRATION {
                return DiagnosticCategory::Azoospermia;
            }
            if concentration < SEVERE_OLIGO_CONCENTRATION {
                return DiagnosticCategory::SevereOligozoospermia;
            }
        }
        CATEGORY_TABLE[self.deficiency_flags(input).table_index()]
    }

    /// Additive score out of 85. Missing values score 0.
    pub fn fertility_score(&self, input: &ClinicalInput) -> u32 {
        tier_points(input.concentration_million_ml, &CONCENTRATION_POINTS)
            + tier_points(input.progressive_motility_percent, &PROGRESSIVE_POINTS)
            + tier_points(input.normal_morphology_percent, &MORPHOLOGY_POINTS)
    }

    pub fn fertility_potential(score: u32) -> FertilityPotential {
        FERTILITY_LEVELS
            .iter()
            .find(|(min, _)| score >= *min)
            .map(|(_, level)| *level)
            .unwrap_or(FertilityPotential::VeryPoor)
    }

    pub fn recommendations(assessments: &BTreeMap<String, ParameterAssessment>) -> Vec<String> {
        let abnormal = |key: &str| assessments.get(key).map(|a| !a.is_normal).unwrap_or(false);

        let mut recs = vec![RECOMMEND_RETEST, RECOMMEND_LIFESTYLE];
        if abnormal(CONCENTRATION_KEY) {
            recs.extend([RECOMMEND_ANDROLOGY, RECOMMEND_HORMONES]);
        }
        if abnormal(TOTAL_MOTILITY_KEY) || abnormal(PROGRESSIVE_MOTILITY_KEY) {
            recs.extend([RECOMMEND_ANTIOXIDANTS, RECOMMEND_AVOID_SMOKING]);
        }
        if abnormal(MORPHOLOGY_KEY) {
            recs.extend([RECOMMEND_GENETIC, RECOMMEND_AVOID_HEAT]);
        }
        recs.into_iter().map(str::to_string).collect()
    }

    // ── FULL EVALUATION ──────────────────────────────────────────

    /// Full report. Fails on a non-finite or negative value rather than
    /// producing a self-contradicting assessment.
    pub fn evaluate(&self, input: &ClinicalInput) -> Result<ComplianceReport, ClinicalInputError> {
        input.validate()?;

        let checks: [(&str, Option<f64>, ParameterCheck<'a>); 10] = [
            (VOLUME_KEY, input.volume_ml, Self::check_volume),
            (
                CONCENTRATION_KEY,
                input.concentration_million_ml,
                Self::check_concentration,
            ),
            (
                TOTAL_COUNT_KEY,
                input.total_count_million,
                Self::check_total_count,
            ),
            (
                TOTAL_MOTILITY_KEY,
                input.total_motility_percent,
                Self::check_total_motility,
            ),
            (
                PROGRESSIVE_MOTILITY_KEY,
                input.progressive_motility_percent,
                Self::check_progressive_motility,
            ),
            (
                MORPHOLOGY_KEY,
                input.normal_morphology_percent,
                Self::check_morphology,
            ),
            (VIABILITY_KEY, input.viability_percent, Self::check_viability),
            (PH_KEY, input.ph, Self::check_ph),
            (
                LIQUEFACTION_KEY,
                input.liquefaction_time_min,
                Self::check_liquefaction,
            ),
            (WBC_KEY, input.wbc_million_ml, Self::check_leukocytes),
        ];

        let mut per_parameter = BTreeMap::new();
        for (key, value, check) in checks {
            if let Some(v) = value {
                per_parameter.insert(key.to_string(), check(self, v));
            }
        }

        let mut casa_overall = None;
        if let Some(casa) = input.casa_metrics.filter(|c| !c.is_empty()) {
            let mut normal = 0;
            let mut total = 0;
            for parameter in CasaParameter::ASSESSED {
                if let Some(value) = casa.get(parameter) {
                    let assessment = self.check_casa(parameter, value);
                    total += 1;
                    if assessment.is_normal {
                        normal += 1;
                    }
                    per_parameter.insert(parameter.key().to_string(), assessment);
                }
            }
            casa_overall = Some(Self::casa_overall(normal, total));
        }

        let deficiencies = self.deficiency_flags(input);
        let diagnostic_category = self.diagnostic_category(input);
        let fertility_score = self.fertility_score(input);
        let fertility_potential = Self::fertility_potential(fertility_score);
        let recommendations = Self::recommendations(&per_parameter);

        debug!(
            "Compliance: {} parameters, category={}, fertility={} ({})",
            per_parameter.len(),
            diagnostic_category.as_str(),
            fertility_potential.as_str(),
            fertility_score
        );

        Ok(ComplianceReport {
            per_parameter,
            casa_overall,
            deficiencies,
            diagnostic_category,
            fertility_score,
            fertility_potential,
            recommendations,
        })
    }

    /// Evaluate a tracked sample, with manual values taking precedence over
    /// those derived from tracking.
    pub fn evaluate_sample(
        &self,
        summary: &SampleSummary,
        manual: Option<&ClinicalInput>,
    ) -> Result<ComplianceReport, ClinicalInputError> {
        let derived = ClinicalInput::from_summary(summary);
        let input = match manual {
            Some(manual) => derived.merged_with(manual),
            None => derived,
        };
        self.evaluate(&input)
    }
}

pub const VOLUME_KEY: &str = "volume_ml";
pub const CONCENTRATION_KEY: &str = "concentration_million_ml";
pub const TOTAL_COUNT_KEY: &str = "total_count_million";
pub const TOTAL_MOTILITY_KEY: &str = "total_motility_percent";
pub const PROGRESSIVE_MOTILITY_KEY: &str = "progressive_motility_percent";
pub const MORPHOLOGY_KEY: &str = "normal_morphology_percent";
pub const VIABILITY_KEY: &str = "viability_percent";
pub const PH_KEY: &str = "ph";
pub const LIQUEFACTION_KEY: &str = "liquefaction_time_min";
pub const WBC_KEY: &str = "wbc_million_ml";

fn normal_or(is_normal: bool, abnormal: &str) -> String {
    if is_normal {
        "Normal".to_string()
    } else {
        abnormal.to_string()
    }
}

fn tier_points(value: Option<f64>, tiers: &[(f64, u32)]) -> u32 {
    value
        .and_then(|v| tiers.iter().find(|(min, _)| v >= *min))
        .map(|(_, points)| *points)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compliance::input::CasaMetrics;

    fn input(conc: f64, total: f64, progressive: f64, morph: f64) -> ClinicalInput {
        ClinicalInput {
            concentration_million_ml: Some(conc),
            total_motility_percent: Some(total),
            progressive_motility_percent: Some(progressive),
            normal_morphology_percent: Some(morph),
            ..ClinicalInput::default()
        }
    }

    #[test]
    fn test_normal_sample() {
        let reference = ReferenceStandardSet::default();
        let engine = ComplianceEngine::new(&reference);
        let report = engine.evaluate(&input(45.0, 60.0, 45.0, 8.0)).unwrap();

        assert_eq!(
            report.diagnostic_category,
            DiagnosticCategory::Normozoospermia
        );
        assert!(!report.deficiencies.any());
        assert_eq!(report.fertility_score, 85);
        assert!(report.fertility_potential <= FertilityPotential::Good);
        assert_eq!(
            report.recommendations,
            vec![RECOMMEND_RETEST.to_string(), RECOMMEND_LIFESTYLE.to_string()]
        );
    }

    #[test]
    fn test_severe_concentration_short_circuits() {
        let reference = ReferenceStandardSet::default();
        let engine = ComplianceEngine::new(&reference);
        // Other values normal or not, category is still severe
        assert_eq!(
            engine.diagnostic_category(&input(3.0, 60.0, 45.0, 8.0)),
            DiagnosticCategory::SevereOligozoospermia
        );
        assert_eq!(
            engine.diagnostic_category(&input(3.0, 10.0, 5.0, 1.0)),
            DiagnosticCategory::SevereOligozoospermia
        );
    }

    #[test]
    fn test_zero_concentration_is_azoospermia() {
        let reference = ReferenceStandardSet::default();
        let engine = ComplianceEngine::new(&reference);
        assert_eq!(
            engine.diagnostic_category(&input(0.0, 0.0, 0.0, 0.0)),
            DiagnosticCategory::Azoospermia
        );
    }

    #[test]
    fn test_category_table_covers_every_flag_combination() {
        let reference = ReferenceStandardSet::default();
        let engine = ComplianceEngine::new(&reference);
        let cases = [
            ((20.0, 50.0, 5.0), DiagnosticCategory::Normozoospermia),
            ((20.0, 50.0, 3.0), DiagnosticCategory::Teratozoospermia),
            ((20.0, 30.0, 5.0), DiagnosticCategory::Asthenozoospermia),
            ((20.0, 30.0, 3.0), DiagnosticCategory::Asthenoteratozoospermia),
            ((10.0, 50.0, 5.0), DiagnosticCategory::Oligozoospermia),
            ((10.0, 50.0, 3.0), DiagnosticCategory::Oligoteratozoospermia),
            ((10.0, 30.0, 5.0), DiagnosticCategory::Oligoasthenozoospermia),
            (
                (10.0, 30.0, 3.0),
                DiagnosticCategory::Oligoasthenoteratozoospermia,
            ),
        ];
        for ((conc, total, morph), expected) in cases {
            let i = input(conc, total, 35.0, morph);
            let category = engine.diagnostic_category(&i);
            assert_eq!(category, expected, "conc={} total={} morph={}", conc, total, morph);
            // Normal iff no deficiency flag
            assert_eq!(
                category == DiagnosticCategory::Normozoospermia,
                !engine.deficiency_flags(&i).any()
            );
        }
    }

    #[test]
    fn test_absent_values_raise_no_flags() {
        let reference = ReferenceStandardSet::default();
        let engine = ComplianceEngine::new(&reference);
        let report = engine.evaluate(&ClinicalInput::default()).unwrap();
        assert_eq!(
            report.diagnostic_category,
            DiagnosticCategory::Normozoospermia
        );
        assert!(report.per_parameter.is_empty());
        assert!(report.casa_overall.is_none());
        assert_eq!(report.fertility_score, 0);
        assert_eq!(report.fertility_potential, FertilityPotential::VeryPoor);
        assert_eq!(report.recommendations.len(), 2);
    }

    #[test]
    fn test_concentration_severity_tiers() {
        let reference = ReferenceStandardSet::default();
        let engine = ComplianceEngine::new(&reference);
        assert_eq!(engine.concentration_severity(16.0), Severity::Normal);
        assert_eq!(engine.concentration_severity(15.5), Severity::Mild);
        assert_eq!(engine.concentration_severity(5.0), Severity::Moderate);
        assert_eq!(engine.concentration_severity(14.9), Severity::Moderate);
        assert_eq!(engine.concentration_severity(4.9), Severity::Severe);
        assert_eq!(engine.concentration_severity(0.5), Severity::VerySevere);

        let a = engine.check_concentration(12.0);
        assert!(!a.is_normal);
        assert_eq!(a.severity, Some(Severity::Moderate));
        assert_eq!(a.threshold, "≥ 16 million/mL");
    }

    #[test]
    fn test_fertility_tiers() {
        let reference = ReferenceStandardSet::default();
        let engine = ComplianceEngine::new(&reference);

        // 25 + 20 + 15
        assert_eq!(engine.fertility_score(&input(15.0, 50.0, 25.0, 2.0)), 60);
        assert_eq!(
            ComplianceEngine::fertility_potential(60),
            FertilityPotential::Good
        );
        // 10 + 10 + 10
        assert_eq!(engine.fertility_score(&input(5.0, 50.0, 15.0, 1.0)), 30);
        assert_eq!(
            ComplianceEngine::fertility_potential(30),
            FertilityPotential::Low
        );
        assert_eq!(engine.fertility_score(&input(4.0, 50.0, 14.0, 0.5)), 0);

        assert_eq!(
            ComplianceEngine::fertility_potential(75),
            FertilityPotential::Excellent
        );
        assert_eq!(
            ComplianceEngine::fertility_potential(45),
            FertilityPotential::Moderate
        );
        assert_eq!(
            ComplianceEngine::fertility_potential(29),
            FertilityPotential::VeryPoor
        );
    }

    #[test]
    fn test_recommendations_order() {
        let reference = ReferenceStandardSet::default();
        let engine = ComplianceEngine::new(&reference);
        let report = engine.evaluate(&input(10.0, 30.0, 20.0, 2.0)).unwrap();
        assert_eq!(
            report.recommendations,
            vec![
                RECOMMEND_RETEST,
                RECOMMEND_LIFESTYLE,
                RECOMMEND_ANDROLOGY,
                RECOMMEND_HORMONES,
                RECOMMEND_ANTIOXIDANTS,
                RECOMMEND_AVOID_SMOKING,
                RECOMMEND_GENETIC,
                RECOMMEND_AVOID_HEAT,
            ]
        );

        // Progressive motility alone is enough for the motility pair
        let report = engine.evaluate(&input(20.0, 50.0, 20.0, 5.0)).unwrap();
        assert_eq!(
            report.recommendations,
            vec![
                RECOMMEND_RETEST,
                RECOMMEND_LIFESTYLE,
                RECOMMEND_ANTIOXIDANTS,
                RECOMMEND_AVOID_SMOKING,
            ]
        );
    }

    #[test]
    fn test_range_and_upper_bound_checks() {
        let reference = ReferenceStandardSet::default();
        let engine = ComplianceEngine::new(&reference);

        assert!(engine.check_ph(7.2).is_normal);
        assert!(engine.check_ph(8.0).is_normal);
        assert_eq!(engine.check_ph(6.9).interpretation, "Acidic");
        assert_eq!(engine.check_ph(8.4).interpretation, "Alkaline");

        assert!(engine.check_leukocytes(1.0).is_normal);
        assert!(!engine.check_leukocytes(1.5).is_normal);
        assert!(engine.check_liquefaction(30.0).is_normal);
        assert!(!engine.check_liquefaction(90.0).is_normal);
        assert!(!engine.check_volume(1.0).is_normal);
    }

    #[test]
    fn test_casa_assessment() {
        let reference = ReferenceStandardSet::default();
        let engine = ComplianceEngine::new(&reference);
        let report = engine.evaluate(&ClinicalInput {
            casa_metrics: Some(CasaMetrics {
                vcl_um_s: Some(65.0),
                vsl_um_s: Some(32.0),
                lin_percent: Some(55.0),
                str_percent: Some(75.0),
                ..CasaMetrics::default()
            }),
            ..ClinicalInput::default()
        })
        .unwrap();

        assert_eq!(report.is_normal("vcl_um_s"), Some(true));
        assert_eq!(report.is_normal("str_percent"), Some(false));
        assert_eq!(report.is_normal("bcf_hz"), None);

        let overall = report.casa_overall.unwrap();
        assert_eq!(overall.normal_parameters, 3);
        assert_eq!(overall.total_parameters, 4);
        assert!((overall.compliance_percent - 75.0).abs() < 1e-9);
        assert_eq!(overall.interpretation, "Good CASA parameters");
    }

    #[test]
    fn test_custom_reference_table() {
        let reference = ReferenceStandardSet {
            concentration_million_ml: 15.0,
            ..ReferenceStandardSet::default()
        };
        let engine = ComplianceEngine::new(&reference);
        assert!(engine.check_concentration(15.0).is_normal);
        assert_eq!(
            engine.diagnostic_category(&input(15.0, 50.0, 35.0, 5.0)),
            DiagnosticCategory::Normozoospermia
        );
    }

    #[test]
    fn test_non_finite_or_negative_value_is_rejected() {
        let reference = ReferenceStandardSet::default();
        let engine = ComplianceEngine::new(&reference);

        let err = engine
            .evaluate(&input(f64::NAN, 60.0, 45.0, 8.0))
            .unwrap_err();
        assert!(matches!(
            err,
            ClinicalInputError::NonFinite {
                field: CONCENTRATION_KEY,
                ..
            }
        ));

        assert_eq!(
            engine.evaluate(&input(20.0, -1.0, 45.0, 8.0)),
            Err(ClinicalInputError::Negative {
                field: TOTAL_MOTILITY_KEY,
                value: -1.0
            })
        );
    }

    #[test]
    fn test_sample_evaluation_checks_manual_values() {
        let reference = ReferenceStandardSet::default();
        let engine = ComplianceEngine::new(&reference);
        let manual = ClinicalInput {
            normal_morphology_percent: Some(f64::INFINITY),
            ..ClinicalInput::default()
        };
        assert!(engine
            .evaluate_sample(&SampleSummary::empty(), Some(&manual))
            .is_err());
        assert!(engine
            .evaluate_sample(&SampleSummary::empty(), None)
            .is_ok());
    }

    #[test]
    fn test_casa_overall_scores_velocity_and_ratio_parameters_only() {
        let reference = ReferenceStandardSet::default();
        let engine = ComplianceEngine::new(&reference);
        let report = engine
            .evaluate(&ClinicalInput {
                casa_metrics: Some(CasaMetrics {
                    vcl_um_s: Some(65.0),
                    vsl_um_s: Some(32.0),
                    alh_um: Some(1.0),
                    bcf_hz: Some(4.0),
                    ..CasaMetrics::default()
                }),
                ..ClinicalInput::default()
            })
            .unwrap();

        assert_eq!(report.is_normal("alh_um"), None);
        assert_eq!(report.is_normal("bcf_hz"), None);
        let overall = report.casa_overall.unwrap();
        assert_eq!(overall.total_parameters, 2);
        assert_eq!(overall.normal_parameters, 2);
        assert_eq!(overall.interpretation, "Excellent CASA parameters");
    }
}
