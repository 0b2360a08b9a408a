// src/report.rs
//
// Console and JSON renderings of session results.

use crate::compliance::ComplianceReport;
use crate::pipeline::SessionAnalysis;
use crate::types::{KinematicResult, MotilityPattern, WhoGrade};
use std::fmt::Write;

const RULE: &str = "────────────────────────────────────────────────────────────";

pub fn to_json<T: serde::Serialize>(value: &T) -> serde_json::Result<String> {
    serde_json::to_string_pretty(value)
}

pub fn render_session(session: &SessionAnalysis) -> String {
    let mut out = String::new();
    let summary = &session.summary;

    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(out, "Session {}", session.session_id);
    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(
        out,
        "Tracks: {} ({} valid for kinematics), samples: {}",
        summary.track_count, summary.valid_track_count, session.sample_count
    );

    if summary.valid_track_count > 0 {
        let _ = writeln!(out, "\nKinematics (mean ± std)");
        let units = ["µm/s", "µm/s", "µm/s", "%", "%", "%", "µm", "Hz"];
        let means = summary.mean.values();
        let stds = summary.std.values();
        for (i, name) in KinematicResult::FIELD_NAMES.iter().enumerate() {
            let _ = writeln!(
                out,
                "  {:<4} {:>8.2} ± {:<7.2} {}",
                name.to_uppercase(),
                means[i],
                stds[i],
                units[i]
            );
        }
    }

    let _ = writeln!(out, "\nWHO grades");
    for grade in WhoGrade::ALL {
        let _ = writeln!(
            out,
            "  {} {:<18} {:>4}  {:>5.1}%",
            grade.as_str(),
            grade.description(),
            summary.grade_count(grade),
            summary.grade_percent(grade)
        );
    }
    let _ = writeln!(
        out,
        "  progressive (A+B) {:.1}%, motile (A+B+C) {:.1}%",
        summary.total_progressive_percent, summary.total_motile_percent
    );

    let _ = writeln!(out, "\nPatterns");
    for pattern in MotilityPattern::ALL {
        let count = summary.pattern_counts.get(&pattern).copied().unwrap_or(0);
        let _ = writeln!(out, "  {:<18} {:>4}", pattern.as_str(), count);
    }
    let _ = writeln!(out, "  mean quality score {:.1}", summary.mean_quality_score);

    out.push('\n');
    out.push_str(&render_compliance(&session.compliance));
    out
}

pub fn render_compliance(report: &ComplianceReport) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Reference compliance");
    if report.per_parameter.is_empty() {
        let _ = writeln!(out, "  (no values to assess)");
    }
    for (key, assessment) in &report.per_parameter {
        let mark = if assessment.is_normal { "✓" } else { "✗" };
        let _ = writeln!(
            out,
            "  {} {:<30} {:>8.2}  ({})  {}",
            mark, key, assessment.value, assessment.threshold, assessment.interpretation
        );
    }

    if let Some(casa) = &report.casa_overall {
        let _ = writeln!(
            out,
            "  CASA: {}/{} normal ({:.0}%) - {}",
            casa.normal_parameters,
            casa.total_parameters,
            casa.compliance_percent,
            casa.interpretation
        );
    }

    let _ = writeln!(
        out,
        "\nDiagnosis: {} ({})",
        report.diagnostic_category.as_str(),
        report.diagnostic_category.description()
    );
    let _ = writeln!(
        out,
        "Fertility potential: {} (score {}/85)",
        report.fertility_potential.description(),
        report.fertility_score
    );

    let _ = writeln!(out, "\nRecommendations");
    for rec in &report.recommendations {
        let _ = writeln!(out, "  - {}", rec);
    }
    out
}
