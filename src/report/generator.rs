//! Dashboard and report rendering.
//!
//! This module turns the session state into terminal output and into
//! Markdown or JSON reports.

use crate::models::{non_empty, Competitor, Report, ReportMetadata};
use crate::orchestrator::{Control, Session};
use anyhow::Result;

/// Render one competitor card.
///
/// Sections appear only when their field has text. The SWOT block appears
/// when any of its four fields has text, with the others left empty.
pub fn render_card(competitor: &Competitor) -> String {
    let mut card = String::new();

    card.push_str(&format!("### {}\n\n", competitor.competitor_name));

    let sections = [
        ("Program Summary", &competitor.program_summary),
        ("Positioning", &competitor.competitor_positioning),
        ("Rewards & Benefits", &competitor.competitor_rewards_benefits),
        ("User Feedback", &competitor.competitor_user_feedback),
    ];

    for (title, field) in sections {
        if let Some(text) = non_empty(field) {
            card.push_str(&format!("**{}**\n\n{}\n\n", title, text.trim()));
        }
    }

    if competitor.has_swot() {
        card.push_str("**SWOT Analysis**\n\n");
        let quadrants = [
            ("Strengths", &competitor.competitor_strength),
            ("Weaknesses", &competitor.competitor_weakness),
            ("Opportunities", &competitor.competitor_opportunity),
            ("Threats", &competitor.competitor_threats),
        ];
        for (title, field) in quadrants {
            let text = non_empty(field).map(str::trim).unwrap_or("");
            card.push_str(&format!("- **{}:** {}\n", title, text));
        }
        card.push('\n');
    }

    card
}

fn control_marker(control: &Control) -> &'static str {
    if control.loading {
        "⏳"
    } else if control.done {
        "✅"
    } else if control.enabled {
        "▶️ "
    } else {
        "🔒"
    }
}

/// Render the list of step controls with their state markers.
pub fn render_controls(session: &Session) -> String {
    let mut output = String::new();

    for control in session.controls() {
        output.push_str(&format!(
            "   {} {} ({})\n",
            control_marker(&control),
            control.step.label(),
            control.step
        ));
    }

    output
}

/// Render the terminal dashboard: brand, controls, error slot and cards.
pub fn render_dashboard(session: &Session) -> String {
    let mut output = String::new();

    output.push_str(&format!("🏷️  Brand: {}\n\n", session.brand_name));
    output.push_str(&render_controls(session));

    if let Some(ref error) = session.error {
        output.push_str(&format!("\n❌ {}\n", error));
    }

    if session.competitors.is_empty() {
        output.push_str("\nNo competitors yet.\n");
    } else {
        output.push_str(&format!("\n{} competitors:\n\n", session.competitors.len()));
        for competitor in &session.competitors {
            output.push_str(&render_card(competitor));
        }
    }

    output
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "# Competitive Analysis: {}\n\n",
        report.metadata.brand_name
    ));
    output.push_str(&generate_metadata_section(&report.metadata));

    if let Some(ref error) = report.error {
        output.push_str("## Errors\n\n");
        output.push_str(&format!("> ❌ {}\n\n", error));
    }

    output.push_str("## Competitors\n\n");
    if report.competitors.is_empty() {
        output.push_str("No competitors were found.\n\n");
    } else {
        for competitor in &report.competitors {
            output.push_str(&render_card(competitor));
            output.push_str("---\n\n");
        }
    }

    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Brand:** {}\n", metadata.brand_name));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!(
        "- **Steps Requested:** {}\n",
        join_steps(&metadata.steps_requested)
    ));
    section.push_str(&format!(
        "- **Steps Completed:** {}\n",
        join_steps(&metadata.steps_completed)
    ));
    section.push_str(&format!(
        "- **Duration:** {:.1}s\n",
        metadata.duration_seconds
    ));
    section.push('\n');

    section
}

fn join_steps(steps: &[crate::models::AnalysisStep]) -> String {
    if steps.is_empty() {
        return "none".to_string();
    }
    steps
        .iter()
        .map(|step| format!("`{}`", step))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Generate the report footer.
fn generate_footer() -> String {
    "*Report generated by compscope*\n".to_string()
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}
