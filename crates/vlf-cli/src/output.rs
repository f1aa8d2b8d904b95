//! Output formatting module

use serde::Serialize;
use vlf_app::app::{GeneratedReport, SlotPlan};
use vlf_app::output_file::DOCX_MIME;
use vlf_domain::model::TemplateKey;
use vlf_types::{OutputFormat, Result};

#[derive(Serialize)]
struct ReportSummary<'a> {
    output: &'a str,
    mime: &'static str,
    template: String,
    environment: String,
    slots: usize,
    images: usize,
    reference_image: bool,
    bytes: usize,
}

pub fn output_report(output_format: OutputFormat, report: &GeneratedReport, path: &str) -> Result<()> {
    if output_format == OutputFormat::Json {
        let summary = ReportSummary {
            output: path,
            mime: DOCX_MIME,
            template: report.template.file_name(),
            environment: report.environment.to_string(),
            slots: report.slot_count,
            images: report.image_count,
            reference_image: report.reference_bound,
            bytes: report.bytes.len(),
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("\nReport generated");
        println!("================");
        println!("Output:          {}", path);
        println!("Template:        {}", report.template.file_name());
        println!("Environment:     {}", report.environment);
        println!("Photos:          {}/{}", report.image_count, report.slot_count);
        println!(
            "Voltage table:   {}",
            if report.reference_bound { "Yes" } else { "No" }
        );
    }
    Ok(())
}

pub fn output_slots(output_format: OutputFormat, plan: &SlotPlan) -> Result<()> {
    if output_format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(plan)?);
    } else {
        println!("Phase type: {}", plan.phase_type);
        println!("Segments:   {}", plan.segment_count);
        println!("Template:   {}", plan.template);
        println!();
        println!("Slots ({}):", plan.slots.len());
        for slot in &plan.slots {
            println!("  {}", slot);
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct TemplateRow {
    file_name: String,
    code: String,
    segments: u32,
}

pub fn output_templates(output_format: OutputFormat, templates: &[TemplateKey]) -> Result<()> {
    if output_format == OutputFormat::Json {
        let rows: Vec<TemplateRow> = templates
            .iter()
            .map(|k| TemplateRow {
                file_name: k.file_name(),
                code: k.code.to_string(),
                segments: k.segments,
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else if templates.is_empty() {
        println!("No templates found");
    } else {
        println!("{:<6} {:>8}  {}", "Code", "Segments", "File");
        println!("{}", "-".repeat(40));
        for key in templates {
            println!("{:<6} {:>8}  {}", key.code, key.segments, key.file_name());
        }
    }
    Ok(())
}
