//! Report Service - generates one VLF test report
//!
//! Pipeline for a single request:
//! 1. Parse and normalize the payload (date, test voltage, upper-casing)
//! 2. Select the template for (phase type, segment count)
//! 3. Render the location map for the requested environment
//! 4. Bind uploaded photos and the voltage table image to their placeholders
//! 5. Fill the template once and return the document bytes
//!
//! Nothing is written here; any error means no document.

use chrono::NaiveDate;
use serde::Serialize;
use vlf_domain::model::{
    InlineImage, ReportPayload, SlotBinding, SlotBindings, TemplateKey, MAP_IMAGE_KEY,
    MAP_IMAGE_WIDTH_CM, REFERENCE_IMAGE_KEY,
};
use vlf_domain::repository::{ReferenceImageRepository, TemplateRepository};
use vlf_domain::service::{
    bind_all, expected_slots, locate_template, normalize, select_template, NormalizeOptions,
    Uploads,
};
use vlf_domain::service::normalizer::parse_segment_count;
use vlf_infra::docx::{DocxTemplate, RenderContext};
use vlf_infra::map::MapRenderer;
use vlf_types::{Environment, PhaseType, Result};

use crate::output_file::output_file_name;

/// One generation request
#[derive(Debug, Clone)]
pub struct ReportRequest {
    /// Form fields as a JSON object
    pub payload_json: String,
    pub uploads: Uploads,
    /// Chosen separately from the payload
    pub environment: Environment,
    /// Processing date written into the report
    pub today: NaiveDate,
}

/// Naming and normalization settings shared by every request
#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub normalize: NormalizeOptions,
    pub output_file_name: String,
    pub file_name_field: Option<String>,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            normalize: NormalizeOptions::default(),
            output_file_name: "reporte_vlf.docx".to_string(),
            file_name_field: None,
        }
    }
}

/// Finished document plus what went into it
#[derive(Debug, Clone)]
pub struct GeneratedReport {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub template: TemplateKey,
    pub environment: Environment,
    pub slot_count: usize,
    pub image_count: usize,
    pub reference_bound: bool,
}

/// Slots a payload expects, for uploaders
#[derive(Debug, Clone, Serialize)]
pub struct SlotPlan {
    pub phase_type: String,
    pub segment_count: u32,
    pub template: String,
    pub slots: Vec<String>,
}

/// Phase type, segment count and slot keys of a payload, without needing
/// coordinates or rendering anything
pub fn plan_slots(payload_json: &str) -> Result<SlotPlan> {
    let payload = ReportPayload::from_json_str(payload_json)?;
    let segment_count = parse_segment_count(&payload)?;
    let phase_type = PhaseType::parse(&payload.text("tipoTramos").unwrap_or_default());
    let template = select_template(&phase_type, segment_count);

    Ok(SlotPlan {
        phase_type: phase_type.to_string(),
        segment_count,
        template: template.file_name(),
        slots: expected_slots(&phase_type, segment_count)
            .into_iter()
            .map(|k| k.to_string())
            .collect(),
    })
}

/// Merge payload fields, slot bindings and the map into one rendering context
pub fn assemble_context(
    payload: &ReportPayload,
    bindings: SlotBindings,
    map_png: Vec<u8>,
) -> RenderContext {
    let mut ctx = RenderContext::new(payload.to_json());

    for (key, binding) in bindings.slots {
        match binding {
            SlotBinding::Image(image) => ctx.insert_image(key.as_str(), image),
            SlotBinding::Empty => ctx.insert_blank(key.as_str()),
        }
    }
    if let Some(reference) = bindings.reference {
        ctx.insert_image(REFERENCE_IMAGE_KEY, reference);
    }
    ctx.insert_image(MAP_IMAGE_KEY, InlineImage::new(map_png, MAP_IMAGE_WIDTH_CM));

    ctx
}

/// Report generation use case
pub struct ReportService<'a> {
    templates: &'a dyn TemplateRepository,
    images: &'a dyn ReferenceImageRepository,
    map: &'a MapRenderer,
    options: ReportOptions,
}

impl<'a> ReportService<'a> {
    pub fn new(
        templates: &'a dyn TemplateRepository,
        images: &'a dyn ReferenceImageRepository,
        map: &'a MapRenderer,
        options: ReportOptions,
    ) -> Self {
        Self {
            templates,
            images,
            map,
            options,
        }
    }

    pub fn generate(&self, request: ReportRequest) -> Result<GeneratedReport> {
        let payload = ReportPayload::from_json_str(&request.payload_json)?;
        let report = normalize(payload, self.options.normalize, request.today)?;

        let template = select_template(&report.phase_type, report.segment_count);
        let template_path = locate_template(self.templates, &report.phase_type, report.segment_count)?;
        tracing::info!("Using template {}", template.file_name());

        let map_png = self.map.render(&report.coordinates, request.environment)?;

        let bindings = bind_all(
            &report.phase_type,
            report.segment_count,
            &report.test_voltage,
            request.uploads,
            self.images,
        )?;
        let slot_count = bindings.slots.len();
        let image_count = bindings.image_count();
        let reference_bound = bindings.reference.is_some();

        let file_name = output_file_name(
            &report.payload,
            self.options.file_name_field.as_deref(),
            &self.options.output_file_name,
        );

        let ctx = assemble_context(&report.payload, bindings, map_png);
        let bytes = DocxTemplate::open(&template_path)?.render(&ctx)?;

        tracing::info!(
            "Generated {} ({} of {} slots with photos)",
            file_name,
            image_count,
            slot_count
        );

        Ok(GeneratedReport {
            bytes,
            file_name,
            template,
            environment: request.environment,
            slot_count,
            image_count,
            reference_bound,
        })
    }
}
