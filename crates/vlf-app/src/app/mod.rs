//! Use cases

pub mod report_service;

pub use report_service::{
    assemble_context, plan_slots, GeneratedReport, ReportOptions, ReportRequest, ReportService,
    SlotPlan,
};
