//! Application service layer - report pipeline, config, uploads, output

pub mod app;
pub mod config;
pub mod output_file;
pub mod repository;
pub mod uploads;
