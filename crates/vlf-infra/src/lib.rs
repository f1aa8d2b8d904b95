//! Infrastructure layer - tile fetching, map rendering, docx templating, file stores

pub mod docx;
pub mod map;
pub mod persistence;
pub mod tiles;
