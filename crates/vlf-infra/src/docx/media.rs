//! Embedding inline pictures into a docx package

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::io::Cursor;
use std::sync::OnceLock;

use image::{ImageFormat, ImageReader};
use regex::Regex;
use sha2::{Digest, Sha256};
use vlf_domain::model::InlineImage;
use vlf_types::{Error, Result};

use super::is_text_part;
use super::package::DocxPackage;

const IMAGE_REL_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
const EMPTY_RELS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    "\n",
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"></Relationships>"#
);
const CONTENT_TYPES: &str = "[Content_Types].xml";

/// EMU per centimetre
pub const EMU_PER_CM: f64 = 360_000.0;
/// Lowest `docPr` id handed out
const FIRST_DRAWING_ID: u32 = 1000;

fn drawing_id_attr() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"<(?:\w+:)?docPr\b[^>]*?\sid="(\d+)""#).expect("valid regex"))
}

/// Highest `docPr` id in a part
pub fn max_drawing_id(xml: &str) -> Option<u32> {
    drawing_id_attr()
        .captures_iter(xml)
        .filter_map(|caps| caps[1].parse::<u32>().ok())
        .max()
}

/// Image bytes in a format Word displays, plus their media file name
#[derive(Debug, Clone, PartialEq)]
pub struct MediaFile {
    pub name: String,
    pub extension: &'static str,
    pub bytes: Vec<u8>,
    pub width_px: u32,
    pub height_px: u32,
}

impl MediaFile {
    /// Keep PNG/JPEG/GIF/BMP as they are, re-encode anything else to PNG
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let format = image::guess_format(bytes)?;
        let (extension, bytes) = match format {
            ImageFormat::Png => ("png", bytes.to_vec()),
            ImageFormat::Jpeg => ("jpeg", bytes.to_vec()),
            ImageFormat::Gif => ("gif", bytes.to_vec()),
            ImageFormat::Bmp => ("bmp", bytes.to_vec()),
            other => {
                tracing::debug!("Re-encoding {:?} image as PNG", other);
                let decoded = image::load_from_memory_with_format(bytes, other)?;
                let mut buf = Cursor::new(Vec::new());
                decoded.write_to(&mut buf, ImageFormat::Png)?;
                ("png", buf.into_inner())
            }
        };

        let (width_px, height_px) = image_dimensions(&bytes)?;
        let digest = Sha256::digest(&bytes);
        let hash: String = digest.iter().take(8).map(|b| format!("{:02x}", b)).collect();

        Ok(Self {
            name: format!("vlf_{}.{}", hash, extension),
            extension,
            bytes,
            width_px,
            height_px,
        })
    }

    /// Display size in EMU for a fixed width, keeping the aspect ratio
    pub fn extent_emu(&self, width_cm: f64) -> (u64, u64) {
        let cx = (width_cm * EMU_PER_CM).round().max(1.0);
        let cy = (cx * f64::from(self.height_px) / f64::from(self.width_px.max(1))).round();
        (cx as u64, cy.max(1.0) as u64)
    }
}

pub fn image_dimensions(bytes: &[u8]) -> Result<(u32, u32)> {
    let reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
    Ok(reader.into_dimensions()?)
}

pub fn content_type(extension: &str) -> &'static str {
    match extension {
        "jpeg" | "jpg" => "image/jpeg",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        _ => "image/png",
    }
}

/// `word/document.xml` -> `word/_rels/document.xml.rels`
pub fn rels_path(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part),
    }
}

/// Relationship part of one document part, edited as text
#[derive(Debug)]
struct Relationships {
    xml: String,
    next_id: u32,
    by_target: HashMap<String, String>,
    dirty: bool,
}

impl Relationships {
    fn parse(xml: String) -> Self {
        let mut max_id = 0;
        let mut rest = xml.as_str();
        while let Some(pos) = rest.find("Id=\"rId") {
            rest = &rest[pos + 7..];
            let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
            if let Ok(id) = digits.parse::<u32>() {
                max_id = max_id.max(id);
            }
        }
        Self {
            xml,
            next_id: max_id + 1,
            by_target: HashMap::new(),
            dirty: false,
        }
    }

    fn add_image(&mut self, target: &str) -> Result<String> {
        if let Some(id) = self.by_target.get(target) {
            return Ok(id.clone());
        }
        let id = format!("rId{}", self.next_id);
        self.next_id += 1;

        let entry = format!(
            r#"<Relationship Id="{}" Type="{}" Target="{}"/>"#,
            id, IMAGE_REL_TYPE, target
        );
        let end = self
            .xml
            .rfind("</Relationships>")
            .ok_or_else(|| Error::Template("relationships part is not closed".to_string()))?;
        self.xml.insert_str(end, &entry);

        self.by_target.insert(target.to_string(), id.clone());
        self.dirty = true;
        Ok(id)
    }
}

/// Collects media, relationships and content types while parts are rendered
#[derive(Debug)]
pub struct MediaEmbedder {
    media: BTreeMap<String, Vec<u8>>,
    rels: HashMap<String, Relationships>,
    extensions: BTreeSet<&'static str>,
    next_drawing_id: u32,
}

impl Default for MediaEmbedder {
    fn default() -> Self {
        Self {
            media: BTreeMap::new(),
            rels: HashMap::new(),
            extensions: BTreeSet::new(),
            next_drawing_id: FIRST_DRAWING_ID,
        }
    }
}

impl MediaEmbedder {
    /// Drawing ids start above every `docPr` id already in the package's text parts
    pub fn for_package(package: &DocxPackage) -> Result<Self> {
        let mut embedder = Self::default();
        for name in package.names().filter(|n| is_text_part(n)) {
            if let Some(max) = package.get_xml(name)?.as_deref().and_then(max_drawing_id) {
                embedder.next_drawing_id = embedder.next_drawing_id.max(max.saturating_add(1));
            }
        }
        Ok(embedder)
    }

    /// Register an image for `part` and return the run markup that shows it.
    ///
    /// The markup closes the run holding the placeholder text, adds a drawing
    /// run and reopens a text run, so it must replace a placeholder that sits
    /// inside `<w:t>`.
    pub fn embed(&mut self, package: &DocxPackage, part: &str, image: &InlineImage) -> Result<String> {
        let media = MediaFile::from_bytes(&image.bytes)?;
        let target = format!("media/{}", media.name);

        let rels_name = rels_path(part);
        if !self.rels.contains_key(&rels_name) {
            let xml = package
                .get_xml(&rels_name)?
                .unwrap_or_else(|| EMPTY_RELS.to_string());
            self.rels.insert(rels_name.clone(), Relationships::parse(xml));
        }
        let rel_id = match self.rels.get_mut(&rels_name) {
            Some(rels) => rels.add_image(&target)?,
            None => return Err(Error::Template(format!("no relationships for {}", part))),
        };

        let (cx, cy) = media.extent_emu(image.width_cm);
        let drawing_id = self.next_drawing_id;
        self.next_drawing_id += 1;

        tracing::debug!(
            "Embedding {} ({}x{} px) in {} as {}",
            media.name,
            media.width_px,
            media.height_px,
            part,
            rel_id
        );

        let markup = drawing_run(&rel_id, drawing_id, &media.name, cx, cy);
        self.extensions.insert(media.extension);
        self.media.insert(format!("word/{}", target), media.bytes);
        Ok(markup)
    }

    pub fn media_count(&self) -> usize {
        self.media.len()
    }

    /// Write collected media, relationships and content types into the package
    pub fn finish(self, package: &mut DocxPackage) -> Result<()> {
        for (name, bytes) in self.media {
            package.set(&name, bytes);
        }
        for (name, rels) in self.rels {
            if rels.dirty {
                package.set(&name, rels.xml.into_bytes());
            }
        }
        if !self.extensions.is_empty() {
            let types = package
                .get_xml(CONTENT_TYPES)?
                .ok_or_else(|| Error::Template(format!("package has no {}", CONTENT_TYPES)))?;
            let types = ensure_defaults(types, &self.extensions)?;
            package.set(CONTENT_TYPES, types.into_bytes());
        }
        Ok(())
    }
}

fn ensure_defaults(mut types: String, extensions: &BTreeSet<&'static str>) -> Result<String> {
    let lower = types.to_ascii_lowercase();
    let missing: Vec<&str> = extensions
        .iter()
        .copied()
        .filter(|ext| !lower.contains(&format!("extension=\"{}\"", ext)))
        .collect();
    if missing.is_empty() {
        return Ok(types);
    }

    let end = types
        .rfind("</Types>")
        .ok_or_else(|| Error::Template("content types part is not closed".to_string()))?;
    let defaults: String = missing
        .iter()
        .map(|ext| format!(r#"<Default Extension="{}" ContentType="{}"/>"#, ext, content_type(ext)))
        .collect();
    types.insert_str(end, &defaults);
    Ok(types)
}

fn drawing_run(rel_id: &str, drawing_id: u32, name: &str, cx: u64, cy: u64) -> String {
    format!(
        concat!(
            "</w:t></w:r><w:r><w:drawing>",
            r#"<wp:inline xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing" distT="0" distB="0" distL="0" distR="0">"#,
            r#"<wp:extent cx="{cx}" cy="{cy}"/>"#,
            r#"<wp:docPr id="{id}" name="Picture {id}"/>"#,
            r#"<wp:cNvGraphicFramePr><a:graphicFrameLocks xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" noChangeAspect="1"/></wp:cNvGraphicFramePr>"#,
            r#"<a:graphic xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main">"#,
            r#"<a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/picture">"#,
            r#"<pic:pic xmlns:pic="http://schemas.openxmlformats.org/drawingml/2006/picture">"#,
            r#"<pic:nvPicPr><pic:cNvPr id="{id}" name="{name}"/><pic:cNvPicPr/></pic:nvPicPr>"#,
            r#"<pic:blipFill><a:blip xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" r:embed="{rel}"/><a:stretch><a:fillRect/></a:stretch></pic:blipFill>"#,
            r#"<pic:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></pic:spPr>"#,
            "</pic:pic></a:graphicData></a:graphic></wp:inline>",
            r#"</w:drawing></w:r><w:r><w:t xml:space="preserve">"#
        ),
        cx = cx,
        cy = cy,
        id = drawing_id,
        name = name,
        rel = rel_id,
    )
}
