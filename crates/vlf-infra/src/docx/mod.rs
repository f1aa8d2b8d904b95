//! Word template filling
//!
//! A template is a .docx whose text carries handlebars expressions:
//! `{{campo}}` for values, `{{#if campo}}...{{/if}}` blocks, and image
//! placeholders that are replaced by inline pictures.

pub mod markup;
pub mod media;
pub mod package;

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::Path;

use handlebars::Handlebars;
use serde_json::{Map, Value};
use vlf_domain::model::InlineImage;
use vlf_types::{Error, Result};

pub use media::MediaEmbedder;
pub use package::DocxPackage;

/// Values and images available to a template
#[derive(Debug, Clone, Default)]
pub struct RenderContext {
    fields: Map<String, Value>,
    images: BTreeMap<String, InlineImage>,
}

impl RenderContext {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self {
            fields,
            images: BTreeMap::new(),
        }
    }

    pub fn insert_field(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        self.images.remove(&key);
        self.fields.insert(key, value.into());
    }

    pub fn insert_image(&mut self, key: impl Into<String>, image: InlineImage) {
        let key = key.into();
        self.fields.remove(&key);
        self.images.insert(key, image);
    }

    /// Placeholder renders as nothing
    pub fn insert_blank(&mut self, key: impl Into<String>) {
        self.insert_field(key, Value::String(String::new()));
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key) || self.images.contains_key(key)
    }

    pub fn image(&self, key: &str) -> Option<&InlineImage> {
        self.images.get(key)
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}

/// Parts that carry document text
pub fn is_text_part(name: &str) -> bool {
    if name == "word/document.xml" {
        return true;
    }
    let Some(file) = name.strip_prefix("word/") else {
        return false;
    };
    if file.contains('/') || !file.ends_with(".xml") {
        return false;
    }
    let stem = &file[..file.len() - 4];
    ["header", "footer"].iter().any(|prefix| {
        stem.strip_prefix(prefix)
            .is_some_and(|n| n.chars().all(|c| c.is_ascii_digit()))
    })
}

/// A loaded .docx template
#[derive(Debug, Clone)]
pub struct DocxTemplate {
    package: DocxPackage,
}

impl DocxTemplate {
    pub fn open(path: &Path) -> Result<Self> {
        tracing::debug!("Opening template {}", path.display());
        Ok(Self {
            package: DocxPackage::open(path)?,
        })
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(Self {
            package: DocxPackage::from_bytes(bytes)?,
        })
    }

    fn text_parts(&self) -> Vec<String> {
        self.package
            .names()
            .filter(|n| is_text_part(n))
            .map(str::to_string)
            .collect()
    }

    /// Names referenced by plain `{{name}}` expressions in every text part
    pub fn placeholders(&self) -> Result<BTreeSet<String>> {
        let no_images = HashSet::new();
        let mut names = BTreeSet::new();
        for part in self.text_parts() {
            if let Some(xml) = self.package.get_xml(&part)? {
                names.extend(markup::placeholders(&markup::prepare(&xml, &no_images)?));
            }
        }
        Ok(names)
    }

    /// Fill every text part and return the finished .docx bytes
    pub fn render(mut self, ctx: &RenderContext) -> Result<Vec<u8>> {
        let mut hb = Handlebars::new();
        hb.set_strict_mode(false);
        hb.register_escape_fn(|s| quick_xml::escape::escape(s).into_owned());

        let image_keys: HashSet<&str> = ctx.images.keys().map(String::as_str).collect();
        let mut embedder = MediaEmbedder::for_package(&self.package)?;

        for part in self.text_parts() {
            let Some(xml) = self.package.get_xml(&part)? else {
                continue;
            };
            let prepared = markup::prepare(&xml, &image_keys)?;
            for name in markup::placeholders(&prepared) {
                if !ctx.contains(&name) {
                    tracing::debug!("{}: no value for {{{{{}}}}}", part, name);
                }
            }

            let mut data = ctx.fields.clone();
            for (key, image) in &ctx.images {
                if prepared.contains(&format!("{{{{{{{}}}}}}}", key)) {
                    let drawing = embedder.embed(&self.package, &part, image)?;
                    data.insert(key.clone(), Value::String(drawing));
                }
            }

            let rendered = hb
                .render_template(&prepared, &Value::Object(data))
                .map_err(|e| Error::Render(format!("{}: {}", part, e)))?;
            markup::check_well_formed(&rendered)
                .map_err(|e| Error::Render(format!("{} is not well-formed after filling: {}", part, e)))?;
            self.package.set(&part, rendered.into_bytes());
        }

        tracing::debug!("Embedded {} media files", embedder.media_count());
        embedder.finish(&mut self.package)?;
        self.package.to_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};
    use serde_json::json;
    use std::io::Cursor;

    const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/></Types>"#;

    fn document(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
            body
        )
    }

    fn template(body: &str) -> DocxTemplate {
        let mut package = DocxPackage::default();
        package.set("[Content_Types].xml", CONTENT_TYPES.as_bytes().to_vec());
        package.set("word/document.xml", document(body).into_bytes());
        DocxTemplate::from_bytes(&package.to_bytes().unwrap()).unwrap()
    }

    fn rendered_document(bytes: &[u8]) -> String {
        DocxPackage::from_bytes(bytes)
            .unwrap()
            .get_xml("word/document.xml")
            .unwrap()
            .unwrap()
    }

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, Rgb([0, 128, 255]));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_is_text_part() {
        assert!(is_text_part("word/document.xml"));
        assert!(is_text_part("word/header1.xml"));
        assert!(is_text_part("word/footer.xml"));
        assert!(!is_text_part("word/styles.xml"));
        assert!(!is_text_part("word/_rels/document.xml.rels"));
        assert!(!is_text_part("word/headerX.xml"));
    }

    #[test]
    fn test_render_text_fields_escaped() {
        let tpl = template("<w:p><w:r><w:t>Cliente: {{cliente}}</w:t></w:r></w:p>");
        let ctx = RenderContext::new(json!({"cliente": "A & B <SAC>"}).as_object().unwrap().clone());
        let xml = rendered_document(&tpl.render(&ctx).unwrap());
        assert!(xml.contains("Cliente: A &amp; B &lt;SAC&gt;"));
    }

    #[test]
    fn test_render_split_placeholder() {
        let tpl = template(
            "<w:p><w:r><w:t>{{clien</w:t></w:r><w:r><w:rPr><w:b/></w:rPr><w:t>te}}</w:t></w:r></w:p>",
        );
        let ctx = RenderContext::new(json!({"cliente": "ACME"}).as_object().unwrap().clone());
        let xml = rendered_document(&tpl.render(&ctx).unwrap());
        assert!(xml.contains("<w:t>ACME</w:t>"));
    }

    #[test]
    fn test_missing_field_renders_empty() {
        let tpl = template("<w:p><w:r><w:t>[{{nada}}]</w:t></w:r></w:p>");
        let xml = rendered_document(&tpl.render(&RenderContext::default()).unwrap());
        assert!(xml.contains("<w:t>[]</w:t>"));
    }

    #[test]
    fn test_conditional_paragraphs() {
        let body = concat!(
            "<w:p><w:r><w:t>{{#if observaciones}}</w:t></w:r></w:p>",
            "<w:p><w:r><w:t>Obs: {{observaciones}}</w:t></w:r></w:p>",
            "<w:p><w:r><w:t>{{/if}}</w:t></w:r></w:p>",
            "<w:p><w:r><w:t>Fin</w:t></w:r></w:p>"
        );

        let xml = rendered_document(&template(body).render(&RenderContext::default()).unwrap());
        assert!(!xml.contains("Obs:"));
        assert!(!xml.contains("{{"));
        assert!(xml.contains("Fin"));

        let ctx = RenderContext::new(json!({"observaciones": "ninguna"}).as_object().unwrap().clone());
        let xml = rendered_document(&template(body).render(&ctx).unwrap());
        assert!(xml.contains("Obs: ninguna"));
    }

    #[test]
    fn test_image_and_blank_slots() {
        let tpl = template(concat!(
            "<w:p><w:r><w:t>{{imgPruebaTramoTrm1A}}</w:t></w:r></w:p>",
            "<w:p><w:r><w:t>{{imgPruebaTramoTrm1B}}</w:t></w:r></w:p>"
        ));
        let mut ctx = RenderContext::default();
        ctx.insert_image("imgPruebaTramoTrm1A", InlineImage::new(png(20, 10), 14.0));
        ctx.insert_blank("imgPruebaTramoTrm1B");

        let bytes = tpl.render(&ctx).unwrap();
        let package = DocxPackage::from_bytes(&bytes).unwrap();
        let xml = package.get_xml("word/document.xml").unwrap().unwrap();

        assert_eq!(xml.matches("<w:drawing>").count(), 1);
        assert!(xml.contains(r#"<wp:extent cx="5040000" cy="2520000"/>"#));
        assert!(!xml.contains("imgPruebaTramoTrm"));
        assert!(package.names().any(|n| n.starts_with("word/media/vlf_")));
        let rels = package.get_xml("word/_rels/document.xml.rels").unwrap().unwrap();
        assert!(rels.contains(r#"Id="rId1""#));
    }

    #[test]
    fn test_conditional_inside_text_box() {
        let tpl = template(concat!(
            "<w:p><w:r><w:t>Cabecera</w:t></w:r><w:r><w:pict><w:txbxContent>",
            "<w:p><w:r><w:t>{{#if x}}</w:t></w:r></w:p>",
            "<w:p><w:r><w:t>y</w:t></w:r></w:p>",
            "<w:p><w:r><w:t>{{/if}}</w:t></w:r></w:p>",
            "</w:txbxContent></w:pict></w:r></w:p>"
        ));
        let xml = rendered_document(&tpl.render(&RenderContext::default()).unwrap());
        assert!(xml.contains("<w:txbxContent></w:txbxContent>"));
        assert!(markup::check_well_formed(&xml).is_ok());
    }

    #[test]
    fn test_unbalanced_block_is_render_error() {
        let tpl = template(concat!(
            "<w:p><w:r><w:t>A {{#if x}}</w:t></w:r></w:p>",
            "<w:tbl><w:tr><w:tc><w:p><w:r><w:t>{{/if}} B</w:t></w:r></w:p></w:tc></w:tr></w:tbl>"
        ));
        assert!(matches!(
            tpl.render(&RenderContext::default()),
            Err(Error::Render(_))
        ));
    }

    #[test]
    fn test_header_fields_and_image() {
        let mut package = DocxPackage::default();
        package.set("[Content_Types].xml", CONTENT_TYPES.as_bytes().to_vec());
        package.set(
            "word/document.xml",
            document("<w:p><w:r><w:t>{{imgMapsProyecto}}</w:t></w:r></w:p>").into_bytes(),
        );
        package.set(
            "word/header1.xml",
            concat!(
                r#"<w:hdr xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">"#,
                "<w:p><w:r><w:t>Proyecto {{codigo}}</w:t></w:r></w:p>",
                "<w:p><w:r><w:t>{{imgMapsProyecto}}</w:t></w:r></w:p>",
                "</w:hdr>"
            )
            .as_bytes()
            .to_vec(),
        );
        let tpl = DocxTemplate::from_bytes(&package.to_bytes().unwrap()).unwrap();

        let mut ctx = RenderContext::new(json!({"codigo": "P-7"}).as_object().unwrap().clone());
        ctx.insert_image("imgMapsProyecto", InlineImage::new(png(8, 8), 18.0));
        let out = DocxPackage::from_bytes(&tpl.render(&ctx).unwrap()).unwrap();

        let header = out.get_xml("word/header1.xml").unwrap().unwrap();
        assert!(header.contains("Proyecto P-7"));
        assert_eq!(header.matches("<w:drawing>").count(), 1);
        let header_rels = out.get_xml("word/_rels/header1.xml.rels").unwrap().unwrap();
        assert!(header_rels.contains("media/vlf_"));

        // drawing ids stay unique across parts
        let body = out.get_xml("word/document.xml").unwrap().unwrap();
        assert!(body.contains(r#"<wp:docPr id="1000""#));
        assert!(header.contains(r#"<wp:docPr id="1001""#));
    }

    #[test]
    fn test_unused_image_not_embedded() {
        let tpl = template("<w:p><w:r><w:t>sin imagen</w:t></w:r></w:p>");
        let mut ctx = RenderContext::default();
        ctx.insert_image("imgMapsProyecto", InlineImage::new(png(4, 4), 18.0));
        let package = DocxPackage::from_bytes(&tpl.render(&ctx).unwrap()).unwrap();
        assert!(!package.names().any(|n| n.starts_with("word/media/")));
    }

    #[test]
    fn test_placeholders() {
        let tpl = template("<w:p><w:r><w:t>{{a}} {{#if b}}{{c}}{{/if}}</w:t></w:r></w:p>");
        let names: Vec<String> = tpl.placeholders().unwrap().into_iter().collect();
        assert_eq!(names, vec!["a", "c"]);
    }

    #[test]
    fn test_context_image_replaces_field() {
        let mut ctx = RenderContext::default();
        ctx.insert_blank("k");
        ctx.insert_image("k", InlineImage::new(vec![1], 1.0));
        assert!(ctx.field("k").is_none());
        assert!(ctx.image("k").is_some());
        assert!(ctx.contains("k"));
    }
}
