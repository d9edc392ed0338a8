use chrono::NaiveDate;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::formatter::FormattedOutput;
use crate::logo::HeaderImage;
use crate::markup::Span;
use crate::models::ReportMetadata;

pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

const FONT: &str = "Segoe UI";
/// Half-points, so 14 pt
const FONT_SIZE: u32 = 28;

const NS_W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_WP: &str = "http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing";
const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const NS_PIC: &str = "http://schemas.openxmlformats.org/drawingml/2006/picture";
const XML_DECL: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n";

#[derive(Debug, thiserror::Error)]
pub enum DocxError {
    #[error("failed to write document archive: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("failed to write document part: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParagraphStyle {
    Normal,
    Heading1,
    ListBullet,
}

impl ParagraphStyle {
    fn style_id(&self) -> &'static str {
        match self {
            ParagraphStyle::Normal => "Normal",
            ParagraphStyle::Heading1 => "Heading1",
            ParagraphStyle::ListBullet => "ListBullet",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Center,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(Span),
    LineBreak,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paragraph {
    pub style: ParagraphStyle,
    pub alignment: Option<Alignment>,
    pub inlines: Vec<Inline>,
}

impl Paragraph {
    fn new(style: ParagraphStyle) -> Self {
        Self {
            style,
            alignment: None,
            inlines: Vec::new(),
        }
    }

    fn aligned(mut self, alignment: Alignment) -> Self {
        self.alignment = Some(alignment);
        self
    }

    fn text(mut self, span: Span) -> Self {
        self.inlines.push(Inline::Text(span));
        self
    }

    fn line_break(mut self) -> Self {
        self.inlines.push(Inline::LineBreak);
        self
    }

    /// Regular text where each `\n` becomes a line break
    fn multiline(mut self, text: &str) -> Self {
        for (index, line) in text.split('\n').enumerate() {
            if index > 0 {
                self.inlines.push(Inline::LineBreak);
            }
            let line = line.trim_end_matches('\r');
            if !line.is_empty() {
                self.inlines.push(Inline::Text(Span::regular(line)));
            }
        }
        self
    }

    pub fn spans(&self) -> impl Iterator<Item = &Span> {
        self.inlines.iter().filter_map(|inline| match inline {
            Inline::Text(span) => Some(span),
            Inline::LineBreak => None,
        })
    }

    pub fn plain_text(&self) -> String {
        self.spans().map(|s| s.text.as_str()).collect()
    }
}

/// A report ready to be written out as `.docx`
#[derive(Debug, Clone)]
pub struct ReportDocument {
    pub title: String,
    pub created: NaiveDate,
    /// Logo slots in header order; an empty slot keeps the other logo in place.
    pub header_images: Vec<Option<HeaderImage>>,
    pub paragraphs: Vec<Paragraph>,
}

impl ReportDocument {
    /// Lay out heading, metadata lines and body.
    ///
    /// Only the first two header slots are used.
    pub fn assemble(
        metadata: &ReportMetadata,
        body: &FormattedOutput,
        mut header_images: Vec<Option<HeaderImage>>,
    ) -> Self {
        header_images.truncate(2);

        let title = metadata.title();
        let mut paragraphs = vec![Paragraph::new(ParagraphStyle::Heading1)
            .aligned(Alignment::Center)
            .text(Span::regular(title.clone()))];

        let mut date_venue = Paragraph::new(ParagraphStyle::Normal)
            .aligned(Alignment::Left)
            .text(Span::regular(format!(
                "Date: {}",
                metadata.generated_on.format("%Y-%m-%d")
            )));
        if let Some(venue) = &metadata.venue {
            date_venue = date_venue
                .line_break()
                .text(Span::regular(format!("Venue: {}", venue)));
        }
        paragraphs.push(date_venue);

        if let Some(name) = &metadata.conducted_by {
            paragraphs.push(
                Paragraph::new(ParagraphStyle::Normal)
                    .text(Span::regular(format!("Conducted by: {}", name))),
            );
        }

        match body {
            FormattedOutput::Bullets(bullets) if !bullets.is_empty() => {
                paragraphs.push(
                    Paragraph::new(ParagraphStyle::Normal)
                        .text(Span::regular("Event Highlights:")),
                );
                for bullet in bullets {
                    let mut item = Paragraph::new(ParagraphStyle::ListBullet);
                    item.inlines
                        .extend(bullet.spans.iter().cloned().map(Inline::Text));
                    paragraphs.push(item);
                }
            }
            FormattedOutput::Bullets(_) => {}
            FormattedOutput::Paragraph(text) => {
                if !text.trim().is_empty() {
                    paragraphs.push(Paragraph::new(ParagraphStyle::Normal).multiline(text));
                }
            }
        }

        Self {
            title,
            created: metadata.generated_on,
            header_images,
            paragraphs,
        }
    }

    /// Loaded logos with their slot index
    fn logos(&self) -> impl Iterator<Item = (usize, &HeaderImage)> {
        self.header_images
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|image| (index, image)))
    }

    pub fn bullet_count(&self) -> usize {
        self.paragraphs
            .iter()
            .filter(|p| p.style == ParagraphStyle::ListBullet)
            .count()
    }

    /// Serialize to an in-memory `.docx` archive
    pub fn to_bytes(&self) -> Result<Vec<u8>, DocxError> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options =
            SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        let mut parts: Vec<(String, Vec<u8>)> = vec![
            ("[Content_Types].xml".into(), Self::content_types_xml().into_bytes()),
            ("_rels/.rels".into(), Self::package_rels_xml().into_bytes()),
            ("docProps/core.xml".into(), self.core_xml().into_bytes()),
            ("word/document.xml".into(), self.document_xml().into_bytes()),
            ("word/_rels/document.xml.rels".into(), Self::document_rels_xml().into_bytes()),
            ("word/styles.xml".into(), Self::styles_xml().into_bytes()),
            ("word/numbering.xml".into(), Self::numbering_xml().into_bytes()),
            ("word/header1.xml".into(), self.header_xml().into_bytes()),
            ("word/_rels/header1.xml.rels".into(), self.header_rels_xml().into_bytes()),
        ];
        for (index, image) in self.logos() {
            parts.push((format!("word/media/image{}.png", index + 1), image.png.clone()));
        }

        for (name, content) in parts {
            zip.start_file(name, options)?;
            zip.write_all(&content)?;
        }

        let cursor = zip.finish()?;
        tracing::debug!(bytes = cursor.get_ref().len(), "document serialized");
        Ok(cursor.into_inner())
    }

    fn document_xml(&self) -> String {
        let mut xml = String::from(XML_DECL);
        xml.push_str(&format!(
            "<w:document xmlns:w=\"{}\" xmlns:r=\"{}\"><w:body>",
            NS_W, NS_R
        ));
        for paragraph in &self.paragraphs {
            xml.push_str(&Self::paragraph_xml(paragraph));
        }
        xml.push_str("<w:sectPr><w:headerReference w:type=\"default\" r:id=\"rId3\"/>");
        xml.push_str("<w:pgSz w:w=\"12240\" w:h=\"15840\"/>");
        xml.push_str("<w:pgMar w:top=\"1440\" w:right=\"1440\" w:bottom=\"1440\" w:left=\"1440\" w:header=\"720\" w:footer=\"720\" w:gutter=\"0\"/>");
        xml.push_str("</w:sectPr></w:body></w:document>");
        xml
    }

    fn paragraph_xml(paragraph: &Paragraph) -> String {
        let mut xml = String::from("<w:p><w:pPr>");
        xml.push_str(&format!(
            "<w:pStyle w:val=\"{}\"/>",
            paragraph.style.style_id()
        ));
        if paragraph.style == ParagraphStyle::ListBullet {
            xml.push_str("<w:numPr><w:ilvl w:val=\"0\"/><w:numId w:val=\"1\"/></w:numPr>");
        }
        match paragraph.alignment {
            Some(Alignment::Center) => xml.push_str("<w:jc w:val=\"center\"/>"),
            Some(Alignment::Left) => xml.push_str("<w:jc w:val=\"left\"/>"),
            None => {}
        }
        xml.push_str("</w:pPr>");

        for inline in &paragraph.inlines {
            match inline {
                Inline::Text(span) => xml.push_str(&Self::run_xml(span)),
                Inline::LineBreak => xml.push_str("<w:r><w:br/></w:r>"),
            }
        }
        xml.push_str("</w:p>");
        xml
    }

    fn run_xml(span: &Span) -> String {
        let mut xml = String::from("<w:r><w:rPr>");
        xml.push_str(&format!(
            "<w:rFonts w:ascii=\"{0}\" w:hAnsi=\"{0}\" w:eastAsia=\"{0}\" w:cs=\"{0}\"/>",
            FONT
        ));
        if span.bold {
            xml.push_str("<w:b/><w:bCs/>");
        }
        xml.push_str(&format!(
            "<w:sz w:val=\"{0}\"/><w:szCs w:val=\"{0}\"/>",
            FONT_SIZE
        ));
        xml.push_str("</w:rPr>");
        xml.push_str(&format!(
            "<w:t xml:space=\"preserve\">{}</w:t></w:r>",
            escape_xml(&span.text)
        ));
        xml
    }

    fn header_xml(&self) -> String {
        let mut xml = String::from(XML_DECL);
        xml.push_str(&format!(
            "<w:hdr xmlns:w=\"{}\" xmlns:r=\"{}\" xmlns:wp=\"{}\">",
            NS_W, NS_R, NS_WP
        ));

        // Blank paragraph after slot 0; also keeps the header non-empty
        let mut spacer = true;
        for (index, image) in self.logos() {
            if index > 0 && spacer {
                xml.push_str("<w:p/>");
                spacer = false;
            }
            xml.push_str(&Self::image_paragraph_xml(index, image));
        }
        if spacer {
            xml.push_str("<w:p/>");
        }

        xml.push_str("</w:hdr>");
        xml
    }

    fn image_paragraph_xml(index: usize, image: &HeaderImage) -> String {
        let id = index + 1;
        format!(
            concat!(
                "<w:p><w:r><w:drawing>",
                "<wp:inline distT=\"0\" distB=\"0\" distL=\"0\" distR=\"0\">",
                "<wp:extent cx=\"{cx}\" cy=\"{cy}\"/>",
                "<wp:docPr id=\"{id}\" name=\"Logo {id}\"/>",
                "<wp:cNvGraphicFramePr><a:graphicFrameLocks xmlns:a=\"{a}\" noChangeAspect=\"1\"/></wp:cNvGraphicFramePr>",
                "<a:graphic xmlns:a=\"{a}\"><a:graphicData uri=\"{pic}\">",
                "<pic:pic xmlns:pic=\"{pic}\">",
                "<pic:nvPicPr><pic:cNvPr id=\"{id}\" name=\"image{id}.png\"/><pic:cNvPicPr/></pic:nvPicPr>",
                "<pic:blipFill><a:blip r:embed=\"rIdImage{id}\"/><a:stretch><a:fillRect/></a:stretch></pic:blipFill>",
                "<pic:spPr><a:xfrm><a:off x=\"0\" y=\"0\"/><a:ext cx=\"{cx}\" cy=\"{cy}\"/></a:xfrm>",
                "<a:prstGeom prst=\"rect\"><a:avLst/></a:prstGeom></pic:spPr>",
                "</pic:pic></a:graphicData></a:graphic>",
                "</wp:inline></w:drawing></w:r></w:p>"
            ),
            cx = image.width_emu,
            cy = image.height_emu,
            id = id,
            a = NS_A,
            pic = NS_PIC,
        )
    }

    fn header_rels_xml(&self) -> String {
        let mut xml = String::from(XML_DECL);
        xml.push_str(
            "<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">",
        );
        for (index, _) in self.logos() {
            xml.push_str(&format!(
                "<Relationship Id=\"rIdImage{0}\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/image\" Target=\"media/image{0}.png\"/>",
                index + 1
            ));
        }
        xml.push_str("</Relationships>");
        xml
    }

    fn core_xml(&self) -> String {
        let mut xml = String::from(XML_DECL);
        xml.push_str("<cp:coreProperties xmlns:cp=\"http://schemas.openxmlformats.org/package/2006/metadata/core-properties\" xmlns:dc=\"http://purl.org/dc/elements/1.1/\" xmlns:dcterms=\"http://purl.org/dc/terms/\" xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\">");
        xml.push_str(&format!("<dc:title>{}</dc:title>", escape_xml(&self.title)));
        xml.push_str("<dc:creator>Knowhow Workshop Reporting</dc:creator>");
        xml.push_str(&format!(
            "<dcterms:created xsi:type=\"dcterms:W3CDTF\">{}T00:00:00Z</dcterms:created>",
            self.created.format("%Y-%m-%d")
        ));
        xml.push_str("</cp:coreProperties>");
        xml
    }

    fn content_types_xml() -> String {
        let mut xml = String::from(XML_DECL);
        xml.push_str("<Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">");
        xml.push_str("<Default Extension=\"rels\" ContentType=\"application/vnd.openxmlformats-package.relationships+xml\"/>");
        xml.push_str("<Default Extension=\"xml\" ContentType=\"application/xml\"/>");
        xml.push_str("<Default Extension=\"png\" ContentType=\"image/png\"/>");
        for (part, kind) in [
            ("/word/document.xml", "officedocument.wordprocessingml.document.main+xml"),
            ("/word/styles.xml", "officedocument.wordprocessingml.styles+xml"),
            ("/word/numbering.xml", "officedocument.wordprocessingml.numbering+xml"),
            ("/word/header1.xml", "officedocument.wordprocessingml.header+xml"),
            ("/docProps/core.xml", "package.core-properties+xml"),
        ] {
            xml.push_str(&format!(
                "<Override PartName=\"{}\" ContentType=\"application/vnd.openxmlformats-{}\"/>",
                part, kind
            ));
        }
        xml.push_str("</Types>");
        xml
    }

    fn package_rels_xml() -> String {
        let mut xml = String::from(XML_DECL);
        xml.push_str("<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">");
        xml.push_str("<Relationship Id=\"rId1\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument\" Target=\"word/document.xml\"/>");
        xml.push_str("<Relationship Id=\"rId2\" Type=\"http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties\" Target=\"docProps/core.xml\"/>");
        xml.push_str("</Relationships>");
        xml
    }

    fn document_rels_xml() -> String {
        let mut xml = String::from(XML_DECL);
        xml.push_str("<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">");
        xml.push_str("<Relationship Id=\"rId1\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles\" Target=\"styles.xml\"/>");
        xml.push_str("<Relationship Id=\"rId2\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/numbering\" Target=\"numbering.xml\"/>");
        xml.push_str("<Relationship Id=\"rId3\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/header\" Target=\"header1.xml\"/>");
        xml.push_str("</Relationships>");
        xml
    }

    fn styles_xml() -> String {
        let mut xml = String::from(XML_DECL);
        xml.push_str(&format!("<w:styles xmlns:w=\"{}\">", NS_W));
        xml.push_str("<w:docDefaults><w:rPrDefault><w:rPr>");
        xml.push_str(&format!(
            "<w:rFonts w:ascii=\"{0}\" w:hAnsi=\"{0}\" w:eastAsia=\"{0}\" w:cs=\"{0}\"/>",
            FONT
        ));
        xml.push_str("<w:sz w:val=\"22\"/><w:szCs w:val=\"22\"/></w:rPr></w:rPrDefault>");
        xml.push_str("<w:pPrDefault><w:pPr><w:spacing w:after=\"160\" w:line=\"259\" w:lineRule=\"auto\"/></w:pPr></w:pPrDefault></w:docDefaults>");
        xml.push_str("<w:style w:type=\"paragraph\" w:default=\"1\" w:styleId=\"Normal\"><w:name w:val=\"Normal\"/><w:qFormat/></w:style>");
        xml.push_str("<w:style w:type=\"paragraph\" w:styleId=\"Heading1\"><w:name w:val=\"heading 1\"/><w:basedOn w:val=\"Normal\"/><w:next w:val=\"Normal\"/><w:qFormat/>");
        xml.push_str("<w:pPr><w:keepNext/><w:spacing w:before=\"240\" w:after=\"120\"/><w:outlineLvl w:val=\"0\"/></w:pPr>");
        xml.push_str("<w:rPr><w:b/><w:color w:val=\"2F5496\"/></w:rPr></w:style>");
        xml.push_str("<w:style w:type=\"paragraph\" w:styleId=\"ListBullet\"><w:name w:val=\"List Bullet\"/><w:basedOn w:val=\"Normal\"/>");
        xml.push_str("<w:pPr><w:numPr><w:numId w:val=\"1\"/></w:numPr><w:ind w:left=\"720\" w:hanging=\"360\"/></w:pPr></w:style>");
        xml.push_str("</w:styles>");
        xml
    }

    fn numbering_xml() -> String {
        let mut xml = String::from(XML_DECL);
        xml.push_str(&format!("<w:numbering xmlns:w=\"{}\">", NS_W));
        xml.push_str("<w:abstractNum w:abstractNumId=\"0\"><w:multiLevelType w:val=\"hybridMultilevel\"/>");
        xml.push_str("<w:lvl w:ilvl=\"0\"><w:start w:val=\"1\"/><w:numFmt w:val=\"bullet\"/><w:lvlText w:val=\"\u{2022}\"/><w:lvlJc w:val=\"left\"/>");
        xml.push_str("<w:pPr><w:ind w:left=\"720\" w:hanging=\"360\"/></w:pPr></w:lvl></w:abstractNum>");
        xml.push_str("<w:num w:numId=\"1\"><w:abstractNumId w:val=\"0\"/></w:num>");
        xml.push_str("</w:numbering>");
        xml
    }
}

/// Escape text for XML content and attributes, dropping characters XML 1.0 forbids
pub(crate) fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            '\t' | '\n' | '\r' => escaped.push(c),
            c if (c as u32) < 0x20 => {}
            c => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logo::sample_png;
    use crate::markup::{self, Bullet};
    use crate::models::Domain;
    use std::io::Read;

    fn metadata() -> ReportMetadata {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        ReportMetadata::new(Domain::CloudNative, date, date)
            .with_conducted_by("Asha Rao")
            .with_venue("Seminar Hall")
    }

    fn read_part(bytes: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut file = archive.by_name(name).unwrap();
        let mut content = String::new();
        file.read_to_string(&mut content).unwrap();
        content
    }

    #[test]
    fn test_bullet_report_layout() {
        let body = FormattedOutput::Bullets(markup::parse_bullets(
            "**Cloud** computing was introduced; Containers were built",
        ));
        let doc = ReportDocument::assemble(&metadata(), &body, Vec::new());

        assert_eq!(doc.paragraphs[0].style, ParagraphStyle::Heading1);
        assert_eq!(doc.paragraphs[0].alignment, Some(Alignment::Center));
        assert_eq!(
            doc.paragraphs[0].plain_text(),
            "Knowhow Cloud Native workshop 2024-03-01"
        );
        assert_eq!(
            doc.paragraphs[1].inlines,
            vec![
                Inline::Text(Span::regular("Date: 2024-03-01")),
                Inline::LineBreak,
                Inline::Text(Span::regular("Venue: Seminar Hall")),
            ]
        );
        assert_eq!(doc.paragraphs[2].plain_text(), "Conducted by: Asha Rao");
        assert_eq!(doc.paragraphs[3].plain_text(), "Event Highlights:");
        assert_eq!(doc.bullet_count(), 2);

        let first: Vec<&Span> = doc.paragraphs[4].spans().collect();
        assert_eq!(first[0], &Span::bold("Cloud"));
        assert_eq!(first[1], &Span::regular(" computing was introduced"));
    }

    #[test]
    fn test_empty_bullet_list_has_no_highlights_heading() {
        let body = FormattedOutput::Bullets(Vec::<Bullet>::new());
        let doc = ReportDocument::assemble(&metadata(), &body, Vec::new());
        assert_eq!(doc.paragraphs.len(), 3);
        assert_eq!(doc.bullet_count(), 0);
    }

    #[test]
    fn test_paragraph_report_without_optional_metadata() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let meta = ReportMetadata::new(Domain::Iot, date, date);
        let body = FormattedOutput::Paragraph("A workshop on sensors was held.".to_string());
        let doc = ReportDocument::assemble(&meta, &body, Vec::new());

        assert_eq!(doc.paragraphs.len(), 3);
        assert_eq!(doc.paragraphs[1].plain_text(), "Date: 2024-03-01");
        assert_eq!(doc.paragraphs[2].plain_text(), "A workshop on sensors was held.");
        assert_eq!(doc.bullet_count(), 0);
    }

    #[test]
    fn test_serialized_document_contains_runs() {
        let body = FormattedOutput::Bullets(markup::bullets_with_minimum(
            "**Docker** & <Compose> were shown",
        ));
        let bytes = ReportDocument::assemble(&metadata(), &body, Vec::new())
            .to_bytes()
            .unwrap();
        assert!(bytes.starts_with(b"PK"));

        let document = read_part(&bytes, "word/document.xml");
        assert!(document.contains("<w:b/><w:bCs/><w:sz w:val=\"28\"/><w:szCs w:val=\"28\"/></w:rPr><w:t xml:space=\"preserve\">Docker</w:t>"));
        assert!(document.contains(" &amp; &lt;Compose&gt; were shown"));
        assert_eq!(document.matches("<w:pStyle w:val=\"ListBullet\"/>").count(), 5);
        assert!(document.contains("<w:jc w:val=\"center\"/>"));
        assert!(document.contains("w:ascii=\"Segoe UI\""));

        let core = read_part(&bytes, "docProps/core.xml");
        assert!(core.contains("<dc:title>Knowhow Cloud Native workshop 2024-03-01</dc:title>"));
    }

    #[test]
    fn test_header_images_embedded() {
        let logos = vec![
            Some(HeaderImage::from_bytes(&sample_png(20, 10)).unwrap()),
            Some(HeaderImage::from_bytes(&sample_png(10, 10)).unwrap()),
        ];
        let doc = ReportDocument::assemble(
            &metadata(),
            &FormattedOutput::Paragraph("x".into()),
            logos,
        );
        let bytes = doc.to_bytes().unwrap();

        let header = read_part(&bytes, "word/header1.xml");
        assert_eq!(header.matches("<w:drawing>").count(), 2);
        assert!(header.contains("r:embed=\"rIdImage2\""));
        let rels = read_part(&bytes, "word/_rels/header1.xml.rels");
        assert!(rels.contains("media/image1.png"));
        assert!(rels.contains("media/image2.png"));

        let mut archive = zip::ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
        assert!(archive.by_name("word/media/image2.png").is_ok());
    }

    #[test]
    fn test_missing_first_logo_keeps_second_below_spacer() {
        let logos = vec![None, Some(HeaderImage::from_bytes(&sample_png(10, 10)).unwrap())];
        let doc = ReportDocument::assemble(
            &metadata(),
            &FormattedOutput::Paragraph("x".into()),
            logos,
        );
        let bytes = doc.to_bytes().unwrap();

        let header = read_part(&bytes, "word/header1.xml");
        let spacer = header.find("<w:p/>").unwrap();
        let drawing = header.find("<w:drawing>").unwrap();
        assert!(spacer < drawing);
        assert_eq!(header.matches("<w:drawing>").count(), 1);
        assert!(header.contains("r:embed=\"rIdImage2\""));

        let rels = read_part(&bytes, "word/_rels/header1.xml.rels");
        assert!(!rels.contains("media/image1.png"));
        assert!(rels.contains("media/image2.png"));
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
        assert!(archive.by_name("word/media/image2.png").is_ok());
    }

    #[test]
    fn test_paragraph_newlines_become_line_breaks() {
        let body = FormattedOutput::Paragraph("Line one.\n\nLine two.".to_string());
        let doc = ReportDocument::assemble(&metadata(), &body, Vec::new());

        let last = doc.paragraphs.last().unwrap();
        assert_eq!(
            last.inlines,
            vec![
                Inline::Text(Span::regular("Line one.")),
                Inline::LineBreak,
                Inline::LineBreak,
                Inline::Text(Span::regular("Line two.")),
            ]
        );

        let document = read_part(&doc.to_bytes().unwrap(), "word/document.xml");
        assert!(document.contains("<w:r><w:br/></w:r><w:r><w:br/></w:r>"));
        assert!(!document.contains("Line one.\n"));
    }

    #[test]
    fn test_header_without_images_still_valid() {
        let doc = ReportDocument::assemble(
            &metadata(),
            &FormattedOutput::Paragraph("x".into()),
            Vec::new(),
        );
        let bytes = doc.to_bytes().unwrap();
        let header = read_part(&bytes, "word/header1.xml");
        assert!(header.contains("<w:p/>"));
        assert!(!header.contains("<w:drawing>"));
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("A & B"), "A &amp; B");
        assert_eq!(escape_xml("<b>\"x\"</b>"), "&lt;b&gt;&quot;x&quot;&lt;/b&gt;");
        assert_eq!(escape_xml("bell\u{7}"), "bell");
    }
}
