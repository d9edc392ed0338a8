use std::path::PathBuf;

use crate::docx::{DocxError, ReportDocument};
use crate::formatter::{Completion, FormattedOutput, NarrativeFormatter};
use crate::logo::{self, ImageError};
use crate::models::{ReportMetadata, ReportMode};

/// Output of one report generation, before it is offered or uploaded
#[derive(Debug)]
pub struct GeneratedReport {
    pub filename: String,
    pub title: String,
    pub bytes: Vec<u8>,
    pub bullet_count: usize,
    pub completion: Completion,
    pub image_failures: Vec<ImageError>,
}

/// Build and serialize the document from already-obtained completion text
pub fn build_report(
    metadata: &ReportMetadata,
    mode: ReportMode,
    completion: Completion,
    logo_paths: &[PathBuf],
) -> Result<GeneratedReport, DocxError> {
    let body = FormattedOutput::from_text(mode, completion.text());
    let (images, image_failures) = logo::load_header_images(logo_paths);

    let document = ReportDocument::assemble(metadata, &body, images);
    let bytes = document.to_bytes()?;

    Ok(GeneratedReport {
        filename: metadata.filename(),
        title: document.title.clone(),
        bytes,
        bullet_count: document.bullet_count(),
        completion,
        image_failures,
    })
}

/// Reword `points` through the completion service, then build the document.
///
/// A failed completion still yields a document (placeholders in bullet mode).
pub async fn generate_report(
    formatter: &NarrativeFormatter,
    metadata: &ReportMetadata,
    points: &[String],
    mode: ReportMode,
    logo_paths: &[PathBuf],
) -> Result<GeneratedReport, DocxError> {
    let completion = formatter.format_points(points, mode).await;
    build_report(metadata, mode, completion, logo_paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::ReportSession;
    use crate::models::Domain;
    use chrono::NaiveDate;

    fn cloud_native() -> ReportMetadata {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        ReportMetadata::new(Domain::CloudNative, date, date)
            .with_conducted_by("Asha Rao")
            .with_venue("Seminar Hall")
    }

    #[test]
    fn test_end_to_end_with_failed_completion() {
        let mut session = ReportSession::new();
        session.add("Intro to Docker");
        session.add("Hands-on with containers");
        assert_eq!(session.len(), 2);

        let report = build_report(
            &cloud_native(),
            ReportMode::Bullets,
            Completion::Failed("connection refused".into()),
            &[PathBuf::from("/nonexistent/collegelogo.png")],
        )
        .unwrap();

        assert_eq!(report.filename, "report_2024-03-01_Cloud_Native.docx");
        assert_eq!(report.title, "Knowhow Cloud Native workshop 2024-03-01");
        assert!(report.bullet_count >= 5);
        assert_eq!(report.image_failures.len(), 1);
        assert!(report.bytes.starts_with(b"PK"));
    }

    #[test]
    fn test_end_to_end_with_reworded_points() {
        let completion = Completion::Success(
            "**Docker** basics were taught; Containers were run hands-on".into(),
        );
        let report = build_report(&cloud_native(), ReportMode::Bullets, completion, &[]).unwrap();
        assert_eq!(report.bullet_count, 5);
        assert!(report.image_failures.is_empty());
    }

    #[test]
    fn test_paragraph_mode_has_no_bullets() {
        let completion = Completion::Success("A Docker workshop was held.".into());
        let report =
            build_report(&cloud_native(), ReportMode::Paragraph, completion, &[]).unwrap();
        assert_eq!(report.bullet_count, 0);
    }
}
