// Public modules
pub mod collector;
pub mod config;
pub mod docx;
pub mod formatter;
pub mod io;
pub mod logo;
pub mod markup;
pub mod models;
pub mod publisher;
pub mod report;

// Re-export commonly used types
pub use collector::{AddOutcome, ReportSession};
pub use config::Config;
pub use docx::{ReportDocument, DOCX_MIME};
pub use formatter::{Completion, FormattedOutput, NarrativeFormatter};
pub use io::{get_default_reports_dir, load_points};
pub use markup::{Bullet, Span};
pub use models::{Domain, ReportMetadata, ReportMode};
pub use publisher::{
    offer_download, publish, Download, OneDriveUploader, PublishOutcome, UploadError,
};
pub use report::{build_report, generate_report, GeneratedReport};
