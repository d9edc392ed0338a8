use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Workshop domains offered by the club
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Domain {
    AiMl,
    DataScience,
    CloudNative,
    WebDevelopment,
    ArVr,
    Iot,
    Blockchain,
    Cybersecurity,
}

impl Domain {
    pub const ALL: [Domain; 8] = [
        Domain::AiMl,
        Domain::DataScience,
        Domain::CloudNative,
        Domain::WebDevelopment,
        Domain::ArVr,
        Domain::Iot,
        Domain::Blockchain,
        Domain::Cybersecurity,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Domain::AiMl => "AI-ML",
            Domain::DataScience => "DataScience and Analytics",
            Domain::CloudNative => "Cloud Native",
            Domain::WebDevelopment => "Web Development",
            Domain::ArVr => "AR/VR",
            Domain::Iot => "IoT",
            Domain::Blockchain => "Blockchain",
            Domain::Cybersecurity => "Cybersecurity",
        }
    }

    /// Display name with spaces replaced by underscores, as used in filenames.
    /// `/` becomes `-` so the name stays a single path component.
    pub fn slug(&self) -> String {
        self.name().replace(' ', "_").replace('/', "-")
    }

    /// Accepts a 1-based menu number, the display name, or the slug (case-insensitive)
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if let Ok(n) = input.parse::<usize>() {
            return n.checked_sub(1).and_then(|i| Self::ALL.get(i)).copied();
        }
        Self::ALL.iter().copied().find(|domain| {
            domain.name().eq_ignore_ascii_case(input) || domain.slug().eq_ignore_ascii_case(input)
        })
    }
}

/// Which rewording the completion service is asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReportMode {
    #[default]
    Bullets,
    Paragraph,
}

impl ReportMode {
    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug.trim().to_ascii_lowercase().as_str() {
            "bullets" | "bullet" => Some(ReportMode::Bullets),
            "paragraph" => Some(ReportMode::Paragraph),
            _ => None,
        }
    }
}

/// Everything printed above the report body
#[derive(Debug, Clone)]
pub struct ReportMetadata {
    pub domain: Domain,
    pub event_date: NaiveDate,
    /// Date printed on the "Date:" line; the day the report was generated.
    pub generated_on: NaiveDate,
    pub conducted_by: Option<String>,
    pub venue: Option<String>,
}

impl ReportMetadata {
    pub fn new(domain: Domain, event_date: NaiveDate, generated_on: NaiveDate) -> Self {
        Self {
            domain,
            event_date,
            generated_on,
            conducted_by: None,
            venue: None,
        }
    }

    pub fn with_conducted_by(mut self, name: impl Into<String>) -> Self {
        self.conducted_by = Some(name.into());
        self
    }

    pub fn with_venue(mut self, venue: impl Into<String>) -> Self {
        self.venue = Some(venue.into());
        self
    }

    pub fn title(&self) -> String {
        format!(
            "Knowhow {} workshop {}",
            self.domain.name(),
            self.event_date.format("%Y-%m-%d")
        )
    }

    pub fn filename(&self) -> String {
        format!(
            "report_{}_{}.docx",
            self.event_date.format("%Y-%m-%d"),
            self.domain.slug()
        )
    }

    /// Reasons the metadata can't be used for the given mode, in form order
    pub fn missing_fields(&self, mode: ReportMode) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if mode == ReportMode::Bullets {
            if self.conducted_by.as_deref().map_or(true, |s| s.trim().is_empty()) {
                missing.push("Please enter the name of the person who conducted the event.");
            }
            if self.venue.as_deref().map_or(true, |s| s.trim().is_empty()) {
                missing.push("Please enter the venue.");
            }
        }
        missing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn march_first() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    #[test]
    fn test_filename_and_title() {
        let meta = ReportMetadata::new(Domain::CloudNative, march_first(), march_first());
        assert_eq!(meta.filename(), "report_2024-03-01_Cloud_Native.docx");
        assert_eq!(meta.title(), "Knowhow Cloud Native workshop 2024-03-01");
    }

    #[test]
    fn test_slug_is_a_single_path_component() {
        assert_eq!(Domain::DataScience.slug(), "DataScience_and_Analytics");
        assert_eq!(Domain::ArVr.slug(), "AR-VR");
    }

    #[test]
    fn test_domain_parse_by_number_and_name() {
        assert_eq!(Domain::parse("1"), Some(Domain::AiMl));
        assert_eq!(Domain::parse("8"), Some(Domain::Cybersecurity));
        assert_eq!(Domain::parse("0"), None);
        assert_eq!(Domain::parse("9"), None);
        assert_eq!(Domain::parse("cloud native"), Some(Domain::CloudNative));
        assert_eq!(Domain::parse("Cloud_Native"), Some(Domain::CloudNative));
        assert_eq!(Domain::parse("quantum"), None);
    }

    #[test]
    fn test_mode_from_slug() {
        assert_eq!(ReportMode::from_slug("Paragraph"), Some(ReportMode::Paragraph));
        assert_eq!(ReportMode::from_slug("bullets"), Some(ReportMode::Bullets));
        assert_eq!(ReportMode::from_slug("table"), None);
    }

    #[test]
    fn test_bullet_mode_requires_people_and_place() {
        let meta = ReportMetadata::new(Domain::Iot, march_first(), march_first());
        assert_eq!(meta.missing_fields(ReportMode::Bullets).len(), 2);
        assert!(meta.missing_fields(ReportMode::Paragraph).is_empty());

        let meta = meta.with_conducted_by("Asha").with_venue("Lab 3");
        assert!(meta.missing_fields(ReportMode::Bullets).is_empty());
    }
}
