/// Result of offering a point to the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    /// Stored as the given 1-based point number
    Added(usize),
    Rejected,
}

/// Points collected during one form session.
///
/// Created when the form starts and handed to every handler; the list only
/// grows until `reset`.
#[derive(Debug, Default, Clone)]
pub struct ReportSession {
    points: Vec<String>,
}

impl ReportSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, text: &str) -> AddOutcome {
        if text.trim().is_empty() {
            tracing::debug!("rejected blank point");
            return AddOutcome::Rejected;
        }
        self.points.push(text.to_string());
        AddOutcome::Added(self.points.len())
    }

    pub fn list(&self) -> &[String] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn reset(&mut self) {
        self.points.clear();
    }

    /// Lines shown under "Brief Points"
    pub fn render(&self) -> Vec<String> {
        self.points
            .iter()
            .enumerate()
            .map(|(i, point)| format!("Point {}: {}", i + 1, point))
            .collect()
    }
}
