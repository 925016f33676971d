//! Severity chart data, built once both community report datasets are in.

use crate::data::{Dataset, DatasetId};
use crate::tally::{tally, SeverityTally};
use serde::Serialize;

/// Grouped bar chart data: one series per community dataset,
/// one group per severity category
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct SeverityChart {
    pub points: SeverityTally,
    pub polygons: SeverityTally,
}

impl SeverityChart {
    pub fn series(&self) -> [(&'static str, SeverityTally); 2] {
        [("points", self.points), ("polygons", self.polygons)]
    }

    /// Largest bar, for the y-axis bound
    pub fn max_count(&self) -> u64 {
        self.points.0.iter().chain(self.polygons.0.iter()).copied().max().unwrap_or(0)
    }
}

/// Builds the severity chart once both community datasets have loaded.
///
/// Each dataset is tallied when it becomes ready, so only the counts are
/// kept. Readiness is set only by successful loads; a failed community
/// dataset leaves the chart unbuilt for the rest of the session.
#[derive(Default)]
pub struct ChartBuilder {
    points: Option<SeverityTally>,
    polygons: Option<SeverityTally>,
    chart: Option<SeverityChart>,
}

impl ChartBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a community dataset ready and attempt construction.
    /// Returns true when this call built the chart.
    pub fn dataset_ready(&mut self, dataset: &Dataset) -> bool {
        let Some(property) = dataset.id.severity_property() else {
            return false;
        };
        let counts = Some(tally(&dataset.features, property));
        match dataset.id {
            DatasetId::CommunityPoints => self.points = counts,
            DatasetId::CommunityPolygons => self.polygons = counts,
            _ => return false,
        }
        self.try_build()
    }

    fn try_build(&mut self) -> bool {
        let (Some(points), Some(polygons)) = (self.points, self.polygons) else {
            return false;
        };
        self.chart = Some(SeverityChart { points, polygons });
        true
    }

    pub fn chart(&self) -> Option<&SeverityChart> {
        self.chart.as_ref()
    }
}
