//! Load everything without a terminal UI and print what the map would show.

use crate::chart::SeverityChart;
use crate::config::Config;
use crate::data::{spawn_loaders, DatasetId};
use crate::map::MapSurface;
use crate::session::{AnalysisHook, DatasetStatus, Session};
use crate::tally::Severity;
use anyhow::Result;
use serde::Serialize;
use std::fmt::Write as _;
use std::sync::mpsc;

#[derive(Debug, Serialize)]
pub struct DatasetSummary {
    pub dataset: DatasetId,
    pub name: &'static str,
    #[serde(flatten)]
    pub status: DatasetStatus,
}

#[derive(Debug, Serialize)]
pub struct Summary {
    pub datasets: Vec<DatasetSummary>,
    /// Base layer followed by overlays, `None` if the control was never built
    pub control: Option<Vec<String>>,
    pub chart: Option<SeverityChart>,
}

impl Summary {
    pub fn from_session(session: &Session) -> Self {
        let datasets = session
            .statuses()
            .iter()
            .map(|(id, status)| DatasetSummary {
                dataset: *id,
                name: id.display_name(),
                status: status.clone(),
            })
            .collect();
        let control = session.control().map(|control| {
            std::iter::once(control.base.clone())
                .chain(control.overlays.iter().map(|(name, _)| name.clone()))
                .collect()
        });
        Self {
            datasets,
            control,
            chart: session.chart().copied(),
        }
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Datasets:");
        for entry in &self.datasets {
            let _ = match &entry.status {
                DatasetStatus::Loaded { features } => {
                    writeln!(out, "  {:<30} {features} features", entry.name)
                }
                DatasetStatus::Failed { cause } => writeln!(out, "  {:<30} FAILED: {cause}", entry.name),
            };
        }

        match &self.control {
            Some(entries) => {
                let _ = writeln!(out, "Layer control: {}", entries.join(", "));
            }
            None => {
                let _ = writeln!(out, "Layer control: not built");
            }
        }

        match &self.chart {
            Some(chart) => {
                let labels: Vec<&str> = Severity::ALL.iter().map(|s| s.label()).collect();
                let _ = writeln!(out, "Severity chart [{}]:", labels.join(", "));
                for (series, counts) in chart.series() {
                    let values: Vec<String> = counts.0.iter().map(u64::to_string).collect();
                    let _ = writeln!(out, "  {series:<9} [{}]", values.join(", "));
                }
            }
            None => {
                let _ = writeln!(out, "Severity chart: not built");
            }
        }
        out
    }
}

/// Issue all loads, apply every outcome, then print the summary
pub fn run(config: &Config, json: bool, hook: Option<AnalysisHook>) -> Result<()> {
    let sources = config.sources();
    let expected = sources.len();
    let (tx, rx) = mpsc::channel();
    spawn_loaders(sources, tx);

    let mut session = Session::new(MapSurface::new(config.base_layer.clone()), hook);
    for outcome in rx.iter().take(expected) {
        session.apply(outcome);
    }

    let summary = Summary::from_session(&session);
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{}", summary.render_text());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tally::SeverityTally;

    fn summary() -> Summary {
        Summary {
            datasets: vec![
                DatasetSummary {
                    dataset: DatasetId::Roads,
                    name: DatasetId::Roads.display_name(),
                    status: DatasetStatus::Loaded { features: 12 },
                },
                DatasetSummary {
                    dataset: DatasetId::Boundaries,
                    name: DatasetId::Boundaries.display_name(),
                    status: DatasetStatus::Failed {
                        cause: "dataset unavailable".to_string(),
                    },
                },
            ],
            control: Some(vec!["Graticule".to_string(), "Road network".to_string()]),
            chart: Some(SeverityChart {
                points: SeverityTally([1, 1, 1]),
                polygons: SeverityTally([0, 0, 2]),
            }),
        }
    }

    #[test]
    fn test_text_summary() {
        let text = summary().render_text();
        assert!(text.contains("Road network"));
        assert!(text.contains("12 features"));
        assert!(text.contains("FAILED: dataset unavailable"));
        assert!(text.contains("Layer control: Graticule, Road network"));
        assert!(text.contains("Severity chart [Low, Medium, High]:"));
        assert!(text.contains("points    [1, 1, 1]"));
        assert!(text.contains("polygons  [0, 0, 2]"));
    }

    #[test]
    fn test_json_summary_tags_status() {
        let value = serde_json::to_value(summary()).unwrap();
        assert_eq!(value["datasets"][0]["dataset"], "roads");
        assert_eq!(value["datasets"][0]["status"], "loaded");
        assert_eq!(value["datasets"][0]["features"], 12);
        assert_eq!(value["datasets"][1]["status"], "failed");
        assert_eq!(value["chart"]["polygons"], serde_json::json!([0, 0, 2]));
    }

    #[test]
    fn test_run_with_missing_data_dir_completes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            data_dir: dir.path().join("nothing-here"),
            ..Config::default()
        };
        assert!(run(&config, false, None).is_ok());
    }
}
