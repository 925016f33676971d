//! Session-scoped state and the handling of loader completions.

use crate::chart::{ChartBuilder, SeverityChart};
use crate::control::{CompletionTracker, LayerControl, LayerRegistry};
use crate::data::{Dataset, DatasetId, LoadOutcome};
use crate::map::{Layer, MapSurface};
use crate::{popup, style};
use serde::Serialize;
use tracing::{debug, error, info};

/// Called after each community dataset loads, so outside code can refresh its analysis
pub type AnalysisHook = Box<dyn FnMut(DatasetId) + Send>;

/// What became of one dataset
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DatasetStatus {
    Loaded { features: usize },
    Failed { cause: String },
}

/// Owns everything the loaders mutate: the map surface, the toggle
/// registry, the completion counter, the chart readiness and the layer
/// control once built. Outcomes are applied one at a time.
pub struct Session {
    pub surface: MapSurface,
    registry: LayerRegistry,
    tracker: CompletionTracker,
    control: Option<LayerControl>,
    chart: ChartBuilder,
    statuses: Vec<(DatasetId, DatasetStatus)>,
    hook: Option<AnalysisHook>,
}

impl Session {
    pub fn new(surface: MapSurface, hook: Option<AnalysisHook>) -> Self {
        Self {
            surface,
            registry: LayerRegistry::default(),
            tracker: CompletionTracker::new(DatasetId::ALL.len()),
            control: None,
            chart: ChartBuilder::new(),
            statuses: Vec::new(),
            hook,
        }
    }

    /// Apply one loader completion
    pub fn apply(&mut self, outcome: LoadOutcome) {
        let LoadOutcome { id, result } = outcome;
        match result {
            Ok(dataset) => self.dataset_loaded(dataset),
            Err(err) => {
                error!(dataset = %id, error = %err, "failed to load dataset");
                self.statuses.push((id, DatasetStatus::Failed { cause: err.to_string() }));
                self.report();
            }
        }
    }

    fn dataset_loaded(&mut self, dataset: Dataset) {
        let id = dataset.id;
        let name = id.display_name();
        let layer = Layer::from_dataset(name, &dataset, style::for_dataset(id), |feature| {
            popup::popup_for(id, feature)
        });
        let layer_id = self.surface.add_layer(layer);
        self.registry.register(name, layer_id);
        info!(dataset = %id, features = dataset.features.len(), "dataset loaded");
        self.statuses.push((
            id,
            DatasetStatus::Loaded {
                features: dataset.features.len(),
            },
        ));
        self.report();

        if id.is_community() {
            if self.chart.dataset_ready(&dataset) {
                debug!(chart = ?self.chart.chart(), "severity chart built");
            }
            if let Some(hook) = self.hook.as_mut() {
                hook(id);
            }
        }
    }

    /// Count a report and build the control when the last one arrives
    fn report(&mut self) {
        if self.tracker.record() {
            let control = LayerControl::build(&self.surface.base_name, &self.registry);
            debug!(overlays = control.overlays.len(), "layer control built");
            self.control = Some(control);
        }
    }

    /// True once every dataset has reported
    pub fn is_complete(&self) -> bool {
        self.tracker.is_complete()
    }

    /// (reported, expected)
    pub fn progress(&self) -> (usize, usize) {
        (self.tracker.reported(), self.tracker.expected())
    }

    pub fn control(&self) -> Option<&LayerControl> {
        self.control.as_ref()
    }

    pub fn control_mut(&mut self) -> Option<&mut LayerControl> {
        self.control.as_mut()
    }

    pub fn chart(&self) -> Option<&SeverityChart> {
        self.chart.chart()
    }

    /// Per-dataset results in completion order
    pub fn statuses(&self) -> &[(DatasetId, DatasetStatus)] {
        &self.statuses
    }

    /// Toggle the overlay at a 1-based control position. No-op before the control exists.
    pub fn toggle_overlay(&mut self, position: usize) -> bool {
        let Some(layer) = self.control.as_ref().and_then(|c| c.overlay(position)) else {
            return false;
        };
        self.surface.toggle(layer);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::LoadError;
    use crate::tally::SeverityTally;
    use serde_json::json;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    fn report(property: &str, value: &str) -> geojson::Feature {
        let mut props = geojson::JsonObject::new();
        props.insert(property.to_string(), json!(value));
        geojson::Feature {
            bbox: None,
            geometry: Some(geojson::Geometry::new(geojson::Value::Point(vec![-72.5, -37.2]))),
            id: None,
            properties: Some(props),
            foreign_members: None,
        }
    }

    fn loaded(id: DatasetId) -> LoadOutcome {
        let features = match id {
            DatasetId::CommunityPoints => ["Alta", "Baja", "Media"]
                .iter()
                .map(|v| report("Intensidad aparente", v))
                .collect(),
            DatasetId::CommunityPolygons => ["Alta", "Alta"]
                .iter()
                .map(|v| report("Severidad aparente", v))
                .collect(),
            _ => vec![report("nombre", "x")],
        };
        LoadOutcome {
            id,
            result: Ok(Dataset { id, features }),
        }
    }

    fn failed(id: DatasetId) -> LoadOutcome {
        LoadOutcome {
            id,
            result: Err(LoadError::Unavailable {
                path: PathBuf::from(id.default_file()),
                source: std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "network error"),
            }),
        }
    }

    fn session() -> Session {
        Session::new(MapSurface::new("Graticule"), None)
    }

    fn overlay_names(session: &Session) -> Vec<String> {
        session
            .control()
            .map(|c| c.overlays.iter().map(|(name, _)| name.clone()).collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_control_waits_for_all_six() {
        let mut session = session();
        for id in &DatasetId::ALL[..5] {
            session.apply(loaded(*id));
            assert!(session.control().is_none());
        }
        session.apply(loaded(DatasetId::CommunityPolygons));
        assert!(session.is_complete());
        assert_eq!(session.progress(), (6, 6));
        let control = session.control().unwrap();
        assert_eq!(control.base, "Graticule");
        assert_eq!(control.overlays.len(), 6);
    }

    #[test]
    fn test_failed_boundaries_still_completes() {
        let mut session = session();
        session.apply(failed(DatasetId::Boundaries));
        for id in &DatasetId::ALL[1..] {
            session.apply(loaded(*id));
        }
        assert_eq!(session.progress(), (6, 6));
        let names = overlay_names(&session);
        assert_eq!(names.len(), 5);
        assert!(!names.iter().any(|n| n == "Administrative boundaries"));
        assert!(matches!(
            session.statuses()[0],
            (DatasetId::Boundaries, DatasetStatus::Failed { .. })
        ));
    }

    #[test]
    fn test_completion_order_is_irrelevant() {
        let mut session = session();
        for id in DatasetId::ALL.iter().rev() {
            session.apply(if *id == DatasetId::Roads { failed(*id) } else { loaded(*id) });
        }
        assert!(session.is_complete());
        assert_eq!(overlay_names(&session).len(), 5);
        assert!(session.chart().is_some());
    }

    #[test]
    fn test_chart_series_from_both_reports() {
        let mut session = session();
        for id in DatasetId::ALL {
            session.apply(loaded(id));
        }
        let chart = session.chart().unwrap();
        assert_eq!(chart.points, SeverityTally([1, 1, 1]));
        assert_eq!(chart.polygons, SeverityTally([0, 0, 2]));
    }

    #[test]
    fn test_points_failure_suppresses_chart() {
        let mut session = session();
        for id in DatasetId::ALL {
            session.apply(if id == DatasetId::CommunityPoints { failed(id) } else { loaded(id) });
        }
        assert!(session.is_complete());
        assert!(session.chart().is_none());
    }

    #[test]
    fn test_polygon_failure_suppresses_chart() {
        let mut session = session();
        for id in DatasetId::ALL {
            session.apply(if id == DatasetId::CommunityPolygons { failed(id) } else { loaded(id) });
        }
        assert!(session.is_complete());
        assert_eq!(overlay_names(&session).len(), 5);
        assert!(session.chart().is_none());
    }

    #[test]
    fn test_stray_outcome_after_completion_keeps_control() {
        let mut session = session();
        for id in DatasetId::ALL {
            session.apply(loaded(id));
        }
        let built = session.control().cloned();
        assert!(built.is_some());

        session.apply(loaded(DatasetId::Roads));
        session.apply(failed(DatasetId::Boundaries));

        assert_eq!(session.control().cloned(), built);
        assert_eq!(session.progress(), (6, 6));
    }

    #[test]
    fn test_hook_runs_for_community_successes_only() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let hook: AnalysisHook = Box::new(move |id| sink.lock().unwrap().push(id));
        let mut session = Session::new(MapSurface::new("Graticule"), Some(hook));

        session.apply(loaded(DatasetId::Roads));
        session.apply(failed(DatasetId::CommunityPolygons));
        session.apply(loaded(DatasetId::CommunityPoints));

        assert_eq!(*seen.lock().unwrap(), vec![DatasetId::CommunityPoints]);
    }

    #[test]
    fn test_toggle_before_control_is_ignored() {
        let mut session = session();
        session.apply(loaded(DatasetId::Roads));
        assert!(!session.toggle_overlay(1));
        for id in DatasetId::ALL.into_iter().filter(|id| *id != DatasetId::Roads) {
            session.apply(loaded(id));
        }
        let roads = session.control().and_then(|c| c.overlay(1)).unwrap();
        assert!(session.toggle_overlay(1));
        assert!(!session.surface.is_visible(roads));
        assert!(!session.toggle_overlay(7));
    }
}
