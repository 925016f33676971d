use super::{Dataset, DatasetId};
use geojson::GeoJson;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

/// The single failure kind: the dataset could not be read or parsed
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("dataset unavailable: {path}: {source}")]
    Unavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("dataset unparseable: {path}: {source}")]
    Unparseable {
        path: PathBuf,
        #[source]
        source: simd_json::Error,
    },
}

/// Completion report of one loader, success or failure
#[derive(Debug)]
pub struct LoadOutcome {
    pub id: DatasetId,
    pub result: Result<Dataset, LoadError>,
}

/// Read and parse one dataset file
pub fn load_dataset(id: DatasetId, path: &Path) -> Result<Dataset, LoadError> {
    let mut bytes = fs::read(path).map_err(|source| LoadError::Unavailable {
        path: path.to_path_buf(),
        source,
    })?;
    let geojson: GeoJson =
        simd_json::serde::from_slice(&mut bytes).map_err(|source| LoadError::Unparseable {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(Dataset::from_geojson(id, geojson))
}

/// Issue every load at once on the rayon pool.
///
/// Each loader sends exactly one outcome; the receiver applies them one at a
/// time, in whatever order they finish.
pub fn spawn_loaders(sources: Vec<(DatasetId, PathBuf)>, tx: Sender<LoadOutcome>) {
    for (id, path) in sources {
        let tx = tx.clone();
        rayon::spawn(move || {
            tracing::debug!(dataset = %id, path = %path.display(), "loading dataset");
            let result = load_dataset(id, &path);
            // The receiver is gone only when the app is shutting down
            let _ = tx.send(LoadOutcome { id, result });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::mpsc;

    fn write_fixture(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_loads_feature_collection() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(
            dir.path(),
            "red_vial.geojson",
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature","properties":{"Rol_Mop":"5-CH"},
                 "geometry":{"type":"LineString","coordinates":[[-72.5,-37.2],[-72.4,-37.1]]}}
            ]}"#,
        );
        let dataset = load_dataset(DatasetId::Roads, &path).unwrap();
        assert_eq!(dataset.id, DatasetId::Roads);
        assert_eq!(dataset.features.len(), 1);
        assert_eq!(
            dataset.features[0].property("Rol_Mop").and_then(|v| v.as_str()),
            Some("5-CH")
        );
    }

    #[test]
    fn test_missing_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_dataset(DatasetId::Boundaries, &dir.path().join("nope.geojson")).unwrap_err();
        assert!(matches!(err, LoadError::Unavailable { .. }));
        assert!(err.to_string().contains("nope.geojson"));
    }

    #[test]
    fn test_malformed_file_is_unparseable() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(dir.path(), "bad.geojson", "{\"type\": \"Feature");
        let err = load_dataset(DatasetId::Hydrography, &path).unwrap_err();
        assert!(matches!(err, LoadError::Unparseable { .. }));
    }

    #[test]
    fn test_every_loader_reports_once() {
        let dir = tempfile::tempdir().unwrap();
        let good = write_fixture(
            dir.path(),
            "ok.geojson",
            r#"{"type":"FeatureCollection","features":[]}"#,
        );
        let sources = vec![
            (DatasetId::Boundaries, dir.path().join("missing.geojson")),
            (DatasetId::Roads, good.clone()),
            (DatasetId::Hydrography, good),
        ];
        let (tx, rx) = mpsc::channel();
        spawn_loaders(sources, tx);

        let mut ids: Vec<_> = rx.iter().map(|o| (o.id, o.result.is_ok())).collect();
        ids.sort();
        assert_eq!(
            ids,
            vec![
                (DatasetId::Boundaries, false),
                (DatasetId::Roads, true),
                (DatasetId::Hydrography, true),
            ]
        );
    }
}
