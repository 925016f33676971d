use criterion::{black_box, criterion_group, criterion_main, Criterion};
use geojson::{Feature, Geometry, JsonObject, Value};
use incident_map::data::{Dataset, DatasetId};
use incident_map::map::{Layer, MapSurface, Viewport};
use incident_map::popup::popup_for;
use incident_map::style;
use incident_map::tally::tally;
use serde_json::json;

const SEVERITIES: [&str; 4] = ["Baja", "Media", "Alta", "Desconocida"];

fn report(i: usize) -> Feature {
    let lon = -73.5 + (i % 100) as f64 * 0.02;
    let lat = -38.0 + (i / 100) as f64 * 0.02;
    let mut props = JsonObject::new();
    props.insert("Intensidad aparente".to_string(), json!(SEVERITIES[i % SEVERITIES.len()]));
    props.insert("fecha".to_string(), json!("2024-02-02"));
    props.insert("descripcion".to_string(), json!("Columna de humo visible"));
    let mut feature = Feature::from(Geometry::new(Value::Point(vec![lon, lat])));
    feature.properties = Some(props);
    feature
}

fn road(i: usize) -> Feature {
    let lat = -38.0 + i as f64 * 0.01;
    let coords = (0..50).map(|step| vec![-73.5 + step as f64 * 0.04, lat]).collect();
    Feature::from(Geometry::new(Value::LineString(coords)))
}

fn surface(reports: &[Feature], roads: &[Feature]) -> MapSurface {
    let mut surface = MapSurface::new("Graticule");
    let roads = Dataset {
        id: DatasetId::Roads,
        features: roads.to_vec(),
    };
    let points = Dataset {
        id: DatasetId::CommunityPoints,
        features: reports.to_vec(),
    };
    surface.add_layer(Layer::from_dataset("roads", &roads, style::roads(), |f| {
        popup_for(DatasetId::Roads, f)
    }));
    surface.add_layer(Layer::from_dataset("hotspots", &points, style::community_points(), |f| {
        popup_for(DatasetId::CommunityPoints, f)
    }));
    surface
}

fn bench_render(c: &mut Criterion) {
    let reports: Vec<Feature> = (0..5_000).map(report).collect();
    let roads: Vec<Feature> = (0..200).map(road).collect();
    let surface = surface(&reports, &roads);
    let viewport = Viewport::at_level(-37.2, -72.5, 8, 320, 160);

    c.bench_function("render_surface_160x40", |b| {
        b.iter(|| black_box(surface.render(160, 40, black_box(&viewport))));
    });

    c.bench_function("popup_hit_test", |b| {
        b.iter(|| black_box(surface.popup_at(&viewport, black_box(160), black_box(80)).is_some()));
    });
}

fn bench_projection(c: &mut Criterion) {
    let viewport = Viewport::at_level(-37.2, -72.5, 8, 320, 160);
    let coords: Vec<(f64, f64)> = (0..10_000)
        .map(|i| (-74.0 + (i % 100) as f64 * 0.03, -39.0 + (i / 100) as f64 * 0.03))
        .collect();

    c.bench_function("project_10000_coords", |b| {
        b.iter(|| {
            for &(lon, lat) in &coords {
                black_box(viewport.project(lon, lat));
            }
        });
    });
}

fn bench_reports(c: &mut Criterion) {
    let reports: Vec<Feature> = (0..5_000).map(report).collect();

    c.bench_function("tally_5000_reports", |b| {
        b.iter(|| black_box(tally(black_box(&reports), "Intensidad aparente")));
    });

    c.bench_function("format_5000_report_popups", |b| {
        b.iter(|| {
            for feature in &reports {
                black_box(popup_for(DatasetId::CommunityPoints, feature));
            }
        });
    });
}

criterion_group!(benches, bench_projection, bench_render, bench_reports);
criterion_main!(benches);
