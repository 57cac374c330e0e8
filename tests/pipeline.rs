use bicycle_counts::charts::{MapViewState, ScatterLayer, StaticMapRenderer};
use bicycle_counts::data::{
    build_view, max_count, DataLoader, DatasetConfig, Normalizer, ViewError, LATITUDE_COLUMN,
    LONGITUDE_COLUMN,
};

const FIXTURE: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/tests/fixtures/bicycle_counts_sample.csv"
);

#[test]
fn test_full_pipeline() {
    let config = DatasetConfig::default();

    let raw = DataLoader::load_csv(FIXTURE).expect("Failed to load fixture");
    assert_eq!(raw.height(), 6);

    let clean = Normalizer::normalize(&raw, &config).expect("Failed to normalize");
    assert_eq!(clean.height(), 4);
    assert_eq!(clean.report().input_rows, 6);
    assert_eq!(clean.report().dropped_rows, 2);
    assert_eq!(clean.report().defaulted_counts, 0);

    for column in [LATITUDE_COLUMN, LONGITUDE_COLUMN] {
        let values = clean.frame().column(column).unwrap().f64().unwrap();
        assert!(values.into_iter().all(|v| v.is_some_and(f64::is_finite)));
    }

    let (view, max_value) = build_view(&clean, 2023, &config).expect("Failed to build view");
    assert_eq!(max_value, 8400);
    assert_eq!(view.counts().unwrap(), vec![6250, 0, 2500, 310]);

    let layer = ScatterLayer::from_view(&view, &config.name_column).unwrap();
    assert_eq!(layer.points.len(), 4);
    assert_eq!(layer.points[0].tooltip(), "Location: Hawthorne Bridge\nCount: 6250");
    assert_eq!(layer.points[1].size, 0.0);
    assert_eq!(layer.points[2].name.as_deref(), Some("Tilikum Crossing"));
    assert_eq!(layer.points[3].name, None);
    assert!((layer.points[0].size - 6250.0 / 8400.0 * 125.0).abs() < 1e-9);

    let state = MapViewState::centered_on(&layer).unwrap();
    assert!(state.latitude > 45.48 && state.latitude < 45.54);
    assert!(state.longitude > -122.68 && state.longitude < -122.65);

    let png = StaticMapRenderer::render_png(&layer, 400, 300, None).unwrap();
    assert!(!png.is_empty());
}

#[test]
fn test_scale_is_stable_across_years() {
    let config = DatasetConfig::default();
    let raw = DataLoader::load_csv(FIXTURE).unwrap();
    let clean = Normalizer::normalize(&raw, &config).unwrap();

    let expected = max_count(&clean, &config).unwrap();
    for year in config.years() {
        let (view, max_value) = build_view(&clean, year, &config).unwrap();
        assert_eq!(max_value, expected, "year {year}");
        assert!(view.sizes().unwrap().iter().all(|s| (0.0..=125.0).contains(s)));
    }

    let (synthesized, _) = build_view(&clean, 2020, &config).unwrap();
    assert!(synthesized.sizes().unwrap().iter().all(|s| *s == 0.0));
}

#[test]
fn test_out_of_range_year_fails() {
    let config = DatasetConfig::default();
    let raw = DataLoader::load_csv(FIXTURE).unwrap();
    let clean = Normalizer::normalize(&raw, &config).unwrap();

    assert!(matches!(
        build_view(&clean, 1999, &config),
        Err(ViewError::YearOutOfRange { year: 1999, .. })
    ));
}

#[test]
fn test_wrong_dataset_is_refused() {
    let config = DatasetConfig {
        lat_long_column: "Coordinates".to_string(),
        ..Default::default()
    };
    let raw = DataLoader::load_csv(FIXTURE).unwrap();

    assert!(Normalizer::normalize(&raw, &config).is_err());
}
