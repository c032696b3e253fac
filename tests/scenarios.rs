use dggs_quant::{Config, Feature, GridAssigner, Quantizer, SkipReason};

fn quantizer(min: u8, max: u8) -> Quantizer {
    Quantizer::new(Config::default().with_resolutions(min, max)).expect("valid config")
}

/// Scenario A: identical attributes in one resolution-1 cell
#[test]
fn test_identical_points_in_one_cell() {
    let features = vec![
        Feature::new(48.8566, 2.3522).with_attribute("height", "10"),
        Feature::new(48.8600, 2.3400).with_attribute("height", "10"),
        Feature::new(48.8700, 2.3300).with_attribute("height", "10"),
    ];
    let cell = GridAssigner::cell_id(48.8566, 2.3522, 1).unwrap();
    for f in &features {
        assert_eq!(GridAssigner::cell_id(f.latitude, f.longitude, 1).unwrap(), cell);
    }

    let output = quantizer(1, 1).quantize(features).expect("run succeeds");
    assert_eq!(output.rows.len(), 1);

    let row = &output.rows[0];
    assert_eq!(row.grid_id, cell);
    assert_eq!(row.resolution, 1);
    assert_eq!(row.point_count, 3);
    assert_eq!(row.attribute_names, vec!["height"]);
    assert_eq!(row.sum, vec![30.0]);
    assert_eq!(row.mean, vec![10.0]);
    assert_eq!(row.min, vec![10.0]);
    assert_eq!(row.max, vec![10.0]);
    assert_eq!(row.stddev, vec![0.0]);
    assert_eq!(row.variance, vec![0.0]);
    assert_eq!(row.median, vec![10.0]);
    assert_eq!(row.mode, vec![10.0]);
}

/// Scenario B: empty input
#[test]
fn test_empty_input_yields_nothing() {
    let output = quantizer(1, 12).quantize(Vec::new()).expect("run succeeds");
    assert!(output.rows.is_empty());
    assert_eq!(output.report.features_read, 0);
    assert_eq!(output.report.features_skipped, 0);
    assert!(output.report.skipped.is_empty());
}

/// Scenario C: one feature without coordinates among valid ones
#[test]
fn test_missing_coordinates_are_skipped() {
    let valid = vec![
        Feature::new(40.7128, -74.0060).with_attribute("v", "1"),
        Feature::new(34.0522, -118.2437).with_attribute("v", "2"),
    ];
    let baseline = quantizer(1, 6).quantize(valid.clone()).unwrap();

    let mixed = vec![
        Ok(valid[0].clone()),
        Err(SkipReason::MissingGeometry),
        Ok(valid[1].clone()),
    ];
    let output = quantizer(1, 6).quantize_loaded(mixed).unwrap();

    assert_eq!(output.report.features_skipped, 1);
    assert_eq!(output.report.skipped[0].index, 1);
    assert_eq!(output.report.skipped[0].reason, SkipReason::MissingGeometry);
    assert_eq!(output.rows, baseline.rows);
}

#[test]
fn test_out_of_range_coordinates_are_skipped() {
    let output = quantizer(1, 3)
        .quantize(vec![
            Feature::new(10.0, 10.0),
            Feature::new(120.0, 10.0),
            Feature::new(10.0, f64::INFINITY),
        ])
        .unwrap();

    assert_eq!(output.report.features_processed, 1);
    assert_eq!(output.report.features_skipped, 2);
    assert!(
        output
            .report
            .skipped
            .iter()
            .all(|s| matches!(s.reason, SkipReason::InvalidCoordinates(_)))
    );
    assert_eq!(output.rows.len(), 3);
}

#[test]
fn test_feature_without_numeric_attributes_counts() {
    let output = quantizer(1, 1)
        .quantize(vec![
            Feature::new(10.0, 10.0).with_attribute("name", "a"),
            Feature::new(10.0, 10.0).with_attribute("v", "4"),
        ])
        .unwrap();

    let row = &output.rows[0];
    assert_eq!(row.point_count, 2);
    assert_eq!(row.attribute_names, vec!["v"]);
    assert_eq!(row.sum, vec![4.0]);
    assert_eq!(output.report.features_without_numeric, 1);
    assert_eq!(output.report.non_numeric_values, 1);
}

#[test]
fn test_mixed_attribute_sets_stay_aligned() {
    let output = quantizer(2, 2)
        .quantize(vec![
            Feature::new(10.0, 10.0)
                .with_attribute("height", "5")
                .with_attribute("label", "x")
                .with_attribute("width", "2"),
            Feature::new(10.0, 10.0).with_attribute("width", "4"),
            Feature::new(10.0, 10.0)
                .with_attribute("depth", "1.5")
                .with_attribute("height", "7"),
        ])
        .unwrap();

    let row = &output.rows[0];
    assert!(row.is_aligned());
    assert_eq!(row.attribute_names, vec!["height", "width", "depth"]);
    assert_eq!(row.point_count, 3);
    assert_eq!(row.sum, vec![12.0, 6.0, 1.5]);
    assert_eq!(row.median, vec![6.0, 3.0, 1.5]);
    assert_eq!(row.mode, vec![5.0, 2.0, 1.5]);
}

#[test]
fn test_rows_carry_constant_metadata() {
    let quantizer = Quantizer::builder()
        .resolutions(1, 4)
        .source_record_link("link")
        .build()
        .unwrap();
    let output = quantizer
        .quantize(vec![Feature::new(-33.86, 151.2).with_attribute("v", "1")])
        .unwrap();

    assert_eq!(output.rows.len(), 4);
    for row in &output.rows {
        assert_eq!(row.geometry_type, "Point");
        assert_eq!(row.source_record_link, "link");
        assert_eq!(row.grid_id.len(), usize::from(row.resolution));
    }
}

#[test]
fn test_configuration_error_is_fatal() {
    assert!(Quantizer::new(Config::default().with_resolutions(0, 5)).is_err());
    assert!(Quantizer::builder().resolutions(5, 13).build().is_err());
}
