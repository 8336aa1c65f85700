use kurbo::Point;
use plotcut::*;

fn config() -> Config {
    let mut config = Config::default();
    config.machine.curve_resolution = 8;
    config
}

#[test]
fn test_unreachable_arc_aborts_conversion() {
    // Radius 2 cannot span a chord of length 20.
    let path_set: PathSet = vec![Subpath::new(vec![
        Primitive::line(Point::new(0.0, 0.0), Point::new(10.0, 0.0)),
        Primitive::arc(Point::new(10.0, 0.0), Point::new(30.0, 0.0), 2.0, 2.0, 0.0),
    ])]
    .into();

    let result = convert(&path_set, &config());
    assert!(
        matches!(
            result,
            Err(ConvertError::Geometry(GeometryError::ArcDidNotConverge { .. }))
        ),
        "expected non-convergence, got {result:?}"
    );
}

#[test]
fn test_degenerate_arc_aborts_conversion() {
    let path_set: PathSet = vec![Subpath::new(vec![Primitive::arc(
        Point::new(4.0, 4.0),
        Point::new(8.0, 4.0),
        0.0,
        3.0,
        0.0,
    )])]
    .into();

    let err = convert(&path_set, &config()).unwrap_err();
    assert!(err.to_string().starts_with("degenerate arc"), "{err}");
}

#[test]
fn test_zero_extent_on_constrained_axis() {
    // Horizontal line at y = 0 has no height to scale.
    let path_set: PathSet = vec![Subpath::new(vec![Primitive::line(
        Point::new(0.0, 0.0),
        Point::new(10.0, 0.0),
    )])]
    .into();
    let mut config = config();
    config.point.max_y = Some(50.0);

    let err = convert(&path_set, &config).unwrap_err();
    assert!(matches!(
        err,
        ConvertError::Geometry(GeometryError::ZeroExtent { axis: Axis::Y })
    ));
}

#[test]
fn test_empty_path_set_with_max_extent() {
    let mut config = config();
    config.point.max_x = Some(50.0);
    assert!(convert(&PathSet::new(), &config).is_err());
}

#[test]
fn test_empty_path_set_without_constraint() {
    let conversion = convert(&PathSet::new(), &config()).expect("convert");
    assert!(conversion.toolpath.is_empty());
    assert!(!conversion.gcode.lines.iter().any(|l| l.starts_with("G1 X")));
}

#[test]
fn test_invalid_resolution() {
    let path_set: PathSet = vec![Subpath::new(vec![Primitive::line(
        Point::new(0.0, 0.0),
        Point::new(1.0, 1.0),
    )])]
    .into();
    let mut config = config();
    config.machine.curve_resolution = 1;

    let err = convert(&path_set, &config).unwrap_err();
    assert!(matches!(
        err,
        ConvertError::Geometry(GeometryError::InvalidResolution(1))
    ));
    assert!(!config.validate().is_empty());
}

#[test]
fn test_non_positive_feedrate_aborts_conversion() {
    let path_set: PathSet = vec![Subpath::new(vec![Primitive::line(
        Point::new(0.0, 0.0),
        Point::new(1.0, 1.0),
    )])]
    .into();

    let mut stalled = config();
    stalled.machine.normal_feedrate = 0.0;
    let err = convert(&path_set, &stalled).unwrap_err();
    assert!(matches!(
        err,
        ConvertError::Geometry(GeometryError::InvalidFeedrate { name: "normal", .. })
    ));

    let mut unset = config();
    unset.machine.travel_feedrate = f64::NAN;
    let err = convert(&path_set, &unset).unwrap_err();
    assert!(matches!(
        err,
        ConvertError::Geometry(GeometryError::InvalidFeedrate { name: "travel", .. })
    ));
    assert!(err.to_string().starts_with("travel feed rate must be positive"));
}

#[test]
fn test_missing_svg_is_io_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let result = PathSet::from_svg_file(dir.path().join("missing.svg"));
    assert!(matches!(result, Err(ConvertError::Io(_))));
}

#[test]
fn test_malformed_svg_is_import_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("broken.svg");
    std::fs::write(&path, "<svg><path d=").expect("write");

    let err = PathSet::from_svg_file(&path).unwrap_err();
    assert!(matches!(err, ConvertError::Import(_)));
    assert!(err.to_string().contains("broken.svg"));
}
