use approx::assert_relative_eq;
use nurbs_engine::prelude::*;

/// Mirrors how an editor drives the engine: points are added one by one,
/// dragged around, and the curve is resampled after every change.
#[test]
fn editing_session() {
    let mut curve: NurbsCurve<f64> = NurbsCurve::try_new(3).unwrap();
    let clicks = [(0., 0.), (10., 10.), (20., 0.), (30., 10.)];

    for (i, (x, y)) in clicks.iter().enumerate() {
        curve.add_control_point(ControlPoint::new(*x, *y, 1.));
        let samples = curve.generate_points(100);
        if i < 3 {
            assert!(!is_ready(&curve));
            assert!(samples.is_empty());
        } else {
            assert!(is_ready(&curve));
            assert_eq!(samples.len(), 100);
        }
    }

    let points = generate_points(&curve, 5);
    assert_eq!(points.len(), 5);
    assert_eq!((points[0].x(), points[0].y()), (0., 0.));
    assert_eq!((points[4].x(), points[4].y()), (30., 10.));

    // drag the second point through an invalid weight, the curve keeps rendering
    for weight in [2., 0., -1., 1.] {
        assert!(curve.update_control_point(1, 12., 14., weight));
        let samples = curve.generate_points(32);
        assert_eq!(samples.len(), 32);
        assert!(samples.iter().all(|p| p.x().is_finite() && p.y().is_finite()));
    }

    assert!(!curve.update_control_point(4, 0., 0., 1.));
    assert_eq!(curve.num_control_points(), 4);

    assert!(curve.remove_control_point(0).is_some());
    assert!(!curve.is_ready());
    assert!(evaluate(&curve, 0.5).is_err());
}

#[test]
fn s_curve_is_symmetric() {
    let mut curve: NurbsCurve<f64> = NurbsCurve::try_new(3).unwrap();
    curve.add_control_point(ControlPoint::new(0., 0., 1.));
    curve.add_control_point(ControlPoint::new(0., 10., 1.));
    curve.add_control_point(ControlPoint::new(10., -10., 1.));
    curve.add_control_point(ControlPoint::new(10., 0., 1.));

    let mid = curve.point_at(0.5).unwrap();
    assert_relative_eq!(mid.x(), 5., epsilon = 1e-12);
    assert_relative_eq!(mid.y(), 0., epsilon = 1e-12);

    let a = curve.point_at(0.25).unwrap();
    let b = curve.point_at(0.75).unwrap();
    assert_relative_eq!(a.x() + b.x(), 10., epsilon = 1e-12);
    assert_relative_eq!(a.y() + b.y(), 0., epsilon = 1e-12);
}

#[test]
fn rational_quadratic_is_a_circular_arc() {
    let w = std::f64::consts::FRAC_1_SQRT_2;
    let curve = NurbsCurve::try_from_parts(
        2,
        vec![
            ControlPoint::new(1., 0., 1.),
            ControlPoint::new(1., 1., w),
            ControlPoint::new(0., 1., 1.),
        ],
        vec![0., 0., 0., 1., 1., 1.],
    )
    .unwrap();

    for p in curve.generate_points(25) {
        assert_relative_eq!(p.position().coords.norm(), 1., epsilon = 1e-12);
    }
}

#[test]
fn flat_batch_matches_the_model() {
    let xs = [0., 10., 20., 30., 40.];
    let ys = [0., 10., 0., 10., 0.];
    let ws = [1., 0.5, 3., 0.5, 1.];

    let mut curve = NurbsCurve::try_new(2).unwrap();
    for i in 0..xs.len() {
        curve.add_control_point(ControlPoint::new(xs[i], ys[i], ws[i]));
    }

    let flat = generate_flat(&xs, &ys, &ws, 2, 20);
    let points = curve.generate_points(20);
    assert_eq!(flat.len(), 40);
    for (i, p) in points.iter().enumerate() {
        assert_eq!(flat[2 * i], p.x());
        assert_eq!(flat[2 * i + 1], p.y());
    }
}
