use crate::config::MaxExtent;
use crate::error::{Axis, GeometryError};
use crate::types::BoundingBox;

/// Uniform factor that fits `bounds` inside `max_extent`.
///
/// Unconstrained axes do not contribute. With no constraint at all the
/// factor is `1.0`; with both, the smaller ratio wins so neither limit is
/// exceeded.
pub fn compute_scale(bounds: &BoundingBox, max_extent: &MaxExtent) -> Result<f64, GeometryError> {
    let x_scale = max_extent
        .x
        .map(|max| axis_scale(max, bounds.width(), Axis::X))
        .transpose()?;
    let y_scale = max_extent
        .y
        .map(|max| axis_scale(max, bounds.height(), Axis::Y))
        .transpose()?;

    Ok(match (x_scale, y_scale) {
        (Some(x), Some(y)) => x.min(y),
        (Some(x), None) => x,
        (None, Some(y)) => y,
        (None, None) => 1.0,
    })
}

fn axis_scale(max: f64, observed: f64, axis: Axis) -> Result<f64, GeometryError> {
    if observed <= 0.0 || !observed.is_finite() {
        return Err(GeometryError::ZeroExtent { axis });
    }
    Ok(max / observed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn bounds(max_x: f64, max_y: f64) -> BoundingBox {
        BoundingBox { max_x, max_y }
    }

    #[test]
    fn test_unconstrained_is_identity() {
        let scale = compute_scale(&bounds(250.0, 80.0), &MaxExtent::default()).unwrap();
        assert_eq!(scale, 1.0);
    }

    #[test]
    fn test_single_axis_constraint() {
        let extent = MaxExtent {
            x: Some(100.0),
            y: None,
        };
        assert_eq!(compute_scale(&bounds(200.0, 50.0), &extent).unwrap(), 0.5);

        let extent = MaxExtent {
            x: None,
            y: Some(100.0),
        };
        assert_eq!(compute_scale(&bounds(200.0, 50.0), &extent).unwrap(), 2.0);
    }

    #[test]
    fn test_both_axes_take_smaller_ratio() {
        let extent = MaxExtent {
            x: Some(100.0),
            y: Some(50.0),
        };
        assert_eq!(compute_scale(&bounds(200.0, 200.0), &extent).unwrap(), 0.25);
    }

    #[test]
    fn test_zero_extent_on_constrained_axis() {
        let extent = MaxExtent {
            x: None,
            y: Some(50.0),
        };
        assert_eq!(
            compute_scale(&bounds(10.0, 0.0), &extent),
            Err(GeometryError::ZeroExtent { axis: Axis::Y })
        );
    }

    #[test]
    fn test_zero_extent_on_free_axis_is_fine() {
        let extent = MaxExtent {
            x: Some(50.0),
            y: None,
        };
        assert_eq!(compute_scale(&bounds(10.0, 0.0), &extent).unwrap(), 5.0);
    }

    proptest! {
        #[test]
        fn no_constraint_is_always_one(w in 0.0..1e6f64, h in 0.0..1e6f64) {
            prop_assert_eq!(compute_scale(&bounds(w, h), &MaxExtent::default()).unwrap(), 1.0);
        }

        #[test]
        fn both_constraints_fit_both_axes(
            w in 0.01..1e4f64, h in 0.01..1e4f64,
            max_x in 0.01..1e4f64, max_y in 0.01..1e4f64,
        ) {
            let extent = MaxExtent { x: Some(max_x), y: Some(max_y) };
            let scale = compute_scale(&bounds(w, h), &extent).unwrap();
            prop_assert!(scale <= max_x / w);
            prop_assert!(scale <= max_y / h);
            prop_assert!(scale > 0.0);
        }
    }
}
