use std::ops::Mul;

use geo::AffineTransform;
use shrinkwraprs::Shrinkwrap;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum TransformError {
    #[error("transform is not invertible (determinant is zero)")]
    SingularTransform,
}

/// Affine map between pixel space `(col, row)` and world space `(x, y)`.
///
/// Coefficients follow `x = a*col + b*row + c`; `y = d*col + e*row + f`,
/// stored as a [geo::AffineTransform] (`c` and `f` are `xoff`/`yoff`).
#[derive(Shrinkwrap, Clone, Copy, Debug)]
pub struct Transform(AffineTransform);

impl PartialEq for Transform {
    fn eq(&self, other: &Self) -> bool {
        self.to_gdal() == other.to_gdal()
    }
}

impl Transform {
    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self(AffineTransform::new(a, b, c, d, e, f))
    }

    /// From the engine's coefficient order `[c, a, b, f, d, e]`.
    pub fn from_gdal(gt: [f64; 6]) -> Self {
        Self::new(gt[1], gt[2], gt[0], gt[4], gt[5], gt[3])
    }

    pub fn to_gdal(&self) -> [f64; 6] {
        [
            self.xoff(),
            self.a(),
            self.b(),
            self.yoff(),
            self.d(),
            self.e(),
        ]
    }

    pub fn identity() -> Self {
        Self(AffineTransform::identity())
    }

    pub fn translation(xoff: f64, yoff: f64) -> Self {
        Self(AffineTransform::translate(xoff, yoff))
    }

    pub fn scale(sx: f64, sy: f64) -> Self {
        Self(AffineTransform::scale(sx, sy, (0., 0.)))
    }

    pub fn rotation(degrees: f64) -> Self {
        Self(AffineTransform::rotate(degrees, (0., 0.)))
    }

    /// North-up transform with origin at the upper-left corner.
    pub fn from_origin(west: f64, north: f64, xsize: f64, ysize: f64) -> Self {
        Self::new(xsize, 0., west, 0., -ysize, north)
    }

    /// North-up transform fitting `width x height` pixels to world bounds.
    pub fn from_bounds(
        west: f64,
        south: f64,
        east: f64,
        north: f64,
        width: f64,
        height: f64,
    ) -> Self {
        Self::from_origin(west, north, (east - west) / width, (north - south) / height)
    }

    pub fn apply(&self, col: f64, row: f64) -> (f64, f64) {
        (
            self.a() * col + self.b() * row + self.xoff(),
            self.d() * col + self.e() * row + self.yoff(),
        )
    }

    pub fn determinant(&self) -> f64 {
        self.a() * self.e() - self.b() * self.d()
    }

    /// The world-to-pixel inverse.
    ///
    /// Degenerate transforms have no inverse; the determinant check uses a
    /// relative epsilon so near-cancellation counts as singular.
    pub fn invert(&self) -> Result<Transform, TransformError> {
        let det = self.determinant();
        let scale = (self.a() * self.e())
            .abs()
            .max((self.b() * self.d()).abs());
        if !det.is_finite() || det == 0. || det.abs() <= scale * f64::EPSILON * 4. {
            return Err(TransformError::SingularTransform);
        }
        let (a, b, c) = (self.a(), self.b(), self.xoff());
        let (d, e, f) = (self.d(), self.e(), self.yoff());
        Ok(Transform::new(
            e / det,
            -b / det,
            (b * f - e * c) / det,
            -d / det,
            a / det,
            (d * c - a * f) / det,
        ))
    }

    /// `self.compose(&other)` applies `other` first, then `self`.
    pub fn compose(&self, other: &Transform) -> Transform {
        *self * *other
    }

    /// World coordinates of a pixel, anchored at its center or a corner.
    pub fn xy(&self, row: f64, col: f64, anchor: PixelAnchor) -> (f64, f64) {
        let (dc, dr) = anchor.offsets();
        self.apply(col + dc, row + dr)
    }

    /// `(row, col)` of the pixel containing the world point `(x, y)`.
    pub fn rowcol(&self, x: f64, y: f64) -> Result<(i64, i64), TransformError> {
        let (col, row) = self.invert()?.apply(x, y);
        Ok((row.floor() as i64, col.floor() as i64))
    }
}

impl Mul for Transform {
    type Output = Transform;

    /// Matrix product: `(a * b).apply(p) == a.apply(b.apply(p))`.
    fn mul(self, rhs: Transform) -> Transform {
        let (sa, sb, sc) = (self.a(), self.b(), self.xoff());
        let (sd, se, sf) = (self.d(), self.e(), self.yoff());
        let (oa, ob, oc) = (rhs.a(), rhs.b(), rhs.xoff());
        let (od, oe, of) = (rhs.d(), rhs.e(), rhs.yoff());
        Transform::new(
            sa * oa + sb * od,
            sa * ob + sb * oe,
            sa * oc + sb * of + sc,
            sd * oa + se * od,
            sd * ob + se * oe,
            sd * oc + se * of + sf,
        )
    }
}

/// Position within a pixel used by [Transform::xy].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PixelAnchor {
    #[default]
    Center,
    UpperLeft,
    UpperRight,
    LowerLeft,
    LowerRight,
}

impl PixelAnchor {
    fn offsets(self) -> (f64, f64) {
        match self {
            PixelAnchor::Center => (0.5, 0.5),
            PixelAnchor::UpperLeft => (0., 0.),
            PixelAnchor::UpperRight => (1., 0.),
            PixelAnchor::LowerLeft => (0., 1.),
            PixelAnchor::LowerRight => (1., 1.),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn utm_transform() -> Transform {
        Transform::new(
            300.0379266750948,
            0.0,
            101985.0,
            0.0,
            -300.041782729805,
            2826915.0,
        )
    }

    #[rstest]
    #[case((0., 0.), (101985.0, 2826915.0))]
    #[case((791., 718.), (339315.0, 2611485.0))]
    fn apply_maps_pixels_to_world(#[case] pixel: (f64, f64), #[case] world: (f64, f64)) {
        let (x, y) = utm_transform().apply(pixel.0, pixel.1);
        assert!((x - world.0).abs() < 1e-6, "x: {x} != {}", world.0);
        assert!((y - world.1).abs() < 1e-6, "y: {y} != {}", world.1);
    }

    #[rstest]
    #[case(0., 0.)]
    #[case(791., 718.)]
    #[case(17.3, -4.2)]
    fn invert_round_trips(#[case] col: f64, #[case] row: f64) {
        let transform = utm_transform();
        let (x, y) = transform.apply(col, row);
        let (col_back, row_back) = transform.invert().unwrap().apply(x, y);
        assert!((col_back - col).abs() < 1e-9);
        assert!((row_back - row).abs() < 1e-9);
    }

    #[test]
    fn gdal_order_round_trips() {
        let transform = utm_transform();
        assert_eq!(Transform::from_gdal(transform.to_gdal()), transform);
    }

    #[rstest]
    #[case(Transform::new(1., 2., 0., 2., 4., 0.))]
    #[case(Transform::scale(0., 1.))]
    fn singular_transforms_do_not_invert(#[case] transform: Transform) {
        assert_eq!(
            transform.invert(),
            Err(TransformError::SingularTransform)
        );
    }

    #[test]
    fn mul_applies_right_hand_side_first() {
        let shift = Transform::translation(2., 3.);
        let zoom = Transform::scale(4., 5.);
        let composed = shift * zoom;
        let (x, y) = composed.apply(1., 1.);
        let (sx, sy) = zoom.apply(1., 1.);
        assert_eq!((x, y), shift.apply(sx, sy));
        assert_eq!((x, y), (6., 8.));
    }

    #[test]
    fn from_bounds_pins_corners() {
        let transform = Transform::from_bounds(-120., 30., -110., 40., 100., 200.);
        assert_eq!(transform.apply(0., 0.), (-120., 40.));
        assert_eq!(transform.apply(100., 200.), (-110., 30.));
    }

    #[test]
    fn xy_defaults_to_pixel_center() {
        let transform = Transform::from_origin(0., 100., 10., 10.);
        assert_eq!(transform.xy(0., 0., PixelAnchor::Center), (5., 95.));
        assert_eq!(transform.xy(0., 0., PixelAnchor::UpperLeft), (0., 100.));
        assert_eq!(transform.xy(1., 2., PixelAnchor::LowerRight), (30., 80.));
    }

    #[test]
    fn rowcol_floors_to_containing_pixel() {
        let transform = Transform::from_origin(0., 100., 10., 10.);
        assert_eq!(transform.rowcol(25., 75.).unwrap(), (2, 2));
        assert_eq!(transform.rowcol(0., 100.).unwrap(), (0, 0));
        assert_eq!(transform.rowcol(-0.1, 100.1).unwrap(), (-1, -1));
    }
}
