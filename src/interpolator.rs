use ndarray::Array3;

pub(crate) struct Interpolator;

impl Interpolator {
    /// Value at the closest grid point. Coordinates are clamped to the volume.
    #[inline]
    pub(crate) fn nearest(volume: &Array3<f32>, x: f64, y: f64, z: f64) -> f32 {
        let (width, height, depth) = volume.dim();
        let xi = (x.round().max(0.0) as usize).min(width - 1);
        let yi = (y.round().max(0.0) as usize).min(height - 1);
        let zi = (z.round().max(0.0) as usize).min(depth - 1);
        volume[[xi, yi, zi]]
    }

    /// Trilinear interpolation at a continuous (x, y, z) index.
    #[inline]
    pub(crate) fn trilinear_interpolate(volume: &Array3<f32>, x: f64, y: f64, z: f64) -> f32 {
        let (width, height, depth) = volume.dim();

        let x = x.clamp(0.0, (width - 1) as f64);
        let y = y.clamp(0.0, (height - 1) as f64);
        let z = z.clamp(0.0, (depth - 1) as f64);

        let x0 = x.floor() as usize;
        let y0 = y.floor() as usize;
        let z0 = z.floor() as usize;
        let x1 = (x0 + 1).min(width - 1);
        let y1 = (y0 + 1).min(height - 1);
        let z1 = (z0 + 1).min(depth - 1);

        let dx = (x - x0 as f64) as f32;
        let dy = (y - y0 as f64) as f32;
        let dz = (z - z0 as f64) as f32;
        let one_minus_dx = 1.0 - dx;
        let one_minus_dy = 1.0 - dy;
        let one_minus_dz = 1.0 - dz;

        let bilinear = |zi: usize| {
            let v00 = volume[[x0, y0, zi]];
            let v01 = volume[[x1, y0, zi]];
            let v10 = volume[[x0, y1, zi]];
            let v11 = volume[[x1, y1, zi]];

            let v0 = v00.mul_add(one_minus_dx, v01 * dx);
            let v1 = v10.mul_add(one_minus_dx, v11 * dx);
            v0.mul_add(one_minus_dy, v1 * dy)
        };

        bilinear(z0).mul_add(one_minus_dz, bilinear(z1) * dz)
    }
}
