//! Perspective transforms between the reference patch and the scene.

mod estimator;

pub use self::estimator::{Estimate, GeometryEstimator};

use nalgebra::{Matrix3, SMatrix, SVector, SymmetricEigen};

use crate::modules::{Point2D, Quad};

/// 3x3 projective transform acting on homogeneous image points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Homography(Matrix3<f64>);

impl Homography {
	pub fn identity() -> Self {
		Homography(Matrix3::identity())
	}

	pub fn from_matrix(matrix: Matrix3<f64>) -> Self {
		Homography(matrix)
	}

	pub fn matrix(&self) -> &Matrix3<f64> {
		&self.0
	}

	pub fn is_finite(&self) -> bool {
		self.0.iter().all(|v| v.is_finite())
	}

	pub fn project(&self, point: Point2D) -> Point2D {
		let (x, y) = (point.x as f64, point.y as f64);
		let m = &self.0;
		let px = m[(0, 0)] * x + m[(0, 1)] * y + m[(0, 2)];
		let py = m[(1, 0)] * x + m[(1, 1)] * y + m[(1, 2)];
		let pw = m[(2, 0)] * x + m[(2, 1)] * y + m[(2, 2)];

		let w = if pw == 0. { 1e-7 } else { pw };
		Point2D::new((px / w) as f32, (py / w) as f32)
	}

	pub fn project_quad(&self, quad: &Quad) -> Quad {
		let c = quad.corners();
		Quad([self.project(c[0]), self.project(c[1]), self.project(c[2]), self.project(c[3])])
	}

	/// Squared reprojection error of `src -> dst`.
	pub fn residual(&self, src: Point2D, dst: Point2D) -> f64 {
		let p = self.project(src);
		let (dx, dy) = ((p.x - dst.x) as f64, (p.y - dst.y) as f64);
		dx * dx + dy * dy
	}

	/// Least-squares direct linear transform over all pairs, with Hartley
	/// normalisation. `None` for fewer than four pairs, coincident points, or a
	/// non-finite solution.
	pub fn fit(src: &[Point2D], dst: &[Point2D]) -> Option<Self> {
		if src.len() != dst.len() || src.len() < 4 {
			return None;
		}
		let (src_n, t_src) = normalize(src)?;
		let (dst_n, t_dst) = normalize(dst)?;

		let mut ata = SMatrix::<f64, 9, 9>::zeros();
		for ((x, y), (u, v)) in src_n.iter().zip(dst_n.iter()) {
			let r1 = SVector::<f64, 9>::from_column_slice(&[*x, *y, 1., 0., 0., 0., -u * x, -u * y, -u]);
			let r2 = SVector::<f64, 9>::from_column_slice(&[0., 0., 0., *x, *y, 1., -v * x, -v * y, -v]);
			ata += r1 * r1.transpose();
			ata += r2 * r2.transpose();
		}

		// null vector of A is the eigenvector of AᵀA with the smallest eigenvalue
		let eig = SymmetricEigen::new(ata);
		let h = eig.eigenvectors.column(eig.eigenvalues.imin());
		let hn = Matrix3::new(h[0], h[1], h[2], h[3], h[4], h[5], h[6], h[7], h[8]);

		let t_dst_inv = Matrix3::new(
			1. / t_dst.scale, 0., t_dst.cx,
			0., 1. / t_dst.scale, t_dst.cy,
			0., 0., 1.,
		);
		let mut m = t_dst_inv * hn * t_src.matrix();
		let w = m[(2, 2)];
		if w.abs() > 1e-12 {
			m /= w;
		}

		let homography = Homography(m);
		if homography.is_finite() {
			Some(homography)
		} else {
			None
		}
	}
}

struct Normalization {
	cx: f64,
	cy: f64,
	scale: f64,
}

impl Normalization {
	fn matrix(&self) -> Matrix3<f64> {
		Matrix3::new(
			self.scale, 0., -self.scale * self.cx,
			0., self.scale, -self.scale * self.cy,
			0., 0., 1.,
		)
	}
}

/// Centre on the centroid and scale so the mean distance from it is √2.
fn normalize(points: &[Point2D]) -> Option<(Vec<(f64, f64)>, Normalization)> {
	let n = points.len() as f64;
	let cx = points.iter().map(|p| p.x as f64).sum::<f64>() / n;
	let cy = points.iter().map(|p| p.y as f64).sum::<f64>() / n;
	let mean = points.iter().map(|p| (p.x as f64 - cx).hypot(p.y as f64 - cy)).sum::<f64>() / n;
	if !(mean > 1e-12) {
		return None;
	}

	let scale = std::f64::consts::SQRT_2 / mean;
	let normalized = points.iter().map(|p| ((p.x as f64 - cx) * scale, (p.y as f64 - cy) * scale)).collect();
	Some((normalized, Normalization { cx: cx, cy: cy, scale: scale }))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::modules::Rect;
	use approx::assert_relative_eq;

	fn grid() -> Vec<Point2D> {
		let mut points = Vec::new();
		for y in 0..4 {
			for x in 0..5 {
				points.push(Point2D::new(x as f32 * 20. + 3., y as f32 * 15. + 7.));
			}
		}
		points
	}

	#[test]
	fn test_identity_projection_keeps_corners() {
		let quad = Rect::new(12, 34, 56, 78).corners();
		assert_eq!(Homography::identity().project_quad(&quad), quad);
	}

	#[test]
	fn test_fit_recovers_translation() {
		let src = grid();
		let dst: Vec<Point2D> = src.iter().map(|p| Point2D::new(p.x + 17., p.y - 5.)).collect();
		let h = Homography::fit(&src, &dst).unwrap();

		let m = h.matrix();
		assert_relative_eq!(m[(0, 2)], 17., epsilon = 1e-5);
		assert_relative_eq!(m[(1, 2)], -5., epsilon = 1e-5);
		assert_relative_eq!(m[(0, 0)], 1., epsilon = 1e-6);
		assert_relative_eq!(m[(2, 0)], 0., epsilon = 1e-7);
	}

	#[test]
	fn test_fit_recovers_perspective() {
		let truth = Homography::from_matrix(Matrix3::new(
			0.9, 0.1, 12.,
			-0.05, 1.1, 4.,
			0.0004, -0.0002, 1.,
		));
		let src = grid();
		let dst: Vec<Point2D> = src.iter().map(|&p| truth.project(p)).collect();
		let h = Homography::fit(&src, &dst).unwrap();

		for p in &src {
			let a = truth.project(*p);
			let b = h.project(*p);
			assert!(a.distance(&b) < 1e-3);
		}
	}

	#[test]
	fn test_fit_needs_four_distinct_points() {
		let p = Point2D::new(1., 1.);
		assert!(Homography::fit(&[p, p, p], &[p, p, p]).is_none());
		assert!(Homography::fit(&[p, p, p, p], &[p, p, p, p]).is_none());
	}

	#[test]
	fn test_projection_divides_by_w() {
		let h = Homography::from_matrix(Matrix3::new(2., 0., 0., 0., 2., 0., 0., 0., 2.));
		assert_eq!(h.project(Point2D::new(3., 4.)), Point2D::new(3., 4.));
	}
}
