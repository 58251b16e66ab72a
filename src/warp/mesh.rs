//! Regular triangulated grid over an image rectangle.
//!
//! The grid is the deformation basis: every vertex is pushed through the
//! deformation field and every triangle is texture-mapped on its own.
//!
//! ```text
//! p1 ---- p2        triangles per cell:
//!  |    / |           (p1, p2, p3)
//!  |  /   |           (p2, p4, p3)
//! p3 ---- p4
//! ```
//!
//! The diagonal always runs p2 -> p3. It is never alternated, so the same
//! inputs always give the same tessellation.

use glam::Vec2;

/// Side of a grid cell in image pixels at density 1.0.
pub const BASE_CELL_SIZE: f32 = 50.0;

/// Minimum number of grid steps along each axis.
pub const MIN_STEPS: usize = 2;

/// Triangulated grid in layer-local (image pixel) space.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    /// Row-major vertices, `(steps_x + 1) * (steps_y + 1)` of them.
    pub vertices: Vec<Vec2>,
    /// Vertex index triples, two per grid cell.
    pub indices: Vec<[usize; 3]>,
    pub steps_x: usize,
    pub steps_y: usize,
}

impl Mesh {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len()
    }

    /// Corner positions of triangle `tri` taken from `vertices`.
    ///
    /// `vertices` is usually either `self.vertices` or a deformed copy of it
    /// with the same ordering.
    #[inline]
    pub fn triangle(&self, vertices: &[Vec2], tri: usize) -> [Vec2; 3] {
        let [i1, i2, i3] = self.indices[tri];
        [vertices[i1], vertices[i2], vertices[i3]]
    }
}

/// Number of grid steps for one image dimension.
///
/// `max(2, floor(dimension / (50 / density)))`.
#[inline]
pub fn grid_steps(dimension: f32, density: f32) -> usize {
    let steps = (dimension / (BASE_CELL_SIZE / density)).floor();
    if steps.is_finite() && steps > MIN_STEPS as f32 {
        steps as usize
    } else {
        MIN_STEPS
    }
}

/// Build the warp mesh for a `width` x `height` image.
///
/// Pure function of its inputs. `density` is expected to be positive
/// (see [`crate::entities::WarpSettings::sanitized`]).
pub fn generate_mesh(width: f32, height: f32, density: f32) -> Mesh {
    let steps_x = grid_steps(width, density);
    let steps_y = grid_steps(height, density);
    let row = steps_x + 1;

    let mut vertices = Vec::with_capacity(row * (steps_y + 1));
    for j in 0..=steps_y {
        for i in 0..=steps_x {
            vertices.push(Vec2::new(
                i as f32 / steps_x as f32 * width,
                j as f32 / steps_y as f32 * height,
            ));
        }
    }

    let mut indices = Vec::with_capacity(2 * steps_x * steps_y);
    for j in 0..steps_y {
        for i in 0..steps_x {
            let p1 = j * row + i;
            let p2 = p1 + 1;
            let p3 = (j + 1) * row + i;
            let p4 = p3 + 1;

            indices.push([p1, p2, p3]);
            indices.push([p2, p4, p3]);
        }
    }

    Mesh {
        vertices,
        indices,
        steps_x,
        steps_y,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimum_grid() {
        let mesh = generate_mesh(100.0, 100.0, 1.0);
        assert_eq!(mesh.steps_x, 2);
        assert_eq!(mesh.steps_y, 2);
        assert_eq!(mesh.vertex_count(), 9);
        assert_eq!(mesh.triangle_count(), 8);
    }

    #[test]
    fn test_tiny_image_still_gets_two_steps() {
        let mesh = generate_mesh(3.0, 1.0, 0.5);
        assert_eq!((mesh.steps_x, mesh.steps_y), (2, 2));
        assert_eq!(mesh.triangle_count(), 8);
    }

    #[test]
    fn test_counts_follow_density() {
        // 400 / (50 / 2) = 16, 200 / 25 = 8
        let mesh = generate_mesh(400.0, 200.0, 2.0);
        assert_eq!((mesh.steps_x, mesh.steps_y), (16, 8));
        assert_eq!(mesh.vertex_count(), 17 * 9);
        assert_eq!(mesh.triangle_count(), 2 * 16 * 8);
    }

    #[test]
    fn test_deterministic() {
        let a = generate_mesh(317.0, 211.0, 1.7);
        let b = generate_mesh(317.0, 211.0, 1.7);
        assert_eq!(a, b);
    }

    #[test]
    fn test_boundary_on_rectangle() {
        let mesh = generate_mesh(120.0, 80.0, 1.0);
        let first = mesh.vertices[0];
        let last = *mesh.vertices.last().unwrap();
        assert_eq!(first, Vec2::ZERO);
        assert_eq!(last, Vec2::new(120.0, 80.0));
        // top-right corner is the end of the first row
        assert_eq!(mesh.vertices[mesh.steps_x], Vec2::new(120.0, 0.0));
    }

    #[test]
    fn test_fixed_diagonal() {
        let mesh = generate_mesh(100.0, 100.0, 1.0);
        // first cell: p1=0, p2=1, p3=3, p4=4
        assert_eq!(mesh.indices[0], [0, 1, 3]);
        assert_eq!(mesh.indices[1], [1, 4, 3]);
        // second cell in the first row
        assert_eq!(mesh.indices[2], [1, 2, 4]);
        assert_eq!(mesh.indices[3], [2, 5, 4]);
    }

    #[test]
    fn test_consistent_winding() {
        let mesh = generate_mesh(250.0, 150.0, 1.3);
        for tri in 0..mesh.triangle_count() {
            let [a, b, c] = mesh.triangle(&mesh.vertices, tri);
            let area = (b - a).perp_dot(c - a);
            assert!(area > 0.0, "triangle {} has area {}", tri, area);
        }
    }
}
