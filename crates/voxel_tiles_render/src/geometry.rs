//! The shapes that can cut through a volume.
//!
//! Every variant is broken down into convex polygons, which are then clipped against each cell by the same routine.

use voxel_tiles_core::prelude::*;

/// Cutting geometry in object space.
#[derive(Clone, Copy, Debug)]
pub enum CuttingGeometry<'a> {
    /// One convex quad.
    Quad([Point3f; 4]),
    /// `num_vertices[i]` consecutive vertices form polygon `i`.
    FaceSet {
        vertices: &'a [Point3f],
        num_vertices: &'a [usize],
    },
    /// Polygons given as indices into `vertices`, each terminated by `-1`. The last terminator may be omitted.
    IndexedFaceSet {
        vertices: &'a [Point3f],
        indices: &'a [i32],
    },
    /// `num_vertices[i]` consecutive vertices form triangle strip `i`.
    TriangleStripSet {
        vertices: &'a [Point3f],
        num_vertices: &'a [usize],
    },
    /// Triangle strips given as indices into `vertices`, each terminated by `-1`.
    IndexedTriangleStripSet {
        vertices: &'a [Point3f],
        indices: &'a [i32],
    },
    /// The infinite plane of points `p` with `normal · p = distance`.
    Plane { normal: Point3f, distance: f32 },
}

impl<'a> CuttingGeometry<'a> {
    /// Calls `visitor` with every convex polygon of this geometry. `bounds` is only used to give `Plane` a finite size: the
    /// emitted quad covers all of `bounds` that the plane passes through.
    pub fn for_each_polygon(&self, bounds: &Extent3f, mut visitor: impl FnMut(&[Point3f])) {
        match *self {
            CuttingGeometry::Quad(quad) => visitor(&quad),
            CuttingGeometry::FaceSet {
                vertices,
                num_vertices,
            } => {
                let mut start = 0;
                for &n in num_vertices.iter() {
                    visitor(&vertices[start..start + n]);
                    start += n;
                }
            }
            CuttingGeometry::IndexedFaceSet { vertices, indices } => {
                let mut polygon = Vec::new();
                for &i in indices.iter() {
                    if i < 0 {
                        visitor(&polygon);
                        polygon.clear();
                    } else {
                        polygon.push(vertices[i as usize]);
                    }
                }
                if !polygon.is_empty() {
                    visitor(&polygon);
                }
            }
            CuttingGeometry::TriangleStripSet {
                vertices,
                num_vertices,
            } => {
                let mut start = 0;
                for &n in num_vertices.iter() {
                    for_each_strip_triangle(&vertices[start..start + n], &mut visitor);
                    start += n;
                }
            }
            CuttingGeometry::IndexedTriangleStripSet { vertices, indices } => {
                for strip in indices.split(|&i| i < 0) {
                    let strip: Vec<Point3f> = strip.iter().map(|&i| vertices[i as usize]).collect();
                    for_each_strip_triangle(&strip, &mut visitor);
                }
            }
            CuttingGeometry::Plane { normal, distance } => {
                let len = normal.norm();
                if len <= 0.0 {
                    return;
                }
                let normal = normal / len;
                let distance = distance / len;
                let sphere = bounds.bounding_sphere();
                let center_depth = normal.dot(&sphere.center) - distance;
                if center_depth.abs() > sphere.radius {
                    return;
                }
                let center = sphere.center - normal * center_depth;
                visitor(&square_on_plane(center, normal, sphere.radius));
            }
        }
    }
}

fn for_each_strip_triangle(strip: &[Point3f], visitor: &mut impl FnMut(&[Point3f])) {
    for triangle in strip.windows(3) {
        visitor(triangle);
    }
}

/// Two unit vectors that, together with the unit `normal`, form an orthonormal basis.
pub fn plane_basis(normal: Point3f) -> (Point3f, Point3f) {
    let helper = if normal.x().abs() < 0.9 {
        PointN([1.0, 0.0, 0.0])
    } else {
        PointN([0.0, 1.0, 0.0])
    };
    let u = normal.cross(&helper).normalized();
    let v = normal.cross(&u);

    (u, v)
}

/// The square centered on `center` in the plane with unit `normal`, with half-width `half_size`. Corners wind
/// counterclockwise when seen from the side `normal` points to.
pub fn square_on_plane(center: Point3f, normal: Point3f, half_size: f32) -> [Point3f; 4] {
    let (u, v) = plane_basis(normal);
    let u = u * half_size;
    let v = v * half_size;

    [
        center - u - v,
        center + u - v,
        center + u + v,
        center - u + v,
    ]
}

// ████████╗███████╗███████╗████████╗███████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝
//    ██║   █████╗  ███████╗   ██║   ███████╗
//    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║
//    ██║   ███████╗███████║   ██║   ███████║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    fn points(n: usize) -> Vec<Point3f> {
        (0..n).map(|i| PointN([i as f32, 0.0, 0.0])).collect()
    }

    fn collect(geometry: CuttingGeometry<'_>) -> Vec<Vec<Point3f>> {
        let bounds = Extent3f::from_min_and_shape(Point3f::ZERO, Point3f::fill(2.0));
        let mut polygons = Vec::new();
        geometry.for_each_polygon(&bounds, |p| polygons.push(p.to_vec()));

        polygons
    }

    #[test]
    fn face_set_splits_by_counts() {
        let vertices = points(7);

        let polygons = collect(CuttingGeometry::FaceSet {
            vertices: &vertices,
            num_vertices: &[3, 4],
        });

        assert_eq!(polygons, vec![vertices[0..3].to_vec(), vertices[3..7].to_vec()]);
    }

    #[test]
    fn indexed_face_set_splits_on_terminator() {
        let vertices = points(4);

        let polygons = collect(CuttingGeometry::IndexedFaceSet {
            vertices: &vertices,
            indices: &[0, 1, 2, -1, 3, 2, 1],
        });

        assert_eq!(
            polygons,
            vec![
                vec![vertices[0], vertices[1], vertices[2]],
                vec![vertices[3], vertices[2], vertices[1]],
            ]
        );
    }

    #[test]
    fn triangle_strips_yield_each_triangle() {
        let vertices = points(7);

        let polygons = collect(CuttingGeometry::TriangleStripSet {
            vertices: &vertices,
            num_vertices: &[4, 3],
        });

        assert_eq!(
            polygons,
            vec![
                vertices[0..3].to_vec(),
                vertices[1..4].to_vec(),
                vertices[4..7].to_vec()
            ]
        );
    }

    #[test]
    fn indexed_triangle_strips_restart_on_terminator() {
        let vertices = points(5);

        let polygons = collect(CuttingGeometry::IndexedTriangleStripSet {
            vertices: &vertices,
            indices: &[0, 1, 2, 3, -1, 4, 3, 2, -1],
        });

        assert_eq!(
            polygons,
            vec![
                vec![vertices[0], vertices[1], vertices[2]],
                vec![vertices[1], vertices[2], vertices[3]],
                vec![vertices[4], vertices[3], vertices[2]],
            ]
        );
    }

    #[test]
    fn plane_becomes_quad_covering_bounds() {
        let polygons = collect(CuttingGeometry::Plane {
            normal: PointN([0.0, 0.0, 2.0]),
            distance: 1.0,
        });

        assert_eq!(polygons.len(), 1);
        for corner in polygons[0].iter() {
            assert!((corner.z() - 0.5).abs() < 1e-6);
        }
        let xs: Vec<f32> = polygons[0].iter().map(|c| c.x()).collect();
        let min_x = xs.iter().cloned().fold(f32::MAX, f32::min);
        let max_x = xs.iter().cloned().fold(f32::MIN, f32::max);
        assert!(min_x <= 0.0 && max_x >= 2.0);
    }

    #[test]
    fn scaled_plane_equation_is_the_same_plane() {
        let unit = collect(CuttingGeometry::Plane {
            normal: PointN([0.0, 0.6, 0.8]),
            distance: 1.0,
        });
        let scaled = collect(CuttingGeometry::Plane {
            normal: PointN([0.0, 3.0, 4.0]),
            distance: 5.0,
        });

        assert_eq!(scaled.len(), 1);
        for (a, b) in unit[0].iter().zip(scaled[0].iter()) {
            assert!((*a - *b).norm() < 1e-5, "{:?} != {:?}", a, b);
        }
        for corner in scaled[0].iter() {
            assert!((corner.dot(&PointN([0.0, 3.0, 4.0])) - 5.0).abs() < 1e-4);
        }
    }

    #[test]
    fn zero_normal_plane_is_skipped() {
        let polygons = collect(CuttingGeometry::Plane {
            normal: Point3f::ZERO,
            distance: 1.0,
        });

        assert!(polygons.is_empty());
    }

    #[test]
    fn plane_missing_bounds_is_skipped() {
        let polygons = collect(CuttingGeometry::Plane {
            normal: PointN([1.0, 0.0, 0.0]),
            distance: 10.0,
        });

        assert!(polygons.is_empty());
    }

    #[test]
    fn basis_is_orthonormal() {
        let normals: [Point3f; 3] = [
            PointN([0.0, 0.0, 1.0]),
            PointN([1.0, 0.0, 0.0]),
            Point3f::normalized(&PointN([1.0, 2.0, 3.0])),
        ];
        for normal in normals.iter() {
            let (u, v) = plane_basis(*normal);

            assert!(u.dot(normal).abs() < 1e-6);
            assert!(v.dot(normal).abs() < 1e-6);
            assert!(u.dot(&v).abs() < 1e-6);
            assert!((u.norm() - 1.0).abs() < 1e-6);
            assert!((v.norm() - 1.0).abs() < 1e-6);
        }
    }
}
