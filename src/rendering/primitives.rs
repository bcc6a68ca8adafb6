use crate::core::math::{self, Mat4, Vec2, Vec3, Vec4};
use crate::rendering::mesh::{Geometry, Vertex};
use std::collections::HashMap;

/// A unit cube spanning [-1, 1] with both solid triangles and wireframe
/// edges over the same vertices. Used for frustum and bounds
/// visualization.
pub fn cube() -> Geometry {
    const POSITIONS: [[f32; 3]; 8] = [
        [-1.0, -1.0, 1.0],
        [1.0, -1.0, 1.0],
        [-1.0, 1.0, 1.0],
        [1.0, 1.0, 1.0],
        [-1.0, -1.0, -1.0],
        [1.0, -1.0, -1.0],
        [-1.0, 1.0, -1.0],
        [1.0, 1.0, -1.0],
    ];

    #[rustfmt::skip]
    const TRIANGLES: [u32; 36] = [
        2, 0, 1, 2, 1, 3, // far
        6, 4, 5, 6, 5, 7, // near
        2, 0, 4, 2, 4, 6, // left
        3, 1, 5, 3, 5, 7, // right
        0, 4, 5, 0, 5, 1, // bottom
        2, 6, 7, 2, 7, 3, // top
    ];

    #[rustfmt::skip]
    const EDGES: [u32; 24] = [
        0, 1, 1, 3, 3, 2, 2, 0,
        4, 5, 5, 7, 7, 6, 6, 4,
        0, 4, 1, 5, 3, 7, 2, 6,
    ];

    let vertices = POSITIONS
        .iter()
        .map(|p| {
            let position = Vec3::new(p[0], p[1], p[2]);
            Vertex::from_position(position, position.normalize())
        })
        .collect();

    Geometry {
        vertices,
        indices: TRIANGLES.to_vec(),
        wireframe_indices: EDGES.to_vec(),
    }
}

/// A ground plane centered at the origin with a uniform upward tangent
/// frame, `half_extent` world units to each side.
pub fn ground_plane(half_extent: f32) -> Geometry {
    let corners = [
        (Vec3::new(-half_extent, 0.0, -half_extent), Vec2::new(0.0, 0.0)),
        (Vec3::new(-half_extent, 0.0, half_extent), Vec2::new(0.0, 1.0)),
        (Vec3::new(half_extent, 0.0, half_extent), Vec2::new(1.0, 1.0)),
        (Vec3::new(half_extent, 0.0, -half_extent), Vec2::new(1.0, 0.0)),
    ];

    let vertices = corners
        .iter()
        .map(|(position, uv)| Vertex {
            position: *position,
            normal: Vec3::new(0.0, 1.0, 0.0),
            tangent: Vec4::new(1.0, 0.0, 0.0, 1.0),
            tex_coord: *uv,
            color: Vec4::new(1.0, 1.0, 1.0, 1.0),
        })
        .collect();

    Geometry {
        vertices,
        indices: vec![0, 1, 2, 2, 3, 0],
        wireframe_indices: Vec::new(),
    }
}

/// A parametric UV sphere.
pub fn uv_sphere(radius: f32, sectors: u32, stacks: u32) -> Geometry {
    let mut vertices = Vec::with_capacity(((stacks + 1) * (sectors + 1)) as usize);

    for stack in 0..=stacks {
        let phi = std::f32::consts::PI * stack as f32 / stacks as f32;
        for sector in 0..=sectors {
            let theta = 2.0 * std::f32::consts::PI * sector as f32 / sectors as f32;

            let normal = Vec3::new(
                phi.sin() * theta.cos(),
                phi.cos(),
                phi.sin() * theta.sin(),
            );

            vertices.push(Vertex {
                position: normal * radius,
                normal,
                tangent: Vec4::new(-theta.sin(), 0.0, theta.cos(), 1.0),
                tex_coord: Vec2::new(
                    sector as f32 / sectors as f32,
                    stack as f32 / stacks as f32,
                ),
                color: Vec4::new(1.0, 1.0, 1.0, 1.0),
            });
        }
    }

    let mut indices = Vec::new();
    let ring = sectors + 1;
    for stack in 0..stacks {
        for sector in 0..sectors {
            let a = stack * ring + sector;
            let b = a + ring;

            if stack != 0 {
                indices.extend_from_slice(&[a, b, a + 1]);
            }
            if stack != stacks - 1 {
                indices.extend_from_slice(&[a + 1, b, b + 1]);
            }
        }
    }

    Geometry {
        vertices,
        indices,
        wireframe_indices: Vec::new(),
    }
}

/// An icosphere built by subdividing an icosahedron; shared edge midpoints
/// are deduplicated, so `n` subdivisions give `20 * 4^n` triangles over
/// `10 * 4^n + 2` vertices.
pub fn icosphere(subdivisions: usize) -> Geometry {
    const X: f32 = 0.525_731_1;
    const Z: f32 = 0.850_650_8;

    let mut positions: Vec<Vec3> = vec![
        Vec3::new(-X, 0.0, Z),
        Vec3::new(X, 0.0, Z),
        Vec3::new(-X, 0.0, -Z),
        Vec3::new(X, 0.0, -Z),
        Vec3::new(0.0, Z, X),
        Vec3::new(0.0, Z, -X),
        Vec3::new(0.0, -Z, X),
        Vec3::new(0.0, -Z, -X),
        Vec3::new(Z, X, 0.0),
        Vec3::new(-Z, X, 0.0),
        Vec3::new(Z, -X, 0.0),
        Vec3::new(-Z, -X, 0.0),
    ];

    #[rustfmt::skip]
    let mut triangles: Vec<[u32; 3]> = vec![
        [0, 4, 1], [0, 9, 4], [9, 5, 4], [4, 5, 8], [4, 8, 1],
        [8, 10, 1], [8, 3, 10], [5, 3, 8], [5, 2, 3], [2, 7, 3],
        [7, 10, 3], [7, 6, 10], [7, 11, 6], [11, 0, 6], [0, 1, 6],
        [6, 1, 10], [9, 0, 11], [9, 11, 2], [9, 2, 5], [7, 2, 11],
    ];

    for _ in 0..subdivisions {
        triangles = subdivide(&mut positions, &triangles);
    }

    let vertices = positions
        .iter()
        .map(|p| Vertex::from_position(*p, p.normalize()))
        .collect();

    Geometry {
        vertices,
        indices: triangles.iter().flatten().copied().collect(),
        wireframe_indices: Vec::new(),
    }
}

fn subdivide(positions: &mut Vec<Vec3>, triangles: &[[u32; 3]]) -> Vec<[u32; 3]> {
    let mut midpoints: HashMap<(u32, u32), u32> = HashMap::new();
    let mut result = Vec::with_capacity(triangles.len() * 4);

    for triangle in triangles {
        let mut mid = [0u32; 3];
        for edge in 0..3 {
            mid[edge] = vertex_for_edge(
                &mut midpoints,
                positions,
                triangle[edge],
                triangle[(edge + 1) % 3],
            );
        }

        result.push([triangle[0], mid[0], mid[2]]);
        result.push([triangle[1], mid[1], mid[0]]);
        result.push([triangle[2], mid[2], mid[1]]);
        result.push(mid);
    }

    result
}

fn vertex_for_edge(
    midpoints: &mut HashMap<(u32, u32), u32>,
    positions: &mut Vec<Vec3>,
    first: u32,
    second: u32,
) -> u32 {
    let key = if first < second {
        (first, second)
    } else {
        (second, first)
    };

    *midpoints.entry(key).or_insert_with(|| {
        let midpoint = (positions[first as usize] + positions[second as usize]).normalize();
        positions.push(midpoint);
        (positions.len() - 1) as u32
    })
}

/// The transform that maps the unit clip cube onto a camera's frustum,
/// used to place the frustum visualization cubes.
pub fn frustum_transform(view_projection: &Mat4) -> Mat4 {
    math::inverse(view_projection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::math::matrix;

    #[test]
    fn cube_has_twelve_axis_aligned_edges() {
        let cube = cube();

        assert_eq!(cube.vertices.len(), 8);
        assert_eq!(cube.indices.len(), 36);
        assert_eq!(cube.wireframe_indices.len(), 24);

        for edge in cube.wireframe_indices.chunks(2) {
            let a = cube.vertices[edge[0] as usize].position;
            let b = cube.vertices[edge[1] as usize].position;
            let delta = b - a;
            // Each edge spans exactly one axis of the [-1, 1] cube.
            assert!((delta.norm() - 2.0).abs() < 1e-6);
            let nonzero = [delta.x, delta.y, delta.z]
                .iter()
                .filter(|c| c.abs() > 1e-6)
                .count();
            assert_eq!(nonzero, 1);
        }
    }

    #[test]
    fn ground_plane_faces_up() {
        let plane = ground_plane(100.0);

        assert_eq!(plane.vertices.len(), 4);
        assert_eq!(plane.indices.len(), 6);
        for vertex in &plane.vertices {
            assert_eq!(vertex.normal, Vec3::new(0.0, 1.0, 0.0));
            assert_eq!(vertex.position.y, 0.0);
            assert_eq!(vertex.position.x.abs(), 100.0);
        }
    }

    #[test]
    fn icosphere_subdivision_counts() {
        for (subdivisions, vertex_count, triangle_count) in
            [(0usize, 12, 20), (1, 42, 80), (2, 162, 320)]
        {
            let sphere = icosphere(subdivisions);
            assert_eq!(sphere.vertices.len(), vertex_count, "n = {}", subdivisions);
            assert_eq!(
                sphere.indices.len(),
                triangle_count * 3,
                "n = {}",
                subdivisions
            );
        }
    }

    #[test]
    fn icosphere_vertices_lie_on_the_unit_sphere() {
        let sphere = icosphere(2);
        for vertex in &sphere.vertices {
            assert!((vertex.position.norm() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn uv_sphere_has_the_requested_radius() {
        let sphere = uv_sphere(2.5, 16, 8);
        for vertex in &sphere.vertices {
            assert!((vertex.position.norm() - 2.5).abs() < 1e-5);
            assert!((vertex.normal.norm() - 1.0).abs() < 1e-5);
        }
        for index in &sphere.indices {
            assert!((*index as usize) < sphere.vertices.len());
        }
    }

    #[test]
    fn frustum_transform_round_trips_clip_corners() {
        let projection = matrix::perspective(1280, 768, 45.0, 0.1, 100.0);
        let view = matrix::look_at(
            &Vec3::new(0.0, 2.0, 8.0),
            &Vec3::new(0.0, 0.0, 0.0),
            &Vec3::new(0.0, 1.0, 0.0),
        );
        let view_projection = projection * view;
        let transform = frustum_transform(&view_projection);

        for corner in [
            Vec4::new(-1.0, -1.0, -1.0, 1.0),
            Vec4::new(1.0, 1.0, 1.0, 1.0),
            Vec4::new(1.0, -1.0, 1.0, 1.0),
        ] {
            let world = transform * corner;
            let back = view_projection * world;
            let back = back / back.w;
            assert!((back.xyz() - corner.xyz()).norm() < 1e-3, "{:?}", back);
        }
    }
}
