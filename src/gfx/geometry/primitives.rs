//! # Primitive Shape Generation

use super::{GeometryData, Vertex3D};

/// Generate a unit cube centered at the origin
///
/// Vertices span -0.5 to 0.5 on all axes. Each face has its own four
/// vertices so normals stay flat, with UVs from 0 to 1.
pub fn generate_cube() -> GeometryData {
    // (outward normal, tangent u, tangent v) per face
    let faces: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
        ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
        ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
        ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
        ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
    ];
    let corners: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

    let mut data = GeometryData::default();
    for (normal, u_axis, v_axis) in faces {
        let base = data.vertices.len() as u32;
        for [u, v] in corners {
            let (su, sv) = (u - 0.5, v - 0.5);
            let position = [
                0.5 * normal[0] + su * u_axis[0] + sv * v_axis[0],
                0.5 * normal[1] + su * u_axis[1] + sv * v_axis[1],
                0.5 * normal[2] + su * u_axis[2] + sv * v_axis[2],
            ];
            data.vertices.push(Vertex3D {
                position,
                normal,
                tex_coords: [u, v],
            });
        }
        data.indices
            .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }

    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cube_counts() {
        let cube = generate_cube();
        assert_eq!(cube.vertex_count(), 24);
        assert_eq!(cube.triangle_count(), 12);
        assert!(cube.indices.iter().all(|&i| (i as usize) < cube.vertex_count()));
    }

    #[test]
    fn test_cube_vertices_lie_on_their_face() {
        for vertex in generate_cube().vertices {
            for axis in 0..3 {
                assert!(vertex.position[axis].abs() <= 0.5);
                if vertex.normal[axis] != 0.0 {
                    assert_eq!(vertex.position[axis], 0.5 * vertex.normal[axis]);
                }
            }
        }
    }

    #[test]
    fn test_cube_winding_faces_outward() {
        let cube = generate_cube();
        for triangle in cube.indices.chunks(3) {
            let [a, b, c] = [0, 1, 2].map(|k| cube.vertices[triangle[k] as usize].position);
            let ab = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
            let ac = [c[0] - a[0], c[1] - a[1], c[2] - a[2]];
            let cross = [
                ab[1] * ac[2] - ab[2] * ac[1],
                ab[2] * ac[0] - ab[0] * ac[2],
                ab[0] * ac[1] - ab[1] * ac[0],
            ];
            let normal = cube.vertices[triangle[0] as usize].normal;
            let dot: f32 = (0..3).map(|k| cross[k] * normal[k]).sum();
            assert!(dot > 0.0);
        }
    }
}
