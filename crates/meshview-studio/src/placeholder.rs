//! Mesh shown when no response file is given.

use meshview_engine::mesh::MeshResponse;

#[rustfmt::skip]
const VERTICES: [f32; 18] = [
     1.5,  0.0,  0.0,
    -1.5,  0.0,  0.0,
     0.0,  1.5,  0.0,
     0.0, -1.5,  0.0,
     0.0,  0.0,  1.5,
     0.0,  0.0, -1.5,
];

#[rustfmt::skip]
const FACES: [i64; 24] = [
    0, 2, 4,   2, 1, 4,   1, 3, 4,   3, 0, 4,
    2, 0, 5,   1, 2, 5,   3, 1, 5,   0, 3, 5,
];

/// An octahedron, in the backend's response shape.
pub fn octahedron() -> MeshResponse {
    MeshResponse::from_flat(VERTICES.to_vec(), FACES.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshview_engine::mesh::GeometryBuilder;

    #[test]
    fn octahedron_is_valid() {
        let mesh = octahedron().to_mesh(&GeometryBuilder::new()).unwrap();
        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.face_count(), 8);
    }
}
