use serde::Deserialize;

use crate::error::ViewerError;

use super::builder::GeometryBuilder;
use super::buffer::MeshBuffer;

/// Coordinate arrays arrive either flat or as nested triples.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
enum Triples<T> {
    Flat(Vec<T>),
    Nested(Vec<[T; 3]>),
}

impl<T: Copy> Triples<T> {
    fn flatten(&self) -> Vec<T> {
        match self {
            Triples::Flat(v) => v.clone(),
            Triples::Nested(v) => v.iter().flatten().copied().collect(),
        }
    }
}

/// Response body from the mesh-generation backend.
///
/// ```json
/// { "vertices": [0, 0, 0, 1, 0, 0, 0, 1, 0], "faces": [0, 1, 2] }
/// ```
///
/// Nested `[[x, y, z], ...]` forms are accepted for both arrays. A backend
/// failure is reported through `error` instead of geometry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MeshResponse {
    #[serde(default)]
    vertices: Option<Triples<f32>>,
    #[serde(default)]
    faces: Option<Triples<i64>>,
    #[serde(default)]
    error: Option<String>,
}

impl MeshResponse {
    pub fn from_flat(vertices: Vec<f32>, faces: Vec<i64>) -> Self {
        Self {
            vertices: Some(Triples::Flat(vertices)),
            faces: Some(Triples::Flat(faces)),
            error: None,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ViewerError> {
        serde_json::from_str(json).map_err(|e| ViewerError::MeshResponse(e.to_string()))
    }

    pub fn backend_error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Validates the response into a mesh.
    pub fn to_mesh(&self, builder: &GeometryBuilder) -> Result<MeshBuffer, ViewerError> {
        if let Some(message) = &self.error {
            return Err(ViewerError::Backend(message.clone()));
        }

        let vertices = self
            .vertices
            .as_ref()
            .ok_or_else(|| ViewerError::MeshResponse("missing `vertices`".into()))?
            .flatten();
        let faces = self
            .faces
            .as_ref()
            .ok_or_else(|| ViewerError::MeshResponse("missing `faces`".into()))?
            .flatten();

        Ok(builder.build_wide(&vertices, &faces)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_arrays_parse() {
        let resp = MeshResponse::from_json(
            r#"{ "vertices": [0, 0, 0, 1, 0, 0, 0, 1, 0], "faces": [0, 1, 2] }"#,
        )
        .unwrap();
        let mesh = resp.to_mesh(&GeometryBuilder::new()).unwrap();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.face_count(), 1);
    }

    #[test]
    fn nested_triples_parse() {
        let resp = MeshResponse::from_json(
            r#"{ "vertices": [[0, 0, 0], [1, 0, 0], [0, 1, 0]], "faces": [[0, 1, 2]] }"#,
        )
        .unwrap();
        let mesh = resp.to_mesh(&GeometryBuilder::new()).unwrap();
        assert_eq!(mesh.face_count(), 1);
    }

    #[test]
    fn missing_faces_is_malformed() {
        let resp = MeshResponse::from_json(r#"{ "vertices": [0, 0, 0] }"#).unwrap();
        let err = resp.to_mesh(&GeometryBuilder::new()).unwrap_err();
        assert!(matches!(err, ViewerError::MeshResponse(_)));
    }

    #[test]
    fn wrong_shape_fails_to_parse() {
        let err = MeshResponse::from_json(r#"{ "vertices": "nope", "faces": [] }"#).unwrap_err();
        assert!(matches!(err, ViewerError::MeshResponse(_)));
    }

    #[test]
    fn backend_error_is_surfaced() {
        let resp = MeshResponse::from_json(r#"{ "error": "Invalid fractal type" }"#).unwrap();
        assert_eq!(resp.backend_error(), Some("Invalid fractal type"));
        let err = resp.to_mesh(&GeometryBuilder::new()).unwrap_err();
        assert!(matches!(err, ViewerError::Backend(_)));
    }

    #[test]
    fn out_of_range_face_becomes_geometry_error() {
        let resp = MeshResponse::from_flat(vec![0.0; 9], vec![0, 1, 5]);
        let err = resp.to_mesh(&GeometryBuilder::new()).unwrap_err();
        assert!(matches!(err, ViewerError::Geometry(_)));
    }
}
