use crate::mesh::GeometryError;

/// Errors surfaced by the viewer to its caller.
///
/// None of these reach the render loop: geometry and texture failures degrade
/// to an empty mesh / solid material before the next frame.
#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    #[error("invalid geometry: {0}")]
    Geometry(#[from] GeometryError),

    #[error("malformed mesh response: {0}")]
    MeshResponse(String),

    #[error("mesh backend reported an error: {0}")]
    Backend(String),

    #[error("texture could not be decoded: {0}")]
    Texture(String),

    #[error("malformed viewer config: {0}")]
    Config(String),

    #[error("cannot initialize viewport: {0}")]
    Resource(String),
}
