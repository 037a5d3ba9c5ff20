//! Puts the mesh named on the command line into the viewer.

use std::path::Path;

use anyhow::{Context, Result};

use meshview_engine::mesh::MeshResponse;
use meshview_engine::Viewer;

use crate::placeholder;

/// Shows the mesh file at `path`, or the placeholder when none is given.
///
/// A file that cannot be read, parsed or validated leaves an empty scene;
/// the window still opens.
pub fn show(viewer: &mut Viewer, path: Option<&Path>) {
    let Some(path) = path else {
        if let Err(e) = viewer.load_response(&placeholder::octahedron()) {
            log::error!("placeholder mesh rejected: {e}");
        }
        return;
    };

    let loaded = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read mesh {}", path.display()))
        .and_then(|json| {
            show_json(viewer, &json).with_context(|| format!("invalid mesh {}", path.display()))
        });

    if let Err(e) = loaded {
        log::error!("{e:#}; showing an empty scene");
        viewer.scene_mut().clear_geometry();
    }
}

fn show_json(viewer: &mut Viewer, json: &str) -> Result<()> {
    let response = MeshResponse::from_json(json)?;
    viewer.load_response(&response)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_path_shows_placeholder() {
        let mut viewer = Viewer::new(800, 600);
        show(&mut viewer, None);
        assert_eq!(viewer.scene().mesh().geometry().buffer().face_count(), 8);
    }

    #[test]
    fn malformed_shape_leaves_empty_scene() {
        let path = std::env::temp_dir().join(format!("meshview-bad-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "vertices": "nope", "faces": [] }"#).unwrap();

        let mut viewer = Viewer::new(800, 600);
        show(&mut viewer, None);
        show(&mut viewer, Some(path.as_path()));
        let _ = std::fs::remove_file(&path);

        assert!(viewer.scene().mesh().geometry().buffer().is_empty());
    }

    #[test]
    fn invalid_indices_leave_empty_scene_not_placeholder() {
        let mut viewer = Viewer::new(800, 600);
        let json = r#"{ "vertices": [0,0,0, 1,0,0, 0,1,0], "faces": [0, 1, 5] }"#;

        assert!(show_json(&mut viewer, json).is_err());
        assert!(viewer.scene().mesh().geometry().buffer().is_empty());
    }

    #[test]
    fn missing_file_leaves_empty_scene() {
        let mut viewer = Viewer::new(800, 600);
        show(&mut viewer, Some(Path::new("/nonexistent/meshview/mesh.json")));
        assert!(viewer.scene().mesh().geometry().buffer().is_empty());
    }
}
