use glam::{EulerRot, Mat4, Quat, Vec3};

use crate::mesh::MeshBuffer;
use crate::paint::Rgb;

use super::light::{AmbientLight, LightState, LightingRig, PointLight};
use super::material::{Material, MaterialController};
use super::resources::{GeometryHandle, ResourceId, ResourceLedger};

/// Mesh node transform. Rotation is Euler XYZ in radians.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Vec3,
    pub scale: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: 1.0,
        }
    }
}

impl Transform {
    pub fn matrix(&self) -> Mat4 {
        let r = self.rotation;
        Mat4::from_scale_rotation_translation(
            Vec3::splat(self.scale),
            Quat::from_euler(EulerRot::XYZ, r.x, r.y, r.z),
            self.translation,
        )
    }
}

/// Geometry attached to the mesh node: CPU data plus its ledger handle.
///
/// The handle is `None` once the scene has been disposed.
#[derive(Debug)]
pub struct Geometry {
    id: ResourceId,
    handle: Option<GeometryHandle>,
    buffer: MeshBuffer,
}

impl Geometry {
    fn new(handle: GeometryHandle, buffer: MeshBuffer) -> Self {
        Self {
            id: handle.id(),
            handle: Some(handle),
            buffer,
        }
    }

    pub fn id(&self) -> ResourceId {
        self.id
    }

    pub fn buffer(&self) -> &MeshBuffer {
        &self.buffer
    }
}

#[derive(Debug)]
pub struct MeshNode {
    geometry: Geometry,
    transform: Transform,
}

impl MeshNode {
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }
}

/// Borrowed view of one scene node, for iteration.
#[derive(Debug, Copy, Clone)]
pub enum SceneNode<'a> {
    Mesh(&'a MeshNode),
    Ambient(&'a AmbientLight),
    Point(&'a PointLight),
}

/// Owner of everything drawn: one mesh node, its material and the two lights.
///
/// The node set is fixed at construction; only contents change. Geometry
/// swaps replace the handle in a single assignment, so a frame sees either the
/// old or the new buffer, never neither.
#[derive(Debug)]
pub struct SceneGraph {
    mesh: MeshNode,
    material: Material,
    lights: LightingRig,
    ledger: ResourceLedger,
    background: Rgb,
}

impl SceneGraph {
    /// Creates a scene holding an empty mesh, the default material and lights.
    pub fn new(lights: LightState) -> Self {
        let mut ledger = ResourceLedger::new();
        let handle = ledger.register_geometry();
        Self {
            mesh: MeshNode {
                geometry: Geometry::new(handle, MeshBuffer::empty()),
                transform: Transform::default(),
            },
            material: Material::default(),
            lights: LightingRig::new(lights),
            ledger,
            background: Rgb::from_hex(0x222222),
        }
    }

    /// Replaces both geometry and material; the transform is kept.
    pub fn attach_mesh(&mut self, buffer: MeshBuffer, material: Material) {
        self.replace_geometry(buffer);
        let mut previous = std::mem::replace(&mut self.material, material);
        previous.release(&mut self.ledger);
    }

    /// Swaps the mesh node's geometry, keeping material and transform.
    ///
    /// The previous geometry handle is released exactly once.
    pub fn replace_geometry(&mut self, buffer: MeshBuffer) {
        let handle = self.ledger.register_geometry();
        log::debug!(
            "geometry {} attached ({} vertices, {} faces)",
            handle.id().raw(),
            buffer.vertex_count(),
            buffer.face_count()
        );
        let previous = std::mem::replace(&mut self.mesh.geometry, Geometry::new(handle, buffer));
        if let Some(old) = previous.handle {
            self.ledger.release_geometry(old);
        }
    }

    /// Substitutes the empty mesh, e.g. after a failed build.
    pub fn clear_geometry(&mut self) {
        self.replace_geometry(MeshBuffer::empty());
    }

    pub fn set_lighting(&mut self, state: &LightState) -> bool {
        self.lights.apply(state)
    }

    pub fn mesh(&self) -> &MeshNode {
        &self.mesh
    }

    pub fn mesh_transform_mut(&mut self) -> &mut Transform {
        &mut self.mesh.transform
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn material_mut(&mut self) -> MaterialController<'_> {
        MaterialController::new(&mut self.material, &mut self.ledger)
    }

    pub fn lights(&self) -> &LightingRig {
        &self.lights
    }

    pub fn nodes(&self) -> impl Iterator<Item = SceneNode<'_>> {
        [
            SceneNode::Mesh(&self.mesh),
            SceneNode::Ambient(self.lights.ambient()),
            SceneNode::Point(self.lights.point()),
        ]
        .into_iter()
    }

    /// Clear color behind the mesh.
    pub fn background(&self) -> Rgb {
        self.background
    }

    pub fn set_background(&mut self, color: Rgb) {
        self.background = color.clamped();
    }

    pub fn resources(&self) -> &ResourceLedger {
        &self.ledger
    }

    pub(crate) fn resources_mut(&mut self) -> &mut ResourceLedger {
        &mut self.ledger
    }

    /// Releases geometry and texture handles for teardown.
    ///
    /// The node set stays intact (an empty mesh) so late readers never see a
    /// missing node.
    pub fn dispose(&mut self) {
        self.material.release(&mut self.ledger);
        if let Some(handle) = self.mesh.geometry.handle.take() {
            self.ledger.release_geometry(handle);
        }
        self.mesh.geometry.buffer = MeshBuffer::empty();
        self.ledger.release_all();
        log::debug!("scene resources released: {:?}", self.ledger.stats());
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new(LightState::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::GeometryBuilder;
    use crate::scene::resources::ResourceKind;

    const TRIANGLE: [f32; 9] = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];

    fn triangle() -> MeshBuffer {
        GeometryBuilder::new().build(&TRIANGLE, &[0, 1, 2]).unwrap()
    }

    fn mesh_nodes(scene: &SceneGraph) -> usize {
        scene
            .nodes()
            .filter(|n| matches!(n, SceneNode::Mesh(_)))
            .count()
    }

    #[test]
    fn new_scene_has_one_of_each_node() {
        let scene = SceneGraph::default();
        assert_eq!(scene.nodes().count(), 3);
        assert_eq!(mesh_nodes(&scene), 1);
        assert!(scene.mesh().geometry().buffer().is_empty());
    }

    #[test]
    fn replace_geometry_disposes_each_intermediate_once() {
        let mut scene = SceneGraph::default();
        scene.attach_mesh(triangle(), Material::default());
        let disposed_before = scene.resources().stats().geometries_disposed;

        let n = 5;
        let mut ids = Vec::new();
        for _ in 0..n {
            scene.replace_geometry(triangle());
            ids.push(scene.mesh().geometry().id());
            assert_eq!(mesh_nodes(&scene), 1);
        }

        let (last, intermediate) = ids.split_last().unwrap();
        assert_eq!(intermediate.len(), n - 1);
        assert!(intermediate.iter().all(|id| !scene.resources().is_live(*id)));
        assert!(scene.resources().is_live(*last));
        assert_eq!(scene.resources().live_count(ResourceKind::Geometry), 1);

        // The attached mesh plus n-1 intermediate replacements.
        let disposed = scene.resources().stats().geometries_disposed - disposed_before;
        assert_eq!(disposed, n as u64);
    }

    #[test]
    fn replace_geometry_keeps_material_and_transform() {
        let mut scene = SceneGraph::default();
        scene.attach_mesh(triangle(), Material::solid(Rgb::new(0.1, 0.2, 0.3), true));
        scene.mesh_transform_mut().rotation = Vec3::new(0.5, 1.0, 0.0);

        scene.replace_geometry(triangle());

        assert_eq!(scene.material().color(), Rgb::new(0.1, 0.2, 0.3));
        assert!(scene.material().wireframe());
        assert_eq!(scene.mesh().transform().rotation, Vec3::new(0.5, 1.0, 0.0));
    }

    #[test]
    fn failed_build_leaves_scene_untouched() {
        let mut scene = SceneGraph::default();
        scene.replace_geometry(triangle());
        let id = scene.mesh().geometry().id();

        let result = GeometryBuilder::new().build(&TRIANGLE, &[0, 1, 3]);
        assert!(result.is_err());

        assert_eq!(scene.mesh().geometry().id(), id);
        assert_eq!(scene.mesh().geometry().buffer().face_count(), 1);
    }

    #[test]
    fn dispose_releases_everything() {
        let mut scene = SceneGraph::default();
        scene.replace_geometry(triangle());
        scene.dispose();

        let res = scene.resources();
        assert_eq!(res.live_count(ResourceKind::Geometry), 0);
        assert_eq!(res.live_count(ResourceKind::Texture), 0);
        assert_eq!(mesh_nodes(&scene), 1);
    }

    #[test]
    fn replace_after_dispose_releases_nothing_twice() {
        let mut scene = SceneGraph::default();
        scene.replace_geometry(triangle());
        scene.dispose();
        let disposed = scene.resources().stats().geometries_disposed;
        scene.resources_mut().drain_released();

        scene.replace_geometry(triangle());

        assert_eq!(scene.resources().stats().geometries_disposed, disposed);
        assert!(scene.resources_mut().drain_released().is_empty());
        assert_eq!(scene.resources().live_count(ResourceKind::Geometry), 1);
    }
}
