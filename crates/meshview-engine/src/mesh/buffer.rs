use std::collections::HashSet;

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Triangle index storage.
///
/// The builder picks the narrowest width that can address every vertex.
#[derive(Debug, Clone, PartialEq)]
pub enum IndexData {
    U16(Vec<u16>),
    U32(Vec<u32>),
}

impl IndexData {
    pub fn len(&self) -> usize {
        match self {
            IndexData::U16(v) => v.len(),
            IndexData::U32(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, slot: usize) -> Option<u32> {
        match self {
            IndexData::U16(v) => v.get(slot).map(|&i| i as u32),
            IndexData::U32(v) => v.get(slot).copied(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        (0..self.len()).filter_map(move |slot| self.get(slot))
    }

    /// Index format matching the storage width.
    pub fn format(&self) -> wgpu::IndexFormat {
        match self {
            IndexData::U16(_) => wgpu::IndexFormat::Uint16,
            IndexData::U32(_) => wgpu::IndexFormat::Uint32,
        }
    }

    /// Raw bytes for upload.
    ///
    /// `u16` data with an odd element count is padded to a 4-byte multiple,
    /// which wgpu requires for buffer writes.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            IndexData::U16(v) => {
                let mut bytes = bytemuck::cast_slice::<u16, u8>(v).to_vec();
                bytes.resize(bytes.len().next_multiple_of(4), 0);
                bytes
            }
            IndexData::U32(v) => bytemuck::cast_slice::<u32, u8>(v).to_vec(),
        }
    }
}

impl Default for IndexData {
    fn default() -> Self {
        IndexData::U16(Vec::new())
    }
}

/// Axis-aligned bounds of a mesh.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds {
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn radius(&self) -> f32 {
        (self.max - self.min).length() * 0.5
    }
}

/// Interleaved vertex as consumed by the mesh pipeline.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl MeshVertex {
    const ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x3, // position
        1 => Float32x3, // normal
        2 => Float32x2  // uv
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MeshVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Validated, immutable triangle mesh.
///
/// Invariants (enforced by [`GeometryBuilder`](super::GeometryBuilder)):
/// - `positions.len() % 3 == 0`
/// - `indices.len() % 3 == 0`
/// - every index addresses an existing vertex
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshBuffer {
    positions: Vec<f32>,
    indices: IndexData,
    normals: Vec<f32>,
}

impl MeshBuffer {
    /// A mesh with no vertices and no faces. Used as the fallback geometry.
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn from_validated(positions: Vec<f32>, indices: IndexData) -> Self {
        let normals = compute_normals(&positions, &indices);
        Self {
            positions,
            indices,
            normals,
        }
    }

    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    pub fn indices(&self) -> &IndexData {
        &self.indices
    }

    /// Per-vertex normals, flat `xyz` triples parallel to `positions`.
    pub fn normals(&self) -> &[f32] {
        &self.normals
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn face_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// True when there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.face_count() == 0
    }

    pub fn position(&self, vertex: usize) -> Option<Vec3> {
        let p = self.positions.get(vertex * 3..vertex * 3 + 3)?;
        Some(Vec3::new(p[0], p[1], p[2]))
    }

    pub fn bounds(&self) -> Option<Bounds> {
        let mut iter = (0..self.vertex_count()).filter_map(|v| self.position(v));
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        Some(Bounds { min, max })
    }

    /// Builds interleaved vertices with spherical UVs around the bounds center.
    pub fn vertices(&self) -> Vec<MeshVertex> {
        let center = self.bounds().map_or(Vec3::ZERO, |b| b.center());

        (0..self.vertex_count())
            .filter_map(|v| {
                let p = self.position(v)?;
                let n = &self.normals[v * 3..v * 3 + 3];
                Some(MeshVertex {
                    position: p.to_array(),
                    normal: [n[0], n[1], n[2]],
                    uv: spherical_uv(p - center),
                })
            })
            .collect()
    }

    /// Unique triangle edges as a line list (pairs of vertex indices).
    pub fn edge_indices(&self) -> Vec<u32> {
        let mut seen = HashSet::new();
        let mut edges = Vec::new();

        let tris: Vec<u32> = self.indices.iter().collect();
        for tri in tris.chunks_exact(3) {
            for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
                let key = (a.min(b), a.max(b));
                if seen.insert(key) {
                    edges.push(a);
                    edges.push(b);
                }
            }
        }

        edges
    }
}

fn spherical_uv(dir: Vec3) -> [f32; 2] {
    let len = dir.length();
    if len <= f32::EPSILON {
        return [0.5, 0.5];
    }
    let d = dir / len;
    let u = 0.5 + d.z.atan2(d.x) / std::f32::consts::TAU;
    let v = d.y.clamp(-1.0, 1.0).acos() / std::f32::consts::PI;
    [u, v]
}

/// Area-weighted vertex normals. Vertices not referenced by any face get +Z.
fn compute_normals(positions: &[f32], indices: &IndexData) -> Vec<f32> {
    let vertex_count = positions.len() / 3;
    let mut acc = vec![Vec3::ZERO; vertex_count];
    let at = |i: u32| {
        let i = i as usize * 3;
        Vec3::new(positions[i], positions[i + 1], positions[i + 2])
    };

    let tris: Vec<u32> = indices.iter().collect();
    for tri in tris.chunks_exact(3) {
        let (a, b, c) = (at(tri[0]), at(tri[1]), at(tri[2]));
        // Unnormalized cross product weights by triangle area.
        let n = (b - a).cross(c - a);
        for &i in tri {
            acc[i as usize] += n;
        }
    }

    acc.into_iter()
        .flat_map(|n| n.try_normalize().unwrap_or(Vec3::Z).to_array())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> MeshBuffer {
        MeshBuffer::from_validated(
            vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            IndexData::U16(vec![0, 1, 2]),
        )
    }

    #[test]
    fn normals_face_the_winding_direction() {
        let mesh = triangle();
        assert_eq!(mesh.normals(), &[0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn shared_edges_are_emitted_once() {
        let quad = MeshBuffer::from_validated(
            vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0],
            IndexData::U16(vec![0, 1, 2, 0, 2, 3]),
        );
        // 4 outer edges + 1 diagonal.
        assert_eq!(quad.edge_indices().len(), 5 * 2);
    }

    #[test]
    fn bounds_cover_all_vertices() {
        let b = triangle().bounds().unwrap();
        assert_eq!(b.min, Vec3::ZERO);
        assert_eq!(b.max, Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn empty_mesh_has_no_bounds() {
        assert!(MeshBuffer::empty().bounds().is_none());
        assert!(MeshBuffer::empty().is_empty());
    }

    #[test]
    fn u16_bytes_are_padded_to_four() {
        let idx = IndexData::U16(vec![0, 1, 2]);
        assert_eq!(idx.to_bytes().len(), 8);
    }
}
