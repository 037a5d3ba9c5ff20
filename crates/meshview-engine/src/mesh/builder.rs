use super::buffer::{IndexData, MeshBuffer};

/// Largest vertex count addressable with 16-bit indices.
const U16_VERTEX_LIMIT: usize = u16::MAX as usize + 1;

/// Which invariant a [`GeometryError`] violated.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum GeometryFault {
    /// An array length is not a multiple of 3.
    Alignment,
    /// An index does not address a vertex, or does not fit the index type.
    Bounds,
    /// A position component is NaN or infinite.
    Value,
}

/// Construction error for [`MeshBuffer`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    #[error("position array length {len} is not a multiple of 3")]
    PositionAlignment { len: usize },

    #[error("index array length {len} is not a multiple of 3")]
    IndexAlignment { len: usize },

    #[error("index {value} at slot {slot} is out of bounds for {vertex_count} vertices")]
    IndexOutOfBounds {
        slot: usize,
        value: u32,
        vertex_count: usize,
    },

    #[error("index {value} at slot {slot} is not a valid 32-bit vertex index")]
    IndexWidth { slot: usize, value: i64 },

    #[error("position component {slot} is not finite")]
    NonFinitePosition { slot: usize },
}

impl GeometryError {
    pub fn fault(&self) -> GeometryFault {
        match self {
            GeometryError::PositionAlignment { .. } | GeometryError::IndexAlignment { .. } => {
                GeometryFault::Alignment
            }
            GeometryError::IndexOutOfBounds { .. } | GeometryError::IndexWidth { .. } => {
                GeometryFault::Bounds
            }
            GeometryError::NonFinitePosition { .. } => GeometryFault::Value,
        }
    }
}

/// Converts flat position/index arrays into a [`MeshBuffer`].
///
/// Validation happens before any allocation of the output, so a failed build
/// has no side effects.
#[derive(Debug, Copy, Clone)]
pub struct GeometryBuilder {
    /// Store indices as `u16` whenever every vertex is addressable that way.
    pub prefer_u16: bool,
}

impl Default for GeometryBuilder {
    fn default() -> Self {
        Self { prefer_u16: true }
    }
}

impl GeometryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build(&self, positions: &[f32], indices: &[u32]) -> Result<MeshBuffer, GeometryError> {
        let vertex_count = validate_positions(positions)?;

        if indices.len() % 3 != 0 {
            return Err(GeometryError::IndexAlignment { len: indices.len() });
        }

        if let Some((slot, &value)) = indices
            .iter()
            .enumerate()
            .find(|(_, i)| **i as usize >= vertex_count)
        {
            return Err(GeometryError::IndexOutOfBounds {
                slot,
                value,
                vertex_count,
            });
        }

        let indices = if self.prefer_u16 && vertex_count <= U16_VERTEX_LIMIT {
            // Every index is < vertex_count <= 65536, so the cast is lossless.
            IndexData::U16(indices.iter().map(|&i| i as u16).collect())
        } else {
            IndexData::U32(indices.to_vec())
        };

        Ok(MeshBuffer::from_validated(positions.to_vec(), indices))
    }

    /// Like [`build`](Self::build) but accepts signed, wide indices as they
    /// arrive from JSON. Negative or > `u32::MAX` values are rejected.
    pub fn build_wide(
        &self,
        positions: &[f32],
        indices: &[i64],
    ) -> Result<MeshBuffer, GeometryError> {
        let narrowed = indices
            .iter()
            .enumerate()
            .map(|(slot, &value)| {
                u32::try_from(value).map_err(|_| GeometryError::IndexWidth { slot, value })
            })
            .collect::<Result<Vec<u32>, _>>()?;

        self.build(positions, &narrowed)
    }
}

fn validate_positions(positions: &[f32]) -> Result<usize, GeometryError> {
    if positions.len() % 3 != 0 {
        return Err(GeometryError::PositionAlignment { len: positions.len() });
    }
    if let Some(slot) = positions.iter().position(|p| !p.is_finite()) {
        return Err(GeometryError::NonFinitePosition { slot });
    }
    Ok(positions.len() / 3)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIANGLE: [f32; 9] = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];

    #[test]
    fn counts_follow_array_lengths() {
        let mesh = GeometryBuilder::new().build(&TRIANGLE, &[0, 1, 2]).unwrap();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.face_count(), 1);
    }

    #[test]
    fn quad_has_two_faces() {
        let positions = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0];
        let mesh = GeometryBuilder::new()
            .build(&positions, &[0, 1, 2, 0, 2, 3])
            .unwrap();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.face_count(), 2);
    }

    #[test]
    fn out_of_range_index_is_a_bounds_fault() {
        let err = GeometryBuilder::new().build(&TRIANGLE, &[0, 1, 5]).unwrap_err();
        assert_eq!(
            err,
            GeometryError::IndexOutOfBounds {
                slot: 2,
                value: 5,
                vertex_count: 3
            }
        );
        assert_eq!(err.fault(), GeometryFault::Bounds);
    }

    #[test]
    fn index_equal_to_vertex_count_is_rejected() {
        let err = GeometryBuilder::new().build(&TRIANGLE, &[0, 1, 3]).unwrap_err();
        assert_eq!(err.fault(), GeometryFault::Bounds);
    }

    #[test]
    fn misaligned_arrays_are_alignment_faults() {
        let b = GeometryBuilder::new();
        let err = b.build(&TRIANGLE[..8], &[]).unwrap_err();
        assert_eq!(err, GeometryError::PositionAlignment { len: 8 });
        assert_eq!(err.fault(), GeometryFault::Alignment);

        let err = b.build(&TRIANGLE, &[0, 1]).unwrap_err();
        assert_eq!(err, GeometryError::IndexAlignment { len: 2 });
        assert_eq!(err.fault(), GeometryFault::Alignment);
    }

    #[test]
    fn nan_positions_are_rejected() {
        let mut positions = TRIANGLE;
        positions[4] = f32::NAN;
        let err = GeometryBuilder::new().build(&positions, &[0, 1, 2]).unwrap_err();
        assert_eq!(err, GeometryError::NonFinitePosition { slot: 4 });
    }

    #[test]
    fn negative_wide_index_is_a_width_error() {
        let err = GeometryBuilder::new()
            .build_wide(&TRIANGLE, &[0, -1, 2])
            .unwrap_err();
        assert_eq!(err, GeometryError::IndexWidth { slot: 1, value: -1 });
    }

    #[test]
    fn small_meshes_use_u16_indices() {
        let mesh = GeometryBuilder::new().build(&TRIANGLE, &[0, 1, 2]).unwrap();
        assert!(matches!(mesh.indices(), IndexData::U16(_)));

        let wide = GeometryBuilder { prefer_u16: false }
            .build(&TRIANGLE, &[0, 1, 2])
            .unwrap();
        assert!(matches!(wide.indices(), IndexData::U32(_)));
    }

    #[test]
    fn large_meshes_switch_to_u32_indices() {
        let vertex_count = U16_VERTEX_LIMIT + 1;
        let positions = vec![0.0f32; vertex_count * 3];
        let last = (vertex_count - 1) as u32;
        let mesh = GeometryBuilder::new()
            .build(&positions, &[0, 1, last])
            .unwrap();
        assert!(matches!(mesh.indices(), IndexData::U32(_)));
        assert_eq!(mesh.indices().get(2), Some(last));
    }

    #[test]
    fn empty_input_builds_empty_mesh() {
        let mesh = GeometryBuilder::new().build(&[], &[]).unwrap();
        assert!(mesh.is_empty());
        assert_eq!(mesh.vertex_count(), 0);
    }
}
