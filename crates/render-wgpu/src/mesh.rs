use bytemuck::{Pod, Zeroable};

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub(crate) struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub(crate) struct SkyVertex {
    pub position: [f32; 3],
}

/// Texture repeats across the ground quad.
pub(crate) const GROUND_UV_REPEAT: f32 = 50.0;

fn quad(corners: [[f32; 3]; 4], normal: [f32; 3]) -> [Vertex; 4] {
    // Counter-clockwise from bottom-left; texture rows run top to bottom.
    const UVS: [[f32; 2]; 4] = [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]];
    let mut out = [Vertex::zeroed(); 4];
    for (i, v) in out.iter_mut().enumerate() {
        *v = Vertex {
            position: corners[i],
            normal,
            uv: UVS[i],
        };
    }
    out
}

/// Unit cube (half-extent 0.5) with per-face normals and UVs.
pub(crate) fn cube_mesh() -> (Vec<Vertex>, Vec<u16>) {
    let p = 0.5_f32;
    #[rustfmt::skip]
    let faces = [
        // +Z
        quad([[-p, -p,  p], [ p, -p,  p], [ p,  p,  p], [-p,  p,  p]], [0.0, 0.0, 1.0]),
        // -Z
        quad([[ p, -p, -p], [-p, -p, -p], [-p,  p, -p], [ p,  p, -p]], [0.0, 0.0, -1.0]),
        // +X
        quad([[ p, -p,  p], [ p, -p, -p], [ p,  p, -p], [ p,  p,  p]], [1.0, 0.0, 0.0]),
        // -X
        quad([[-p, -p, -p], [-p, -p,  p], [-p,  p,  p], [-p,  p, -p]], [-1.0, 0.0, 0.0]),
        // +Y
        quad([[-p,  p,  p], [ p,  p,  p], [ p,  p, -p], [-p,  p, -p]], [0.0, 1.0, 0.0]),
        // -Y
        quad([[-p, -p, -p], [ p, -p, -p], [ p, -p,  p], [-p, -p,  p]], [0.0, -1.0, 0.0]),
    ];
    let vertices: Vec<Vertex> = faces.iter().flatten().copied().collect();
    let indices = (0..6u16)
        .flat_map(|f| {
            let b = f * 4;
            [b, b + 1, b + 2, b + 2, b + 3, b]
        })
        .collect();
    (vertices, indices)
}

/// Ground quad spanning -1..1 on X and Z at y = 0, facing up.
pub(crate) fn ground_mesh() -> (Vec<Vertex>, Vec<u16>) {
    let r = GROUND_UV_REPEAT;
    let mut vertices = quad(
        [
            [-1.0, 0.0, 1.0],
            [1.0, 0.0, 1.0],
            [1.0, 0.0, -1.0],
            [-1.0, 0.0, -1.0],
        ],
        [0.0, 1.0, 0.0],
    );
    for v in &mut vertices {
        v.uv = [v.uv[0] * r, v.uv[1] * r];
    }
    (vertices.to_vec(), vec![0, 1, 2, 2, 3, 0])
}

/// Cube of half-extent 1 seen from the inside; winding is irrelevant since
/// the sky pipeline does not cull.
pub(crate) fn sky_mesh() -> (Vec<SkyVertex>, Vec<u16>) {
    let vertices = (0..8)
        .map(|i| SkyVertex {
            position: [
                if i & 1 == 0 { -1.0 } else { 1.0 },
                if i & 2 == 0 { -1.0 } else { 1.0 },
                if i & 4 == 0 { -1.0 } else { 1.0 },
            ],
        })
        .collect();
    #[rustfmt::skip]
    let indices = vec![
        0, 1, 3, 3, 2, 0, // -Z
        4, 6, 7, 7, 5, 4, // +Z
        0, 2, 6, 6, 4, 0, // -X
        1, 5, 7, 7, 3, 1, // +X
        0, 4, 5, 5, 1, 0, // -Y
        2, 3, 7, 7, 6, 2, // +Y
    ];
    (vertices, indices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cubescene_math::Vector3;

    fn winding_matches_normals(vertices: &[Vertex], indices: &[u16]) -> bool {
        indices.chunks(3).all(|tri| {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| vertices[i as usize]);
            let pa = Vector3::from(a.position);
            let n = (Vector3::from(b.position) - pa).cross(Vector3::from(c.position) - pa);
            n.dot(Vector3::from(a.normal)) > 0.0
        })
    }

    #[test]
    fn cube_has_six_counter_clockwise_faces() {
        let (vertices, indices) = cube_mesh();
        assert_eq!(vertices.len(), 24);
        assert_eq!(indices.len(), 36);
        assert!(winding_matches_normals(&vertices, &indices));
        assert!(
            vertices
                .iter()
                .all(|v| v.position.iter().all(|c| c.abs() == 0.5))
        );
    }

    #[test]
    fn ground_faces_up_with_tiled_uvs() {
        let (vertices, indices) = ground_mesh();
        assert!(winding_matches_normals(&vertices, &indices));
        let max_uv = vertices
            .iter()
            .flat_map(|v| v.uv)
            .fold(0.0_f32, f32::max);
        assert_eq!(max_uv, GROUND_UV_REPEAT);
    }

    #[test]
    fn sky_cube_indices_cover_all_corners() {
        let (vertices, indices) = sky_mesh();
        assert_eq!(vertices.len(), 8);
        assert_eq!(indices.len(), 36);
        assert!(indices.iter().all(|&i| (i as usize) < vertices.len()));
    }
}
