use crate::scene::MeshKind;

/// Position plus flat RGB colour; the only vertex format the scene uses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

const fn v(position: [f32; 3], color: [f32; 3]) -> MeshVertex {
    MeshVertex { position, color }
}

/// Indexed triangle list in model space.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u16>,
}

impl MeshData {
    pub fn for_kind(kind: MeshKind) -> Self {
        match kind {
            MeshKind::Floor => floor(),
            MeshKind::PlayerCube => cube(),
            MeshKind::GrassBlade => grass_blade(),
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Half the floor's side length.
pub(crate) const FLOOR_HALF_EXTENT: f32 = 10.0;

fn floor() -> MeshData {
    let e = FLOOR_HALF_EXTENT;
    let grey = [0.5, 0.5, 0.5];
    MeshData {
        vertices: vec![
            v([-e, 0.0, -e], grey),
            v([e, 0.0, -e], grey),
            v([e, 0.0, e], grey),
            v([-e, 0.0, e], grey),
        ],
        indices: vec![0, 1, 2, 2, 3, 0],
    }
}

/// Unit cube centred on the origin, one colour per face.
fn cube() -> MeshData {
    let p = 0.5_f32;
    let red = [1.0, 0.0, 0.0];
    let green = [0.0, 1.0, 0.0];
    let blue = [0.0, 0.0, 1.0];
    let yellow = [1.0, 1.0, 0.0];
    let magenta = [1.0, 0.0, 1.0];
    let cyan = [0.0, 1.0, 1.0];
    #[rustfmt::skip]
    let vertices = vec![
        // -Z
        v([-p, -p, -p], red), v([ p, -p, -p], red), v([ p,  p, -p], red), v([-p,  p, -p], red),
        // +Z
        v([-p, -p,  p], green), v([ p, -p,  p], green), v([ p,  p,  p], green), v([-p,  p,  p], green),
        // -X
        v([-p,  p,  p], blue), v([-p,  p, -p], blue), v([-p, -p, -p], blue), v([-p, -p,  p], blue),
        // +X
        v([ p,  p,  p], yellow), v([ p,  p, -p], yellow), v([ p, -p, -p], yellow), v([ p, -p,  p], yellow),
        // -Y
        v([-p, -p, -p], magenta), v([ p, -p, -p], magenta), v([ p, -p,  p], magenta), v([-p, -p,  p], magenta),
        // +Y
        v([-p,  p, -p], cyan), v([ p,  p, -p], cyan), v([ p,  p,  p], cyan), v([-p,  p,  p], cyan),
    ];
    let mut indices = Vec::with_capacity(36);
    for face in 0..6u16 {
        let b = face * 4;
        indices.extend_from_slice(&[b, b + 1, b + 2, b + 2, b + 3, b]);
    }
    MeshData { vertices, indices }
}

/// Half the width of one grass quad.
const BLADE_HALF_WIDTH: f32 = 0.02;

/// Unit-height quad in the XY plane; blade height comes from the instance
/// scale.
fn grass_blade() -> MeshData {
    let w = BLADE_HALF_WIDTH;
    let root = [0.0, 0.5, 0.0];
    let tip = [0.5, 1.0, 0.0];
    MeshData {
        vertices: vec![
            v([-w, 0.0, 0.0], root),
            v([w, 0.0, 0.0], root),
            v([w, 1.0, 0.0], tip),
            v([-w, 1.0, 0.0], tip),
        ],
        indices: vec![0, 1, 2, 2, 3, 0],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_stay_in_range() {
        for kind in MeshKind::ALL {
            let mesh = MeshData::for_kind(kind);
            assert_eq!(mesh.indices.len() % 3, 0);
            assert!(
                mesh.indices
                    .iter()
                    .all(|i| (*i as usize) < mesh.vertices.len()),
                "{kind:?} has an out-of-range index"
            );
        }
    }

    #[test]
    fn cube_is_unit_sized_with_six_colours() {
        let cube = MeshData::for_kind(MeshKind::PlayerCube);
        assert_eq!(cube.triangle_count(), 12);
        for axis in 0..3 {
            let min = cube.vertices.iter().map(|v| v.position[axis]).fold(f32::MAX, f32::min);
            let max = cube.vertices.iter().map(|v| v.position[axis]).fold(f32::MIN, f32::max);
            assert_eq!(max - min, 1.0);
        }
        let mut colours: Vec<[f32; 3]> = cube.vertices.iter().map(|v| v.color).collect();
        colours.dedup();
        assert_eq!(colours.len(), 6);
    }

    #[test]
    fn floor_spans_twenty_units_at_zero_height() {
        let floor = MeshData::for_kind(MeshKind::Floor);
        assert!(floor.vertices.iter().all(|v| v.position[1] == 0.0));
        assert!(floor.vertices.iter().all(|v| v.position[0].abs() == 10.0));
        assert_eq!(floor.triangle_count(), 2);
    }

    #[test]
    fn grass_blade_shades_root_to_tip() {
        let blade = MeshData::for_kind(MeshKind::GrassBlade);
        for v in &blade.vertices {
            let expected = if v.position[1] == 0.0 { [0.0, 0.5, 0.0] } else { [0.5, 1.0, 0.0] };
            assert_eq!(v.color, expected);
        }
    }
}
