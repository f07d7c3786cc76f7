use crate::grass::GrassField;
use crate::renderer::RenderView;
use glam::{Mat4, Vec3};
use meadow_common::Transform;

/// The static meshes a frame can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MeshKind {
    Floor,
    PlayerCube,
    GrassBlade,
}

impl MeshKind {
    pub const ALL: [MeshKind; 3] = [MeshKind::Floor, MeshKind::PlayerCube, MeshKind::GrassBlade];
}

/// One (model transform, mesh) pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawItem {
    pub mesh: MeshKind,
    pub transform: Transform,
}

impl DrawItem {
    pub fn model(&self) -> Mat4 {
        self.transform.matrix()
    }
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone)]
pub struct SceneFrame {
    pub frame: u64,
    pub view: RenderView,
    items: Vec<DrawItem>,
}

impl SceneFrame {
    /// Floor at the origin, the player cube at `player_position`, then every
    /// grass quad.
    pub fn compose(frame: u64, view: RenderView, player_position: Vec3, grass: &GrassField) -> Self {
        let mut items = Vec::with_capacity(2 + grass.len() * 2);
        items.push(DrawItem {
            mesh: MeshKind::Floor,
            transform: Transform::default(),
        });
        items.push(DrawItem {
            mesh: MeshKind::PlayerCube,
            transform: Transform::from_position(player_position),
        });
        items.extend(grass.transforms().map(|transform| DrawItem {
            mesh: MeshKind::GrassBlade,
            transform,
        }));
        Self { frame, view, items }
    }

    pub fn items(&self) -> &[DrawItem] {
        &self.items
    }

    pub fn of_kind(&self, mesh: MeshKind) -> impl Iterator<Item = &DrawItem> {
        self.items.iter().filter(move |item| item.mesh == mesh)
    }

    pub fn count(&self, mesh: MeshKind) -> usize {
        self.of_kind(mesh).count()
    }

    pub fn player_position(&self) -> Option<Vec3> {
        self.of_kind(MeshKind::PlayerCube)
            .next()
            .map(|item| item.transform.position)
    }
}
