use glam::Vec3;

use crate::assets::LoadOutcome;
use super::mesh::Mesh;
use super::ray::{self, Aabb, RayHit};

/// Anything the movement resolver can probe with rays
pub trait CollisionWorld {
    /// Nearest hit along `dir` within `max_distance`, if any
    fn raycast(&self, origin: Vec3, dir: Vec3, max_distance: f32) -> Option<RayHit>;

    /// Whether any geometry is present to collide with
    fn has_geometry(&self) -> bool;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneStatus {
    Loading { loaded: usize, expected: usize },
    Ready,
    /// Every load finished but some failed
    Degraded { failed: Vec<String> },
}

impl SceneStatus {
    pub fn is_settled(&self) -> bool {
        !matches!(self, SceneStatus::Loading { .. })
    }
}

pub struct SceneModel {
    pub name: String,
    pub mesh: Mesh,
    pub bounds: Aabb,
}

/// Loaded models plus load bookkeeping
pub struct Scene {
    pub models: Vec<SceneModel>,
    expected: usize,
    failed: Vec<String>,
}

impl Scene {
    pub fn new(expected: usize) -> Self {
        Self {
            models: Vec::new(),
            expected,
            failed: Vec::new(),
        }
    }

    /// Record a finished load. Returns the inserted model on success.
    pub fn insert(&mut self, outcome: LoadOutcome) -> Option<&SceneModel> {
        match outcome.result {
            Ok(mesh) => {
                tracing::info!(
                    model = %outcome.name,
                    vertices = mesh.vertices.len(),
                    triangles = mesh.triangle_count(),
                    "model loaded"
                );
                let bounds = mesh.bounds();
                self.models.push(SceneModel { name: outcome.name, mesh, bounds });
                self.log_if_settled();
                self.models.last()
            }
            Err(e) => {
                tracing::warn!(model = %outcome.name, error = %e, "model failed to load");
                self.failed.push(outcome.name);
                self.log_if_settled();
                None
            }
        }
    }

    pub fn status(&self) -> SceneStatus {
        let finished = self.models.len() + self.failed.len();
        if finished < self.expected {
            SceneStatus::Loading { loaded: finished, expected: self.expected }
        } else if self.failed.is_empty() {
            SceneStatus::Ready
        } else {
            SceneStatus::Degraded { failed: self.failed.clone() }
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.models.iter().map(|m| m.mesh.triangle_count()).sum()
    }

    fn log_if_settled(&self) {
        match self.status() {
            SceneStatus::Ready => tracing::info!(models = self.models.len(), "scene ready"),
            SceneStatus::Degraded { failed } => {
                tracing::warn!(?failed, models = self.models.len(), "scene settled with missing models")
            }
            SceneStatus::Loading { .. } => {}
        }
    }
}

impl CollisionWorld for Scene {
    fn raycast(&self, origin: Vec3, dir: Vec3, max_distance: f32) -> Option<RayHit> {
        let dir = dir.normalize_or_zero();
        if dir == Vec3::ZERO {
            return None;
        }

        let mut best: Option<(f32, [Vec3; 3])> = None;
        for model in &self.models {
            let reach = best.map_or(max_distance, |(t, _)| t);
            if model.bounds.ray_entry(origin, dir, reach).is_none() {
                continue;
            }
            for tri in model.mesh.triangles() {
                let reach = best.map_or(max_distance, |(t, _)| t);
                if let Some(t) = ray::ray_triangle(origin, dir, tri, reach) {
                    best = Some((t, tri));
                }
            }
        }

        best.map(|(distance, tri)| RayHit {
            distance,
            point: origin + dir * distance,
            normal: ray::facing_normal(tri, dir),
        })
    }

    fn has_geometry(&self) -> bool {
        !self.models.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::AssetError;
    use crate::model::mesh::quad;

    fn wall_at_x(x: f32) -> Mesh {
        quad([
            Vec3::new(x, -1.0, -1.0),
            Vec3::new(x, -1.0, 1.0),
            Vec3::new(x, 1.0, 1.0),
            Vec3::new(x, 1.0, -1.0),
        ])
    }

    fn loaded(name: &str, mesh: Mesh) -> LoadOutcome {
        LoadOutcome { name: name.to_string(), result: Ok(mesh) }
    }

    #[test]
    fn status_moves_from_loading_to_ready() {
        let mut scene = Scene::new(2);
        assert_eq!(scene.status(), SceneStatus::Loading { loaded: 0, expected: 2 });

        scene.insert(loaded("a", wall_at_x(1.0)));
        assert_eq!(scene.status(), SceneStatus::Loading { loaded: 1, expected: 2 });

        scene.insert(loaded("b", wall_at_x(2.0)));
        assert_eq!(scene.status(), SceneStatus::Ready);
        assert_eq!(scene.triangle_count(), 4);
    }

    #[test]
    fn failed_load_settles_as_degraded() {
        let mut scene = Scene::new(2);
        scene.insert(loaded("room", wall_at_x(1.0)));
        let inserted = scene.insert(LoadOutcome {
            name: "statue".to_string(),
            result: Err(AssetError::NoGeometry("statue.gltf".to_string())),
        });

        assert!(inserted.is_none());
        assert!(scene.status().is_settled());
        assert_eq!(scene.status(), SceneStatus::Degraded { failed: vec!["statue".to_string()] });
    }

    #[test]
    fn empty_scene_never_hits() {
        let scene = Scene::new(2);
        assert!(!scene.has_geometry());
        assert!(scene.raycast(Vec3::ZERO, Vec3::X, 100.0).is_none());
    }

    #[test]
    fn raycast_reports_nearest_wall_with_facing_normal() {
        let mut scene = Scene::new(2);
        scene.insert(loaded("far", wall_at_x(3.0)));
        scene.insert(loaded("near", wall_at_x(1.0)));

        let origin = Vec3::new(0.0, 0.25, 0.1);
        let hit = scene.raycast(origin, Vec3::X, 10.0).unwrap();
        assert!((hit.distance - 1.0).abs() < 1e-5);
        assert!((hit.point - Vec3::new(1.0, 0.25, 0.1)).length() < 1e-5);
        assert_eq!(hit.normal, -Vec3::X);
    }

    #[test]
    fn raycast_respects_max_distance_and_direction_length() {
        let mut scene = Scene::new(1);
        scene.insert(loaded("wall", wall_at_x(1.0)));

        let origin = Vec3::new(0.0, 0.25, 0.1);
        assert!(scene.raycast(origin, Vec3::X, 0.5).is_none());
        assert!(scene.raycast(origin, Vec3::ZERO, 10.0).is_none());
        // Direction length does not scale the reach
        assert!(scene.raycast(origin, Vec3::X * 0.03, 1.5).is_some());
    }
}
