use glam::{Quat, Vec3};

use crate::config::WalkConfig;
use crate::controller::input::{InputProcessor, InputState};
use crate::model::{CameraRig, CollisionWorld};

/// Per-frame WASD movement with ray-probe collision avoidance.
///
/// X is resolved first, then Z, each probed from the current eye over
/// `collision_distance` in the direction the movement takes along that axis.
/// A clear probe commits the axis' component. A blocked probe slides instead:
/// the movement still pending is projected onto the hit surface's plane and
/// the whole projection is added to the position. The result runs parallel to
/// the wall, so a wall met head-on stops the axis and an oblique wall deflects
/// along it without ever closing the gap.
///
/// A downward probe from the eye keeps the rig from sinking below
/// `floor_height` while something is underneath.
pub struct MovementResolver {
    pub move_speed: f32,
    pub collision_distance: f32,
    pub ground_probe_distance: f32,
    pub floor_height: f32,
    processor: InputProcessor,
}

impl MovementResolver {
    pub fn new(config: &WalkConfig) -> Self {
        Self {
            move_speed: config.move_speed,
            collision_distance: config.collision_distance,
            ground_probe_distance: config.ground_probe_distance,
            floor_height: config.floor_height,
            processor: InputProcessor::default(),
        }
    }

    /// Movement in the rig's local frame from the pressed keys
    pub fn local_movement(&self, input: &InputState) -> Vec3 {
        let mut movement = Vec3::ZERO;
        if self.processor.is_moving_forward(input) {
            movement.z -= self.move_speed;
        }
        if self.processor.is_moving_backward(input) {
            movement.z += self.move_speed;
        }
        if self.processor.is_moving_left(input) {
            movement.x -= self.move_speed;
        }
        if self.processor.is_moving_right(input) {
            movement.x += self.move_speed;
        }
        movement
    }

    /// Rotate a local movement into world space by the rig's yaw
    pub fn world_movement(&self, local: Vec3, yaw: f32) -> Vec3 {
        Quat::from_rotation_y(yaw) * local
    }

    /// Advance the rig by one frame. Returns the applied position delta.
    pub fn update<W: CollisionWorld + ?Sized>(&self, rig: &mut CameraRig, input: &InputState, world: &W) -> Vec3 {
        let start = rig.position;
        let movement = self.world_movement(self.local_movement(input), rig.yaw);
        if movement != Vec3::ZERO && !world.has_geometry() {
            tracing::trace!("no collision geometry, moving unconstrained");
        }

        // Z still to apply once X is settled; a slide on X already carries its own Z
        let mut pending_z = movement.z;
        if movement.x != 0.0 {
            match self.probe(world, rig.eye(), Vec3::X * movement.x.signum()) {
                None => rig.position.x += movement.x,
                Some(normal) => {
                    let slide = slide_along(movement, normal);
                    tracing::trace!(axis = "x", ?slide, "probe blocked, sliding");
                    rig.position.x += slide.x;
                    pending_z = slide.z;
                }
            }
        }

        if pending_z != 0.0 {
            match self.probe(world, rig.eye(), Vec3::Z * pending_z.signum()) {
                None => rig.position.z += pending_z,
                Some(normal) => {
                    let slide = slide_along(Vec3::new(0.0, 0.0, pending_z), normal);
                    tracing::trace!(axis = "z", ?slide, "probe blocked, sliding");
                    rig.position.x += slide.x;
                    rig.position.z += slide.z;
                }
            }
        }

        if world
            .raycast(rig.eye(), Vec3::NEG_Y, self.ground_probe_distance)
            .is_some()
        {
            rig.position.y = rig.position.y.max(self.floor_height);
        }

        rig.position - start
    }

    /// Normal of the surface within `collision_distance` along `dir`, if any
    fn probe<W: CollisionWorld + ?Sized>(&self, world: &W, eye: Vec3, dir: Vec3) -> Option<Vec3> {
        world
            .raycast(eye, dir, self.collision_distance)
            .map(|hit| hit.normal)
    }
}

/// `movement` with its component along `normal` removed
fn slide_along(movement: Vec3, normal: Vec3) -> Vec3 {
    movement - normal * movement.dot(normal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::LoadOutcome;
    use crate::controller::input::InputEvent;
    use crate::model::mesh::quad;
    use crate::model::{RayHit, Scene};

    /// Infinite planes `dot(p, normal) == offset`, normals facing the walker
    struct Planes(Vec<(Vec3, f32)>);

    impl CollisionWorld for Planes {
        fn raycast(&self, origin: Vec3, dir: Vec3, max_distance: f32) -> Option<RayHit> {
            let dir = dir.normalize_or_zero();
            self.0
                .iter()
                .filter_map(|&(normal, offset)| {
                    let denom = dir.dot(normal);
                    if denom.abs() < 1e-6 {
                        return None;
                    }
                    let t = (offset - origin.dot(normal)) / denom;
                    (0.0..=max_distance).contains(&t).then(|| RayHit {
                        distance: t,
                        point: origin + dir * t,
                        normal: if denom > 0.0 { -normal } else { normal },
                    })
                })
                .min_by(|a, b| a.distance.total_cmp(&b.distance))
        }

        fn has_geometry(&self) -> bool {
            !self.0.is_empty()
        }
    }

    fn setup() -> (MovementResolver, CameraRig, InputState) {
        let config = WalkConfig::default();
        (MovementResolver::new(&config), CameraRig::new(&config, 800, 600), InputState::new())
    }

    fn press(input: &mut InputState, keys: &[&str]) {
        for key in keys {
            input.process_event(&InputEvent::KeyDown(key.to_string()));
        }
    }

    #[test]
    fn no_keys_means_no_movement() {
        let (resolver, mut rig, input) = setup();
        let empty = Planes(vec![]);
        rig.yaw = 1.3;
        for _ in 0..500 {
            assert_eq!(resolver.update(&mut rig, &input, &empty), Vec3::ZERO);
        }
        assert_eq!(rig.position, Vec3::ZERO);
    }

    #[test]
    fn forward_and_back_cancel() {
        let (resolver, mut rig, mut input) = setup();
        press(&mut input, &["w", "s"]);
        assert_eq!(resolver.local_movement(&input).z, 0.0);
        assert_eq!(resolver.update(&mut rig, &input, &Planes(vec![])), Vec3::ZERO);
    }

    #[test]
    fn local_axes_follow_keys() {
        let (resolver, _, mut input) = setup();
        press(&mut input, &["W", "d"]);
        assert_eq!(resolver.local_movement(&input), Vec3::new(0.03, 0.0, -0.03));
    }

    #[test]
    fn forward_is_rotated_by_yaw() {
        let (resolver, mut rig, mut input) = setup();
        press(&mut input, &["w"]);
        rig.yaw = std::f32::consts::FRAC_PI_2;

        let delta = resolver.update(&mut rig, &input, &Planes(vec![]));
        assert!((delta - Vec3::new(-0.03, 0.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn unconstrained_without_geometry() {
        let (resolver, mut rig, mut input) = setup();
        press(&mut input, &["w"]);
        for _ in 0..100 {
            resolver.update(&mut rig, &input, &Planes(vec![]));
        }
        assert!((rig.position.z + 3.0).abs() < 1e-3);
    }

    #[test]
    fn head_on_wall_blocks_axis() {
        let (resolver, mut rig, mut input) = setup();
        // Wall at x = 0.1 facing -X; walker strafes right into it
        let world = Planes(vec![(Vec3::NEG_X, -0.1)]);
        press(&mut input, &["d"]);

        for _ in 0..20 {
            resolver.update(&mut rig, &input, &world);
        }
        assert_eq!(rig.position.x, 0.0);
    }

    #[test]
    fn blocked_x_still_commits_free_z() {
        let (resolver, mut rig, mut input) = setup();
        let world = Planes(vec![(Vec3::NEG_X, -0.1)]);
        press(&mut input, &["d", "w"]);

        let delta = resolver.update(&mut rig, &input, &world);
        assert_eq!(delta.x, 0.0);
        assert!((delta.z + 0.03).abs() < 1e-6);
    }

    /// Scene holding one 10 x 4 wall through `center`, running along `tangent`
    fn scene_with_wall(center: Vec3, tangent: Vec3) -> Scene {
        let half = tangent.normalize() * 5.0;
        let up = Vec3::Y * 2.0;
        let mut scene = Scene::new(1);
        scene.insert(LoadOutcome {
            name: "wall".to_string(),
            result: Ok(quad([center - half - up, center + half - up, center + half + up, center - half + up])),
        });
        scene
    }

    #[test]
    fn oblique_wall_on_x_is_never_crossed() {
        let (resolver, mut rig, mut input) = setup();
        // Wall on x + z = 0.15, strafing right runs into it at 45 degrees
        let scene = scene_with_wall(Vec3::new(0.075, 0.0, 0.075), Vec3::new(1.0, 0.0, -1.0));
        press(&mut input, &["d"]);

        for frame in 0..100 {
            let delta = resolver.update(&mut rig, &input, &scene);
            let side = rig.position.x + rig.position.z;
            assert!(side < 0.15, "frame {frame}: crossed the wall at {:?}", rig.position);
            // Parallel to the wall, never closing in on it
            assert!((delta.x + delta.z).abs() < 1e-5, "frame {frame}: delta {delta:?}");
        }
        assert!(rig.position.x > 1.0 && rig.position.z < -1.0, "no slide: {:?}", rig.position);
    }

    #[test]
    fn oblique_wall_on_z_is_never_crossed() {
        let (resolver, mut rig, mut input) = setup();
        // Wall on x - z = 0.15, walking forward runs into it at 45 degrees
        let scene = scene_with_wall(Vec3::new(0.075, 0.0, -0.075), Vec3::new(1.0, 0.0, 1.0));
        press(&mut input, &["w"]);

        for frame in 0..100 {
            resolver.update(&mut rig, &input, &scene);
            let side = rig.position.x - rig.position.z;
            assert!(side < 0.15, "frame {frame}: crossed the wall at {:?}", rig.position);
        }
        assert!(rig.position.x < -1.0 && rig.position.z < -1.0, "no slide: {:?}", rig.position);
    }

    #[test]
    fn z_probe_starts_from_the_updated_eye() {
        let (resolver, mut rig, mut input) = setup();
        // Short wall across -Z that only starts at x = 0.02, so it is reached
        // only once this frame's X step has been committed
        let mut scene = Scene::new(1);
        scene.insert(LoadOutcome {
            name: "wall".to_string(),
            result: Ok(quad([
                Vec3::new(0.02, -1.0, -0.1),
                Vec3::new(1.0, -1.0, -0.1),
                Vec3::new(1.0, 1.0, -0.1),
                Vec3::new(0.02, 1.0, -0.1),
            ])),
        });
        press(&mut input, &["d", "w"]);

        let delta = resolver.update(&mut rig, &input, &scene);
        assert!((delta.x - 0.03).abs() < 1e-6);
        assert_eq!(delta.z, 0.0);
    }

    #[test]
    fn walls_out_of_reach_do_not_block() {
        let (resolver, mut rig, mut input) = setup();
        let world = Planes(vec![(Vec3::NEG_X, -5.0)]);
        press(&mut input, &["d"]);

        let delta = resolver.update(&mut rig, &input, &world);
        assert!((delta.x - 0.03).abs() < 1e-6);
    }

    #[test]
    fn floor_keeps_rig_at_reference_height() {
        let (resolver, mut rig, input) = setup();
        // Floor just below the eye
        let world = Planes(vec![(Vec3::Y, -0.3)]);
        rig.position.y = -0.2;

        resolver.update(&mut rig, &input, &world);
        assert_eq!(rig.position.y, resolver.floor_height);
    }

    #[test]
    fn no_floor_leaves_height_alone() {
        let (resolver, mut rig, input) = setup();
        rig.position.y = -0.2;
        resolver.update(&mut rig, &input, &Planes(vec![]));
        assert_eq!(rig.position.y, -0.2);
    }
}
