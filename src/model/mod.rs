// MODEL: Camera rig, loaded scene geometry and ray queries
pub mod camera;
pub mod mesh;
pub mod ray;
pub mod scene;

pub use camera::CameraRig;
pub use mesh::{Mesh, MeshBuffer, Vertex};
pub use ray::{Aabb, RayHit};
pub use scene::{CollisionWorld, Scene, SceneModel, SceneStatus};
