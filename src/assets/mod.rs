// Asset loading: glTF models and the intro overlay image, fetched through a
// platform source and handed to the frame loop via a load queue.
pub mod gltf;
pub mod queue;
pub mod source;

pub use self::gltf::load_model;
pub use queue::LoadQueue;
pub use source::{AssetSource, PlatformSource};

use crate::config::WalkConfig;
use crate::model::Mesh;

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to fetch {path}: {reason}")]
    Fetch { path: String, reason: String },
    #[error("invalid glTF {path}: {source}")]
    Gltf {
        path: String,
        #[source]
        source: ::gltf::Error,
    },
    #[error("unsupported buffer uri in {path}: {uri}")]
    UnsupportedUri { path: String, uri: String },
    #[error("bad base64 buffer in {path}: {source}")]
    Base64 {
        path: String,
        #[source]
        source: base64::DecodeError,
    },
    #[error("buffer {index} of {path} is shorter than declared")]
    ShortBuffer { path: String, index: usize },
    #[error("no triangle geometry in {0}")]
    NoGeometry(String),
    #[error("failed to decode image {path}: {source}")]
    Image {
        path: String,
        #[source]
        source: image::ImageError,
    },
}

/// Result of one model load, delivered to the scene by the frame loop
pub struct LoadOutcome {
    pub name: String,
    pub result: Result<Mesh, AssetError>,
}

pub type OverlayOutcome = Result<image::RgbaImage, AssetError>;

pub async fn load_image<S: AssetSource>(source: &S, path: &str) -> OverlayOutcome {
    let bytes = source.read(path).await?;
    let img = image::load_from_memory(&bytes).map_err(|source| AssetError::Image {
        path: path.to_string(),
        source,
    })?;
    Ok(img.to_rgba8())
}

/// Start loading every configured model in the background
pub fn spawn_model_loads(queue: &LoadQueue<LoadOutcome>, config: &WalkConfig) {
    for desc in config.models.iter().cloned() {
        let root = config.asset_root.clone();
        tracing::info!(model = %desc.name, path = %desc.path, "loading model");
        queue.spawn(move || async move {
            let source = PlatformSource::new(&root);
            let result = load_model(&source, &desc).await;
            LoadOutcome { name: desc.name, result }
        });
    }
}

/// Start loading the overlay image, if one is configured
pub fn spawn_overlay_load(queue: &LoadQueue<OverlayOutcome>, config: &WalkConfig) {
    if let Some(path) = config.overlay_image.clone() {
        let root = config.asset_root.clone();
        queue.spawn(move || async move {
            let source = PlatformSource::new(&root);
            load_image(&source, &path).await
        });
    }
}
