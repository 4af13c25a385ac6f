use super::AssetError;

/// Where asset bytes come from: the filesystem natively, HTTP in the browser
#[allow(async_fn_in_trait)]
pub trait AssetSource {
    async fn read(&self, path: &str) -> Result<Vec<u8>, AssetError>;
}

/// Resolve `uri` relative to the directory of `base`
pub fn sibling_path(base: &str, uri: &str) -> String {
    match base.rfind('/') {
        Some(i) => format!("{}/{}", &base[..i], uri),
        None => uri.to_string(),
    }
}

fn join_root(root: &str, path: &str) -> String {
    if root.is_empty() {
        path.to_string()
    } else {
        format!("{}/{}", root.trim_end_matches('/'), path)
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub type PlatformSource = FsSource;
#[cfg(target_arch = "wasm32")]
pub type PlatformSource = FetchSource;

#[cfg(not(target_arch = "wasm32"))]
pub struct FsSource {
    root: String,
}

#[cfg(not(target_arch = "wasm32"))]
impl FsSource {
    pub fn new(root: &str) -> Self {
        Self { root: root.to_string() }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl AssetSource for FsSource {
    async fn read(&self, path: &str) -> Result<Vec<u8>, AssetError> {
        let full = join_root(&self.root, path);
        std::fs::read(&full).map_err(|source| AssetError::Io { path: full, source })
    }
}

#[cfg(target_arch = "wasm32")]
pub struct FetchSource {
    root: String,
}

#[cfg(target_arch = "wasm32")]
impl FetchSource {
    pub fn new(root: &str) -> Self {
        Self { root: root.to_string() }
    }
}

#[cfg(target_arch = "wasm32")]
impl AssetSource for FetchSource {
    async fn read(&self, path: &str) -> Result<Vec<u8>, AssetError> {
        use wasm_bindgen::JsCast;
        use wasm_bindgen_futures::JsFuture;

        let url = join_root(&self.root, path);
        let fail = |reason: String| AssetError::Fetch { path: url.clone(), reason };

        let window = web_sys::window().ok_or_else(|| fail("no global `window`".into()))?;
        let resp = JsFuture::from(window.fetch_with_str(&url))
            .await
            .map_err(|e| fail(format!("{e:?}")))?
            .dyn_into::<web_sys::Response>()
            .map_err(|_| fail("fetch did not return a Response".into()))?;
        if !resp.ok() {
            return Err(fail(format!("HTTP {}", resp.status())));
        }

        let buf = resp.array_buffer().map_err(|e| fail(format!("{e:?}")))?;
        let buf = JsFuture::from(buf).await.map_err(|e| fail(format!("{e:?}")))?;
        Ok(js_sys::Uint8Array::new(&buf).to_vec())
    }
}
