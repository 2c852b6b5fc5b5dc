use crate::data_structures::texture;

#[cfg(target_arch = "wasm32")]
fn format_url(root: &str, file_name: &str) -> anyhow::Result<reqwest::Url> {
    let window = web_sys::window().ok_or_else(|| anyhow::anyhow!("no global window"))?;
    let origin = window
        .location()
        .origin()
        .map_err(|_| anyhow::anyhow!("page origin is not readable"))?;
    let base = reqwest::Url::parse(&format!("{}/{}/", origin, root.trim_matches('/')))?;
    Ok(base.join(file_name)?)
}

/// Read an asset relative to `root`: from disk natively, over HTTP on the web.
pub async fn load_binary(root: &str, file_name: &str) -> anyhow::Result<Vec<u8>> {
    #[cfg(target_arch = "wasm32")]
    let data = {
        let url = format_url(root, file_name)?;
        let response = reqwest::get(url).await?.error_for_status()?;
        response.bytes().await?.to_vec()
    };
    #[cfg(not(target_arch = "wasm32"))]
    let data = {
        let path = std::path::Path::new(root).join(file_name);
        tokio::fs::read(&path)
            .await
            .map_err(|e| anyhow::anyhow!("could not read {}: {}", path.display(), e))?
    };

    Ok(data)
}

pub async fn load_texture(
    root: &str,
    file_name: &str,
    is_linear: bool,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    format: Option<&str>,
) -> anyhow::Result<texture::Texture> {
    let data = load_binary(root, file_name).await?;
    texture::Texture::from_bytes(device, queue, &data, file_name, format, is_linear)
}

/// Like [`load_texture`], but a missing or undecodable image yields a 1×1
/// texture of `fallback` so the scene still renders.
pub async fn load_texture_or_solid(
    root: &str,
    file_name: &str,
    is_linear: bool,
    fallback: [u8; 4],
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> texture::Texture {
    match load_texture(root, file_name, is_linear, device, queue, None).await {
        Ok(texture) => texture,
        Err(e) => {
            log::error!("texture {file_name} unavailable, using a solid fallback: {e:#}");
            texture::Texture::create_solid(fallback, is_linear, device, queue, file_name)
        }
    }
}
