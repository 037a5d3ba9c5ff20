use std::borrow::Cow;
use std::sync::Arc;

use base64::Engine as _;

use crate::error::ViewerError;
use crate::paint::Rgb;

use super::resources::{ResourceId, ResourceLedger, TextureHandle};

/// Decoded RGBA8 image used as a texture map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureImage {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl TextureImage {
    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self, ViewerError> {
        let expected = width as usize * height as usize * 4;
        if width == 0 || height == 0 || rgba.len() != expected {
            return Err(ViewerError::Texture(format!(
                "{width}x{height} image needs {expected} bytes, got {}",
                rgba.len()
            )));
        }
        Ok(Self { width, height, rgba })
    }

    /// Decodes any format enabled on the `image` crate (PNG, JPEG).
    pub fn decode(bytes: &[u8]) -> Result<Self, ViewerError> {
        let img = image::load_from_memory(bytes)
            .map_err(|e| ViewerError::Texture(e.to_string()))?
            .to_rgba8();
        let (width, height) = img.dimensions();
        Self::from_rgba(width, height, img.into_raw())
    }

    /// Decodes the backend's wire form: a base64 string of PNG bytes, with or
    /// without a `data:image/png;base64,` prefix.
    pub fn from_png_base64(encoded: &str) -> Result<Self, ViewerError> {
        let payload = encoded
            .split_once("base64,")
            .map_or(encoded, |(_, data)| data)
            .trim();
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(payload)
            .map_err(|e| ViewerError::Texture(e.to_string()))?;
        Self::decode(&bytes)
    }

    /// Scales the image down so neither side exceeds `max_dimension`,
    /// keeping the aspect ratio. Images that already fit are borrowed.
    pub fn fit_within(&self, max_dimension: u32) -> Cow<'_, TextureImage> {
        let max = max_dimension.max(1);
        if self.width <= max && self.height <= max {
            return Cow::Borrowed(self);
        }

        let scale = max as f64 / self.width.max(self.height) as f64;
        let width = ((self.width as f64 * scale).round() as u32).clamp(1, max);
        let height = ((self.height as f64 * scale).round() as u32).clamp(1, max);

        let Some(source) = image::RgbaImage::from_raw(self.width, self.height, self.rgba.clone())
        else {
            return Cow::Borrowed(self);
        };
        let resized =
            image::imageops::resize(&source, width, height, image::imageops::FilterType::Triangle);
        log::warn!(
            "texture {}x{} exceeds device limit {max}; scaled to {width}x{height}",
            self.width,
            self.height
        );
        Cow::Owned(Self {
            width,
            height,
            rgba: resized.into_raw(),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum MaterialMode {
    Solid,
    Textured,
}

#[derive(Debug)]
struct MaterialTexture {
    handle: TextureHandle,
    image: Arc<TextureImage>,
}

/// Surface appearance of the mesh node.
///
/// `revision` increases on every effective change; renderers compare it with
/// the revision they last uploaded instead of rebuilding the material.
#[derive(Debug)]
pub struct Material {
    color: Rgb,
    wireframe: bool,
    texture: Option<MaterialTexture>,
    revision: u64,
}

impl Material {
    pub fn solid(color: Rgb, wireframe: bool) -> Self {
        Self {
            color: color.clamped(),
            wireframe,
            texture: None,
            revision: 0,
        }
    }

    pub fn mode(&self) -> MaterialMode {
        if self.texture.is_some() {
            MaterialMode::Textured
        } else {
            MaterialMode::Solid
        }
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    pub fn wireframe(&self) -> bool {
        self.wireframe
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Id and pixels of the active texture map, if textured.
    pub fn texture(&self) -> Option<(ResourceId, &TextureImage)> {
        self.texture.as_ref().map(|t| (t.handle.id(), t.image.as_ref()))
    }

    pub(crate) fn release(&mut self, ledger: &mut ResourceLedger) {
        if let Some(old) = self.texture.take() {
            ledger.release_texture(old.handle);
            self.revision += 1;
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::solid(Rgb::new(1.0, 0.5, 0.5), false)
    }
}

/// Mutating view over the scene's material.
///
/// Obtained from [`SceneGraph::material_mut`](super::SceneGraph::material_mut).
/// Every setter is a no-op when the value is unchanged, so calling them once
/// per frame costs nothing.
pub struct MaterialController<'a> {
    material: &'a mut Material,
    ledger: &'a mut ResourceLedger,
}

impl<'a> MaterialController<'a> {
    pub(crate) fn new(material: &'a mut Material, ledger: &'a mut ResourceLedger) -> Self {
        Self { material, ledger }
    }

    /// Returns true if the material changed.
    pub fn set_color(&mut self, r: f32, g: f32, b: f32) -> bool {
        let color = Rgb::new(r, g, b).clamped();
        if color == self.material.color {
            return false;
        }
        self.material.color = color;
        self.material.revision += 1;
        true
    }

    pub fn set_wireframe(&mut self, wireframe: bool) -> bool {
        if wireframe == self.material.wireframe {
            return false;
        }
        self.material.wireframe = wireframe;
        self.material.revision += 1;
        true
    }

    /// Switches between textured (`Some`) and solid (`None`) mode.
    ///
    /// The outgoing texture handle is released in either direction.
    pub fn set_texture(&mut self, image: Option<TextureImage>) -> bool {
        let unchanged = match (&image, &self.material.texture) {
            (None, None) => true,
            (Some(new), Some(current)) => *current.image == *new,
            _ => false,
        };
        if unchanged {
            return false;
        }

        match image {
            None => self.material.release(self.ledger),
            Some(new) => {
                let handle = self.ledger.register_texture();
                let previous = self.material.texture.replace(MaterialTexture {
                    handle,
                    image: Arc::new(new),
                });
                if let Some(old) = previous {
                    self.ledger.release_texture(old.handle);
                }
                self.material.revision += 1;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::resources::ResourceKind;

    fn pixel(r: u8) -> TextureImage {
        TextureImage::from_rgba(1, 1, vec![r, 0, 0, 255]).unwrap()
    }

    #[test]
    fn oversized_texture_is_scaled_to_the_limit() {
        let wide = TextureImage::from_rgba(100, 10, vec![255; 100 * 10 * 4]).unwrap();

        let fitted = wide.fit_within(50);
        assert_eq!((fitted.width(), fitted.height()), (50, 5));
        assert_eq!(fitted.rgba().len(), 50 * 5 * 4);

        let thin = TextureImage::from_rgba(1000, 1, vec![0; 1000 * 4]).unwrap();
        let fitted = thin.fit_within(16);
        assert_eq!((fitted.width(), fitted.height()), (16, 1));
    }

    #[test]
    fn texture_within_limit_is_borrowed() {
        let image = pixel(10);
        assert!(matches!(image.fit_within(8192), Cow::Borrowed(_)));
    }

    #[test]
    fn unchanged_values_do_not_bump_revision() {
        let mut material = Material::default();
        let mut ledger = ResourceLedger::new();
        let mut ctl = MaterialController::new(&mut material, &mut ledger);

        assert!(!ctl.set_color(1.0, 0.5, 0.5));
        assert!(!ctl.set_wireframe(false));
        assert!(!ctl.set_texture(None));
        assert_eq!(material.revision(), 0);
    }

    #[test]
    fn wireframe_toggle_keeps_color() {
        let mut material = Material::solid(Rgb::new(0.2, 0.4, 0.6), false);
        let mut ledger = ResourceLedger::new();

        let mut ctl = MaterialController::new(&mut material, &mut ledger);
        assert!(ctl.set_wireframe(true));
        assert!(ctl.set_wireframe(false));

        assert_eq!(material.color(), Rgb::new(0.2, 0.4, 0.6));
        assert_eq!(material.revision(), 2);
    }

    #[test]
    fn colors_are_clamped() {
        let mut material = Material::default();
        let mut ledger = ResourceLedger::new();
        MaterialController::new(&mut material, &mut ledger).set_color(2.0, -1.0, 0.5);
        assert_eq!(material.color(), Rgb::new(1.0, 0.0, 0.5));
    }

    #[test]
    fn texture_switches_release_outgoing_handle() {
        let mut material = Material::default();
        let mut ledger = ResourceLedger::new();

        let mut ctl = MaterialController::new(&mut material, &mut ledger);
        assert!(ctl.set_texture(Some(pixel(10))));
        assert!(!ctl.set_texture(Some(pixel(10))));
        assert!(ctl.set_texture(Some(pixel(20))));
        assert!(ctl.set_texture(None));

        assert_eq!(material.mode(), MaterialMode::Solid);
        let stats = ledger.stats();
        assert_eq!(stats.textures_created, 2);
        assert_eq!(stats.textures_disposed, 2);
        assert_eq!(ledger.live_count(ResourceKind::Texture), 0);
    }

    #[test]
    fn rgba_length_is_validated() {
        assert!(TextureImage::from_rgba(2, 2, vec![0; 15]).is_err());
        assert!(TextureImage::from_rgba(0, 0, vec![]).is_err());
    }

    #[test]
    fn garbage_base64_is_a_texture_error() {
        let err = TextureImage::from_png_base64("data:image/png;base64,@@@").unwrap_err();
        assert!(matches!(err, ViewerError::Texture(_)));
    }
}
