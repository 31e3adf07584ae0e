use crate::app::AppState;
use crate::ui::{Color, Rect, Scene, TextureId};

use super::config::Layout;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureInfo {
    pub id: TextureId,
    pub width: u32,
    pub height: u32,
}

/// Textures currently resident on the GPU.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SceneAssets {
    pub image: Option<TextureInfo>,
    pub text: Option<TextureInfo>,
}

impl Scene {
    /// Background, then image, then text, then one marker per pressed slot.
    pub fn compose(state: &AppState, assets: &SceneAssets, layout: &Layout) -> Scene {
        let mut scene = Scene::new(Color::BLACK);

        if let Some(image) = assets.image {
            scene.texture(image.id, layout.image_rect());
        }
        if let Some(text) = assets.text {
            let [x, y] = layout.text_origin;
            scene.texture(text.id, Rect::new(x, y, text.width as f32, text.height as f32));
        }
        for (_, rect, color) in state.slots.active() {
            scene.fill(rect, color);
        }
        scene
    }
}
