use super::{star_points, triangle_points, SHAPE_MASK_SIZE};
use bevy::asset::LoadState;
use bevy::platform::collections::HashMap;
use bevy::prelude::*;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};

#[derive(Debug, Clone)]
struct CachedTexture {
    handle: Handle<Image>,
    failed: bool,
}

/// Map images by resource name. Each name is loaded once; a failed load is
/// reported once and then treated as missing.
#[derive(Resource, Debug, Default)]
pub struct TextureCache {
    entries: HashMap<String, CachedTexture>,
}

impl TextureCache {
    /// Handle for `name`, or `None` once its load has failed
    pub fn resolve(&mut self, name: &str, asset_server: &AssetServer) -> Option<Handle<Image>> {
        let entry = self.entries.entry(name.to_string()).or_insert_with(|| {
            debug!("Loading map image '{}'", name);
            CachedTexture {
                handle: asset_server.load(name.to_string()),
                failed: false,
            }
        });

        if entry.failed {
            return None;
        }

        if let LoadState::Failed(err) = asset_server.load_state(entry.handle.id()) {
            warn!("Failed to load map image '{}': {}", name, err);
            entry.failed = true;
            return None;
        }

        Some(entry.handle.clone())
    }

    pub fn is_failed(&self, name: &str) -> bool {
        self.entries.get(name).is_some_and(|e| e.failed)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// White mask images for the built-in marker shapes, tinted per marker
#[derive(Resource, Debug, Clone)]
pub struct ShapeMasks {
    pub triangle: Handle<Image>,
    pub star: Handle<Image>,
    pub circle: Handle<Image>,
}

/// Rasterize a polygon centered in a `size`×`size` RGBA8 image.
/// Points are relative to the image center with Y down; coverage is tested
/// at pixel centers with the even-odd rule.
pub fn rasterize_polygon(points: &[Vec2], size: u32) -> Vec<u8> {
    rasterize(size, |p| point_in_polygon(p, points))
}

pub fn rasterize_circle(size: u32) -> Vec<u8> {
    let radius = size as f32 / 2.0;
    rasterize(size, |p| p.length_squared() <= radius * radius)
}

fn rasterize(size: u32, inside: impl Fn(Vec2) -> bool) -> Vec<u8> {
    let half = size as f32 / 2.0;
    let mut data = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            let p = Vec2::new(x as f32 + 0.5 - half, y as f32 + 0.5 - half);
            let alpha = if inside(p) { 255 } else { 0 };
            data.extend_from_slice(&[255, 255, 255, alpha]);
        }
    }
    data
}

fn point_in_polygon(p: Vec2, points: &[Vec2]) -> bool {
    let mut inside = false;
    let mut j = points.len().wrapping_sub(1);
    for i in 0..points.len() {
        let (a, b) = (points[i], points[j]);
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

fn mask_image(data: Vec<u8>, size: u32) -> Image {
    Image::new(
        Extent3d {
            width: size,
            height: size,
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        data,
        TextureFormat::Rgba8UnormSrgb,
        default(),
    )
}

/// Startup system that generates the shape masks
pub fn setup_shape_masks(mut commands: Commands, mut images: ResMut<Assets<Image>>) {
    let size = SHAPE_MASK_SIZE;
    let extent = size as f32;

    commands.insert_resource(ShapeMasks {
        triangle: images.add(mask_image(rasterize_polygon(&triangle_points(extent), size), size)),
        star: images.add(mask_image(rasterize_polygon(&star_points(extent), size), size)),
        circle: images.add(mask_image(rasterize_circle(size), size)),
    });

    debug!("Generated {}px map shape masks", size);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alpha_at(data: &[u8], size: u32, x: u32, y: u32) -> u8 {
        data[((y * size + x) * 4 + 3) as usize]
    }

    #[test]
    fn test_triangle_mask_points_up() {
        let size = 16;
        let data = rasterize_polygon(&triangle_points(size as f32), size);
        assert_eq!(data.len(), (size * size * 4) as usize);

        // Apex row is narrow, base row is wide
        let row_coverage = |y: u32| (0..size).filter(|&x| alpha_at(&data, size, x, y) == 255).count();
        assert!(row_coverage(1) < row_coverage(14));
        assert_eq!(alpha_at(&data, size, 8, 8), 255);
        assert_eq!(alpha_at(&data, size, 0, 0), 0);
        assert_eq!(alpha_at(&data, size, 0, 15), 0);
    }

    #[test]
    fn test_star_mask_has_hollow_notches() {
        let size = 32;
        let data = rasterize_polygon(&star_points(size as f32), size);

        // Center and top point are filled
        assert_eq!(alpha_at(&data, size, 16, 16), 255);
        assert_eq!(alpha_at(&data, size, 16, 2), 255);
        // Between the top and upper-right points lies a notch
        assert_eq!(alpha_at(&data, size, 22, 4), 0);
    }

    #[test]
    fn test_circle_mask() {
        let size = 8;
        let data = rasterize_circle(size);
        assert_eq!(alpha_at(&data, size, 4, 4), 255);
        assert_eq!(alpha_at(&data, size, 0, 0), 0);
        assert_eq!(alpha_at(&data, size, 7, 7), 0);
        // Color channels stay white so the mask can be tinted
        assert_eq!(&data[0..3], &[255, 255, 255]);
    }

    #[test]
    fn test_degenerate_polygon_is_empty() {
        let data = rasterize_polygon(&[], 4);
        assert!(data.chunks_exact(4).all(|px| px[3] == 0));
    }
}
