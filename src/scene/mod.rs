//! Drawable items and whole-scene rendering.

use crate::geom::Matrix;
use crate::mesh::Mesh;
use crate::path::Path;
use crate::render::{draw_path, Batch, BuildError, Paint, PaintModes, RenderState};
use crate::util::config::TessConfig;

/// One path plus everything needed to draw it.
#[derive(Clone, Debug, Default)]
pub struct DrawItem {
    pub path: Path,
    pub modes: PaintModes,
    pub fill_paint: Paint,
    pub stroke_paint: Paint,
    pub transform: Matrix,
}

impl DrawItem {
    pub fn new(path: Path, modes: PaintModes) -> Self {
        Self { path, modes, ..Self::default() }
    }

    fn state(&self, config: &TessConfig) -> RenderState {
        RenderState {
            transform: self.transform,
            fill_paint: self.fill_paint.clone(),
            stroke_paint: self.stroke_paint.clone(),
            config: *config,
        }
    }
}

/// Ordered draw list. Later items paint over earlier ones.
#[derive(Clone, Debug, Default)]
pub struct Scene {
    items: Vec<DrawItem>,
    config: TessConfig,
}

impl Scene {
    pub fn new(config: TessConfig) -> Self {
        Self { items: Vec::new(), config: config.sanitized() }
    }

    pub fn config(&self) -> &TessConfig {
        &self.config
    }

    /// Append an item; returns its index.
    pub fn push(&mut self, item: DrawItem) -> usize {
        self.items.push(item);
        self.items.len() - 1
    }

    pub fn items(&self) -> &[DrawItem] {
        &self.items
    }

    pub fn item_mut(&mut self, index: usize) -> Option<&mut DrawItem> {
        self.items.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// One mesh per item, index-aligned with `items()`. Failed items yield `None`.
    pub fn render_each(&mut self) -> Vec<Option<Mesh>> {
        let config = self.config;
        self.items
            .iter_mut()
            .enumerate()
            .map(|(i, item)| {
                let state = item.state(&config);
                match draw_path(&mut item.path, item.modes, &state) {
                    Ok(mesh) => Some(mesh),
                    Err(e) => {
                        log::warn!("scene item {i} skipped: {e}");
                        None
                    }
                }
            })
            .collect()
    }

    /// All items merged into one mesh.
    ///
    /// Items whose fill cannot be triangulated are skipped; assembly failures abort.
    pub fn render_batched(&mut self) -> Result<Mesh, BuildError> {
        let config = self.config;
        let mut batch = Batch::new(&config);
        for (i, item) in self.items.iter_mut().enumerate() {
            let state = item.state(&config);
            match batch.add(&mut item.path, item.modes, &state) {
                Ok(()) => {}
                Err(BuildError::Tess(e)) => log::warn!("scene item {i} skipped: {e}"),
                Err(e) => return Err(e),
            }
        }
        batch.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::{PathSegment, SegmentKind::*};
    use crate::render::Rgba;

    fn rect(x: f32, y: f32, w: f32, h: f32) -> Path {
        let mut path = Path::new();
        path.append_segments(
            &[
                PathSegment::abs(MoveTo),
                PathSegment::rel(LineTo),
                PathSegment::rel(LineTo),
                PathSegment::rel(LineTo),
                PathSegment::abs(ClosePath),
            ],
            &[x, y, w, 0.0, 0.0, h, -w, 0.0],
        );
        path
    }

    fn scene() -> Scene {
        let mut scene = Scene::new(TessConfig::default());
        let mut a = DrawItem::new(rect(0.0, 0.0, 10.0, 10.0), PaintModes::FILL);
        a.fill_paint = Paint::Solid(Rgba::new(1.0, 0.0, 0.0, 1.0));
        scene.push(a);
        // Nothing to draw.
        scene.push(DrawItem::new(Path::new(), PaintModes::BOTH));
        let mut c = DrawItem::new(rect(0.0, 0.0, 5.0, 5.0), PaintModes::FILL);
        c.transform = Matrix::translate(20.0, 20.0);
        scene.push(c);
        scene
    }

    #[test]
    fn render_each_is_index_aligned() {
        let mut scene = scene();
        let meshes = scene.render_each();
        assert_eq!(meshes.len(), 3);
        assert_eq!(meshes[0].as_ref().unwrap().triangle_count(), 2);
        assert!(meshes[1].as_ref().unwrap().is_empty());
        let last = meshes[2].as_ref().unwrap();
        assert_eq!(last.bounds.min_x, 20.0);
        assert!(last.vertices.iter().all(|v| v.color == [0, 0, 0, 255]));
    }

    #[test]
    fn render_batched_merges_everything() {
        let mut scene = scene();
        let mesh = scene.render_batched().unwrap();
        assert_eq!(mesh.triangle_count(), 4);
        assert_eq!(mesh.bounds.width, 25.0);
        assert_eq!(mesh.bounds.height, 25.0);
    }

    #[test]
    fn rebuilds_reuse_cached_geometry() {
        let mut scene = scene();
        scene.render_each();
        assert!(!scene.items()[0].path.is_fill_dirty());
        if let Some(item) = scene.item_mut(0) {
            item.path.set_fill_rule(crate::tess::FillRule::EvenOdd);
        }
        assert!(scene.items()[0].path.is_fill_dirty());
        assert_eq!(scene.render_batched().unwrap().triangle_count(), 4);
    }
}
