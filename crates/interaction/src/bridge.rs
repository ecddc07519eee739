use catalog::LabelCatalog;
use foundation::{LabelIndex, PointIndex, Rgba};
use gpu::{AtlasAddress, SpriteAtlas, SpriteRect};
use scene::DatasetView;
use serde::Serialize;

pub const NO_DESCRIPTION: &str = "No description available";

/// What the hover panel should show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum HoverInfo {
    /// Nothing under the cursor.
    Empty,
    Point {
        point: PointIndex,
        label_index: LabelIndex,
        label: String,
        description: String,
        /// Index into the sprite sheet (full-view layout).
        sprite_index: PointIndex,
        color: Rgba,
    },
}

impl HoverInfo {
    pub fn is_empty(&self) -> bool {
        matches!(self, HoverInfo::Empty)
    }
}

/// Resolves a renderer point index against the active view.
///
/// An index outside the view (a point that vanished between cursor move and
/// resolution) resolves to [`HoverInfo::Empty`].
pub fn resolve_hover(
    view: &DatasetView,
    catalog: &LabelCatalog,
    point: Option<PointIndex>,
) -> HoverInfo {
    let Some(point) = point else {
        return HoverInfo::Empty;
    };
    let (Some(meta), Some(sprite_index)) = (view.metadata_at(point), view.sprite_index(point))
    else {
        tracing::debug!(point, len = view.len(), "hover index out of range, treating as none");
        return HoverInfo::Empty;
    };

    let label = if meta.label.is_empty() {
        catalog.name(meta.label_index).to_string()
    } else {
        meta.label.clone()
    };
    let description = meta
        .description
        .as_deref()
        .filter(|d| !d.is_empty())
        .unwrap_or(NO_DESCRIPTION)
        .to_string();

    HoverInfo::Point {
        point,
        label_index: meta.label_index,
        label,
        description,
        sprite_index,
        color: catalog.color(meta.label_index),
    }
}

/// A sprite copied from the sheet and scaled into the square preview canvas.
///
/// The destination is always `(0, 0, preview_size, preview_size)`, cleared first.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct SpritePreview {
    pub sprite_index: PointIndex,
    pub address: AtlasAddress,
    pub source: SpriteRect,
    pub preview_size: u32,
}

/// `None` if the sprite's tile cannot be addressed in the sheet.
pub fn sprite_preview(
    atlas: &SpriteAtlas,
    sprite_index: PointIndex,
    preview_size: u32,
) -> Option<SpritePreview> {
    let address = atlas.address_of_sprite(sprite_index)?;
    Some(SpritePreview {
        sprite_index,
        address,
        source: atlas.source_rect(address),
        preview_size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::{DEFAULT_PALETTE, UNKNOWN_LABEL};
    use foundation::math::Vec3;
    use scene::{DatasetViews, PointMetadata, build_views};

    fn views() -> DatasetViews {
        build_views(
            vec![Vec3::default(); 4],
            vec![
                PointMetadata::new(0, "noise").with_description("0: noise"),
                PointMetadata::new(1, "cats").with_description("1: cats"),
                PointMetadata::new(1, ""),
                PointMetadata::new(2, "dogs").with_description(""),
            ],
            0,
        )
        .expect("views")
    }

    #[test]
    fn hover_resolves_text_and_sprite_index() {
        let v = views();
        let cat = LabelCatalog::default();
        assert_eq!(
            resolve_hover(v.filtered(), &cat, Some(0)),
            HoverInfo::Point {
                point: 0,
                label_index: 1,
                label: "cats".to_string(),
                description: "1: cats".to_string(),
                sprite_index: 1,
                color: DEFAULT_PALETTE[1],
            }
        );
    }

    #[test]
    fn missing_text_falls_back() {
        let v = views();
        let names = vec!["noise".to_string(), "felines".to_string()];
        let cat = LabelCatalog::from_label_names(&names, 0);

        let HoverInfo::Point {
            label, description, ..
        } = resolve_hover(v.full(), &cat, Some(2))
        else {
            panic!("expected a point");
        };
        assert_eq!(label, "felines");
        assert_eq!(description, NO_DESCRIPTION);

        let HoverInfo::Point { label, .. } = resolve_hover(v.full(), &LabelCatalog::default(), Some(2))
        else {
            panic!("expected a point");
        };
        assert_eq!(label, UNKNOWN_LABEL);
    }

    #[test]
    fn none_and_stale_indices_are_empty() {
        let v = views();
        let cat = LabelCatalog::default();
        assert!(resolve_hover(v.full(), &cat, None).is_empty());
        assert!(resolve_hover(v.full(), &cat, Some(4)).is_empty());
        assert!(resolve_hover(v.filtered(), &cat, Some(3)).is_empty());
    }

    #[test]
    fn preview_copies_one_tile_into_the_canvas() {
        let atlas = SpriteAtlas::new(50, 200).expect("atlas");
        let p = sprite_preview(&atlas, 5, 150).expect("preview");
        assert_eq!(
            p.source,
            SpriteRect {
                x: 50,
                y: 50,
                width: 50,
                height: 50
            }
        );
        assert_eq!(p.address.column, 1);
        assert_eq!(p.address.row, 1);
        assert_eq!(p.preview_size, 150);
    }
}
