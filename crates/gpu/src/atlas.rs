//! Sprite-sheet addressing.
//!
//! The atlas is a grid of square tiles laid out row-major in full-view point
//! order. Filtered views address it through their `sprite_indices`, so one
//! atlas serves every view.

use foundation::PointIndex;
use scene::DatasetView;
use serde::Serialize;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct AtlasAddress {
    pub column: u64,
    pub row: u64,
    pub pixel_x: u64,
    pub pixel_y: u64,
}

/// Pixel rectangle inside the sprite sheet.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct SpriteRect {
    pub x: u64,
    pub y: u64,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AtlasError {
    /// The sheet is narrower than one tile (or the tile size is zero).
    Configuration { tile_size: u32, atlas_width_px: u32 },
}

impl std::fmt::Display for AtlasError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AtlasError::Configuration {
                tile_size,
                atlas_width_px,
            } => write!(
                f,
                "sprite atlas {atlas_width_px}px wide cannot hold a {tile_size}px tile"
            ),
        }
    }
}

impl std::error::Error for AtlasError {}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SpriteAtlas {
    tile_size: u32,
    atlas_width_px: u32,
    atlas_height_px: Option<u32>,
    tiles_per_row: u32,
}

impl SpriteAtlas {
    pub fn new(tile_size: u32, atlas_width_px: u32) -> Result<Self, AtlasError> {
        let tiles_per_row = atlas_width_px.checked_div(tile_size).unwrap_or(0);
        if tiles_per_row == 0 {
            return Err(AtlasError::Configuration {
                tile_size,
                atlas_width_px,
            });
        }
        Ok(Self {
            tile_size,
            atlas_width_px,
            atlas_height_px: None,
            tiles_per_row,
        })
    }

    /// Records the decoded sheet height so out-of-sheet tiles can be detected.
    pub fn with_height(mut self, atlas_height_px: u32) -> Self {
        self.atlas_height_px = Some(atlas_height_px);
        self
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    pub fn atlas_width_px(&self) -> u32 {
        self.atlas_width_px
    }

    pub fn tiles_per_row(&self) -> u32 {
        self.tiles_per_row
    }

    /// Grid address of the `sprite_index`-th tile.
    ///
    /// `None` if the pixel offset does not fit in a `u64`.
    pub fn address_of_sprite(&self, sprite_index: PointIndex) -> Option<AtlasAddress> {
        let index = u64::try_from(sprite_index).ok()?;
        let per_row = u64::from(self.tiles_per_row);
        let tile = u64::from(self.tile_size);
        let column = index % per_row;
        let row = index / per_row;
        Some(AtlasAddress {
            column,
            row,
            pixel_x: column.checked_mul(tile)?,
            pixel_y: row.checked_mul(tile)?,
        })
    }

    /// Address of the sprite for point `point` of `view`.
    ///
    /// `None` if the point is not part of the view or its tile is unaddressable.
    pub fn resolve(&self, point: PointIndex, view: &DatasetView) -> Option<AtlasAddress> {
        view.sprite_index(point)
            .and_then(|s| self.address_of_sprite(s))
    }

    pub fn source_rect(&self, address: AtlasAddress) -> SpriteRect {
        SpriteRect {
            x: address.pixel_x,
            y: address.pixel_y,
            width: self.tile_size,
            height: self.tile_size,
        }
    }

    /// Whether the tile lies inside the decoded sheet. Unknown height counts as inside.
    pub fn covers(&self, address: AtlasAddress) -> bool {
        match self.atlas_height_px {
            Some(h) => address
                .pixel_y
                .checked_add(u64::from(self.tile_size))
                .is_some_and(|bottom| bottom <= u64::from(h)),
            None => true,
        }
    }
}

/// One-shot form: `resolve(point, view, tile_size, atlas_width_px)`.
pub fn resolve(
    point: PointIndex,
    view: &DatasetView,
    tile_size: u32,
    atlas_width_px: u32,
) -> Result<Option<AtlasAddress>, AtlasError> {
    Ok(SpriteAtlas::new(tile_size, atlas_width_px)?.resolve(point, view))
}
