//! Label catalog: label index to display name and deterministic color.
//!
//! The catalog is built once per dataset and never mutated. Lookups never
//! fail: a label without a name renders as [`UNKNOWN_LABEL`], and colors wrap
//! around the palette.

use std::collections::BTreeMap;

use foundation::{DEFAULT_NOISE_LABEL, LabelIndex, Rgba};

pub const UNKNOWN_LABEL: &str = "Unknown";

/// Neutral gray used for the noise label.
pub const NOISE_COLOR: Rgba = Rgba::rgb(0xdb, 0xdb, 0xdb);

/// Built-in 16-entry palette; slot 0 is the noise gray.
pub const DEFAULT_PALETTE: [Rgba; 16] = [
    NOISE_COLOR,
    Rgba::rgb(0xb2, 0x00, 0x14),
    Rgba::rgb(0x8a, 0x3d, 0xff),
    Rgba::rgb(0x00, 0x8a, 0x00),
    Rgba::rgb(0xeb, 0xa6, 0x00),
    Rgba::rgb(0xff, 0x7d, 0xd2),
    Rgba::rgb(0x00, 0xba, 0xf7),
    Rgba::rgb(0x04, 0xff, 0x35),
    Rgba::rgb(0xa6, 0x00, 0x82),
    Rgba::rgb(0x00, 0x71, 0xc6),
    Rgba::rgb(0xff, 0x75, 0x61),
    Rgba::rgb(0xdb, 0x00, 0xff),
    Rgba::rgb(0x00, 0xf7, 0xbe),
    Rgba::rgb(0x8e, 0xb6, 0x1c),
    Rgba::rgb(0xfb, 0x00, 0x79),
    Rgba::rgb(0xbe, 0x61, 0x00),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    EmptyPalette,
    InvalidColor(String),
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::EmptyPalette => write!(f, "label palette must not be empty"),
            CatalogError::InvalidColor(c) => write!(f, "invalid palette color: {c}"),
        }
    }
}

impl std::error::Error for CatalogError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelCatalog {
    names: BTreeMap<LabelIndex, String>,
    palette: Vec<Rgba>,
    noise_label: LabelIndex,
}

impl Default for LabelCatalog {
    fn default() -> Self {
        Self {
            names: BTreeMap::new(),
            palette: DEFAULT_PALETTE.to_vec(),
            noise_label: DEFAULT_NOISE_LABEL,
        }
    }
}

impl LabelCatalog {
    pub fn new(
        names: impl IntoIterator<Item = (LabelIndex, String)>,
        noise_label: LabelIndex,
    ) -> Self {
        Self {
            names: names.into_iter().collect(),
            noise_label,
            ..Self::default()
        }
    }

    /// Names indexed by position, as shipped alongside a projection.
    pub fn from_label_names(names: &[String], noise_label: LabelIndex) -> Self {
        Self::new(
            names
                .iter()
                .enumerate()
                .filter_map(|(i, n)| Some((LabelIndex::try_from(i).ok()?, n.clone()))),
            noise_label,
        )
    }

    pub fn with_palette(mut self, palette: Vec<Rgba>) -> Result<Self, CatalogError> {
        if palette.is_empty() {
            return Err(CatalogError::EmptyPalette);
        }
        self.palette = palette;
        Ok(self)
    }

    /// Replaces the palette with CSS hex strings (`#rrggbb`).
    pub fn with_palette_hex<S: AsRef<str>>(self, palette: &[S]) -> Result<Self, CatalogError> {
        let parsed = palette
            .iter()
            .map(|s| {
                Rgba::from_hex(s.as_ref())
                    .map_err(|_| CatalogError::InvalidColor(s.as_ref().to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.with_palette(parsed)
    }

    pub fn noise_label(&self) -> LabelIndex {
        self.noise_label
    }

    pub fn palette(&self) -> &[Rgba] {
        &self.palette
    }

    pub fn name(&self, label: LabelIndex) -> &str {
        match self.names.get(&label) {
            Some(n) if !n.is_empty() => n,
            _ => UNKNOWN_LABEL,
        }
    }

    /// Palette color for `label`.
    ///
    /// The noise label is always [`NOISE_COLOR`]; every other label takes
    /// `palette[label mod len]` (euclidean, so negative labels wrap too).
    pub fn color(&self, label: LabelIndex) -> Rgba {
        if label == self.noise_label {
            return NOISE_COLOR;
        }
        let len = self.palette.len() as i64;
        self.palette[(label as i64).rem_euclid(len) as usize]
    }
}
