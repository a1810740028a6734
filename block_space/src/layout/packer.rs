//! Volumetric packing: maps a transaction count onto a grid of small cells
//! inside a block cube.
//!
//! The proportional strategy fills layers from the bottom according to where
//! the count sits in the dataset-wide `[min, max]` range, so fuller blocks
//! read as fuller cubes. The exact strategy sizes a grid to the count itself,
//! capped for performance.

use bevy::math::Vec3;

use crate::error::PackError;

pub const DEFAULT_CELL_EDGE: f32 = 0.015;

/// Observed transaction-count range across every block in view.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReferenceRange {
    min_observed: u64,
    max_observed: u64,
}

impl ReferenceRange {
    pub fn new(min_observed: u64, max_observed: u64) -> Result<Self, PackError> {
        if min_observed > max_observed {
            return Err(PackError::InvertedRange {
                min: min_observed,
                max: max_observed,
            });
        }
        Ok(Self {
            min_observed,
            max_observed,
        })
    }

    /// Range spanning `counts`, or `None` when there are none.
    pub fn from_counts(counts: impl IntoIterator<Item = u64>) -> Option<Self> {
        counts.into_iter().fold(None, |range, count| match range {
            None => Some(Self {
                min_observed: count,
                max_observed: count,
            }),
            Some(r) => Some(Self {
                min_observed: r.min_observed.min(count),
                max_observed: r.max_observed.max(count),
            }),
        })
    }

    pub fn min_observed(&self) -> u64 {
        self.min_observed
    }

    pub fn max_observed(&self) -> u64 {
        self.max_observed
    }

    /// Position of `count` within the range, clamped to `[0, 1]`.
    /// A collapsed range carries no signal and yields a neutral 0.5.
    pub fn fill_ratio(&self, count: u64) -> f32 {
        if self.max_observed == self.min_observed {
            return 0.5;
        }
        let span = (self.max_observed - self.min_observed).max(1) as f64;
        let normalized = (count as f64 - self.min_observed as f64) / span;
        normalized.clamp(0.0, 1.0) as f32
    }
}

/// One block's worth of input to the packer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PackableSet {
    pub item_count: u64,
    pub container_edge: f32,
    pub cell_edge: f32,
    pub reference_range: ReferenceRange,
}

impl PackableSet {
    pub fn new(item_count: u64, container_edge: f32, reference_range: ReferenceRange) -> Self {
        Self {
            item_count,
            container_edge,
            cell_edge: DEFAULT_CELL_EDGE,
            reference_range,
        }
    }

    pub fn with_cell_edge(mut self, cell_edge: f32) -> Self {
        self.cell_edge = cell_edge;
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PackerSettings {
    /// Centre-to-centre distance as a multiple of the cell edge.
    pub spacing_factor: f32,
    /// Share of the container edge usable for cells; the rest is wall.
    pub usable_fraction: f32,
    /// Share of the usable height that may be filled; the top is headroom.
    pub fill_height_fraction: f32,
    /// Smallest cell edge the exact strategy will shrink to.
    pub exact_min_cell_edge: f32,
    /// Exact grids leave wider gaps than proportional ones.
    pub exact_spacing_factor: f32,
    pub exact_cell_cap: usize,
}

impl Default for PackerSettings {
    fn default() -> Self {
        Self {
            spacing_factor: 1.05,
            usable_fraction: 0.9,
            fill_height_fraction: 0.8,
            exact_min_cell_edge: 0.008,
            exact_spacing_factor: 1.1,
            exact_cell_cap: 200,
        }
    }
}

/// Columns (x), rows (z) and layers (y) of the cell grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GridDims {
    pub columns: usize,
    pub rows: usize,
    pub layers: usize,
}

impl GridDims {
    pub fn per_layer(&self) -> usize {
        self.columns.saturating_mul(self.rows)
    }

    pub fn total(&self) -> usize {
        self.per_layer().saturating_mul(self.layers)
    }
}

/// Packer output. Cell centres are relative to the container's centre.
#[derive(Clone, Debug, PartialEq)]
pub struct VolumetricLayout {
    pub fill_ratio: f32,
    pub grid: GridDims,
    pub max_layers: usize,
    pub layers_to_fill: usize,
    pub cell_edge: f32,
    pub spacing: f32,
    pub cells: Vec<Vec3>,
}

impl VolumetricLayout {
    /// Hard cap on emitted cells regardless of the item count.
    pub fn capacity(&self) -> usize {
        self.layers_to_fill.saturating_mul(self.grid.per_layer())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PackStrategy {
    #[default]
    Proportional,
    Exact,
}

impl PackStrategy {
    pub fn pack(
        self,
        set: &PackableSet,
        settings: &PackerSettings,
    ) -> Result<VolumetricLayout, PackError> {
        match self {
            PackStrategy::Proportional => pack_proportional(set, settings),
            PackStrategy::Exact => pack_exact(set, settings),
        }
    }
}

fn validate(set: &PackableSet, settings: &PackerSettings) -> Result<(), PackError> {
    if !(set.container_edge > 0.0) {
        return Err(PackError::NonPositiveContainer(set.container_edge));
    }
    if !(set.cell_edge > 0.0) {
        return Err(PackError::NonPositiveCell(set.cell_edge));
    }
    if !(settings.spacing_factor > 1.0) {
        return Err(PackError::SpacingTooTight(settings.spacing_factor));
    }
    if !(settings.exact_spacing_factor > 1.0) {
        return Err(PackError::SpacingTooTight(settings.exact_spacing_factor));
    }
    Ok(())
}

/// Fills whole layers in proportion to the count's place in the range.
pub fn pack_proportional(
    set: &PackableSet,
    settings: &PackerSettings,
) -> Result<VolumetricLayout, PackError> {
    validate(set, settings)?;

    let available = set.container_edge * settings.usable_fraction;
    let spacing = set.cell_edge * settings.spacing_factor;
    let cubes_per_row = (available / spacing).floor() as usize;
    let max_layers = (available * settings.fill_height_fraction / spacing).floor() as usize;
    if cubes_per_row == 0 || max_layers == 0 {
        return Err(PackError::ContainerTooSmall {
            container_edge: set.container_edge,
            spacing,
        });
    }

    let fill_ratio = set.reference_range.fill_ratio(set.item_count);
    let layers_to_fill = ((max_layers as f32 * fill_ratio).floor() as usize).max(1);
    let grid = GridDims {
        columns: cubes_per_row,
        rows: cubes_per_row,
        layers: max_layers,
    };

    let capacity = layers_to_fill.saturating_mul(grid.per_layer());
    let count = clamp_count(set.item_count, capacity);
    let start = grid_start(set.container_edge, available, set.cell_edge);

    Ok(VolumetricLayout {
        fill_ratio,
        grid,
        max_layers,
        layers_to_fill,
        cell_edge: set.cell_edge,
        spacing,
        cells: emit_cells(start, spacing, grid.columns, grid.rows, count),
    })
}

/// Sizes a grid to hold the count itself, shrinking cells to fit.
pub fn pack_exact(
    set: &PackableSet,
    settings: &PackerSettings,
) -> Result<VolumetricLayout, PackError> {
    validate(set, settings)?;

    let available = set.container_edge * settings.usable_fraction;
    let min_spacing = settings.exact_min_cell_edge * settings.exact_spacing_factor;
    let max_per_dimension = (available / min_spacing).floor() as usize;
    if max_per_dimension == 0 {
        return Err(PackError::ContainerTooSmall {
            container_edge: set.container_edge,
            spacing: min_spacing,
        });
    }

    let grid = exact_grid_dims(set.item_count, max_per_dimension);
    let max_dimension = grid.columns.max(grid.rows).max(grid.layers).max(1);
    let cell_edge = (available / max_dimension as f32 * 0.85).min(set.cell_edge);
    let spacing = cell_edge * settings.exact_spacing_factor;

    let capacity = grid.total().min(settings.exact_cell_cap);
    let count = clamp_count(set.item_count, capacity);
    let start = grid_start(set.container_edge, available, cell_edge);

    Ok(VolumetricLayout {
        fill_ratio: set.reference_range.fill_ratio(set.item_count),
        grid,
        max_layers: grid.layers,
        layers_to_fill: grid.layers,
        cell_edge,
        spacing,
        cells: emit_cells(start, spacing, grid.columns, grid.rows, count),
    })
}

/// Cube root grid for small counts; otherwise grow height first, then the
/// footprint, never beyond `max_per_dimension` cells on a side.
pub fn exact_grid_dims(count: u64, max_per_dimension: usize) -> GridDims {
    if count == 0 {
        return GridDims::default();
    }
    let root = (count as f64).cbrt().ceil() as usize;
    if count <= 64 {
        return GridDims {
            columns: root,
            rows: root,
            layers: root,
        };
    }

    let count = usize::try_from(count).unwrap_or(usize::MAX);
    let limit = max_per_dimension.max(1);
    let mut columns = root.clamp(1, limit);
    let mut rows = root.clamp(1, limit);
    let mut layers = count
        .div_ceil(columns.saturating_mul(rows))
        .clamp(1, limit);

    while columns.saturating_mul(rows).saturating_mul(layers) < count
        && (columns < limit || rows < limit)
    {
        if columns <= rows && columns < limit {
            columns += 1;
        } else if rows < limit {
            rows += 1;
        } else {
            break;
        }
    }

    GridDims {
        columns,
        rows,
        layers,
    }
}

fn clamp_count(item_count: u64, capacity: usize) -> usize {
    usize::try_from(item_count)
        .unwrap_or(usize::MAX)
        .min(capacity)
}

fn grid_start(container_edge: f32, available: f32, cell_edge: f32) -> Vec3 {
    Vec3::new(
        -available / 2.0 + cell_edge / 2.0,
        -container_edge / 2.0 + cell_edge / 2.0,
        -available / 2.0 + cell_edge / 2.0,
    )
}

/// Bottom layer first, then rows (z) within a layer, then columns (x).
fn emit_cells(start: Vec3, spacing: f32, columns: usize, rows: usize, count: usize) -> Vec<Vec3> {
    let per_layer = columns.saturating_mul(rows);
    if per_layer == 0 {
        return Vec::new();
    }
    (0..count)
        .map(|i| {
            let layer = i / per_layer;
            let row = (i % per_layer) / columns;
            let col = i % columns;
            start + Vec3::new(col as f32, layer as f32, row as f32) * spacing
        })
        .collect()
}
