//! Overzoom geometry reprojection.
//!
//! When a tile is drawn at a deeper level than the one its data was fetched
//! at, each feature's geometry is shifted so the requested tile's origin
//! becomes `(0, 0)`:
//!
//! ```text
//! diffZ   = requested.level - native.level
//! offsetX = extent * (requested.x - (native.x << diffZ))
//! offsetY = extent * (requested.y - (native.y << diffZ))
//! p'      = p - (offsetX, offsetY)
//! ```
//!
//! The requested tile covers a `size = extent >> diffZ` square of the native
//! tile. Features whose bounding box misses that square are dropped before
//! projection, and a square smaller than [`MIN_FOOTPRINT`] units is rejected
//! outright: there is not enough source detail to draw the tile.
//!
//! [`OverzoomProjector`] passes the footprint `size` as the projection
//! extent. Geometry is therefore shifted into place but not magnified, so
//! overzoomed output shows the native tile's scale. This matches the
//! established output and is pinned by a pixel test; it is not corrected
//! here.

use thiserror::Error;

use crate::coord::TileId;
use crate::tile::{Point, Ring};

/// Smallest footprint, in native extent units, that may be overzoomed.
pub const MIN_FOOTPRINT: u32 = 16;

/// Errors raised while preparing an overzoom projection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProjectionError {
    /// The requested tile does not lie inside the native tile.
    #[error("requested tile {requested} is not inside native tile {native}")]
    NotDescendant { native: TileId, requested: TileId },

    /// The native data has too little detail for the requested level.
    #[error(
        "insufficient resolution: {native} -> {requested} leaves a {size}-unit footprint \
         of extent {extent} (minimum {min})"
    )]
    InsufficientResolution {
        native: TileId,
        requested: TileId,
        extent: u32,
        size: u32,
        min: u32,
    },
}

/// Axis-aligned bounds in tile-extent units, edges inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub min_x: i64,
    pub min_y: i64,
    pub max_x: i64,
    pub max_y: i64,
}

impl BoundingBox {
    /// Bounds of all points in `rings`, or `None` when there are none.
    pub fn from_rings(rings: &[Ring]) -> Option<Self> {
        let mut points = rings.iter().flatten();
        let first = points.next()?;
        let mut bbox = BoundingBox {
            min_x: first.x as i64,
            min_y: first.y as i64,
            max_x: first.x as i64,
            max_y: first.y as i64,
        };
        for p in points {
            bbox.min_x = bbox.min_x.min(p.x as i64);
            bbox.min_y = bbox.min_y.min(p.y as i64);
            bbox.max_x = bbox.max_x.max(p.x as i64);
            bbox.max_y = bbox.max_y.max(p.y as i64);
        }
        Some(bbox)
    }

    /// True unless the boxes are fully apart; touching edges intersect.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        !(self.min_x > other.max_x
            || self.max_x < other.min_x
            || self.min_y > other.max_y
            || self.max_y < other.min_y)
    }
}

/// The requested tile's square inside the native tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileFootprint {
    pub origin_x: i64,
    pub origin_y: i64,
    pub size: u32,
}

impl TileFootprint {
    pub fn bounds(&self) -> BoundingBox {
        BoundingBox {
            min_x: self.origin_x,
            min_y: self.origin_y,
            max_x: self.origin_x + self.size as i64,
            max_y: self.origin_y + self.size as i64,
        }
    }
}

fn check_descendant(native: TileId, requested: TileId) -> Result<u8, ProjectionError> {
    if !requested.is_descendant_of(&native) {
        return Err(ProjectionError::NotDescendant { native, requested });
    }
    Ok(requested.level - native.level)
}

/// Offset of the requested tile's origin for a given projection extent.
fn origin_offset(native: TileId, requested: TileId, diff_z: u8, extent: u32) -> (i64, i64) {
    let extent = extent as i64;
    // Past 31 levels a descendant's ancestor is always column/row 0.
    let base_x = (native.x as i64).checked_shl(diff_z as u32).unwrap_or(0);
    let base_y = (native.y as i64).checked_shl(diff_z as u32).unwrap_or(0);
    let x = extent.saturating_mul(requested.x as i64 - base_x);
    let y = extent.saturating_mul(requested.y as i64 - base_y);
    (x, y)
}

/// Compute the requested tile's footprint in native extent units.
///
/// # Errors
///
/// - [`ProjectionError::NotDescendant`] if `requested` is outside `native`
/// - [`ProjectionError::InsufficientResolution`] if the footprint is
///   smaller than `min_size`
pub fn footprint(
    native: TileId,
    requested: TileId,
    extent: u32,
    min_size: u32,
) -> Result<TileFootprint, ProjectionError> {
    let diff_z = check_descendant(native, requested)?;
    let size = extent.checked_shr(diff_z as u32).unwrap_or(0);
    if size < min_size {
        return Err(ProjectionError::InsufficientResolution {
            native,
            requested,
            extent,
            size,
            min: min_size,
        });
    }
    let (origin_x, origin_y) = origin_offset(native, requested, diff_z, size);
    Ok(TileFootprint {
        origin_x,
        origin_y,
        size,
    })
}

/// Shift `rings` from the native tile into the requested tile's space.
///
/// Identity when both tiles are at the same level.
///
/// # Errors
///
/// [`ProjectionError::NotDescendant`] if `requested` is outside `native`.
///
/// # Example
///
/// ```
/// use vectorstyle::coord::TileId;
/// use vectorstyle::overzoom::project;
/// use vectorstyle::tile::Point;
///
/// let rings = vec![vec![Point::new(5000, 100)]];
/// let out = project(rings, TileId::new(0, 0, 0), TileId::new(1, 1, 0), 4096).unwrap();
/// assert_eq!(out, vec![vec![Point::new(904, 100)]]);
/// ```
pub fn project(
    rings: Vec<Ring>,
    native: TileId,
    requested: TileId,
    extent: u32,
) -> Result<Vec<Ring>, ProjectionError> {
    let diff_z = check_descendant(native, requested)?;
    if diff_z == 0 {
        return Ok(rings);
    }

    let (offset_x, offset_y) = origin_offset(native, requested, diff_z, extent);
    let shift = |p: Point| Point::new((p.x as i64 - offset_x) as i32, (p.y as i64 - offset_y) as i32);
    Ok(rings
        .into_iter()
        .map(|ring| ring.into_iter().map(shift).collect())
        .collect())
}

/// Per-layer projector from a native tile into a requested tile.
#[derive(Debug, Clone, Copy)]
pub struct OverzoomProjector {
    native: TileId,
    requested: TileId,
    footprint: Option<TileFootprint>,
}

impl OverzoomProjector {
    /// Prepare a projector for a layer of the given `extent`.
    ///
    /// Same-level tiles get an identity projector. Otherwise the footprint
    /// is validated up front so an unusable tile fails before anything is
    /// drawn.
    pub fn new(
        native: TileId,
        requested: TileId,
        extent: u32,
        min_size: u32,
    ) -> Result<Self, ProjectionError> {
        let footprint = if native.level == requested.level {
            check_descendant(native, requested)?;
            None
        } else {
            Some(footprint(native, requested, extent, min_size)?)
        };
        Ok(Self {
            native,
            requested,
            footprint,
        })
    }

    /// True when geometry passes through unchanged.
    pub fn is_identity(&self) -> bool {
        self.footprint.is_none()
    }

    pub fn footprint(&self) -> Option<TileFootprint> {
        self.footprint
    }

    /// Project one feature's rings, or `None` when the feature lies outside
    /// the requested tile (or has no geometry).
    pub fn project_feature(&self, rings: Vec<Ring>) -> Option<Vec<Ring>> {
        let Some(footprint) = self.footprint else {
            return Some(rings);
        };
        let bbox = BoundingBox::from_rings(&rings)?;
        if !bbox.intersects(&footprint.bounds()) {
            return None;
        }
        project(rings, self.native, self.requested, footprint.size).ok()
    }
}
