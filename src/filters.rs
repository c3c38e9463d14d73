//! Slice curation: duplicates and localizers are removed before any
//! geometry is checked.

use crate::geometry::DirectionCosines;
use crate::slice::Slice;

use tracing::{debug, warn};

/// Orientation groups smaller than this are treated as localizers when
/// more than one orientation is present.
pub const MIN_ORIENTATION_GROUP_SIZE: usize = 4;

/// Slices sharing one orientation within tolerance.
///
/// The representative is the orientation of the first slice that opened
/// the group.
#[derive(Debug)]
pub struct OrientationGroup {
    pub orientation: DirectionCosines,
    pub slices: Vec<Slice>,
}

/// Remove later slices that repeat both the position and the pixel data of
/// an earlier slice. Slices sharing only the position are kept.
pub fn remove_duplicate_slices(slices: Vec<Slice>) -> Vec<Slice> {
    let mut filtered: Vec<Slice> = Vec::with_capacity(slices.len());
    for slice in slices {
        let duplicate = filtered
            .iter()
            .find(|kept| kept.position() == slice.position())
            .is_some_and(|kept| kept.pixels() == slice.pixels());

        if duplicate {
            warn!(
                position = ?slice.position().as_slice(),
                "Removing duplicate slice from series"
            );
            continue;
        }
        filtered.push(slice);
    }
    filtered
}

/// Drop slices whose image type marks them as localizers.
pub fn remove_localizers_by_image_type(slices: Vec<Slice>) -> Vec<Slice> {
    let before = slices.len();
    let filtered: Vec<Slice> = slices
        .into_iter()
        .filter(|slice| !slice.is_localizer())
        .collect();
    if filtered.len() != before {
        debug!(
            removed = before - filtered.len(),
            "Removed localizers by image type"
        );
    }
    filtered
}

/// Group slices by orientation, first-seen orientation first.
pub fn group_by_orientation(slices: Vec<Slice>) -> Vec<OrientationGroup> {
    let mut groups: Vec<OrientationGroup> = Vec::new();
    for slice in slices {
        match groups
            .iter_mut()
            .find(|group| slice.orientation().approx_eq(&group.orientation))
        {
            Some(group) => group.slices.push(slice),
            None => groups.push(OrientationGroup {
                orientation: *slice.orientation(),
                slices: vec![slice],
            }),
        }
    }
    groups
}

/// Drop localizers that can only be recognised by their orientation.
///
/// With more than one orientation present, every orientation with fewer
/// than [`MIN_ORIENTATION_GROUP_SIZE`] slices is dropped. A series with a
/// single orientation is returned as is, whatever its size.
pub fn remove_localizers_by_orientation(slices: Vec<Slice>) -> Vec<Slice> {
    let mut groups = group_by_orientation(slices);
    if groups.len() == 1 {
        return groups.pop().map(|group| group.slices).unwrap_or_default();
    }

    groups
        .into_iter()
        .filter(|group| {
            let keep = group.slices.len() >= MIN_ORIENTATION_GROUP_SIZE;
            if !keep {
                debug!(
                    slices = group.slices.len(),
                    row = ?group.orientation.row.as_slice(),
                    column = ?group.orientation.column.as_slice(),
                    "Removing orientation group as localizer"
                );
            }
            keep
        })
        .flat_map(|group| group.slices)
        .collect()
}
