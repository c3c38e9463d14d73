use crate::slice::Slice;

/// Order slices along their normal, nearest first.
///
/// The sort is stable, slices at the same distance keep their input order.
pub fn sort_slices(mut slices: Vec<Slice>) -> Vec<Slice> {
    slices.sort_by(|a, b| a.normal_projection().total_cmp(&b.normal_projection()));
    slices
}
