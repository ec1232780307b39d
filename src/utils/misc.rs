use std::num::NonZeroUsize;

/// Splits an axis of length `len` into chunk extents.
///
/// `None` gives a single chunk spanning the whole axis. A requested extent
/// larger than the axis is clipped to it, and the last chunk may be shorter.
/// An empty axis still has one (empty) chunk.
pub fn chunk_extents(len: usize, extent: Option<NonZeroUsize>) -> Vec<usize> {
    let Some(extent) = extent.map(NonZeroUsize::get) else {
        return vec![len];
    };
    if len == 0 {
        return vec![0];
    }
    let mut extents = vec![extent; len / extent];
    if len % extent != 0 {
        extents.push(len % extent);
    }
    extents
}
