//! Lazy, chunked, read-only access to a raw frame file.
//!
//! A view borrows the bytes of a mapped file and decodes nothing until a
//! block is requested. Only the leading (frame) axis is ever split, so every
//! block holds whole frames.

use crate::error::{Result, ThorError};
use crate::parser::parse_pixels;
use crate::types::geometry::{ArrayGeometry, Pixel, PixelType, check_pixel_type};
use crate::utils::chunk_extents;
use log::trace;
use ndarray::{ArrayD, ArrayViewD, Axis, IxDyn};
use rayon::prelude::*;
use std::marker::PhantomData;
use std::num::NonZeroUsize;
use std::ops::Range;

/// Capability of a lazily materialized, chunked array.
pub trait ChunkedArray {
    type Elem;

    fn shape(&self) -> &[usize];

    fn pixel_type(&self) -> PixelType;

    /// Chunk extents per axis, as actually in effect.
    fn chunks(&self) -> &[Vec<usize>];

    /// Materializes the `index`-th chunk of the leading axis.
    fn read_block(&self, index: usize) -> Result<ArrayD<Self::Elem>>;

    fn num_blocks(&self) -> usize {
        self.chunks().first().map_or(1, Vec::len)
    }

    /// Extents of the leading-axis chunks.
    fn chunk_boundaries(&self) -> &[usize] {
        self.chunks().first().map_or(&[], Vec::as_slice)
    }
}

/// A typed view over a raw file, logically shaped `(frames, *frame_shape)`.
#[derive(Debug, Clone)]
pub struct ArrayView<'a, T: Pixel> {
    bytes: &'a [u8],
    shape: Vec<usize>,
    chunks: Vec<Vec<usize>>,
    _pixel: PhantomData<T>,
}

impl<'a, T: Pixel> ArrayView<'a, T> {
    /// Builds a view over `bytes`. The bytes must hold at least the whole
    /// geometry; anything past it is ignored.
    pub fn new(
        bytes: &'a [u8],
        geometry: &ArrayGeometry,
        chunk_extent: Option<NonZeroUsize>,
    ) -> Result<Self> {
        check_pixel_type::<T>(geometry.dtype)?;
        if geometry.shape.is_empty() {
            return Err(ThorError::UnsupportedFeature("zero-dimensional arrays".into()));
        }
        let required = geometry.required_bytes(bytes.len())?;

        let mut chunks = vec![chunk_extents(geometry.shape[0], chunk_extent)];
        chunks.extend(geometry.shape[1..].iter().map(|&n| vec![n]));

        Ok(Self {
            bytes: &bytes[..required],
            shape: geometry.shape.clone(),
            chunks,
            _pixel: PhantomData,
        })
    }

    fn frame_len(&self) -> usize {
        self.shape[1..].iter().product()
    }

    /// Frames covered by the `index`-th block.
    pub fn block_range(&self, index: usize) -> Result<Range<usize>> {
        let extents = &self.chunks[0];
        if index >= extents.len() {
            return Err(ThorError::BlockOutOfRange {
                index,
                count: extents.len(),
            });
        }
        let start: usize = extents[..index].iter().sum();
        Ok(start..start + extents[index])
    }

    fn read_frames(&self, frames: Range<usize>) -> Result<ArrayD<T>> {
        let frame_bytes = self.frame_len() * T::PIXEL_TYPE.itemsize();
        let mut input = &self.bytes[frames.start * frame_bytes..frames.end * frame_bytes];
        trace!("reading frames {frames:?} ({} bytes)", input.len());

        let pixels = parse_pixels::<T>(&mut input, frames.len() * self.frame_len())?;
        let mut shape = self.shape.clone();
        shape[0] = frames.len();
        Ok(ArrayD::from_shape_vec(IxDyn(&shape), pixels)?)
    }

    /// Materializes the whole array, decoding blocks in parallel.
    pub fn read_all(&self) -> Result<ArrayD<T>> {
        let mut blocks = (0..self.num_blocks())
            .into_par_iter()
            .map(|i| self.read_block(i))
            .collect::<Result<Vec<_>>>()?;
        if blocks.len() == 1 {
            if let Some(block) = blocks.pop() {
                return Ok(block);
            }
        }
        let views: Vec<ArrayViewD<T>> = blocks.iter().map(|b| b.view()).collect();
        Ok(ndarray::concatenate(Axis(0), &views)?)
    }
}

impl<T: Pixel> ChunkedArray for ArrayView<'_, T> {
    type Elem = T;

    fn shape(&self) -> &[usize] {
        &self.shape
    }

    fn pixel_type(&self) -> PixelType {
        T::PIXEL_TYPE
    }

    fn chunks(&self) -> &[Vec<usize>] {
        &self.chunks
    }

    fn read_block(&self, index: usize) -> Result<ArrayD<T>> {
        let frames = self.block_range(index)?;
        self.read_frames(frames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::s;

    fn frames(count: usize, height: usize, width: usize) -> Vec<u8> {
        (0..count * height * width)
            .flat_map(|i| (i as u16).to_le_bytes())
            .collect()
    }

    fn geometry(shape: &[usize]) -> ArrayGeometry {
        ArrayGeometry {
            shape: shape.to_vec(),
            dtype: PixelType::U16,
        }
    }

    #[test]
    fn test_blocks_follow_requested_extent() -> Result<()> {
        let bytes = frames(10, 2, 3);
        let view = ArrayView::<u16>::new(&bytes, &geometry(&[10, 2, 3]), NonZeroUsize::new(4))?;
        assert_eq!(view.chunk_boundaries(), &[4, 4, 2]);
        assert_eq!(view.chunks(), &[vec![4, 4, 2], vec![2], vec![3]]);
        assert_eq!(view.num_blocks(), 3);

        let last = view.read_block(2)?;
        assert_eq!(last.shape(), &[2, 2, 3]);
        assert_eq!(last[[0, 0, 0]], 8 * 6);
        assert_eq!(last[[1, 1, 2]], 10 * 6 - 1);

        assert!(matches!(
            view.read_block(3),
            Err(ThorError::BlockOutOfRange { index: 3, count: 3 })
        ));
        Ok(())
    }

    #[test]
    fn test_read_all_matches_blocks() -> Result<()> {
        let bytes = frames(5, 4, 4);
        let chunked = ArrayView::<u16>::new(&bytes, &geometry(&[5, 4, 4]), NonZeroUsize::new(2))?;
        let whole = ArrayView::<u16>::new(&bytes, &geometry(&[5, 4, 4]), None)?;
        assert_eq!(whole.chunk_boundaries(), &[5]);

        let all = chunked.read_all()?;
        assert_eq!(all, whole.read_all()?);
        assert_eq!(all.shape(), &[5, 4, 4]);
        assert_eq!(all.slice(s![2..4, .., ..]).into_dyn(), chunked.read_block(1)?.view());
        assert_eq!(all[[4, 3, 3]], 5 * 16 - 1);
        Ok(())
    }

    #[test]
    fn test_oversized_extent_is_clipped() -> Result<()> {
        let bytes = frames(3, 2, 2);
        let view = ArrayView::<u16>::new(&bytes, &geometry(&[3, 2, 2]), NonZeroUsize::new(64))?;
        assert_eq!(view.chunk_boundaries(), &[3]);
        Ok(())
    }

    #[test]
    fn test_empty_file_has_one_empty_block() -> Result<()> {
        let view = ArrayView::<u16>::new(&[], &geometry(&[0, 2, 2]), NonZeroUsize::new(8))?;
        assert_eq!(view.read_all()?.shape(), &[0, 2, 2]);
        Ok(())
    }

    #[test]
    fn test_shape_larger_than_file_is_rejected() {
        let bytes = frames(2, 2, 2);
        assert!(matches!(
            ArrayView::<u16>::new(&bytes, &geometry(&[3, 2, 2]), None),
            Err(ThorError::ShapeMismatch {
                required: 24,
                available: 16
            })
        ));
    }

    #[test]
    fn test_overflowing_shape_is_rejected() {
        let bytes = frames(2, 2, 2);
        assert!(matches!(
            ArrayView::<u16>::new(&bytes, &geometry(&[usize::MAX, 2, 2]), None),
            Err(ThorError::ShapeMismatch {
                required: usize::MAX,
                available: 16
            })
        ));
        assert!(ArrayView::<u16>::new(&bytes, &geometry(&[0, usize::MAX, 2]), None).is_err());
    }

    #[test]
    fn test_pixel_type_must_match() {
        let bytes = frames(2, 2, 2);
        assert!(matches!(
            ArrayView::<f32>::new(&bytes, &geometry(&[2, 2, 2]), None),
            Err(ThorError::PixelTypeMismatch { .. })
        ));
    }
}
