//! Element types and resolved array geometry for raw frame files.

use crate::error::{Result, ThorError};
use serde::{Deserialize, Serialize};
use std::fmt;
use winnow::Parser;
use winnow::binary::{le_f32, le_i16, le_u16, le_u32, le_u8};
use winnow::error::ContextError;

/// Little-endian element type of a raw frame file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PixelType {
    U8,
    #[default]
    U16,
    U32,
    I16,
    F32,
}

impl PixelType {
    pub fn itemsize(self) -> usize {
        match self {
            Self::U8 => 1,
            Self::U16 | Self::I16 => 2,
            Self::U32 | Self::F32 => 4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::I16 => "i16",
            Self::F32 => "f32",
        }
    }
}

impl fmt::Display for PixelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Rust element types that a raw frame file can be decoded into.
pub trait Pixel: Copy + Send + Sync + 'static {
    const PIXEL_TYPE: PixelType;

    fn parse_le(input: &mut &[u8]) -> std::result::Result<Self, ContextError>;
}

macro_rules! impl_pixel {
    ($ty:ty, $variant:ident, $parser:ident) => {
        impl Pixel for $ty {
            const PIXEL_TYPE: PixelType = PixelType::$variant;

            fn parse_le(input: &mut &[u8]) -> std::result::Result<Self, ContextError> {
                $parser.parse_next(input)
            }
        }
    };
}

impl_pixel!(u8, U8, le_u8);
impl_pixel!(u16, U16, le_u16);
impl_pixel!(u32, U32, le_u32);
impl_pixel!(i16, I16, le_i16);
impl_pixel!(f32, F32, le_f32);

pub(crate) fn check_pixel_type<T: Pixel>(expected: PixelType) -> Result<()> {
    if T::PIXEL_TYPE == expected {
        Ok(())
    } else {
        Err(ThorError::PixelTypeMismatch {
            expected: expected.name(),
            requested: T::PIXEL_TYPE.name(),
        })
    }
}

/// Full shape and element type of a raw file, frame axis first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrayGeometry {
    pub shape: Vec<usize>,
    pub dtype: PixelType,
}

impl ArrayGeometry {
    pub fn frame_count(&self) -> usize {
        self.shape.first().copied().unwrap_or(0)
    }

    /// Bytes occupied by one step along the leading axis, `None` on overflow.
    pub fn frame_bytes(&self) -> Option<usize> {
        checked_product(self.shape.iter().skip(1))?.checked_mul(self.dtype.itemsize())
    }

    /// `None` on overflow.
    pub fn total_bytes(&self) -> Option<usize> {
        checked_product(&self.shape)?.checked_mul(self.dtype.itemsize())
    }

    /// Bytes the whole array needs, if `available` bytes can hold them.
    ///
    /// A byte count that overflows `usize` is reported as `usize::MAX`.
    pub fn required_bytes(&self, available: usize) -> Result<usize> {
        match self.frame_bytes().and(self.total_bytes()) {
            Some(required) if required <= available => Ok(required),
            required => Err(ThorError::ShapeMismatch {
                required: required.unwrap_or(usize::MAX),
                available,
            }),
        }
    }
}

pub(crate) fn checked_product<'a>(dims: impl IntoIterator<Item = &'a usize>) -> Option<usize> {
    dims.into_iter().try_fold(1usize, |acc, &n| acc.checked_mul(n))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry(shape: &[usize]) -> ArrayGeometry {
        ArrayGeometry {
            shape: shape.to_vec(),
            dtype: PixelType::U16,
        }
    }

    #[test]
    fn test_byte_counts() -> Result<()> {
        let g = geometry(&[10, 4, 6]);
        assert_eq!(g.frame_bytes(), Some(48));
        assert_eq!(g.total_bytes(), Some(480));
        assert_eq!(g.required_bytes(480)?, 480);
        assert!(matches!(
            g.required_bytes(479),
            Err(ThorError::ShapeMismatch { required: 480, available: 479 })
        ));
        Ok(())
    }

    #[test]
    fn test_overflowing_shape_is_a_mismatch() {
        let g = geometry(&[usize::MAX, 2, 2]);
        assert_eq!(g.total_bytes(), None);
        assert!(matches!(
            g.required_bytes(16),
            Err(ThorError::ShapeMismatch { required: usize::MAX, available: 16 })
        ));

        // no frames, but a single frame would not fit in memory
        let g = geometry(&[0, usize::MAX, 2]);
        assert_eq!(g.total_bytes(), Some(0));
        assert_eq!(g.frame_bytes(), None);
        assert!(g.required_bytes(0).is_err());
    }
}
