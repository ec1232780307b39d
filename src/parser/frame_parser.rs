use crate::error::{Result, ThorError};
use crate::types::geometry::Pixel;
use winnow::Parser;
use winnow::combinator::repeat;

/// Parses exactly `count` consecutive little-endian pixels from the front of
/// `input`, advancing it past them.
pub fn parse_pixels<T: Pixel>(input: &mut &[u8], count: usize) -> Result<Vec<T>> {
    let pixels: Vec<T> = repeat(count, T::parse_le)
        .parse_next(input)
        .map_err(|e| ThorError::FrameDecode(e.to_string()))?;
    Ok(pixels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_u16_little_endian() -> Result<()> {
        let bytes = [0x01, 0x00, 0xff, 0xff, 0x34, 0x12, 0xaa];
        let mut input = &bytes[..];
        let pixels: Vec<u16> = parse_pixels(&mut input, 3)?;
        assert_eq!(pixels, vec![1, u16::MAX, 0x1234]);
        assert_eq!(input, &[0xaa]);
        Ok(())
    }

    #[test]
    fn test_short_input_is_an_error() {
        let bytes = [0x01, 0x00, 0x02];
        let mut input = &bytes[..];
        assert!(matches!(
            parse_pixels::<u16>(&mut input, 2),
            Err(ThorError::FrameDecode(_))
        ));
    }

    #[test]
    fn test_parse_f32() -> Result<()> {
        let bytes = 1.5f32.to_le_bytes();
        let mut input = &bytes[..];
        assert_eq!(parse_pixels::<f32>(&mut input, 1)?, vec![1.5]);
        Ok(())
    }
}
