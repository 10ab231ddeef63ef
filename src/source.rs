use alloc::vec::Vec;

use crate::error::DecodeError;

/// Random-access, read-only view of the bytes being decoded.
///
/// The decoder never checks bounds itself; whatever the source answers is authoritative. The slice
/// implementations refuse any read that would cross the end of the data. A source that wraps a
/// file window or a JPEG segment can choose to clamp or zero-fill instead.
pub trait ByteSource
{
    /// Total number of addressable bytes.
    fn len(&self) -> u64;

    /// Fill `out` with the bytes starting at `offset`.
    fn read_at(&self, offset : u64, out : &mut [u8]) -> Result<(), DecodeError>;

    fn is_empty(&self) -> bool
    {
        self.len() == 0
    }
}

fn read_slice(data : &[u8], offset : u64, out : &mut [u8]) -> Result<(), DecodeError>
{
    let eof = DecodeError::UnexpectedEof { offset, needed : out.len() as u64 };
    let Ok(start) = usize::try_from(offset) else { return Err(eof) };
    match start.checked_add(out.len())
    {
        Some(end) if end <= data.len() =>
        {
            out.copy_from_slice(&data[start..end]);
            Ok(())
        }
        _ => Err(eof),
    }
}

impl ByteSource for &[u8]
{
    fn len(&self) -> u64 { <[u8]>::len(self) as u64 }
    fn read_at(&self, offset : u64, out : &mut [u8]) -> Result<(), DecodeError> { read_slice(self, offset, out) }
}

impl<const N : usize> ByteSource for [u8; N]
{
    fn len(&self) -> u64 { N as u64 }
    fn read_at(&self, offset : u64, out : &mut [u8]) -> Result<(), DecodeError> { read_slice(self, offset, out) }
}

impl ByteSource for Vec<u8>
{
    fn len(&self) -> u64 { self.as_slice().len() as u64 }
    fn read_at(&self, offset : u64, out : &mut [u8]) -> Result<(), DecodeError> { read_slice(self, offset, out) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slice_reads_are_bounds_checked()
    {
        let data : &[u8] = &[1, 2, 3, 4];
        let src : &dyn ByteSource = &data;
        let mut out = [0u8; 2];
        src.read_at(2, &mut out).unwrap();
        assert_eq!(out, [3, 4]);
        assert!(matches!(src.read_at(3, &mut out), Err(DecodeError::UnexpectedEof { offset : 3, needed : 2 })));
        assert_eq!(src.len(), 4);
    }

    #[test]
    fn offsets_past_the_end_are_rejected()
    {
        let data = [0u8; 4];
        let mut out = [0u8; 1];
        assert!(data.read_at(4, &mut out).is_err());
        assert!(data.read_at(u64::MAX, &mut out).is_err());
        let v = vec![9u8];
        v.read_at(0, &mut out).unwrap();
        assert_eq!(out[0], 9);
    }
}
