//! Sequential big-endian reader over a [`ByteSource`].

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use crate::error::DecodeError;
use crate::source::ByteSource;

/// An ASCII 4-character code such as `8BIM`, `luni` or `Objc`, compared by exact value.
pub type FourCc = [u8; 4];

pub(crate) const SIG_8BIM : FourCc = *b"8BIM";
pub(crate) const SIG_8BPS : FourCc = *b"8BPS";

/// Render a four-character code for display, one char per byte.
pub fn fourcc_str(code : &FourCc) -> String
{
    latin1(code)
}

/// Bytes as characters, one char per byte (no UTF-8 decoding).
pub(crate) fn latin1(bytes : &[u8]) -> String
{
    bytes.iter().map(|&b| b as char).collect()
}

/// Byte position in the source plus the source itself.
///
/// The position is the single source of truth for how much has been consumed; every read advances
/// it, and the block parsers compare it against each block's self-declared end.
#[derive(Clone, Copy)]
pub struct Cursor<'a>
{
    src : &'a dyn ByteSource,
    pos : u64,
}

impl<'a> Cursor<'a>
{
    pub fn new(src : &'a dyn ByteSource, pos : u64) -> Self
    {
        Self { src, pos }
    }

    pub fn position(&self) -> u64 { self.pos }
    pub fn set_position(&mut self, pos : u64) { self.pos = pos }
    pub fn source_len(&self) -> u64 { self.src.len() }
    pub fn remaining(&self) -> u64 { self.src.len().saturating_sub(self.pos) }

    pub fn skip(&mut self, n : u64)
    {
        self.pos = self.pos.saturating_add(n);
    }

    pub fn read_exact(&mut self, out : &mut [u8]) -> Result<(), DecodeError>
    {
        self.src.read_at(self.pos, out)?;
        self.pos += out.len() as u64;
        Ok(())
    }

    /// Read `n` bytes without moving the cursor.
    pub fn peek_bytes(&self, n : usize) -> Result<Vec<u8>, DecodeError>
    {
        if n as u64 > self.remaining()
        {
            return Err(DecodeError::UnexpectedEof { offset : self.pos, needed : n as u64 });
        }
        let mut buf = vec![0; n];
        self.src.read_at(self.pos, &mut buf)?;
        Ok(buf)
    }

    pub fn read_bytes(&mut self, n : usize) -> Result<Vec<u8>, DecodeError>
    {
        let buf = self.peek_bytes(n)?;
        self.pos += n as u64;
        Ok(buf)
    }

    pub fn read_u8(&mut self) -> Result<u8, DecodeError>
    {
        let mut buf = [0; 1];
        self.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, DecodeError>
    {
        let mut buf = [0; 2];
        self.read_exact(&mut buf)?;
        Ok(u16::from_be_bytes(buf))
    }

    pub fn read_u32(&mut self) -> Result<u32, DecodeError>
    {
        let mut buf = [0; 4];
        self.read_exact(&mut buf)?;
        Ok(u32::from_be_bytes(buf))
    }

    pub fn read_i16(&mut self) -> Result<i16, DecodeError>
    {
        Ok(self.read_u16()? as i16)
    }

    pub fn read_i32(&mut self) -> Result<i32, DecodeError>
    {
        Ok(self.read_u32()? as i32)
    }

    pub fn read_u64(&mut self) -> Result<u64, DecodeError>
    {
        let mut buf = [0; 8];
        self.read_exact(&mut buf)?;
        Ok(u64::from_be_bytes(buf))
    }

    pub fn read_fourcc(&mut self) -> Result<FourCc, DecodeError>
    {
        let mut buf = [0; 4];
        self.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// Big-endian unsigned value `width` bytes wide (1..=4), without moving the cursor.
    pub fn peek_uint(&self, width : usize) -> Result<u32, DecodeError>
    {
        let bytes = self.peek_bytes(width.min(4))?;
        Ok(bytes.iter().fold(0u32, |acc, &b| (acc << 8) | b as u32))
    }

    pub fn read_fixed_string(&mut self, n : usize) -> Result<String, DecodeError>
    {
        Ok(latin1(&self.read_bytes(n)?))
    }

    /// 4-byte length followed by that many characters. A zero length means the string is exactly
    /// 4 characters long (the packed key/class-ID convention), so 4 bytes are consumed, not 0.
    pub fn read_lstr_ascii(&mut self) -> Result<String, DecodeError>
    {
        let len = self.read_u32()?;
        let len = if len == 0 { 4 } else { len as usize };
        self.read_fixed_string(len)
    }

    /// 4-byte UTF-16 code unit count followed by that many big-endian code units.
    ///
    /// Only the first `max_units` units are decoded, and decoding stops at a NUL. The cursor always
    /// advances by the full `4 + 2 * count`, which is also returned.
    pub fn read_lstr_unicode(&mut self, max_units : usize) -> Result<(String, u64), DecodeError>
    {
        let count = self.read_u32()? as u64;
        let shown = count.min(max_units as u64) as usize;
        let raw = self.peek_bytes(shown * 2)?;
        let units : Vec<u16> = raw
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .take_while(|&u| u != 0)
            .collect();
        self.skip(count * 2);
        Ok((String::from_utf16_lossy(&units), 4 + count * 2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_are_big_endian()
    {
        let data : &[u8] = &[0x12, 0x34, 0x56, 0x78, 0x9A, 0xFF, 0xFE];
        let mut c = Cursor::new(&data, 0);
        assert_eq!(c.read_u16().unwrap(), 0x1234);
        assert_eq!(c.read_u32().unwrap(), 0x56789AFF);
        assert_eq!(c.read_u8().unwrap(), 0xFE);
        assert_eq!(c.position(), 7);
        assert!(c.read_u8().is_err());
    }

    #[test]
    fn empty_unicode_string_consumes_only_the_length()
    {
        let data : &[u8] = &[0, 0, 0, 0, 0xAA];
        let mut c = Cursor::new(&data, 0);
        let (s, used) = c.read_lstr_unicode(256).unwrap();
        assert_eq!(s, "");
        assert_eq!(used, 4);
        assert_eq!(c.position(), 4);
    }

    #[test]
    fn truncated_unicode_string_still_advances_fully()
    {
        let data : &[u8] = &[0, 0, 0, 3, 0, b'a', 0, b'b', 0, b'c', 0xEE];
        let mut c = Cursor::new(&data, 0);
        let (s, used) = c.read_lstr_unicode(2).unwrap();
        assert_eq!(s, "ab");
        assert_eq!(used, 10);
        assert_eq!(c.position(), 10);
        assert_eq!(c.read_u8().unwrap(), 0xEE);
    }

    #[test]
    fn unicode_string_stops_at_nul()
    {
        let data : &[u8] = &[0, 0, 0, 2, 0, b'x', 0, 0];
        let mut c = Cursor::new(&data, 0);
        assert_eq!(c.read_lstr_unicode(256).unwrap().0, "x");
        assert_eq!(c.position(), 8);
    }

    #[test]
    fn zero_length_ascii_string_is_four_chars()
    {
        let data : &[u8] = &[0, 0, 0, 0, b'n', b'u', b'l', b'l', 0, 0, 0, 2, b'h', b'i'];
        let mut c = Cursor::new(&data, 0);
        assert_eq!(c.read_lstr_ascii().unwrap(), "null");
        assert_eq!(c.position(), 8);
        assert_eq!(c.read_lstr_ascii().unwrap(), "hi");
        assert_eq!(c.position(), 14);
    }

    #[test]
    fn peek_does_not_move()
    {
        let data : &[u8] = &[0, 0, 1, 0];
        let c = Cursor::new(&data, 0);
        assert_eq!(c.peek_uint(4).unwrap(), 256);
        assert_eq!(c.peek_uint(3).unwrap(), 1);
        assert_eq!(c.position(), 0);
    }

    #[test]
    fn oversized_reads_fail_before_allocating()
    {
        let data : &[u8] = &[0, 0, 0, 0x7F, b'a'];
        let c = Cursor::new(&data, 0);
        assert!(matches!(c.peek_bytes(usize::MAX), Err(DecodeError::UnexpectedEof { offset : 0, .. })));
        // declared length of 0x7F000000 characters with one byte behind it
        let data : &[u8] = &[0x7F, 0, 0, 0, b'a'];
        let mut c = Cursor::new(&data, 0);
        assert!(matches!(c.read_lstr_ascii(), Err(DecodeError::UnexpectedEof { offset : 4, needed : 0x7F00_0000 })));
        assert_eq!(c.remaining(), 1);
    }
}
