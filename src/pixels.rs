//! Channel pixel streams: raw rows, PackBits rows with their row-length directory, and the RGBA
//! raster they can be painted into.

use alloc::format;
use alloc::vec;
use alloc::vec::Vec;

use crate::cursor::Cursor;
use crate::error::DecodeError;
use crate::report::Reporter;

/// Caller-owned RGBA8 raster, stored bottom-up: source row 0 lands in the last row of `data`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RgbaRaster
{
    pub width : u32,
    pub height : u32,
    pub data : Vec<u8>,
}

impl RgbaRaster
{
    pub fn new(width : u32, height : u32) -> Self
    {
        Self { width, height, data : vec![0; width as usize * height as usize * 4] }
    }

    /// The four bytes stored for source pixel (`x`, `y`), with `y` counted from the top of the image.
    pub fn pixel(&self, x : u32, y : u32) -> Option<[u8; 4]>
    {
        if x >= self.width || y >= self.height
        {
            return None;
        }
        let i = self.index(x, y);
        self.data.get(i..i + 4).map(|p| [p[0], p[1], p[2], p[3]])
    }

    fn index(&self, x : u32, y : u32) -> usize
    {
        let row_actual = (self.height - 1 - y) as usize;
        (row_actual * self.width as usize + x as usize) * 4
    }

    /// Write one source row of 8-bit samples into the R, G or B component (channel 0, 1 or 2).
    /// Other channel IDs are ignored. Alpha is forced to 0.
    pub(crate) fn plot_row(&mut self, channel : i16, row : u32, samples : &[u8])
    {
        if !(0..=2).contains(&channel) || row >= self.height
        {
            return;
        }
        for (x, &v) in samples.iter().take(self.width as usize).enumerate()
        {
            let i = self.index(x as u32, row);
            if let Some(px) = self.data.get_mut(i..i + 4)
            {
                px[channel as usize] = v;
                px[3] = 0;
            }
        }
    }
}

/// Compression method of a channel or of the merged image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Compression
{
    Raw,
    Rle,
    Zip,
    ZipPredicted,
    Other(u16),
}

impl From<u16> for Compression
{
    fn from(v : u16) -> Self
    {
        match v
        {
            0 => Compression::Raw,
            1 => Compression::Rle,
            2 => Compression::Zip,
            3 => Compression::ZipPredicted,
            n => Compression::Other(n),
        }
    }
}

/// Bytes per row for `width` samples at `depth` bits per sample.
pub fn row_bytes(width : u32, depth : u16) -> u64
{
    let w = width as u64;
    match depth
    {
        1 => w.div_ceil(8),
        16 => w * 2,
        32 => w * 4,
        _ => w,
    }
}

/// PackBits as Photoshop writes it. Control byte `n` as i8: `0..=127` copies the next `n + 1` bytes,
/// `-128..=-1` repeats the next byte `1 - n` times (so `-128` gives 129 copies). Output is appended to
/// `out`; a run cut short by the end of `src` keeps whatever bytes were present.
pub fn unpack_bits(src : &[u8], out : &mut Vec<u8>)
{
    let mut i = 0;
    while i < src.len()
    {
        let n = src[i] as i8;
        i += 1;
        if n >= 0
        {
            let end = (i + n as usize + 1).min(src.len());
            out.extend_from_slice(&src[i..end]);
            i = end;
        }
        else
        {
            let Some(&b) = src.get(i) else { break };
            out.extend(core::iter::repeat_n(b, (1 - n as i32) as usize));
            i += 1;
        }
    }
}

/// Geometry of one channel plane.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Plane
{
    pub height : u32,
    pub row_bytes : u64,
}

/// Where decoded rows of one plane go, if anywhere.
pub(crate) struct PaintInto<'r>
{
    pub raster : &'r mut RgbaRaster,
    pub channel : i16,
}

pub(crate) fn read_row_lengths(c : &mut Cursor, count : u64) -> Result<Vec<u16>, DecodeError>
{
    let mut lengths = vec!();
    for _ in 0..count
    {
        lengths.push(c.read_u16()?);
    }
    Ok(lengths)
}

/// Whether `need` more bytes exist. Logs an error naming `what` when they don't.
pub(crate) fn check_available(c : &Cursor, rep : &mut Reporter, ind : usize, what : &str, need : u64) -> bool
{
    if need <= c.remaining()
    {
        return true;
    }
    rep.error(ind, &format!(
        "ERROR: {} truncated. Need {} bytes @ 0x{:08X}, {} available.",
        what, need, c.position(), c.remaining(),
    ));
    false
}

/// Uncompressed rows, `row_bytes` each. A plane that doesn't fit in the source is logged and fails
/// without consuming anything.
pub(crate) fn decode_raw_plane(c : &mut Cursor, rep : &mut Reporter, ind : usize, plane : Plane, mut paint : Option<PaintInto>) -> Result<bool, DecodeError>
{
    let total = plane.row_bytes.saturating_mul(plane.height as u64);
    if !check_available(c, rep, ind, "Raw channel data", total)
    {
        return Ok(false);
    }
    for row in 0..plane.height
    {
        if let Some(p) = paint.as_mut()
        {
            let samples = c.read_bytes(plane.row_bytes as usize)?;
            p.raster.plot_row(p.channel, row, &samples);
        }
        else
        {
            c.skip(plane.row_bytes);
        }
    }
    Ok(true)
}

/// PackBits rows whose compressed sizes were already read into `lengths`, one per row.
///
/// Each row must unpack to exactly `row_bytes`; the first row that doesn't is logged and the plane
/// reports failure with the cursor left after that row.
pub(crate) fn decode_rle_plane(
    c : &mut Cursor,
    rep : &mut Reporter,
    ind : usize,
    plane : Plane,
    lengths : &[u16],
    mut paint : Option<PaintInto>,
) -> Result<bool, DecodeError>
{
    let mut row_buf = vec!();
    for (row, &len) in lengths.iter().enumerate().take(plane.height as usize)
    {
        if !check_available(c, rep, ind, "RLE row data", len as u64)
        {
            return Ok(false);
        }
        let packed = c.read_bytes(len as usize)?;
        row_buf.clear();
        unpack_bits(&packed, &mut row_buf);
        if row_buf.len() as u64 != plane.row_bytes
        {
            rep.error(ind, &format!(
                "ERROR: RLE row {} decoded to {} bytes, expected {}",
                row, row_buf.len(), plane.row_bytes,
            ));
            return Ok(false);
        }
        if let Some(p) = paint.as_mut()
        {
            p.raster.plot_row(p.channel, row as u32, &row_buf);
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::LogLine;
    use crate::DecodeOptions;

    #[test]
    fn literal_run()
    {
        let mut out = vec!();
        unpack_bits(&[2, 10, 20, 30], &mut out);
        assert_eq!(out, [10, 20, 30]);
    }

    #[test]
    fn replicate_run()
    {
        let mut out = vec!();
        unpack_bits(&[(1i8 - 5) as u8, 0xAB], &mut out);
        assert_eq!(out, [0xAB; 5]);
    }

    #[test]
    fn longest_runs()
    {
        let mut src = vec![127u8];
        src.extend(0..128u8);
        src.push((1i16 - 128) as i8 as u8);
        src.push(7);
        let mut out = vec!();
        unpack_bits(&src, &mut out);
        assert_eq!(out.len(), 256);
        assert_eq!(&out[..128], &(0..128u8).collect::<Vec<_>>()[..]);
        assert!(out[128..].iter().all(|&b| b == 7));
    }

    #[test]
    fn control_0x80_repeats_129_times()
    {
        let mut out = vec!();
        unpack_bits(&[0x80, 0x41, 0x00, 0x42], &mut out);
        assert_eq!(out.len(), 130);
        assert!(out[..129].iter().all(|&b| b == 0x41));
        assert_eq!(out[129], 0x42);
    }

    #[test]
    fn truncated_run_keeps_what_exists()
    {
        let mut out = vec!();
        unpack_bits(&[4, 1, 2], &mut out);
        assert_eq!(out, [1, 2]);
        out.clear();
        unpack_bits(&[0xFE], &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn row_widths_follow_depth()
    {
        assert_eq!(row_bytes(10, 8), 10);
        assert_eq!(row_bytes(10, 16), 20);
        assert_eq!(row_bytes(10, 32), 40);
        assert_eq!(row_bytes(10, 1), 2);
        assert_eq!(row_bytes(8, 1), 1);
    }

    #[test]
    fn raster_is_bottom_up_with_zero_alpha()
    {
        let mut r = RgbaRaster::new(2, 2);
        r.data.iter_mut().for_each(|b| *b = 0xFF);
        r.plot_row(1, 0, &[5, 6]);
        assert_eq!(r.pixel(0, 0), Some([0xFF, 5, 0xFF, 0]));
        assert_eq!(&r.data[8..12], &[0xFF, 5, 0xFF, 0]);
        r.plot_row(3, 1, &[9, 9]);
        assert_eq!(r.pixel(0, 1), Some([0xFF; 4]));
        assert_eq!(r.pixel(2, 0), None);
    }

    #[test]
    fn rle_plane_rejects_short_rows()
    {
        let data : &[u8] = &[2, 1, 2, 3, 0, 9];
        let mut c = Cursor::new(&data, 0);
        let mut log : Vec<LogLine> = vec!();
        let opts = DecodeOptions::default();
        let mut rep = Reporter::new(&mut log, &opts);
        let plane = Plane { height : 2, row_bytes : 3 };
        assert!(!decode_rle_plane(&mut c, &mut rep, 0, plane, &[4, 2], None).unwrap());
        assert_eq!(c.position(), 6);
        assert!(log.iter().any(|l| l.text.contains("RLE row 1 decoded to 1 bytes, expected 3")));
    }

    #[test]
    fn rle_plane_paints_rows()
    {
        let data : &[u8] = &[0xFF, 7, 1, 1, 2];
        let mut c = Cursor::new(&data, 0);
        let mut log : Vec<LogLine> = vec!();
        let opts = DecodeOptions::default();
        let mut rep = Reporter::new(&mut log, &opts);
        let mut raster = RgbaRaster::new(2, 2);
        let plane = Plane { height : 2, row_bytes : 2 };
        let paint = Some(PaintInto { raster : &mut raster, channel : 0 });
        assert!(decode_rle_plane(&mut c, &mut rep, 0, plane, &[2, 3], paint).unwrap());
        assert_eq!(raster.pixel(1, 0), Some([7, 0, 0, 0]));
        assert_eq!(raster.pixel(1, 1), Some([2, 0, 0, 0]));
        assert!(log.is_empty());
    }

    #[test]
    fn truncated_raw_plane_fails_in_place()
    {
        let data : &[u8] = &[1, 2, 3];
        let mut c = Cursor::new(&data, 0);
        let mut log : Vec<LogLine> = vec!();
        let opts = DecodeOptions::default();
        let mut rep = Reporter::new(&mut log, &opts);
        let plane = Plane { height : 2, row_bytes : 2 };
        assert!(!decode_raw_plane(&mut c, &mut rep, 0, plane, None).unwrap());
        assert_eq!(c.position(), 0);
        assert!(log.iter().any(|l| l.text == "ERROR: Raw channel data truncated. Need 4 bytes @ 0x00000000, 3 available."));
    }

    #[test]
    fn truncated_rle_row_fails()
    {
        let data : &[u8] = &[0xFF, 7, 1];
        let mut c = Cursor::new(&data, 0);
        let mut log : Vec<LogLine> = vec!();
        let opts = DecodeOptions::default();
        let mut rep = Reporter::new(&mut log, &opts);
        let plane = Plane { height : 2, row_bytes : 2 };
        assert!(!decode_rle_plane(&mut c, &mut rep, 0, plane, &[2, 3], None).unwrap());
        assert_eq!(c.position(), 2);
        assert!(log.iter().any(|l| l.text.starts_with("ERROR: RLE row data truncated.")));
    }
}
