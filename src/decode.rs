use alloc::format;

use enough::Stop;

#[cfg(feature = "serde_support")]
use serde::{Serialize, Deserialize};

use crate::cursor::{fourcc_str, Cursor, SIG_8BPS};
use crate::error::DecodeError;
use crate::iptc;
use crate::pixels::{check_available, decode_raw_plane, decode_rle_plane, read_row_lengths, row_bytes, Compression, PaintInto, Plane, RgbaRaster};
use crate::report::{LogSink, Reporter};
use crate::source::ByteSource;
use crate::tables::EnumFamily;

/// Which decoded pixels, if any, go into the caller's raster.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PaintTarget
{
    #[default]
    None,
    /// The merged (composite) image.
    Merged,
    /// Layer by index in file order, bottom layer first.
    Layer(usize),
}

/// Knobs for the trace layout and for painting.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodeOptions
{
    /// Indent level of the outermost lines. Each level is two spaces.
    pub base_indent : usize,
    /// Hex fields up to this many bytes stay on the label line.
    pub hex_inline_max : usize,
    /// Hex dumps stop after this many bytes.
    pub hex_max_total : usize,
    /// UTF-16 strings are shown up to this many code units.
    pub max_unicode_len : usize,
    pub paint : PaintTarget,
}

impl Default for DecodeOptions
{
    fn default() -> Self
    {
        DEFAULT_OPTIONS.clone()
    }
}

static DEFAULT_OPTIONS : DecodeOptions = DecodeOptions
{
    base_indent : 0,
    hex_inline_max : 16,
    hex_max_total : 128,
    max_unicode_len : 256,
    paint : PaintTarget::None,
};

/// Fields of the 26-byte file header that later sections are sized by.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
pub struct ImageInfo
{
    pub channels : u16,
    pub height : u32,
    pub width : u32,
    /// Bits per channel sample: 1, 8, 16 or 32.
    pub depth : u16,
    /// See [`EnumFamily::ColorMode`].
    pub color_mode : u16,
}

/// Outcome of a decode pass. The trace itself went to the sink.
#[non_exhaustive]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
pub struct PsdSummary
{
    pub info : ImageInfo,
    /// False when any block or section reported a problem. The trace says which.
    pub success : bool,
    /// From a JPEG quality resource (0x0406), on the 1 ..= 12 scale.
    pub save_as_quality : Option<u8>,
    /// Cursor position when the walk stopped.
    pub end_offset : u64,
}

/// Decode request builder.
///
/// ```
/// use psdsnoop::{DecodeRequest, LogLine, Unstoppable};
///
/// let mut psd : Vec<u8> = vec!();
/// psd.extend(b"8BPS");
/// psd.extend([0, 1, 0, 0, 0, 0, 0, 0, 0, 3, 0, 0, 0, 10, 0, 0, 0, 10, 0, 8, 0, 3]);
/// psd.extend([0; 12]);
/// psd.extend([0, 0]);
/// psd.extend([0; 3 * 10 * 10]);
///
/// let mut log : Vec<LogLine> = vec!();
/// let summary = DecodeRequest::new(&psd).decode(&mut log, None, &Unstoppable)?;
/// assert!(summary.success);
/// assert_eq!((summary.info.width, summary.info.height), (10, 10));
/// # Ok::<(), psdsnoop::DecodeError>(())
/// ```
#[derive(Clone, Copy)]
pub struct DecodeRequest<'a>
{
    src : &'a dyn ByteSource,
    offset : u64,
    options : &'a DecodeOptions,
}

impl<'a> DecodeRequest<'a>
{
    pub fn new(src : &'a dyn ByteSource) -> Self
    {
        Self { src, offset : 0, options : &DEFAULT_OPTIONS }
    }

    /// Where the data starts: the `8BPS` signature for [`decode`](Self::decode) and
    /// [`probe`](Self::probe), the first block for the others.
    pub fn at_offset(mut self, offset : u64) -> Self
    {
        self.offset = offset;
        self
    }

    pub fn with_options(mut self, options : &'a DecodeOptions) -> Self
    {
        self.options = options;
        self
    }

    /// Read only the file header, without logging anything.
    pub fn probe(&self) -> Result<ImageInfo, DecodeError>
    {
        let mut c = Cursor::new(self.src, self.offset);
        check_signature(&c)?;
        c.skip(12);
        Ok(ImageInfo
        {
            channels : c.read_u16()?,
            height : c.read_u32()?,
            width : c.read_u32()?,
            depth : c.read_u16()?,
            color_mode : c.read_u16()?,
        })
    }

    /// Full walk of a PSD file. `raster`, if given, receives the pixels chosen by
    /// [`DecodeOptions::paint`] when its size matches them; [`probe`](Self::probe) gives that size.
    pub fn decode<'w>(&self, sink : &'w mut dyn LogSink, raster : Option<&'w mut RgbaRaster>, stop : &'w dyn Stop) -> Result<PsdSummary, DecodeError>
    {
        let mut c = Cursor::new(self.src, self.offset);
        check_signature(&c)?;
        let mut w = Walker::new(sink, self.options, stop, raster);
        let success = w.psd(&mut c)?;
        Ok(w.summary(success, &c))
    }

    /// A bare run of image resource blocks `len` bytes long, as found in a JPEG APP13 segment.
    pub fn decode_resources<'w>(&self, len : u64, sink : &'w mut dyn LogSink, stop : &'w dyn Stop) -> Result<PsdSummary, DecodeError>
    {
        let mut c = Cursor::new(self.src, self.offset);
        let mut w = Walker::new(sink, self.options, stop, None);
        let success = w.resource_blocks(&mut c, 0, len)?;
        Ok(w.summary(success, &c))
    }

    /// A bare IPTC-NAA record stream `len` bytes long.
    pub fn decode_iptc(&self, len : u64, sink : &mut dyn LogSink) -> Result<bool, DecodeError>
    {
        let mut c = Cursor::new(self.src, self.offset);
        let mut rep = Reporter::new(sink, self.options);
        iptc::decode_iptc(&mut c, &mut rep, 0, len)
    }
}

fn check_signature(c : &Cursor) -> Result<(), DecodeError>
{
    let head = c.peek_bytes(6)?;
    let signature = [head[0], head[1], head[2], head[3]];
    let version = u16::from_be_bytes([head[4], head[5]]);
    if signature != SIG_8BPS || version != 1
    {
        return Err(DecodeError::NotPsd { signature, version });
    }
    Ok(())
}

/// State of one decode pass. Section parsers live in `impl Walker` blocks next to their formats.
pub(crate) struct Walker<'w>
{
    pub(crate) rep : Reporter<'w>,
    pub(crate) opts : DecodeOptions,
    pub(crate) stop : &'w dyn Stop,
    pub(crate) raster : Option<&'w mut RgbaRaster>,
    pub(crate) info : ImageInfo,
    pub(crate) save_as_quality : Option<u8>,
}

impl<'w> Walker<'w>
{
    pub(crate) fn new(sink : &'w mut dyn LogSink, opts : &DecodeOptions, stop : &'w dyn Stop, raster : Option<&'w mut RgbaRaster>) -> Self
    {
        Self
        {
            rep : Reporter::new(sink, opts),
            opts : opts.clone(),
            stop,
            raster,
            info : ImageInfo::default(),
            save_as_quality : None,
        }
    }

    fn summary(&self, success : bool, c : &Cursor) -> PsdSummary
    {
        PsdSummary { info : self.info, success, save_as_quality : self.save_as_quality, end_offset : c.position() }
    }

    /// Hex dump of the next `len` bytes, consuming them.
    pub(crate) fn dump(&mut self, c : &mut Cursor, ind : usize, label : &str, len : u64) -> Result<(), DecodeError>
    {
        let available = c.source_len().saturating_sub(c.position());
        let shown = len.min(self.rep.hex_max_total() as u64).min(available);
        let bytes = c.peek_bytes(shown as usize)?;
        self.rep.hex(ind, label, &bytes, len);
        c.skip(len);
        Ok(())
    }

    /// Whether a `width` x `height` plane may be painted. Logs when painting was wanted but the
    /// raster is the wrong size or the samples aren't 8-bit.
    pub(crate) fn paint_allowed(&mut self, ind : usize, wanted : bool, width : u32, height : u32) -> bool
    {
        if !wanted
        {
            return false;
        }
        let Some((rw, rh)) = self.raster.as_ref().map(|r| (r.width, r.height)) else { return false };
        if self.info.depth != 8
        {
            self.rep.warn(ind, &format!("WARNING: {}-bit samples are not painted.", self.info.depth));
            return false;
        }
        if (rw, rh) != (width, height)
        {
            self.rep.warn(ind, &format!(
                "WARNING: Raster size {}x{} does not match plane {}x{}. Not painting.",
                rw, rh, width, height,
            ));
            return false;
        }
        true
    }

    fn psd(&mut self, c : &mut Cursor) -> Result<bool, DecodeError>
    {
        self.rep.blank();
        self.rep.header("*** Photoshop PSD File Decoding ***");
        self.rep.note(0, "Decoding Photoshop format...");
        self.rep.blank();

        self.file_header(c, 0)?;
        self.color_mode_section(c, 0)?;

        let mut ok = self.image_resources_section(c, 0)?;
        if ok
        {
            ok = self.layer_and_mask_section(c, 0)?;
        }
        if ok
        {
            ok = self.image_data(c, 0)?;
        }
        if !ok
        {
            self.rep.error(0, "ERROR: There was a problem during decode. Aborting.");
        }
        tracing::debug!(ok, pos = c.position(), "psd decode finished");
        Ok(ok)
    }

    fn file_header(&mut self, c : &mut Cursor, ind : usize) -> Result<(), DecodeError>
    {
        self.rep.note(ind, "File Header Section:");
        let ind = ind + 1;
        let sig = c.read_fourcc()?;
        self.rep.string(ind, "Signature", &fourcc_str(&sig));
        let version = c.read_u16()?;
        self.rep.num(ind, "Version", version, "");
        let reserved1 = c.read_u32()?;
        self.rep.num(ind, "Reserved1", reserved1, "");
        let reserved2 = c.read_u16()?;
        self.rep.num(ind, "Reserved2", reserved2, "");

        self.info.channels = c.read_u16()?;
        self.rep.num(ind, "Num channels in image", self.info.channels, "");
        self.info.height = c.read_u32()?;
        self.rep.num(ind, "Image height", self.info.height, "pixels");
        self.info.width = c.read_u32()?;
        self.rep.num(ind, "Image width", self.info.width, "pixels");
        self.info.depth = c.read_u16()?;
        self.rep.num(ind, "Depth", self.info.depth, "bits per pixel");
        self.info.color_mode = c.read_u16()?;
        self.rep.enumerated(ind, "Color mode", EnumFamily::ColorMode, self.info.color_mode as u32);
        Ok(())
    }

    fn color_mode_section(&mut self, c : &mut Cursor, ind : usize) -> Result<(), DecodeError>
    {
        self.rep.note(ind, "Color Mode Data Section:");
        let ind = ind + 1;
        let len = c.read_u32()? as u64;
        self.rep.num(ind, "Length", len as u32, "");
        if len > 0
        {
            self.rep.offset(ind, "Color data", c.position());
        }
        c.skip(len);
        Ok(())
    }

    fn image_resources_section(&mut self, c : &mut Cursor, ind : usize) -> Result<bool, DecodeError>
    {
        self.rep.note(ind, "Image Resources Section:");
        let ind = ind + 1;
        let len = c.read_u32()? as u64;
        self.rep.num(ind, "Length", len as u32, "");
        let end = c.position() + len;
        let ok = self.resource_blocks(c, ind, len)?;
        c.set_position(end);
        Ok(ok)
    }

    /// Merged image: one compression method for all channels, then every channel's rows. A file that
    /// ends right after the layer section simply has no merged image.
    fn image_data(&mut self, c : &mut Cursor, ind : usize) -> Result<bool, DecodeError>
    {
        self.rep.offset(ind, "Image data section:", c.position());
        let ok = if c.remaining() == 0
        {
            self.rep.note(ind + 1, "No image data present.");
            true
        }
        else
        {
            self.image_planes(c, ind + 1)?
        };
        self.rep.offset(ind, "Image data decode complete:", c.position());
        Ok(ok)
    }

    fn image_planes(&mut self, c : &mut Cursor, ind : usize) -> Result<bool, DecodeError>
    {
        let method = c.read_u16()?;
        self.rep.enumerated(ind, "Compression method", EnumFamily::Compression, method as u32);

        let ImageInfo { channels, height, width, depth, .. } = self.info;
        let plane = Plane { height, row_bytes : row_bytes(width, depth) };
        let wants = self.opts.paint == PaintTarget::Merged;
        let paint_ok = self.paint_allowed(ind, wants, width, height);

        match Compression::from(method)
        {
            Compression::Raw =>
            {
                for ch in 0..channels
                {
                    self.stop.check()?;
                    let paint = if paint_ok { self.raster.as_deref_mut().map(|raster| PaintInto { raster, channel : ch as i16 }) } else { None };
                    if !decode_raw_plane(c, &mut self.rep, ind, plane, paint)?
                    {
                        return Ok(false);
                    }
                }
            }
            Compression::Rle =>
            {
                let count = channels as u64 * height as u64;
                if !check_available(c, &mut self.rep, ind, "RLE row length table", count * 2)
                {
                    return Ok(false);
                }
                let lengths = read_row_lengths(c, count)?;
                for (ch, rows) in lengths.chunks(height.max(1) as usize).enumerate().take(channels as usize)
                {
                    self.stop.check()?;
                    let paint = if paint_ok { self.raster.as_deref_mut().map(|raster| PaintInto { raster, channel : ch as i16 }) } else { None };
                    if !decode_rle_plane(c, &mut self.rep, ind, plane, rows, paint)?
                    {
                        return Ok(false);
                    }
                }
            }
            _ =>
            {
                self.rep.warn(ind, "WARNING: Unsupported compression method. Stopping.");
                return Ok(false);
            }
        }
        Ok(true)
    }
}
