//! Layer and Mask Information section: layer records, their channel pixel streams, the global layer
//! mask and "additional layer info" blocks.

use alloc::format;
use alloc::vec::Vec;

use crate::cursor::{fourcc_str, latin1, Cursor, FourCc, SIG_8BIM};
use crate::decode::{PaintTarget, Walker};
use crate::error::DecodeError;
use crate::pixels::{check_available, decode_raw_plane, decode_rle_plane, read_row_lengths, row_bytes, Compression, PaintInto, Plane};
use crate::tables::EnumFamily;

/// Additional layer info blocks shorter than a signature + key + length header can't start here.
/// A heuristic for trailing padding, not a format constant.
const MIN_ADDL_BLOCK : u64 = 12;

/// Keys that carry an 8-byte length in PSB files.
const LONG_LENGTH_KEYS : [&FourCc; 13] = [
    b"LMsk", b"Lr16", b"Lr32", b"Layr", b"Mt16", b"Mt32", b"Mtrn",
    b"Alph", b"FMsk", b"lnk2", b"FEid", b"FXid", b"PxSD",
];

const SIG_8B64 : FourCc = *b"8B64";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Rect
{
    pub top : i32,
    pub left : i32,
    pub bottom : i32,
    pub right : i32,
}

impl Rect
{
    pub fn width(&self) -> u32 { (self.right as i64 - self.left as i64).clamp(0, u32::MAX as i64) as u32 }
    pub fn height(&self) -> u32 { (self.bottom as i64 - self.top as i64).clamp(0, u32::MAX as i64) as u32 }
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct ChannelInfo
{
    pub id : i16,
    /// Includes the 2-byte compression method.
    pub len : u64,
}

/// What the pixel pass needs to know about one layer, gathered by the header pass.
#[derive(Clone, Debug, Default)]
pub(crate) struct LayerInfo
{
    pub rect : Rect,
    pub mask : Rect,
    pub channels : Vec<ChannelInfo>,
}

impl Walker<'_>
{
    pub(crate) fn layer_and_mask_section(&mut self, c : &mut Cursor, ind : usize) -> Result<bool, DecodeError>
    {
        self.rep.note(ind, "Layer and Mask Information Section:");
        let ind = ind + 1;
        let len = c.read_u32()? as u64;
        self.rep.num(ind, "Length", len as u32, "");
        if len == 0
        {
            return Ok(true);
        }
        let end = c.position() + len;

        if !self.layer_info(c, ind)?
        {
            return Ok(false);
        }
        if c.position() < end
        {
            self.global_layer_mask(c, ind)?;
        }
        while c.position() < end && end - c.position() > MIN_ADDL_BLOCK
        {
            if !self.additional_layer_info(c, ind)?
            {
                return Ok(false);
            }
        }
        tracing::debug!(pos = c.position(), end, "layer and mask section done, forcing to section end");
        c.set_position(end);
        Ok(true)
    }

    fn layer_info(&mut self, c : &mut Cursor, ind : usize) -> Result<bool, DecodeError>
    {
        self.rep.note(ind, "Layer Info:");
        let ind = ind + 1;
        let len = c.read_u32()? as u64;
        let len = len + len % 2;
        self.rep.num(ind, "Length", len as u32, "");
        if len == 0
        {
            return Ok(true);
        }
        let end = c.position() + len;

        let raw_count = c.read_i16()?;
        let count = raw_count.unsigned_abs() as usize;
        self.rep.num(ind, "Layer count", count as u32, "");
        if raw_count < 0
        {
            self.rep.note(ind, "First alpha channel contains transparency for merged result");
        }

        let mut layers = Vec::with_capacity(count);
        for i in 0..count
        {
            self.stop.check()?;
            self.rep.offset(ind, &format!("Layer #{}", i), c.position());
            match self.layer_record(c, ind + 1)?
            {
                Some(layer) => layers.push(layer),
                None => return Ok(false),
            }
        }

        self.rep.note(ind, "Channel Image Data:");
        for (li, layer) in layers.iter().enumerate()
        {
            for (ci, ch) in layer.channels.iter().enumerate()
            {
                self.stop.check()?;
                self.rep.note(ind + 1, &format!("Layer {:3}/{:3}, Channel {:2}/{:2}", li + 1, count, ci + 1, layer.channels.len()));
                if !self.layer_channel(c, ind + 2, li, layer, *ch)?
                {
                    return Ok(false);
                }
            }
        }

        if c.position() > end
        {
            self.rep.warn(ind, &format!(
                "WARNING: Layer info overran its length. Current pos=[0x{:08X}], expected end pos=[0x{:08X}]",
                c.position(), end,
            ));
        }
        c.set_position(end);
        Ok(true)
    }

    fn read_rect(&mut self, c : &mut Cursor, ind : usize, prefix : &str) -> Result<Rect, DecodeError>
    {
        let mut v = [0i32; 4];
        for (slot, side) in v.iter_mut().zip(["Top", "Left", "Bottom", "Right"])
        {
            *slot = c.read_i32()?;
            self.rep.num(ind, &format!("{} {}", prefix, side), *slot, "");
        }
        Ok(Rect { top : v[0], left : v[1], bottom : v[2], right : v[3] })
    }

    /// Header pass for one layer. `None` means the record was unusable and has been logged.
    fn layer_record(&mut self, c : &mut Cursor, ind : usize) -> Result<Option<LayerInfo>, DecodeError>
    {
        self.rep.note(ind, "Layer Record:");
        let ind = ind + 1;
        let rect = self.read_rect(c, ind, "Rect")?;

        let nch = c.read_u16()?;
        self.rep.num(ind, "Number of channels", nch, "");
        let mut channels = Vec::with_capacity(nch as usize);
        for i in 0..nch
        {
            let id = c.read_i16()?;
            let len = c.read_u32()? as u64;
            self.rep.field(ind + 1, &format!("Channel index #{}", i), format!("ID={:5} DataLength=0x{:08X}", id, len), "");
            channels.push(ChannelInfo { id, len });
        }

        let sig_pos = c.position();
        let sig = c.read_fourcc()?;
        self.rep.string(ind, "Blend mode signature", &fourcc_str(&sig));
        if sig != SIG_8BIM
        {
            self.rep.error(ind, &format!("ERROR: Blend mode signature unknown [{}] @ 0x{:08X}", fourcc_str(&sig), sig_pos));
            return Ok(None);
        }
        let key = c.read_u32()?;
        self.rep.enumerated(ind, "Blend mode key", EnumFamily::BlendMode, key);
        let opacity = c.read_u8()?;
        self.rep.num(ind, "Opacity", opacity, "(0=transparent ... 255=opaque)");
        let clipping = c.read_u8()?;
        self.rep.enumerated(ind, "Clipping", EnumFamily::Clipping, clipping as u32);
        let flags = c.read_u8()?;
        self.rep.field(ind, "Flags", format!("0x{:02X}", flags), "");
        self.rep.boolean(ind + 1, "Transparency protected", flags & 0x01 != 0);
        self.rep.boolean(ind + 1, "Visible", flags & 0x02 == 0);
        if flags & 0x08 != 0
        {
            self.rep.boolean(ind + 1, "Pixel data irrelevant to appearance", flags & 0x10 != 0);
        }
        let _filler = c.read_u8()?;

        let extra_len = c.read_u32()? as u64;
        self.rep.num(ind, "Extra data length", extra_len as u32, "");
        let extra_end = c.position() + extra_len;

        let mask = self.layer_mask(c, ind)?;
        self.blending_ranges(c, ind)?;

        // pascal string padded to a multiple of 4, length byte included
        let name_len = c.read_u8()? as u64;
        let name = latin1(&c.peek_bytes(name_len as usize)?);
        c.skip((name_len + 1).next_multiple_of(4) - 1);
        self.rep.string(ind, "Layer name", &name);

        while c.position() < extra_end && extra_end - c.position() >= MIN_ADDL_BLOCK
        {
            if !self.additional_layer_info(c, ind)?
            {
                return Ok(None);
            }
        }
        if c.position() > extra_end
        {
            self.rep.warn(ind, &format!(
                "WARNING: Layer extra data overran its length. Current pos=[0x{:08X}], expected end pos=[0x{:08X}]",
                c.position(), extra_end,
            ));
        }
        c.set_position(extra_end);

        Ok(Some(LayerInfo { rect, mask, channels }))
    }

    /// Layer mask / adjustment layer data. Always leaves the cursor at the sub-block's declared end.
    fn layer_mask(&mut self, c : &mut Cursor, ind : usize) -> Result<Rect, DecodeError>
    {
        self.rep.note(ind, "Layer Mask / Adjustment layer data:");
        let ind = ind + 1;
        let len = c.read_u32()? as u64;
        self.rep.num(ind, "Length", len as u32, "");
        if len == 0
        {
            return Ok(Rect::default());
        }
        let end = c.position() + len;

        let rect = self.read_rect(c, ind, "Rect")?;
        let default_color = c.read_u8()?;
        self.rep.num(ind, "Default color", default_color, "");
        let flags = c.read_u8()?;
        self.rep.field(ind, "Flags", format!("0x{:02X}", flags), "");
        self.rep.boolean(ind + 1, "Position relative to layer", flags & 0x01 != 0);
        self.rep.boolean(ind + 1, "Layer mask disabled", flags & 0x02 != 0);
        self.rep.boolean(ind + 1, "Invert layer mask when blending", flags & 0x04 != 0);

        if flags & 0x10 != 0 && c.position() < end
        {
            let params = c.read_u8()?;
            self.rep.field(ind, "Mask parameters", format!("0x{:02X}", params), "");
            if params & 0x01 != 0
            {
                let v = c.read_u8()?;
                self.rep.num(ind + 1, "User mask density", v, "");
            }
            if params & 0x02 != 0
            {
                let bits = c.read_u64()?;
                self.rep.double(ind + 1, "User mask feather", bits, "");
            }
            if params & 0x04 != 0
            {
                let v = c.read_u8()?;
                self.rep.num(ind + 1, "Vector mask density", v, "");
            }
            if params & 0x08 != 0
            {
                let bits = c.read_u64()?;
                self.rep.double(ind + 1, "Vector mask feather", bits, "");
            }
        }
        if len == 20
        {
            let pad = c.read_u16()?;
            self.rep.num(ind, "Padding", pad, "");
        }
        else if end.saturating_sub(c.position()) >= 18
        {
            let real_flags = c.read_u8()?;
            self.rep.field(ind, "Real Flags", format!("0x{:02X}", real_flags), "");
            let real_bg = c.read_u8()?;
            self.rep.num(ind, "Real user mask background", real_bg, "");
            self.read_rect(c, ind, "Real Rect")?;
        }
        c.set_position(end);
        Ok(rect)
    }

    fn blending_ranges(&mut self, c : &mut Cursor, ind : usize) -> Result<(), DecodeError>
    {
        self.rep.note(ind, "Layer blending ranges data:");
        let ind = ind + 1;
        let len = c.read_u32()? as u64;
        self.rep.num(ind, "Length", len as u32, "");
        let end = c.position() + len;
        if len >= 8
        {
            let src = c.read_u32()?;
            self.rep.field(ind, "Composite gray blend source", format!("0x{:08X}", src), "");
            let dst = c.read_u32()?;
            self.rep.field(ind, "Composite gray blend destination", format!("0x{:08X}", dst), "");
            let mut n = 0;
            while c.position() + 8 <= end
            {
                let src = c.read_u32()?;
                self.rep.field(ind, &format!("Channel {} source range", n), format!("0x{:08X}", src), "");
                let dst = c.read_u32()?;
                self.rep.field(ind, &format!("Channel {} destination range", n), format!("0x{:08X}", dst), "");
                n += 1;
            }
        }
        c.set_position(end);
        Ok(())
    }

    /// Pixel pass for one channel of layer `li`. The cursor always ends at the channel's declared end
    /// unless the pixel data is truncated or its RLE rows are broken.
    fn layer_channel(&mut self, c : &mut Cursor, ind : usize, li : usize, layer : &LayerInfo, ch : ChannelInfo) -> Result<bool, DecodeError>
    {
        let start = c.position();
        let end = start + ch.len;
        if ch.len < 2
        {
            self.rep.num(ind, "Channel data length", ch.len as u32, "bytes");
            c.set_position(end);
            return Ok(true);
        }
        let method = c.read_u16()?;
        self.rep.enumerated(ind, "Compression method", EnumFamily::Compression, method as u32);

        let rect = if ch.id == -2 || ch.id == -3 { layer.mask } else { layer.rect };
        let (width, height) = (rect.width(), rect.height());
        let plane = Plane { height, row_bytes : row_bytes(width, self.info.depth) };
        let wants = self.opts.paint == PaintTarget::Layer(li);
        let paint_ok = self.paint_allowed(ind, wants, width, height);

        match Compression::from(method)
        {
            Compression::Raw =>
            {
                let paint = if paint_ok { self.raster.as_deref_mut().map(|raster| PaintInto { raster, channel : ch.id }) } else { None };
                if !decode_raw_plane(c, &mut self.rep, ind, plane, paint)?
                {
                    return Ok(false);
                }
            }
            Compression::Rle =>
            {
                if !check_available(c, &mut self.rep, ind, "RLE row length table", height as u64 * 2)
                {
                    return Ok(false);
                }
                let lengths = read_row_lengths(c, height as u64)?;
                let paint = if paint_ok { self.raster.as_deref_mut().map(|raster| PaintInto { raster, channel : ch.id }) } else { None };
                if !decode_rle_plane(c, &mut self.rep, ind, plane, &lengths, paint)?
                {
                    return Ok(false);
                }
            }
            _ =>
            {
                self.rep.warn(ind, "WARNING: Unsupported compression method. Skipping channel.");
                c.set_position(end);
                return Ok(true);
            }
        }

        if c.position() != end
        {
            self.rep.warn(ind, &format!(
                "WARNING: Channel data length mismatch. Current pos=[0x{:08X}], expected end pos=[0x{:08X}]",
                c.position(), end,
            ));
            c.set_position(end);
        }
        Ok(true)
    }

    /// Global layer mask info: fixed fields, then forced to the declared end.
    fn global_layer_mask(&mut self, c : &mut Cursor, ind : usize) -> Result<(), DecodeError>
    {
        self.rep.note(ind, "Global layer mask info:");
        let ind = ind + 1;
        let len = c.read_u32()? as u64;
        self.rep.num(ind, "Length", len as u32, "");
        if len == 0
        {
            return Ok(());
        }
        let end = c.position() + len;
        if len >= 13
        {
            let space = c.read_u16()?;
            self.rep.num(ind, "Overlay color space", space, "");
            for i in 0..4
            {
                let comp = c.read_u16()?;
                self.rep.num(ind, &format!("Color component {}", i), comp, "");
            }
            let opacity = c.read_u16()?;
            self.rep.num(ind, "Opacity", opacity, "(0=transparent ... 100=opaque)");
            let kind = c.read_u8()?;
            self.rep.num(ind, "Kind", kind, "");
        }
        else
        {
            self.dump(c, ind, "Data", len)?;
        }
        c.set_position(end);
        Ok(())
    }

    /// One "additional layer info" block. A bad signature fails the enclosing walk.
    fn additional_layer_info(&mut self, c : &mut Cursor, ind : usize) -> Result<bool, DecodeError>
    {
        self.rep.note(ind, "Additional layer info:");
        let ind = ind + 1;
        let sig_pos = c.position();
        let sig = c.read_fourcc()?;
        if sig != SIG_8BIM && sig != SIG_8B64
        {
            self.rep.error(ind, &format!("ERROR: Addtl Layer Info signature unknown [{}] @ 0x{:08X}", fourcc_str(&sig), sig_pos));
            return Ok(false);
        }
        let key = c.read_fourcc()?;
        let key_str = fourcc_str(&key);
        self.rep.string(ind, "Key", &key_str);
        let len = c.read_u32()? as u64;
        self.rep.num(ind, "Length", len as u32, "");
        if LONG_LENGTH_KEYS.contains(&&key)
        {
            self.rep.note(ind, "NOTE: 8-byte length form of this key is unsupported; using the 4-byte length.");
        }
        let start = c.position();

        match &key
        {
            b"luni" =>
            {
                let (name, _) = c.read_lstr_unicode(self.opts.max_unicode_len)?;
                self.rep.string(ind, "Layer Name (Unicode)", &name);
            }
            b"lnsr" =>
            {
                let id = c.read_fourcc()?;
                self.rep.string(ind, "Layer Name Source ID", &fourcc_str(&id));
            }
            b"lyid" =>
            {
                let id = c.read_u32()?;
                self.rep.num(ind, "Layer ID", id, "");
            }
            b"clbl" =>
            {
                let v = c.read_u8()?;
                self.rep.boolean(ind, "Blend clipped elements", v != 0);
            }
            b"infx" =>
            {
                let v = c.read_u8()?;
                self.rep.boolean(ind, "Blend interior elements", v != 0);
            }
            b"knko" =>
            {
                let v = c.read_u8()?;
                self.rep.boolean(ind, "Knockout", v != 0);
            }
            b"lsct" =>
            {
                let kind = c.read_u32()?;
                self.rep.enumerated(ind, "Section divider type", EnumFamily::SectionDivider, kind);
                if len >= 12
                {
                    let _sig = c.read_fourcc()?;
                    let blend = c.read_u32()?;
                    self.rep.enumerated(ind, "Blend mode key", EnumFamily::BlendMode, blend);
                }
            }
            b"iOpa" =>
            {
                let v = c.read_u8()?;
                self.rep.num(ind, "Fill opacity", v, "");
            }
            b"tsly" =>
            {
                let v = c.read_u8()?;
                self.rep.boolean(ind, "Transparency shapes layer", v != 0);
            }
            b"lspf" =>
            {
                let v = c.read_u32()?;
                self.rep.field(ind, "Protection flags", format!("0x{:08X}", v), "");
            }
            b"lclr" =>
            {
                let v = c.read_u16()?;
                self.rep.enumerated(ind, "Sheet color", EnumFamily::SheetColor, v as u32);
            }
            _ => self.dump(c, ind, &key_str, len)?,
        }

        c.set_position(start + len);
        c.skip((4 - len % 4) % 4);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use crate::report::{LogLine, Severity};
    use crate::pixels::RgbaRaster;
    use crate::{DecodeOptions, ImageInfo};

    fn run(data : &[u8], opts : DecodeOptions, raster : Option<&mut RgbaRaster>) -> (bool, u64, Vec<LogLine>)
    {
        let mut log : Vec<LogLine> = vec!();
        let stop = enough::Unstoppable;
        let mut w = Walker::new(&mut log, &opts, &stop, raster);
        w.info = ImageInfo { channels : 3, height : 2, width : 2, depth : 8, color_mode : 3 };
        let mut c = Cursor::new(&data, 0);
        let ok = w.layer_and_mask_section(&mut c, 0).unwrap();
        drop(w);
        (ok, c.position(), log)
    }

    /// One 2x2 layer with the given channel ids, each stored raw with value `id + 10`.
    fn one_layer(count : i16, ids : &[i16], addl : &[u8]) -> Vec<u8>
    {
        let mut rec : Vec<u8> = vec!();
        for v in [0i32, 0, 2, 2]
        {
            rec.extend(v.to_be_bytes());
        }
        rec.extend((ids.len() as u16).to_be_bytes());
        for &id in ids
        {
            rec.extend(id.to_be_bytes());
            rec.extend(6u32.to_be_bytes());
        }
        rec.extend(b"8BIMnorm");
        rec.extend([255, 0, 0, 0]);
        let mut extra : Vec<u8> = vec!();
        extra.extend(0u32.to_be_bytes());
        extra.extend(0u32.to_be_bytes());
        extra.extend([3, b'b', b'g', b'!']);
        extra.extend(addl);
        rec.extend((extra.len() as u32).to_be_bytes());
        rec.extend(extra);
        for &id in ids
        {
            rec.extend(0u16.to_be_bytes());
            rec.extend([(id + 10) as u8; 4]);
        }

        let mut info : Vec<u8> = vec!();
        info.extend(count.to_be_bytes());
        info.extend(rec);
        if info.len() % 2 == 1
        {
            info.push(0);
        }

        let mut section : Vec<u8> = vec!();
        section.extend((info.len() as u32).to_be_bytes());
        section.extend(info);
        section.extend(0u32.to_be_bytes());

        let mut out : Vec<u8> = vec!();
        out.extend((section.len() as u32).to_be_bytes());
        out.extend(section);
        out
    }

    #[test]
    fn empty_section()
    {
        let (ok, pos, log) = run(&[0, 0, 0, 0], DecodeOptions::default(), None);
        assert!(ok);
        assert_eq!(pos, 4);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn zero_layer_count()
    {
        let data = [0, 0, 0, 10, 0, 0, 0, 2, 0, 0, 0, 0, 0, 0];
        let (ok, pos, log) = run(&data, DecodeOptions::default(), None);
        assert!(ok);
        assert_eq!(pos, 14);
        assert!(log.iter().any(|l| l.text.contains("Layer count") && l.text.ends_with("= 0")));
    }

    #[test]
    fn negative_layer_count_flags_merged_alpha()
    {
        let data = one_layer(-1, &[0, 1, 2], &[]);
        let (ok, pos, log) = run(&data, DecodeOptions::default(), None);
        assert!(ok);
        assert_eq!(pos, data.len() as u64);
        assert!(log.iter().any(|l| l.text.contains("Layer count") && l.text.ends_with("= 1")));
        assert!(log.iter().any(|l| l.text.contains("First alpha channel contains transparency for merged result")));
        assert!(log.iter().any(|l| l.text.contains("Layer name") && l.text.ends_with("\"bg!\"")));
        assert!(log.iter().any(|l| l.text.ends_with("= normal")));
        let passes : Vec<&str> = log.iter().map(|l| l.text.trim()).filter(|t| t.starts_with("Layer   ")).collect();
        assert_eq!(passes, ["Layer   1/  1, Channel  1/ 3", "Layer   1/  1, Channel  2/ 3", "Layer   1/  1, Channel  3/ 3"]);
        assert!(!log.iter().any(|l| l.severity != Severity::Info));
    }

    #[test]
    fn layer_paints_into_raster()
    {
        let data = one_layer(1, &[-1, 0, 1, 2], &[]);
        let mut raster = RgbaRaster::new(2, 2);
        let mut opts = DecodeOptions::default();
        opts.paint = PaintTarget::Layer(0);
        let (ok, _, _) = run(&data, opts, Some(&mut raster));
        assert!(ok);
        assert_eq!(raster.pixel(0, 0), Some([10, 11, 12, 0]));
        assert_eq!(raster.pixel(1, 1), Some([10, 11, 12, 0]));
    }

    #[test]
    fn mismatched_raster_is_left_alone()
    {
        let data = one_layer(1, &[0], &[]);
        let mut raster = RgbaRaster::new(3, 3);
        let mut opts = DecodeOptions::default();
        opts.paint = PaintTarget::Layer(0);
        let (ok, _, log) = run(&data, opts, Some(&mut raster));
        assert!(ok);
        assert!(raster.data.iter().all(|&b| b == 0));
        assert!(log.iter().any(|l| l.severity == Severity::Warning && l.text.contains("Raster size")));
    }

    #[test]
    fn additional_info_keys_inside_a_layer()
    {
        let mut addl : Vec<u8> = vec!();
        addl.extend(b"8BIMlyid");
        addl.extend(4u32.to_be_bytes());
        addl.extend(77u32.to_be_bytes());
        addl.extend(b"8BIMluni");
        addl.extend(12u32.to_be_bytes());
        addl.extend(2u32.to_be_bytes());
        addl.extend([0, b'h', 0, b'i']);
        addl.extend([0, 0, 0, 0]);
        let data = one_layer(1, &[0], &addl);
        let (ok, pos, log) = run(&data, DecodeOptions::default(), None);
        assert!(ok);
        assert_eq!(pos, data.len() as u64);
        assert!(log.iter().any(|l| l.text.contains("Layer ID") && l.text.ends_with("= 77")));
        assert!(log.iter().any(|l| l.text.contains("Layer Name (Unicode)") && l.text.ends_with("\"hi\"")));
    }

    #[test]
    fn bad_additional_signature_fails()
    {
        let mut addl : Vec<u8> = vec!();
        addl.extend(b"XXXXlyid");
        addl.extend(4u32.to_be_bytes());
        addl.extend(77u32.to_be_bytes());
        let data = one_layer(1, &[0], &addl);
        let (ok, _, log) = run(&data, DecodeOptions::default(), None);
        assert!(!ok);
        assert!(log.iter().any(|l| l.severity == Severity::Error && l.text.contains("Addtl Layer Info signature unknown [XXXX]")));
    }

    #[test]
    fn rect_sizes_never_go_negative()
    {
        let r = Rect { top : 5, left : 5, bottom : 1, right : 9 };
        assert_eq!(r.height(), 0);
        assert_eq!(r.width(), 4);
    }

    #[test]
    fn truncated_channel_data_fails_the_section()
    {
        let mut data = one_layer(1, &[0, 1], &[]);
        data.truncate(data.len() - 8);
        let mut log : Vec<LogLine> = vec!();
        let opts = DecodeOptions::default();
        let stop = enough::Unstoppable;
        let mut w = Walker::new(&mut log, &opts, &stop, None);
        w.info = ImageInfo { channels : 3, height : 2, width : 2, depth : 8, color_mode : 3 };
        let mut c = Cursor::new(&data, 0);
        let ok = w.layer_and_mask_section(&mut c, 0).unwrap();
        drop(w);
        assert!(!ok);
        assert!(log.iter().any(|l| l.severity == Severity::Error && l.text.contains("Raw channel data truncated")));
    }
}
