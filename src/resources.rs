//! Image resource blocks ("8BIM" IRBs) and their per-ID payload handlers.

use alloc::format;

use crate::cursor::{fourcc_str, latin1, Cursor, SIG_8BIM};
use crate::decode::Walker;
use crate::error::DecodeError;
use crate::iptc::decode_iptc;
use crate::tables::{find_resource_record, EnumFamily, ResourceKind};

/// How one resource block went.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Block
{
    Parsed,
    /// Logged and resynced to the block end; later blocks are still walked.
    Failed,
    /// Bad signature; the rest of the run can't be trusted.
    Abort,
}

impl Walker<'_>
{
    /// A packed run of resource blocks occupying `[pos, pos + len)`.
    pub(crate) fn resource_blocks(&mut self, c : &mut Cursor, ind : usize, len : u64) -> Result<bool, DecodeError>
    {
        let end = c.position() + len;
        let mut ok = true;
        while c.position() < end
        {
            self.stop.check()?;
            match self.resource_block(c, ind)?
            {
                Block::Parsed => {}
                Block::Failed => ok = false,
                Block::Abort => return Ok(false),
            }
        }
        Ok(ok)
    }

    fn resource_block(&mut self, c : &mut Cursor, ind : usize) -> Result<Block, DecodeError>
    {
        let sig_pos = c.position();
        let sig = c.read_fourcc()?;
        if sig != SIG_8BIM
        {
            self.rep.error(ind, &format!("ERROR: IRB signature unknown [{}] @ 0x{:08X}", fourcc_str(&sig), sig_pos));
            return Ok(Block::Abort);
        }
        let id = c.read_u16()?;
        // pascal name, padded so length byte + text is even
        let name_len = c.read_u8()? as usize;
        let name = latin1(&c.read_bytes(name_len)?);
        if name_len % 2 == 0
        {
            c.skip(1);
        }
        let len = c.read_u32()? as u64;
        let record = find_resource_record(id);

        self.rep.note(ind, &format!(
            "8BIM: [0x{:04X}] Name=\"{}\" Len=[0x{:04X}] DefinedName=\"{}\"",
            id, name, len, record.map(|r| r.name).unwrap_or("?"),
        ));
        if len == 0
        {
            self.rep.note(ind + 1, "Length is zero. Skipping.");
            return Ok(Block::Parsed);
        }

        let start = c.position();
        let end = start + len;
        let ind = ind + 1;
        let kind = record.map(|r| r.kind).unwrap_or(ResourceKind::Unknown);
        tracing::trace!(id, start, len, ?kind, "resource block");

        let mut result = Block::Parsed;
        if kind == ResourceKind::Unknown
        {
            self.dump(c, ind, "Data", len)?;
        }
        else
        {
            match self.resource_payload(c, ind, kind, len)
            {
                Ok(true) => {}
                Ok(false) => result = Block::Failed,
                Err(DecodeError::UnexpectedEof { offset, .. }) =>
                {
                    self.rep.error(ind, &format!(
                        "ERROR: Parsing ran past the end of the data. BIM=[0x{:04X}], CurPos=[0x{:08X}], ExpPosEnd=[0x{:08X}], ExpLen=[{}]",
                        id, offset, end, len,
                    ));
                    c.set_position(end);
                    result = Block::Failed;
                }
                Err(e) => return Err(e),
            }
            let pos = c.position();
            if pos > end
            {
                self.rep.error(ind, &format!(
                    "ERROR: Parsing exceeded expected length. Stopping decode. BIM=[0x{:04X}], CurPos=[0x{:08X}], ExpPosEnd=[0x{:08X}], ExpLen=[{}]",
                    id, pos, end, len,
                ));
                result = Block::Failed;
            }
            else if pos < end
            {
                self.rep.warn(ind, &format!(
                    "WARNING: Parsing offset length mismatch. Current pos=[0x{:08X}], expected end pos=[0x{:08X}], expect length=[{}]",
                    pos, end, len,
                ));
                result = Block::Failed;
            }
        }
        c.set_position(end);
        if len % 2 == 1
        {
            c.skip(1);
        }
        Ok(result)
    }

    fn resource_payload(&mut self, c : &mut Cursor, ind : usize, kind : ResourceKind, len : u64) -> Result<bool, DecodeError>
    {
        let end = c.position() + len;
        match kind
        {
            ResourceKind::Unknown | ResourceKind::Hex => self.dump(c, ind, "Data", len)?,
            ResourceKind::AsciiString =>
            {
                let s = c.read_fixed_string(len as usize)?;
                self.rep.string(ind, "String", s.trim_end_matches('\0'));
            }
            ResourceKind::AsciiStringLong =>
            {
                let s = c.read_fixed_string(len as usize)?;
                self.rep.note(ind, "String:");
                for line in s.trim_end_matches('\0').lines()
                {
                    self.rep.note(ind + 1, line);
                }
            }
            ResourceKind::UnicodeString =>
            {
                while c.position() < end
                {
                    let (s, _) = c.read_lstr_unicode(self.opts.max_unicode_len)?;
                    self.rep.string(ind, "String", &s);
                }
            }
            ResourceKind::Thumbnail => self.thumbnail(c, ind, end)?,
            ResourceKind::Slices => return self.slices(c, ind, end),
            ResourceKind::Descriptor => return self.versioned_descriptor(c, ind, end),
            ResourceKind::VersionInfo =>
            {
                let version = c.read_u32()?;
                self.rep.num(ind, "Version", version, "");
                let merged = c.read_u8()?;
                self.rep.boolean(ind, "hasRealMergedData", merged != 0);
                let (writer, _) = c.read_lstr_unicode(self.opts.max_unicode_len)?;
                self.rep.string(ind, "Writer name", &writer);
                let (reader, _) = c.read_lstr_unicode(self.opts.max_unicode_len)?;
                self.rep.string(ind, "Reader name", &reader);
                let file_version = c.read_u32()?;
                self.rep.num(ind, "File version", file_version, "");
            }
            ResourceKind::PrintScale =>
            {
                let style = c.read_u16()?;
                self.rep.enumerated(ind, "Style", EnumFamily::PrintScaleStyle, style as u32);
                for label in ["X location", "Y location", "Scale"]
                {
                    let bits = c.read_u32()?;
                    self.rep.float(ind, label, bits, "");
                }
            }
            ResourceKind::PixelAspectRatio =>
            {
                let version = c.read_u32()?;
                self.rep.num(ind, "Version", version, "");
                let bits = c.read_u64()?;
                self.rep.double(ind, "X / Y Ratio", bits, "");
            }
            ResourceKind::DocSpecificSeed =>
            {
                let seed = c.read_u32()?;
                self.rep.num(ind, "Base value", seed, "");
            }
            ResourceKind::ResolutionInfo =>
            {
                for (res, unit, dim) in [
                    ("Horizontal resolution", "Horizontal resolution unit", "Width unit"),
                    ("Vertical resolution", "Vertical resolution unit", "Height unit"),
                ]
                {
                    let fixed = c.read_u32()?;
                    self.rep.fixed(ind, res, fixed, "");
                    let res_unit = c.read_u16()?;
                    self.rep.enumerated(ind, unit, EnumFamily::ResolutionUnit, res_unit as u32);
                    let dim_unit = c.read_u16()?;
                    self.rep.enumerated(ind, dim, EnumFamily::DimensionUnit, dim_unit as u32);
                }
            }
            ResourceKind::GridGuides => self.grid_guides(c, ind)?,
            ResourceKind::GlobalAngle =>
            {
                let angle = c.read_i32()?;
                self.rep.num(ind, "Global Angle", angle, "degrees");
            }
            ResourceKind::GlobalAltitude =>
            {
                let altitude = c.read_i32()?;
                self.rep.num(ind, "Global Altitude", altitude, "");
            }
            ResourceKind::PrintFlags =>
            {
                for label in [
                    "Labels", "Crop marks", "Color bars", "Registration marks", "Negative",
                    "Flip", "Interpolate", "Caption", "Print flags",
                ]
                {
                    let v = c.read_u8()?;
                    self.rep.boolean(ind, label, v != 0);
                }
            }
            ResourceKind::PrintFlagsInfo =>
            {
                let version = c.read_u16()?;
                self.rep.num(ind, "Version", version, "");
                let center = c.read_u8()?;
                self.rep.num(ind, "Center crop marks", center, "");
                let reserved = c.read_u8()?;
                self.rep.num(ind, "Reserved", reserved, "");
                let bleed = c.read_u32()?;
                self.rep.num(ind, "Bleed width value", bleed, "");
                let scale = c.read_u16()?;
                self.rep.num(ind, "Bleed width scale", scale, "");
            }
            ResourceKind::CopyrightFlag =>
            {
                let v = c.read_u8()?;
                self.rep.boolean(ind, "Copyrighted", v != 0);
            }
            ResourceKind::LayerStateInfo =>
            {
                let target = c.read_u16()?;
                self.rep.num(ind, "Target layer", target, "");
            }
            ResourceKind::LayerGroupInfo =>
            {
                for i in 0..len / 2
                {
                    self.rep.note(ind, &format!("Layer #{}:", i));
                    let group = c.read_u16()?;
                    self.rep.num(ind + 1, "Layer Group", group, "");
                }
            }
            ResourceKind::LayerGroupsEnabled =>
            {
                for i in 0..len
                {
                    self.rep.note(ind, &format!("Layer #{}:", i));
                    let enabled = c.read_u8()?;
                    self.rep.num(ind + 1, "Group enabled ID", enabled, "");
                }
            }
            ResourceKind::LayerSelectIds =>
            {
                let count = c.read_u16()?;
                self.rep.num(ind, "Num selected", count, "");
                for _ in 0..count
                {
                    let id = c.read_u32()?;
                    self.rep.num(ind + 1, "Layer ID", id, "");
                }
            }
            ResourceKind::JpegQuality => self.jpeg_quality(c, ind, end)?,
            ResourceKind::IptcNaa => return decode_iptc(c, &mut self.rep, ind, len),
        }
        Ok(true)
    }

    fn thumbnail(&mut self, c : &mut Cursor, ind : usize, end : u64) -> Result<(), DecodeError>
    {
        let format = c.read_u32()?;
        self.rep.num(ind, "Format", format, "");
        for (label, units) in [
            ("Width of thumbnail", "pixels"),
            ("Height of thumbnail", "pixels"),
            ("Widthbytes", "bytes"),
            ("Total size", "bytes"),
            ("Size after compression", "bytes"),
        ]
        {
            let v = c.read_u32()?;
            self.rep.num(ind, label, v, units);
        }
        let bpp = c.read_u16()?;
        self.rep.num(ind, "Bits per pixel", bpp, "bits");
        let planes = c.read_u16()?;
        self.rep.num(ind, "Number of planes", planes, "");
        self.rep.offset(ind, "JFIF data", c.position());
        c.set_position(end);
        Ok(())
    }

    fn grid_guides(&mut self, c : &mut Cursor, ind : usize) -> Result<(), DecodeError>
    {
        let version = c.read_u32()?;
        self.rep.num(ind, "Version", version, "");
        let horz = c.read_u32()?;
        self.rep.num(ind, "Grid Horizontal", horz, "");
        let vert = c.read_u32()?;
        self.rep.num(ind, "Grid Vertical", vert, "");
        let count = c.read_u32()?;
        self.rep.num(ind, "Number of Guide Resources", count, "");
        for i in 0..count
        {
            self.rep.note(ind, "-----");
            self.rep.note(ind, &format!("Guide #{}:", i));
            let location = c.read_u32()?;
            self.rep.num(ind + 1, "Location", location, "");
            let direction = c.read_u8()?;
            self.rep.enumerated(ind + 1, "Direction", EnumFamily::GuideDirection, direction as u32);
        }
        Ok(())
    }

    /// Photoshop's private "Save As" JPEG settings.
    fn jpeg_quality(&mut self, c : &mut Cursor, ind : usize, end : u64) -> Result<(), DecodeError>
    {
        let quality = c.read_u16()?;
        if let Some(q) = save_as_quality(quality)
        {
            self.rep.num(ind, "Photoshop Save As Quality", q, "");
            self.save_as_quality = Some(q);
        }
        // older writers stop after the quality code
        if c.position() >= end
        {
            return Ok(());
        }
        let format = c.read_u16()?;
        let format_name = match format
        {
            0x0000 => "Standard",
            0x0001 => "Optimized",
            0x0101 => "Progressive",
            _ => "???",
        };
        self.rep.field(ind, "Photoshop Save Format", format_name, "");
        let scans = c.read_u16()?;
        let scans_name = match scans
        {
            0x0001 => "3 Scans",
            0x0002 => "4 Scans",
            0x0003 => "5 Scans",
            _ => "???",
        };
        self.rep.field(ind, "Photoshop Save Progressive Scans", scans_name, "");
        if c.position() < end
        {
            let trailing = c.read_u8()?;
            self.rep.num(ind, "???", trailing, "");
        }
        Ok(())
    }
}

/// Quality codes 0xFFFD, 0xFFFE, 0xFFFF, 0x0000 ..= 0x0008 are the 1 ..= 12 scale.
pub(crate) fn save_as_quality(code : u16) -> Option<u8>
{
    let q = code as i16 as i32 + 4;
    if (1..=12).contains(&q) { Some(q as u8) } else { None }
}
