//! OSType descriptors (the recursive key/typed-value format) and the slices resource built on them.

use alloc::format;

use crate::cursor::{fourcc_str, Cursor, FourCc};
use crate::decode::Walker;
use crate::error::DecodeError;

/// Deeper nesting than this is treated like an unsupported item.
const MAX_NESTING : usize = 48;

/// Descriptor version that precedes every versioned descriptor block.
const DESCRIPTOR_VERSION : u32 = 16;

/// Whether a descriptor walk got through everything it was given.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Walk
{
    Continue,
    /// An item of an unsupported type was met; the cursor sits at the enclosing payload end.
    Halted,
}

impl Walker<'_>
{
    /// One descriptor. `end` bounds the enclosing payload, for giving up on unsupported items.
    pub(crate) fn descriptor(&mut self, c : &mut Cursor, ind : usize, end : u64) -> Result<Walk, DecodeError>
    {
        self.rep.note(ind, "Descriptor:");
        let (name, _) = c.read_lstr_unicode(self.opts.max_unicode_len)?;
        self.rep.string(ind + 1, "Name from classID", &name);
        let class_id = c.read_lstr_ascii()?;
        self.rep.string(ind + 1, "classID", &class_id);
        let count = c.read_u32()?;
        self.rep.num(ind + 1, "Num items in descriptor", count, "");

        for i in 0..count
        {
            self.rep.note(ind + 1, "-----");
            self.rep.note(ind + 1, &format!("Descriptor item #{}:", i));
            let key = c.read_lstr_ascii()?;
            self.rep.string(ind + 2, "Key", &key);
            if self.typed_item(c, ind + 2, end)? == Walk::Halted
            {
                return Ok(Walk::Halted);
            }
        }
        Ok(Walk::Continue)
    }

    fn list(&mut self, c : &mut Cursor, ind : usize, end : u64) -> Result<Walk, DecodeError>
    {
        let count = c.read_u32()?;
        self.rep.num(ind, "Num items in list", count, "");
        for i in 0..count
        {
            self.rep.note(ind, &format!("Item #{}:", i));
            if self.typed_item(c, ind + 1, end)? == Walk::Halted
            {
                return Ok(Walk::Halted);
            }
        }
        Ok(Walk::Continue)
    }

    /// OSType key followed by its value.
    fn typed_item(&mut self, c : &mut Cursor, ind : usize, end : u64) -> Result<Walk, DecodeError>
    {
        let ostype : FourCc = c.read_fourcc()?;
        self.rep.string(ind, "OSType key", &fourcc_str(&ostype));
        if ind > MAX_NESTING
        {
            return self.unsupported_item(c, ind, &ostype, end);
        }
        match &ostype
        {
            b"Objc" | b"GlbO" => return self.descriptor(c, ind + 1, end),
            b"VlLs" => return self.list(c, ind + 1, end),
            b"long" =>
            {
                let v = c.read_i32()?;
                self.rep.num(ind, "Value", v, "");
            }
            b"comp" =>
            {
                let v = c.read_u64()? as i64;
                self.rep.field(ind, "Value", v, "");
            }
            b"doub" =>
            {
                let bits = c.read_u64()?;
                self.rep.double(ind, "Value", bits, "");
            }
            b"UntF" =>
            {
                let unit = c.read_fourcc()?;
                self.rep.string(ind, "Units", &fourcc_str(&unit));
                let bits = c.read_u64()?;
                self.rep.double(ind, "Value", bits, "");
            }
            b"bool" =>
            {
                let v = c.read_u8()?;
                self.rep.boolean(ind, "Value", v != 0);
            }
            b"TEXT" =>
            {
                let (s, _) = c.read_lstr_unicode(self.opts.max_unicode_len)?;
                self.rep.string(ind, "String", &s);
            }
            b"enum" =>
            {
                let typ = c.read_lstr_ascii()?;
                self.rep.string(ind, "Type", &typ);
                let val = c.read_lstr_ascii()?;
                self.rep.string(ind, "Enum", &val);
            }
            b"type" | b"GlbC" =>
            {
                let (name, _) = c.read_lstr_unicode(self.opts.max_unicode_len)?;
                self.rep.string(ind, "Name from classID", &name);
                let class_id = c.read_lstr_ascii()?;
                self.rep.string(ind, "classID", &class_id);
            }
            b"alis" | b"tdta" =>
            {
                let len = c.read_u32()? as u64;
                self.rep.num(ind, "Length", len as u32, "bytes");
                self.dump(c, ind, "Data", len)?;
            }
            _ => return self.unsupported_item(c, ind, &ostype, end),
        }
        Ok(Walk::Continue)
    }

    fn unsupported_item(&mut self, c : &mut Cursor, ind : usize, ostype : &FourCc, end : u64) -> Result<Walk, DecodeError>
    {
        let pos = c.position();
        self.rep.warn(ind, &format!(
            "WARNING: Unsupported OSType [{}] @ 0x{:08X}. Skipping rest of descriptor.",
            fourcc_str(ostype), pos,
        ));
        self.dump(c, ind, "Remaining data", end.saturating_sub(pos))?;
        c.set_position(end.max(pos));
        tracing::debug!(ostype = %fourcc_str(ostype), pos, end, "descriptor walk halted");
        Ok(Walk::Halted)
    }

    /// 4-byte descriptor version followed by a descriptor.
    pub(crate) fn versioned_descriptor(&mut self, c : &mut Cursor, ind : usize, end : u64) -> Result<bool, DecodeError>
    {
        let version = c.read_u32()?;
        self.rep.num(ind, "Descriptor version", version, "");
        self.descriptor(c, ind, end)?;
        Ok(true)
    }

    /// Image resource 0x041A. Version 6 spells out each slice; 7 and 8 are a single descriptor.
    pub(crate) fn slices(&mut self, c : &mut Cursor, ind : usize, end : u64) -> Result<bool, DecodeError>
    {
        self.rep.note(ind, "Slice Header:");
        let ind = ind + 1;
        let version = c.read_u32()?;
        self.rep.num(ind, "Version", version, "");
        match version
        {
            6 =>
            {
                for label in ["Bound Rect (top)", "Bound Rect (left)", "Bound Rect (bottom)", "Bound Rect (right)"]
                {
                    let v = c.read_i32()?;
                    self.rep.num(ind, label, v, "");
                }
                let (group, _) = c.read_lstr_unicode(self.opts.max_unicode_len)?;
                self.rep.string(ind, "Name of group of slices", &group);
                let count = c.read_u32()?;
                self.rep.num(ind, "Number of slices", count, "");
                for i in 0..count
                {
                    self.stop.check()?;
                    self.rep.note(ind, &format!("Slice #{}:", i));
                    if self.slice_resource(c, ind + 1, end)? == Walk::Halted
                    {
                        break;
                    }
                }
            }
            7 | 8 =>
            {
                self.versioned_descriptor(c, ind, end)?;
            }
            _ =>
            {
                self.rep.warn(ind, &format!("WARNING: Unsupported slice header version {}.", version));
                let pos = c.position();
                self.dump(c, ind, "Slice data", end.saturating_sub(pos))?;
            }
        }
        Ok(true)
    }

    fn slice_resource(&mut self, c : &mut Cursor, ind : usize, end : u64) -> Result<Walk, DecodeError>
    {
        self.rep.note(ind, "Slice Resource:");
        let ind = ind + 1;
        let id = c.read_u32()?;
        self.rep.num(ind, "ID", id, "");
        let group_id = c.read_u32()?;
        self.rep.num(ind, "Group ID", group_id, "");
        let origin = c.read_u32()?;
        self.rep.num(ind, "Origin", origin, "");
        if origin == 1
        {
            let layer_id = c.read_u32()?;
            self.rep.num(ind, "Associated Layer ID", layer_id, "");
        }
        let (name, _) = c.read_lstr_unicode(self.opts.max_unicode_len)?;
        self.rep.string(ind, "Name", &name);
        let typ = c.read_u32()?;
        self.rep.num(ind, "Type", typ, "");
        for label in ["Position (left)", "Position (top)", "Position (right)", "Position (bottom)"]
        {
            let v = c.read_i32()?;
            self.rep.num(ind, label, v, "");
        }
        for label in ["URL", "Target", "Message", "Alt Tag"]
        {
            let (s, _) = c.read_lstr_unicode(self.opts.max_unicode_len)?;
            self.rep.string(ind, label, &s);
        }
        let html = c.read_u8()?;
        self.rep.boolean(ind, "Cell text is HTML", html != 0);
        let (text, _) = c.read_lstr_unicode(self.opts.max_unicode_len)?;
        self.rep.string(ind, "Cell text", &text);
        let horz = c.read_u32()?;
        self.rep.num(ind, "Horizontal alignment", horz, "");
        let vert = c.read_u32()?;
        self.rep.num(ind, "Vertical alignment", vert, "");
        for label in ["Alpha color", "Red", "Green", "Blue"]
        {
            let v = c.read_u8()?;
            self.rep.num(ind, label, v, "");
        }
        // optional trailing descriptor, recognised by its version word
        if c.position() + 4 <= end && c.peek_uint(4)? == DESCRIPTOR_VERSION
        {
            let version = c.read_u32()?;
            self.rep.num(ind, "Descriptor version", version, "");
            return self.descriptor(c, ind, end);
        }
        Ok(Walk::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use alloc::vec::Vec;
    use crate::report::{LogLine, Severity};
    use crate::DecodeOptions;

    fn lstr(out : &mut Vec<u8>, s : &[u8])
    {
        out.extend((s.len() as u32).to_be_bytes());
        out.extend(s);
    }

    fn ustr(out : &mut Vec<u8>, s : &str)
    {
        let units : Vec<u16> = s.encode_utf16().collect();
        out.extend((units.len() as u32).to_be_bytes());
        for u in units
        {
            out.extend(u.to_be_bytes());
        }
    }

    fn walk(data : &[u8]) -> (Walk, u64, Vec<LogLine>)
    {
        let mut log : Vec<LogLine> = vec!();
        let opts = DecodeOptions::default();
        let stop = enough::Unstoppable;
        let mut w = Walker::new(&mut log, &opts, &stop, None);
        let mut c = Cursor::new(&data, 0);
        let r = w.descriptor(&mut c, 0, data.len() as u64).unwrap();
        drop(w);
        (r, c.position(), log)
    }

    fn header(out : &mut Vec<u8>, count : u32)
    {
        ustr(out, "");
        out.extend([0, 0, 0, 0]);
        out.extend(b"null");
        out.extend(count.to_be_bytes());
    }

    #[test]
    fn scalar_items()
    {
        let mut d = vec!();
        header(&mut d, 4);
        lstr(&mut d, b"Wdth");
        d.extend(b"long");
        d.extend(7i32.to_be_bytes());
        lstr(&mut d, b"Hrzn");
        d.extend(b"UntF");
        d.extend(b"#Pxl");
        d.extend(2.5f64.to_bits().to_be_bytes());
        lstr(&mut d, b"Nm  ");
        d.extend(b"TEXT");
        ustr(&mut d, "hi");
        lstr(&mut d, b"Md  ");
        d.extend(b"enum");
        lstr(&mut d, b"BlnM");
        lstr(&mut d, b"Nrml");

        let (r, pos, log) = walk(&d);
        assert_eq!(r, Walk::Continue);
        assert_eq!(pos, d.len() as u64);
        let text : Vec<&str> = log.iter().map(|l| l.text.as_str()).collect();
        assert!(text.iter().any(|t| t.contains("classID") && t.ends_with("\"null\"")));
        assert!(text.iter().any(|t| t.trim_start().starts_with("Value") && t.ends_with("= 7")));
        assert!(text.iter().any(|t| t.ends_with("= 2.50000")));
        assert!(text.iter().any(|t| t.ends_with("= \"hi\"")));
        assert!(text.iter().any(|t| t.ends_with("= \"Nrml\"")));
    }

    #[test]
    fn nested_descriptor_and_list()
    {
        let mut d = vec!();
        header(&mut d, 2);
        lstr(&mut d, b"Objt");
        d.extend(b"Objc");
        header(&mut d, 1);
        lstr(&mut d, b"Vsbl");
        d.extend(b"bool");
        d.push(1);
        lstr(&mut d, b"Lst ");
        d.extend(b"VlLs");
        d.extend(2u32.to_be_bytes());
        d.extend(b"long");
        d.extend(1i32.to_be_bytes());
        d.extend(b"long");
        d.extend((-1i32).to_be_bytes());

        let (r, pos, log) = walk(&d);
        assert_eq!(r, Walk::Continue);
        assert_eq!(pos, d.len() as u64);
        assert!(log.iter().any(|l| l.text.ends_with("= true")));
        assert!(log.iter().any(|l| l.text.ends_with("= -1")));
        assert_eq!(log.iter().filter(|l| l.text.trim_start() == "Descriptor:").count(), 2);
    }

    #[test]
    fn unsupported_type_halts_without_failing()
    {
        let mut d = vec!();
        header(&mut d, 2);
        lstr(&mut d, b"Rf  ");
        d.extend(b"obj ");
        d.extend([1, 2, 3, 4, 5]);
        let (r, pos, log) = walk(&d);
        assert_eq!(r, Walk::Halted);
        assert_eq!(pos, d.len() as u64);
        assert!(log.iter().any(|l| l.severity == Severity::Warning && l.text.contains("Unsupported OSType [obj ]")));
        assert!(log.iter().any(|l| l.text.contains("0x01 02 03 04 05")));
    }
}
