//! IPTC-NAA tagged records, as carried by image resource 0x0404.

use alloc::format;
use alloc::string::String;

use crate::cursor::{latin1, Cursor};
use crate::error::DecodeError;
use crate::report::Reporter;
use crate::tables::{find_iptc_field, IptcKind};

const TAG_MARKER : u8 = 0x1C;
const TAG_HEADER_LEN : u64 = 5;

/// Walk the tags in `[pos, pos + len)`.
///
/// A tag that doesn't start with 0x1C ends the walk with the cursor moved to the block end and a
/// `false` result; the rest of the file is unaffected.
pub(crate) fn decode_iptc(c : &mut Cursor, rep : &mut Reporter, ind : usize, len : u64) -> Result<bool, DecodeError>
{
    let end = c.position() + len;
    while c.position() < end
    {
        let tag_pos = c.position();
        if end - tag_pos < TAG_HEADER_LEN
        {
            rep.warn(ind, &format!(
                "WARNING: IPTC block has {} trailing bytes @ 0x{:08X}, too few for a tag. Skipping.",
                end - tag_pos, tag_pos,
            ));
            c.set_position(end);
            break;
        }
        let marker = c.read_u8()?;
        if marker != TAG_MARKER
        {
            rep.error(ind, &format!("ERROR: Unknown IPTC TagMarker [0x{:02X}] @ 0x{:08X}. Skipping parsing.", marker, tag_pos));
            c.set_position(end);
            return Ok(false);
        }
        let record = c.read_u8()?;
        let dataset = c.read_u8()?;
        let field_len = c.read_u16()? as usize;

        let (name, kind) = match find_iptc_field(record, dataset)
        {
            Some(f) => (f.name, f.kind),
            None => ("?", IptcKind::Unknown),
        };
        let value = match kind
        {
            IptcKind::Numeric if (1..=4).contains(&field_len) => format!("{}", c.peek_uint(field_len)?),
            IptcKind::Numeric | IptcKind::Hex => hex_bytes(&c.peek_bytes(field_len)?),
            IptcKind::Text => format!("\"{}\"", latin1(&c.peek_bytes(field_len)?)),
            IptcKind::Unknown => "???".into(),
        };
        c.skip(field_len as u64);
        rep.note(ind, &format!("IPTC [{:03}:{:03}] {:<35} = {}", record, dataset, name, value));
    }
    tracing::trace!(end = end, pos = c.position(), "iptc walk finished");
    Ok(true)
}

fn hex_bytes(bytes : &[u8]) -> String
{
    let parts : alloc::vec::Vec<String> = bytes.iter().map(|b| format!("0x{:02X}", b)).collect();
    parts.join(" ")
}
