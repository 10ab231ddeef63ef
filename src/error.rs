use enough::StopReason;

/// Conditions that stop a decode outright.
///
/// Everything recoverable (length mismatches, unknown IDs, bad sub-block signatures) is logged to the
/// sink and surfaces as a `false` success flag instead of one of these.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum DecodeError
{
    /// The bytes at the requested offset are not a version 1 PSD header.
    #[error("not a PSD file (signature {signature:?}, version {version})")]
    NotPsd { signature : [u8; 4], version : u16 },

    /// A read would have crossed the end of the byte source.
    #[error("unexpected end of input: needed {needed} bytes at 0x{offset:08X}")]
    UnexpectedEof { offset : u64, needed : u64 },

    #[error("operation cancelled")]
    Cancelled(StopReason),
}

impl From<StopReason> for DecodeError
{
    fn from(r : StopReason) -> Self
    {
        DecodeError::Cancelled(r)
    }
}
