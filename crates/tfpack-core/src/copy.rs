//! File copy with a reusable buffer.
//!
//! The extractor copies every file payload through one [`CopyBuffer`]
//! instead of letting `std::io::copy` allocate per call.

use std::io::Read;
use std::io::Write;
use std::io::{self};

use crate::PackError;

/// Buffer size for payload copies (64 KiB).
const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// Fixed-size buffer reused across copies within one extraction.
#[derive(Debug)]
pub struct CopyBuffer {
    #[allow(clippy::large_stack_arrays)]
    buf: [u8; COPY_BUFFER_SIZE],
}

impl CopyBuffer {
    /// Creates a new zeroed copy buffer.
    #[inline]
    #[must_use]
    #[allow(clippy::large_stack_arrays)]
    pub fn new() -> Self {
        Self {
            buf: [0u8; COPY_BUFFER_SIZE],
        }
    }

    /// Returns the buffer size in bytes.
    #[inline]
    #[must_use]
    pub fn size(&self) -> usize {
        COPY_BUFFER_SIZE
    }
}

impl Default for CopyBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Copies everything from `reader` to `writer`, returning the byte count.
///
/// Interrupted reads are retried. The running total uses checked addition.
///
/// # Errors
///
/// Returns `PackError::Io` if reading or writing fails, or if the total
/// would overflow `u64`.
///
/// # Examples
///
/// ```
/// use std::io::Cursor;
/// use std::io::Read;
/// use tfpack_core::copy::CopyBuffer;
/// use tfpack_core::copy::copy_with_buffer;
///
/// let mut buffer = CopyBuffer::new();
/// let mut input = Cursor::new(b"variable \"region\" {}".to_vec()).take(8);
/// let mut output = Vec::new();
///
/// let copied = copy_with_buffer(&mut input, &mut output, &mut buffer)?;
/// assert_eq!(copied, 8);
/// assert_eq!(output, b"variable");
/// # Ok::<(), tfpack_core::PackError>(())
/// ```
#[inline]
pub fn copy_with_buffer<R: Read, W: Write>(
    reader: &mut R,
    writer: &mut W,
    buffer: &mut CopyBuffer,
) -> Result<u64, PackError> {
    let mut total: u64 = 0;

    loop {
        let bytes_read = match reader.read(&mut buffer.buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(PackError::Io(e)),
        };

        writer
            .write_all(&buffer.buf[..bytes_read])
            .map_err(PackError::Io)?;

        total = total.checked_add(bytes_read as u64).ok_or_else(|| {
            PackError::Io(io::Error::other("byte count overflow during copy"))
        })?;
    }

    Ok(total)
}
