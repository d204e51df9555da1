//! Length-prefixed message framing
//!
//! Every message on a stream socket is a `u32` big-endian length followed by
//! that many payload bytes. A zero-length frame is a valid, empty message;
//! the record layer uses it as the stream terminator.

use crate::{Result, TransportError};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Size of the length prefix
pub const FRAME_HEADER_SIZE: usize = 4;

/// Write one frame and flush
pub async fn write_frame<W>(writer: &mut W, payload: &[u8], max_size: usize) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    if payload.len() > max_size || payload.len() > u32::MAX as usize {
        return Err(TransportError::FrameTooLarge {
            size: payload.len(),
            limit: max_size,
        });
    }

    let mut buffer = Vec::with_capacity(FRAME_HEADER_SIZE + payload.len());
    buffer.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    buffer.extend_from_slice(payload);

    writer.write_all(&buffer).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one frame
///
/// Returns `Ok(None)` when the stream ends cleanly on a frame boundary. A
/// stream that ends inside a frame is [`TransportError::TruncatedFrame`].
pub async fn read_frame<R>(reader: &mut R, max_size: usize) -> Result<Option<Vec<u8>>>
where
    R: AsyncRead + Unpin,
{
    let mut header = [0u8; FRAME_HEADER_SIZE];
    let got = fill(reader, &mut header).await?;
    if got == 0 {
        return Ok(None);
    }
    if got < FRAME_HEADER_SIZE {
        return Err(TransportError::TruncatedFrame {
            expected: FRAME_HEADER_SIZE,
            got,
        });
    }

    let size = u32::from_be_bytes(header) as usize;
    if size > max_size {
        return Err(TransportError::FrameTooLarge {
            size,
            limit: max_size,
        });
    }

    let mut payload = vec![0u8; size];
    let got = fill(reader, &mut payload).await?;
    if got < size {
        return Err(TransportError::TruncatedFrame {
            expected: size,
            got,
        });
    }
    Ok(Some(payload))
}

/// Read until `buf` is full or the stream ends; returns bytes read
async fn fill<R>(reader: &mut R, buf: &mut [u8]) -> Result<usize>
where
    R: AsyncRead + Unpin,
{
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader.read(&mut buf[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}
