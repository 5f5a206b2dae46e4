//! Frame codec for the helpers wire protocol.
//!
//! Frame format:
//! ```text
//! ┌──────────┬──────────┬────────────────────────┐
//! │ len (4B) │ type(1B) │   UTF-8 JSON payload   │
//! │ u32 BE   │ u8       │                        │
//! └──────────┴──────────┴────────────────────────┘
//! ```
//! `len` counts the type byte and the payload, not the prefix itself.

use std::io::{Error, ErrorKind};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Message type: request from the host.
pub const MSG_REQUEST: u8 = 0x01;
/// Message type: response to the host.
pub const MSG_RESPONSE: u8 = 0x02;
/// Message type: protocol-level error (unexpected frame type).
pub const MSG_ERROR: u8 = 0xFF;

const PREFIX_LEN: usize = 4;

/// One decoded frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub msg_type: u8,
    pub payload: Vec<u8>,
}

impl Frame {
    pub fn is_request(&self) -> bool {
        self.msg_type == MSG_REQUEST
    }

    /// Payload as text. Non-UTF-8 payloads are `InvalidData`.
    pub fn text(&self) -> std::io::Result<&str> {
        std::str::from_utf8(&self.payload).map_err(|e| {
            Error::new(ErrorKind::InvalidData, format!("Payload is not UTF-8: {e}"))
        })
    }
}

/// Read one frame from the stream.
///
/// Returns `None` when the stream ends on a frame boundary. A stream ending
/// inside the length prefix is `InvalidData`; one ending inside the body is
/// `UnexpectedEof`. Frames longer than `max_frame_bytes` are rejected before
/// the body is read.
pub async fn read_frame<R: AsyncRead + Unpin>(
    reader: &mut R,
    max_frame_bytes: u32,
) -> std::io::Result<Option<Frame>> {
    let Some(prefix) = read_prefix(reader).await? else {
        return Ok(None);
    };

    let frame_len = u32::from_be_bytes(prefix);
    if frame_len > max_frame_bytes {
        return Err(Error::new(
            ErrorKind::InvalidData,
            format!("Frame too large: {} bytes (limit {})", frame_len, max_frame_bytes),
        ));
    }
    let Some(payload_len) = frame_len.checked_sub(1) else {
        return Err(Error::new(
            ErrorKind::InvalidData,
            "Frame too short: missing type byte",
        ));
    };

    let msg_type = reader.read_u8().await?;
    let mut payload = vec![0u8; payload_len as usize];
    reader.read_exact(&mut payload).await?;

    Ok(Some(Frame { msg_type, payload }))
}

async fn read_prefix<R: AsyncRead + Unpin>(
    reader: &mut R,
) -> std::io::Result<Option<[u8; PREFIX_LEN]>> {
    let mut prefix = [0u8; PREFIX_LEN];
    let mut filled = 0;
    while filled < PREFIX_LEN {
        let n = reader.read(&mut prefix[filled..]).await?;
        if n == 0 {
            if filled == 0 {
                return Ok(None);
            }
            return Err(Error::new(
                ErrorKind::InvalidData,
                format!("Truncated length prefix: {filled} of {PREFIX_LEN} bytes"),
            ));
        }
        filled += n;
    }
    Ok(Some(prefix))
}

/// Write one frame and flush.
pub async fn write_frame<W: AsyncWrite + Unpin>(
    writer: &mut W,
    msg_type: u8,
    payload: &[u8],
) -> std::io::Result<()> {
    let frame_len = u32::try_from(payload.len())
        .ok()
        .and_then(|len| len.checked_add(1))
        .ok_or_else(|| Error::new(ErrorKind::InvalidInput, "Frame payload too large"))?;

    let mut header = [0u8; PREFIX_LEN + 1];
    header[..PREFIX_LEN].copy_from_slice(&frame_len.to_be_bytes());
    header[PREFIX_LEN] = msg_type;

    writer.write_all(&header).await?;
    writer.write_all(payload).await?;
    writer.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn request_frame_through_duplex() {
        let (mut client, mut server) = tokio::io::duplex(1024);
        write_frame(&mut client, MSG_REQUEST, br#"{"query":[]}"#)
            .await
            .unwrap();

        let frame = read_frame(&mut server, 1024).await.unwrap().unwrap();
        assert!(frame.is_request());
        assert_eq!(frame.text().unwrap(), r#"{"query":[]}"#);
    }

    #[tokio::test]
    async fn clean_eof_yields_none() {
        let (client, mut server) = tokio::io::duplex(64);
        drop(client);
        assert!(read_frame(&mut server, 1024).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn truncated_prefix_is_invalid_data() {
        let (mut client, mut server) = tokio::io::duplex(64);
        client.write_all(&[0x00, 0x00]).await.unwrap();
        drop(client);

        let err = read_frame(&mut server, 1024).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
        assert!(err.to_string().contains("2 of 4"));
    }

    #[tokio::test]
    async fn truncated_body_is_unexpected_eof() {
        let (mut client, mut server) = tokio::io::duplex(64);
        client.write_all(&10u32.to_be_bytes()).await.unwrap();
        client.write_all(&[MSG_REQUEST, b'{']).await.unwrap();
        drop(client);

        let err = read_frame(&mut server, 1024).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnexpectedEof);
    }

    #[tokio::test]
    async fn oversized_frame_is_rejected() {
        let (mut client, mut server) = tokio::io::duplex(1024);
        write_frame(&mut client, MSG_REQUEST, &[b'x'; 64]).await.unwrap();

        let err = read_frame(&mut server, 16).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
    }

    #[tokio::test]
    async fn zero_length_frame_is_rejected() {
        let (mut client, mut server) = tokio::io::duplex(64);
        client.write_all(&0u32.to_be_bytes()).await.unwrap();

        let err = read_frame(&mut server, 1024).await.unwrap_err();
        assert!(err.to_string().contains("missing type byte"));
    }

    #[test]
    fn non_utf8_payload_is_invalid_data() {
        let frame = Frame {
            msg_type: MSG_REQUEST,
            payload: vec![0xff, 0xfe],
        };
        assert_eq!(frame.text().unwrap_err().kind(), ErrorKind::InvalidData);
    }
}
