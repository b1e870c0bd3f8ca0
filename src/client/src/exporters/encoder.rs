use std::io::{self, Read, Write};

use base64::engine::general_purpose::STANDARD;
use base64::write::EncoderWriter;
use base64::Engine;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::error::Result;
use crate::events::Event;

/// Produces the store-endpoint body: `base64(zlib(json(event)))`.
///
/// The writers are chained JSON -> zlib -> base64 -> buffer and closed from the
/// outside in: the zlib stream is finished first so its trailer reaches the
/// base64 writer, which is then finished to flush the final padded quantum.
pub fn encode_event(event: &Event) -> Result<Vec<u8>> {
    let base64_writer = EncoderWriter::new(Vec::new(), &STANDARD);
    let mut zlib_writer = ZlibEncoder::new(base64_writer, Compression::default());

    serde_json::to_writer(&mut zlib_writer, event)?;

    let mut base64_writer = zlib_writer.finish()?;
    let buf = base64_writer.finish()?;

    Ok(buf)
}

/// Same pipeline for JSON that was already serialized, so callers that also
/// log the JSON send exactly those bytes.
pub fn encode_json(json: &[u8]) -> Result<Vec<u8>> {
    let base64_writer = EncoderWriter::new(Vec::new(), &STANDARD);
    let mut zlib_writer = ZlibEncoder::new(base64_writer, Compression::default());

    zlib_writer.write_all(json)?;

    let mut base64_writer = zlib_writer.finish()?;
    let buf = base64_writer.finish()?;

    Ok(buf)
}

/// Reverses the base64 and zlib stages, returning the raw JSON bytes.
pub fn inflate_payload(payload: &[u8]) -> Result<Vec<u8>> {
    let compressed = STANDARD
        .decode(payload)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    let mut json = Vec::new();
    ZlibDecoder::new(compressed.as_slice()).read_to_end(&mut json)?;

    Ok(json)
}

pub fn decode_payload(payload: &[u8]) -> Result<Event> {
    let json = inflate_payload(payload)?;
    Ok(serde_json::from_slice(&json)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RavenError;
    use crate::events::Extra;
    use serde_json::{json, Value};

    fn sample_event() -> Event {
        let mut extra = Extra::new();
        extra.insert("attempt".to_string(), json!(3));
        Event::from_panic(
            "1234",
            "rust",
            "index out of bounds",
            "request failed",
            "   0: app::handler\n             at ./src/handler.rs:12:9",
            extra,
        )
    }

    #[test]
    fn test_round_trip_reproduces_event() {
        let event = sample_event();
        let payload = encode_event(&event).unwrap();

        assert_eq!(decode_payload(&payload).unwrap(), event);
    }

    #[test]
    fn test_encode_json_sends_given_bytes() {
        let event = sample_event();
        let json = serde_json::to_vec(&event).unwrap();
        let payload = encode_json(&json).unwrap();

        assert_eq!(inflate_payload(&payload).unwrap(), json);
        assert_eq!(decode_payload(&payload).unwrap(), event);
    }

    #[test]
    fn test_payload_is_padded_standard_base64() {
        let payload = encode_event(&sample_event()).unwrap();

        assert_eq!(payload.len() % 4, 0);
        assert!(payload
            .iter()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'/' | b'=')));
    }

    #[test]
    fn test_compressed_stream_has_zlib_header() {
        let payload = encode_event(&sample_event()).unwrap();
        let compressed = STANDARD.decode(&payload).unwrap();

        // CMF: deflate with 32K window; header checksum must divide by 31
        assert_eq!(compressed[0], 0x78);
        assert_eq!(((compressed[0] as u16) << 8 | compressed[1] as u16) % 31, 0);
    }

    #[test]
    fn test_inflated_json_uses_wire_names() {
        let payload = encode_event(&sample_event()).unwrap();
        let json: Value = serde_json::from_slice(&inflate_payload(&payload).unwrap()).unwrap();

        assert_eq!(json["project"], "1234");
        assert_eq!(json["sentry.interfaces.Exception"]["type"], "index out of bounds");
        assert_eq!(json["extra"]["attempt"], 3);
    }

    #[test]
    fn test_garbage_payload_is_an_encoding_error() {
        let err = decode_payload(b"not base64!").unwrap_err();
        assert!(err.is_encoding());
        assert!(matches!(err, RavenError::Encoding(_)));
    }
}
