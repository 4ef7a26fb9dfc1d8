use thiserror::Error;

use crate::frame::Frame;

/// Error types for serialization operations
#[derive(Error, Debug)]
pub enum SerializationError {
    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Binary serialization error: {0}")]
    BinaryError(#[from] bincode::Error),
}

/// Turns a frame into the bytes of one output line.
pub trait Serializer: Send + Sync {
    fn serialize_frame(&self, frame: &Frame) -> Result<Vec<u8>, SerializationError>;
}

/// JSON serializer implementation
pub struct JsonSerializer;

impl Serializer for JsonSerializer {
    fn serialize_frame(&self, frame: &Frame) -> Result<Vec<u8>, SerializationError> {
        Ok(serde_json::to_vec(frame)?)
    }
}

/// Binary serializer using bincode.
///
/// The bincode bytes are base64-encoded so each frame still fits on a
/// single newline-terminated line.
pub struct BinarySerializer;

impl Serializer for BinarySerializer {
    fn serialize_frame(&self, frame: &Frame) -> Result<Vec<u8>, SerializationError> {
        let bytes = bincode::serialize(frame)?;
        Ok(base64::encode(bytes).into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::SceneFrame;
    use oscillators_simulation::SceneGeometry;

    fn scene() -> Frame {
        let geometry = SceneGeometry::default();
        let masses = geometry.absolute_positions(&[0.01, 0.0, -0.01]);
        Frame::Scene(SceneFrame {
            tick: 3,
            time: 0.03,
            masses,
            springs: geometry.springs(&masses),
        })
    }

    #[test]
    fn json_frames_are_tagged() {
        let bytes = JsonSerializer.serialize_frame(&scene()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with(r#"{"scene":{"tick":3"#), "{text}");
        assert!(!text.contains('\n'));

        let clear = JsonSerializer.serialize_frame(&Frame::Clear).unwrap();
        assert_eq!(clear, br#""clear""#.to_vec());
    }

    #[test]
    fn binary_frames_are_base64_bincode() {
        let frame = scene();
        let encoded = BinarySerializer.serialize_frame(&frame).unwrap();
        let decoded = base64::decode(&encoded).unwrap();
        assert_eq!(decoded, bincode::serialize(&frame).unwrap());
        assert!(!encoded.contains(&b'\n'));
    }
}
