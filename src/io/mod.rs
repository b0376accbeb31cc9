//! Model I/O
//!
//! Serialize produced models to the standard ONNX wire format and read
//! them back. The wire format itself is the stock protobuf encoding; this
//! module only adds buffered file handling around `prost`.

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use prost::Message;

use crate::error::ExportResult;
use crate::proto::ModelProto;

/// Save a model to a file
pub fn save_model<P: AsRef<Path>>(model: &ModelProto, path: P) -> ExportResult<()> {
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);
    writer.write_all(&model.encode_to_vec())?;
    writer.flush()?;
    Ok(())
}

/// Encode a model to bytes
pub fn model_to_bytes(model: &ModelProto) -> Vec<u8> {
    model.encode_to_vec()
}

/// Decode a model from bytes
pub fn load_model_from_bytes(bytes: &[u8]) -> ExportResult<ModelProto> {
    Ok(ModelProto::decode(bytes)?)
}

/// Load a model from a file
pub fn load_model<P: AsRef<Path>>(path: P) -> ExportResult<ModelProto> {
    let mut file = File::open(path.as_ref())?;
    let mut buffer = Vec::new();
    file.read_to_end(&mut buffer)?;
    load_model_from_bytes(&buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::extensions::make_node;
    use crate::proto::{GraphProto, OperatorSetIdProto};

    fn test_model() -> ModelProto {
        ModelProto {
            ir_version: 7,
            producer_name: "ir2onnx".to_string(),
            opset_import: vec![OperatorSetIdProto {
                domain: String::new(),
                version: 11,
            }],
            graph: Some(GraphProto {
                name: "g".to_string(),
                node: vec![make_node("Relu", &["x"], &["y"], "relu_0")],
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_bytes_roundtrip() {
        let model = test_model();
        let decoded = load_model_from_bytes(&model_to_bytes(&model)).unwrap();

        assert_eq!(decoded, model);
        assert_eq!(decoded.get_opset_version(), Some(11));
    }

    #[test]
    fn test_decode_garbage_fails() {
        assert!(load_model_from_bytes(&[0xff, 0x01, 0x02]).is_err());
    }

    #[test]
    fn test_file_roundtrip() {
        let path =
            std::env::temp_dir().join(format!("ir2onnx_{}_io.onnx", std::process::id()));
        let model = test_model();

        save_model(&model, &path).unwrap();
        let loaded = load_model(&path).unwrap();
        assert_eq!(loaded, model);

        std::fs::remove_file(&path).ok();
    }
}
