//! Extension methods for ONNX protobuf types
//!
//! Construction and lookup helpers shared by the emitter, the rewrite pass,
//! and tests.

use super::onnx::*;

// ============================================================================
// NodeProto extensions
// ============================================================================

impl NodeProto {
    /// Get attribute by name
    pub fn get_attribute(&self, name: &str) -> Option<&AttributeProto> {
        self.attribute.iter().find(|attr| attr.name == name)
    }

    /// Get integer attribute value with default
    pub fn get_attribute_int(&self, name: &str, default: i64) -> i64 {
        self.get_attribute(name).map(|a| a.i).unwrap_or(default)
    }

    /// Get float attribute value with default
    pub fn get_attribute_float(&self, name: &str, default: f32) -> f32 {
        self.get_attribute(name).map(|a| a.f).unwrap_or(default)
    }

    /// First input name, if any
    pub fn first_input(&self) -> Option<&str> {
        self.input.first().map(|s| s.as_str())
    }

    /// First output name, if any
    pub fn first_output(&self) -> Option<&str> {
        self.output.first().map(|s| s.as_str())
    }

    /// Check if this node has a specific op type
    pub fn is_op_type(&self, op_type: &str) -> bool {
        self.op_type == op_type
    }
}

// ============================================================================
// ModelProto extensions
// ============================================================================

impl ModelProto {
    /// Get the opset version for the default domain
    pub fn get_opset_version(&self) -> Option<i64> {
        self.opset_import
            .iter()
            .find(|op| op.domain.is_empty())
            .map(|op| op.version)
    }
}

// ============================================================================
// ValueInfoProto extensions
// ============================================================================

impl ValueInfoProto {
    /// Get the element type if this is a tensor type
    pub fn get_elem_type(&self) -> Option<i32> {
        self.r#type.as_ref().and_then(|t| {
            t.value.as_ref().map(|v| match v {
                type_proto::Value::TensorType(tensor) => tensor.elem_type,
            })
        })
    }

    /// Get the shape dimensions if available; symbolic dimensions become -1
    pub fn get_shape(&self) -> Option<Vec<i64>> {
        self.r#type.as_ref().and_then(|t| {
            t.value.as_ref().and_then(|v| match v {
                type_proto::Value::TensorType(tensor) => tensor.shape.as_ref().map(|s| {
                    s.dim
                        .iter()
                        .map(|d| match &d.value {
                            Some(tensor_shape_proto::dimension::Value::DimValue(v)) => *v,
                            _ => -1,
                        })
                        .collect()
                }),
            })
        })
    }
}

// ============================================================================
// AttributeProto extensions
// ============================================================================

impl AttributeProto {
    /// Create a new integer attribute
    pub fn new_int(name: &str, value: i64) -> Self {
        Self {
            name: name.to_string(),
            i: value,
            r#type: attribute_proto::AttributeType::Int as i32,
            ..Default::default()
        }
    }

    /// Create a new float attribute
    pub fn new_float(name: &str, value: f32) -> Self {
        Self {
            name: name.to_string(),
            f: value,
            r#type: attribute_proto::AttributeType::Float as i32,
            ..Default::default()
        }
    }

    /// Create a new tensor attribute
    pub fn new_tensor(name: &str, value: TensorProto) -> Self {
        Self {
            name: name.to_string(),
            t: Some(value),
            r#type: attribute_proto::AttributeType::Tensor as i32,
            ..Default::default()
        }
    }
}

// ============================================================================
// Helper functions
// ============================================================================

/// Create a new NodeProto
pub fn make_node(op_type: &str, inputs: &[&str], outputs: &[&str], name: &str) -> NodeProto {
    NodeProto {
        op_type: op_type.to_string(),
        input: inputs.iter().map(|s| s.to_string()).collect(),
        output: outputs.iter().map(|s| s.to_string()).collect(),
        name: name.to_string(),
        ..Default::default()
    }
}

/// Create a new ValueInfoProto for a tensor
pub fn make_tensor_value_info(name: &str, elem_type: i32, shape: &[i64]) -> ValueInfoProto {
    ValueInfoProto {
        name: name.to_string(),
        r#type: Some(TypeProto {
            value: Some(type_proto::Value::TensorType(type_proto::Tensor {
                elem_type,
                shape: Some(TensorShapeProto {
                    dim: shape
                        .iter()
                        .map(|&d| tensor_shape_proto::Dimension {
                            value: Some(tensor_shape_proto::dimension::Value::DimValue(d)),
                            denotation: String::new(),
                        })
                        .collect(),
                }),
            })),
            denotation: String::new(),
        }),
        doc_string: String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_make_node() {
        let node = make_node("Clip", &["X", "min", "max"], &["Y"], "clip_0");
        assert_eq!(node.op_type, "Clip");
        assert_eq!(node.input, vec!["X", "min", "max"]);
        assert_eq!(node.output, vec!["Y"]);
        assert!(node.is_op_type("Clip"));
    }

    #[test]
    fn test_attribute_lookup() {
        let mut node = make_node("Cast", &["X"], &["Y"], "cast_0");
        node.attribute.push(AttributeProto::new_int("to", 1));

        assert_eq!(node.get_attribute_int("to", 0), 1);
        assert_eq!(node.get_attribute_int("absent", 42), 42);
        assert!(node.get_attribute("absent").is_none());
    }

    #[test]
    fn test_make_tensor_value_info() {
        let vi = make_tensor_value_info("x", 1, &[1, 3, 224, 224]);
        assert_eq!(vi.name, "x");
        assert_eq!(vi.get_elem_type(), Some(1));
        assert_eq!(vi.get_shape(), Some(vec![1, 3, 224, 224]));
    }

    #[test]
    fn test_model_opset_version() {
        let model = ModelProto {
            opset_import: vec![OperatorSetIdProto {
                domain: String::new(),
                version: 11,
            }],
            ..Default::default()
        };
        assert_eq!(model.get_opset_version(), Some(11));
    }
}
