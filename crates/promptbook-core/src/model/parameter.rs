//! Pipeline parameters

use serde::{Deserialize, Serialize};

/// Resolved role of a parameter in the pipeline interface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParameterRole {
    /// Provided by the caller
    Input,
    /// Returned to the caller
    Output,
    /// Produced and consumed inside the pipeline
    Intermediate,
}

/// A parameter of a compiled pipeline
///
/// Serialized with the `isInput` / `isOutput` flags of the wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "ParameterWire", try_from = "ParameterWire")]
pub struct ParameterJson {
    pub name: String,
    pub description: Option<String>,
    pub role: ParameterRole,
    pub example_values: Vec<String>,
}

impl ParameterJson {
    pub fn new(name: impl Into<String>, role: ParameterRole) -> Self {
        Self {
            name: name.into(),
            description: None,
            role,
            example_values: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn is_input(&self) -> bool {
        self.role == ParameterRole::Input
    }

    pub fn is_output(&self) -> bool {
        self.role == ParameterRole::Output
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ParameterWire {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    is_input: bool,
    is_output: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    example_values: Vec<String>,
}

impl From<ParameterJson> for ParameterWire {
    fn from(parameter: ParameterJson) -> Self {
        Self {
            is_input: parameter.is_input(),
            is_output: parameter.is_output(),
            name: parameter.name,
            description: parameter.description,
            example_values: parameter.example_values,
        }
    }
}

impl TryFrom<ParameterWire> for ParameterJson {
    type Error = String;

    fn try_from(wire: ParameterWire) -> Result<Self, Self::Error> {
        let role = match (wire.is_input, wire.is_output) {
            (true, true) => {
                return Err(format!(
                    "Parameter {{{}}} can not be both input and output",
                    wire.name
                ))
            }
            (true, false) => ParameterRole::Input,
            (false, true) => ParameterRole::Output,
            (false, false) => ParameterRole::Intermediate,
        };

        Ok(Self {
            name: wire.name,
            description: wire.description,
            role,
            example_values: wire.example_values,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_role_serializes_as_flags() {
        let parameter = ParameterJson::new("topic", ParameterRole::Input).with_description("Topic");
        let value = serde_json::to_value(&parameter).unwrap();

        assert_eq!(
            value,
            json!({"name": "topic", "description": "Topic", "isInput": true, "isOutput": false})
        );
    }

    #[test]
    fn test_flags_deserialize_into_role() {
        let parameter: ParameterJson =
            serde_json::from_value(json!({"name": "x", "isInput": false, "isOutput": false}))
                .unwrap();
        assert_eq!(parameter.role, ParameterRole::Intermediate);

        let both = serde_json::from_value::<ParameterJson>(
            json!({"name": "x", "isInput": true, "isOutput": true}),
        );
        assert!(both.is_err());
    }
}
