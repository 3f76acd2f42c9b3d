//! Generation keys and their persisted encoding.

use serde_json::Value;

/// Identity of one generated function: `(function_name, description)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GenerationKey {
    /// Name the generated function is emitted and referenced under
    pub function_name: String,
    /// Natural-language description handed to the backend
    pub description: String,
}

impl GenerationKey {
    /// Create a key from an explicit name and description.
    pub fn new(function_name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            function_name: function_name.into(),
            description: description.into(),
        }
    }

    /// Create a key whose name is derived from the description.
    pub fn from_description(description: impl Into<String>) -> Self {
        let description = description.into();
        Self {
            function_name: derive_function_name(&description),
            description,
        }
    }

    /// Encode as a two-element JSON array.
    pub fn encode(&self) -> String {
        Value::Array(vec![
            Value::String(self.function_name.clone()),
            Value::String(self.description.clone()),
        ])
        .to_string()
    }

    /// Decode a key produced by [`GenerationKey::encode`].
    ///
    /// Only a JSON array of exactly two strings is accepted.
    pub fn decode(encoded: &str) -> Result<Self, KeyError> {
        let value: Value = serde_json::from_str(encoded)
            .map_err(|e| KeyError::Malformed(encoded.to_string(), e.to_string()))?;

        let items = match value {
            Value::Array(items) => items,
            _ => return Err(KeyError::NotAPair(encoded.to_string())),
        };

        match <[Value; 2]>::try_from(items) {
            Ok([Value::String(function_name), Value::String(description)]) => Ok(Self {
                function_name,
                description,
            }),
            _ => Err(KeyError::NotAPair(encoded.to_string())),
        }
    }
}

impl std::fmt::Display for GenerationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:?}, {:?})", self.function_name, self.description)
    }
}

/// Derive a function name from a description: every space becomes `_`.
pub fn derive_function_name(description: &str) -> String {
    description.replace(' ', "_")
}

/// Key decoding errors.
#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    #[error("Malformed key {0:?}: {1}")]
    Malformed(String, String),

    #[error("Key {0:?} is not a pair of strings")]
    NotAPair(String),
}
