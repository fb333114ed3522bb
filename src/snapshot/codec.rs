//! Canonical Extended JSON codec.
//!
//! Plain JSON cannot tell an int64 from a double, or a date from a string,
//! so every value is written with its explicit Extended JSON type wrapper
//! (`$numberLong`, `$numberDouble`, `$date`, `$binary`, `$oid`, ...).

use bson::{Bson, Document};
use miette::Diagnostic;
use thiserror::Error;

/// Errors that can occur while encoding or decoding an export artifact.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("JSON parse error: {detail}")]
    #[diagnostic(code(docsnap::codec::parse))]
    Parse { detail: String },

    #[error("{detail}")]
    #[diagnostic(code(docsnap::codec::shape))]
    Shape { detail: String },

    #[error("Serialization error: {detail}")]
    #[diagnostic(code(docsnap::codec::encode))]
    Encode { detail: String },
}

/// Encode documents as a pretty-printed (2-space) canonical Extended JSON array.
pub fn encode(documents: &[Document]) -> Result<String, CodecError> {
    let values: Vec<serde_json::Value> = documents
        .iter()
        .map(|doc| Bson::Document(doc.clone()).into_canonical_extjson())
        .collect();

    serde_json::to_string_pretty(&values).map_err(|e| CodecError::Encode {
        detail: e.to_string(),
    })
}

/// Decode Extended JSON text into a BSON value.
///
/// Accepts both canonical and relaxed wrappers. The result is not checked for
/// shape; see [`into_documents`].
pub fn decode(text: &str) -> Result<Bson, CodecError> {
    let json: serde_json::Value = serde_json::from_str(text).map_err(|e| CodecError::Parse {
        detail: e.to_string(),
    })?;

    Bson::try_from(json).map_err(|e| CodecError::Parse {
        detail: e.to_string(),
    })
}

/// Require a decoded value to be an array of documents.
pub fn into_documents(value: Bson) -> Result<Vec<Document>, CodecError> {
    let Bson::Array(items) = value else {
        return Err(CodecError::Shape {
            detail: "Data is not an array, skipping".to_string(),
        });
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Bson::Document(doc) => Ok(doc),
            other => Err(CodecError::Shape {
                detail: format!(
                    "Element {} is a {:?}, not a document, skipping",
                    index,
                    other.element_type()
                ),
            }),
        })
        .collect()
}
