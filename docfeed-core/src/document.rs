use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize, Serializer};

/// Canonical unit of ingestion, shaped to the indexing service's batch-put
/// contract. The binary content is fully buffered; no streaming handles.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedDocument {
    pub id: String,
    pub content_type: ContentType,
    pub title: String,
    pub content: DocumentContent,
    pub attributes: Vec<DocumentAttribute>,
}

/// Binary payload wrapper; serialises as `{ "blob": "<base64>" }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentContent {
    #[serde(serialize_with = "blob_as_base64")]
    pub blob: Vec<u8>,
}

/// Content kind of a source's documents, fixed per source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentType {
    #[serde(rename = "PDF")]
    Pdf,
    #[serde(rename = "HTML")]
    Html,
    #[serde(rename = "PLAIN_TEXT")]
    PlainText,
}

impl Default for ContentType {
    fn default() -> Self {
        ContentType::Pdf
    }
}

/// Classification attribute attached to a document (e.g. `_category`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentAttribute {
    pub name: String,
    pub value: AttributeValue,
}

impl DocumentAttribute {
    pub fn string(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: AttributeValue::StringValue(value.into()),
        }
    }
}

/// Typed attribute value; serialises as `{ "stringValue": ... }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AttributeValue {
    StringValue(String),
}

fn blob_as_base64<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&STANDARD.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_serialises_to_wire_shape() {
        let document = NormalizedDocument {
            id: "a.pdf".to_string(),
            content_type: ContentType::Pdf,
            title: "a.pdf".to_string(),
            content: DocumentContent {
                blob: b"%PDF-1.4".to_vec(),
            },
            attributes: vec![DocumentAttribute::string("_category", "Documents")],
        };

        let value = serde_json::to_value(&document).unwrap();
        assert_eq!(value["id"], "a.pdf");
        assert_eq!(value["contentType"], "PDF");
        assert_eq!(value["title"], "a.pdf");
        assert_eq!(value["content"]["blob"], STANDARD.encode(b"%PDF-1.4"));
        assert_eq!(value["attributes"][0]["name"], "_category");
        assert_eq!(value["attributes"][0]["value"]["stringValue"], "Documents");
    }

    #[test]
    fn content_type_defaults_to_pdf() {
        assert_eq!(ContentType::default(), ContentType::Pdf);
    }
}
