// src/message.rs
use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    Vi,
    En,
}

impl Language {
    /// `"vi"` selects Vietnamese; any other supplied code selects English.
    pub fn from_code(code: &str) -> Self {
        if code == "vi" { Language::Vi } else { Language::En }
    }

    pub fn code(self) -> &'static str {
        match self {
            Language::Vi => "vi",
            Language::En => "en",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Language::Vi => "Tiếng Việt",
            Language::En => "English",
        }
    }
}

/// One chat request. Every field is plain text by the time it reaches the
/// prompt builder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatRequest {
    pub message: String,
    pub conversation_history: String,
    pub document_content: String,
    pub dictionary_content: String,
    pub language: Language,
}

impl ChatRequest {
    /// Decode a request body without ever rejecting it.
    ///
    /// Invalid JSON and non-object JSON behave like `{}`. Missing or `null`
    /// fields take their defaults; non-string values are kept as their
    /// compact JSON text.
    pub fn from_body(body: &[u8]) -> Self {
        match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(fields)) => Self::from_fields(&fields),
            _ => Self::default(),
        }
    }

    fn from_fields(fields: &Map<String, Value>) -> Self {
        let language = match fields.get("language") {
            None | Some(Value::Null) => Language::default(),
            Some(value) => Language::from_code(&as_text(value)),
        };

        Self {
            message: text_field(fields, "message"),
            conversation_history: text_field(fields, "conversation_history"),
            document_content: text_field(fields, "document_content"),
            dictionary_content: text_field(fields, "dictionary_content"),
            language,
        }
    }
}

fn text_field(fields: &Map<String, Value>, key: &str) -> String {
    fields.get(key).map(as_text).unwrap_or_default()
}

fn as_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_body_is_taken_verbatim() {
        let req = ChatRequest::from_body(
            br#"{"message":"hi","conversation_history":"u: a","document_content":"doc","dictionary_content":"dict","language":"en"}"#,
        );
        assert_eq!(req.message, "hi");
        assert_eq!(req.conversation_history, "u: a");
        assert_eq!(req.document_content, "doc");
        assert_eq!(req.dictionary_content, "dict");
        assert_eq!(req.language, Language::En);
    }

    #[test]
    fn garbage_and_non_objects_default() {
        for body in [&b"not json"[..], b"", b"[1,2]", b"\"text\"", b"42"] {
            assert_eq!(ChatRequest::from_body(body), ChatRequest::default());
        }
    }

    #[test]
    fn null_and_missing_fields_default() {
        let req = ChatRequest::from_body(br#"{"message":null,"language":null}"#);
        assert_eq!(req.message, "");
        assert_eq!(req.language, Language::Vi);
    }

    #[test]
    fn structured_history_is_inlined_as_json() {
        let req = ChatRequest::from_body(
            r#"{"conversation_history":[{"role":"user","content":"xin chào"}]}"#.as_bytes(),
        );
        assert_eq!(
            req.conversation_history,
            r#"[{"content":"xin chào","role":"user"}]"#
        );
    }

    #[test]
    fn unknown_language_code_means_english() {
        assert_eq!(Language::from_code("vi"), Language::Vi);
        assert_eq!(Language::from_code("fr"), Language::En);
        assert_eq!(Language::from_code(""), Language::En);
    }
}
