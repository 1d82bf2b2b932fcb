//! JSON decoding for lockfile documents.
//!
//! Decoding goes through `serde_json` with `preserve_order`, so object keys
//! keep the order they have in the file. Failures are reduced to a numeric
//! decoder code and rendered through a fixed message table.

use std::borrow::Cow;
use std::fmt;

use serde_json::error::Category;
use serde_json::{Map, Value};

/// Top-level lockfile object.
pub type Document = Map<String, Value>;

/// Nesting limit exceeded.
pub const JSON_ERROR_DEPTH: i32 = 1;
/// Structure does not match what the reader expects.
pub const JSON_ERROR_STATE_MISMATCH: i32 = 2;
/// Raw control character inside a string.
pub const JSON_ERROR_CTRL_CHAR: i32 = 3;
/// Anything else the grammar rejects.
pub const JSON_ERROR_SYNTAX: i32 = 4;
/// Invalid UTF-8 in the input.
pub const JSON_ERROR_UTF8: i32 = 5;
/// Unpaired UTF-16 surrogate in a `\u` escape. Not in the message table.
pub const JSON_ERROR_UTF16: i32 = 10;

/// Deepest nesting `serde_json` decodes. Its recursion limit of 128 admits
/// 127 nested arrays/objects.
pub const DECODER_DEPTH_LIMIT: usize = 127;

/// Failures that carry no decoder code (I/O and data errors).
const JSON_ERROR_UNCLASSIFIED: i32 = 0;

const JSON_ERROR_MESSAGES: [(i32, &str); 5] = [
    (JSON_ERROR_DEPTH, "Maximum stack depth exceeded"),
    (JSON_ERROR_STATE_MISMATCH, "Underflow or the modes mismatch"),
    (JSON_ERROR_CTRL_CHAR, "Unexpected control character found"),
    (JSON_ERROR_SYNTAX, "Syntax error, malformed JSON"),
    (
        JSON_ERROR_UTF8,
        "Malformed UTF-8 characters, possibly incorrectly encoded",
    ),
];

/// Human-readable reason for a decoder code.
///
/// # Example
///
/// ```
/// use composer_lock::decode::json_error_message;
///
/// assert_eq!(json_error_message(4), "Syntax error, malformed JSON");
/// assert_eq!(json_error_message(42), "Unknown error (42)");
/// ```
pub fn json_error_message(code: i32) -> Cow<'static, str> {
    JSON_ERROR_MESSAGES
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, message)| Cow::Borrowed(*message))
        .unwrap_or_else(|| Cow::Owned(format!("Unknown error ({code})")))
}

/// A decode failure reduced to its decoder code.
///
/// `Display` renders only the table message; the underlying `serde_json`
/// text (with line and column) is kept in [`detail`](Self::detail).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonError {
    code: i32,
    detail: Option<String>,
}

impl JsonError {
    pub fn new(code: i32) -> Self {
        Self { code, detail: None }
    }

    pub fn code(&self) -> i32 {
        self.code
    }

    pub fn message(&self) -> Cow<'static, str> {
        json_error_message(self.code)
    }

    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }
}

impl fmt::Display for JsonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

impl std::error::Error for JsonError {}

impl From<serde_json::Error> for JsonError {
    fn from(err: serde_json::Error) -> Self {
        let detail = err.to_string();
        let code = match err.classify() {
            Category::Syntax | Category::Eof => classify_syntax(&detail),
            Category::Io | Category::Data => JSON_ERROR_UNCLASSIFIED,
        };
        Self {
            code,
            detail: Some(detail),
        }
    }
}

fn classify_syntax(message: &str) -> i32 {
    if message.starts_with("recursion limit exceeded") {
        JSON_ERROR_DEPTH
    } else if message.starts_with("control character") {
        JSON_ERROR_CTRL_CHAR
    } else if message.starts_with("invalid unicode code point") {
        JSON_ERROR_UTF8
    } else if message.starts_with("lone leading surrogate")
        || message.starts_with("unexpected end of hex escape")
    {
        JSON_ERROR_UTF16
    } else {
        JSON_ERROR_SYNTAX
    }
}

/// Decode lockfile bytes into the top-level object.
///
/// `max_depth` bounds array/object nesting (`{}` has depth 1). Values above
/// [`DECODER_DEPTH_LIMIT`] have no effect: the decoder rejects anything deeper
/// with the same depth code.
pub fn decode_document(bytes: &[u8], max_depth: usize) -> Result<Document, JsonError> {
    let value: Value = serde_json::from_slice(bytes)?;

    if nesting_depth(&value) > max_depth {
        return Err(JsonError::new(JSON_ERROR_DEPTH));
    }

    match value {
        Value::Object(document) => Ok(document),
        _ => Err(JsonError::new(JSON_ERROR_STATE_MISMATCH)),
    }
}

fn nesting_depth(value: &Value) -> usize {
    match value {
        Value::Array(items) => 1 + items.iter().map(nesting_depth).max().unwrap_or(0),
        Value::Object(map) => 1 + map.values().map(nesting_depth).max().unwrap_or(0),
        _ => 0,
    }
}

/// Article-prefixed JSON type name for error messages.
pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
