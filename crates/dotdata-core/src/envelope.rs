//! Uniform response envelope around an operation result.
//!
//! Envelopes are built through the named factories on [`EnvelopeConfig`],
//! which fix the conventional status and error codes and take default
//! messages from the config instead of any global state.

use std::fmt;

use chrono::{SecondsFormat, Utc};
use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value, json};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultMessages {
    pub success: String,
    pub error: String,
    pub validation_failed: String,
    pub not_found: String,
    pub unauthorized: String,
    pub forbidden: String,
    pub server_error: String,
    pub created: String,
    pub updated: String,
    pub deleted: String,
}

impl Default for DefaultMessages {
    fn default() -> Self {
        Self {
            success: "Operation completed successfully".into(),
            error: "An error occurred".into(),
            validation_failed: "Validation failed".into(),
            not_found: "Resource not found".into(),
            unauthorized: "Unauthorized access".into(),
            forbidden: "Access forbidden".into(),
            server_error: "Internal server error".into(),
            created: "Resource created successfully".into(),
            updated: "Resource updated successfully".into(),
            deleted: "Resource deleted successfully".into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EnvelopeConfig {
    pub messages: DefaultMessages,
    pub include_timestamp: bool,
    pub include_request_id: bool,
}

impl Default for EnvelopeConfig {
    fn default() -> Self {
        Self {
            messages: DefaultMessages::default(),
            include_timestamp: true,
            include_request_id: true,
        }
    }
}

pub const VALIDATION_ERROR_CODE: u32 = 1001;
pub const NOT_FOUND_ERROR_CODE: u32 = 1002;
pub const UNAUTHORIZED_ERROR_CODE: u32 = 1003;
pub const FORBIDDEN_ERROR_CODE: u32 = 1004;
pub const SERVER_ERROR_CODE: u32 = 1005;

impl EnvelopeConfig {
    fn build(
        &self,
        data: Value,
        message: &str,
        status: u16,
        success: bool,
        error_code: Option<u32>,
    ) -> Envelope {
        Envelope {
            data,
            message: message.to_string(),
            status,
            success,
            error_code,
            meta: Map::new(),
            headers: IndexMap::new(),
            request_id: self
                .include_request_id
                .then(|| Uuid::new_v4().to_string()),
            include_timestamp: self.include_timestamp,
        }
    }

    pub fn success(&self, data: Value) -> Envelope {
        self.build(data, &self.messages.success, 200, true, None)
    }

    pub fn created(&self, data: Value) -> Envelope {
        self.build(data, &self.messages.created, 201, true, None)
    }

    pub fn updated(&self, data: Value) -> Envelope {
        self.build(data, &self.messages.updated, 200, true, None)
    }

    pub fn deleted(&self) -> Envelope {
        self.build(Value::Null, &self.messages.deleted, 200, true, None)
    }

    /// Generic 400 failure with no error code; use `with_status` for others.
    pub fn error(&self, errors: Value) -> Envelope {
        self.build(errors, &self.messages.error, 400, false, None)
    }

    pub fn validation_error(&self, errors: Value) -> Envelope {
        self.build(
            errors,
            &self.messages.validation_failed,
            422,
            false,
            Some(VALIDATION_ERROR_CODE),
        )
    }

    pub fn not_found(&self) -> Envelope {
        self.build(
            json!([]),
            &self.messages.not_found,
            404,
            false,
            Some(NOT_FOUND_ERROR_CODE),
        )
    }

    pub fn unauthorized(&self) -> Envelope {
        self.build(
            json!([]),
            &self.messages.unauthorized,
            401,
            false,
            Some(UNAUTHORIZED_ERROR_CODE),
        )
    }

    pub fn forbidden(&self) -> Envelope {
        self.build(
            json!([]),
            &self.messages.forbidden,
            403,
            false,
            Some(FORBIDDEN_ERROR_CODE),
        )
    }

    pub fn server_error(&self, data: Value) -> Envelope {
        self.build(
            data,
            &self.messages.server_error,
            500,
            false,
            Some(SERVER_ERROR_CODE),
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    /// Payload on success, error details on failure.
    pub data: Value,
    pub message: String,
    pub status: u16,
    pub success: bool,
    pub error_code: Option<u32>,
    pub meta: Map<String, Value>,
    pub headers: IndexMap<String, String>,
    pub request_id: Option<String>,
    pub include_timestamp: bool,
}

fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl Envelope {
    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn is_error(&self) -> bool {
        !self.success
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    pub fn with_error_code(mut self, error_code: Option<u32>) -> Self {
        self.error_code = error_code;
        self
    }

    /// Merge into existing metadata; later keys overwrite.
    pub fn with_meta(mut self, meta: Map<String, Value>) -> Self {
        self.meta.extend(meta);
        self
    }

    pub fn with_headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Transport shape: `data` on success, `errors` (+ `error_code`) on
    /// failure, `meta` only when non-empty.
    pub fn to_api_value(&self) -> Value {
        let mut out = Map::new();
        out.insert("success".into(), Value::Bool(self.success));
        out.insert("message".into(), Value::String(self.message.clone()));
        if self.include_timestamp {
            out.insert("timestamp".into(), Value::String(now_iso()));
        }
        if let Some(id) = self.request_id.as_ref().filter(|id| !id.is_empty()) {
            out.insert("request_id".into(), Value::String(id.clone()));
        }
        if self.success {
            out.insert("data".into(), self.data.clone());
        } else {
            out.insert("errors".into(), self.data.clone());
            if let Some(code) = self.error_code.filter(|c| *c != 0) {
                out.insert("error_code".into(), json!(code));
            }
        }
        if !self.meta.is_empty() {
            out.insert("meta".into(), Value::Object(self.meta.clone()));
        }
        Value::Object(out)
    }

    /// Full shape with every field present.
    pub fn to_value(&self) -> Value {
        json!({
            "success": self.success,
            "message": self.message,
            "data": self.data,
            "status": self.status,
            "error_code": self.error_code,
            "meta": self.meta,
            "request_id": self.request_id,
            "timestamp": now_iso(),
        })
    }

    pub fn to_json(&self) -> String {
        self.to_value().to_string()
    }
}

impl Serialize for Envelope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl fmt::Display for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_json())
    }
}
