use serde_json::json;

pub fn ok(id: &str, result: serde_json::Value) -> serde_json::Value {
    json!({
        "id": id,
        "ok": true,
        "result": result
    })
}

pub fn err(
    id: &str,
    code: &str,
    message: impl Into<String>,
    details: Option<serde_json::Value>,
) -> serde_json::Value {
    let mut error = json!({
        "code": code,
        "message": message.into(),
    });
    if let Some(d) = details {
        error["details"] = d;
    }
    json!({
        "id": id,
        "ok": false,
        "error": error,
    })
}

/// Handler-local failure, rendered into the error envelope by the caller.
pub struct HandlerErr {
    pub code: &'static str,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl HandlerErr {
    pub fn bad_params(message: impl Into<String>) -> Self {
        Self {
            code: "bad_params",
            message: message.into(),
            details: None,
        }
    }

    pub fn response(self, id: &str) -> serde_json::Value {
        err(id, self.code, self.message, self.details)
    }
}

impl From<crate::store::StoreError> for HandlerErr {
    fn from(e: crate::store::StoreError) -> Self {
        use crate::store::StoreError;
        match e {
            StoreError::DayMismatch {
                ref student_id,
                expected,
                found,
            } => HandlerErr {
                code: "day_mismatch",
                details: Some(json!({
                    "studentId": student_id,
                    "expected": expected.to_string(),
                    "found": found.to_string(),
                })),
                message: e.to_string(),
            },
            other => HandlerErr {
                code: "db_update_failed",
                message: other.to_string(),
                details: None,
            },
        }
    }
}
