//! Response normalization
//!
//! The backend answers in more than one shape. [`BackendResponse::parse`]
//! classifies a raw HTTP answer and [`normalize`] turns any classified answer
//! into a [`StandardResult`]. Neither function can fail.

use serde::{Deserialize, Deserializer};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::codes::ErrorCode;
use crate::responses::{Pagination, StandardResult};

/// `status` block of the status-wrapped shape
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseStatus {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(
        default,
        alias = "error_code",
        alias = "code",
        deserialize_with = "lenient_code"
    )]
    pub error_code: Option<String>,
}

/// `{ status: { success, message, errorCode }, data?, pagination? }`
#[derive(Debug, Clone)]
pub struct WrappedResponse<T> {
    pub status: ResponseStatus,
    pub data: Option<T>,
    pub pagination: Option<Pagination>,
}

/// `{ success, data?, message?, total?, pagination? }`
#[derive(Debug, Clone)]
pub struct FlatResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub error_code: Option<String>,
    pub total: Option<u64>,
    pub pagination: Option<Pagination>,
}

/// A classified backend answer
#[derive(Debug, Clone)]
pub enum BackendResponse<T> {
    /// Status-wrapped envelope
    Wrapped(WrappedResponse<T>),
    /// Flat envelope
    Flat(FlatResponse<T>),
    /// 2xx answer whose body is the payload itself
    Payload(T),
    /// 2xx answer without a body
    Empty,
    /// Answer without a usable body
    Bare { status: u16, status_text: String },
}

#[derive(Deserialize)]
struct WrappedEnvelope {
    status: ResponseStatus,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    pagination: Option<Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FlatEnvelope {
    success: bool,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    message: Option<String>,
    #[serde(
        default,
        alias = "error_code",
        alias = "code",
        deserialize_with = "lenient_code"
    )]
    error_code: Option<String>,
    #[serde(default)]
    total: Option<Value>,
    #[serde(default)]
    pagination: Option<Value>,
}

impl<T: DeserializeOwned> BackendResponse<T> {
    /// Classify a raw HTTP answer
    ///
    /// Payload data is only decoded for successful envelopes; a failure
    /// envelope never needs it. Once an envelope's success flag is readable,
    /// its flag and message are kept even when `data` or `pagination` does
    /// not decode; those parts are dropped instead. Anything else that cannot
    /// be decoded becomes [`BackendResponse::Bare`].
    pub fn parse(status: u16, status_text: &str, body: &str) -> Self {
        let is_2xx = (200..300).contains(&status);
        let bare = || Self::Bare {
            status,
            status_text: status_text.to_string(),
        };

        let body = body.trim();
        if body.is_empty() {
            return if is_2xx { Self::Empty } else { bare() };
        }

        let value: Value = match serde_json::from_str(body) {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!(status, error = %e, "response body is not JSON");
                return bare();
            }
        };

        if is_wrapped(&value) {
            let envelope: WrappedEnvelope = match serde_json::from_value(value) {
                Ok(envelope) => envelope,
                Err(e) => {
                    tracing::warn!(status, error = %e, "malformed status-wrapped response");
                    return bare();
                }
            };
            let data = if envelope.status.success {
                decode_data(status, envelope.data)
            } else {
                None
            };
            return Self::Wrapped(WrappedResponse {
                status: envelope.status,
                data,
                pagination: decode_pagination(status, envelope.pagination),
            });
        }

        if is_flat(&value) {
            let envelope: FlatEnvelope = match serde_json::from_value(value) {
                Ok(envelope) => envelope,
                Err(e) => {
                    tracing::warn!(status, error = %e, "malformed flat response");
                    return bare();
                }
            };
            let data = if envelope.success {
                decode_data(status, envelope.data)
            } else {
                None
            };
            return Self::Flat(FlatResponse {
                success: envelope.success,
                data,
                message: envelope.message,
                error_code: envelope.error_code,
                total: envelope.total.as_ref().and_then(Value::as_u64),
                pagination: decode_pagination(status, envelope.pagination),
            });
        }

        if is_2xx {
            match serde_json::from_value(value) {
                Ok(payload) => Self::Payload(payload),
                Err(e) => {
                    tracing::warn!(status, error = %e, "unrecognized response shape");
                    bare()
                }
            }
        } else {
            bare()
        }
    }
}

fn is_wrapped(value: &Value) -> bool {
    value
        .get("status")
        .and_then(|s| s.get("success"))
        .is_some_and(Value::is_boolean)
}

fn is_flat(value: &Value) -> bool {
    value.get("success").is_some_and(Value::is_boolean)
}

fn decode_data<T: DeserializeOwned>(status: u16, data: Option<Value>) -> Option<T> {
    match serde_json::from_value(data.filter(|v| !v.is_null())?) {
        Ok(data) => Some(data),
        Err(e) => {
            tracing::warn!(status, error = %e, "response data does not match the expected type");
            None
        }
    }
}

fn decode_pagination(status: u16, pagination: Option<Value>) -> Option<Pagination> {
    match serde_json::from_value(pagination.filter(|v| !v.is_null())?) {
        Ok(pagination) => Some(pagination),
        Err(e) => {
            tracing::warn!(status, error = %e, "ignoring malformed pagination block");
            None
        }
    }
}

/// Error codes arrive as strings or numbers
fn lenient_code<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(code)) => Some(code),
        Some(other) => Some(other.to_string()),
    })
}

/// Convert any classified backend answer into the canonical result
pub fn normalize<T>(raw: BackendResponse<T>) -> StandardResult<T> {
    match raw {
        BackendResponse::Wrapped(wrapped) => {
            let result = StandardResult {
                success: wrapped.status.success,
                data: if wrapped.status.success {
                    wrapped.data
                } else {
                    None
                },
                message: wrapped.status.message,
                error_code: wrapped.status.error_code,
                total: None,
                pagination: None,
            };
            match wrapped.pagination {
                Some(p) => result.with_pagination(p),
                None => result,
            }
        }
        BackendResponse::Flat(flat) => {
            let result = StandardResult {
                success: flat.success,
                data: if flat.success { flat.data } else { None },
                message: flat.message,
                error_code: flat.error_code,
                total: None,
                pagination: None,
            };
            let total = flat.total.or(flat.pagination.map(|p| p.total()));
            let result = match flat.pagination {
                Some(p) => result.with_pagination(p),
                None => result,
            };
            match total {
                Some(total) => result.with_total(total),
                None => result,
            }
        }
        BackendResponse::Payload(data) => StandardResult::ok(data),
        BackendResponse::Empty => StandardResult::ok_empty(),
        BackendResponse::Bare {
            status,
            status_text,
        } => StandardResult::failure(
            ErrorCode::Http(status),
            format!("HTTP {status}: {status_text}"),
        ),
    }
}

/// Classify and normalize in one step
pub fn normalize_body<T: DeserializeOwned>(
    status: u16,
    status_text: &str,
    body: &str,
) -> StandardResult<T> {
    normalize(BackendResponse::parse(status, status_text, body))
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;
    use crate::responses::DEFAULT_PAGE_SIZE;

    fn parse(status: u16, body: &Value) -> StandardResult<Vec<u32>> {
        normalize_body(status, "OK", &body.to_string())
    }

    #[test]
    fn test_wrapped_copies_status() {
        let result = parse(
            200,
            &json!({
                "status": {"success": true, "message": "fine", "errorCode": null},
                "data": [1, 2, 3],
                "pagination": {"page": 2, "pageSize": 20, "total": 35, "totalPages": 2}
            }),
        );
        assert!(result.success);
        assert_eq!(result.message.as_deref(), Some("fine"));
        assert_eq!(result.data, Some(vec![1, 2, 3]));

        let p = result.pagination.unwrap();
        assert_eq!(p.current(), 2);
        assert_eq!(p.total_pages(), 2);
        assert_eq!(result.total, Some(35));
    }

    #[test]
    fn test_wrapped_failure_drops_data() {
        let result = parse(
            200,
            &json!({
                "status": {"success": false, "message": "name taken", "errorCode": "DUPLICATE"},
                "data": {"unexpected": "shape"}
            }),
        );
        assert!(!result.success);
        assert!(result.data.is_none());
        assert_eq!(result.message.as_deref(), Some("name taken"));
        assert_eq!(result.error_code.as_deref(), Some("DUPLICATE"));
    }

    #[test]
    fn test_wrapped_property_over_combinations() {
        for success in [true, false] {
            for message in [None, Some("m")] {
                let body = json!({"status": {"success": success, "message": message}});
                let result = parse(200, &body);
                assert_eq!(result.success, success);
                assert_eq!(result.message.as_deref(), message);
            }
        }
    }

    #[test]
    fn test_flat_passthrough() {
        let result = parse(
            200,
            &json!({"success": true, "data": [7], "message": "ok", "total": 41,
                    "pagination": {"current": 3, "pageSize": 20, "total": 41}}),
        );
        assert!(result.success);
        assert_eq!(result.data, Some(vec![7]));
        let p = result.pagination.unwrap();
        assert_eq!(p.current(), 3);
        assert_eq!(p.total_pages(), 3);
        assert_eq!(result.total, Some(41));
    }

    #[test]
    fn test_flat_total_overrides_pagination_total() {
        for total in [0_u64, 1, 19, 20, 21, 99, 100, 101] {
            for page_size in [1_u64, 7, 20] {
                let result = parse(
                    200,
                    &json!({"success": true, "total": total,
                            "pagination": {"current": 1, "pageSize": page_size, "total": 5}}),
                );
                let p = result.pagination.unwrap();
                assert_eq!(p.total(), total);
                assert_eq!(p.total_pages(), total.div_ceil(page_size));
                assert_eq!(result.total, Some(total));
            }
        }
    }

    #[test]
    fn test_flat_total_without_pagination() {
        let result = parse(200, &json!({"success": true, "data": [], "total": 3}));
        assert_eq!(result.total, Some(3));
        assert!(result.pagination.is_none());
    }

    #[test]
    fn test_unparseable_non_2xx() {
        let result: StandardResult<Value> =
            normalize_body(502, "Bad Gateway", "<html>upstream down</html>");
        assert!(!result.success);
        assert_eq!(result.message.as_deref(), Some("HTTP 502: Bad Gateway"));
        assert!(result.error_code.unwrap().starts_with("HTTP_"));
    }

    #[test]
    fn test_empty_non_2xx() {
        let result: StandardResult<Value> = normalize_body(404, "Not Found", "");
        assert_eq!(result.error_code.as_deref(), Some("HTTP_404"));
    }

    #[test]
    fn test_empty_2xx_is_success() {
        let result: StandardResult<Value> = normalize_body(204, "No Content", "");
        assert!(result.success);
        assert!(result.data.is_none());
    }

    #[test]
    fn test_bare_payload_2xx() {
        let result = parse(200, &json!([4, 5]));
        assert!(result.success);
        assert_eq!(result.data, Some(vec![4, 5]));
    }

    #[test]
    fn test_mismatched_data_keeps_envelope() {
        let result = parse(200, &json!({"success": true, "data": "not a list", "message": "ok"}));
        assert!(result.success);
        assert!(result.data.is_none());
        assert_eq!(result.message.as_deref(), Some("ok"));

        let result = parse(200, &json!({"status": {"success": true}, "data": {"a": 1}}));
        assert!(result.success);
        assert!(result.data.is_none());
    }

    #[test]
    fn test_wrapped_pagination_variants() {
        let result = parse(
            200,
            &json!({
                "status": {"success": true},
                "data": [1, 2, 3],
                "pagination": {"current": 2, "pageSize": 20, "total": 35}
            }),
        );
        assert!(result.success);
        assert_eq!(result.data, Some(vec![1, 2, 3]));
        let p = result.pagination.unwrap();
        assert_eq!((p.current(), p.page_size(), p.total_pages()), (2, 20, 2));

        let result = parse(
            200,
            &json!({"status": {"success": true}, "data": [1], "pagination": {"page": 1, "total": 1}}),
        );
        assert!(result.success);
        let p = result.pagination.unwrap();
        assert_eq!((p.current(), p.page_size(), p.total()), (1, DEFAULT_PAGE_SIZE, 1));
        assert_eq!(result.total, Some(1));
    }

    #[test]
    fn test_malformed_pagination_keeps_status() {
        let result = parse(
            200,
            &json!({"status": {"success": true, "message": "fine"}, "data": [9],
                    "pagination": {"page": "two"}}),
        );
        assert!(result.success);
        assert_eq!(result.message.as_deref(), Some("fine"));
        assert_eq!(result.data, Some(vec![9]));
        assert!(result.pagination.is_none());
    }

    #[test]
    fn test_numeric_error_code() {
        let result = parse(
            400,
            &json!({"status": {"success": false, "message": "name taken", "errorCode": 1001}}),
        );
        assert!(!result.success);
        assert_eq!(result.message.as_deref(), Some("name taken"));
        assert_eq!(result.error_code.as_deref(), Some("1001"));

        let result = parse(409, &json!({"success": false, "message": "busy", "code": 7}));
        assert_eq!(result.message.as_deref(), Some("busy"));
        assert_eq!(result.error_code.as_deref(), Some("7"));
    }

    #[test]
    fn test_snake_case_error_code_alias() {
        let result = parse(400, &json!({"success": false, "error_code": "BAD_PORT"}));
        assert_eq!(result.error_code.as_deref(), Some("BAD_PORT"));
    }
}
