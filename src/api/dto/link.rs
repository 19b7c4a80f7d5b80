//! DTOs for the link endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use validator::Validate;

use crate::domain::entities::{Allocation, Link};
use crate::error::AppError;
use crate::utils::url_validator::validate_target_url;

/// Request body for `POST /api/links`.
///
/// Both fields are kept as raw JSON so that a value of the wrong type is
/// reported as the matching domain error (`invalid_url` for `longUrl`,
/// `invalid_code_format` for `customCode`) rather than a generic
/// deserialization failure.
///
/// Only a JSON object is accepted; any other body (an array, a bare string)
/// is rejected before field extraction.
#[derive(Debug, Default, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct CreateLinkRequest {
    pub long_url: Option<Value>,
    pub custom_code: Option<Value>,
}

impl From<Map<String, Value>> for CreateLinkRequest {
    fn from(mut body: Map<String, Value>) -> Self {
        Self {
            long_url: body.remove("longUrl"),
            custom_code: body.remove("customCode"),
        }
    }
}

impl CreateLinkRequest {
    /// Extracts the typed `(long_url, custom_code)` pair.
    ///
    /// `customCode` that is absent, `null` or `""` means "generate a code".
    ///
    /// # Errors
    ///
    /// - [`AppError::InvalidUrl`] if `longUrl` is missing or not a string
    /// - [`AppError::InvalidCodeFormat`] if `customCode` is present but not a
    ///   string and `longUrl` is a valid target; URL errors are reported first
    pub fn into_parts(self) -> Result<(String, Option<String>), AppError> {
        let long_url = match self.long_url {
            Some(Value::String(url)) => url,
            Some(_) => {
                return Err(AppError::invalid_url(
                    "Invalid URL",
                    json!({ "reason": "longUrl must be a string" }),
                ));
            }
            None => {
                return Err(AppError::invalid_url(
                    "Invalid URL",
                    json!({ "reason": "longUrl is required" }),
                ));
            }
        };

        let custom_code = match self.custom_code {
            None | Some(Value::Null) => None,
            Some(Value::String(code)) if code.is_empty() => None,
            Some(Value::String(code)) => Some(code),
            Some(_) => {
                validate_target_url(&long_url)?;
                return Err(AppError::invalid_code_format(
                    "Code must be 6-8 alphanumeric characters",
                    json!({ "reason": "customCode must be a string" }),
                ));
            }
        };

        Ok((long_url, custom_code))
    }
}

/// Query parameters for `GET /api/links`.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ListLinksQuery {
    /// Case-insensitive substring matched against code and target URL.
    #[validate(length(max = 2048))]
    pub search: Option<String>,
}

/// JSON representation of a link.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinkResponse {
    pub code: String,
    pub target_url: String,
    pub clicks: i64,
    pub last_clicked: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<Link> for LinkResponse {
    fn from(link: Link) -> Self {
        Self {
            code: link.code,
            target_url: link.target_url,
            clicks: link.clicks,
            last_clicked: link.last_clicked,
            created_at: link.created_at,
        }
    }
}

/// Response for `POST /api/links`.
///
/// `persisted` is `false` only for links synthesized in degraded mode,
/// which are not in the store and will not resolve.
#[derive(Debug, Serialize)]
pub struct CreatedLinkResponse {
    #[serde(flatten)]
    pub link: LinkResponse,
    pub persisted: bool,
}

impl From<Allocation> for CreatedLinkResponse {
    fn from(allocation: Allocation) -> Self {
        let persisted = allocation.is_persisted();
        Self {
            link: allocation.into_link().into(),
            persisted,
        }
    }
}

/// Response for `DELETE /api/links/{code}`.
#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub deleted: bool,
}
