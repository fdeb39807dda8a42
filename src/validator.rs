//! Extractors that reject malformed input with the service's JSON error
//! body. [`ValidatedJson`] also runs `validator` rules before the handler
//! sees the payload.

use anyhow::anyhow;
use axum::{
    Json,
    extract::{
        FromRequest, FromRequestParts, Path, Request,
        rejection::{JsonRejection, PathRejection},
    },
    http::{StatusCode, request::Parts},
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use campus_core::AppError;

const DATA_ERROR_PREFIX: &str = "Failed to deserialize the JSON body into the target type: ";

/// Joins field errors in field order, falling back to "`field` is invalid"
/// for rules without a message.
fn format_errors(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .into_iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| match &error.message {
                Some(message) => message.to_string(),
                None => format!("{} is invalid", field),
            })
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Turns a serde data error into something a client can act on. Value type
/// errors such as "Invalid username: ..." pass through.
fn describe_data_error(body_text: &str) -> String {
    let detail = body_text
        .strip_prefix(DATA_ERROR_PREFIX)
        .unwrap_or(body_text);
    let detail = detail
        .rsplit_once(" at line ")
        .map_or(detail, |(head, _)| head);

    if let Some(rest) = detail.strip_prefix("missing field `") {
        if let Some((field, _)) = rest.split_once('`') {
            return format!("{} is required", field);
        }
    }

    detail.to_string()
}

fn rejection_error(rejection: JsonRejection) -> AppError {
    let message = match &rejection {
        JsonRejection::MissingJsonContentType(_) => {
            "Missing 'Content-Type: application/json' header".to_string()
        }
        JsonRejection::JsonSyntaxError(_) => "Request body is not valid JSON".to_string(),
        JsonRejection::JsonDataError(err) => describe_data_error(&err.body_text()),
        other => other.body_text(),
    };

    AppError::new(StatusCode::BAD_REQUEST, anyhow!(message))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(rejection_error)?;

        value.validate().map_err(|errors| {
            AppError::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                anyhow!("{}", format_errors(&errors)),
            )
        })?;

        Ok(ValidatedJson(value))
    }
}

/// Path parameters whose parse failures come back as a 400 JSON error
/// rather than axum's plain-text rejection.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedPath<T>(pub T);

fn path_rejection_error(rejection: PathRejection) -> AppError {
    let message = match &rejection {
        PathRejection::FailedToDeserializePathParams(err) => {
            format!("Invalid path parameter: {}", err.body_text())
        }
        other => other.body_text(),
    };

    AppError::bad_request(anyhow!(message))
}

impl<T, S> FromRequestParts<S> for ValidatedPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(path_rejection_error)?;

        Ok(ValidatedPath(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::ValidationError;

    #[test]
    fn test_missing_field_is_reported_as_required() {
        let text = format!("{}missing field `email` at line 1 column 2", DATA_ERROR_PREFIX);
        assert_eq!(describe_data_error(&text), "email is required");
    }

    #[test]
    fn test_value_type_error_passes_through() {
        let text = format!(
            "{}username: Invalid username: must be 3-50 characters at line 1 column 17",
            DATA_ERROR_PREFIX
        );
        assert_eq!(
            describe_data_error(&text),
            "username: Invalid username: must be 3-50 characters"
        );
    }

    #[test]
    fn test_unrecognised_text_is_kept() {
        assert_eq!(describe_data_error("something odd"), "something odd");
    }

    #[test]
    fn test_format_errors_orders_fields() {
        let mut errors = ValidationErrors::new();
        errors.add(
            "token",
            ValidationError::new("length").with_message("Token is required".into()),
        );
        errors.add("email", ValidationError::new("email"));

        assert_eq!(
            format_errors(&errors),
            "email is invalid, Token is required"
        );
    }
}
