use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;

use crate::response::AppError;

/// `axum::Json<T>` that rejects with [`AppError`] instead of axum's plain-text body.
///
/// Data errors echo serde's message (field path and expected type) so a
/// detector integration can see which landmark field it got wrong.
pub struct JsonBody<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        axum::Json::<T>::from_request(req, state)
            .await
            .map(|axum::Json(value)| JsonBody(value))
            .map_err(rejection_to_app_error)
    }
}

fn rejection_to_app_error(rejection: JsonRejection) -> AppError {
    tracing::warn!(status = %rejection.status(), error = %rejection, "Rejected JSON body");
    let message = match &rejection {
        JsonRejection::JsonDataError(_) | JsonRejection::JsonSyntaxError(_) => {
            rejection.body_text()
        }
        JsonRejection::MissingJsonContentType(_) => {
            "Expected an application/json body".to_string()
        }
        _ => "Request body could not be read".to_string(),
    };
    AppError::bad_request("INVALID_REQUEST_BODY", &message)
}
