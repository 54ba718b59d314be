use crate::error::FnotifierError;
use crate::service::submission::ContactForm;
use axum::{
    Form,
    extract::{FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
};

/// `POST /SendForm` body, read from either `application/x-www-form-urlencoded` or
/// `multipart/form-data` (what a browser sends for `new FormData(form)`).
pub struct ContactFormBody(pub ContactForm);

impl<S> FromRequest<S> for ContactFormBody
where
    S: Send + Sync,
{
    type Rejection = FnotifierError;

    /// Any body that is neither form encoding becomes a 400 `INVALID_FORM`.
    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if is_multipart(&req) {
            let multipart = Multipart::from_request(req, state).await?;
            return Ok(Self(read_multipart(multipart).await?));
        }
        let Form(form) = Form::<ContactForm>::from_request(req, state).await?;
        Ok(Self(form))
    }
}

fn is_multipart(req: &Request) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| {
            ct.trim_start()
                .to_ascii_lowercase()
                .starts_with("multipart/form-data")
        })
}

/// First value of each known field wins; unknown parts (file uploads included) are skipped.
async fn read_multipart(mut multipart: Multipart) -> Result<ContactForm, FnotifierError> {
    let mut form = ContactForm::default();
    while let Some(field) = multipart.next_field().await? {
        let slot = match field.name() {
            Some("name") => &mut form.name,
            Some("gmail") => &mut form.gmail,
            Some("description") => &mut form.description,
            _ => continue,
        };
        let value = field.text().await?;
        if slot.is_empty() {
            *slot = value;
        }
    }
    Ok(form)
}
