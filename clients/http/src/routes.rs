use actix_web::{
    delete, get,
    http::header::ContentType,
    post, put,
    web::{self, Bytes, Data},
    HttpMessage, HttpRequest, HttpResponse,
};
use chrono::Local;
use database::{model::person::PersonFields, persistence::PersonStore};
use serde::Deserialize;

use crate::errors::{ApiError, ErrorBody, UNKNOWN_ENDPOINT};

/// Request body of create and update, fields are checked by the handlers and the store
#[derive(Deserialize, Debug, Default)]
pub struct PersonBody {
    pub name: Option<String>,
    pub number: Option<String>,
}

impl PersonBody {
    /// Only JSON payloads are parsed. A request without a body, or with a body of another content
    /// type, carries no fields.
    pub fn from_request(req: &HttpRequest, payload: &Bytes) -> Result<Self, ApiError> {
        let content_type = req.content_type();
        let is_json = content_type == "application/json" || content_type.ends_with("+json");

        if payload.is_empty() || !is_json {
            return Ok(PersonBody::default());
        }

        serde_json::from_slice(payload).map_err(|err| ApiError::MalformedBody(err.to_string()))
    }
}

#[get("/api/persons")]
async fn list_persons(store: Data<dyn PersonStore>) -> Result<HttpResponse, ApiError> {
    let people = store.list_all().await?;

    Ok(HttpResponse::Ok().json(people))
}

#[get("/api/persons/{id}")]
async fn get_person(
    store: Data<dyn PersonStore>,
    id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    match store.find_by_id(&id).await? {
        Some(person) => Ok(HttpResponse::Ok().json(person)),
        None => Err(ApiError::NotFound),
    }
}

/// Summary page, rendered fresh on every request
#[get("/info")]
async fn info(store: Data<dyn PersonStore>) -> Result<HttpResponse, ApiError> {
    let count = store.count().await?;

    let body = format!(
        "<p>Phonebook has info for {} people</p>\n<p>{}</p>",
        count,
        Local::now().format("%a %b %d %Y %H:%M:%S GMT%z")
    );

    Ok(HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(body))
}

#[post("/api/persons")]
async fn create_person(
    store: Data<dyn PersonStore>,
    req: HttpRequest,
    payload: Bytes,
) -> Result<HttpResponse, ApiError> {
    let PersonBody { name, number } = PersonBody::from_request(&req, &payload)?;

    // Rejected before the store is touched
    let fields = match (name, number) {
        (Some(name), Some(number)) if !name.is_empty() && !number.is_empty() => {
            PersonFields::new(name, number)
        }
        _ => return Err(ApiError::MissingFields),
    };

    let person = store.create(fields).await?;

    Ok(HttpResponse::Ok().json(person))
}

// Reads then writes the same record inside the store. Nothing orders this against a concurrent
//  delete of the same id, whichever lands last wins.
#[put("/api/persons/{id}")]
async fn update_person(
    store: Data<dyn PersonStore>,
    id: web::Path<String>,
    req: HttpRequest,
    payload: Bytes,
) -> Result<HttpResponse, ApiError> {
    let PersonBody { name, number } = PersonBody::from_request(&req, &payload)?;

    // Missing fields are left to the store's validation so its message reaches the client
    let fields = PersonFields::new(name.unwrap_or_default(), number.unwrap_or_default());

    match store.replace(&id, fields).await? {
        Some(person) => Ok(HttpResponse::Ok().json(person)),
        None => Err(ApiError::UpdateTargetMissing),
    }
}

#[delete("/api/persons/{id}")]
async fn delete_person(
    store: Data<dyn PersonStore>,
    id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    store.delete_by_id(&id).await?;

    Ok(HttpResponse::NoContent().finish())
}

pub async fn unknown_endpoint() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorBody {
        error: UNKNOWN_ENDPOINT,
    })
}

/// Registers every phonebook route. The unknown endpoint fallback is the app's default service.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_persons)
        .service(get_person)
        .service(info)
        .service(create_person)
        .service(update_person)
        .service(delete_person);
}
