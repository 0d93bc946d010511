use std::sync::Arc;

use actix_web::{web, App, HttpResponse, HttpServer, Result as ActixResult};
use log::{info, warn};
use parking_lot::{Mutex, RwLock};

use crate::config::Config;
use crate::db::FaceDatabase;
use crate::decision::decide;
use crate::embedding::Embedding;
use crate::enroll::{enroll_from_image, EmbeddingExtractor};
use crate::error::EngineError;
use crate::matcher::best_match;
use crate::store;

/// Identity folder that uploaded probe samples are filed under.
const UPLOAD_IDENTITY: &str = "new_user";

/// Shared service state. Matching takes the read side of the database lock,
/// enrollment the write side, so concurrent matches proceed together while a
/// writer gets exclusive access. The extractor session is serialized behind
/// its own mutex.
pub struct AppState {
    pub config: Config,
    pub db: RwLock<FaceDatabase>,
    pub extractor: Mutex<Box<dyn EmbeddingExtractor + Send>>,
}

pub async fn start(state: Arc<AppState>, listen: &str) -> std::io::Result<()> {
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .route("/upload", web::post().to(upload))
            .route("/enroll/{name}", web::post().to(enroll))
            .route("/identities", web::get().to(identities))
    })
    .bind(listen)?
    .run()
    .await
}

fn decode(bytes: &[u8]) -> Result<image::DynamicImage, EngineError> {
    image::load_from_memory(bytes).map_err(|e| EngineError::InvalidImage(e.to_string()))
}

fn bad_request(msg: &str) -> HttpResponse {
    HttpResponse::BadRequest().json(serde_json::json!({ "error": msg }))
}

// Invalid image content gets its own status, not a 200 with an error body.
fn unprocessable(err: &EngineError) -> HttpResponse {
    HttpResponse::UnprocessableEntity().json(serde_json::json!({ "error": err.to_string() }))
}

/// Recognize the person in an uploaded image. Decodable samples are
/// persisted under the `new_user` folder before matching; persistence
/// failures are logged but do not fail the request.
async fn upload(state: web::Data<Arc<AppState>>, body: web::Bytes) -> ActixResult<HttpResponse> {
    if body.is_empty() {
        return Ok(bad_request("no file uploaded"));
    }

    let img = match decode(&body) {
        Ok(img) => img,
        Err(e) => return Ok(unprocessable(&e)),
    };

    if let Err(e) = store::save_sample(
        &state.config.database_path,
        UPLOAD_IDENTITY,
        store::extension_for(&body),
        &body,
    ) {
        warn!("failed to persist uploaded sample: {e:#}");
    }

    let vector = match state.extractor.lock().extract(&img) {
        Ok(v) => v,
        Err(e) => return Ok(unprocessable(&e)),
    };

    let result = match best_match(&state.db.read(), &Embedding::new(vector)) {
        Ok(r) => r,
        Err(e) => return Ok(unprocessable(&e)),
    };

    let verdict = decide(&result, state.config.threshold);
    info!("match score {:.3}: {}", result.score, verdict);
    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": verdict.to_string() })))
}

/// Enroll an uploaded image under the identity named in the path. Mutates
/// the live database and persists the sample for the next startup.
async fn enroll(
    state: web::Data<Arc<AppState>>,
    path: web::Path<String>,
    body: web::Bytes,
) -> ActixResult<HttpResponse> {
    let name = path.into_inner();
    if body.is_empty() {
        return Ok(bad_request("no file uploaded"));
    }

    let img = match decode(&body) {
        Ok(img) => img,
        Err(e) => return Ok(unprocessable(&e)),
    };

    // Count while still holding the write lock, so the response reflects
    // this request's enrollment and not a concurrent writer's.
    let count = {
        let mut extractor = state.extractor.lock();
        let mut db = state.db.write();
        if let Err(e) = enroll_from_image(&mut db, &mut **extractor, &name, &img) {
            return Ok(unprocessable(&e));
        }
        db.identities()
            .iter()
            .find(|i| i.name() == name)
            .map(|i| i.embeddings().len())
            .unwrap_or(0)
    };

    if let Err(e) = store::save_sample(
        &state.config.database_path,
        &name,
        store::extension_for(&body),
        &body,
    ) {
        warn!("failed to persist sample for {name}: {e:#}");
    }

    info!("enrolled {name} ({count} embedding(s))");
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": format!("Enrolled: {name}"),
        "embeddings": count,
    })))
}

/// List enrolled identities and their embedding counts.
async fn identities(state: web::Data<Arc<AppState>>) -> ActixResult<HttpResponse> {
    let db = state.db.read();
    let list: Vec<serde_json::Value> = db
        .identities()
        .iter()
        .map(|i| {
            serde_json::json!({
                "name": i.name(),
                "embeddings": i.embeddings().len(),
            })
        })
        .collect();
    Ok(HttpResponse::Ok().json(list))
}
