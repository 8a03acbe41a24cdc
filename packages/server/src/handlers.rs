//! HTTP handler functions for the road asset API.
//!
//! The CRUD handlers are generic over the entity and request types and pull
//! their repository from scope data, so one set of functions serves every
//! entity route.

use actix_web::error::InternalError;
use actix_web::{HttpResponse, web};
use road_assets_database::{HistoryRepository, RepoError, Repository};
use road_assets_database_models::{
    Incident, IncidentHistoryRequest, IncidentRequest, Notification, NotificationRequest,
};
use road_assets_server_models::{ApiError, ApiHealth, ApiNotificationEvent};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::realtime::NotificationHub;

/// Repository handle stored as scope data.
pub type RepoData<E, Q> = web::Data<dyn Repository<Entity = E, Request = Q>>;

/// Maps a repository error to its HTTP response.
///
/// Store internals carried by [`RepoError::Unavailable`] are logged, never
/// returned.
pub fn error_response(err: &RepoError) -> HttpResponse {
    match err {
        RepoError::ValidationFailed(e) => {
            HttpResponse::BadRequest().json(ApiError::new("validation_failed", e.to_string()))
        }
        RepoError::NotFound { .. } => {
            HttpResponse::NotFound().json(ApiError::new("not_found", err.to_string()))
        }
        RepoError::Conflict(kind) => {
            HttpResponse::Conflict().json(ApiError::new("conflict", kind.to_string()))
        }
        RepoError::Unavailable { operation, cause } => {
            log::error!("Store unavailable during {operation}: {cause}");
            HttpResponse::InternalServerError().json(ApiError::new(
                "unavailable",
                "The data store is temporarily unavailable",
            ))
        }
    }
}

fn not_found(entity: &'static str, id: i32) -> HttpResponse {
    error_response(&RepoError::NotFound { entity, id })
}

/// JSON extractor settings: malformed bodies become 400 with an
/// [`ApiError`] body.
#[must_use]
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let message = err.to_string();
        log::debug!("Rejected request body: {message}");
        InternalError::from_response(
            err,
            HttpResponse::BadRequest().json(ApiError::new("validation_failed", message)),
        )
        .into()
    })
}

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/{entity}`
pub async fn list<E, Q>(repo: RepoData<E, Q>) -> HttpResponse
where
    E: Serialize + 'static,
    Q: 'static,
{
    match repo.list().await {
        Ok(rows) => HttpResponse::Ok().json(rows),
        Err(e) => error_response(&e),
    }
}

/// `GET /api/{entity}/{id}`
pub async fn get<E, Q>(repo: RepoData<E, Q>, path: web::Path<i32>) -> HttpResponse
where
    E: Serialize + 'static,
    Q: 'static,
{
    let id = path.into_inner();
    match repo.get_by_id(id).await {
        Ok(Some(row)) => HttpResponse::Ok().json(row),
        Ok(None) => not_found(repo.entity_name(), id),
        Err(e) => error_response(&e),
    }
}

/// `POST /api/{entity}`
pub async fn create<E, Q>(repo: RepoData<E, Q>, body: web::Json<Q>) -> HttpResponse
where
    E: Serialize + 'static,
    Q: DeserializeOwned + 'static,
{
    match repo.create(&body).await {
        Ok(row) => HttpResponse::Ok().json(row),
        Err(e) => error_response(&e),
    }
}

/// `PATCH /api/{entity}/{id}`
///
/// Replaces every writable field; the body must be complete.
pub async fn update<E, Q>(
    repo: RepoData<E, Q>,
    path: web::Path<i32>,
    body: web::Json<Q>,
) -> HttpResponse
where
    E: Serialize + 'static,
    Q: DeserializeOwned + 'static,
{
    let id = path.into_inner();
    match repo.update(id, &body).await {
        Ok(Some(row)) => HttpResponse::Ok().json(row),
        Ok(None) => not_found(repo.entity_name(), id),
        Err(e) => error_response(&e),
    }
}

/// `DELETE /api/{entity}/{id}`
pub async fn delete<E, Q>(repo: RepoData<E, Q>, path: web::Path<i32>) -> HttpResponse
where
    E: 'static,
    Q: 'static,
{
    let id = path.into_inner();
    match repo.delete(id).await {
        Ok(true) => HttpResponse::NoContent().finish(),
        Ok(false) => not_found(repo.entity_name(), id),
        Err(e) => error_response(&e),
    }
}

/// `POST /api/notifications`
///
/// Stores the notification, then pushes it to the recipient's realtime
/// group. Delivery is best effort and never changes the response.
pub async fn create_notification(
    repo: RepoData<Notification, NotificationRequest>,
    hub: web::Data<NotificationHub>,
    body: web::Json<NotificationRequest>,
) -> HttpResponse {
    match repo.create(&body).await {
        Ok(notification) => {
            hub.publish(
                notification.user_id,
                ApiNotificationEvent::from(&notification),
            );
            HttpResponse::Ok().json(notification)
        }
        Err(e) => error_response(&e),
    }
}

/// `GET /api/incidents/{id}/history`
///
/// Status changes of one incident, newest first.
pub async fn incident_history(
    incidents: RepoData<Incident, IncidentRequest>,
    history: web::Data<dyn HistoryRepository>,
    path: web::Path<i32>,
) -> HttpResponse {
    let id = path.into_inner();
    match incidents.get_by_id(id).await {
        Ok(Some(_)) => {}
        Ok(None) => return not_found(incidents.entity_name(), id),
        Err(e) => return error_response(&e),
    }

    match history.list_for_incident(id).await {
        Ok(entries) => HttpResponse::Ok().json(entries),
        Err(e) => error_response(&e),
    }
}

/// `POST /api/incidents/{id}/history`
pub async fn append_incident_history(
    incidents: RepoData<Incident, IncidentRequest>,
    history: web::Data<dyn HistoryRepository>,
    path: web::Path<i32>,
    body: web::Json<IncidentHistoryRequest>,
) -> HttpResponse {
    let id = path.into_inner();
    match incidents.get_by_id(id).await {
        Ok(Some(_)) => {}
        Ok(None) => return not_found(incidents.entity_name(), id),
        Err(e) => return error_response(&e),
    }

    match history.append(id, &body).await {
        Ok(entry) => HttpResponse::Ok().json(entry),
        Err(e) => error_response(&e),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::{Arc, Mutex};

    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use async_trait::async_trait;
    use chrono::Utc;
    use road_assets_database::ConflictKind;
    use road_assets_database_models::{Asset, AssetRequest, Validate};

    use super::*;
    use crate::{SharedRepository, crud_scope, notifications_scope};

    type Build<E, Q> = fn(i32, &Q) -> Result<E, RepoError>;

    /// In-memory repository with the same contract as the store-backed one.
    struct MemoryRepository<E, Q> {
        name: &'static str,
        rows: Mutex<BTreeMap<i32, E>>,
        build: Build<E, Q>,
        referenced: Vec<i32>,
    }

    impl<E, Q> MemoryRepository<E, Q> {
        fn new(name: &'static str, build: Build<E, Q>) -> Self {
            Self {
                name,
                rows: Mutex::new(BTreeMap::new()),
                build,
                referenced: Vec::new(),
            }
        }
    }

    #[async_trait(?Send)]
    impl<E, Q> Repository for MemoryRepository<E, Q>
    where
        E: Clone + Send,
        Q: Validate,
    {
        type Entity = E;
        type Request = Q;

        fn entity_name(&self) -> &'static str {
            self.name
        }

        async fn list(&self) -> Result<Vec<E>, RepoError> {
            Ok(self.rows.lock().unwrap().values().cloned().collect())
        }

        async fn get_by_id(&self, id: i32) -> Result<Option<E>, RepoError> {
            Ok(self.rows.lock().unwrap().get(&id).cloned())
        }

        async fn create(&self, request: &Q) -> Result<E, RepoError> {
            request.validate()?;
            let mut rows = self.rows.lock().unwrap();
            let id = rows.keys().next_back().map_or(1, |last| last + 1);
            let row = (self.build)(id, request)?;
            rows.insert(id, row.clone());
            Ok(row)
        }

        async fn update(&self, id: i32, request: &Q) -> Result<Option<E>, RepoError> {
            request.validate()?;
            let mut rows = self.rows.lock().unwrap();
            if !rows.contains_key(&id) {
                return Ok(None);
            }
            let row = (self.build)(id, request)?;
            rows.insert(id, row.clone());
            Ok(Some(row))
        }

        async fn delete(&self, id: i32) -> Result<bool, RepoError> {
            if self.referenced.contains(&id) {
                return Err(RepoError::Conflict(ConflictKind::StillReferenced {
                    table: Some("tasks".to_string()),
                }));
            }
            Ok(self.rows.lock().unwrap().remove(&id).is_some())
        }
    }

    const KNOWN_CATEGORY: i32 = 1;

    fn build_asset(id: i32, req: &AssetRequest) -> Result<Asset, RepoError> {
        if req.category_id != KNOWN_CATEGORY {
            return Err(RepoError::Conflict(ConflictKind::MissingReference {
                field: "category_id".to_string(),
                id: Some(req.category_id.to_string()),
                table: Some("asset_categories".to_string()),
            }));
        }
        Ok(Asset {
            id,
            category_id: req.category_id,
            name: req.name.clone(),
            code: req.code.clone(),
            address: req.address.clone(),
            geometry: req.geometry.clone(),
            custom_attributes: req.custom_attributes.clone(),
            construction_date: req.construction_date,
            operation_date: req.operation_date,
            length_m: req.length_m,
            area_m2: req.area_m2,
            original_value: req.original_value,
            current_value: req.current_value,
            status: req.status,
            managing_unit: req.managing_unit.clone(),
            image_url: req.image_url.clone(),
            image_public_id: req.image_public_id.clone(),
            created_at: Utc::now(),
            updated_at: None,
        })
    }

    fn build_notification(id: i32, req: &NotificationRequest) -> Result<Notification, RepoError> {
        Ok(Notification {
            id,
            user_id: req.user_id,
            title: req.title.clone(),
            message: req.message.clone(),
            link: req.link.clone(),
            is_read: req.is_read,
            created_at: Utc::now(),
            updated_at: None,
        })
    }

    fn assets() -> SharedRepository<Asset, AssetRequest> {
        Arc::new(MemoryRepository::<Asset, AssetRequest>::new(
            "asset",
            build_asset,
        ))
    }

    fn point_asset(category_id: i32) -> serde_json::Value {
        serde_json::json!({
            "category_id": category_id,
            "name": "Km 12 culvert",
            "geometry": {"type": "Point", "coordinates": [105.8, 21.0]},
            "custom_attributes": {"diameter_m": 1.2}
        })
    }

    macro_rules! asset_app {
        ($repo:expr) => {
            test::init_service(
                App::new()
                    .app_data(json_config())
                    .service(web::scope("/api").service(crud_scope("/assets", $repo))),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn create_asset_returns_stored_row() {
        let app = asset_app!(assets());

        let req = test::TestRequest::post()
            .uri("/api/assets")
            .set_json(point_asset(KNOWN_CATEGORY))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["id"], 1);
        assert_eq!(body["geometry"]["type"], "Point");
        assert_eq!(
            body["geometry"]["coordinates"],
            serde_json::json!([105.8, 21.0])
        );
        assert!(!body["created_at"].is_null());
        assert_eq!(body["custom_attributes"]["diameter_m"], 1.2);
    }

    #[actix_web::test]
    async fn deleted_asset_is_gone() {
        let app = asset_app!(assets());

        let req = test::TestRequest::post()
            .uri("/api/assets")
            .set_json(point_asset(KNOWN_CATEGORY))
            .to_request();
        let created: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        let uri = format!("/api/assets/{}", created["id"]);

        let resp = test::call_service(&app, test::TestRequest::delete().uri(&uri).to_request()).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);

        let resp = test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: ApiError = test::read_body_json(resp).await;
        assert_eq!(body.error, "not_found");

        let resp = test::call_service(&app, test::TestRequest::delete().uri(&uri).to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn unknown_category_is_a_conflict() {
        let app = asset_app!(assets());

        let req = test::TestRequest::post()
            .uri("/api/assets")
            .set_json(point_asset(99))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let body: ApiError = test::read_body_json(resp).await;
        assert_eq!(body.error, "conflict");
        assert!(body.message.contains("99"), "{}", body.message);

        let resp = test::call_service(&app, test::TestRequest::get().uri("/api/assets").to_request()).await;
        let rows: Vec<serde_json::Value> = test::read_body_json(resp).await;
        assert!(rows.is_empty());
    }

    #[actix_web::test]
    async fn referenced_asset_delete_is_a_conflict() {
        let mut repo = MemoryRepository::<Asset, AssetRequest>::new("asset", build_asset);
        repo.referenced.push(1);
        let app = asset_app!(Arc::new(repo));

        let req = test::TestRequest::post()
            .uri("/api/assets")
            .set_json(point_asset(KNOWN_CATEGORY))
            .to_request();
        test::call_service(&app, req).await;

        let resp = test::call_service(&app, test::TestRequest::delete().uri("/api/assets/1").to_request()).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let resp = test::call_service(&app, test::TestRequest::get().uri("/api/assets/1").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn malformed_geometry_is_a_bad_request() {
        let app = asset_app!(assets());

        let mut body = point_asset(KNOWN_CATEGORY);
        body["geometry"] = serde_json::json!({"type": "Point", "coordinates": [1.0, 2.0, 3.0]});
        let resp = test::call_service(
            &app,
            test::TestRequest::post().uri("/api/assets").set_json(body).to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let mut body = point_asset(KNOWN_CATEGORY);
        body["geometry"] = serde_json::json!({"type": "Circle", "coordinates": [1.0, 2.0]});
        let resp = test::call_service(
            &app,
            test::TestRequest::post().uri("/api/assets").set_json(body).to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let error: ApiError = test::read_body_json(resp).await;
        assert_eq!(error.error, "validation_failed");
    }

    #[actix_web::test]
    async fn validation_failure_is_a_bad_request() {
        let app = asset_app!(assets());

        let mut body = point_asset(KNOWN_CATEGORY);
        body["length_m"] = serde_json::json!(-1.0);
        let resp = test::call_service(
            &app,
            test::TestRequest::post().uri("/api/assets").set_json(body).to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let error: ApiError = test::read_body_json(resp).await;
        assert!(error.message.starts_with("length_m:"), "{}", error.message);
    }

    #[actix_web::test]
    async fn update_of_missing_asset_is_not_found() {
        let app = asset_app!(assets());

        let resp = test::call_service(
            &app,
            test::TestRequest::patch()
                .uri("/api/assets/42")
                .set_json(point_asset(KNOWN_CATEGORY))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = test::call_service(&app, test::TestRequest::get().uri("/api/assets").to_request()).await;
        let rows: Vec<serde_json::Value> = test::read_body_json(resp).await;
        assert!(rows.is_empty());
    }

    #[actix_web::test]
    async fn update_replaces_asset() {
        let app = asset_app!(assets());
        test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/assets")
                .set_json(point_asset(KNOWN_CATEGORY))
                .to_request(),
        )
        .await;

        let mut body = point_asset(KNOWN_CATEGORY);
        body["name"] = serde_json::Value::Null;
        body["status"] = serde_json::json!("damaged");
        let updated: serde_json::Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::patch()
                .uri("/api/assets/1")
                .set_json(body)
                .to_request(),
        )
        .await;
        assert!(updated["name"].is_null());
        assert_eq!(updated["status"], "damaged");
    }

    #[actix_web::test]
    async fn created_notification_reaches_subscriber() {
        let hub = web::Data::new(NotificationHub::default());
        let mut rx = hub.subscribe(7);
        let repo: SharedRepository<Notification, NotificationRequest> =
            Arc::new(MemoryRepository::<Notification, NotificationRequest>::new(
                "notification",
                build_notification,
            ));
        let app = test::init_service(
            App::new()
                .app_data(json_config())
                .service(web::scope("/api").service(notifications_scope(repo, &hub))),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/notifications")
            .set_json(serde_json::json!({"user_id": 7, "title": "Task 3 assigned to you"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let event = rx.try_recv().unwrap();
        assert_eq!(event.user_id, 7);
        assert_eq!(event.title, "Task 3 assigned to you");
    }

    #[actix_web::test]
    async fn health_reports_version() {
        let app = test::init_service(App::new().route("/api/health", web::get().to(health))).await;
        let body: ApiHealth =
            test::call_and_read_body_json(&app, test::TestRequest::get().uri("/api/health").to_request())
                .await;
        assert!(body.healthy);
        assert_eq!(body.version, env!("CARGO_PKG_VERSION"));
    }

    #[actix_web::test]
    async fn unavailable_hides_store_details() {
        let resp = error_response(&RepoError::Unavailable {
            operation: "read".to_string(),
            cause: "password authentication failed for user \"admin\"".to_string(),
        });
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = actix_web::body::to_bytes(resp.into_body()).await.unwrap();
        let body: ApiError = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.error, "unavailable");
        assert!(!body.message.contains("password"));
    }
}
