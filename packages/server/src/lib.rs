#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for road asset management.
//!
//! Serves uniform CRUD routes for every entity under `/api`, the incident
//! status history, and a per-user Server-Sent Events stream that pushes
//! notifications as they are created.

pub mod config;
pub mod handlers;
pub mod realtime;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, Resource, Scope, middleware, web};
use road_assets_database::{
    AssetCategoryRepository, AssetRepository, BudgetRepository, CostRepository, HistoryRepository,
    IncidentHistoryRepository, IncidentRepository, MaintenanceRecordRepository,
    NotificationRepository, Repository, TaskRepository, UserRepository, db, run_migrations,
};
use road_assets_database_models::{
    Asset, AssetCategory, AssetCategoryRequest, AssetRequest, Budget, BudgetRequest, Cost,
    CostRequest, Incident, IncidentRequest, MaintenanceRecord, MaintenanceRecordRequest,
    Notification, NotificationRequest, Task, TaskRequest, User, UserRequest,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use switchy_database::Database;

use crate::config::ServerConfig;
use crate::realtime::NotificationHub;

/// Shared repository handle for one entity.
pub type SharedRepository<E, Q> = Arc<dyn Repository<Entity = E, Request = Q>>;

/// One repository per entity, shared by every worker.
#[derive(Clone)]
pub struct Repositories {
    pub assets: SharedRepository<Asset, AssetRequest>,
    pub asset_categories: SharedRepository<AssetCategory, AssetCategoryRequest>,
    pub incidents: SharedRepository<Incident, IncidentRequest>,
    pub incident_history: Arc<dyn HistoryRepository>,
    pub tasks: SharedRepository<Task, TaskRequest>,
    pub budgets: SharedRepository<Budget, BudgetRequest>,
    pub costs: SharedRepository<Cost, CostRequest>,
    pub maintenance: SharedRepository<MaintenanceRecord, MaintenanceRecordRequest>,
    pub notifications: SharedRepository<Notification, NotificationRequest>,
    pub users: SharedRepository<User, UserRequest>,
}

impl Repositories {
    /// Store-backed repositories over one shared database handle.
    #[must_use]
    pub fn postgres(db: &Arc<dyn Database>) -> Self {
        Self {
            assets: Arc::new(AssetRepository::new(db.clone())),
            asset_categories: Arc::new(AssetCategoryRepository::new(db.clone())),
            incidents: Arc::new(IncidentRepository::new(db.clone())),
            incident_history: Arc::new(IncidentHistoryRepository::new(db.clone())),
            tasks: Arc::new(TaskRepository::new(db.clone())),
            budgets: Arc::new(BudgetRepository::new(db.clone())),
            costs: Arc::new(CostRepository::new(db.clone())),
            maintenance: Arc::new(MaintenanceRecordRepository::new(db.clone())),
            notifications: Arc::new(NotificationRepository::new(db.clone())),
            users: Arc::new(UserRepository::new(db.clone())),
        }
    }
}

/// `GET`, `PATCH` and `DELETE` on `/{id}`.
fn item_resource<E, Q>() -> Resource
where
    E: Serialize + 'static,
    Q: DeserializeOwned + 'static,
{
    web::resource("/{id}")
        .route(web::get().to(handlers::get::<E, Q>))
        .route(web::patch().to(handlers::update::<E, Q>))
        .route(web::delete().to(handlers::delete::<E, Q>))
}

/// The five CRUD routes for one entity, mounted at `path`.
pub fn crud_scope<E, Q>(path: &str, repo: SharedRepository<E, Q>) -> Scope
where
    E: Serialize + 'static,
    Q: DeserializeOwned + 'static,
{
    web::scope(path)
        .app_data(web::Data::from(repo))
        .service(
            web::resource("")
                .route(web::get().to(handlers::list::<E, Q>))
                .route(web::post().to(handlers::create::<E, Q>)),
        )
        .service(item_resource::<E, Q>())
}

/// Incident CRUD plus `/{id}/history`.
pub fn incidents_scope(
    incidents: SharedRepository<Incident, IncidentRequest>,
    history: Arc<dyn HistoryRepository>,
) -> Scope {
    crud_scope("/incidents", incidents)
        .app_data(web::Data::from(history))
        .service(
            web::resource("/{id}/history")
                .route(web::get().to(handlers::incident_history))
                .route(web::post().to(handlers::append_incident_history)),
        )
}

/// Notification CRUD whose create publishes to the hub, plus the SSE
/// stream.
pub fn notifications_scope(
    notifications: SharedRepository<Notification, NotificationRequest>,
    hub: &web::Data<NotificationHub>,
) -> Scope {
    web::scope("/notifications")
        .app_data(web::Data::from(notifications))
        .app_data(hub.clone())
        .service(
            web::resource("")
                .route(web::get().to(handlers::list::<Notification, NotificationRequest>))
                .route(web::post().to(handlers::create_notification)),
        )
        .service(
            web::resource("/stream/{user_id}")
                .route(web::get().to(realtime::notification_stream)),
        )
        .service(item_resource::<Notification, NotificationRequest>())
}

/// Every `/api` route.
#[must_use]
pub fn api_scope(repos: &Repositories, hub: &web::Data<NotificationHub>) -> Scope {
    web::scope("/api")
        .route("/health", web::get().to(handlers::health))
        .service(crud_scope("/assets", repos.assets.clone()))
        .service(crud_scope(
            "/asset-categories",
            repos.asset_categories.clone(),
        ))
        .service(incidents_scope(
            repos.incidents.clone(),
            repos.incident_history.clone(),
        ))
        .service(crud_scope("/tasks", repos.tasks.clone()))
        .service(crud_scope("/budgets", repos.budgets.clone()))
        .service(crud_scope("/costs", repos.costs.clone()))
        .service(crud_scope("/maintenance", repos.maintenance.clone()))
        .service(notifications_scope(repos.notifications.clone(), hub))
        .service(crud_scope("/users", repos.users.clone()))
}

/// Starts the road asset API server.
///
/// Connects to the `PostGIS` database, runs migrations and serves the API
/// until shutdown. The caller provides the async runtime (e.g. via
/// `#[actix_web::main]`) and initializes logging.
///
/// # Errors
///
/// Returns an error if the database connection or migrations fail, or if
/// the HTTP server fails to bind or encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    log::info!("Connecting to database...");
    let db_conn = db::connect(&config.database).await?;

    log::info!("Running migrations...");
    run_migrations(db_conn.as_ref()).await?;

    let db: Arc<dyn Database> = Arc::from(db_conn);
    let repos = Repositories::postgres(&db);
    let hub = web::Data::new(NotificationHub::default());

    log::info!("Starting server on {}:{}", config.bind_addr, config.port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(handlers::json_config())
            .service(api_scope(&repos, &hub))
    })
    .bind((config.bind_addr.as_str(), config.port))?
    .run()
    .await?;

    Ok(())
}
