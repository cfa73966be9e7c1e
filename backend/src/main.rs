use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{HeaderValue, Method};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, Level};

use clinic_backend::domain::{AppointmentService, PatientService};
use clinic_backend::rest::{self, AppState};
use clinic_backend::storage::sqlite::{AppointmentRepository, DbConnection, PatientRepository};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    info!("Setting up database");
    let db = DbConnection::init().await?;

    // Wire the services against the durable adapter
    let patient_store = Arc::new(PatientRepository::new(db.clone()));
    let appointment_store = Arc::new(AppointmentRepository::new(db));
    let patient_service = PatientService::new(patient_store.clone());
    let appointment_service = AppointmentService::new(appointment_store, patient_store);
    let state = AppState::new(patient_service, appointment_service);

    // CORS setup to allow a frontend to make requests
    let cors = CorsLayer::new()
        .allow_origin("http://localhost:8080".parse::<HeaderValue>()?)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    let app = Router::new()
        .nest("/api", rest::routes())
        .layer(cors)
        .with_state(state);

    // Deployment platforms inject the port
    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
