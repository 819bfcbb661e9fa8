use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use clap::{Args, Parser, Subcommand};
use greda_gbc::activity::{ActivityRecorder, NoopNotifier};
use greda_gbc::assessments::repository::NoMediaCatalog;
use greda_gbc::assessments::{assessment_router, catalog, scoring, AssessmentService, SectionType};
use greda_gbc::config::AppConfig;
use greda_gbc::directory::{directory_router, DirectoryService};
use greda_gbc::error::AppError;
use greda_gbc::memory::{MemoryActivityStore, MemoryAssessmentRepository, MemoryDirectory};
use greda_gbc::telemetry;
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
}

#[derive(Parser, Debug)]
#[command(
    name = "GREDA-GBC Assessment Service",
    about = "Run the green building certification assessment service from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Print the scoring catalog and certification bands
    Catalog(CatalogArgs),
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Args, Debug, Default)]
struct CatalogArgs {
    /// Restrict output to a single section key (e.g. energy-efficiency)
    #[arg(long)]
    section: Option<String>,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
        Command::Catalog(args) => run_catalog(args),
    }
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let repository = Arc::new(MemoryAssessmentRepository::default());
    let directory = Arc::new(MemoryDirectory::default());
    let activity_store = Arc::new(MemoryActivityStore::default());
    let recorder = ActivityRecorder::new(activity_store, Arc::new(NoopNotifier));

    if let Some(email) = &config.bootstrap.admin_email {
        let admin_id = directory.seed_admin(email, "Platform Administrator");
        info!(%admin_id, %email, "seeded bootstrap administrator");
    }

    let assessments = Arc::new(AssessmentService::new(
        repository,
        directory.clone(),
        Arc::new(NoMediaCatalog),
        recorder.clone(),
    ));
    let users = Arc::new(DirectoryService::new(directory, recorder));

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
    };

    let app = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .with_state(state)
        .merge(assessment_router(assessments))
        .merge(directory_router(users))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "assessment service ready");

    axum::serve(listener, app).await?;
    Ok(())
}

fn run_catalog(args: CatalogArgs) -> Result<(), AppError> {
    let selected = args.section.as_deref().and_then(SectionType::from_key);

    if args.section.is_some() && selected.is_none() {
        eprintln!(
            "unknown section '{}'; valid keys:",
            args.section.unwrap_or_default()
        );
        for section in SectionType::ordered() {
            eprintln!("  {}", section.key());
        }
        std::process::exit(2);
    }

    println!("GREDA-GBC scoring catalog");
    println!(
        "{} sections, {} available points\n",
        SectionType::ordered().len(),
        scoring::MAX_POSSIBLE_SCORE
    );

    for section in SectionType::ordered() {
        if let Some(only) = selected {
            if only != section {
                continue;
            }
        }

        let max = scoring::section_max_score(section);
        if section.is_scored() {
            println!("{} ({}) - {} points", section.label(), section.key(), max);
        } else {
            println!("{} ({}) - not scored", section.label(), section.key());
        }

        for variable in catalog::variables_for(section) {
            let mut evidence = Vec::new();
            if variable.evidence.images {
                evidence.push("images");
            }
            if variable.evidence.videos {
                evidence.push("videos");
            }
            if variable.evidence.audio {
                evidence.push("audio");
            }
            if variable.evidence.location {
                evidence.push("location");
            }
            let evidence_note = if evidence.is_empty() {
                String::new()
            } else {
                format!(" [evidence: {}]", evidence.join(", "))
            };
            println!(
                "  {:<24} {:>2} pts  {}{}",
                variable.id, variable.max_score, variable.name, evidence_note
            );
        }
        println!();
    }

    if selected.is_none() {
        println!("Certification bands");
        for score in [0u16, 1, 45, 60, 80, 106] {
            let tier = scoring::RatingTier::for_score(score);
            println!("  {:>3}+ -> {}", score, tier.label());
        }
    }

    Ok(())
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
