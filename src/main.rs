use chrono::Duration;
use library_lending::{
    adapters::{
        auth::{Argon2Hasher, JwtIssuer},
        memory::InMemoryLedger,
        postgres::{PostgresBookLedger, PostgresLoanLedger, PostgresMemberLedger},
    },
    api::{AppState, create_router},
    application::ServiceDependencies,
    config::AppConfig,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    dotenvy::dotenv().ok();
    let config = AppConfig::load()?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let password_hasher = Arc::new(Argon2Hasher::new());
    let token_issuer = Arc::new(JwtIssuer::new(
        &config.auth.jwt_secret,
        &config.auth.issuer,
        Duration::minutes(config.auth.access_token_minutes),
        Duration::minutes(config.auth.refresh_token_minutes),
    ));

    // Initialize adapters
    let service_deps = match &config.database.url {
        Some(database_url) => {
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .connect(database_url)
                .await?;

            sqlx::migrate!("./migrations").run(&pool).await?;
            tracing::info!("Connected to PostgreSQL and applied migrations");

            ServiceDependencies {
                member_ledger: Arc::new(PostgresMemberLedger::new(pool.clone())),
                book_ledger: Arc::new(PostgresBookLedger::new(pool.clone())),
                loan_ledger: Arc::new(PostgresLoanLedger::new(pool)),
                password_hasher,
                token_issuer,
            }
        }
        None => {
            tracing::warn!("DATABASE_URL is not set, using in-memory ledgers (data is not persisted)");
            let ledger = Arc::new(InMemoryLedger::new());

            ServiceDependencies {
                member_ledger: ledger.clone(),
                book_ledger: ledger.clone(),
                loan_ledger: ledger,
                password_hasher,
                token_issuer,
            }
        }
    };

    // Create application state
    let app_state = Arc::new(AppState { service_deps });

    // Create router
    let app = create_router(app_state);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    // Start server
    axum::serve(listener, app).await?;

    Ok(())
}
