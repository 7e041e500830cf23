use clap::Parser;
use quizdeck::db::Db;
use quizdeck::error::AppError;
use quizdeck::models::{NewUser, Role};
use quizdeck::{AppState, router};

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// PostgreSQL connection string.
    #[clap(env = "DATABASE_URL")]
    database_url: String,

    /// The address to bind to.
    #[arg(short, long, env, default_value = "127.0.0.1:1414")]
    address: String,

    /// Mark session cookies as Secure (behind TLS).
    #[arg(long, env, default_value_t = false)]
    secure_cookies: bool,

    /// Bootstrap admin account, created at startup when absent.
    #[arg(long, env = "ADMIN_EMAIL")]
    admin_email: Option<String>,

    #[arg(long, env = "ADMIN_USERNAME")]
    admin_username: Option<String>,

    #[arg(long, env = "ADMIN_PASSWORD")]
    admin_password: Option<String>,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let filter =
        std::env::var("RUST_LOG").unwrap_or_else(|_| "tracing=info,quizdeck=debug".to_owned());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(tracing_subscriber::fmt::format::FmtSpan::CLOSE)
        .init();

    let args = Args::parse();

    let db = Db::new(&args.database_url).await?;
    let state = AppState::new(db, args.secure_cookies);

    seed_admin(&state, &args).await?;

    let address = args.address.parse::<std::net::SocketAddr>()?;
    let listener = tokio::net::TcpListener::bind(address).await?;
    tracing::info!(%address, "quizdeck {} listening", quizdeck::utils::VERSION);

    axum::serve(listener, router(state)).await?;

    Ok(())
}

/// Create the bootstrap admin when all three env knobs are set and the
/// account does not exist yet.
async fn seed_admin(state: &AppState, args: &Args) -> color_eyre::Result<()> {
    let (Some(email), Some(username), Some(password)) = (
        args.admin_email.as_deref(),
        args.admin_username.as_deref(),
        args.admin_password.as_deref(),
    ) else {
        return Ok(());
    };

    let input = NewUser {
        email: email.to_string(),
        username: username.to_string(),
        password: password.to_string(),
        display_name: None,
        role: Some(Role::Admin),
    };

    match state.auth.create_user(&input).await {
        Ok(user) => tracing::info!(user_id = %user.id, "bootstrap admin created"),
        Err(AppError::Conflict(_)) => tracing::debug!("bootstrap admin already exists"),
        Err(err) => return Err(err.into()),
    }

    Ok(())
}
