use anyhow::{Context, Result, bail};
use clap::Parser;
use std::env;

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub storage_dir: String,
    pub database_url: String,
    pub bucket: String,
    pub queue_depth: usize,
    pub jwt_secret: Secret,
    pub credentials: Credentials,
}

/// String wrapper that keeps secret material out of `Debug` output.
#[derive(Clone)]
pub struct Secret(pub String);

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("<redacted>")
    }
}

/// The single credential pair accepted by `POST /login`.
///
/// Always supplied externally (environment or CLI), never compiled in.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Command-line + environment configuration.
#[derive(Parser, Debug)]
#[command(author, version, about = "Authenticated file-storage gateway")]
pub struct Args {
    /// Host to bind to (overrides FILE_GATEWAY_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides FILE_GATEWAY_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Directory where object payloads are stored (overrides FILE_GATEWAY_STORAGE_DIR)
    #[arg(long)]
    pub storage_dir: Option<String>,

    /// Database URL (overrides FILE_GATEWAY_DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Bucket name for stored objects (overrides FILE_GATEWAY_BUCKET)
    #[arg(long)]
    pub bucket: Option<String>,

    /// Worker job queue depth (overrides FILE_GATEWAY_QUEUE_DEPTH)
    #[arg(long)]
    pub queue_depth: Option<usize>,

    /// JWT signing secret (overrides FILE_GATEWAY_JWT_SECRET)
    #[arg(long)]
    pub jwt_secret: Option<String>,

    /// Login username (overrides FILE_GATEWAY_AUTH_USERNAME)
    #[arg(long)]
    pub auth_username: Option<String>,

    /// Login password (overrides FILE_GATEWAY_AUTH_PASSWORD)
    #[arg(long)]
    pub auth_password: Option<String>,

    /// Run migrations and exit
    #[arg(long)]
    pub migrate: bool,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and migrate flag.
    ///
    /// The bind address, storage paths, and queue depth all have defaults
    /// suitable for a local deployment. The JWT secret and credential pair
    /// have no defaults and must be supplied; startup fails without them.
    pub fn from_env_and_args() -> Result<(Self, bool)> {
        // Parse CLI once
        let args = Args::parse();

        // --- Environment fallback ---
        let env_host = env::var("FILE_GATEWAY_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let env_port = match env::var("FILE_GATEWAY_PORT") {
            Ok(value) => value
                .parse::<u16>()
                .with_context(|| format!("parsing FILE_GATEWAY_PORT value `{}`", value))?,
            Err(env::VarError::NotPresent) => 3000,
            Err(err) => return Err(err).context("reading FILE_GATEWAY_PORT"),
        };
        let env_storage =
            env::var("FILE_GATEWAY_STORAGE_DIR").unwrap_or_else(|_| "./data/objects".into());
        let env_db = env::var("FILE_GATEWAY_DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://./data/meta/file_gateway.db".into());
        let env_bucket = env::var("FILE_GATEWAY_BUCKET").unwrap_or_else(|_| "files".into());
        let env_queue_depth = match env::var("FILE_GATEWAY_QUEUE_DEPTH") {
            Ok(value) => value
                .parse::<usize>()
                .with_context(|| format!("parsing FILE_GATEWAY_QUEUE_DEPTH value `{}`", value))?,
            Err(env::VarError::NotPresent) => 64,
            Err(err) => return Err(err).context("reading FILE_GATEWAY_QUEUE_DEPTH"),
        };

        let jwt_secret = match args.jwt_secret.or_else(|| env::var("FILE_GATEWAY_JWT_SECRET").ok())
        {
            Some(value) if !value.is_empty() => value,
            _ => bail!("FILE_GATEWAY_JWT_SECRET (or --jwt-secret) must be set"),
        };
        let username = match args
            .auth_username
            .or_else(|| env::var("FILE_GATEWAY_AUTH_USERNAME").ok())
        {
            Some(value) if !value.is_empty() => value,
            _ => bail!("FILE_GATEWAY_AUTH_USERNAME (or --auth-username) must be set"),
        };
        let password = match args
            .auth_password
            .or_else(|| env::var("FILE_GATEWAY_AUTH_PASSWORD").ok())
        {
            Some(value) if !value.is_empty() => value,
            _ => bail!("FILE_GATEWAY_AUTH_PASSWORD (or --auth-password) must be set"),
        };

        // --- Merge ---
        let cfg = Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            storage_dir: args.storage_dir.unwrap_or(env_storage),
            database_url: args.database_url.unwrap_or(env_db),
            bucket: args.bucket.unwrap_or(env_bucket),
            queue_depth: args.queue_depth.unwrap_or(env_queue_depth),
            jwt_secret: Secret(jwt_secret),
            credentials: Credentials { username, password },
        };

        Ok((cfg, args.migrate))
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
