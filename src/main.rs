use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::level_filters::LevelFilter;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;
use vercel_client::{
    Config, Context, CreateEnvironmentVariableRequest, CreateProjectRequest,
    EnvironmentVariableRequest, EnvironmentVariableType, Error, VercelClient,
};

/// Command line access to the Vercel management API
#[derive(Parser, Debug)]
#[command(name = "vercel-client", version, about, long_about = None)]
struct Args {
    /// API token (overrides the config file)
    #[arg(long, env = "VERCEL_API_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Team to scope calls to (overrides the configured default)
    #[arg(long, env = "VERCEL_TEAM_ID")]
    team: Option<String>,

    /// API endpoint
    #[arg(long, env = "VERCEL_BASE_URL")]
    base_url: Option<String>,

    /// Transport timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off")]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the DNS records of a domain (first 100 only)
    DnsRecords { domain: String },

    /// Create an environment variable on a project
    CreateEnv {
        project_id: String,
        #[arg(long)]
        key: String,
        #[arg(long)]
        value: String,
        /// Deployment target, repeatable
        #[arg(long = "target", required = true)]
        targets: Vec<String>,
        #[arg(long)]
        git_branch: Option<String>,
        #[arg(long = "type", value_enum, default_value = "plain")]
        env_type: EnvType,
    },

    /// Create a project from a JSON or YAML definition
    CreateProject { file: PathBuf },

    /// Store the default team in the config file
    SetTeam { team_id: String },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum EnvType {
    Plain,
    Secret,
    Encrypted,
    Sensitive,
}

impl From<EnvType> for EnvironmentVariableType {
    fn from(value: EnvType) -> Self {
        match value {
            EnvType::Plain => EnvironmentVariableType::Plain,
            EnvType::Secret => EnvironmentVariableType::Secret,
            EnvType::Encrypted => EnvironmentVariableType::Encrypted,
            EnvType::Sensitive => EnvironmentVariableType::Sensitive,
        }
    }
}

fn setup_logging(level: LogLevel) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let Some(tracing_level) = level.to_tracing_level() else {
        return Ok(None);
    };

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {:?}", log_path))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    // RUST_LOG narrows further, e.g. `vercel_client=trace,reqwest=off`
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(tracing_level).into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("vercel-client started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("vercel-client").join("vercel-client.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".vercel-client").join("vercel-client.log");
    }
    PathBuf::from("vercel-client.log")
}

/// Read a project definition, YAML unless the extension says JSON
fn read_project_definition(path: &Path) -> Result<CreateProjectRequest> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        serde_json::from_str(&content).with_context(|| format!("Invalid project JSON in {:?}", path))
    } else {
        serde_yaml::from_str(&content).with_context(|| format!("Invalid project YAML in {:?}", path))
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let _log_guard = setup_logging(args.log_level)?;

    let mut config = Config::load();
    if let Command::SetTeam { team_id } = &args.command {
        config.set_team_id(team_id)?;
        println!("Default team set to {:?}", config.team_id);
        return Ok(());
    }

    if args.token.is_some() {
        config.api_token = args.token;
    }
    if args.base_url.is_some() {
        config.base_url = args.base_url;
    }
    if args.timeout.is_some() {
        config.timeout_secs = args.timeout;
    }
    config.validate()?;

    let client = VercelClient::from_config(&config).context("Failed to create Vercel client")?;
    let team = args.team.unwrap_or_default();

    let (ctx, cancel) = Context::background().with_cancel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted, cancelling request");
            cancel.cancel();
        }
    });

    match args.command {
        Command::DnsRecords { domain } => {
            let records = client.list_dns_records(&ctx, &domain, &team).await?;
            print_json(&records)?;
        }
        Command::CreateEnv {
            project_id,
            key,
            value,
            targets,
            git_branch,
            env_type,
        } => {
            let request = CreateEnvironmentVariableRequest {
                environment_variable: EnvironmentVariableRequest {
                    key,
                    value,
                    target: targets,
                    git_branch,
                    env_type: env_type.into(),
                },
                project_id,
                team_id: team,
            };
            let created = client.create_environment_variable(&ctx, request).await?;
            print_json(&created)?;
        }
        Command::CreateProject { file } => {
            let request = read_project_definition(&file)?;
            match client.create_project(&ctx, &team, &request).await {
                Ok(project) => print_json(&project)?,
                Err(Error::EnvironmentVariablesFetch { project, source }) => {
                    print_json(&project)?;
                    return Err(anyhow::Error::new(*source).context(format!(
                        "Project {} was created, but its environment variables could not be fetched",
                        project.id
                    )));
                }
                Err(e) => return Err(e.into()),
            }
        }
        // Handled before the client is built
        Command::SetTeam { .. } => {}
    }

    Ok(())
}
