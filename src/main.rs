use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand, ValueEnum};
use reqwest::Method;
use serde_json::{Value, json};

use edgeadmin::api::clients::ClientQuery;
use edgeadmin::api::devices::{DeviceQuery, DiscoveryQuery};
use edgeadmin::api::{ApiClient, ApiError};
use edgeadmin::config::{AdminConfig, ConfigError, normalize_base_url};
use edgeadmin::display::format_ist;
use edgeadmin::guard::routes::RouteError;
use edgeadmin::guard::{Navigation, RouteTable};
use edgeadmin::session::{SessionContext, SessionError};
use edgeadmin::storage::{FileStorage, SessionStorage, StorageError};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Route(#[from] RouteError),
    #[error("invalid HTTP method: {0}")]
    InvalidMethod(String),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "edgeadmin", about = "IoT platform admin console CLI")]
struct Cli {
    /// Overrides `EDGEADMIN_BASE_URL`.
    #[arg(long)]
    base_url: Option<String>,

    /// Overrides `EDGEADMIN_STATE_DIR`.
    #[arg(long)]
    state_dir: Option<PathBuf>,

    /// Log requests and session changes to stderr.
    #[arg(short, long, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login(LoginArgs),
    Logout,
    Whoami,
    Health,
    Devices(DevicesCommand),
    Discovery(DiscoveryCommand),
    Clients(ClientsCommand),
    Users(UsersCommand),
    /// Raw authenticated request, e.g. `request GET /api/status`.
    Request {
        method: String,
        path: String,
        #[arg(long)]
        data: Option<String>,
    },
    /// Where navigating to PATH would land for the current session.
    Route {
        path: String,
        #[arg(long, value_enum, default_value_t = Table::Admin)]
        table: Table,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum LoginMode {
    Admin,
    Relay,
    Client,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum Table {
    Admin,
    Client,
}

#[derive(Args, Debug)]
struct LoginArgs {
    username: String,
    #[arg(long, env = "EDGEADMIN_PASSWORD", hide_env_values = true)]
    password: String,
    #[arg(long, value_enum, default_value_t = LoginMode::Admin)]
    mode: LoginMode,
}

#[derive(Args, Debug)]
struct DevicesCommand {
    #[command(subcommand)]
    command: DevicesSubcommand,
}

#[derive(Subcommand, Debug)]
enum DevicesSubcommand {
    List {
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        offset: Option<u32>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        template_id: Option<String>,
    },
    Read {
        device_id: String,
    },
    Stats,
    Delete {
        device_id: String,
    },
    Assign {
        device_id: String,
        client_id: String,
    },
    Unassign {
        device_id: String,
    },
}

#[derive(Args, Debug)]
struct DiscoveryCommand {
    #[command(subcommand)]
    command: DiscoverySubcommand,
}

#[derive(Subcommand, Debug)]
enum DiscoverySubcommand {
    List {
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        page_size: Option<u32>,
    },
    Stats,
    Approve {
        device_id: String,
        #[arg(long, default_value = "{}")]
        data: String,
    },
    Reject {
        device_id: String,
        #[arg(long)]
        reason: Option<String>,
    },
}

#[derive(Args, Debug)]
struct ClientsCommand {
    #[command(subcommand)]
    command: ClientsSubcommand,
}

#[derive(Subcommand, Debug)]
enum ClientsSubcommand {
    List {
        #[arg(long)]
        skip: Option<u32>,
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        active: Option<bool>,
    },
    Read {
        client_id: String,
    },
    Create {
        #[arg(long)]
        data: String,
    },
    Delete {
        client_id: String,
    },
    Devices {
        client_id: String,
    },
    DeviceCounts,
}

#[derive(Args, Debug)]
struct UsersCommand {
    #[command(subcommand)]
    command: UsersSubcommand,
}

#[derive(Subcommand, Debug)]
enum UsersSubcommand {
    List,
    SetActive {
        user_id: String,
        #[arg(action = clap::ArgAction::Set)]
        active: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let level = if cli.verbose { tracing::Level::DEBUG } else { tracing::Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let mut config = AdminConfig::from_env()?;
    if let Some(base_url) = &cli.base_url {
        config.base_url = normalize_base_url(base_url);
    }
    if let Some(state_dir) = cli.state_dir {
        config.state_dir = state_dir;
    }

    let storage: Arc<dyn SessionStorage> = Arc::new(FileStorage::new(&config.state_dir));
    let api = Arc::new(ApiClient::from_config(&config, Arc::clone(&storage))?);
    let session = Arc::new(SessionContext::new(Arc::clone(&api), storage));
    let restored = session.initialize_auth()?;
    tracing::debug!(?restored, base_url = %config.base_url, "session initialized");

    match cli.command {
        Command::Login(args) => run_login(&session, args).await,
        Command::Logout => {
            session.logout()?;
            print_json(&json!({ "logged_out": true }))
        }
        Command::Whoami => run_whoami(&session),
        Command::Health => print_json(&api.health().await?),
        Command::Devices(devices) => run_devices(&api, devices).await,
        Command::Discovery(discovery) => run_discovery(&api, discovery).await,
        Command::Clients(clients) => run_clients(&api, clients).await,
        Command::Users(users) => run_users(&api, users).await,
        Command::Request { method, path, data } => {
            let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())
                .map_err(|_| CliError::InvalidMethod(method))?;
            let body = data.as_deref().map(serde_json::from_str::<Value>).transpose()?;
            print_json(&api.send_json(method, &path, body).await?)
        }
        Command::Route { path, table } => run_route(&session, &config, &path, table),
    }
}

async fn run_login(session: &SessionContext, args: LoginArgs) -> Result<(), CliError> {
    let user = match args.mode {
        LoginMode::Admin => {
            session
                .login_with_credentials(&args.username, &args.password)
                .await?
        }
        LoginMode::Relay => {
            session
                .login_with_edge_relay(&args.username, &args.password)
                .await?
        }
        LoginMode::Client => session.client_login(&args.username, &args.password).await?,
    };
    print_json(&serde_json::to_value(&user)?)
}

fn run_whoami(session: &SessionContext) -> Result<(), CliError> {
    let user = session.user();
    let last_login = user
        .as_ref()
        .and_then(|u| u.extra.get("last_login"))
        .and_then(Value::as_str);
    print_json(&json!({
        "authenticated": session.is_authenticated(),
        "display_name": user.as_ref().map(|u| u.display_name().to_owned()),
        "last_login": format_ist(last_login),
        "user": user,
    }))
}

async fn run_devices(api: &ApiClient, devices: DevicesCommand) -> Result<(), CliError> {
    let value = match devices.command {
        DevicesSubcommand::List { limit, offset, status, template_id } => {
            let query = DeviceQuery { limit, offset, status_filter: status, template_id };
            api.devices(&query).await?
        }
        DevicesSubcommand::Read { device_id } => api.device(&device_id).await?,
        DevicesSubcommand::Stats => serde_json::to_value(api.device_stats().await?)?,
        DevicesSubcommand::Delete { device_id } => api.delete_device(&device_id).await?,
        DevicesSubcommand::Assign { device_id, client_id } => {
            api.assign_device_to_client(&device_id, &client_id).await?
        }
        DevicesSubcommand::Unassign { device_id } => api.unassign_device(&device_id).await?,
    };
    print_json(&value)
}

async fn run_discovery(api: &ApiClient, discovery: DiscoveryCommand) -> Result<(), CliError> {
    let value = match discovery.command {
        DiscoverySubcommand::List { status, page, page_size } => {
            api.discovered_devices(&DiscoveryQuery { status, page, page_size })
                .await?
        }
        DiscoverySubcommand::Stats => api.discovery_stats().await?,
        DiscoverySubcommand::Approve { device_id, data } => {
            let approval = serde_json::from_str::<Value>(&data)?;
            api.approve_device(&device_id, approval).await?
        }
        DiscoverySubcommand::Reject { device_id, reason } => {
            api.reject_device(&device_id, reason.as_deref()).await?
        }
    };
    print_json(&value)
}

async fn run_clients(api: &ApiClient, clients: ClientsCommand) -> Result<(), CliError> {
    let value = match clients.command {
        ClientsSubcommand::List { skip, limit, active } => {
            api.clients(ClientQuery { skip, limit, is_active: active })
                .await?
        }
        ClientsSubcommand::Read { client_id } => api.client(&client_id).await?,
        ClientsSubcommand::Create { data } => {
            let body = serde_json::from_str::<Value>(&data)?;
            api.create_client(body).await?
        }
        ClientsSubcommand::Delete { client_id } => api.delete_client(&client_id).await?,
        ClientsSubcommand::Devices { client_id } => api.client_devices(&client_id).await?,
        ClientsSubcommand::DeviceCounts => api.client_device_counts().await?,
    };
    print_json(&value)
}

async fn run_users(api: &ApiClient, users: UsersCommand) -> Result<(), CliError> {
    let value = match users.command {
        UsersSubcommand::List => serde_json::to_value(api.account_summaries().await?)?,
        UsersSubcommand::SetActive { user_id, active } => api.toggle_user_status(&user_id, active).await?,
    };
    print_json(&value)
}

fn run_route(session: &Arc<SessionContext>, config: &AdminConfig, path: &str, table: Table) -> Result<(), CliError> {
    let table = match table {
        Table::Admin => RouteTable::admin_routes(),
        Table::Client => RouteTable::client_portal_routes(),
    }
    .with_wrong_role(config.wrong_role_redirect);
    let guard = table.guard(Arc::clone(session));

    let rendered = match table.navigate(&guard, path)? {
        Navigation::Proceed => json!({ "path": path, "result": "proceed" }),
        Navigation::Redirect(to) => json!({ "path": path, "result": "redirect", "to": to }),
    };
    print_json(&rendered)
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
