use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use console::api::{ApiClient, AuthApi, ParkingApi, UserApi, extract_reset_token};
use console::{
    AdmissionPolicy, FileTokenStore, GuardDecision, History, Navigator, Route, SessionManager,
    TokenStore,
};
use shared::config::load_config;
use shared::types::{AppConfig, LoginData, RegistrationData, ResetPasswordData, Role, User};

#[derive(Parser)]
#[command(
    name = "parkctl",
    about = "Sign in to the parking management console and check screen access",
    version
)]
struct Cli {
    /// Configuration file
    #[arg(short, long, env = "PARKCTL_CONFIG", default_value = "parkctl.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in and store the credential
    Login {
        #[arg(short, long)]
        email: String,
        #[arg(short, long, env = "PARKCTL_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Remove the stored credential
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Show what the console would do when opening PATH
    Check { path: String },
    /// Create an account (does not sign in)
    Register {
        #[arg(long)]
        nombre: String,
        #[arg(long)]
        apellido: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "PARKCTL_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        confirm_password: String,
        #[arg(long)]
        telefono: Option<String>,
        #[arg(long, default_value = "cliente")]
        rol: String,
        #[arg(long)]
        id_parking: Option<i64>,
    },
    /// Request a password recovery email
    ForgotPassword {
        #[arg(long)]
        email: String,
    },
    /// Set a new password using the link from the recovery email
    ResetPassword {
        /// Full link from the email, or the bare access token
        link: String,
        #[arg(long, env = "PARKCTL_NEW_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long, env = "PARKCTL_CONFIRM_PASSWORD", hide_env_values = true)]
        confirm_password: String,
    },
    /// List parking lots
    Parkings,
    /// List accounts
    Users,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.to_string_lossy().into_owned();
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load configuration from {}", config_path))?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.filter))
        .context("Invalid log filter")?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    run(cli.command, &config).await
}

async fn run(command: Command, config: &AppConfig) -> Result<()> {
    let base_url = config
        .api
        .resolved_base_url()
        .context("No API base URL configured")?;
    let store: Arc<dyn TokenStore> = Arc::new(FileTokenStore::new(
        &config.storage.dir,
        &config.storage.key,
    ));
    let client = ApiClient::new(&base_url, store.clone()).context("Failed to build API client")?;
    let history = Arc::new(History::starting_at(Route::Login));
    let navigator: Arc<dyn Navigator> = history.clone();

    let session = SessionManager::new(
        AuthApi::new(client.clone()),
        store,
        navigator,
        AdmissionPolicy::new(config.access.admitted()),
    );

    info!("Using backend {}", client.base_url());
    session.initialize().await;

    match command {
        Command::Login { email, password } => {
            let user = session.login(&LoginData::new(email, password)).await?;
            println!("Signed in as {}", user);
            if let Some(route) = history.current() {
                println!("Landing on {}", route);
            }
        }
        Command::Logout => {
            session.logout();
            println!("Signed out");
        }
        Command::Whoami => match session.current_user() {
            Some(user) => println!("{} <{}> ({})", user.full_name(), user.email, user.rol),
            None => println!("Not signed in"),
        },
        Command::Check { path } => {
            let route = Route::resolve(&path);
            match session.authorize(route) {
                GuardDecision::Render => println!("{} renders", route),
                GuardDecision::Loading => println!("{} is waiting for the session", route),
                GuardDecision::Redirect(target) => println!("{} redirects to {}", route, target),
            }
        }
        Command::Register {
            nombre,
            apellido,
            email,
            password,
            confirm_password,
            telefono,
            rol,
            id_parking,
        } => {
            let rol = Role::parse(&rol);
            if rol == Role::Unknown {
                bail!("Unknown role; expected one of {}", known_roles());
            }
            let data = RegistrationData {
                nombre,
                apellido,
                email,
                password,
                confirm_password,
                telefono,
                rol,
                id_parking,
            };
            session.register(&data).await?;
            println!("Account created for {}", data.email);
        }
        Command::ForgotPassword { email } => {
            session.forgot_password(&email).await?;
            println!("If {} has an account, a recovery email is on its way", email);
        }
        Command::ResetPassword {
            link,
            password,
            confirm_password,
        } => {
            let token = if link.contains("access_token") {
                extract_reset_token(&link).context("The link carries no access token")?
            } else {
                link
            };
            let data = ResetPasswordData::new(token, password, confirm_password);
            session.reset_password(&data).await?;
            println!("Password updated");
        }
        Command::Parkings => {
            require_session(&session)?;
            let parkings = ParkingApi::new(client).list().await?;
            println!("{}", serde_json::to_string_pretty(&parkings)?);
        }
        Command::Users => {
            require_session(&session)?;
            for raw in UserApi::new(client).list().await? {
                match serde_json::from_value::<User>(raw.clone()) {
                    Ok(user) => println!(
                        "{:<30} {:<30} {}{}",
                        user.full_name(),
                        user.email,
                        user.rol,
                        if user.is_blocked() { " [blocked]" } else { "" }
                    ),
                    Err(_) => println!("{}", raw),
                }
            }
        }
    }

    Ok(())
}

fn require_session(session: &SessionManager<AuthApi>) -> Result<()> {
    if !session.snapshot().is_authenticated() {
        bail!("Not signed in; run `parkctl login` first");
    }
    Ok(())
}

fn known_roles() -> String {
    Role::ALL
        .iter()
        .filter(|r| **r != Role::Unknown)
        .map(Role::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
