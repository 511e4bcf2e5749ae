//! Command-line front end. Each invocation restores the persisted session,
//! performs one navigation or action through the views, prints the result
//! and any toasts raised along the way.
//!
//! - `status` - backend health and current session
//! - `login` / `register` / `google-login` / `logout` / `whoami`
//! - `open <path>` - resolve a path through the route guard and render it
//! - `classes`, `book <event-id>`, `dashboard`
//! - `admin ...` - admin console tabs

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::debug;

use crate::api::{ApiClient, Upload};
use crate::config::AppConfig;
use crate::models::{BookingStatus, DeliveryMode, Encryption, UserRole};
use crate::notify::Toaster;
use crate::router::{self, Guard, Navigation, Route};
use crate::session::{FileTokenStore, SessionManager, StaticTokenProvider};
use crate::views::admin::{AdminConsole, AdminTab, EventAction, EventForm, TabContent};
use crate::views::auth::{self, LoginForm, RegisterForm};
use crate::views::booking::BookingFlow;
use crate::views::catalog::CatalogView;
use crate::views::dashboard::DashboardView;
use crate::views::{home, ViewContext};

const MAX_REDIRECTS: usize = 4;

#[derive(Parser, Debug)]
#[command(name = "vibrant")]
#[command(author, version, about = "Book yoga classes and run the studio from the terminal", long_about = None)]
pub struct Cli {
    /// Backend base URL (default: http://localhost:8001)
    #[arg(long, env = "BACKEND_URL")]
    pub backend_url: Option<String>,

    /// Path prefix of the API on the backend (default: /api)
    #[arg(long, env = "API_PREFIX")]
    pub api_prefix: Option<String>,

    /// Directory holding the persisted session credential
    #[arg(long, env = "VIBRANT_SESSION_DIR")]
    pub session_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show backend health and the current session
    Status,

    /// Sign in with email and password
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "VIBRANT_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create an account and sign in
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "VIBRANT_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Sign in with a Google identity token obtained elsewhere
    GoogleLogin {
        #[arg(long, env = "VIBRANT_PROVIDER_TOKEN", hide_env_values = true)]
        token: Option<String>,
    },

    /// Forget the persisted session
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Navigate to a path, e.g. `/classes` or `/book/<id>`
    Open { path: String },

    /// List classes
    Classes,

    /// Book a class; with --proof and --utr the payment proof is attached too
    Book {
        event_id: String,
        /// Payment screenshot
        #[arg(long, requires = "utr")]
        proof: Option<PathBuf>,
        /// UPI transaction reference
        #[arg(long, requires = "proof")]
        utr: Option<String>,
        /// Save the payment QR code into this directory
        #[arg(long, value_name = "DIR")]
        save_qr: Option<PathBuf>,
    },

    /// Your bookings
    Dashboard,

    /// Admin console
    #[command(subcommand)]
    Admin(AdminCommands),
}

#[derive(Subcommand, Debug)]
pub enum AdminCommands {
    /// Platform totals and recent bookings
    Overview,
    #[command(subcommand)]
    Events(EventsCommands),
    #[command(subcommand)]
    Bookings(BookingsCommands),
    #[command(subcommand)]
    Users(UsersCommands),
    #[command(subcommand)]
    Settings(SettingsCommands),
}

#[derive(Subcommand, Debug)]
pub enum EventsCommands {
    List,
    Create(CreateEventArgs),
    Edit { event_id: String },
    Delete { event_id: String },
}

#[derive(Args, Debug)]
pub struct CreateEventArgs {
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub description: String,
    /// YYYY-MM-DD
    #[arg(long)]
    pub date: String,
    /// HH:MM
    #[arg(long)]
    pub time: String,
    /// Price in rupees
    #[arg(long)]
    pub price: String,
    #[arg(long, default_value = "50")]
    pub capacity: String,
    /// online, offline or hybrid
    #[arg(long, default_value = "online")]
    pub mode: DeliveryMode,
    #[arg(long)]
    pub session_link: Option<String>,
    #[arg(long)]
    pub upi_id: Option<String>,
    /// Payment QR code image
    #[arg(long)]
    pub qr: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum BookingsCommands {
    List,
    Approve {
        booking_id: String,
        #[arg(long)]
        notes: Option<String>,
    },
    Reject {
        booking_id: String,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Save the payment proof image
    Proof {
        booking_id: String,
        /// Directory to write into (default: current directory)
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
pub enum UsersCommands {
    List,
    Role { user_id: String, role: UserRole },
}

#[derive(Subcommand, Debug)]
pub enum SettingsCommands {
    Show,
    Set(SmtpArgs),
}

#[derive(Args, Debug)]
pub struct SmtpArgs {
    #[arg(long)]
    pub mailer_name: Option<String>,
    #[arg(long)]
    pub host: Option<String>,
    #[arg(long)]
    pub port: Option<u16>,
    #[arg(long)]
    pub username: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    /// SSL, TLS or None
    #[arg(long)]
    pub encryption: Option<Encryption>,
    #[arg(long, env = "VIBRANT_SMTP_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

impl Cli {
    /// Flags win over the environment-derived configuration.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(url) = &self.backend_url {
            config.backend_url = url.clone();
        }
        if let Some(prefix) = &self.api_prefix {
            config.api_prefix = prefix.clone();
        }
        if let Some(dir) = &self.session_dir {
            config.session_dir = dir.clone();
        }
    }
}

/// Builds the session from `config`, restores it and runs the command.
pub async fn run_command(cli: &Cli, config: &AppConfig) -> Result<()> {
    let api = ApiClient::new(&config.api_base()).context("Invalid backend URL")?;
    let store = Arc::new(FileTokenStore::new(&config.session_dir));
    let mut session = SessionManager::new(api, store);
    session.restore().await;

    let toasts = Toaster::new();
    let result = dispatch(cli, config, &mut session, &toasts).await;
    print_toasts(&toasts);
    result
}

async fn dispatch(
    cli: &Cli,
    config: &AppConfig,
    session: &mut SessionManager,
    toasts: &Toaster,
) -> Result<()> {
    match &cli.command {
        Commands::Status => cmd_status(session).await,
        Commands::Login { email, password } => {
            let nav = LoginForm::new(email.as_str(), password.as_str())
                .submit(session, toasts)
                .await;
            finish_auth(session, toasts, nav).await
        }
        Commands::Register {
            name,
            email,
            password,
        } => {
            let nav = RegisterForm::new(name.as_str(), email.as_str(), password.as_str())
                .submit(session, toasts)
                .await;
            finish_auth(session, toasts, nav).await
        }
        Commands::GoogleLogin { token } => {
            let provider =
                StaticTokenProvider::new(token.clone().or_else(|| config.provider_token.clone()));
            let nav = auth::sign_in_with_provider(session, toasts, &provider).await;
            finish_auth(session, toasts, nav).await
        }
        Commands::Logout => {
            session.logout(toasts);
            Ok(())
        }
        Commands::Whoami => {
            cmd_whoami(session);
            Ok(())
        }
        Commands::Open { path } => {
            let ctx = ViewContext::new(session, toasts);
            navigate(ctx, router::resolve(path, ctx.session)).await;
            Ok(())
        }
        Commands::Classes => {
            let ctx = ViewContext::new(session, toasts);
            navigate(ctx, Navigation::push(Route::Classes)).await;
            Ok(())
        }
        Commands::Book {
            event_id,
            proof,
            utr,
            save_qr,
        } => {
            cmd_book(
                ViewContext::new(session, toasts),
                event_id,
                proof.as_deref(),
                utr.as_deref(),
                save_qr.as_deref(),
            )
            .await
        }
        Commands::Dashboard => {
            let ctx = ViewContext::new(session, toasts);
            navigate(ctx, Navigation::push(Route::Dashboard)).await;
            Ok(())
        }
        Commands::Admin(cmd) => cmd_admin(ViewContext::new(session, toasts), cmd).await,
    }
}

async fn cmd_status(session: &SessionManager) -> Result<()> {
    println!("Connecting to {}...", session.api().base_url());
    let health = session
        .api()
        .health()
        .await
        .context("Failed to reach the backend. Is it running?")?;
    println!("Backend:    [{}] {}", if health.status == "healthy" { "OK" } else { "!!" }, health.status);
    match session.user() {
        Some(user) => println!("Session:    {} <{}> ({})", user.name, user.email, user.role),
        None => println!("Session:    not signed in"),
    }
    Ok(())
}

fn cmd_whoami(session: &SessionManager) {
    match session.user() {
        Some(user) => {
            println!("{:<10} {}", "ID:", user.id);
            println!("{:<10} {}", "Name:", user.name);
            println!("{:<10} {}", "Email:", user.email);
            println!("{:<10} {}", "Role:", user.role);
            println!("{:<10} {}", "Status:", user.status);
        }
        None => println!("Not signed in. Run `vibrant login --email <email> --password <password>`."),
    }
}

async fn finish_auth(session: &SessionManager, toasts: &Toaster, nav: Option<Navigation>) -> Result<()> {
    if let Some(nav) = nav {
        navigate(ViewContext::new(session, toasts), nav).await;
    }
    Ok(())
}

async fn cmd_book(
    ctx: ViewContext<'_>,
    event_id: &str,
    proof: Option<&std::path::Path>,
    utr: Option<&str>,
    save_qr: Option<&std::path::Path>,
) -> Result<()> {
    let target = Route::Book {
        event_id: event_id.to_string(),
    };
    if let nav @ (Navigation::Redirect { .. } | Navigation::Loading) =
        target.guard().check(target.clone(), ctx.session)
    {
        navigate(ctx, nav).await;
        return Ok(());
    }

    let mut flow = match BookingFlow::mount(ctx, event_id).await {
        Ok(flow) => flow,
        Err(nav) => {
            navigate(ctx, nav).await;
            return Ok(());
        }
    };
    if flow.event().is_none() {
        print!("{}", flow.render());
        return Ok(());
    }
    if let Some(nav) = flow.create_booking(ctx).await {
        navigate(ctx, nav).await;
        return Ok(());
    }
    print!("{}", flow.render());
    if let Some(dir) = save_qr {
        if let Some(path) = flow.save_qr(ctx, dir).await {
            println!("Payment QR code written to {}", path.display());
        }
    }

    let (Some(path), Some(utr)) = (proof, utr) else {
        if let Some(id) = flow.booking_id() {
            println!("Booking {id} awaits payment proof.");
        }
        return Ok(());
    };
    if flow.booking_id().is_none() {
        return Ok(());
    }
    let file = Upload::from_path(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    flow.select_proof(file);
    flow.set_utr(utr);
    if let Some(nav) = flow.submit_proof(ctx).await {
        navigate(ctx, nav).await;
    }
    Ok(())
}

async fn cmd_admin(ctx: ViewContext<'_>, cmd: &AdminCommands) -> Result<()> {
    let nav = Guard::Protected { admin_only: true }.check(Route::Admin, ctx.session);
    if !matches!(nav, Navigation::Render(_)) {
        navigate(ctx, nav).await;
        return Ok(());
    }

    let tab = match cmd {
        AdminCommands::Overview => AdminTab::Dashboard,
        AdminCommands::Events(_) => AdminTab::Events,
        AdminCommands::Bookings(_) => AdminTab::Bookings,
        AdminCommands::Users(_) => AdminTab::Users,
        AdminCommands::Settings(_) => AdminTab::Settings,
    };
    let mut console = AdminConsole::open(ctx, tab).await;
    let active = console.active();

    match (cmd, console.content_mut()) {
        (AdminCommands::Events(EventsCommands::Create(args)), TabContent::Events(events)) => {
            let qr = match &args.qr {
                Some(path) => Some(
                    Upload::from_path(path)
                        .await
                        .with_context(|| format!("Failed to read {}", path.display()))?,
                ),
                None => None,
            };
            let mut form = EventForm {
                title: args.title.clone(),
                description: args.description.clone(),
                date: args.date.clone(),
                time: args.time.clone(),
                price: args.price.clone(),
                capacity: args.capacity.clone(),
                upi_id: args.upi_id.clone().unwrap_or_default(),
                session_link: args.session_link.clone().unwrap_or_default(),
                ..EventForm::default()
            };
            form.set_delivery_mode(args.mode);
            events.create(ctx, &form, qr).await;
        }
        (AdminCommands::Events(EventsCommands::Edit { event_id }), TabContent::Events(events)) => {
            events.invoke(ctx, EventAction::Edit, event_id);
        }
        (AdminCommands::Events(EventsCommands::Delete { event_id }), TabContent::Events(events)) => {
            events.invoke(ctx, EventAction::Delete, event_id);
        }
        (
            AdminCommands::Bookings(BookingsCommands::Approve { booking_id, notes }),
            TabContent::Bookings(bookings),
        ) => {
            bookings
                .review(ctx, booking_id, BookingStatus::Approved, notes.clone())
                .await;
        }
        (
            AdminCommands::Bookings(BookingsCommands::Reject { booking_id, notes }),
            TabContent::Bookings(bookings),
        ) => {
            bookings
                .review(ctx, booking_id, BookingStatus::Rejected, notes.clone())
                .await;
        }
        (AdminCommands::Bookings(BookingsCommands::Proof { booking_id, out }), TabContent::Bookings(bookings)) => {
            if let Some(path) = bookings.save_proof(ctx, booking_id, out).await {
                println!("Payment proof saved to {}", path.display());
            }
            return Ok(());
        }
        (AdminCommands::Users(UsersCommands::Role { user_id, role }), TabContent::Users(users)) => {
            users.change_role(ctx, user_id, *role).await;
        }
        (AdminCommands::Settings(SettingsCommands::Set(args)), TabContent::Settings(settings)) => {
            let form = settings.form_mut();
            if let Some(v) = &args.mailer_name {
                form.mailer_name = v.clone();
            }
            if let Some(v) = &args.host {
                form.host = v.clone();
            }
            if let Some(v) = args.port {
                form.port = v;
            }
            if let Some(v) = &args.username {
                form.username = v.clone();
            }
            if let Some(v) = &args.email {
                form.email = v.clone();
            }
            if let Some(v) = args.encryption {
                form.encryption = v;
            }
            if let Some(v) = &args.password {
                form.password = v.clone();
            }
            settings.save(ctx).await;
        }
        _ => debug!(tab = %active, "read-only admin command"),
    }

    print!("{}", console.render());
    Ok(())
}

/// Follows a navigation to its final page and prints it.
async fn navigate(ctx: ViewContext<'_>, mut nav: Navigation) {
    for _ in 0..MAX_REDIRECTS {
        match nav {
            Navigation::Loading => {
                println!("Loading...");
                return;
            }
            Navigation::Render(route) => {
                println!("{}", home::render_navbar(ctx.session));
                println!();
                print!("{}", render_route(ctx, &route).await);
                return;
            }
            Navigation::Redirect { to, replace } => {
                debug!(to = %to, replace, "redirect");
                println!("-> {to}");
                nav = to.guard().check(to, ctx.session);
            }
        }
    }
}

async fn render_route(ctx: ViewContext<'_>, route: &Route) -> String {
    match route {
        Route::Home => home::render_home(ctx.session),
        Route::Login => {
            "Sign in with `vibrant login --email <email> --password <password>`\n\
             or `vibrant google-login --token <id-token>`.\n"
                .into()
        }
        Route::Register => {
            "Create an account with `vibrant register --name <name> --email <email> --password <password>`.\n"
                .into()
        }
        Route::Classes => CatalogView::mount(ctx).await.render(),
        Route::Book { event_id } => match BookingFlow::mount(ctx, event_id).await {
            Ok(flow) => flow.render(),
            Err(nav) => format!("-> {}\n", redirect_target(&nav)),
        },
        Route::Dashboard => DashboardView::mount(ctx)
            .await
            .render(ctx.session.user().map(|u| u.name.as_str())),
        Route::Admin => AdminConsole::open(ctx, AdminTab::default()).await.render(),
    }
}

fn redirect_target(nav: &Navigation) -> String {
    match nav {
        Navigation::Redirect { to, .. } | Navigation::Render(to) => to.path(),
        Navigation::Loading => "...".into(),
    }
}

fn print_toasts(toasts: &Toaster) {
    for toast in toasts.drain() {
        println!("{toast}");
    }
}
