//! Command-line front end.
//!
//! Each subcommand maps onto one session operation or one resource query.
//! Query results are printed as the normalized `{message, code[, data]}`
//! JSON; session commands print the surface the session store navigated to.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde::Serialize;

use crate::api::types::{
    CategoryRequest, Credentials, FileRequest, UpdateCategoryRequest, UpdateFileRequest,
    UserRequest,
};
use crate::api::response::{DataResponse, QueryResponse};
use crate::api::{categories, files, users};
use crate::codec::{self, DirectorySaveTarget};
use crate::route::Route;
use crate::state::AppState;
use crate::validate;

#[derive(Parser, Debug)]
#[command(name = "filerepo", version, about = "Client for the file repository service")]
pub struct Cli {
    /// Base URL of the service (overrides FILEREPO_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Keep the session token in memory instead of the system keychain
    #[arg(long, global = true)]
    pub ephemeral: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log in and resolve the session
    Login {
        #[arg(long)]
        username: String,
        #[arg(long, env = "FILEREPO_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Resolve the current session from the stored token
    Session,
    /// Clear the stored token
    Logout,
    /// Show the local session state without contacting the service
    Status,
    #[command(subcommand)]
    User(UserCommand),
    #[command(subcommand)]
    Category(CategoryCommand),
    #[command(subcommand)]
    File(FileCommand),
}

#[derive(Subcommand, Debug)]
pub enum UserCommand {
    Create {
        #[arg(long)]
        username: String,
        #[arg(long)]
        name: String,
        #[arg(long, env = "FILEREPO_NEW_PASSWORD", hide_env_values = true)]
        password: String,
        /// Repeat the password; must match
        #[arg(long)]
        confirm: Option<String>,
    },
    List,
    Get {
        user_id: String,
    },
    Update {
        user_id: String,
        #[arg(long)]
        username: String,
        #[arg(long)]
        name: String,
        #[arg(long, env = "FILEREPO_NEW_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Delete {
        user_id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum CategoryCommand {
    Create {
        user_id: String,
        #[arg(long)]
        name: String,
    },
    List {
        user_id: String,
    },
    Get {
        user_id: String,
        categ_id: String,
    },
    Update {
        user_id: String,
        categ_id: String,
        #[arg(long)]
        name: String,
        /// Move the category to another user
        #[arg(long)]
        owner: Option<String>,
    },
    Delete {
        user_id: String,
        categ_id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum FileCommand {
    /// Upload a file from disk
    Upload {
        user_id: String,
        categ_id: String,
        path: PathBuf,
        /// Stored name (defaults to the file stem)
        #[arg(long)]
        name: Option<String>,
        /// Mime type (guessed from the extension by default)
        #[arg(long)]
        mimetype: Option<String>,
    },
    List {
        user_id: String,
        categ_id: String,
    },
    Get {
        user_id: String,
        categ_id: String,
        file_id: String,
        /// Include the base64 content in the output
        #[arg(long)]
        with_content: bool,
    },
    /// Replace a file's content from disk
    Update {
        user_id: String,
        categ_id: String,
        file_id: String,
        path: PathBuf,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        mimetype: Option<String>,
        /// Move the file to another category
        #[arg(long)]
        to_category: Option<String>,
    },
    Delete {
        user_id: String,
        categ_id: String,
        file_id: String,
    },
    /// Save a file's content into a directory
    Download {
        user_id: String,
        categ_id: String,
        file_id: String,
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
}

/// Run a parsed command. Returns whether it succeeded.
pub async fn run(command: Command, state: &AppState) -> anyhow::Result<bool> {
    match command {
        Command::Login { username, password } => {
            if !validate::validate_username(Some(&username)) {
                bail!(
                    "Username must be {} to {} characters",
                    validate::USERNAME_MIN_LEN,
                    validate::USERNAME_MAX_LEN
                );
            }
            if !validate::validate_password(Some(&password)) {
                bail!(
                    "Password must be at least {} characters",
                    validate::PASSWORD_MIN_LEN
                );
            }
            let route = state
                .session
                .login(Credentials::new(&username, &password))
                .await;
            Ok(report_route(state, &route).await)
        }
        Command::Session => {
            let route = state.session.get_session().await;
            Ok(report_route(state, &route).await)
        }
        Command::Logout => {
            state.session.logout().await;
            let route = state.current_route().unwrap_or(Route::Login);
            println!("{}", route.path());
            Ok(true)
        }
        Command::Status => {
            let status = StatusReport::collect(state).await;
            println!("{}", serde_json::to_string_pretty(&status)?);
            Ok(true)
        }
        Command::User(cmd) => run_user(cmd, state).await,
        Command::Category(cmd) => run_category(cmd, state).await,
        Command::File(cmd) => run_file(cmd, state).await,
    }
}

async fn run_user(cmd: UserCommand, state: &AppState) -> anyhow::Result<bool> {
    let api = &state.api;
    match cmd {
        UserCommand::Create {
            username,
            name,
            password,
            confirm,
        } => {
            check_new_user(&username, &password, confirm.as_deref())?;
            let body = UserRequest {
                username,
                password,
                name,
            };
            report(&users::create_user(api, &body).await)
        }
        UserCommand::List => report(&users::get_all_users(api).await),
        UserCommand::Get { user_id } => {
            report(&users::get_user_by_id(api, &user_id).await)
        }
        UserCommand::Update {
            user_id,
            username,
            name,
            password,
        } => {
            check_new_user(&username, &password, None)?;
            let body = UserRequest {
                username,
                password,
                name,
            };
            report(&users::update_user(api, &user_id, &body).await)
        }
        UserCommand::Delete { user_id } => {
            report(&users::delete_user(api, &user_id).await)
        }
    }
}

async fn run_category(cmd: CategoryCommand, state: &AppState) -> anyhow::Result<bool> {
    let api = &state.api;
    match cmd {
        CategoryCommand::Create { user_id, name } => {
            let body = CategoryRequest { name };
            report(&categories::create_category(api, &user_id, &body).await)
        }
        CategoryCommand::List { user_id } => report(
            &categories::get_all_categories(api, &user_id).await,
        ),
        CategoryCommand::Get { user_id, categ_id } => report(
            &categories::get_category_by_id(api, &user_id, &categ_id).await,
        ),
        CategoryCommand::Update {
            user_id,
            categ_id,
            name,
            owner,
        } => {
            let body = UpdateCategoryRequest {
                name,
                user_id: owner.unwrap_or_else(|| user_id.clone()),
            };
            report(
                &categories::update_category(api, &user_id, &categ_id, &body).await,
            )
        }
        CategoryCommand::Delete { user_id, categ_id } => report(
            &categories::delete_category(api, &user_id, &categ_id).await,
        ),
    }
}

async fn run_file(cmd: FileCommand, state: &AppState) -> anyhow::Result<bool> {
    let api = &state.api;
    match cmd {
        FileCommand::Upload {
            user_id,
            categ_id,
            path,
            name,
            mimetype,
        } => {
            let body = file_request_from_path(&path, name, mimetype).await?;
            report(
                &files::create_file(api, &user_id, &categ_id, &body).await,
            )
        }
        FileCommand::List { user_id, categ_id } => {
            let mut res = files::get_all_files(api, &user_id, &categ_id).await;
            // listings are for browsing; content can be large
            if let Some(list) = res.data.as_mut() {
                list.iter_mut().for_each(|f| f.content = None);
            }
            report(&res)
        }
        FileCommand::Get {
            user_id,
            categ_id,
            file_id,
            with_content,
        } => {
            let mut res = files::get_file_by_id(api, &user_id, &categ_id, &file_id).await;
            if !with_content {
                if let Some(file) = res.data.as_mut() {
                    file.content = None;
                }
            }
            report(&res)
        }
        FileCommand::Update {
            user_id,
            categ_id,
            file_id,
            path,
            name,
            mimetype,
            to_category,
        } => {
            let file = file_request_from_path(&path, name, mimetype).await?;
            let body = UpdateFileRequest {
                file,
                categ_id: to_category.unwrap_or_else(|| categ_id.clone()),
            };
            report(
                &files::update_file(api, &user_id, &categ_id, &file_id, &body).await,
            )
        }
        FileCommand::Delete {
            user_id,
            categ_id,
            file_id,
        } => report(
            &files::delete_file(api, &user_id, &categ_id, &file_id).await,
        ),
        FileCommand::Download {
            user_id,
            categ_id,
            file_id,
            out,
        } => {
            let target = DirectorySaveTarget::new(out);
            match codec::download_file(api, &user_id, &categ_id, &file_id, &target).await {
                Some(filename) => {
                    println!("{}", target.dir().join(filename).display());
                    Ok(true)
                }
                None => {
                    eprintln!("Nothing downloaded for file {}", file_id);
                    Ok(false)
                }
            }
        }
    }
}

fn check_new_user(username: &str, password: &str, confirm: Option<&str>) -> anyhow::Result<()> {
    if !validate::validate_username(Some(username)) {
        bail!(
            "Username must be {} to {} characters",
            validate::USERNAME_MIN_LEN,
            validate::USERNAME_MAX_LEN
        );
    }
    if !validate::validate_password(Some(password)) {
        bail!(
            "Password must be at least {} characters",
            validate::PASSWORD_MIN_LEN
        );
    }
    if let Some(confirm) = confirm {
        if !validate::check_passwords(password, confirm) {
            bail!("Passwords do not match");
        }
    }
    Ok(())
}

/// Read a file from disk into an upload body.
async fn file_request_from_path(
    path: &Path,
    name: Option<String>,
    mimetype: Option<String>,
) -> anyhow::Result<FileRequest> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let name = name.unwrap_or_else(|| {
        path.file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    });
    if validate::is_file_empty(bytes.len() as u64, &name) {
        bail!("No file selected");
    }

    let extension = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    let mimetype = mimetype.unwrap_or_else(|| {
        mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string()
    });

    Ok(FileRequest {
        name,
        extension,
        mimetype,
        content: codec::encode(&bytes),
    })
}

/// A normalized response that knows whether it reports success.
/// Local view of the session. The token itself is never printed.
#[derive(Debug, Serialize)]
struct StatusReport {
    api_url: String,
    keyring_service: String,
    state: String,
    has_token: bool,
    has_credentials: bool,
}

impl StatusReport {
    async fn collect(state: &AppState) -> Self {
        Self {
            api_url: state.api.base_url().to_string(),
            keyring_service: state.config.keyring_service.clone(),
            state: format!("{:?}", state.session.state().await),
            has_token: state.session.token().await.is_some(),
            has_credentials: state.session.has_credentials().await,
        }
    }
}

trait Outcome: Serialize {
    fn succeeded(&self) -> bool;
}

impl Outcome for QueryResponse {
    fn succeeded(&self) -> bool {
        self.is_success()
    }
}

impl<T: Serialize> Outcome for DataResponse<T> {
    fn succeeded(&self) -> bool {
        self.is_success()
    }
}

fn report<R: Outcome>(response: &R) -> anyhow::Result<bool> {
    println!("{}", serde_json::to_string_pretty(response)?);
    Ok(response.succeeded())
}

async fn report_route(state: &AppState, route: &Route) -> bool {
    match state.session.identity().await {
        Some(identity) => println!(
            "{} ({})",
            route.path(),
            identity.display_name().unwrap_or("unnamed")
        ),
        None => println!("{}", route.path()),
    }
    *route != Route::Login
}
