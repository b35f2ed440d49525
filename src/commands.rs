//! CLI subcommands and their handlers.
//!
//! Each handler calls one library command and prints the normalized result
//! as pretty JSON on stdout. Diagnostics go through `log`.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use serde::Serialize;
use thiserror::Error;

use blueming_client::api::types::{GenerateRequest, StartTrainingRequest};
use blueming_client::api::upload::UploadFile;
use blueming_client::api::{
    auth, community, generation, models, search, tags, training, upload, user, ApiClient,
    ApiError, PageRequest, DEFAULT_PAGE_SIZE,
};
use blueming_client::session::token_subject;
use blueming_client::stream::{self, Channel, StreamError};

#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Stream(#[from] StreamError),
    #[error(transparent)]
    Callback(#[from] auth::CallbackError),
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to render output: {0}")]
    Output(#[from] serde_json::Error),
    #[error("{0}")]
    Usage(String),
}

#[derive(Args, Debug, Clone, Copy)]
pub struct PageArgs {
    /// Zero-based page index
    #[arg(long, default_value_t = 0)]
    page: u32,
    /// Page size
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    size: u32,
}

impl From<PageArgs> for PageRequest {
    fn from(args: PageArgs) -> Self {
        PageRequest::new(args.page, args.size)
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Open the Google login page in the browser
    Login,
    /// Store the tokens from the login redirect URL
    Callback { url: String },
    /// Show whether a session is stored
    Status,
    /// Fetch the current authenticated identity
    Whoami,
    /// Exchange the stored refresh token for a new pair
    Refresh,
    /// Invalidate the session server-side and clear local tokens
    Logout,
    /// Browse and search models
    #[command(subcommand)]
    Models(ModelsCommand),
    /// Like or favorite a model
    Like { model_id: i64 },
    Favorite { model_id: i64 },
    /// List or post comments on a model
    #[command(subcommand)]
    Comments(CommentsCommand),
    #[command(subcommand)]
    Tags(TagsCommand),
    /// Show a user profile (your own when no id is given)
    Profile { user_id: Option<i64> },
    /// Search models and users
    Search {
        query: String,
        #[command(flatten)]
        page: PageArgs,
    },
    /// Upload files and print their download URLs
    Upload { files: Vec<PathBuf> },
    /// Training jobs
    #[command(subcommand)]
    Jobs(JobsCommand),
    /// Submit an image generation request
    Generate(GenerateArgs),
    /// Your generation history
    History {
        #[command(flatten)]
        page: PageArgs,
    },
    /// Print progress events until a terminal status arrives
    Watch {
        #[arg(value_parser = parse_channel)]
        channel: Channel,
    },
}

#[derive(Subcommand, Debug)]
pub enum ModelsCommand {
    List {
        #[command(flatten)]
        page: PageArgs,
    },
    Popular {
        #[command(flatten)]
        page: PageArgs,
    },
    Mine {
        #[command(flatten)]
        page: PageArgs,
    },
    Show { model_id: i64 },
    Search {
        query: String,
        #[command(flatten)]
        page: PageArgs,
    },
    Filter {
        /// Repeat for several tags
        #[arg(long = "tag", required = true)]
        tags: Vec<String>,
        #[command(flatten)]
        page: PageArgs,
    },
    Delete { model_id: i64 },
}

#[derive(Subcommand, Debug)]
pub enum CommentsCommand {
    List {
        model_id: i64,
        #[command(flatten)]
        page: PageArgs,
    },
    Post {
        model_id: i64,
        content: String,
        /// Reply to this comment
        #[arg(long)]
        reply_to: Option<i64>,
    },
}

#[derive(Subcommand, Debug)]
pub enum TagsCommand {
    List,
    Popular,
    Search { keyword: String },
    Add {
        model_id: i64,
        name: String,
        #[arg(long)]
        category: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum JobsCommand {
    List,
    Show { job_id: i64 },
    /// Start a created job with already-uploaded image URLs
    Start {
        job_id: i64,
        #[arg(long)]
        name: String,
        #[arg(long, default_value_t = 10)]
        epochs: u32,
        #[arg(long = "image", required = true)]
        images: Vec<String>,
        #[arg(long)]
        callback_base_url: Option<String>,
    },
    Cancel { job_id: i64 },
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    #[arg(long)]
    model: i64,
    #[arg(long)]
    prompt: String,
    #[arg(long)]
    negative: Option<String>,
    #[arg(long)]
    steps: Option<u32>,
    #[arg(long)]
    guidance: Option<f64>,
    #[arg(long)]
    images: Option<u32>,
    #[arg(long)]
    seed: Option<i64>,
}

fn parse_channel(value: &str) -> Result<Channel, String> {
    match value {
        "training" => Ok(Channel::Training),
        "generation" => Ok(Channel::Generation),
        other => Err(format!("unknown channel `{}` (expected training or generation)", other)),
    }
}

fn print<T: Serialize>(value: &T) -> Result<(), CommandError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub async fn run(command: Command, client: &ApiClient) -> Result<(), CommandError> {
    match command {
        Command::Login => {
            println!("{}", auth::login_url(client));
            auth::open_login(client)?;
        }
        Command::Callback { url } => {
            auth::complete_login(client.session().as_ref(), &url)?;
            println!("Logged in.");
        }
        Command::Status => {
            let session = client.session();
            let subject = session.access_token().as_deref().and_then(token_subject);
            print(&serde_json::json!({
                "authenticated": session.is_authenticated(),
                "subject": subject,
                "storage": session.name(),
            }))?;
        }
        Command::Whoami => print(&auth::get_current_user(client).await?)?,
        Command::Refresh => {
            if auth::refresh_session(client).await? {
                println!("Session refreshed.");
            } else {
                return Err(CommandError::Usage("No refresh token stored; log in first".into()));
            }
        }
        Command::Logout => {
            auth::logout_session(client).await?;
            println!("Logged out.");
        }
        Command::Models(cmd) => run_models(cmd, client).await?,
        Command::Like { model_id } => print(&community::toggle_like(client, model_id).await?)?,
        Command::Favorite { model_id } => {
            print(&community::toggle_favorite(client, model_id).await?)?
        }
        Command::Comments(CommentsCommand::List { model_id, page }) => {
            print(&community::get_comments(client, model_id, page.into()).await?)?
        }
        Command::Comments(CommentsCommand::Post {
            model_id,
            content,
            reply_to,
        }) => print(&community::create_comment(client, model_id, &content, reply_to).await?)?,
        Command::Tags(cmd) => run_tags(cmd, client).await?,
        Command::Profile { user_id: None } => print(&user::get_my_profile(client).await?)?,
        Command::Profile { user_id: Some(id) } => {
            print(&user::get_user_profile(client, id).await?)?
        }
        Command::Search { query, page } => {
            print(&search::search_all(client, &query, page.into()).await?)?
        }
        Command::Upload { files } => run_upload(files, client).await?,
        Command::Jobs(cmd) => run_jobs(cmd, client).await?,
        Command::Generate(args) => {
            let request = GenerateRequest {
                model_id: args.model,
                prompt: args.prompt,
                negative_prompt: args.negative,
                steps: args.steps,
                guidance_scale: args.guidance,
                num_images: args.images,
                seed: args.seed,
            };
            print(&generation::generate_image(client, &request).await?)?
        }
        Command::History { page } => {
            print(&generation::get_my_generation_history(client, page.into()).await?)?
        }
        Command::Watch { channel } => watch(channel, client).await?,
    }
    Ok(())
}

async fn run_models(cmd: ModelsCommand, client: &ApiClient) -> Result<(), CommandError> {
    match cmd {
        ModelsCommand::List { page } => print(&models::get_public_models(client, page.into()).await?),
        ModelsCommand::Popular { page } => {
            print(&models::get_popular_models(client, page.into()).await?)
        }
        ModelsCommand::Mine { page } => print(&models::get_my_models(client, page.into()).await?),
        ModelsCommand::Show { model_id } => print(&models::get_model_detail(client, model_id).await?),
        ModelsCommand::Search { query, page } => {
            print(&models::search_models(client, &query, page.into()).await?)
        }
        ModelsCommand::Filter { tags, page } => {
            print(&models::filter_by_tags(client, &tags, page.into()).await?)
        }
        ModelsCommand::Delete { model_id } => print(&models::delete_model(client, model_id).await?),
    }
}

async fn run_tags(cmd: TagsCommand, client: &ApiClient) -> Result<(), CommandError> {
    match cmd {
        TagsCommand::List => print(&tags::get_all_tags(client).await?),
        TagsCommand::Popular => print(&tags::get_popular_tags(client).await?),
        TagsCommand::Search { keyword } => print(&tags::search_tags(client, &keyword).await?),
        TagsCommand::Add {
            model_id,
            name,
            category,
        } => print(&tags::add_tag_to_model(client, model_id, &name, category.as_deref()).await?),
    }
}

async fn run_jobs(cmd: JobsCommand, client: &ApiClient) -> Result<(), CommandError> {
    match cmd {
        JobsCommand::List => print(&training::get_my_training_jobs(client).await?),
        JobsCommand::Show { job_id } => print(&training::get_training_job(client, job_id).await?),
        JobsCommand::Start {
            job_id,
            name,
            epochs,
            images,
            callback_base_url,
        } => {
            let request = StartTrainingRequest {
                total_epochs: epochs,
                model_name: name,
                training_image_urls: images,
                callback_base_url,
            };
            print(&training::start_training(client, job_id, &request).await?)
        }
        JobsCommand::Cancel { job_id } => {
            print(&training::cancel_training_job(client, job_id).await?)
        }
    }
}

async fn run_upload(paths: Vec<PathBuf>, client: &ApiClient) -> Result<(), CommandError> {
    if paths.is_empty() {
        return Err(CommandError::Usage("No files given".into()));
    }

    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let bytes = tokio::fs::read(&path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| CommandError::Usage(format!("Not a file: {}", path.display())))?;
        files.push(UploadFile::new(name, bytes));
    }

    let urls = upload::upload_files(client, files).await?;
    print(&urls)
}

/// Print events until a terminal one, then close the channel.
async fn watch(channel: Channel, client: &ApiClient) -> Result<(), CommandError> {
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let mut subscription = stream::subscribe(client, channel, move |event| {
        let _ = tx.send(event);
    });

    loop {
        tokio::select! {
            biased;
            event = rx.recv() => {
                let Some(event) = event else { break };
                print(&event)?;
                if event.is_terminal() {
                    log::info!("Terminal status {:?}, closing channel", event.status);
                    break;
                }
            }
            _ = subscription.wait_closed() => break,
        }
    }
    subscription.close().await?;
    Ok(())
}
