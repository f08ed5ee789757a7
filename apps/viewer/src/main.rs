use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    current_user::CurrentUser, load_settings, ApiClient, Environment, HttpApiClient, Observer, ProjectViewModel,
    ProjectViewModelInputs, ProjectViewModelOutputs, UpdateViewModel, UpdateViewModelInputs,
    UpdateViewModelOutputs,
};
use futures::StreamExt;
use shared::{
    domain::{Update, UpdateId, User, UserId},
    intent::{Intent, IntentKey, Request},
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Drive screen view-models against a live API and print their outputs")]
struct Args {
    /// Settings file; defaults to ./client.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Overrides the API base url from settings.
    #[arg(long)]
    api_url: Option<String>,
    /// How long to wait for asynchronous outputs.
    #[arg(long, default_value_t = 5_000)]
    wait_ms: u64,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Open the update screen for an update loaded from a JSON file or the API.
    Update {
        #[arg(long, conflicts_with_all = ["project", "update_id"])]
        file: Option<PathBuf>,
        #[arg(long, requires = "update_id")]
        project: Option<String>,
        #[arg(long, requires = "project")]
        update_id: Option<i64>,
        /// Fire the comments trigger.
        #[arg(long)]
        comments: bool,
        /// Fire the go-to-project trigger.
        #[arg(long)]
        open_project: bool,
    },
    /// Open the project page.
    Project {
        param: String,
        /// Press the star button once the project is shown.
        #[arg(long)]
        star: bool,
        /// Sign in as this user id; otherwise starring shows the login tout.
        #[arg(long)]
        user: Option<i64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let args = Args::parse();

    let mut settings = load_settings(args.config.as_deref())?;
    if let Some(api_url) = args.api_url {
        settings.api_base_url = api_url;
    }
    info!(api = %settings.api_base_url, locale = %settings.locale, "settings loaded");

    let client: Arc<dyn ApiClient> = Arc::new(
        HttpApiClient::new(&settings.api_base_url, settings.request_timeout())
            .context("failed to build api client")?,
    );
    let environment = Environment::from_settings(&settings, Arc::clone(&client));
    let wait = Duration::from_millis(args.wait_ms);

    match args.command {
        Command::Update {
            file,
            project,
            update_id,
            comments,
            open_project,
        } => {
            let update = match (file, project, update_id) {
                (Some(path), _, _) => read_update(&path)?,
                (None, Some(project), Some(update_id)) => client
                    .fetch_update(&project, UpdateId(update_id))
                    .await
                    .with_context(|| format!("failed to fetch update {update_id} of {project}"))?,
                _ => bail!("pass either --file or --project with --update-id"),
            };
            run_update_screen(environment, update, comments, open_project, wait).await
        }
        Command::Project { param, star, user } => {
            let project = client
                .fetch_project(&param)
                .await
                .with_context(|| format!("failed to fetch project {param}"))?;
            let intent = Intent::new().with_extra(IntentKey::Project, &project)?;
            let current_user = CurrentUser::default();
            if let Some(id) = user {
                current_user.refresh(User {
                    id: UserId(id),
                    name: format!("user {id}"),
                });
            }
            let environment = environment.to_builder().current_user(current_user).build();
            run_project_screen(environment, intent, star, wait).await
        }
    }
}

fn read_update(path: &Path) -> Result<Update> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read update file '{}'", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("'{}' does not contain an update", path.display()))
}

async fn run_update_screen(
    environment: Environment,
    update: Update,
    comments: bool,
    open_project: bool,
    wait: Duration,
) -> Result<()> {
    let vm = UpdateViewModel::new(environment);
    let mut titles = vm.update_sequence();
    let mut urls = vm.web_view_url();
    let mut comment_starts = vm.start_comments_activity();
    let mut project_starts = vm.start_project_activity();

    let request = Request::new(update.urls.web.update.clone());
    vm.intent(Intent::new().with_extra(IntentKey::Update, &update)?);

    for title in titles.values() {
        println!("update_sequence: #{title}");
    }
    for url in urls.values() {
        println!("web_view_url: {url}");
    }

    if comments {
        vm.go_to_comments_request(request.clone());
        for update in comment_starts.values() {
            println!("start_comments_activity: update {} ({})", update.id.0, update.title);
        }
    }

    if open_project {
        vm.go_to_project_request(request);
        match next_within(&mut project_starts, wait).await {
            Some((project, ref_tag)) => println!(
                "start_project_activity: {} ref_tag={}",
                project.name,
                ref_tag.tag()
            ),
            None => println!("start_project_activity: nothing emitted"),
        }
    }

    vm.destroy();
    Ok(())
}

async fn run_project_screen(
    environment: Environment,
    intent: Intent,
    star: bool,
    wait: Duration,
) -> Result<()> {
    let vm = ProjectViewModel::new(environment);
    let mut projects = vm.project_and_config();
    let mut login_touts = vm.show_login_tout();
    let mut starred_prompts = vm.show_starred_prompt();

    vm.intent(intent);
    // Intent project, then the refreshed copy.
    for _ in 0..2 {
        if let Some((project, config)) = next_within(&mut projects, wait).await {
            println!(
                "project_and_config: {} {:.0}% funded, starred={} country={}",
                project.name,
                project.percentage_funded(),
                project.is_starred,
                config.country_code
            );
        }
    }

    if star {
        vm.star_clicked();
        if login_touts.values().is_empty() {
            if let Some((project, _)) = next_within(&mut projects, wait).await {
                println!("project_and_config: starred={}", project.is_starred);
            }
            if next_within(&mut starred_prompts, Duration::from_millis(50)).await.is_some() {
                println!("show_starred_prompt");
            }
        } else {
            println!("show_login_tout: log in to star this project");
        }
    }

    vm.destroy();
    Ok(())
}

async fn next_within<T>(observer: &mut Observer<T>, wait: Duration) -> Option<T> {
    tokio::time::timeout(wait, observer.next()).await.ok().flatten()
}
