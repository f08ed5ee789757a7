//! Factories and an in-memory API client shared by the view-model tests.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use futures::StreamExt;
use shared::domain::{
    Project, ProjectId, ProjectState, ProjectUrls, ProjectWebUrls, Update, UpdateId, UpdateUrls,
    UpdateWebUrls, User, UserId,
};
use tokio::sync::Semaphore;

use crate::{
    api_client::ApiClient,
    environment::Environment,
    error::{ClientError, ClientResult},
    subject::Observer,
};

pub fn project() -> Project {
    Project {
        id: ProjectId(11),
        name: "Brass Desk Lamp".into(),
        slug: Some("brass-desk-lamp".into()),
        state: ProjectState::Live,
        launched_at: Some(Utc::now() - ChronoDuration::days(20)),
        deadline: Some(Utc::now() + ChronoDuration::days(10)),
        goal: 10_000.0,
        pledged: 2_500.0,
        backers_count: 40,
        is_starred: false,
        urls: ProjectUrls {
            web: ProjectWebUrls {
                project: "https://example.test/projects/brass-desk-lamp".into(),
                updates: Some("https://example.test/projects/brass-desk-lamp/posts".into()),
            },
        },
    }
}

pub fn half_way_project() -> Project {
    Project {
        pledged: 5_000.0,
        ..project()
    }
}

pub fn almost_completed_project() -> Project {
    Project {
        pledged: 9_500.0,
        deadline: Some(Utc::now() + ChronoDuration::hours(20)),
        ..project()
    }
}

pub fn successful_project() -> Project {
    Project {
        state: ProjectState::Successful,
        pledged: 12_000.0,
        deadline: Some(Utc::now() - ChronoDuration::days(3)),
        ..project()
    }
}

pub fn update() -> Update {
    Update {
        id: UpdateId(42),
        project_id: ProjectId(11),
        sequence: 7,
        title: "Tooling is done".into(),
        published_at: Some(Utc::now()),
        comments_count: Some(4),
        urls: UpdateUrls {
            web: UpdateWebUrls {
                update: "https://x/7".into(),
            },
        },
    }
}

pub fn user() -> User {
    User {
        id: UserId(77),
        name: "Early Backer".into(),
    }
}

#[derive(Default)]
pub struct MockApiClient {
    projects: Vec<Project>,
    fail_fetch: bool,
    fail_star: bool,
    fetch_delays: Mutex<VecDeque<Duration>>,
    fetch_gate: Option<Arc<Semaphore>>,
    calls: Mutex<Vec<String>>,
}

impl MockApiClient {
    pub fn with_projects(projects: Vec<Project>) -> Self {
        Self {
            projects,
            ..Self::default()
        }
    }

    pub fn failing_fetch(mut self) -> Self {
        self.fail_fetch = true;
        self
    }

    pub fn failing_star(mut self) -> Self {
        self.fail_star = true;
        self
    }

    /// Each fetch pops the next delay before answering.
    pub fn with_fetch_delays(self, delays: impl IntoIterator<Item = Duration>) -> Self {
        *self.fetch_delays.lock().expect("delays") = delays.into_iter().collect();
        self
    }

    /// Fetches block until a permit is added to `gate`.
    pub fn with_fetch_gate(mut self, gate: Arc<Semaphore>) -> Self {
        self.fetch_gate = Some(gate);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls").clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().expect("calls").push(call);
    }

    fn find(&self, param: &str) -> Option<Project> {
        self.projects
            .iter()
            .find(|p| p.param() == param || p.id.0.to_string() == param)
            .cloned()
    }
}

#[async_trait]
impl ApiClient for MockApiClient {
    async fn fetch_project(&self, param: &str) -> ClientResult<Project> {
        self.record(format!("fetch_project {param}"));
        let delay = self.fetch_delays.lock().expect("delays").pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(gate) = &self.fetch_gate {
            gate.acquire().await.expect("gate").forget();
        }
        if self.fail_fetch {
            return Err(ClientError::not_found("project fetch disabled"));
        }
        self.find(param)
            .ok_or_else(|| ClientError::not_found(format!("no project {param}")))
    }

    async fn fetch_update(&self, project_param: &str, update_id: UpdateId) -> ClientResult<Update> {
        self.record(format!("fetch_update {project_param} {}", update_id.0));
        Err(ClientError::not_found(format!("no update {}", update_id.0)))
    }

    async fn star_project(&self, project: &Project) -> ClientResult<Project> {
        self.record(format!("star_project {}", project.param()));
        if self.fail_star {
            return Err(ClientError::Timeout(Duration::from_millis(1)));
        }
        Ok(project.with_starred(true))
    }

    async fn toggle_project_star(&self, project: &Project) -> ClientResult<Project> {
        self.record(format!("toggle_project_star {}", project.param()));
        if self.fail_star {
            return Err(ClientError::Timeout(Duration::from_millis(1)));
        }
        Ok(project.with_starred(!project.is_starred))
    }
}

pub fn environment(client: Arc<MockApiClient>) -> Environment {
    Environment::builder(client).build()
}

pub async fn next_within<T>(observer: &mut Observer<T>, millis: u64) -> Option<T> {
    tokio::time::timeout(Duration::from_millis(millis), observer.next())
        .await
        .ok()
        .flatten()
}

pub async fn assert_silent<T: std::fmt::Debug>(observer: &mut Observer<T>, millis: u64) {
    if let Ok(Some(value)) =
        tokio::time::timeout(Duration::from_millis(millis), observer.next()).await
    {
        panic!("expected no emission, got {value:?}");
    }
}
