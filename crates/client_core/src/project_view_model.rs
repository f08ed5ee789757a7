//! View-model for the project page.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use shared::{
    domain::{Config, Project},
    intent::{Intent, IntentKey},
};
use tracing::{debug, info, warn};

use crate::{
    api_client::with_timeout,
    environment::Environment,
    subject::{Observer, Subject},
    view_model::ActivityViewModel,
};

const REFRESH_PROJECT: &str = "project.refresh";
const STAR_PROJECT: &str = "project.star";

pub trait ProjectViewModelInputs {
    /// Call when the star button is pressed.
    fn star_clicked(&self);
    /// Call when the login screen reports a successful login.
    fn login_success(&self);
}

pub trait ProjectViewModelOutputs {
    fn project_and_config(&self) -> Observer<(Project, Config)>;
    /// Fires when a logged-out user tries to star.
    fn show_login_tout(&self) -> Observer<()>;
    /// Fires after starring a live project that is not about to end.
    fn show_starred_prompt(&self) -> Observer<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StarAction {
    Star,
    Toggle,
}

#[derive(Default)]
struct ProjectScreenState {
    project: Option<Project>,
    star_after_login: bool,
}

#[derive(Clone)]
struct ProjectOutputs {
    state: Arc<Mutex<ProjectScreenState>>,
    project_and_config: Subject<(Project, Config)>,
    show_login_tout: Subject<()>,
    show_starred_prompt: Subject<()>,
}

impl ProjectOutputs {
    fn state(&self) -> MutexGuard<'_, ProjectScreenState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish_project(&self, project: Project, config: Config) {
        self.state().project = Some(project.clone());
        self.project_and_config.on_next((project, config));
    }

    fn complete(&self) {
        self.project_and_config.on_completed();
        self.show_login_tout.on_completed();
        self.show_starred_prompt.on_completed();
    }
}

pub struct ProjectViewModel {
    base: ActivityViewModel,
    outputs: ProjectOutputs,
}

impl ProjectViewModel {
    pub fn new(environment: Environment) -> Self {
        Self {
            base: ActivityViewModel::new("project", environment),
            outputs: ProjectOutputs {
                state: Arc::new(Mutex::new(ProjectScreenState::default())),
                project_and_config: Subject::replay_latest(),
                show_login_tout: Subject::publish(),
                show_starred_prompt: Subject::publish(),
            },
        }
    }

    /// Supplies the startup payload. The project is shown right away and then
    /// refreshed from the API.
    pub fn intent(&self, intent: Intent) {
        if self.base.is_destroyed() {
            return;
        }
        let Some(project) = intent.extra::<Project>(IntentKey::Project) else {
            debug!(
                has_extra = intent.has_extra(IntentKey::Project),
                "intent carries no usable project"
            );
            return;
        };

        let current_config = self.base.environment().current_config().clone();
        let param = project.param();
        self.outputs.publish_project(project, current_config.get());

        let client = self.base.environment().api_client();
        let timeout = self.base.environment().request_timeout();
        let outputs = self.outputs.clone();
        self.base.scope().switch(REFRESH_PROJECT, move |guard| async move {
            match with_timeout(timeout, client.fetch_project(&param)).await {
                Ok(refreshed) => {
                    guard.emit_if_current(|| outputs.publish_project(refreshed, current_config.get()));
                }
                Err(err) => {
                    warn!(project = %param, error = %err, "project refresh failed; keeping intent project");
                }
            }
        });
    }

    pub fn destroy(&self) {
        if self.base.destroy() {
            self.outputs.complete();
        }
    }

    fn current_project(&self) -> Option<Project> {
        if self.base.is_destroyed() {
            return None;
        }
        self.outputs.state().project.clone()
    }

    fn start_star(&self, project: Project, action: StarAction) {
        let client = self.base.environment().api_client();
        let timeout = self.base.environment().request_timeout();
        let current_config = self.base.environment().current_config().clone();
        let outputs = self.outputs.clone();
        let param = project.param();

        info!(project = %param, ?action, "starring project");
        // The star result supersedes any pending refresh.
        self.base.scope().cancel(REFRESH_PROJECT);
        self.base.scope().switch(STAR_PROJECT, move |guard| async move {
            let result = match action {
                StarAction::Star => with_timeout(timeout, client.star_project(&project)).await,
                StarAction::Toggle => {
                    with_timeout(timeout, client.toggle_project_star(&project)).await
                }
            };
            match result {
                Ok(starred) => {
                    guard.emit_if_current(|| {
                        let prompt = should_show_starred_prompt(&starred);
                        outputs.publish_project(starred, current_config.get());
                        if prompt {
                            outputs.show_starred_prompt.on_next(());
                        }
                    });
                }
                Err(err) => {
                    warn!(project = %param, ?action, error = %err, "star request failed; dropping");
                }
            }
        });
    }
}

fn should_show_starred_prompt(project: &Project) -> bool {
    project.is_starred && project.is_live() && !project.is_approaching_deadline()
}

impl ProjectViewModelInputs for ProjectViewModel {
    fn star_clicked(&self) {
        let Some(project) = self.current_project() else {
            debug!("star clicked before project arrived");
            return;
        };

        if self.base.environment().current_user().is_logged_in() {
            self.start_star(project, StarAction::Toggle);
        } else {
            self.outputs.state().star_after_login = true;
            self.outputs.show_login_tout.on_next(());
        }
    }

    fn login_success(&self) {
        let Some(project) = self.current_project() else {
            return;
        };
        if !self.base.environment().current_user().is_logged_in() {
            debug!("login reported without a current user");
            return;
        }
        let pending = std::mem::take(&mut self.outputs.state().star_after_login);
        if pending {
            self.start_star(project, StarAction::Star);
        }
    }
}

impl ProjectViewModelOutputs for ProjectViewModel {
    fn project_and_config(&self) -> Observer<(Project, Config)> {
        self.outputs.project_and_config.subscribe()
    }

    fn show_login_tout(&self) -> Observer<()> {
        self.outputs.show_login_tout.subscribe()
    }

    fn show_starred_prompt(&self) -> Observer<()> {
        self.outputs.show_starred_prompt.subscribe()
    }
}

impl Drop for ProjectViewModel {
    fn drop(&mut self) {
        self.destroy();
    }
}

#[cfg(test)]
#[path = "tests/project_view_model_tests.rs"]
mod tests;
