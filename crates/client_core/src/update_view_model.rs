//! View-model for the project update screen.

use std::sync::{Mutex, PoisonError};

use shared::{
    domain::{Project, RefTag, Update},
    intent::{Intent, IntentKey, Request},
};
use tracing::{debug, warn};

use crate::{
    api_client::with_timeout,
    environment::Environment,
    number_format::format_number,
    subject::{Gate, Observer, Subject},
    view_model::ActivityViewModel,
};

const FETCH_PROJECT: &str = "update.fetch_project";

pub trait UpdateViewModelInputs {
    /// Call when the web view requests the update's comments.
    fn go_to_comments_request(&self, request: Request);
    /// Call when the web view requests the update's project.
    fn go_to_project_request(&self, request: Request);
}

pub trait UpdateViewModelOutputs {
    /// Update to open the comments screen with.
    fn start_comments_activity(&self) -> Observer<Update>;
    /// Project and ref tag to open the project screen with.
    fn start_project_activity(&self) -> Observer<(Project, RefTag)>;
    /// Toolbar title.
    fn update_sequence(&self) -> Observer<String>;
    /// Url for the web view.
    fn web_view_url(&self) -> Observer<String>;
}

#[derive(Default)]
struct UpdateGates {
    comments: Gate<Update>,
    project: Gate<Update>,
}

pub struct UpdateViewModel {
    base: ActivityViewModel,
    gates: Mutex<UpdateGates>,
    start_comments_activity: Subject<Update>,
    start_project_activity: Subject<(Project, RefTag)>,
    update_sequence: Subject<String>,
    web_view_url: Subject<String>,
}

impl UpdateViewModel {
    pub fn new(environment: Environment) -> Self {
        Self {
            base: ActivityViewModel::new("update", environment),
            gates: Mutex::new(UpdateGates::default()),
            start_comments_activity: Subject::replay_latest(),
            start_project_activity: Subject::replay_latest(),
            update_sequence: Subject::replay_latest(),
            web_view_url: Subject::replay_latest(),
        }
    }

    /// Supplies the startup payload. Payloads without a well-formed update
    /// leave every output silent.
    pub fn intent(&self, intent: Intent) {
        if self.base.is_destroyed() {
            return;
        }
        let Some(update) = intent
            .extra::<Update>(IntentKey::Update)
            .filter(Update::has_valid_web_url)
        else {
            debug!(
                has_extra = intent.has_extra(IntentKey::Update),
                "intent carries no usable update"
            );
            return;
        };

        {
            let mut gates = self.gates.lock().unwrap_or_else(PoisonError::into_inner);
            gates.comments.set_entity(update.clone());
            gates.project.set_entity(update.clone());
        }

        self.web_view_url.on_next(web_view_url(&update));
        self.update_sequence
            .on_next(update_sequence(&update, self.base.environment()));
    }

    /// Tears the screen down: in-flight fetches are cancelled and every output
    /// completes.
    pub fn destroy(&self) {
        if !self.base.destroy() {
            return;
        }
        self.start_comments_activity.on_completed();
        self.start_project_activity.on_completed();
        self.update_sequence.on_completed();
        self.web_view_url.on_completed();
    }

    pub fn is_fetching_project(&self) -> bool {
        self.base.scope().is_in_flight(FETCH_PROJECT)
    }

    fn fire(&self, select: impl FnOnce(&UpdateGates) -> &Gate<Update>) -> Option<Update> {
        if self.base.is_destroyed() {
            return None;
        }
        let gates = self.gates.lock().unwrap_or_else(PoisonError::into_inner);
        select(&gates).fire()
    }
}

fn web_view_url(update: &Update) -> String {
    update.urls.web.update.clone()
}

fn update_sequence(update: &Update, environment: &Environment) -> String {
    format_number(update.sequence, environment.locale())
}

impl UpdateViewModelInputs for UpdateViewModel {
    fn go_to_comments_request(&self, request: Request) {
        let Some(update) = self.fire(|gates| &gates.comments) else {
            debug!(url = %request.url, "comments requested before update arrived");
            return;
        };
        self.start_comments_activity.on_next(update);
    }

    fn go_to_project_request(&self, request: Request) {
        let Some(update) = self.fire(|gates| &gates.project) else {
            debug!(url = %request.url, "project requested before update arrived");
            return;
        };

        let environment = self.base.environment();
        let client = environment.api_client();
        let timeout = environment.request_timeout();
        let output = self.start_project_activity.clone();
        let param = update.project_id.0.to_string();

        self.base.scope().switch(FETCH_PROJECT, move |guard| async move {
            match with_timeout(timeout, client.fetch_project(&param)).await {
                Ok(project) => {
                    guard.emit_if_current(|| output.on_next((project, RefTag::update())));
                }
                Err(err) => {
                    warn!(project = %param, error = %err, "project fetch failed; dropping request");
                }
            }
        });
    }
}

impl UpdateViewModelOutputs for UpdateViewModel {
    fn start_comments_activity(&self) -> Observer<Update> {
        self.start_comments_activity.subscribe()
    }

    fn start_project_activity(&self) -> Observer<(Project, RefTag)> {
        self.start_project_activity.subscribe()
    }

    fn update_sequence(&self) -> Observer<String> {
        self.update_sequence.subscribe()
    }

    fn web_view_url(&self) -> Observer<String> {
        self.web_view_url.subscribe()
    }
}

impl Drop for UpdateViewModel {
    fn drop(&mut self) {
        self.destroy();
    }
}

#[cfg(test)]
#[path = "tests/update_view_model_tests.rs"]
mod tests;
