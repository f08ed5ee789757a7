//! View-model layer of the crowdfunding client.
//!
//! Each screen owns a view-model. The screen pushes user intents in through
//! the `*Inputs` trait and renders whatever the `*Outputs` observers deliver.
//! Backend access goes through [`ApiClient`].

pub mod api_client;
pub mod config;
pub mod current_config;
pub mod current_user;
pub mod environment;
pub mod error;
pub mod number_format;
pub mod project_view_model;
pub mod subject;
pub mod update_view_model;
pub mod view_model;

pub use api_client::{ApiClient, HttpApiClient};
pub use config::{load_settings, ClientSettings};
pub use environment::Environment;
pub use error::{ClientError, ClientResult};
pub use project_view_model::{ProjectViewModel, ProjectViewModelInputs, ProjectViewModelOutputs};
pub use subject::{Observer, Subject};
pub use update_view_model::{UpdateViewModel, UpdateViewModelInputs, UpdateViewModelOutputs};

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;
