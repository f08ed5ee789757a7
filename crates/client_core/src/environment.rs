//! Collaborators handed to every view-model at construction.

use std::{sync::Arc, time::Duration};

use shared::domain::Config;

use crate::{
    api_client::ApiClient, config::ClientSettings, current_config::CurrentConfig,
    current_user::CurrentUser, number_format::Locale,
};

#[derive(Clone)]
pub struct Environment {
    api_client: Arc<dyn ApiClient>,
    current_user: CurrentUser,
    current_config: CurrentConfig,
    locale: Locale,
    request_timeout: Duration,
}

impl Environment {
    pub fn builder(api_client: Arc<dyn ApiClient>) -> EnvironmentBuilder {
        EnvironmentBuilder {
            api_client,
            current_user: CurrentUser::default(),
            current_config: CurrentConfig::default(),
            locale: Locale::default(),
            request_timeout: ClientSettings::default().request_timeout(),
        }
    }

    pub fn from_settings(settings: &ClientSettings, api_client: Arc<dyn ApiClient>) -> Self {
        Self::builder(api_client)
            .locale(Locale::new(&settings.locale))
            .request_timeout(settings.request_timeout())
            .current_config(CurrentConfig::new(Config {
                country_code: settings.country_code.clone(),
                ..Config::default()
            }))
            .build()
    }

    pub fn to_builder(&self) -> EnvironmentBuilder {
        EnvironmentBuilder {
            api_client: Arc::clone(&self.api_client),
            current_user: self.current_user.clone(),
            current_config: self.current_config.clone(),
            locale: self.locale.clone(),
            request_timeout: self.request_timeout,
        }
    }

    pub fn api_client(&self) -> Arc<dyn ApiClient> {
        Arc::clone(&self.api_client)
    }

    pub fn current_user(&self) -> &CurrentUser {
        &self.current_user
    }

    pub fn current_config(&self) -> &CurrentConfig {
        &self.current_config
    }

    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
}

pub struct EnvironmentBuilder {
    api_client: Arc<dyn ApiClient>,
    current_user: CurrentUser,
    current_config: CurrentConfig,
    locale: Locale,
    request_timeout: Duration,
}

impl EnvironmentBuilder {
    pub fn current_user(mut self, current_user: CurrentUser) -> Self {
        self.current_user = current_user;
        self
    }

    pub fn current_config(mut self, current_config: CurrentConfig) -> Self {
        self.current_config = current_config;
        self
    }

    pub fn locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    pub fn request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    pub fn build(self) -> Environment {
        Environment {
            api_client: self.api_client,
            current_user: self.current_user,
            current_config: self.current_config,
            locale: self.locale,
            request_timeout: self.request_timeout,
        }
    }
}
