use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);
    };
}

id_newtype!(ProjectId);
id_newtype!(UpdateId);
id_newtype!(UserId);

/// Window before the deadline in which a live project counts as "approaching".
pub const APPROACHING_DEADLINE_WINDOW_HOURS: i64 = 48;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectState {
    Started,
    Submitted,
    Live,
    Successful,
    Failed,
    Canceled,
    Suspended,
    Purged,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectWebUrls {
    pub project: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updates: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectUrls {
    pub web: ProjectWebUrls,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    pub state: ProjectState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub launched_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,
    pub goal: f64,
    pub pledged: f64,
    #[serde(default)]
    pub backers_count: u32,
    #[serde(default)]
    pub is_starred: bool,
    pub urls: ProjectUrls,
}

impl Project {
    /// Path parameter used to address this project on the API: the slug when
    /// present, the numeric id otherwise.
    pub fn param(&self) -> String {
        match self.slug.as_deref() {
            Some(slug) if !slug.is_empty() => slug.to_string(),
            _ => self.id.0.to_string(),
        }
    }

    pub fn is_live(&self) -> bool {
        self.state == ProjectState::Live
    }

    pub fn is_approaching_deadline(&self) -> bool {
        self.is_approaching_deadline_at(Utc::now())
    }

    pub fn is_approaching_deadline_at(&self, now: DateTime<Utc>) -> bool {
        let Some(deadline) = self.deadline else {
            return false;
        };
        deadline <= now + Duration::hours(APPROACHING_DEADLINE_WINDOW_HOURS)
    }

    pub fn percentage_funded(&self) -> f64 {
        if self.goal <= 0.0 {
            return 0.0;
        }
        self.pledged / self.goal * 100.0
    }

    pub fn with_starred(&self, is_starred: bool) -> Self {
        Self {
            is_starred,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateWebUrls {
    pub update: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateUrls {
    pub web: UpdateWebUrls,
}

/// A creator-posted update on a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Update {
    pub id: UpdateId,
    pub project_id: ProjectId,
    pub sequence: i64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments_count: Option<u32>,
    pub urls: UpdateUrls,
}

impl Update {
    /// An update is only rendered when its web url is an absolute http(s) url.
    pub fn has_valid_web_url(&self) -> bool {
        url::Url::parse(&self.urls.web.update)
            .map(|parsed| matches!(parsed.scheme(), "http" | "https"))
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
}

/// Server-provided client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub country_code: String,
    #[serde(default)]
    pub features: BTreeMap<String, bool>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            country_code: "US".into(),
            features: BTreeMap::new(),
        }
    }
}

/// Attribution tag attached to navigation into a project page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RefTag(String);

impl RefTag {
    pub fn from_tag(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn update() -> Self {
        Self::from_tag("update")
    }

    pub fn tag(&self) -> &str {
        &self.0
    }
}
