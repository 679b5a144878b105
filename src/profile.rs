use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{de, Deserialize, Deserializer, Serialize};
use url::Url;

use crate::identity::Identity;
use crate::{LandingError, Result};

/// A user record confirmed by the profile API.
#[derive(Eq, PartialEq, Clone, Debug, Deserialize, Serialize)]
pub struct Profile {
    #[serde(rename = "ID", deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "VisibleName")]
    pub visible_name: String,
}

impl Profile {
    /// `None` when the backend sent an empty id or name.
    pub fn identity(&self) -> Option<Identity> {
        Identity::new(self.id.clone(), self.name.clone())
    }
}

#[derive(Debug, Deserialize, Serialize)]
struct ProfileEnvelope {
    #[serde(rename = "Profile")]
    profile: Profile,
}

#[derive(Debug, Serialize)]
struct NewProfile<'a> {
    #[serde(rename = "VisibleName")]
    visible_name: &'a str,
}

fn string_or_number<'de, D>(
    deserializer: D,
) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

/// Where the profile API lives and how the companion app is reached.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoints {
    api: String,
    intent_scheme: String,
}

impl Endpoints {
    pub fn new(api: &Url, intent_scheme: impl Into<String>) -> Self {
        Self {
            api: api.as_str().trim_end_matches('/').to_owned(),
            intent_scheme: intent_scheme.into(),
        }
    }

    pub fn api(&self) -> &str {
        &self.api
    }

    pub fn user(&self, identity: &Identity) -> String {
        format!("{}/user/{}", self.api, identity)
    }

    pub fn new_user(&self) -> String {
        format!("{}/user/new", self.api)
    }

    pub fn subscription(&self, profile: &Profile) -> String {
        format!("{}/sub/{}-{}", self.api, profile.id, profile.name)
    }

    /// Custom-scheme link handing the subscription URL to the app.
    pub fn deep_link(&self, profile: &Profile) -> String {
        format!("{}{}", self.intent_scheme, self.subscription(profile))
    }
}

/// Remote store of user profiles.
#[async_trait(?Send)]
pub trait ProfileClient {
    /// `Ok(None)` means the user does not exist.
    async fn fetch_profile(&self, identity: &Identity)
        -> Result<Option<Profile>>;

    async fn create_profile(&self, visible_name: &str) -> Result<Profile>;
}

pub struct HttpProfileClient {
    client: reqwest::Client,
    endpoints: Endpoints,
}

impl HttpProfileClient {
    pub fn new(endpoints: Endpoints) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("landing/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, endpoints })
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    async fn read_profile(
        url: &str,
        response: reqwest::Response,
    ) -> Result<Profile> {
        let status = response.status();
        if !status.is_success() {
            return Err(LandingError::ServerError {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }
        let body = response.bytes().await?;
        let envelope: ProfileEnvelope = serde_json::from_slice(&body)?;
        if envelope.profile.identity().is_none() {
            log::error!("{} returned a profile without id or name", url);
            return Err(LandingError::Parse);
        }
        Ok(envelope.profile)
    }
}

#[async_trait(?Send)]
impl ProfileClient for HttpProfileClient {
    async fn fetch_profile(
        &self,
        identity: &Identity,
    ) -> Result<Option<Profile>> {
        let url = self.endpoints.user(identity);
        log::debug!("GET {}", url);
        let response = self.client.get(&url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Self::read_profile(&url, response).await.map(Some)
    }

    async fn create_profile(&self, visible_name: &str) -> Result<Profile> {
        let url = self.endpoints.new_user();
        log::debug!("POST {}", url);
        let response = self
            .client
            .post(&url)
            .json(&NewProfile { visible_name })
            .send()
            .await?;
        Self::read_profile(&url, response).await
    }
}
