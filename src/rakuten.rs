//! Client for the Rakuten Recipe API.
//!
//! Only two endpoints are used: the category list, which describes the
//! large/medium/small taxonomy, and the category ranking, which returns the
//! top recipes of one `large-medium-small` category path.

use std::{collections::HashMap, fmt, time::Duration};

use derive_builder::Builder;
use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::data::{CategoryRecord, RecipeRecord, NO_DESCRIPTION, UNKNOWN_TITLE};

pub const DEFAULT_CATEGORY_LIST_URL: &str =
    "https://app.rakuten.co.jp/services/api/Recipe/CategoryList/20170426";
pub const DEFAULT_CATEGORY_RANKING_URL: &str =
    "https://app.rakuten.co.jp/services/api/Recipe/CategoryRanking/20170426";

#[derive(Builder, Clone, Debug)]
#[builder(setter(into))]
pub struct GatewaySettings {
    application_id: String,
    #[builder(default = "DEFAULT_CATEGORY_LIST_URL.to_string()")]
    category_list_url: String,
    #[builder(default = "DEFAULT_CATEGORY_RANKING_URL.to_string()")]
    category_ranking_url: String,
    /// upstream allows one request per second
    #[builder(default = "Duration::from_millis(1500)")]
    request_interval: Duration,
    #[builder(default = "Duration::from_secs(10)")]
    timeout: Duration,
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("fail to reach rakuten api: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("rakuten api request {url} failed with HTTP {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },
    #[error("fail to parse response of {url}: {source}")]
    Parse {
        url: String,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryType {
    Medium,
    Small,
}

impl CategoryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Medium => "medium",
            Self::Small => "small",
        }
    }
}

impl fmt::Display for CategoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category ids arrive as integers, but some parent ids are sent as strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum WireId {
    Number(u64),
    Text(String),
}

impl WireId {
    /// The id as decimal digits, `None` when a text id is not numeric.
    fn into_numeric(self) -> Option<String> {
        match self {
            Self::Number(n) => Some(n.to_string()),
            Self::Text(s) => {
                let s = s.trim();
                (!s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())).then(|| s.to_string())
            }
        }
    }
}

#[derive(Deserialize)]
#[serde(try_from = "WireId")]
struct CategoryId(String);

impl TryFrom<WireId> for CategoryId {
    type Error = String;

    fn try_from(id: WireId) -> Result<Self, Self::Error> {
        id.into_numeric()
            .map(CategoryId)
            .ok_or_else(|| "categoryId is not numeric".to_string())
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CategoryEntry {
    category_id: CategoryId,
    #[serde(default)]
    category_name: String,
    parent_category_id: Option<WireId>,
}

impl From<CategoryEntry> for CategoryRecord {
    fn from(entry: CategoryEntry) -> Self {
        // a non-numeric parent is kept as missing, so the chain cannot resolve
        Self {
            id: entry.category_id.0,
            parent_id: entry
                .parent_category_id
                .and_then(WireId::into_numeric)
                .unwrap_or_default(),
            name: entry.category_name,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RankingEntry {
    recipe_title: Option<String>,
    food_image_url: Option<String>,
    medium_image_url: Option<String>,
    recipe_description: Option<String>,
    recipe_material: Option<Value>,
    recipe_url: Option<String>,
}

impl From<RankingEntry> for RecipeRecord {
    fn from(entry: RankingEntry) -> Self {
        let ingredients = match entry.recipe_material {
            Some(Value::Array(materials)) => Some(
                materials
                    .into_iter()
                    .filter_map(|m| match m {
                        Value::String(s) => Some(s),
                        _ => None,
                    })
                    .collect(),
            ),
            _ => None,
        };

        Self {
            title: entry.recipe_title.unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
            image_url: entry
                .food_image_url
                .or(entry.medium_image_url)
                .unwrap_or_default(),
            description: entry
                .recipe_description
                .unwrap_or_else(|| NO_DESCRIPTION.to_string()),
            ingredients,
            url: entry.recipe_url.unwrap_or_default(),
        }
    }
}

#[derive(Clone)]
pub struct RakutenClient {
    http: Client,
    settings: GatewaySettings,
}

impl RakutenClient {
    pub fn new(settings: GatewaySettings) -> Result<Self, GatewayError> {
        let http = Client::builder().timeout(settings.timeout).build()?;
        Ok(Self { http, settings })
    }

    pub fn request_interval(&self) -> Duration {
        self.settings.request_interval
    }

    /// Fetch the ranking of one `large-medium-small` category path.
    ///
    /// A payload without a `result` array is treated as an empty ranking.
    pub async fn fetch_ranking(
        &self,
        full_category_id: &str,
    ) -> Result<Vec<RecipeRecord>, GatewayError> {
        let (url, json) = self
            .get_json(
                &self.settings.category_ranking_url,
                &[("categoryId", full_category_id)],
            )
            .await?;

        let Some(entries) = json.get("result").and_then(Value::as_array) else {
            warn!("unexpected ranking payload from {url}: {json}");
            return Ok(Vec::new());
        };

        entries
            .iter()
            .map(|entry| {
                RankingEntry::deserialize(entry)
                    .map(RecipeRecord::from)
                    .map_err(|source| GatewayError::Parse {
                        url: url.clone(),
                        source,
                    })
            })
            .collect()
    }

    /// Fetch every category of one level, keyed by its id.
    pub async fn fetch_category_type(
        &self,
        kind: CategoryType,
    ) -> Result<HashMap<String, CategoryRecord>, GatewayError> {
        let (url, json) = self
            .get_json(
                &self.settings.category_list_url,
                &[("categoryType", kind.as_str())],
            )
            .await?;

        let Some(entries) = json
            .get("result")
            .and_then(|result| result.get(kind.as_str()))
            .and_then(Value::as_array)
        else {
            warn!("unexpected {kind} category payload from {url}: {json}");
            return Ok(HashMap::new());
        };

        let mut table = HashMap::with_capacity(entries.len());
        for entry in entries {
            let record = CategoryEntry::deserialize(entry)
                .map(CategoryRecord::from)
                .map_err(|source| GatewayError::Parse {
                    url: url.clone(),
                    source,
                })?;
            table.insert(record.id.clone(), record);
        }
        Ok(table)
    }

    /// Send a GET to `base` and decode the body as JSON. The returned url has
    /// the application id masked so it can be logged.
    async fn get_json(
        &self,
        base: &str,
        params: &[(&str, &str)],
    ) -> Result<(String, Value), GatewayError> {
        let request = self
            .http
            .get(base)
            .query(&[("applicationId", self.settings.application_id.as_str())])
            .query(params)
            .query(&[("format", "json")])
            .build()?;
        let url = redact(request.url());
        debug!("rakuten api request: {url}");

        let response = self.http.execute(request).await?;
        let status = response.status();
        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    warn!("fail to read error body of {url}: {e}");
                    String::new()
                }
            };
            return Err(GatewayError::Status {
                url,
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let json = serde_json::from_str(&body).map_err(|source| GatewayError::Parse {
            url: url.clone(),
            source,
        })?;
        Ok((url, json))
    }
}

fn redact(url: &Url) -> String {
    let mut masked = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == "applicationId" {
                "***".to_string()
            } else {
                v.into_owned()
            };
            (k.into_owned(), v)
        })
        .collect();
    masked.query_pairs_mut().clear().extend_pairs(pairs);
    masked.to_string()
}
