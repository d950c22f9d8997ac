//! Content bundle types shared by the resolver, the day cache and the store.
//!
//! Domain objects are kept as flat JSON maps rather than typed structs: the
//! remote pipeline may omit, empty or add fields at will, and the resolver
//! works field by field regardless of what a domain contains.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Named fields of one domain object (`artist`, `conversation_starters`, ...).
pub type Fields = Map<String, Value>;

/// One of the four content domains shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Music,
    Recipe,
    Photo,
    NostalgiaNews,
}

impl Domain {
    pub const ALL: [Domain; 4] = [
        Domain::Music,
        Domain::Recipe,
        Domain::Photo,
        Domain::NostalgiaNews,
    ];

    /// Key used for this domain in the `content` object on the wire.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Music => "music",
            Self::Recipe => "recipe",
            Self::Photo => "photo",
            Self::NostalgiaNews => "nostalgia_news",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Error)]
#[error("unknown content domain: {0}")]
pub struct UnknownDomain(pub String);

impl FromStr for Domain {
    type Err = UnknownDomain;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "music" => Ok(Self::Music),
            "recipe" => Ok(Self::Recipe),
            "photo" => Ok(Self::Photo),
            "nostalgia" | "nostalgia_news" | "nostalgia-news" => Ok(Self::NostalgiaNews),
            _ => Err(UnknownDomain(s.to_string())),
        }
    }
}

/// The four content domains of a bundle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub music: Fields,
    #[serde(default)]
    pub recipe: Fields,
    #[serde(default)]
    pub photo: Fields,
    #[serde(default)]
    pub nostalgia_news: Fields,
}

impl Content {
    pub fn get(&self, domain: Domain) -> &Fields {
        match domain {
            Domain::Music => &self.music,
            Domain::Recipe => &self.recipe,
            Domain::Photo => &self.photo,
            Domain::NostalgiaNews => &self.nostalgia_news,
        }
    }

    pub fn get_mut(&mut self, domain: Domain) -> &mut Fields {
        match domain {
            Domain::Music => &mut self.music,
            Domain::Recipe => &mut self.recipe,
            Domain::Photo => &mut self.photo,
            Domain::NostalgiaNews => &mut self.nostalgia_news,
        }
    }
}

/// Render-ready dashboard content.
///
/// Once a bundle has been through [`resolve_bundle`](crate::resolve_bundle)
/// every field named by the reference dataset is present and non-empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentBundle {
    #[serde(default)]
    pub patient_info: Fields,
    #[serde(default)]
    pub content: Content,
    #[serde(default)]
    pub metadata: Fields,
}

impl ContentBundle {
    pub fn domain(&self, domain: Domain) -> &Fields {
        self.content.get(domain)
    }

    /// Fields that `reference` names but this bundle lacks, as `section.field`.
    ///
    /// An empty result means the bundle satisfies the completeness invariant.
    pub fn missing_fields(&self, reference: &ContentBundle) -> Vec<String> {
        let mut missing = Vec::new();
        collect_missing("patient_info", &self.patient_info, &reference.patient_info, &mut missing);
        for domain in Domain::ALL {
            collect_missing(
                domain.key(),
                self.domain(domain),
                reference.domain(domain),
                &mut missing,
            );
        }
        collect_missing("metadata", &self.metadata, &reference.metadata, &mut missing);
        missing
    }
}

fn collect_missing(section: &str, fields: &Fields, reference: &Fields, out: &mut Vec<String>) {
    for name in reference.keys() {
        if !fields.get(name).is_some_and(crate::is_present) {
            out.push(format!("{section}.{name}"));
        }
    }
}

/// Why a response body was rejected before any merging took place.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    #[error("response body is not a JSON object")]
    NotAnObject,
    #[error("response is missing required key `{0}`")]
    MissingKey(&'static str),
}

/// A well-shaped response from the remote pipeline.
///
/// Only the top level is validated here. Individual domains may still be
/// absent, empty, or of the wrong kind; the resolver handles those.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveResponse {
    pub patient_info: Fields,
    pub content: Fields,
    pub metadata: Fields,
    pub pipeline_metadata: Option<Value>,
}

impl LiveResponse {
    /// Validate the top-level shape of a parsed response body.
    ///
    /// Both `patient_info` and `content` must be JSON objects.
    pub fn from_value(body: Value) -> Result<Self, ShapeError> {
        let Value::Object(mut top) = body else {
            return Err(ShapeError::NotAnObject);
        };

        let patient_info = take_object(&mut top, "patient_info")?;
        let content = take_object(&mut top, "content")?;
        let metadata = match top.remove("metadata") {
            Some(Value::Object(m)) => m,
            _ => Fields::new(),
        };
        let pipeline_metadata = top.remove("pipeline_metadata").filter(|v| !v.is_null());

        Ok(Self {
            patient_info,
            content,
            metadata,
            pipeline_metadata,
        })
    }

    /// Live fields for `domain`, if the pipeline sent an object for it.
    pub fn domain(&self, domain: Domain) -> Option<&Fields> {
        self.content.get(domain.key()).and_then(Value::as_object)
    }
}

fn take_object(top: &mut Fields, key: &'static str) -> Result<Fields, ShapeError> {
    match top.remove(key) {
        Some(Value::Object(m)) => Ok(m),
        _ => Err(ShapeError::MissingKey(key)),
    }
}
