use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use apidoc_base::{ApidocResult, err};

use crate::render::example_url;
use crate::summary::{RouteSummary, group_routes};

pub const SCHEMA_URL: &str = "https://schema.getpostman.com/json/collection/v2.0.0/collection.json";

/// Postman collection, schema v2.0.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostmanCollection {
    pub variables: Vec<serde_json::Value>,
    pub info: CollectionInfo,
    pub item: Vec<Folder>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionInfo {
    pub name: String,
    #[serde(rename = "_postman_id")]
    pub postman_id: String,
    pub description: String,
    pub schema: String,
}

/// One resource group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Folder {
    pub name: String,
    pub description: String,
    pub item: Vec<RequestItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestItem {
    pub name: String,
    pub request: Request,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub url: String,
    pub method: String,
    pub header: Vec<Header>,
    pub body: Body,
    pub description: String,
    pub response: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub mode: String,
    pub formdata: Vec<FormField>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormField {
    pub key: String,
    pub value: String,
    #[serde(rename = "type")]
    pub field_type: String,
    pub enabled: bool,
}

impl PostmanCollection {
    /// Builds the collection: one folder per resource group, one request per route.
    pub fn build(name: &str, base_url: &str, routes: &[RouteSummary]) -> ApidocResult<Self> {
        let item: Vec<Folder> = group_routes(routes)
            .into_iter()
            .map(|(group, routes)| Folder {
                name: group.to_string(),
                description: String::new(),
                item: routes
                    .into_iter()
                    .map(|route| request_item(base_url, route))
                    .collect(),
            })
            .collect();

        Ok(Self {
            variables: Vec::new(),
            info: CollectionInfo {
                name: name.to_string(),
                postman_id: content_id(name, &item)?,
                description: String::new(),
                schema: SCHEMA_URL.to_string(),
            },
            item,
        })
    }

    pub fn to_json(&self) -> ApidocResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| err!("Failed to serialize Postman collection: {}", e))
    }
}

fn request_item(base_url: &str, route: &RouteSummary) -> RequestItem {
    let name = if route.title.is_empty() {
        route.uri.clone()
    } else {
        route.title.clone()
    };
    RequestItem {
        name,
        request: Request {
            url: example_url(base_url, &route.uri),
            method: route.primary_method().to_string(),
            header: vec![Header {
                key: "Accept".to_string(),
                value: "application/json".to_string(),
            }],
            body: Body {
                mode: "formdata".to_string(),
                formdata: route
                    .query_parameters
                    .iter()
                    .map(|param| FormField {
                        key: param.name.clone(),
                        value: String::new(),
                        field_type: "text".to_string(),
                        enabled: true,
                    })
                    .collect(),
            },
            description: route.description.clone(),
            response: Vec::new(),
        },
    }
}

/// UUID-shaped id hashed from the collection name and items, so unchanged routes give
/// an unchanged file.
fn content_id(name: &str, item: &[Folder]) -> ApidocResult<String> {
    let items = serde_json::to_vec(item)
        .map_err(|e| err!("Failed to serialize Postman collection: {}", e))?;
    let mut hasher = Sha256::new();
    hasher.update(name.as_bytes());
    hasher.update(&items);
    let hex = hex::encode(&hasher.finalize()[..16]);
    Ok(format!(
        "{}-{}-{}-{}-{}",
        &hex[0..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..32]
    ))
}
