//! # Collections
//!
//! Decides which discovered files are collections, derives their names and
//! models the subset of the Postman v2.1 collection format the HTTP engine
//! needs to replay requests.

use std::path::{Component, Path, PathBuf};

use serde::Deserialize;

use crate::environment::variable_value;
use crate::error::Result;
use crate::walker::{self, CollectionFile};

/// Directory name of installed package trees that must never be run.
const DEPENDENCY_CACHE_DIR: &str = "node_modules";
const PACKAGE_MANIFESTS: [&str; 2] = ["package.json", "package-lock.json"];

/// Eligible collections in walk order, as two parallel lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Discovered {
    pub paths: Vec<PathBuf>,
    pub file_names: Vec<String>,
}

impl Discovered {
    pub fn len(&self) -> usize {
        self.file_names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.file_names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Path, &str)> {
        self.paths
            .iter()
            .map(PathBuf::as_path)
            .zip(self.file_names.iter().map(String::as_str))
    }
}

/// Whether a discovered file should be run as a collection.
pub fn is_eligible(file: &CollectionFile, env_file_name: &str) -> bool {
    file.file_name != env_file_name
        && file.file_name.ends_with(".json")
        && !in_dependency_cache(&file.path)
        && !PACKAGE_MANIFESTS.contains(&file.file_name.as_str())
}

fn in_dependency_cache(path: &Path) -> bool {
    path.components()
        .any(|component| matches!(component, Component::Normal(name) if name == DEPENDENCY_CACHE_DIR))
}

/// Walk `root` and keep the eligible collection files.
pub fn discover(root: &Path, env_file_name: &str) -> Result<Discovered> {
    let mut discovered = Discovered::default();

    for file in walker::walk(root)? {
        let file = file?;
        if is_eligible(&file, env_file_name) {
            discovered.paths.push(file.path);
            discovered.file_names.push(file.file_name);
        }
    }

    Ok(discovered)
}

/// Collection name for a file name: everything before the first `.`.
pub fn collection_name(file_name: &str) -> &str {
    file_name.split('.').next().unwrap_or(file_name)
}

/// A Postman v2.1 collection.
#[derive(Debug, Clone, Deserialize)]
pub struct Collection {
    pub info: CollectionInfo,
    #[serde(default)]
    pub item: Vec<CollectionItem>,
    #[serde(default)]
    pub variable: Vec<CollectionVariable>,
    #[serde(default)]
    pub event: Vec<Event>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CollectionInfo {
    #[serde(default)]
    pub name: String,
}

/// A collection item is either a nested folder or a saved request.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CollectionItem {
    Folder(Folder),
    Request(SavedRequest),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Folder {
    #[serde(default)]
    pub name: String,
    pub item: Vec<CollectionItem>,
    #[serde(default)]
    pub event: Vec<Event>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SavedRequest {
    #[serde(default)]
    pub name: String,
    pub request: RequestSpec,
    #[serde(default)]
    pub event: Vec<Event>,
}

/// Postman allows a bare URL string in place of a request object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RequestSpec {
    Url(String),
    Detailed(RequestDefinition),
}

#[derive(Debug, Clone, Deserialize)]
pub struct RequestDefinition {
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default)]
    pub header: Vec<Header>,
    #[serde(default)]
    pub body: Option<Body>,
    #[serde(default)]
    pub url: Option<Url>,
}

fn default_method() -> String {
    "GET".to_string()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Url {
    Raw(String),
    Detailed {
        #[serde(default)]
        raw: String,
    },
}

impl Url {
    pub fn raw(&self) -> &str {
        match self {
            Url::Raw(raw) | Url::Detailed { raw } => raw.as_str(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Header {
    pub key: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub disabled: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Body {
    #[serde(default)]
    pub mode: String,
    #[serde(default)]
    pub raw: Option<String>,
    #[serde(default)]
    pub urlencoded: Vec<Header>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CollectionVariable {
    pub key: String,
    #[serde(default)]
    pub value: serde_json::Value,
    #[serde(default)]
    pub disabled: bool,
}

impl CollectionVariable {
    pub fn value_string(&self) -> String {
        variable_value(&self.value)
    }
}

/// Script hook attached to a collection, folder or request.
#[derive(Debug, Clone, Deserialize)]
pub struct Event {
    pub listen: String,
}

impl Event {
    pub fn is_test(&self) -> bool {
        self.listen == "test"
    }
}

/// A request flattened out of the folder tree, with the folder path it came from.
#[derive(Debug, Clone)]
pub struct FlatRequest<'a> {
    pub path: Vec<&'a str>,
    pub request: &'a SavedRequest,
}

impl FlatRequest<'_> {
    pub fn display_name(&self) -> String {
        let mut parts = self.path.clone();
        parts.push(&self.request.name);
        parts.join(" / ")
    }
}

impl Collection {
    pub fn from_value(value: &serde_json::Value) -> serde_json::Result<Self> {
        Self::deserialize(value)
    }

    /// All requests in depth-first order.
    pub fn requests(&self) -> Vec<FlatRequest<'_>> {
        let mut out = Vec::new();
        flatten(&self.item, &mut Vec::new(), &mut out);
        out
    }

    /// Number of test scripts attached anywhere in the tree.
    pub fn test_script_count(&self) -> usize {
        fn count(items: &[CollectionItem]) -> usize {
            items
                .iter()
                .map(|item| match item {
                    CollectionItem::Folder(folder) => {
                        folder.event.iter().filter(|e| e.is_test()).count() + count(&folder.item)
                    }
                    CollectionItem::Request(request) => {
                        request.event.iter().filter(|e| e.is_test()).count()
                    }
                })
                .sum()
        }

        self.event.iter().filter(|e| e.is_test()).count() + count(&self.item)
    }
}

fn flatten<'a>(
    items: &'a [CollectionItem],
    path: &mut Vec<&'a str>,
    out: &mut Vec<FlatRequest<'a>>,
) {
    for item in items {
        match item {
            CollectionItem::Folder(folder) => {
                path.push(&folder.name);
                flatten(&folder.item, path, out);
                path.pop();
            }
            CollectionItem::Request(request) => out.push(FlatRequest {
                path: path.clone(),
                request,
            }),
        }
    }
}
