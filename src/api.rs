//! JSON request/response boundary used by front ends.
//!
//! ```json
//! {"action": "scan", "rootPath": "/Users/me/Downloads"}
//! {"action": "clean", "filesToDelete": ["/Users/me/Downloads/copy.zip"]}
//! ```

use std::path::PathBuf;

use log::{debug, error, info};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::duplicates::{DuplicateGroup, find_duplicates};
use crate::error::{Result, SweepError};
use crate::remover::remove;
use crate::scanner::scan;
use crate::signal::Cancellation;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Request {
    #[serde(rename_all = "camelCase")]
    Scan {
        #[serde(default)]
        root_path: Option<PathBuf>,
    },
    #[serde(rename_all = "camelCase")]
    Clean { files_to_delete: Vec<PathBuf> },
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Response {
    Scan {
        success: bool,
        duplicates: Vec<DuplicateGroup>,
        /// Entries and files left out because they could not be read.
        skipped: u64,
    },
    Clean {
        success: bool,
        message: String,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        failed: Vec<PathBuf>,
    },
    Failure {
        success: bool,
        error: String,
    },
}

impl Request {
    /// One-line description that doesn't list every path.
    pub fn summary(&self) -> String {
        match self {
            Self::Scan { root_path: Some(root) } => format!("scan of '{}'", root.display()),
            Self::Scan { root_path: None } => "scan of the default root".to_string(),
            Self::Clean { files_to_delete } => format!("clean of {} files", files_to_delete.len()),
        }
    }
}

impl Response {
    pub fn failure(error: impl ToString) -> Self {
        Self::Failure {
            success: false,
            error: error.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        match self {
            Self::Scan { success, .. } | Self::Clean { success, .. } | Self::Failure { success, .. } => {
                *success
            }
        }
    }
}

fn run(request: Request, config: &Config, cancel: &Cancellation) -> Result<Response> {
    match request {
        Request::Scan { root_path } => {
            let root = root_path.unwrap_or_else(|| config.scan.default_root.clone());
            let outcome = scan(&root, &config.scan_options(), cancel)?;
            let grouped = find_duplicates(outcome.files, &config.hashing, config.keep, cancel)?;
            Ok(Response::Scan {
                success: true,
                duplicates: grouped.groups,
                skipped: outcome.stats.skipped + grouped.hash_failures,
            })
        }
        Request::Clean { files_to_delete } => {
            let report = remove(&files_to_delete, &config.trash.dir)?;
            Ok(Response::Clean {
                success: true,
                message: report.summary(),
                failed: report.failures.into_iter().map(|f| f.path).collect(),
            })
        }
    }
}

/// Executes `request`; errors come back as `success: false`.
pub fn handle(request: Request, config: &Config, cancel: &Cancellation) -> Response {
    info!("Handling {}", request.summary());
    debug!("Request: {:?}", request);
    run(request, config, cancel).unwrap_or_else(|e| {
        error!("Request failed: {}", e);
        Response::failure(e)
    })
}

/// Parses `text` as a [`Request`] and executes it.
pub fn handle_json(text: &str, config: &Config, cancel: &Cancellation) -> Response {
    match serde_json::from_str::<Request>(text) {
        Ok(request) => handle(request, config, cancel),
        Err(e) => Response::failure(SweepError::InvalidRequest(e.to_string())),
    }
}
