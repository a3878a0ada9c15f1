//! Error taxonomy for a counter run.
//!
//! Each kind aborts the run. The kinds map to distinct exit codes so a
//! scheduler can tell "no lies today" apart from "the check never ran".

use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

use crate::exit_codes;

/// Persisted state could not be loaded. Nothing is written.
#[derive(Debug, Error)]
pub enum StateLoadError {
    #[error("state file {} not found (run `liecounter init` to seed it)", .path.display())]
    Missing { path: PathBuf },

    #[error("read state file {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse state file {}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("state file {} failed schema validation:\n- {}", .path.display(), .violations.join("\n- "))]
    Schema {
        path: PathBuf,
        violations: Vec<String>,
    },

    #[error("state file {} violates invariants:\n- {}", .path.display(), .violations.join("\n- "))]
    Invariants {
        path: PathBuf,
        violations: Vec<String>,
    },
}

/// The fact source could not produce an answer for this run.
///
/// Treated as "unknown": no counter is incremented or reset.
#[derive(Debug, Error)]
pub enum FactSourceError {
    #[error("no API key in ${env}")]
    MissingCredential { env: String },

    #[error("fact source request timed out")]
    Timeout(#[source] reqwest::Error),

    #[error("fact source request failed")]
    Network(#[source] reqwest::Error),

    #[error("fact source rejected credentials ({status})")]
    Auth { status: StatusCode, body: String },

    #[error("fact source quota exceeded ({status})")]
    Quota { status: StatusCode, body: String },

    #[error("fact source returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("fact source returned a malformed response")]
    Malformed(#[source] serde_json::Error),
}

/// The next state could not be persisted. The previous file is left intact.
#[derive(Debug, Error)]
pub enum StateWriteError {
    #[error("serialize counter state")]
    Serialize(#[source] serde_json::Error),

    #[error("write {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The static page could not be regenerated.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("render page template")]
    Template(#[from] minijinja::Error),

    #[error("write page {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Any failure that aborts `liecounter run`.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    StateLoad(#[from] StateLoadError),

    #[error(transparent)]
    FactSource(#[from] FactSourceError),

    #[error(transparent)]
    StateWrite(#[from] StateWriteError),

    #[error("counter state saved but page not regenerated")]
    Render(#[source] RenderError),
}

impl RunError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::StateLoad(_) => exit_codes::STATE_LOAD,
            Self::FactSource(_) => exit_codes::FACT_SOURCE,
            Self::StateWrite(_) => exit_codes::STATE_WRITE,
            Self::Render(_) => exit_codes::RENDER,
        }
    }
}
