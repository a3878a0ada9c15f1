//! Static page generation from the counter state.

use std::path::Path;

use chrono::NaiveDate;
use minijinja::{Environment, context};
use serde::Serialize;
use tracing::debug;

use crate::core::types::{ClaimRecord, CounterState};
use crate::error::RenderError;
use crate::io::atomic::write_atomic;

const PAGE_TEMPLATE_NAME: &str = "index.html";
const PAGE_TEMPLATE: &str = include_str!("templates/index.html");

#[derive(Debug, Clone, Serialize)]
struct TermContext {
    key: &'static str,
    label: &'static str,
    total: u64,
}

#[derive(Debug, Clone, Serialize)]
struct LieContext<'a> {
    claim: &'a str,
    source: &'a str,
    verdict: &'a str,
    review_date: String,
}

impl<'a> LieContext<'a> {
    fn from_record(record: &'a ClaimRecord) -> Self {
        Self {
            claim: &record.claim,
            source: &record.source,
            verdict: &record.verdict,
            review_date: record.review_date.format("%B %-d, %Y").to_string(),
        }
    }
}

/// Template engine wrapper around minijinja.
///
/// The `.html` template name turns on HTML autoescaping.
pub struct PageRenderer {
    env: Environment<'static>,
}

impl PageRenderer {
    pub fn new() -> Result<Self, RenderError> {
        let mut env = Environment::new();
        env.add_template(PAGE_TEMPLATE_NAME, PAGE_TEMPLATE)?;
        Ok(Self { env })
    }

    pub fn render(
        &self,
        state: &CounterState,
        generated_on: NaiveDate,
    ) -> Result<String, RenderError> {
        let terms: Vec<TermContext> = state
            .terms()
            .into_iter()
            .map(|(term, total)| TermContext {
                key: term.key(),
                label: term.label(),
                total,
            })
            .collect();
        let recent_lies: Vec<LieContext<'_>> =
            state.recent_lies.iter().map(LieContext::from_record).collect();

        let template = self.env.get_template(PAGE_TEMPLATE_NAME)?;
        let rendered = template.render(context! {
            days_since_lie => state.days_since_lie,
            terms => terms,
            total => state.total(),
            recent_lies => recent_lies,
            generated_on => generated_on.format("%B %-d, %Y").to_string(),
        })?;
        Ok(rendered)
    }
}

/// Render the page and write it atomically to `path`.
pub fn write_page(
    path: &Path,
    state: &CounterState,
    generated_on: NaiveDate,
) -> Result<(), RenderError> {
    let html = PageRenderer::new()?.render(state, generated_on)?;
    debug!(path = %path.display(), bytes = html.len(), "writing page");
    write_atomic(path, &html).map_err(|err| RenderError::Io {
        path: err.path,
        source: err.source,
    })
}
