//! Orchestration for `liecounter render`: rebuild the page from saved state.

use anyhow::Result;
use chrono::NaiveDate;
use tracing::info;

use crate::io::config::ResolvedPaths;
use crate::io::page::write_page;
use crate::io::state_store::load_state;

/// Regenerate the page from the current state without querying the fact source.
///
/// Failures carry the typed `StateLoadError` or `RenderError` for exit-code mapping.
pub fn render_page(paths: &ResolvedPaths, today: NaiveDate) -> Result<()> {
    let state = load_state(&paths.state_path)?;
    write_page(&paths.page_path, &state, today)?;
    info!(
        page = %paths.page_path.display(),
        days_since_lie = state.days_since_lie,
        "page regenerated"
    );
    Ok(())
}
