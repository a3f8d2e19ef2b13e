use crate::model::WaterfallPage;
use color_eyre::eyre::{Result, WrapErr};

pub fn parse_page(json: &str) -> Result<WaterfallPage> {
    let page: WaterfallPage =
        serde_json::from_str(json).wrap_err("Failed to parse waterfall page")?;
    for row in &page.rows {
        for version_id in &row.versions {
            let rolled_up = page.version(version_id).is_some_and(|v| v.rolled_up);
            if !rolled_up && !row.builds.contains_key(version_id) {
                tracing::debug!(
                    "row {} has no build for version {version_id}",
                    row.build_variant.id
                );
            }
        }
    }
    Ok(page)
}
