//! Page Assembler
//!
//! Loads every section in parallel and injects them only when all arrived.

use futures::future::try_join_all;
use page_kit::Dom;

use crate::config::{Section, SiteConfig};
use crate::error::{SiteError, SiteResult};
use crate::loader::{load_fragment, Fragment, FragmentSource};

/// Sections injected by a successful assembly, in order
#[derive(Debug, Clone, PartialEq)]
pub struct Assembly {
    pub injected: Vec<Section>,
}

/// Fetch all sections concurrently. Fails if any single fetch fails.
pub async fn load_all<S: FragmentSource + ?Sized>(source: &S, config: &SiteConfig) -> SiteResult<Vec<Fragment>> {
    try_join_all(Section::ALL.iter().map(|&section| load_fragment(source, section, config))).await
}

/// Load every fragment, then inject each into its mount point.
///
/// Nothing is injected unless every fetch succeeded and every mount point
/// exists.
pub async fn assemble<D, S>(dom: &D, source: &S, config: &SiteConfig) -> SiteResult<Assembly>
where
    D: Dom + ?Sized,
    S: FragmentSource + ?Sized,
{
    let fragments = load_all(source, config).await?;

    let mounts = fragments
        .iter()
        .map(|fragment| {
            let id = fragment.section.mount_id();
            dom.get_element_by_id(id)
                .map(|mount| (mount, fragment))
                .ok_or_else(|| SiteError::MissingMount(id.to_string()))
        })
        .collect::<SiteResult<Vec<_>>>()?;

    for (mount, fragment) in &mounts {
        dom.set_inner_html(mount, &fragment.markup);
    }

    tracing::info!("All components loaded successfully!");
    Ok(Assembly {
        injected: fragments.iter().map(|f| f.section).collect(),
    })
}
