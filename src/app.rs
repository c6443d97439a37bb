//! Page Boot
//!
//! Assemble the page, then wire interactions. Wiring never runs on a
//! partially assembled page.

use std::rc::Rc;

use page_kit::{measure, BrowserDom, BrowserScheduler, Dom};
use wasm_bindgen_futures::spawn_local;

use crate::assembler::{assemble, Assembly};
use crate::config::SiteConfig;
use crate::error::SiteResult;
use crate::loader::{FragmentSource, HttpFragmentSource};
use crate::wiring;

/// Assemble the page and run `wire` only if every section landed
pub async fn boot<D, S, W>(dom: &D, source: &S, config: &SiteConfig, wire: W) -> SiteResult<Assembly>
where
    D: Dom + ?Sized,
    S: FragmentSource + ?Sized,
    W: FnOnce(),
{
    match assemble(dom, source, config).await {
        Ok(assembly) => {
            tracing::debug!("Injected {} sections, wiring interactions", assembly.injected.len());
            wire();
            Ok(assembly)
        }
        Err(e) => {
            tracing::error!("Error loading components: {}", e);
            Err(e)
        }
    }
}

/// Browser entry: read config, then boot in the background
pub fn start() {
    let Some(dom) = BrowserDom::new() else {
        tracing::error!("No document available, page not assembled");
        return;
    };
    let dom = Rc::new(dom);
    let config = SiteConfig::from_page(&*dom);
    wiring::install_diagnostics(&dom);

    spawn_local(async move {
        let source = HttpFragmentSource::new(config.fetch_timeout_ms);
        let page = dom.clone();
        let _ = boot(&*dom, &source, &config, || {
            measure(&BrowserScheduler, "Interaction wiring", || wiring::wire(page, &config));
        })
        .await;
    });
}
