//! Event Wiring
//!
//! Attaches the page's listeners once the fragments are in place. Handlers
//! stay thin: each forwards to the matching module through `BrowserDom`.

use std::rc::Rc;

use page_kit::{add_event_listener_safe, element_by_id, BrowserDom, BrowserScheduler, Debounce, Dom, Scheduler, Throttle};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Element, ErrorEvent, Event, EventTarget, PerformanceNavigationTiming, Window};

use crate::config::SiteConfig;
use crate::contact::{handle_submit, LogSink, SubmissionSink, SubmitOutcome, FORM_ID};
use crate::menu::{Menu, MenuState};
use crate::navigation::{follow_link, is_nav_link, NavOutcome, NAV_LINK_SELECTOR};
use crate::{reveal, scroll_spy};

/// Attach every interactive behavior. Call once, after assembly.
pub fn wire(dom: Rc<BrowserDom>, config: &SiteConfig) {
    let menu = wire_menu(&dom);
    wire_nav_links(&dom, menu);
    wire_contact_form(&dom, Rc::new(LogSink));
    wire_scroll(&dom, config);

    // Observer lives as long as the page
    if let Some(observer) = reveal::observe_sections(&dom, config) {
        std::mem::forget(observer);
    }
}

/// Global error logging and load timing
pub fn install_diagnostics(dom: &BrowserDom) {
    let window: &EventTarget = dom.window();

    add_event_listener_safe(Some(window), "error", |ev: Event| match ev.dyn_ref::<ErrorEvent>() {
        Some(err) => tracing::error!("Global error: {} at {}:{}", err.message(), err.filename(), err.lineno()),
        None => tracing::error!("Global error: {}", ev.type_()),
    });

    let win = dom.window().clone();
    let log_load = move || {
        let load_ms = page_load_time(navigation_load_end(&win), BrowserScheduler.now());
        tracing::info!("Page fully loaded in {} ms", load_ms);
    };
    if dom.document().ready_state() == "complete" {
        log_load();
    } else {
        add_event_listener_safe(Some(window), "load", move |_| log_load());
    }
}

/// `loadEventEnd` of the navigation entry, if the browser reports one
fn navigation_load_end(window: &Window) -> Option<f64> {
    let timing = window
        .performance()?
        .get_entries_by_type("navigation")
        .get(0)
        .dyn_into::<PerformanceNavigationTiming>()
        .ok()?;
    Some(timing.load_event_end())
}

/// `loadEventEnd` is 0 until the load event finishes; use `now` then
fn page_load_time(load_event_end: Option<f64>, now: f64) -> f64 {
    match load_event_end {
        Some(end) if end > 0.0 => end,
        _ => now,
    }
}

fn event_element(ev: &Event) -> Option<Element> {
    ev.target().and_then(|target| target.dyn_into::<Element>().ok())
}

/// Route a document click to the menu. In-page links are handled by their
/// own listener and never count as outside clicks.
pub fn document_click<D: Dom>(dom: &D, menu: &Menu<D>, target: Option<&D::Node>) -> MenuState {
    if target.is_some_and(|node| is_nav_link(dom, node)) {
        return menu.state();
    }
    menu.handle_document_click(target)
}

fn wire_menu(dom: &Rc<BrowserDom>) -> Option<Rc<Menu<BrowserDom>>> {
    let menu = Rc::new(Menu::attach(dom.clone())?);

    let on_toggle = menu.clone();
    let toggle: &EventTarget = menu.toggle_node();
    add_event_listener_safe(Some(toggle), "click", move |_| {
        on_toggle.toggle();
    });

    // Toggle clicks bubble here too; they count as inside the menu
    let on_outside = menu.clone();
    let page = dom.clone();
    let document: &EventTarget = dom.document();
    add_event_listener_safe(Some(document), "click", move |ev| {
        document_click(&*page, &on_outside, event_element(&ev).as_ref());
    });

    Some(menu)
}

fn wire_nav_links(dom: &Rc<BrowserDom>, menu: Option<Rc<Menu<BrowserDom>>>) {
    for link in dom.query_selector_all(NAV_LINK_SELECTOR) {
        let page = dom.clone();
        let menu = menu.clone();
        let node = link.clone();
        let target: &EventTarget = &link;
        add_event_listener_safe(Some(target), "click", move |ev: Event| {
            let outcome = follow_link(&*page, menu.as_deref(), &node);
            if outcome.prevents_default() {
                ev.prevent_default();
            }
            match outcome {
                NavOutcome::Scrolled(id) => tracing::debug!("Scrolled to #{}", id),
                NavOutcome::Missing(id) => tracing::debug!("Ignored link to missing #{}", id),
                NavOutcome::External => {}
            }
        });
    }
}

fn wire_contact_form(dom: &Rc<BrowserDom>, sink: Rc<dyn SubmissionSink>) {
    let Some(form) = element_by_id(&**dom, FORM_ID) else {
        return;
    };

    let page = dom.clone();
    let node = form.clone();
    let target: &EventTarget = &form;
    add_event_listener_safe(Some(target), "submit", move |ev: Event| {
        ev.prevent_default();
        let page = page.clone();
        let node = node.clone();
        let sink = sink.clone();
        spawn_local(async move {
            match handle_submit(&*page, &node, &*sink).await {
                SubmitOutcome::Sent(submission) => tracing::debug!("Acknowledged message from {}", submission.email),
                SubmitOutcome::Rejected(errors) => tracing::debug!("{} field(s) need attention", errors.len()),
                SubmitOutcome::Failed(e) => tracing::debug!("Submission not delivered: {}", e),
            }
        });
    });
}

/// Scroll handler: a throttled update for responsiveness plus a debounced
/// one so the resting position is always applied. Applies the current
/// position once before returning.
pub fn scroll_handler<D: Dom + 'static>(dom: Rc<D>, scheduler: Rc<dyn Scheduler>, config: &SiteConfig) -> impl Fn() {
    let settings = config.clone();
    let update = move |_: ()| scroll_spy::on_scroll(&*dom, &settings);

    let throttled = Throttle::new(scheduler.clone(), config.scroll_throttle_ms, update.clone());
    let settled = Debounce::new(scheduler, config.scroll_throttle_ms, update.clone());
    update(());

    move || {
        throttled.call(());
        settled.call(());
    }
}

fn wire_scroll(dom: &Rc<BrowserDom>, config: &SiteConfig) {
    let on_scroll = scroll_handler(dom.clone(), Rc::new(BrowserScheduler), config);
    let window: &EventTarget = dom.window();
    add_event_listener_safe(Some(window), "scroll", move |_| on_scroll());
}
