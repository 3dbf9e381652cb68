#![cfg_attr(all(windows, not(debug_assertions)), windows_subsystem = "windows")]

use std::sync::Arc;

use dioxus::desktop::{tao::window::WindowBuilder, Config};
use dioxus::logger::tracing::{info, warn, Level};
use dioxus::prelude::*;
use serde::Deserialize;

use reports::core::settings::{default_exports_dir, default_settings_path, default_snapshot_path};
use reports::core::{Hooks, LinkStyle, ReportSettings};
use reports::csv::CsvStore;
use reports::nav::{register_nav, NavBuilder, ReportsNavbar};
use reports::page::{render_page_by_slug, render_reports_index};
use reports::producers::{self, MemoryStore};
use reports::render::widgets;
use reports::{ReportCatalog, RequestContext, REPORTS_CSS};

#[derive(Debug, Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum Route {
    #[layout(DesktopNavbar)]
    #[route("/")]
    Index {},
    #[route("/report/:slug?:..query")]
    ReportPage { slug: String, query: String },
}

/// Everything a page render needs, shared with every view through context.
#[derive(Clone)]
struct AppState {
    catalog: Arc<ReportCatalog>,
    settings: Arc<ReportSettings>,
    hooks: Arc<Hooks>,
}

fn main() {
    if let Err(err) = dioxus::logger::init(Level::INFO) {
        eprintln!("logger unavailable: {err}");
    }

    LaunchBuilder::desktop()
        .with_cfg(
            Config::new().with_window(
                WindowBuilder::new()
                    .with_title(format!("BadgeOS Reports v{}", env!("CARGO_PKG_VERSION")))
                    .with_maximized(true),
            ),
        )
        .launch(App);
}

fn load_state() -> AppState {
    let settings_path = default_settings_path();
    let mut settings = ReportSettings::load(&settings_path).unwrap_or_else(|err| {
        warn!(path = %settings_path.display(), error = %err, "using default settings");
        ReportSettings::default()
    });
    // The webview can only follow the shell's own routes.
    settings.link_style = LinkStyle::App;

    let snapshot_path = default_snapshot_path();
    let store = MemoryStore::load(&snapshot_path).unwrap_or_else(|err| {
        warn!(error = %err, "no activity snapshot, reports will be empty");
        MemoryStore::default()
    });

    let mut catalog = ReportCatalog::new();
    if let Err(err) = producers::register_all(&mut catalog, Arc::new(store)) {
        warn!(error = %err, "failed to register bundled reports");
    }
    info!(reports = catalog.len(), "report catalog ready");

    AppState {
        catalog: Arc::new(catalog),
        settings: Arc::new(settings),
        hooks: Arc::new(Hooks::new()),
    }
}

fn nav_index(label: &str) -> Element {
    rsx!(Link { class: "navbar__link navbar__brand-link", to: Route::Index {}, "{label}" })
}

fn nav_report(slug: &str, label: &str) -> Element {
    rsx!(Link {
        class: "navbar__link",
        to: Route::ReportPage { slug: slug.to_string(), query: String::new() },
        "{label}"
    })
}

#[component]
fn App() -> Element {
    let state = use_context_provider(load_state);

    register_nav(
        NavBuilder {
            index: nav_index,
            report: nav_report,
        },
        state.catalog.nav_registry(&state.settings),
    );

    rsx! {
        document::Style { "{REPORTS_CSS}" }
        Router::<Route> { }
    }
}

/// Report pages are injected as markup, so their links never reach the
/// router. This listener hands clicks on them back to the shell.
const LINK_BRIDGE: &str = r#"
document.addEventListener("click", (event) => {
    const link = event.target.closest(".badgeos-reports a");
    if (!link) return;
    const csv = link.getAttribute("data-csv");
    const href = link.getAttribute("href") || "";
    if (csv) {
        event.preventDefault();
        dioxus.send({ kind: "csv", name: csv });
    } else if (href.startsWith("/")) {
        event.preventDefault();
        dioxus.send({ kind: "route", href: href });
    }
}, true);
"#;

#[derive(Debug, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum LinkMessage {
    Route { href: String },
    Csv { name: String },
}

fn route_for(href: &str) -> Option<Route> {
    href.parse().ok()
}

/// Serve a saved export and deliver it into the exports folder.
fn deliver_csv(settings: &ReportSettings, name: &str) -> String {
    let delivered = CsvStore::from_settings(settings)
        .serve(name)
        .and_then(|download| download.save_into(&default_exports_dir()));

    match delivered {
        Ok(path) => format!("CSV saved to {}", path.display()),
        Err(err) => {
            warn!(file = name, error = %err, "CSV download failed");
            format!("CSV download failed: {err}")
        }
    }
}

#[component]
fn DesktopNavbar() -> Element {
    let state = use_context::<AppState>();
    let nav = navigator();
    let mut status = use_signal(|| None::<String>);

    use_future(move || {
        let settings = Arc::clone(&state.settings);
        async move {
            let mut bridge = document::eval(LINK_BRIDGE);
            loop {
                match bridge.recv::<LinkMessage>().await {
                    Ok(LinkMessage::Route { href }) => match route_for(&href) {
                        Some(route) => {
                            nav.push(route);
                        }
                        None => warn!(href = %href, "link has no matching route"),
                    },
                    Ok(LinkMessage::Csv { name }) => {
                        status.set(Some(deliver_csv(&settings, &name)));
                    }
                    Err(err) => {
                        warn!(error = %err, "link bridge closed");
                        break;
                    }
                }
            }
        }
    });

    rsx! {
        ReportsNavbar { }

        if let Some(message) = status() {
            div { class: "notice notice-info", p { "{message}" } }
        }

        Outlet::<Route> {}
    }
}

#[component]
fn Index() -> Element {
    let state = use_context::<AppState>();
    let nav = state.catalog.nav_registry(&state.settings);
    let html = render_reports_index(&nav, &state.settings);

    rsx! {
        div { class: "badgeos-reports", dangerous_inner_html: "{html}" }
    }
}

#[component]
fn ReportPage(slug: String, query: String) -> Element {
    let state = use_context::<AppState>();
    let nav = navigator();
    let request = RequestContext::from_query(&query);

    let html = render_page_by_slug(
        &state.catalog,
        &slug,
        &request,
        Arc::clone(&state.settings),
        Arc::clone(&state.hooks),
    )
    .unwrap_or_else(|err| {
        warn!(slug = %slug, error = %err, "report page unavailable");
        widgets::notice(&err.to_string())
    });

    rsx! {
        div {
            class: "badgeos-reports",
            onsubmit: move |evt: FormEvent| {
                evt.prevent_default();
                let submitted = RequestContext::from_pairs(
                    evt.values()
                        .into_iter()
                        .map(|(key, value)| (key, value.as_value())),
                );
                nav.push(Route::ReportPage {
                    slug: slug.clone(),
                    query: request.merged(submitted).to_query(),
                });
            },
            dangerous_inner_html: "{html}",
        }
    }
}
