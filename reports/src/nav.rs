//! Admin navigation: the top-level reports menu and one entry per report.
//!
//! Host shells install a [`NavBuilder`] so the shared [`ReportsNavbar`] can
//! emit links for the host's own router without knowing its route type.

use dioxus::prelude::*;
use once_cell::sync::OnceCell;
use serde::Serialize;
use tracing::debug;

use crate::core::ReportSettings;
use crate::page::ReportDefinition;

pub const REPORTS_MENU_SLUG: &str = "badgeos_reports";
pub const REPORTS_MENU_TITLE: &str = "BadgeOS Reports";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavEntry {
    pub title: String,
    pub slug: String,
    /// Host capability required to open the page.
    pub capability: &'static str,
    /// `None` keeps the page out of the menu.
    pub parent: Option<String>,
}

impl NavEntry {
    pub fn in_menu(&self) -> bool {
        self.parent.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavRegistry {
    top_level: NavEntry,
    entries: Vec<NavEntry>,
}

impl NavRegistry {
    pub fn new(settings: &ReportSettings) -> Self {
        Self {
            top_level: NavEntry {
                title: REPORTS_MENU_TITLE.to_string(),
                slug: REPORTS_MENU_SLUG.to_string(),
                capability: settings.reports_role().capability(),
                parent: None,
            },
            entries: Vec::new(),
        }
    }

    pub fn register(&mut self, definition: &ReportDefinition) {
        let entry = NavEntry {
            title: definition.title.clone(),
            slug: definition.slug.clone(),
            capability: self.top_level.capability,
            parent: definition
                .show_in_menu
                .then(|| REPORTS_MENU_SLUG.to_string()),
        };
        debug!(slug = %entry.slug, in_menu = entry.in_menu(), "registered report page");

        match self.entries.iter_mut().find(|existing| existing.slug == entry.slug) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    pub fn top_level(&self) -> &NavEntry {
        &self.top_level
    }

    /// Every registered page, menu-visible or not.
    pub fn entries(&self) -> &[NavEntry] {
        &self.entries
    }

    /// Entries shown under the top-level menu.
    pub fn submenu(&self) -> impl Iterator<Item = &NavEntry> {
        self.entries.iter().filter(|entry| entry.in_menu())
    }

    pub fn find(&self, slug: &str) -> Option<&NavEntry> {
        self.entries.iter().find(|entry| entry.slug == slug)
    }
}

/// Link factories supplied by the host shell. Each receives the label to show
/// and returns a fully built link element.
pub struct NavBuilder {
    pub index: fn(label: &str) -> Element,
    pub report: fn(slug: &str, label: &str) -> Element,
}

static NAV_BUILDER: OnceCell<NavBuilder> = OnceCell::new();
static NAV_REGISTRY: OnceCell<NavRegistry> = OnceCell::new();

/// Install the host's link factories and the menu. The first install wins.
pub fn register_nav(builder: NavBuilder, registry: NavRegistry) {
    let _ = NAV_BUILDER.set(builder);
    let _ = NAV_REGISTRY.set(registry);
}

#[component]
pub fn ReportsNavbar() -> Element {
    let (Some(builder), Some(registry)) = (NAV_BUILDER.get(), NAV_REGISTRY.get()) else {
        return rsx! {};
    };

    rsx! {
        header { id: "navbar", class: "navbar",
            div { class: "navbar__inner",
                div { class: "navbar__brand",
                    {(builder.index)(&registry.top_level().title)}
                }
                nav { class: "navbar__links",
                    for entry in registry.submenu() {
                        {(builder.report)(&entry.slug, &entry.title)}
                    }
                }
            }
        }
    }
}
