//! Report pages: producer registration and the page render pass.

use std::fmt;
use std::sync::Arc;

use tracing::{info, warn};

use crate::core::{Hooks, ReportSettings};
use crate::error::{ReportError, Result};
use crate::nav::{NavRegistry, REPORTS_MENU_TITLE};
use crate::render::widgets;
use crate::report::Report;
use crate::request::RequestContext;

/// Sort priority used when a section does not ask for one.
pub const DEFAULT_PRIORITY: i32 = 10;

type Populate =
    Arc<dyn Fn(&mut Report, &RequestContext, &mut PageBuilder) -> Result<()> + Send + Sync>;

/// A producer's report: identity plus the callback that fills it in. The
/// callback runs once per page view, only when the page is rendered.
#[derive(Clone)]
pub struct ReportDefinition {
    pub title: String,
    pub slug: String,
    pub show_in_menu: bool,
    populate: Populate,
}

impl ReportDefinition {
    pub fn new(
        title: impl Into<String>,
        slug: impl Into<String>,
        populate: impl Fn(&mut Report, &RequestContext, &mut PageBuilder) -> Result<()>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Self {
            title: title.into(),
            slug: slug.into(),
            show_in_menu: true,
            populate: Arc::new(populate),
        }
    }

    /// Keep the page out of the menu; it stays reachable by link.
    pub fn hidden(mut self) -> Self {
        self.show_in_menu = false;
        self
    }
}

impl fmt::Debug for ReportDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReportDefinition")
            .field("title", &self.title)
            .field("slug", &self.slug)
            .field("show_in_menu", &self.show_in_menu)
            .finish_non_exhaustive()
    }
}

/// Collects page sections. Output is ordered by ascending priority, ties in
/// insertion order.
#[derive(Debug, Default)]
pub struct PageBuilder {
    sections: Vec<(i32, String)>,
}

impl PageBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, markup: impl Into<String>, priority: i32) -> &mut Self {
        self.sections.push((priority, markup.into()));
        self
    }

    /// [`PageBuilder::add`] at [`DEFAULT_PRIORITY`].
    pub fn push(&mut self, markup: impl Into<String>) -> &mut Self {
        self.add(markup, DEFAULT_PRIORITY)
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn into_markup(mut self) -> String {
        self.sections.sort_by_key(|(priority, _)| *priority);
        self.sections
            .into_iter()
            .map(|(_, markup)| markup)
            .collect()
    }
}

/// Every registered report, in registration order.
#[derive(Debug, Default, Clone)]
pub struct ReportCatalog {
    definitions: Vec<ReportDefinition>,
}

impl ReportCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a report; a second definition with the same slug replaces the
    /// first in place.
    pub fn register(&mut self, definition: ReportDefinition) -> &mut Self {
        match self
            .definitions
            .iter_mut()
            .find(|existing| existing.slug == definition.slug)
        {
            Some(existing) => *existing = definition,
            None => self.definitions.push(definition),
        }
        self
    }

    pub fn get(&self, slug: &str) -> Result<&ReportDefinition> {
        self.definitions
            .iter()
            .find(|definition| definition.slug == slug)
            .ok_or_else(|| ReportError::UnknownReport(slug.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReportDefinition> {
        self.definitions.iter()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Navigation entries for every report, gated by the reports role.
    pub fn nav_registry(&self, settings: &ReportSettings) -> NavRegistry {
        let mut nav = NavRegistry::new(settings);
        for definition in &self.definitions {
            nav.register(definition);
        }
        nav
    }
}

/// Build a report for this request, populate it, and render the whole page:
/// header, filter form, then the producer's sections.
pub fn render_report_page(
    definition: &ReportDefinition,
    request: &RequestContext,
    settings: Arc<ReportSettings>,
    hooks: Arc<Hooks>,
) -> String {
    let mut report = Report::new(
        definition.title.clone(),
        definition.slug.clone(),
        settings,
        hooks,
    );
    report.show_in_menu = definition.show_in_menu;
    report.set_dates(request.date_range());

    let mut page = PageBuilder::new();
    match (definition.populate)(&mut report, request, &mut page) {
        Ok(()) => info!(
            slug = %report.slug,
            rows = report.data.len(),
            sections = page.len(),
            "rendered report"
        ),
        Err(err) => {
            warn!(slug = %report.slug, error = %err, "report failed to populate");
            page.push(widgets::notice(&format!("This report could not be generated: {err}")));
        }
    }

    let mut output = widgets::page_header(&report.title);
    output.push_str(&report.render_filters());
    output.push_str(&page.into_markup());
    output
}

/// Look up `slug` and render its page.
pub fn render_page_by_slug(
    catalog: &ReportCatalog,
    slug: &str,
    request: &RequestContext,
    settings: Arc<ReportSettings>,
    hooks: Arc<Hooks>,
) -> Result<String> {
    let definition = catalog.get(slug)?;
    Ok(render_report_page(definition, request, settings, hooks))
}

/// The reports landing page: one link per menu-visible report.
pub fn render_reports_index(nav: &NavRegistry, settings: &ReportSettings) -> String {
    let links = settings.admin_links();
    let entries: Vec<(String, String)> = nav
        .submenu()
        .map(|entry| (entry.title.clone(), links.report(&entry.slug)))
        .collect();
    widgets::reports_index(REPORTS_MENU_TITLE, &entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn settings() -> Arc<ReportSettings> {
        Arc::new(ReportSettings::default())
    }

    #[test]
    fn sections_sort_by_priority_then_insertion() {
        let mut page = PageBuilder::new();
        page.push("b").add("a", 5).push("c").add("z", 20);
        assert_eq!(page.into_markup(), "abcz");
    }

    #[test]
    fn populate_runs_exactly_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let definition = ReportDefinition::new("Counting", "counting", move |report, _, page| {
            counter.fetch_add(1, Ordering::SeqCst);
            report.title = "Counted".into();
            page.push("<p>body</p>");
            Ok(())
        });

        let html = render_report_page(
            &definition,
            &RequestContext::default(),
            settings(),
            Arc::new(Hooks::new()),
        );
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(html.contains("<h2>Counted</h2>"));
        assert!(html.contains("Update Results"));
        assert!(html.ends_with("<p>body</p>"));
    }

    #[test]
    fn populate_failure_stays_on_the_page() {
        let definition = ReportDefinition::new("Broken", "broken", |_, _, _| {
            Err(ReportError::Store("database unavailable".into()))
        });
        let html = render_report_page(
            &definition,
            &RequestContext::default(),
            settings(),
            Arc::new(Hooks::new()),
        );
        assert!(html.contains("notice-error"));
        assert!(html.contains("database unavailable"));
    }

    #[test]
    fn catalog_replaces_duplicates_and_reports_unknown_slugs() {
        let mut catalog = ReportCatalog::new();
        catalog
            .register(ReportDefinition::new("One", "same", |_, _, _| Ok(())))
            .register(ReportDefinition::new("Two", "same", |_, _, _| Ok(())).hidden());

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("same").unwrap().title, "Two");
        assert!(matches!(
            catalog.get("missing"),
            Err(ReportError::UnknownReport(slug)) if slug == "missing"
        ));
    }

    #[test]
    fn index_lists_only_menu_reports() {
        let mut catalog = ReportCatalog::new();
        catalog
            .register(ReportDefinition::new("Badges", "badges", |_, _, _| Ok(())))
            .register(ReportDefinition::new("Earnings Report", "earnings-report", |_, _, _| Ok(())).hidden());

        let settings = settings();
        let html = render_reports_index(&catalog.nav_registry(&settings), &settings);
        assert!(html.contains("admin.php?page=badges"));
        assert!(!html.contains("earnings-report"));
    }
}
