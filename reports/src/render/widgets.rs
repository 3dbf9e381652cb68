//! Small page widgets: data points, the CSV link, the filter form and page
//! chrome.

use dioxus::prelude::*;

use super::to_html;

pub const CSV_LINK_LABEL: &str = "Download Table as CSV";
pub const UPDATE_RESULTS_LABEL: &str = "Update Results";

pub fn data_point(title: &str, value: &str) -> String {
    to_html(rsx! {
        div { class: "metabox-holder",
            div { class: "postbox",
                h3 { class: "hndle", span { "{title}" } }
                div { class: "inside",
                    p { class: "stat", "{value}" }
                }
            }
        }
    })
}

/// `filename` is the export name without extension; hosts that cannot follow
/// `href` fetch the file by that name instead.
pub fn csv_link(href: &str, filename: &str) -> String {
    to_html(rsx! {
        p { class: "csv-link",
            a {
                href: "{href}",
                class: "button-primary",
                "data-csv": "{filename}",
                "{CSV_LINK_LABEL}"
            }
        }
    })
}

/// Shown in place of the download link when the export could not be written.
pub fn csv_failure(message: &str) -> String {
    to_html(rsx! {
        p { class: "csv-link csv-link--failed",
            span { class: "notice notice-error", "CSV export failed: {message}" }
        }
    })
}

pub fn notice(message: &str) -> String {
    to_html(rsx! {
        div { class: "notice notice-error",
            p { "{message}" }
        }
    })
}

pub fn date_picker(start: &str, end: &str) -> String {
    to_html(rsx! {
        p { class: "badgeos-report-dates",
            "Limit results from: "
            input {
                r#type: "text",
                id: "start_date",
                name: "start_date",
                class: "datepicker",
                value: "{start}",
            }
            " to: "
            input {
                r#type: "text",
                id: "end_date",
                name: "end_date",
                class: "datepicker",
                value: "{end}",
            }
        }
    })
}

/// `date_picker` and `extra_fields` are already-rendered markup.
pub fn filter_form(date_picker: &str, extra_fields: &str) -> String {
    to_html(rsx! {
        form { method: "POST", action: "", class: "badgeos-report-filters",
            div { class: "badgeos-report-filters__dates", dangerous_inner_html: "{date_picker}" }
            if !extra_fields.is_empty() {
                div { class: "badgeos-report-filters__extra", dangerous_inner_html: "{extra_fields}" }
            }
            p {
                input {
                    r#type: "submit",
                    value: UPDATE_RESULTS_LABEL,
                    class: "button-primary",
                }
            }
        }
    })
}

pub fn page_header(title: &str) -> String {
    to_html(rsx! {
        div { class: "wrap",
            div { id: "icon-options-general", class: "icon32" }
            h2 { "{title}" }
        }
    })
}

pub fn page_description(text: &str) -> String {
    to_html(rsx! {
        h2 { class: "badgeos-report-description", "{text}" }
    })
}

/// Reports landing page: header plus one link per `(title, href)`.
pub fn reports_index(title: &str, entries: &[(String, String)]) -> String {
    to_html(rsx! {
        div { class: "wrap",
            div { id: "icon-options-general", class: "icon32" }
            h2 { "{title}" }
        }
        if !entries.is_empty() {
            h3 { "Registered Reports" }
            ul { class: "badgeos-reports-index",
                for (label, href) in entries.iter() {
                    li { a { href: "{href}", "{label}" } }
                }
            }
        }
    })
}
