//! Alert system for displaying success and error messages to users.
//!
//! Alerts are rendered into the `#alert-container` element of the base page,
//! either inline with a full page or as an out-of-band htmx swap.

use axum::response::{IntoResponse, Response};
use maud::{Markup, html};

/// A message shown to the user as a dismissible toast.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// Something went wrong.
    Error {
        /// The headline.
        message: String,
        /// Extra context shown under the headline.
        details: String,
    },
}

impl Alert {
    /// Render the alert body without the container.
    pub fn into_html(self) -> Markup {
        let (message, details, role, style) = match self {
            Alert::Error { message, details } => (
                message,
                details,
                "alert",
                "text-red-800 bg-red-50 border-red-300 \
                dark:bg-gray-800 dark:text-red-400 dark:border-red-800",
            ),
        };

        html! {
            div
                role=(role)
                data-alert
                class={"flex items-start gap-3 p-4 mb-4 text-sm border rounded-lg shadow " (style)}
            {
                div class="flex-1"
                {
                    p class="font-medium" { (message) }

                    @if !details.is_empty() {
                        span class="block mt-1" { (details) }
                    }
                }

                button
                    type="button"
                    aria-label="Dismiss"
                    class="ms-auto font-bold"
                    onclick="this.closest('[data-alert]').remove()"
                {
                    "×"
                }
            }
        }
    }

    /// Render the alert wrapped in the alert container so that htmx can swap
    /// it in out-of-band from any response.
    pub fn into_oob_html(self) -> Markup {
        html! {
            div
                id="alert-container"
                hx-swap-oob="true"
                class="w-full max-w-md px-4"
                style="position: fixed; bottom: 1rem; left: 50%; transform: translateX(-50%); z-index: 9999;"
            {
                (self.into_html())
            }
        }
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        self.into_html().into_response()
    }
}

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};

    use super::Alert;

    #[test]
    fn error_alert_shows_message_and_details() {
        let alert = Alert::Error {
            message: "Could not load transactions".to_owned(),
            details: "Try again later.".to_owned(),
        };

        let html = Html::parse_fragment(&alert.into_html().into_string());

        let alert_selector = Selector::parse("[role='alert']").unwrap();
        let alert = html.select(&alert_selector).next().expect("No alert found");
        let text = alert.text().collect::<String>();
        assert!(text.contains("Could not load transactions"));
        assert!(text.contains("Try again later."));
    }

    #[test]
    fn out_of_band_alert_targets_alert_container() {
        let alert = Alert::Error {
            message: "Could not load transactions".to_owned(),
            details: String::new(),
        };

        let html = Html::parse_fragment(&alert.into_oob_html().into_string());

        let container_selector = Selector::parse("#alert-container[hx-swap-oob]").unwrap();
        assert!(html.select(&container_selector).next().is_some());
        let alert_selector = Selector::parse("[role='alert']").unwrap();
        assert_eq!(html.select(&alert_selector).count(), 1);
        let details_selector = Selector::parse("[role='alert'] span").unwrap();
        assert!(
            html.select(&details_selector).next().is_none(),
            "empty details should not be rendered"
        );
    }
}
