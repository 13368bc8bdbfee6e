//! HTML rendering for the transactions page.

use maud::{Markup, html};
use time::{OffsetDateTime, UtcOffset, macros::format_description};

use crate::{
    alert::Alert,
    endpoints,
    html::{
        BADGE_STYLE, BUTTON_SECONDARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        HeadElement, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE,
        TABLE_ROW_STYLE, base_with_alert, format_currency, format_percentage, loading_spinner,
    },
    viewer::{Role, Viewer},
};

use super::{
    charts::{ECHARTS_SCRIPT, TransactionChart, charts_script, charts_view},
    filter::{DateRange, TableFilter, TypeFilter},
    models::{Transaction, TransactionStatus, TransactionType},
    stats::Stats,
};

/// The ID of the element the table partial replaces.
pub(super) const TABLE_CONTAINER_ID: &str = "transactions-table";

const TABLE_COLUMN_COUNT: usize = 8;

/// Everything needed to render the full transactions page.
pub(super) struct TransactionsPage<'a> {
    pub viewer: &'a Viewer,
    pub stats: Stats,
    pub charts: &'a [TransactionChart],
    pub rows: &'a [&'a Transaction],
    pub filter: &'a TableFilter,
    pub local_offset: UtcOffset,
    pub alert: Option<Alert>,
}

pub(super) fn transactions_page_view(page: TransactionsPage) -> Markup {
    let content = html! {
        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="w-full space-y-6"
            {
                header class="flex justify-between flex-wrap items-end gap-2"
                {
                    div
                    {
                        h1 class="text-xl font-bold" { "Transactions" }
                        p class="text-sm text-gray-600 dark:text-gray-400"
                        {
                            (scope_description(page.viewer.role))
                        }
                    }
                }

                (stat_cards_view(&page.stats))

                (charts_view(page.charts))

                (filter_form_view(page.filter))

                (transactions_table_view(page.rows, page.filter, page.local_offset))
            }
        }
    };

    let scripts = [
        HeadElement::ScriptLink(ECHARTS_SCRIPT.to_owned()),
        charts_script(page.charts),
    ];

    base_with_alert("Transactions", &scripts, &content, page.alert)
}

fn scope_description(role: Role) -> &'static str {
    match role {
        Role::Admin => "Every transaction on the marketplace.",
        Role::Seller => "Transactions for the properties you sell.",
        Role::Buyer => "Transactions for the properties you buy.",
    }
}

fn stat_cards_view(stats: &Stats) -> Markup {
    let cards = [
        (
            "total-transactions",
            "Total transactions",
            stats.total_transactions.to_string(),
        ),
        (
            "total-amount",
            "Total amount",
            format_currency(stats.total_amount),
        ),
        (
            "success-rate",
            "Success rate",
            format_percentage(stats.success_rate),
        ),
        (
            "pending-amount",
            "Pending amount",
            format_currency(stats.pending_amount),
        ),
    ];

    html! {
        section id="stats" class="grid grid-cols-1 sm:grid-cols-2 lg:grid-cols-4 gap-4"
        {
            @for (id, label, value) in cards {
                div
                    data-stat=(id)
                    class="bg-white dark:bg-gray-800 border border-gray-200
                        dark:border-gray-700 rounded-lg p-4 shadow-md"
                {
                    p class="text-sm text-gray-600 dark:text-gray-400" { (label) }
                    p data-stat-value class="mt-2 text-2xl font-bold" { (value) }
                }
            }
        }
    }
}

/// The search box and dropdowns.
///
/// Changing any control requests a new table. `hx-sync` aborts a request that
/// is still in flight when a newer one starts, so an older response can never
/// replace the table after a newer one.
fn filter_form_view(filter: &TableFilter) -> Markup {
    html! {
        form
            id="transaction-filters"
            action=(endpoints::TRANSACTIONS_VIEW)
            method="get"
            hx-get=(endpoints::TRANSACTIONS_TABLE)
            hx-trigger="input changed delay:300ms from:#search, change"
            hx-target={ "#" (TABLE_CONTAINER_ID) }
            hx-target-error="#alert-container"
            hx-swap="outerHTML"
            hx-sync="this:replace"
            hx-indicator="#indicator"
            class="grid grid-cols-1 md:grid-cols-4 gap-4 items-end"
        {
            div class="md:col-span-2"
            {
                label for="search" class=(FORM_LABEL_STYLE) { "Search" }
                input
                    id="search"
                    type="search"
                    name="search"
                    value=(filter.search)
                    placeholder="Description, property, buyer or seller"
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="type" class=(FORM_LABEL_STYLE) { "Type" }
                select id="type" name="type" class=(FORM_TEXT_INPUT_STYLE)
                {
                    option
                        value=(TypeFilter::All.as_str())
                        selected[filter.transaction_type == TypeFilter::All]
                    {
                        "All types"
                    }

                    @for transaction_type in TransactionType::ALL {
                        option
                            value=(transaction_type.as_str())
                            selected[filter.transaction_type == TypeFilter::Only(transaction_type)]
                        {
                            (transaction_type.label())
                        }
                    }
                }
            }

            div
            {
                label for="range" class=(FORM_LABEL_STYLE) { "Date range" }
                select id="range" name="range" class=(FORM_TEXT_INPUT_STYLE)
                {
                    @for range in DateRange::ALL {
                        option value=(range.as_str()) selected[filter.range == range]
                        {
                            (range.label())
                        }
                    }
                }
            }

            noscript
            {
                button type="submit" class=(BUTTON_SECONDARY_STYLE) { "Apply" }
            }
        }
    }
}

/// The table of filtered transactions, swapped out whenever the filters change.
///
/// The export link lives inside the table so that it always carries the
/// filters of the rows on screen.
pub(super) fn transactions_table_view(
    rows: &[&Transaction],
    filter: &TableFilter,
    local_offset: UtcOffset,
) -> Markup {
    let export_url = format!(
        "{}?{}",
        endpoints::TRANSACTIONS_EXPORT,
        filter.to_query_string()
    );

    html! {
        section
            id=(TABLE_CONTAINER_ID)
            class="rounded bg-gray-50 dark:bg-gray-800 overflow-x-auto"
        {
            div class="flex justify-between items-center px-6 py-3"
            {
                span data-row-count class="text-sm text-gray-600 dark:text-gray-400"
                {
                    (rows.len()) @if rows.len() == 1 { " transaction" } @else { " transactions" }

                    span id="indicator" class="htmx-indicator ms-2" { (loading_spinner()) }
                }

                a href=(export_url) download class=(LINK_STYLE) { "Export CSV" }
            }

            table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Type" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Property" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Buyer" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Seller" }
                        th scope="col" class="px-6 py-3 text-right" { "Amount" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Status" }
                    }
                }

                tbody
                {
                    @for transaction in rows {
                        (transaction_row_view(transaction, local_offset))
                    }

                    @if rows.is_empty() {
                        tr
                        {
                            td
                                colspan=(TABLE_COLUMN_COUNT)
                                data-empty-state="true"
                                class="px-6 py-4 text-center"
                            {
                                "No transactions found."
                            }
                        }
                    }
                }
            }
        }
    }
}

fn transaction_row_view(transaction: &Transaction, local_offset: UtcOffset) -> Markup {
    let created_at = transaction.created_at.to_offset(local_offset);

    html! {
        tr class=(TABLE_ROW_STYLE) data-transaction-row="true" data-transaction-id=(transaction.id)
        {
            td class=(TABLE_CELL_STYLE)
            {
                time datetime=(format_datetime_attr(created_at)) { (format_created_at(created_at)) }
            }
            td class=(TABLE_CELL_STYLE)
            {
                span class={ (BADGE_STYLE) " " (type_badge_colour(transaction.transaction_type)) }
                {
                    (transaction.transaction_type.label())
                }
            }
            td class=(TABLE_CELL_STYLE) { (transaction.description) }
            td class=(TABLE_CELL_STYLE) { (optional_cell(transaction.property_title.as_deref())) }
            td class=(TABLE_CELL_STYLE) { (optional_cell(transaction.buyer_name.as_deref())) }
            td class=(TABLE_CELL_STYLE) { (optional_cell(transaction.seller_name.as_deref())) }
            td class="px-6 py-4 text-right" data-amount { (format_currency(transaction.amount)) }
            td class=(TABLE_CELL_STYLE)
            {
                span
                    data-status=(transaction.status.as_str())
                    class={ (BADGE_STYLE) " " (status_badge_colour(transaction.status)) }
                {
                    (transaction.status.label())
                }
            }
        }
    }
}

fn optional_cell(value: Option<&str>) -> Markup {
    html! {
        @if let Some(value) = value {
            (value)
        } @else {
            span class="text-gray-400 dark:text-gray-500" { "-" }
        }
    }
}

fn type_badge_colour(transaction_type: TransactionType) -> &'static str {
    match transaction_type {
        TransactionType::Payment => "text-blue-800 bg-blue-100 dark:bg-blue-900 dark:text-blue-300",
        TransactionType::Refund => {
            "text-purple-800 bg-purple-100 dark:bg-purple-900 dark:text-purple-300"
        }
        TransactionType::Commission => {
            "text-amber-800 bg-amber-100 dark:bg-amber-900 dark:text-amber-300"
        }
        TransactionType::Withdrawal => "text-gray-800 bg-gray-100 dark:bg-gray-700 dark:text-gray-300",
    }
}

fn status_badge_colour(status: TransactionStatus) -> &'static str {
    match status {
        TransactionStatus::Completed => {
            "text-green-800 bg-green-100 dark:bg-green-900 dark:text-green-300"
        }
        TransactionStatus::Pending => {
            "text-yellow-800 bg-yellow-100 dark:bg-yellow-900 dark:text-yellow-300"
        }
        TransactionStatus::Failed => "text-red-800 bg-red-100 dark:bg-red-900 dark:text-red-300",
    }
}

fn format_created_at(created_at: OffsetDateTime) -> String {
    created_at
        .format(format_description!("[year]-[month]-[day] [hour]:[minute]"))
        .unwrap_or_else(|error| {
            tracing::error!("Could not format {created_at}: {error}");
            created_at.date().to_string()
        })
}

fn format_datetime_attr(created_at: OffsetDateTime) -> String {
    created_at
        .format(format_description!(
            "[year]-[month]-[day]T[hour]:[minute]:[second][offset_hour sign:mandatory]:[offset_minute]"
        ))
        .unwrap_or_else(|error| {
            tracing::error!("Could not format {created_at}: {error}");
            created_at.date().to_string()
        })
}
