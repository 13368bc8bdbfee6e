//! The two transaction charts: amount by type and amount by month.
//!
//! Each chart is generated as JSON configuration for the ECharts library and
//! rendered with an HTML container and a script that initializes it.

use std::collections::BTreeMap;

use charming::{
    Chart,
    component::{Axis, Grid, Title},
    element::{AxisLabel, AxisPointer, AxisPointerType, AxisType, JsFunction, Tooltip, Trigger},
    series::{Line, bar::Bar},
};
use maud::{Markup, PreEscaped, html};
use time::UtcOffset;

use crate::html::{CURRENCY, HeadElement};

use super::models::{Transaction, TransactionType};

/// Where the ECharts library is served from.
pub(super) const ECHARTS_SCRIPT: &str = "/static/echarts.6.0.0.min.js";

/// A chart with its HTML container ID and ECharts configuration.
pub(super) struct TransactionChart {
    /// The HTML element ID to use for the chart (kebab-case)
    pub id: &'static str,
    /// The ECharts configuration as a JSON string
    pub options: String,
}

/// Build both charts from the role-scoped transactions.
pub(super) fn build_charts(
    transactions: &[Transaction],
    local_offset: UtcOffset,
) -> [TransactionChart; 2] {
    [
        TransactionChart {
            id: "amount-by-type-chart",
            options: amount_by_type_chart(transactions).to_string(),
        },
        TransactionChart {
            id: "monthly-amount-chart",
            options: monthly_amount_chart(transactions, local_offset).to_string(),
        },
    ]
}

/// Renders the HTML containers for the charts.
pub(super) fn charts_view(charts: &[TransactionChart]) -> Markup {
    html!(
        section
            id="charts"
            class="w-full mx-auto mb-4"
        {
            div class="grid grid-cols-1 xl:grid-cols-2 gap-4"
            {
                @for chart in charts {
                    div
                        id=(chart.id)
                        class="min-h-[380px] rounded dark:bg-gray-100"
                    {}
                }
            }
        }
    )
}

/// Generates the script that initializes each chart once the page has loaded,
/// following the browser's dark mode setting and resizing with the window.
pub(super) fn charts_script(charts: &[TransactionChart]) -> HeadElement {
    let script_content = charts
        .iter()
        .map(|chart| {
            format!(
                r#"(function() {{
                    const chartDom = document.getElementById("{}");
                    const chart = echarts.init(chartDom);
                    const option = {};
                    chart.setOption(option);

                    window.addEventListener('resize', chart.resize);

                    const darkModeMediaQuery = window.matchMedia('(prefers-color-scheme: dark)');
                    const updateTheme = () => {{
                        const isDarkMode = darkModeMediaQuery.matches;
                        chart.setTheme(isDarkMode ? 'dark' : 'default');
                    }}
                    darkModeMediaQuery.addEventListener('change', updateTheme);
                    updateTheme();
                }})();"#,
                chart.id, chart.options
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let wrapped_script = format!(
        "document.addEventListener('DOMContentLoaded', function() {{\n{}\n}});",
        script_content
    );

    HeadElement::ScriptSource(PreEscaped(wrapped_script))
}

fn amount_by_type_chart(transactions: &[Transaction]) -> Chart {
    let totals = amount_by_type(transactions);
    let labels: Vec<&str> = totals.iter().map(|(label, _)| *label).collect();
    let values: Vec<f64> = totals.iter().map(|(_, amount)| *amount).collect();

    Chart::new()
        .title(Title::new().text("Amount by type"))
        .tooltip(currency_tooltip())
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter())),
        )
        .series(Bar::new().name("Amount").data(values))
}

fn monthly_amount_chart(transactions: &[Transaction], local_offset: UtcOffset) -> Chart {
    let (labels, values): (Vec<String>, Vec<f64>) =
        amount_by_month(transactions, local_offset).into_iter().unzip();

    Chart::new()
        .title(Title::new().text("Monthly volume"))
        .tooltip(currency_tooltip())
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter())),
        )
        .series(Line::new().name("Amount").data(values))
}

/// The total amount for every transaction type, in [TransactionType::ALL]
/// order. Types with no transactions have a total of zero.
fn amount_by_type(transactions: &[Transaction]) -> Vec<(&'static str, f64)> {
    TransactionType::ALL
        .iter()
        .map(|&transaction_type| {
            let total = transactions
                .iter()
                .filter(|transaction| transaction.transaction_type == transaction_type)
                .map(|transaction| transaction.amount)
                .sum();

            (transaction_type.label(), total)
        })
        .collect()
}

/// The total amount for each month that has transactions, oldest first.
///
/// Months are taken in the local timezone, so a transaction made just after
/// midnight local time on the 1st counts towards the new month.
fn amount_by_month(transactions: &[Transaction], local_offset: UtcOffset) -> Vec<(String, f64)> {
    const MONTH_NAMES: [&str; 12] = [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ];

    let mut totals: BTreeMap<(i32, u8), f64> = BTreeMap::new();

    for transaction in transactions {
        let date = transaction.created_at.to_offset(local_offset).date();
        *totals.entry((date.year(), date.month() as u8)).or_default() += transaction.amount;
    }

    totals
        .into_iter()
        .map(|((year, month), total)| {
            let name = MONTH_NAMES[usize::from(month) - 1];
            (format!("{name} {year}"), total)
        })
        .collect()
}

#[inline]
fn currency_formatter() -> JsFunction {
    JsFunction::new_with_args(
        "number",
        &format!(
            "const currencyFormatter = new Intl.NumberFormat('en-US', {{
              style: 'currency',
              currency: '{CURRENCY}'
            }});
            return (number) ? currencyFormatter.format(number) : \"-\";"
        ),
    )
}

/// Creates a tooltip configuration for currency values
fn currency_tooltip() -> Tooltip {
    Tooltip::new()
        .trigger(Trigger::Axis)
        .value_formatter(currency_formatter())
        .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow))
}
