#![allow(missing_docs)]

pub(crate) mod html;

pub(crate) use html::{
    TRANSACTION_ROW, assert_valid_html, count_matches, parse_html_document, parse_html_fragment,
    stat_value, transaction_row_texts,
};
