//! The API endpoints URIs.

/// The root route which redirects to the transactions page.
pub const ROOT: &str = "/";
/// The landing page for signed in viewers.
pub const TRANSACTIONS_VIEW: &str = "/transactions";
/// The default page where signed-out viewers are sent to sign in.
pub const LOG_IN_VIEW: &str = "/log_in";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route for the htmx partial that re-renders the transaction table.
pub const TRANSACTIONS_TABLE: &str = "/api/transactions/table";
/// The route for downloading the filtered transactions as a CSV file.
pub const TRANSACTIONS_EXPORT: &str = "/api/transactions/export";
