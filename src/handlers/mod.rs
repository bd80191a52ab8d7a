// Gateway module - controls public API for handlers
// Modules are private, only exported symbols are public

mod api;
mod health;
mod login;
mod logout;
mod metrics;
mod pantry;
mod register;
mod root;
mod shared_types;

// Core handlers
pub use health::health_check;
pub use metrics::metrics_handler;
pub use root::{not_found, root_handler};

// Auth flow handlers
pub use login::{login, login_page, DEFAULT_LANDING_PAGE};
pub use logout::logout;
pub use register::register;

// Pantry item handlers
pub use pantry::{add_item, list_items};

// JSON API handlers
pub use api::{lookup_tables, reload_lookup_tables, suggestions, username_exists};
