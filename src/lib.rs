//! Calendar proxy library.
//!
//! Serves `.ics` files from a fixed origin under stable download headers:
//! a request for `/soccer/premier_league/mancity.ics` is fetched from
//! `<origin>/soccer/premier_league/mancity.ics` and returned as a
//! `text/calendar` attachment named `mancity.ics`.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod origin;

pub use config::schema::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
