/*
 * A rust library for pushing Odoo data to a Frappe server and rendering
 * PDF reports through its REST API.
 *
 * The remote side is a stock Frappe instance; everything here goes through
 * the documented resource/method endpoints:
 * https://frappeframework.com/docs/user/en/api/rest
 */
#![warn(clippy::pedantic)]

pub mod client;
pub mod config;
pub mod error;
pub mod push;
pub mod report;

pub use client::{HttpTransport, UreqTransport};
pub use config::{ConfigProvider, EnvConfig, FrappeConnection, MemoryConfig};
pub use error::{ApiError, ApiResult};
pub use push::{push, Notification};
pub use report::{render_report, PrintDesigner, ReportAction, ReportRegistry};

#[cfg(test)]
pub(crate) mod testing;
