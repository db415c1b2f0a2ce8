//! # confportal-html
//!
//! The content side of the configuration portal: static page chrome,
//! the typed parameter model, and the resumable form renderer that feeds
//! the streaming engine.
//!
//! This crate knows nothing about transports. It produces HTML fragments
//! through the contracts defined by `confportal-core`, so the same page
//! definition can be streamed chunk by chunk or staged through scratch
//! storage.

pub mod form;
pub mod page;
pub mod params;
pub mod provider;

pub use form::GroupRenderer;
pub use page::PortalPage;
pub use params::{apply_form, escape_html, Parameter, ParameterGroup, ParameterKind};
pub use provider::{DefaultHtmlProvider, HtmlFormatProvider};
