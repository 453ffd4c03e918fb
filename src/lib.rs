// Library for tests to access modules

pub mod app;
pub mod config;
pub mod error;
pub mod headless;
pub mod layout;
pub mod lifecycle;
pub mod models;
pub mod presenter;
pub mod sampler;
pub mod store;
pub mod telemetry;
pub mod ui;
pub mod version;
pub mod widget;
