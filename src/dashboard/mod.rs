//! Status dashboard: polls the health endpoint and renders it.

pub mod client;
pub mod poller;
pub mod render;

pub use client::HealthClient;
pub use poller::{ClientHealthState, HealthPoller, PollerHandle};
pub use render::{color_for, label_for, DashboardView, StatusColor};
