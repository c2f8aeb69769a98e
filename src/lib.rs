// SPDX-License-Identifier: MPL-2.0

//! Client core for UNSCH Connect, the social network of the Universidad
//! Nacional de San Cristóbal de Huamanga.
//!
//! Everything a front end needs sits behind [`ConnectApp`]: authentication,
//! the community feed, announcements, the academic schedule and profiles.
//! The backend is pluggable; Firebase over REST and an embedded SQLite
//! store are provided.

pub mod app;
pub mod backend;
pub mod calendar;
pub mod config;
pub mod diagnostics;
pub mod live;
pub mod logging;
pub mod messages;
pub mod model;
pub mod notify;
pub mod optimistic;
pub mod runtime;
pub mod search;
pub mod services;
pub mod state;
pub mod timefmt;
pub mod validation;

pub use app::ConnectApp;
pub use backend::{Backend, BackendError};
pub use services::ActionError;
