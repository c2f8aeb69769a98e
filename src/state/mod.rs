// SPDX-License-Identifier: MPL-2.0

mod session;
pub mod settings;
mod user_session;

pub use session::{SessionError, SessionManager};
pub use settings::{AppSettings, BackendSettings, SettingsError};
pub use user_session::{PostBuffer, UserSession};
