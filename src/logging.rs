// SPDX-License-Identifier: MPL-2.0

use crate::config::{APP_NAME, IS_DEVEL};
use tracing_subscriber::{EnvFilter, fmt};

/// Install the global fmt subscriber. `RUST_LOG` wins over the default filter.
/// Calling this twice is harmless; the second call is ignored.
pub fn init() {
    let default = if IS_DEVEL {
        "unsch_connect=debug"
    } else {
        "unsch_connect=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    if fmt().with_env_filter(filter).with_target(true).try_init().is_ok() {
        tracing::info!(app = APP_NAME, devel = IS_DEVEL, "logging ready");
    }
}
