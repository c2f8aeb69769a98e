// SPDX-License-Identifier: MPL-2.0

pub const APP_ID: &str = "pe.edu.unsch.Connect";
pub const APP_NAME: &str = "UNSCH Connect";

#[cfg(feature = "devel")]
pub const IS_DEVEL: bool = true;
#[cfg(not(feature = "devel"))]
pub const IS_DEVEL: bool = false;

/// Only institutional accounts may sign up.
pub const INSTITUTIONAL_EMAIL_DOMAIN: &str = "@unsch.edu.pe";

pub const MIN_PASSWORD_LEN: usize = 8;
pub const STUDENT_CODE_LEN: usize = 8;

pub mod collections {
    pub const USER_PROFILES: &str = "userProfiles";
    pub const POSTS: &str = "posts";
    pub const COMMENTS: &str = "comments";
    pub const ANNOUNCEMENTS: &str = "announcements";
    pub const ACADEMIC_SCHEDULES: &str = "academicSchedules";
}

pub mod storage {
    pub const AVATARS: &str = "avatars";
    pub const COVERS: &str = "covers";
    pub const POST_IMAGES: &str = "posts";
}

pub const IDENTITY_TOOLKIT_URL: &str = "https://identitytoolkit.googleapis.com/v1";
pub const SECURE_TOKEN_URL: &str = "https://securetoken.googleapis.com/v1/token";
pub const FIRESTORE_URL: &str = "https://firestore.googleapis.com/v1";
pub const STORAGE_URL: &str = "https://firebasestorage.googleapis.com/v0";

/// How often polled live queries re-run against Firestore.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 3_000;

/// Shown when a profile has no picture of its own.
pub const DEFAULT_AVATAR_URL: &str = "https://picsum.photos/seed/default-user-avatar/600/400";
pub const DEFAULT_COVER_URL: &str = "https://picsum.photos/seed/cover-default/600/400";

/// Ayacucho time (UTC-5, no daylight saving). Dates shown to users and
/// calendar days are computed in this zone.
pub const CAMPUS_UTC_OFFSET_SECS: i32 = -5 * 3600;
