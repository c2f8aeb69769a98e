// SPDX-License-Identifier: MPL-2.0

//! User-facing Spanish strings and the mapping from backend errors onto them.

use crate::backend::{AuthErrorCode, BackendError, StorageErrorCode};

pub const UNKNOWN_USER: &str = "Usuario no encontrado";
pub const UNAVAILABLE_POST: &str = "Esta publicación ya no está disponible";

pub const LOGIN_FAILED: &str = "Error al iniciar sesión";
pub const SIGNUP_FAILED: &str = "Error al crear la cuenta";
pub const AUTH_UNAVAILABLE: &str = "Error de autenticación";
pub const GENERIC_ERROR: &str = "Ocurrió un error inesperado. Por favor, inténtalo de nuevo.";
pub const PERMISSION_TITLE: &str = "Acción no permitida";
pub const PERMISSION_DESCRIPTION: &str = "No tienes permisos para realizar esta acción.";
pub const RESET_SENT_TITLE: &str = "Enlace enviado";
pub const NOT_AUTHOR: &str = "Solo el autor puede realizar esta acción.";
pub const REPOST_OF_REPOST: &str = "No puedes compartir una publicación compartida.";
pub const PUBLISHERS_ONLY: &str = "Solo las autoridades pueden publicar anuncios.";
pub const SELF_FOLLOW: &str = "No puedes seguirte a ti mismo.";

pub fn reset_sent(email: &str) -> String {
    format!(
        "Se ha enviado un enlace para restablecer tu contraseña a {}.",
        email
    )
}

pub fn auth_error(code: &AuthErrorCode) -> &'static str {
    match code {
        AuthErrorCode::UserNotFound
        | AuthErrorCode::WrongPassword
        | AuthErrorCode::InvalidCredential => {
            "El correo electrónico o la contraseña son incorrectos."
        }
        AuthErrorCode::EmailAlreadyInUse => "Este correo ya está registrado.",
        AuthErrorCode::WeakPassword => "La contraseña es demasiado débil.",
        AuthErrorCode::InvalidEmail => "El correo electrónico no es válido.",
        AuthErrorCode::TooManyRequests => {
            "Demasiados intentos. Espera un momento e inténtalo de nuevo."
        }
        AuthErrorCode::UserDisabled => "Esta cuenta ha sido deshabilitada.",
        AuthErrorCode::NetworkRequestFailed => {
            "No se pudo conectar. Revisa tu conexión a internet."
        }
        AuthErrorCode::Other(_) => GENERIC_ERROR,
    }
}

pub fn storage_error(code: &StorageErrorCode) -> &'static str {
    match code {
        StorageErrorCode::Unauthorized | StorageErrorCode::Unauthenticated => {
            "No tienes permiso para subir esta imagen."
        }
        StorageErrorCode::QuotaExceeded => "La imagen es demasiado grande.",
        StorageErrorCode::InvalidFormat => "Solo se permiten imágenes PNG o JPEG.",
        StorageErrorCode::ObjectNotFound => "La imagen ya no existe.",
        StorageErrorCode::Unknown => "No se pudo subir la imagen.",
    }
}

/// Description shown for any backend failure.
pub fn backend_error(error: &BackendError) -> &'static str {
    match error {
        BackendError::Auth(code) => auth_error(code),
        BackendError::Storage { code, .. } => storage_error(code),
        BackendError::PermissionDenied(_) => PERMISSION_DESCRIPTION,
        BackendError::NotAuthenticated => "Tu sesión ha expirado. Vuelve a iniciar sesión.",
        BackendError::NotFound(_) => "El contenido ya no está disponible.",
        BackendError::Network(_) => "No se pudo conectar. Revisa tu conexión a internet.",
        BackendError::InvalidResponse(_) | BackendError::Database(_) => GENERIC_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_failures_share_one_message() {
        let expected = "El correo electrónico o la contraseña son incorrectos.";
        for code in [
            AuthErrorCode::UserNotFound,
            AuthErrorCode::WrongPassword,
            AuthErrorCode::InvalidCredential,
        ] {
            assert_eq!(auth_error(&code), expected);
        }
        assert_ne!(auth_error(&AuthErrorCode::EmailAlreadyInUse), expected);
    }

    #[test]
    fn reset_message_names_the_email() {
        assert_eq!(
            reset_sent("ana@unsch.edu.pe"),
            "Se ha enviado un enlace para restablecer tu contraseña a ana@unsch.edu.pe."
        );
    }
}
