// SPDX-License-Identifier: MPL-2.0

mod common;

use common::{Harness, student_form, uid};
use unsch_connect::ActionError;
use unsch_connect::backend::{AuthErrorCode, BackendError, DocumentStore, path};
use unsch_connect::messages;
use unsch_connect::model::{Record, Role, UserProfile};
use unsch_connect::notify::ToastKind;
use unsch_connect::validation::{ForgotPasswordForm, LoginForm};

#[tokio::test]
async fn non_institutional_signup_never_reaches_the_backend() {
    let h = Harness::new();
    // Offline: anything that reached the backend would fail differently.
    h.store.set_offline(true);

    let mut form = student_form("ana", "Ana");
    form.email = "ana@gmail.com".to_string();

    let mut app = h.app();
    let err = app.signup(&form).await.err().unwrap();
    let ActionError::Validation(err) = err else {
        panic!("expected a validation error, got {err:?}");
    };
    assert_eq!(
        err.field("email"),
        Some("Debe ser un correo institucional de la UNSCH.")
    );
    assert!(app.session().is_none());
    assert!(h.toasts.all().is_empty());
}

#[tokio::test]
async fn password_mismatch_is_scoped_to_confirm_password() {
    let h = Harness::new();
    let mut form = student_form("ana", "Ana");
    form.confirm_password = "otra-clave".to_string();

    let err = h.app().signup(&form).await.err().unwrap();
    let ActionError::Validation(err) = err else {
        panic!("expected a validation error");
    };
    assert_eq!(err.field("confirmPassword"), Some("Las contraseñas no coinciden."));
    assert_eq!(err.fields.len(), 1);

    // nothing was created
    let login = LoginForm {
        email: "ana@unsch.edu.pe".into(),
        password: "secreto123".into(),
    };
    assert!(h.app().login(&login).await.is_err());
}

#[tokio::test]
async fn signup_creates_the_profile_document() {
    let h = Harness::new();
    let app = h.student("ana.quispe", "Ana").await;
    let uid = uid(&app);

    let doc = h
        .store
        .get_document(&path::user_profile(&uid))
        .await
        .unwrap()
        .unwrap();
    let profile = UserProfile::from_document(doc).unwrap();
    assert_eq!(profile.role.role(), Role::StudentTeacher);
    assert_eq!(profile.username(), "ana.quispe");
    assert!(profile.followers.is_empty());

    let session = app.session().unwrap();
    assert_eq!(session.profile_loaded().await.unwrap().first_name, "Ana");
    assert!(!session.can_publish_announcements());
}

#[tokio::test]
async fn wrong_password_shows_the_shared_credential_message() {
    let h = Harness::new();
    h.student("ana", "Ana").await;

    let mut app = h.app();
    let err = app
        .login(&LoginForm {
            email: "ana@unsch.edu.pe".into(),
            password: "incorrecta".into(),
        })
        .await
        .err()
        .unwrap();
    assert!(matches!(
        err.backend(),
        Some(BackendError::Auth(AuthErrorCode::WrongPassword))
    ));

    let toast = h.toasts.last().unwrap();
    assert_eq!(toast.kind, ToastKind::Error);
    assert_eq!(toast.title, messages::LOGIN_FAILED);
    assert_eq!(
        toast.description.as_deref(),
        Some("El correo electrónico o la contraseña son incorrectos.")
    );
}

#[tokio::test]
async fn password_reset_confirms_with_the_email() {
    let h = Harness::new();
    h.student("ana", "Ana").await;

    let app = h.app();
    app.auth
        .forgot_password(&ForgotPasswordForm {
            email: "ana@unsch.edu.pe".into(),
        })
        .await
        .unwrap();

    assert_eq!(h.store.password_resets(), vec!["ana@unsch.edu.pe"]);
    let toast = h.toasts.last().unwrap();
    assert_eq!(toast.title, "Enlace enviado");
    assert!(toast.description.unwrap().ends_with("ana@unsch.edu.pe."));
}

#[tokio::test]
async fn sign_out_tears_the_session_down() {
    let h = Harness::new();
    let mut app = h.student("ana", "Ana").await;
    assert!(app.session().is_some());

    app.sign_out().await.unwrap();
    assert!(app.session().is_none());
    assert!(app.backend().auth.current_user().await.is_none());
}
