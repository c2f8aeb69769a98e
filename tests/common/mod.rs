// SPDX-License-Identifier: MPL-2.0

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use unsch_connect::ConnectApp;
use unsch_connect::backend::Backend;
use unsch_connect::backend::local::LocalBackend;
use unsch_connect::live::LiveState;
use unsch_connect::notify::{Toast, ToastKind, ToastSink};
use unsch_connect::state::AppSettings;
use unsch_connect::validation::{SignUpForm, SignUpRole};

/// Collects every toast for later inspection.
#[derive(Clone, Default)]
pub struct Recorder(Arc<Mutex<Vec<Toast>>>);

impl ToastSink for Recorder {
    fn show(&self, toast: Toast) {
        self.0.lock().unwrap().push(toast);
    }
}

impl Recorder {
    pub fn all(&self) -> Vec<Toast> {
        self.0.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<Toast> {
        self.all()
            .into_iter()
            .filter(|t| t.kind == ToastKind::Error)
            .collect()
    }

    pub fn last(&self) -> Option<Toast> {
        self.all().pop()
    }
}

/// One shared local backend; every app built from it sees the same data.
pub struct Harness {
    pub store: LocalBackend,
    pub toasts: Recorder,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            store: LocalBackend::in_memory().unwrap(),
            toasts: Recorder::default(),
        }
    }

    pub fn app(&self) -> ConnectApp {
        let settings = AppSettings {
            persist_session: false,
            ..AppSettings::default()
        };
        ConnectApp::new(
            Backend::local(self.store.clone()),
            Arc::new(self.toasts.clone()),
            settings,
        )
    }

    /// A signed-up, signed-in student.
    pub async fn student(&self, local_part: &str, first_name: &str) -> ConnectApp {
        let mut app = self.app();
        app.signup(&student_form(local_part, first_name))
            .await
            .unwrap();
        app
    }

    /// A signed-up, signed-in official of `department`.
    pub async fn official(&self, local_part: &str, department: &str) -> ConnectApp {
        let mut form = student_form(local_part, department);
        form.role = SignUpRole::Official {
            department: department.to_string(),
        };
        let mut app = self.app();
        app.signup(&form).await.unwrap();
        app
    }
}

pub fn student_form(local_part: &str, first_name: &str) -> SignUpForm {
    SignUpForm {
        email: format!("{}@unsch.edu.pe", local_part),
        first_name: first_name.to_string(),
        last_name: "Huamán".to_string(),
        password: "secreto123".to_string(),
        confirm_password: "secreto123".to_string(),
        role: SignUpRole::StudentTeacher {
            student_code: "27201234".to_string(),
            career: "Ingeniería de Sistemas".to_string(),
        },
    }
}

pub fn uid(app: &ConnectApp) -> String {
    app.session().unwrap().uid().to_string()
}

/// Wait for a live state to satisfy `done`.
pub async fn until<D: Clone>(
    mut rx: watch::Receiver<LiveState<D>>,
    mut done: impl FnMut(&LiveState<D>) -> bool,
) -> LiveState<D> {
    tokio::time::timeout(Duration::from_secs(5), rx.wait_for(|s| done(s)))
        .await
        .expect("live state did not settle in time")
        .expect("live state sender dropped")
        .clone()
}
