// SPDX-License-Identifier: MPL-2.0

mod common;

use chrono::{NaiveDate, NaiveTime};
use common::{Harness, uid, until};
use unsch_connect::ConnectApp;
use unsch_connect::calendar::{self, ScheduleView};
use unsch_connect::messages;
use unsch_connect::model::{AnnouncementCategory, ScheduleKind, UserProfile};
use unsch_connect::notify::ToastKind;
use unsch_connect::search::{self, CategoryFilter, ListState};
use unsch_connect::services::{ActionError, AnnouncementService};
use unsch_connect::validation::{AnnouncementDraft, ScheduleItemDraft};

fn date(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
}

fn time(h: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, 0, 0).unwrap()
}

fn class(name: &str, day: u32, start: u32) -> ScheduleItemDraft {
    ScheduleItemDraft {
        course_name: name.to_string(),
        kind: ScheduleKind::Class,
        date: date(day),
        start_time: time(start),
        end_time: time(start + 2),
        location: Some("Pabellón B".to_string()),
    }
}

fn notice(title: &str, category: AnnouncementCategory) -> AnnouncementDraft {
    AnnouncementDraft {
        title: title.to_string(),
        content: "Más información en la oficina.".to_string(),
        category,
        image_url: None,
    }
}

async fn profile_of(app: &ConnectApp) -> UserProfile {
    app.session().unwrap().profile_loaded().await.unwrap()
}

#[tokio::test]
async fn selected_day_shows_only_its_items() {
    let h = Harness::new();
    let ana = h.student("ana", "Ana").await;
    let me = uid(&ana);

    ana.schedule.add(&me, class("Cálculo II", 15, 10)).await.unwrap();
    ana.schedule.add(&me, class("Física I", 15, 8)).await.unwrap();
    ana.schedule.add(&me, class("Química", 16, 8)).await.unwrap();

    let feed = ana.schedule.feed(&me);
    let state = until(feed.watch(), |s| s.data.len() == 3).await;

    let on_15 = calendar::items_on(&state.data, date(15));
    let names: Vec<_> = on_15.iter().map(|i| i.course_name.as_str()).collect();
    assert_eq!(names, ["Física I", "Cálculo II"]);
    assert!(calendar::items_on(&state.data, date(17)).is_empty());
    assert_eq!(
        calendar::busy_days(&state.data, date(1)),
        vec![date(15), date(16)]
    );
    assert_eq!(calendar::heading(ScheduleView::Month, date(15)), "Octubre 2026");
}

#[tokio::test]
async fn schedule_items_can_be_edited_and_removed() {
    let h = Harness::new();
    let ana = h.student("ana", "Ana").await;
    let me = uid(&ana);

    let item = ana.schedule.add(&me, class("Cálculo II", 15, 10)).await.unwrap();
    let mut draft = ScheduleItemDraft::from_item(&item);
    draft.location = Some("  ".to_string());
    draft.date = date(20);
    let updated = ana.schedule.update(&me, &item.id, draft).await.unwrap();
    assert_eq!(updated.location, None);

    let feed = ana.schedule.feed(&me);
    let state = until(feed.watch(), |s| s.data.iter().any(|i| i.date == date(20))).await;
    assert_eq!(state.data.len(), 1);
    assert_eq!(state.data[0].id, item.id);

    let mut backwards = class("Física I", 15, 10);
    backwards.end_time = time(9);
    let err = ana.schedule.add(&me, backwards).await.unwrap_err();
    let ActionError::Validation(err) = err else {
        panic!("expected a validation error");
    };
    assert!(err.field("endTime").is_some());

    ana.schedule.delete(&me, &item.id).await.unwrap();
    until(feed.watch(), |s| s.data.is_empty()).await;
}

#[tokio::test]
async fn schedules_are_private_to_their_owner() {
    let h = Harness::new();
    let ana = h.student("ana", "Ana").await;
    let beto = h.student("beto", "Beto").await;

    ana.schedule.add(&uid(&ana), class("Cálculo II", 15, 10)).await.unwrap();

    let theirs = beto.schedule.feed(&uid(&beto));
    let state = until(theirs.watch(), |s| !s.is_loading).await;
    assert!(state.data.is_empty());
}

#[tokio::test]
async fn students_cannot_publish_announcements() {
    let h = Harness::new();
    let ana = h.student("ana", "Ana").await;
    let profile = profile_of(&ana).await;

    let err = ana
        .announcements
        .publish(&profile, &notice("Examen", AnnouncementCategory::Facultad))
        .await
        .unwrap_err();
    assert!(matches!(err, ActionError::NotAllowed(_)));
    let toast = h.toasts.errors().pop().unwrap();
    assert_eq!(toast.description.as_deref(), Some(messages::PUBLISHERS_ONLY));

    let feed = ana.announcements.feed();
    let state = until(feed.watch(), |s| !s.is_loading).await;
    assert!(matches!(
        ListState::classify(state.is_loading, state.data.len(), state.data),
        ListState::Empty
    ));
}

#[tokio::test]
async fn officials_publish_and_readers_filter() {
    let h = Harness::new();
    let ofi = h.official("mesa.partes", "Mesa de Partes").await;
    let ana = h.student("ana", "Ana").await;
    let publisher = profile_of(&ofi).await;
    assert!(ofi.session().unwrap().can_publish_announcements());

    ofi.announcements
        .publish(&publisher, &notice("Resultados de admisión", AnnouncementCategory::Admision))
        .await
        .unwrap();
    ofi.announcements
        .publish(&publisher, &notice("Ceremonia de rectorado", AnnouncementCategory::Rectorado))
        .await
        .unwrap();
    let toast = h.toasts.last().unwrap();
    assert_eq!(toast.kind, ToastKind::Success);

    let feed = ana.announcements.feed();
    let state = until(feed.watch(), |s| s.data.len() == 2).await;

    let admision = search::filter_announcements(
        &state.data,
        "",
        CategoryFilter::Only(AnnouncementCategory::Admision),
    );
    assert_eq!(admision.len(), 1);
    assert_eq!(admision[0].title, "Resultados de admisión");

    let none = search::filter_announcements(&state.data, "biblioteca", CategoryFilter::All);
    assert!(matches!(
        ListState::classify(false, state.data.len(), none),
        ListState::NoResults
    ));

    let reader = profile_of(&ana).await;
    assert!(!AnnouncementService::can_delete(&reader, &state.data[0]));
    assert!(AnnouncementService::can_delete(&publisher, &state.data[0]));
    ofi.announcements.delete(&publisher, &state.data[0]).await.unwrap();
    until(feed.watch(), |s| s.data.len() == 1).await;
}

#[tokio::test]
async fn invalid_image_urls_are_refused() {
    let h = Harness::new();
    let ofi = h.official("mesa.partes", "Mesa de Partes").await;
    let publisher = profile_of(&ofi).await;

    let mut draft = notice("Aviso", AnnouncementCategory::Facultad);
    draft.image_url = Some("no es una url".to_string());
    let err = ofi.announcements.publish(&publisher, &draft).await.unwrap_err();
    let ActionError::Validation(err) = err else {
        panic!("expected a validation error");
    };
    assert!(err.field("imageUrl").is_some());
}
