// SPDX-License-Identifier: MPL-2.0

mod common;

use common::{Harness, uid, until};
use serial_test::serial;
use std::time::Duration;
use unsch_connect::backend::local::Access;
use unsch_connect::backend::{DocumentStore, Operation, Query, path};
use unsch_connect::diagnostics;
use unsch_connect::messages;
use unsch_connect::model::{Post, Record};
use unsch_connect::notify::ToastKind;
use unsch_connect::optimistic::ToggleState;
use unsch_connect::search::{self, ListState};
use unsch_connect::services::{
    ActionError, ImageUpload, PostCard, Resolved, ToggleKind, UserActivity,
};
use unsch_connect::validation::{CommentDraft, PostDraft};

async fn stored_post(h: &Harness, id: &str) -> Post {
    let doc = h.store.get_document(&path::post(id)).await.unwrap().unwrap();
    Post::from_document(doc).unwrap()
}

#[tokio::test]
async fn like_is_immediate_and_reverts_on_failure() {
    let h = Harness::new();
    let mut ana = h.student("ana", "Ana").await;
    let beto = h.student("beto", "Beto").await;
    let post = ana.compose(&PostDraft::new("Hola UNSCH"), None).await.unwrap();

    let mut card = PostCard::new(post.clone(), &uid(&beto));
    h.store.deny("posts/", Access::Write);

    let intent = card.press(ToggleKind::Like);
    assert_eq!(card.like(), ToggleState::new(true, 1));

    let result = beto.posts.send(&uid(&beto), &card.post, &intent).await;
    card.settle(ToggleKind::Like, result.is_ok());

    assert!(result.is_err());
    assert_eq!(card.like(), ToggleState::new(false, 0));
    let toast = h.toasts.errors().pop().unwrap();
    assert_eq!(toast.kind, ToastKind::Error);
    assert_eq!(toast.title, messages::PERMISSION_TITLE);
    assert!(stored_post(&h, &post.id).await.liked_by.is_empty());
}

#[tokio::test]
async fn like_then_unlike_reaches_the_backend() {
    let h = Harness::new();
    let mut ana = h.student("ana", "Ana").await;
    let beto = h.student("beto", "Beto").await;
    let post = ana.compose(&PostDraft::new("Hola"), None).await.unwrap();
    let beto_id = uid(&beto);

    let mut card = PostCard::new(post.clone(), &beto_id);
    beto.posts.toggle_like(&mut card).await.unwrap();
    assert_eq!(stored_post(&h, &post.id).await.liked_by, vec![beto_id.clone()]);

    beto.posts.toggle_like(&mut card).await.unwrap();
    assert_eq!(card.like(), ToggleState::new(false, 0));
    assert!(stored_post(&h, &post.id).await.liked_by.is_empty());
}

#[tokio::test]
async fn reposting_a_repost_is_rejected() {
    let h = Harness::new();
    let mut ana = h.student("ana", "Ana").await;
    let beto = h.student("beto", "Beto").await;
    let carla = h.student("carla", "Carla").await;
    let post = ana.compose(&PostDraft::new("Original"), None).await.unwrap();

    let mut card = PostCard::new(post.clone(), &uid(&beto));
    beto.posts.toggle_repost(&mut card).await.unwrap();
    assert_eq!(stored_post(&h, &post.id).await.reposted_by, vec![uid(&beto)]);

    let all = h.store.query(&Query::new(path::posts())).await.unwrap();
    assert_eq!(all.len(), 2);
    let repost = all
        .into_iter()
        .map(|d| Post::from_document(d).unwrap())
        .find(Post::is_repost)
        .unwrap();
    assert_eq!(repost.original_post_id.as_deref(), Some(post.id.as_str()));
    assert_eq!(repost.content, "Original");

    // offline: the rejection must happen before any backend call
    h.store.set_offline(true);
    let mut repost_card = PostCard::new(repost, &uid(&carla));
    assert!(!repost_card.can_repost());
    let err = carla.posts.toggle_repost(&mut repost_card).await.unwrap_err();
    assert!(matches!(err, ActionError::CannotRepostRepost));
    let toast = h.toasts.errors().pop().unwrap();
    assert_eq!(toast.description.as_deref(), Some(messages::REPOST_OF_REPOST));
    assert_eq!(repost_card.repost(), ToggleState::new(false, 0));
}

#[tokio::test]
async fn failed_repost_leaves_no_repost_document() {
    let h = Harness::new();
    let mut ana = h.student("ana", "Ana").await;
    let beto = h.student("beto", "Beto").await;
    let post = ana.compose(&PostDraft::new("Original"), None).await.unwrap();

    // the new repost may be written, marking the original may not
    h.store.deny(&format!("posts/{}", post.id), Access::Write);
    let mut card = PostCard::new(post.clone(), &uid(&beto));
    assert!(beto.posts.toggle_repost(&mut card).await.is_err());
    assert_eq!(card.repost(), ToggleState::new(false, 0));
    assert!(!h.toasts.errors().is_empty());

    let mine = Query::new(path::posts()).where_eq("authorId", uid(&beto).as_str());
    assert!(h.store.query(&mine).await.unwrap().is_empty());
    assert!(stored_post(&h, &post.id).await.reposted_by.is_empty());
}

#[tokio::test]
async fn unrepost_removes_the_repost_document() {
    let h = Harness::new();
    let mut ana = h.student("ana", "Ana").await;
    let beto = h.student("beto", "Beto").await;
    let post = ana.compose(&PostDraft::new("Original"), None).await.unwrap();

    let mut card = PostCard::new(post.clone(), &uid(&beto));
    beto.posts.toggle_repost(&mut card).await.unwrap();
    beto.posts.toggle_repost(&mut card).await.unwrap();

    let all = h.store.query(&Query::new(path::posts())).await.unwrap();
    assert_eq!(all.len(), 1);
    assert!(stored_post(&h, &post.id).await.reposted_by.is_empty());
}

#[tokio::test]
async fn deleted_posts_leave_the_author_activity() {
    let h = Harness::new();
    let mut ana = h.student("ana", "Ana").await;
    let beto = h.student("beto", "Beto").await;
    let ana_id = uid(&ana);
    let post = ana.compose(&PostDraft::new("Se borrará"), None).await.unwrap();
    ana.compose(&PostDraft::new("Se queda"), None).await.unwrap();

    let activity = ana.posts.user_activity(&ana_id);
    until(activity.watch(), |s| s.data.len() == 2).await;

    // non-authors are not offered the action and are refused anyway
    let card = PostCard::new(post.clone(), &uid(&beto));
    assert!(!card.can_delete());
    let err = beto.posts.delete_post(&uid(&beto), &post).await.unwrap_err();
    assert!(matches!(err, ActionError::NotAuthor));
    let toast = h.toasts.errors().pop().unwrap();
    assert_eq!(toast.description.as_deref(), Some(messages::NOT_AUTHOR));

    assert!(PostCard::new(post.clone(), &ana_id).can_delete());
    ana.posts.delete_post(&ana_id, &post).await.unwrap();

    let state = until(activity.watch(), |s| s.data.len() == 1).await;
    let split = UserActivity::split(state.data);
    assert_eq!(split.posts[0].content, "Se queda");
    assert!(split.reposts.is_empty());
}

#[tokio::test]
async fn composed_posts_are_buffered_until_the_feed_has_them() {
    let h = Harness::new();
    let mut ana = h.student("ana", "Ana").await;
    let post = ana.compose(&PostDraft::new("Recién publicado"), None).await.unwrap();

    let session = ana.session_mut().unwrap();
    assert_eq!(session.buffer.len(), 1);
    assert_eq!(session.buffer.merged(&[])[0].id, post.id);

    let feed = ana.posts.community_feed();
    let state = until(feed.watch(), |s| !s.data.is_empty()).await;
    let session = ana.session_mut().unwrap();
    session.buffer.prune(&state.data);
    assert!(session.buffer.is_empty());
}

#[tokio::test]
async fn post_images_are_uploaded_first() {
    let h = Harness::new();
    let mut ana = h.student("ana", "Ana").await;
    let png = ImageUpload::new(b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR".to_vec());

    let post = ana.compose(&PostDraft::new(""), Some(&png)).await.unwrap();
    let url = post.image_url.unwrap();
    assert!(url.starts_with(&format!("local://posts/{}/", uid(&ana))));

    let err = ana
        .compose(&PostDraft::new("texto"), Some(&ImageUpload::new(b"GIF89a".to_vec())))
        .await
        .unwrap_err();
    assert!(matches!(err, ActionError::UnsupportedImage));
}

#[tokio::test]
async fn comments_arrive_oldest_first() {
    let h = Harness::new();
    let mut ana = h.student("ana", "Ana").await;
    let beto = h.student("beto", "Beto").await;
    let post = ana.compose(&PostDraft::new("¿Dudas?"), None).await.unwrap();

    ana.posts
        .add_comment(&uid(&ana), &post.id, &CommentDraft::new("Primero"))
        .await
        .unwrap();
    // distinct millisecond timestamps
    tokio::time::sleep(Duration::from_millis(5)).await;
    beto.posts
        .add_comment(&uid(&beto), &post.id, &CommentDraft::new("Segundo"))
        .await
        .unwrap();
    assert!(
        beto.posts
            .add_comment(&uid(&beto), &post.id, &CommentDraft::new("  "))
            .await
            .is_err()
    );

    let comments = beto.posts.comments(&post.id);
    let state = until(comments.watch(), |s| s.data.len() == 2).await;
    assert_eq!(state.data[0].content, "Primero");
    assert_eq!(state.data[1].author_id, uid(&beto));
}

#[tokio::test]
async fn authors_resolve_or_fall_back_to_the_placeholder() {
    let h = Harness::new();
    let ana = h.student("ana", "Ana").await;

    let mut authors = ana.posts.authors();
    match authors.resolve(&uid(&ana)).await {
        Resolved::Found(profile) => assert_eq!(profile.first_name, "Ana"),
        other => panic!("expected the author, got {other:?}"),
    }
    assert_eq!(authors.resolve("borrado").await, Resolved::Missing);
    assert_eq!(authors.display_name("borrado"), messages::UNKNOWN_USER);

    authors.retain([uid(&ana).as_str()]);
    assert_eq!(authors.len(), 1);
}

#[tokio::test]
async fn filtering_everything_out_is_no_results() {
    let h = Harness::new();
    let mut ana = h.student("ana", "Ana").await;
    ana.compose(&PostDraft::new("Examen de cálculo"), None).await.unwrap();
    ana.compose(&PostDraft::new("Fiesta de bienvenida"), None).await.unwrap();

    let viewer = uid(&ana);
    let feed = ana.posts.community_feed();
    let state = until(feed.watch(), |s| s.data.len() == 2).await;
    let cards: Vec<PostCard> = state
        .data
        .iter()
        .map(|p| PostCard::new(p.clone(), &viewer))
        .collect();

    let hits = search::filter(&cards, "CÁLCULO");
    assert_eq!(hits.len(), 1);

    let none = search::filter(&cards, "biblioteca");
    assert!(matches!(
        ListState::classify(state.is_loading, cards.len(), none),
        ListState::NoResults
    ));
}

#[tokio::test]
#[serial]
async fn permission_denials_reach_diagnostics() {
    let h = Harness::new();
    let mut ana = h.student("ana", "Ana").await;
    let beto = h.student("beto", "Beto").await;
    let post = ana.compose(&PostDraft::new("Hola"), None).await.unwrap();

    let mut rx = diagnostics::subscribe();
    h.store.deny("posts/", Access::Write);
    let mut card = PostCard::new(post.clone(), &uid(&beto));
    assert!(beto.posts.toggle_like(&mut card).await.is_err());

    let expected = format!("posts/{}", post.id);
    let mut found = None;
    while let Ok(context) = rx.try_recv() {
        if context.path == expected {
            found = Some(context);
        }
    }
    let context = found.unwrap();
    assert_eq!(context.operation, Operation::Update);
    assert_eq!(
        context.payload.unwrap()["likedBy"]["arrayUnion"][0],
        uid(&beto).as_str()
    );
}
