mod common;

use chrono::{Duration, Utc};
use textbin::api::requests::{DECRYPTION_KEY_WARNING, UPDATE_LINK_WARNING};
use textbin::lifecycle::{DocumentUpdate, NewDocument};
use textbin::models::document::{Capability, DocumentKind, Expiry, Privacy};
use textbin::models::tokens::{Password, UpdateCode};
use textbin::{TextbinApi, TextbinError};

#[tokio::test]
async fn create_public_returns_both_codes() {
    let env = common::TestEnv::start().await;
    let mut new = NewDocument::new("Snippet", "fn main() {}");
    new.kind = DocumentKind::code("rust");
    new.tags = ["Snippet", "Backend"].into_iter().collect();

    let created = env.lifecycle().create(new).await.unwrap();
    let doc = created.document();
    assert!(!doc.read_code.is_empty());
    assert!(doc.update_code().is_some_and(|c| !c.is_empty()));
    assert_eq!(doc.kind, DocumentKind::code("rust"));
    assert_eq!(doc.tags.len(), 2);
    assert_eq!(doc.expiry, Expiry::Never);
    assert_eq!(created.retention_warning(), UPDATE_LINK_WARNING);
}

#[tokio::test]
async fn create_encrypted_returns_key_without_update_code() {
    let env = common::TestEnv::start().await;
    let mut new = NewDocument::new("Vault", "secret");
    new.privacy = Privacy::Private;
    new.encrypt = true;

    let created = env.lifecycle().create(new).await.unwrap();
    assert!(created.decryption_key().is_some_and(|k| !k.is_empty()));
    assert_eq!(created.document().capability, Capability::Encrypted);
    assert_eq!(created.retention_warning(), DECRYPTION_KEY_WARNING);
}

#[tokio::test]
async fn invalid_create_sends_nothing() {
    let env = common::TestEnv::start().await;
    let mut new = NewDocument::new("Private", "content");
    new.privacy = Privacy::Private;

    let err = env.lifecycle().create(new).await.unwrap_err();
    assert!(err.is_validation());
    assert_eq!(env.backend.document_count(), 0);
}

#[tokio::test]
async fn update_keeps_codes_and_applies_changes() {
    let env = common::TestEnv::start().await;
    let created = env.create_public("Draft", &["Go"]).await;
    let update_code = created.document().update_code().cloned().unwrap();

    let lifecycle = env.lifecycle();
    let current = lifecycle.load_for_update(&update_code).await.unwrap();
    assert_eq!(current.title, "Draft");

    let expires = Utc::now() + Duration::days(7);
    let updated = lifecycle
        .update(
            &current,
            DocumentUpdate {
                title: Some("Final".to_string()),
                expiry: Some(Expiry::At(expires)),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.title, "Final");
    assert_eq!(updated.read_code, created.document().read_code);
    assert_eq!(updated.update_code(), Some(&update_code));
    assert!(matches!(updated.expiry, Expiry::At(_)));

    let reloaded = lifecycle.load_for_update(&update_code).await.unwrap();
    assert_eq!(reloaded.title, "Final");
    assert_eq!(reloaded.read_code, created.document().read_code);
}

#[tokio::test]
async fn making_private_requires_long_password() {
    let env = common::TestEnv::start().await;
    let created = env.create_public("Notes", &[]).await;
    let lifecycle = env.lifecycle();
    let current = created.document().clone();

    let short = DocumentUpdate {
        privacy: Some(Privacy::Private),
        password: Some(Password::new("short")),
        ..Default::default()
    };
    assert!(lifecycle.update(&current, short).await.unwrap_err().is_validation());

    let long = DocumentUpdate {
        privacy: Some(Privacy::Private),
        password: Some(Password::new("long enough")),
        ..Default::default()
    };
    let updated = lifecycle.update(&current, long).await.unwrap();
    assert_eq!(updated.privacy, Privacy::Private);
    assert!(updated.password_protected);

    let status = env
        .client()
        .get_privacy_status(&current.read_code)
        .await
        .unwrap();
    assert!(status.is_password_protected);
}

#[tokio::test]
async fn wrong_update_code_is_request_failed() {
    let env = common::TestEnv::start().await;
    let created = env.create_public("Notes", &[]).await;
    let mut forged = created.document().clone();
    forged.capability = Capability::Updatable(UpdateCode::new("forged"));

    let err = env
        .lifecycle()
        .update(
            &forged,
            DocumentUpdate {
                title: Some("Hijacked".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, TextbinError::RequestFailed(_)));
}

#[tokio::test]
async fn delete_needs_both_tokens() {
    let env = common::TestEnv::start().await;
    let created = env.create_public("Doomed", &[]).await;
    let other = env.create_public("Bystander", &[]).await;
    let doc = created.document();
    let update_code = doc.update_code().unwrap();
    let lifecycle = env.lifecycle();

    let mismatched = lifecycle
        .delete(&doc.id, &other.document().read_code, update_code)
        .await;
    assert!(matches!(mismatched, Err(TextbinError::RequestFailed(_))));
    assert_eq!(env.backend.document_count(), 2);

    lifecycle
        .delete(&doc.id, &doc.read_code, update_code)
        .await
        .unwrap();
    assert_eq!(env.backend.document_count(), 1);

    let gone = env.controller().open(doc.read_code.clone()).await;
    assert!(matches!(gone, Err(TextbinError::RequestFailed(_))));
}
