mod common;

use textbin::bookmarks::store::{Bookmark, BookmarkStore};
use textbin::lifecycle::NewDocument;
use textbin::links::ShareLinks;
use textbin::models::document::Privacy;
use url::Url;

fn links() -> ShareLinks {
    ShareLinks::new(Url::parse("https://textbin.test").unwrap())
}

#[tokio::test]
async fn created_documents_are_saved_newest_first() {
    let env = common::TestEnv::start().await;
    let dir = tempfile::tempdir().unwrap();
    let store = BookmarkStore::open(dir.path().join("saved.json"));

    let first = env.create_public("First", &[]).await;
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let second = env.create_public("Second", &[]).await;

    store.add(Bookmark::from_created(&first, &links())).unwrap();
    store.add(Bookmark::from_created(&second, &links())).unwrap();

    let saved = store.list_all().unwrap();
    let titles: Vec<_> = saved.iter().map(|b| b.document.title.as_str()).collect();
    assert_eq!(titles, vec!["Second", "First"]);

    let code = second.document().read_code.clone();
    assert_eq!(
        saved[0].read_link,
        format!("https://textbin.test/read/{code}")
    );
    let update_code = second.document().update_code().unwrap().expose();
    assert_eq!(
        saved[0].update_link.as_deref(),
        Some(format!("https://textbin.test/update/{update_code}").as_str())
    );
}

#[tokio::test]
async fn encrypted_bookmark_keeps_key_and_outlives_document() {
    let env = common::TestEnv::start().await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("saved.json");

    let mut new = NewDocument::new("Vault", "secret");
    new.privacy = Privacy::Private;
    new.encrypt = true;
    let created = env.lifecycle().create(new).await.unwrap();
    BookmarkStore::open(&path)
        .add(Bookmark::from_created(&created, &links()))
        .unwrap();

    let saved = BookmarkStore::open(&path).list_all().unwrap();
    assert_eq!(saved.len(), 1);
    assert!(saved[0].update_link.is_none());
    assert_eq!(saved[0].decryption_key.as_ref(), created.decryption_key());

    BookmarkStore::open(&path).clear_all().unwrap();
    assert!(BookmarkStore::open(&path).list_all().unwrap().is_empty());
}
