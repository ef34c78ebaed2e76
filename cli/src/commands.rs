use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use chrono::{NaiveDate, TimeZone, Utc};
use clap::{Args, Subcommand, ValueEnum};
use textbin::access::{AccessController, Opened};
use textbin::api::requests::Credentials;
use textbin::bookmarks::store::{Bookmark, BookmarkStore};
use textbin::lifecycle::{DocumentLifecycle, DocumentUpdate, NewDocument};
use textbin::links::ShareLinks;
use textbin::listing::{Advance, ListingEngine};
use textbin::models::document::{DocumentKind, DocumentType, Expiry, Privacy, Tags};
use textbin::models::listing::{SortBy, SortOrder};
use textbin::models::tokens::{Password, ReadCode, UpdateCode};
use textbin::{ClientConfig, HttpTextbinApi, TextbinApi};

use crate::output;

/// Everything a command needs, built once from the configuration.
pub struct AppContext {
    config: ClientConfig,
    api: Arc<dyn TextbinApi>,
}

impl AppContext {
    pub fn new(config: ClientConfig) -> Self {
        let api: Arc<dyn TextbinApi> = Arc::new(HttpTextbinApi::from_config(&config));
        Self { config, api }
    }

    fn links(&self) -> ShareLinks {
        ShareLinks::new(self.config.site_url.clone())
    }

    fn bookmarks(&self) -> BookmarkStore<textbin::bookmarks::backend::FileBackend> {
        BookmarkStore::open(self.config.bookmarks_path.clone())
    }
}

#[derive(Args, Debug)]
pub struct ContentArgs {
    /// Document content
    #[arg(long, conflicts_with = "file")]
    content: Option<String>,

    /// Read the content from a file
    #[arg(long)]
    file: Option<PathBuf>,
}

impl ContentArgs {
    fn given(&self) -> anyhow::Result<Option<String>> {
        match (&self.content, &self.file) {
            (Some(content), _) => Ok(Some(content.clone())),
            (None, Some(path)) => std::fs::read_to_string(path)
                .map(Some)
                .with_context(|| format!("Failed to read {}", path.display())),
            (None, None) => Ok(None),
        }
    }

    /// The given content, falling back to stdin.
    fn required(&self) -> anyhow::Result<String> {
        if let Some(content) = self.given()? {
            return Ok(content);
        }
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .context("Failed to read content from stdin")?;
        Ok(content)
    }
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    #[arg(long)]
    title: String,

    #[command(flatten)]
    content: ContentArgs,

    /// Tag to attach (repeatable)
    #[arg(long = "tag")]
    tags: Vec<String>,

    /// Mark as code with this syntax (e.g. rust)
    #[arg(long)]
    syntax: Option<String>,

    /// Keep out of the public listing
    #[arg(long)]
    private: bool,

    /// Password for a private document
    #[arg(long, env = "TEXTBIN_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Encrypt the document (implies --private, disables editing)
    #[arg(long)]
    encrypt: bool,

    /// Expiration date (YYYY-MM-DD, UTC)
    #[arg(long, value_parser = parse_date)]
    expires: Option<NaiveDate>,

    /// Do not save the document locally
    #[arg(long)]
    no_save: bool,
}

#[derive(Args, Debug)]
pub struct ReadArgs {
    /// Read code of the document
    code: String,

    #[arg(long, env = "TEXTBIN_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Decryption key of an encrypted document
    #[arg(long)]
    key: Option<String>,

    /// Report the document, with an optional reason
    #[arg(long, num_args = 0..=1, value_name = "REASON")]
    pub report: Option<Option<String>>,
}

#[derive(Args, Debug)]
pub struct EditArgs {
    /// Update code of the document
    code: String,

    #[arg(long)]
    title: Option<String>,

    #[command(flatten)]
    content: ContentArgs,

    /// Replace the tags (repeatable)
    #[arg(long = "tag")]
    tags: Vec<String>,

    /// Mark as code with this syntax
    #[arg(long, conflicts_with = "text")]
    syntax: Option<String>,

    /// Mark as plain text
    #[arg(long)]
    text: bool,

    #[arg(long, conflicts_with = "private")]
    public: bool,

    #[arg(long)]
    private: bool,

    /// Password; required whenever the document ends up private
    #[arg(long, env = "TEXTBIN_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// New expiration date (YYYY-MM-DD, UTC)
    #[arg(long, value_parser = parse_date, conflicts_with = "never_expires")]
    expires: Option<NaiveDate>,

    #[arg(long)]
    never_expires: bool,

    /// Hide the document without deleting it
    #[arg(long, conflicts_with = "activate")]
    deactivate: bool,

    #[arg(long)]
    activate: bool,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Update code of the document
    code: String,

    /// Read code of the same document, as confirmation
    #[arg(long)]
    read_code: String,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SortField {
    CreatedAt,
    Views,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Order {
    Asc,
    Desc,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum KindFilter {
    Text,
    Code,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only documents carrying this tag (repeatable)
    #[arg(long = "tag")]
    tags: Vec<String>,

    #[arg(long = "type", value_enum)]
    kind: Option<KindFilter>,

    #[arg(long, value_enum, default_value = "created-at")]
    sort: SortField,

    #[arg(long, value_enum, default_value = "desc")]
    order: Order,

    /// Number of pages to load
    #[arg(long, default_value_t = 1)]
    pages: u32,
}

#[derive(Subcommand, Debug)]
pub enum SavedCommand {
    /// List saved documents, newest first
    List,

    /// Forget a saved document
    Remove {
        /// Read code of the document
        code: String,
    },

    /// Forget all saved documents
    Clear,
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|e| format!("{e} (expected YYYY-MM-DD)"))
}

fn expiry_at(date: NaiveDate) -> Expiry {
    Expiry::At(Utc.from_utc_datetime(&date.and_time(chrono::NaiveTime::MIN)))
}

fn kind_for(syntax: Option<String>) -> DocumentKind {
    match syntax {
        Some(syntax) => DocumentKind::code(syntax),
        None => DocumentKind::Text,
    }
}

pub async fn create(ctx: &AppContext, args: CreateArgs) -> anyhow::Result<()> {
    let privacy = if args.private || args.encrypt {
        Privacy::Private
    } else {
        Privacy::Public
    };
    let new = NewDocument {
        title: args.title,
        content: args.content.required()?,
        tags: args.tags.into_iter().collect(),
        kind: kind_for(args.syntax),
        privacy,
        expiry: args.expires.map(expiry_at).unwrap_or(Expiry::Never),
        password: args.password.map(Password::new),
        encrypt: args.encrypt,
    };

    let lifecycle = DocumentLifecycle::new(Arc::clone(&ctx.api));
    let created = lifecycle
        .create(new)
        .await
        .context("Failed to create document")?;

    let bookmark = Bookmark::from_created(&created, &ctx.links());
    output::print_created(&bookmark);
    eprintln!("\n{}", created.retention_warning());

    if args.no_save {
        tracing::debug!("Not saving document {} locally", created.document().id);
    } else {
        ctx.bookmarks()
            .add(bookmark)
            .context("Document created but could not be saved locally")?;
        tracing::info!("Saved document {} to local bookmarks", created.document().id);
    }
    Ok(())
}

pub async fn read(ctx: &AppContext, args: ReadArgs) -> anyhow::Result<()> {
    let controller = AccessController::new(Arc::clone(&ctx.api));
    let opened = controller
        .open(ReadCode::new(args.code.trim()))
        .await
        .context("Failed to open document")?;

    let mut revealed = match opened {
        Opened::Revealed(revealed) => revealed,
        Opened::AwaitingCredentials(awaiting) => {
            let required = awaiting.requirements();
            let mut credentials = Credentials::none();
            if let Some(password) = args.password {
                credentials = credentials.with_password(password);
            }
            if let Some(key) = args.key {
                credentials = credentials.with_decryption_key(key);
            }
            if (required.password && !credentials.has_password())
                || (required.decryption_key && !credentials.has_decryption_key())
            {
                bail!(
                    "This document is private and needs {}",
                    output::describe_requirements(required)
                );
            }
            awaiting
                .submit(&credentials)
                .await
                .context("Could not unlock document")?
        }
    };

    output::print_document(revealed.document(), revealed.is_reported());

    if let Some(reason) = args.report {
        revealed
            .file_report(reason.as_deref())
            .await
            .context("Failed to report document")?;
        eprintln!("Report submitted.");
    }
    Ok(())
}

pub async fn edit(ctx: &AppContext, args: EditArgs) -> anyhow::Result<()> {
    let lifecycle = DocumentLifecycle::new(Arc::clone(&ctx.api));
    let current = lifecycle
        .load_for_update(&UpdateCode::new(args.code.trim()))
        .await
        .context("Failed to load document for editing")?;

    let kind = match (args.syntax, args.text) {
        (Some(syntax), _) => Some(DocumentKind::code(syntax)),
        (None, true) => Some(DocumentKind::Text),
        (None, false) => None,
    };
    let privacy = match (args.public, args.private) {
        (true, _) => Some(Privacy::Public),
        (_, true) => Some(Privacy::Private),
        _ => None,
    };
    let expiry = match (args.expires, args.never_expires) {
        (Some(date), _) => Some(expiry_at(date)),
        (None, true) => Some(Expiry::Never),
        (None, false) => None,
    };
    let active = match (args.activate, args.deactivate) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    };

    let changes = DocumentUpdate {
        title: args.title,
        content: args.content.given()?,
        active,
        tags: (!args.tags.is_empty()).then(|| args.tags.into_iter().collect::<Tags>()),
        kind,
        privacy,
        expiry,
        password: args.password.map(Password::new),
    };

    let updated = lifecycle
        .update(&current, changes)
        .await
        .context("Failed to update document")?;

    eprintln!("Document updated.");
    output::print_links(&ctx.links(), &updated);
    Ok(())
}

pub async fn delete(ctx: &AppContext, args: DeleteArgs) -> anyhow::Result<()> {
    let update_code = UpdateCode::new(args.code.trim());
    let read_code = ReadCode::new(args.read_code.trim());

    let lifecycle = DocumentLifecycle::new(Arc::clone(&ctx.api));
    let current = lifecycle
        .load_for_update(&update_code)
        .await
        .context("Failed to load document")?;

    lifecycle
        .delete(&current.id, &read_code, &update_code)
        .await
        .context("Failed to delete document")?;

    let forgotten = ctx.bookmarks().remove(&read_code)?;
    tracing::info!(
        "Deleted document {}, {forgotten} local bookmark(s) dropped",
        current.id
    );
    eprintln!("Document deleted.");
    if forgotten > 0 {
        eprintln!("Removed {forgotten} saved entry(ies).");
    }
    Ok(())
}

pub async fn list(ctx: &AppContext, args: ListArgs) -> anyhow::Result<()> {
    let engine = ListingEngine::new(Arc::clone(&ctx.api), ctx.config.page_size);
    engine.update_filters(|filters| {
        filters.tags = args.tags.iter().map(String::as_str).collect();
        filters.doc_type = args.kind.map(|kind| match kind {
            KindFilter::Text => DocumentType::Text,
            KindFilter::Code => DocumentType::Code,
        });
        filters.sort_by = match args.sort {
            SortField::CreatedAt => SortBy::CreatedAt,
            SortField::Views => SortBy::Views,
        };
        filters.sort_order = match args.order {
            Order::Asc => SortOrder::Asc,
            Order::Desc => SortOrder::Desc,
        };
    });

    let mut loaded = 0;
    while loaded < args.pages {
        // The end of the printed list is always "visible" to a terminal.
        match engine
            .on_visibility_change(true)
            .await
            .context("Failed to load documents")?
        {
            Advance::Loaded { .. } => loaded += 1,
            Advance::Idle | Advance::Discarded => break,
        }
    }

    let documents = engine.documents();
    output::print_listing(&documents, engine.pagination().as_ref());
    Ok(())
}

pub fn saved(ctx: &AppContext, command: SavedCommand) -> anyhow::Result<()> {
    let store = ctx.bookmarks();
    match command {
        SavedCommand::List => {
            let bookmarks = store.list_all().context("Failed to read saved documents")?;
            output::print_bookmarks(&bookmarks);
        }
        SavedCommand::Remove { code } => {
            let removed = store.remove(&ReadCode::new(code.trim()))?;
            if removed == 0 {
                bail!("No saved document with read code '{}'", code.trim());
            }
            eprintln!("Removed {removed} saved entry(ies).");
        }
        SavedCommand::Clear => {
            store.clear_all()?;
            tracing::info!("Cleared local bookmarks at {}", ctx.config.bookmarks_path.display());
            eprintln!("All saved documents removed.");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2030-01-31").unwrap(),
            NaiveDate::from_ymd_opt(2030, 1, 31).unwrap()
        );
        assert!(parse_date("31/01/2030").is_err());
    }

    #[test]
    fn test_expiry_is_midnight_utc() {
        let date = NaiveDate::from_ymd_opt(2030, 1, 31).unwrap();
        let Expiry::At(at) = expiry_at(date) else {
            panic!("Expected a date");
        };
        assert_eq!(at.to_rfc3339(), "2030-01-31T00:00:00+00:00");
    }

    #[test]
    fn test_saved_commands_use_configured_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = ClientConfig::new(
            textbin::config::parse_url("api_url", "http://localhost:3000").unwrap(),
            textbin::config::parse_url("site_url", "http://localhost:5173").unwrap(),
        );
        config.bookmarks_path = dir.path().join("saved.json");
        let ctx = AppContext::new(config);

        saved(&ctx, SavedCommand::List).unwrap();
        assert!(saved(&ctx, SavedCommand::Remove { code: "nope".into() }).is_err());
        saved(&ctx, SavedCommand::Clear).unwrap();
    }

    #[tokio::test]
    async fn test_create_then_delete_forgets_bookmark() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = ClientConfig::new(
            textbin::config::parse_url("api_url", "http://localhost:3000").unwrap(),
            textbin::config::parse_url("site_url", "http://localhost:5173").unwrap(),
        );
        config.bookmarks_path = dir.path().join("saved.json");
        let ctx = AppContext {
            config,
            api: Arc::new(textbin::MemoryTextbinApi::new()),
        };

        let args = CreateArgs {
            title: "Scratch".into(),
            content: ContentArgs {
                content: Some("hello".into()),
                file: None,
            },
            tags: vec!["Go".into()],
            syntax: None,
            private: false,
            password: None,
            encrypt: false,
            expires: None,
            no_save: false,
        };
        create(&ctx, args).await.unwrap();

        let saved = ctx.bookmarks().list_all().unwrap();
        assert_eq!(saved.len(), 1);
        let read_code = saved[0].read_code().as_str().to_string();
        let update_code = saved[0]
            .update_link
            .as_deref()
            .and_then(|link| link.rsplit('/').next())
            .unwrap()
            .to_string();

        let wrong = DeleteArgs {
            code: update_code.clone(),
            read_code: "not-it".into(),
        };
        assert!(delete(&ctx, wrong).await.is_err());
        assert_eq!(ctx.bookmarks().list_all().unwrap().len(), 1);

        delete(&ctx, DeleteArgs { code: update_code, read_code }).await.unwrap();
        assert!(ctx.bookmarks().list_all().unwrap().is_empty());
    }
}
