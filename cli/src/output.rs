use textbin::access::CredentialRequirements;
use textbin::bookmarks::store::Bookmark;
use textbin::links::ShareLinks;
use textbin::models::document::{Document, Expiry, SUGGESTED_TAGS};
use textbin::models::listing::Pagination;

pub fn describe_requirements(required: CredentialRequirements) -> &'static str {
    match (required.password, required.decryption_key) {
        (true, true) => "--password and --key",
        (true, false) => "--password",
        (false, true) => "--key",
        (false, false) => "no credentials",
    }
}

fn tags_line(doc: &Document) -> String {
    if doc.tags.is_empty() {
        "-".to_string()
    } else {
        doc.tags.iter().collect::<Vec<_>>().join(", ")
    }
}

fn expiry_line(expiry: &Expiry) -> String {
    match expiry {
        Expiry::Never => "never".to_string(),
        Expiry::At(at) => at.format("%Y-%m-%d %H:%M UTC").to_string(),
    }
}

pub fn print_created(bookmark: &Bookmark) {
    let doc = &bookmark.document;
    println!("Created \"{}\" ({})", doc.title, doc.privacy);
    println!("Read link:   {}", bookmark.read_link);
    if let Some(update_link) = &bookmark.update_link {
        println!("Update link: {update_link}");
    }
    if let Some(key) = &bookmark.decryption_key {
        println!("Decryption key: {}", key.expose());
    }
}

pub fn print_links(links: &ShareLinks, doc: &Document) {
    println!("Read link:   {}", links.read_link(&doc.read_code));
    if let Some(code) = doc.update_code() {
        println!("Update link: {}", links.update_link(code));
    }
}

pub fn print_document(doc: &Document, is_reported: bool) {
    println!("# {}", doc.title);
    println!(
        "{} | {} | {} views | tags: {} | expires: {}",
        doc.kind.syntax().unwrap_or("text"),
        doc.privacy,
        doc.views,
        tags_line(doc),
        expiry_line(&doc.expiry),
    );
    if is_reported {
        println!("(this document has been reported)");
    }
    println!();
    println!("{}", doc.content);
}

pub fn print_listing(documents: &[Document], pagination: Option<&Pagination>) {
    if documents.is_empty() {
        println!("No documents found.");
        return;
    }
    for doc in documents {
        println!(
            "{:<12} {:<40} {:>6} views  {}  [{}]",
            doc.read_code.as_str(),
            doc.title,
            doc.views,
            doc.created_at.format("%Y-%m-%d"),
            tags_line(doc),
        );
    }
    if let Some(p) = pagination {
        println!(
            "\nShowing {} of {} (page {}/{}{})",
            documents.len(),
            p.total_count,
            p.current_page,
            p.total_pages,
            if p.has_next { ", more available" } else { "" }
        );
    }
}

pub fn print_bookmarks(bookmarks: &[Bookmark]) {
    if bookmarks.is_empty() {
        println!("No saved documents.");
        return;
    }
    for bookmark in bookmarks {
        let doc = &bookmark.document;
        println!(
            "{}  {}  ({})",
            doc.created_at.format("%Y-%m-%d %H:%M"),
            doc.title,
            doc.privacy
        );
        println!("    read:   {}", bookmark.read_link);
        if let Some(update_link) = &bookmark.update_link {
            println!("    update: {update_link}");
        }
        if let Some(key) = &bookmark.decryption_key {
            println!("    key:    {}", key.expose());
        }
    }
}

pub fn print_tags() {
    for tag in SUGGESTED_TAGS {
        println!("{tag}");
    }
}
