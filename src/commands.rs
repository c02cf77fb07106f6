use std::io::BufRead;
use std::path::Path;

use chrono::Utc;

use crate::api::{ContentApi, ListQuery, Page};
use crate::cli::{
    ArticlesCommand, Command, EditArticle, PostsCommand, SectionFields, SectionsCommand,
};
use crate::error::{AppError, Result};
use crate::forms::{split_list, ArticleDraft, ArticleForm, PostDraft, PostForm, SectionForm};
use crate::models::{Article, ArticleContent, ContentKind, Post, Section, Slot};
use crate::store::AppState;

/// Runs every subcommand except `live`, which needs the terminal.
pub async fn run<A>(command: Command, state: &mut AppState, api: &A) -> Result<()>
where
    A: ContentApi + ?Sized,
{
    match command {
        Command::Login { email, password } => {
            let password = match password {
                Some(p) => p,
                None => read_password()?,
            };
            let admin = state.login(api, &email, &password).await?;
            println!("Signed in as {} <{}> ({})", admin.name, admin.email, admin.role.label());
        }
        Command::Logout => {
            state.logout();
            println!("Signed out");
        }
        Command::Whoami => match state.current_admin() {
            Some(admin) => println!(
                "{} <{}> ({}) on {}",
                admin.name,
                admin.email,
                admin.role.label(),
                state.brand().display_name()
            ),
            None => println!("Not signed in"),
        },
        Command::Profile { name, email } => {
            let current = state.require_session()?.admin.clone();
            let name = name.unwrap_or(current.name);
            let email = email.unwrap_or(current.email);
            let admin = state.update_profile(api, &name, &email).await?;
            println!("Profile updated: {} <{}>", admin.name, admin.email);
        }
        Command::Articles(command) => articles(command, state, api).await?,
        Command::Posts { kind, command } => posts(kind.into(), command, state, api).await?,
        Command::Sections(command) => sections(command, state, api).await?,
        Command::Upload { path } => {
            state.require_session()?;
            let url = api.upload_image(&path).await?;
            println!("{url}");
        }
        Command::Live { .. } => {
            return Err(AppError::Config(
                "the live editor needs an interactive terminal".to_string(),
            ))
        }
    }
    Ok(())
}

fn read_password() -> Result<String> {
    eprint!("Password: ");
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

async fn articles<A>(command: ArticlesCommand, state: &mut AppState, api: &A) -> Result<()>
where
    A: ContentApi + ?Sized,
{
    match command {
        ArticlesCommand::List {
            page,
            category,
            section,
        } => {
            let mut query = ListQuery::page(page, state.page_size());
            query.category = category;
            query.section = section;
            let page = state.load_articles(api, &query).await?;
            print_articles(&page);
        }
        ArticlesCommand::Get { id } => {
            let article = state.load_article(api, &id, true).await?;
            print_article(&article);
        }
        ArticlesCommand::Search { term, page } => {
            let page = state.search_articles(api, &term, page).await?;
            print_articles(&page);
        }
        ArticlesCommand::Slot { slot: Some(slot) } => {
            let articles = api.article_slot(state.brand(), slot).await?;
            state.dispatch(crate::store::Action::SlotLoaded { slot, articles });
            print_slot(state, slot);
        }
        ArticlesCommand::Slot { slot: None } => {
            state.refresh_slots(api).await?;
            for slot in Slot::ALL {
                print_slot(state, slot);
                println!();
            }
        }
        ArticlesCommand::Create { draft } => {
            let draft: ArticleDraft = read_draft(&draft)?;
            let mut form = ArticleForm::from_draft(state.brand(), draft)?;
            let article = state.save_article(api, &mut form).await?;
            println!("Created article {} \"{}\"", article.id, article.title);
        }
        ArticlesCommand::Edit(edit) => {
            let article = state.load_article(api, &edit.id, true).await?;
            let mut form = ArticleForm::from_article(state.brand(), &article);
            apply_edit(&mut form, edit)?;
            let article = state.save_article(api, &mut form).await?;
            println!("Updated article {} \"{}\"", article.id, article.title);
        }
        ArticlesCommand::Delete { id } => {
            state.delete_article(api, &id).await?;
            println!("Deleted article {id}");
        }
    }
    Ok(())
}

fn apply_edit(form: &mut ArticleForm, edit: EditArticle) -> Result<()> {
    if let Some(title) = edit.title {
        form.title = title;
    }
    if let Some(description) = edit.description {
        form.description = description;
    }
    if let Some(category) = edit.category {
        form.set_category(&category);
    }
    if let Some(subcategories) = edit.subcategories {
        form.subcategories.clear();
        for sub in split_list(&subcategories) {
            if !form.toggle_subcategory(&sub) {
                tracing::warn!("Skipping subcategory '{}' outside {}", sub, form.category);
            }
        }
    }
    if let Some(tags) = edit.tags {
        form.tags = split_list(&tags);
    }
    if let Some(creator) = edit.creator {
        form.creator = creator;
    }
    if let Some(breaking) = edit.breaking {
        form.is_breaking = breaking;
    }
    if let Some(headline) = edit.headline {
        form.is_headline = headline;
    }
    if let Some(topstory) = edit.topstory {
        form.is_topstory = topstory;
    }
    if let Some(section) = edit.section {
        form.section_id = Some(section).filter(|s| !s.trim().is_empty());
    }
    if let Some(tag) = edit.livescore_tag {
        form.has_livescore = !tag.trim().is_empty();
        form.livescore_tag = tag;
    }
    if let Some(path) = edit.content_file {
        if form.is_live {
            return Err(AppError::Config(
                "live articles are edited with `newsdesk live <id>`".to_string(),
            ));
        }
        form.body_html = std::fs::read_to_string(path)?;
    }
    if edit.image.is_some() {
        form.image = edit.image;
    }
    Ok(())
}

async fn posts<A>(
    kind: ContentKind,
    command: PostsCommand,
    state: &mut AppState,
    api: &A,
) -> Result<()>
where
    A: ContentApi + ?Sized,
{
    match command {
        PostsCommand::List { page } => {
            let query = ListQuery::page(page, state.page_size());
            let page = state.load_posts(api, kind, &query).await?;
            print_posts(&page);
        }
        PostsCommand::Get { id } => {
            let post = state.load_post(api, kind, &id).await?;
            println!("{}  {}", post.id, post.title);
            if !post.description.is_empty() {
                println!("{}", post.description);
            }
            println!("By {}  {}", post.creator, format_time(post.updated_at.or(post.created_at)));
            println!();
            println!("{}", html_to_text(&post.content));
        }
        PostsCommand::Search { term, page } => {
            let page = state.search_posts(api, kind, &term, page).await?;
            print_posts(&page);
        }
        PostsCommand::Create { draft } => {
            let draft: PostDraft = read_draft(&draft)?;
            let mut form = PostForm::from_draft(state.brand(), kind, draft)?;
            let post = state.save_post(api, &mut form).await?;
            println!("Created {} {} \"{}\"", kind.entity_key(), post.id, post.title);
        }
        PostsCommand::Edit { id, draft } => {
            let draft: PostDraft = read_draft(&draft)?;
            let mut form = PostForm::from_draft(state.brand(), kind, draft)?;
            form.id = Some(id);
            let post = state.save_post(api, &mut form).await?;
            println!("Updated {} {} \"{}\"", kind.entity_key(), post.id, post.title);
        }
        PostsCommand::Delete { id } => {
            state.delete_post(api, kind, &id).await?;
            println!("Deleted {} {id}", kind.entity_key());
        }
    }
    Ok(())
}

async fn sections<A>(command: SectionsCommand, state: &mut AppState, api: &A) -> Result<()>
where
    A: ContentApi + ?Sized,
{
    match command {
        SectionsCommand::List { all } => {
            state.load_sections(api).await?;
            let now = Utc::now();
            let sections = if all {
                state.sections_sorted()
            } else {
                state.active_sections(now)
            };
            if sections.is_empty() {
                println!("No sections");
            }
            for section in sections {
                print_section(section, now);
            }
        }
        SectionsCommand::Create(fields) => {
            let mut form = SectionForm::new(state.brand());
            apply_section_fields(&mut form, fields);
            let section = state.save_section(api, &mut form).await?;
            println!("Created section {} ({})", section.name, section.id);
        }
        SectionsCommand::Edit { id, fields } => {
            let existing = state.load_section(api, &id).await?;
            let mut form = SectionForm::from_section(state.brand(), &existing);
            apply_section_fields(&mut form, fields);
            let section = state.save_section(api, &mut form).await?;
            println!("Updated section {} ({})", section.name, section.id);
        }
        SectionsCommand::Delete { id } => {
            state.delete_section(api, &id).await?;
            println!("Deleted section {id}");
        }
    }
    Ok(())
}

fn apply_section_fields(form: &mut SectionForm, fields: SectionFields) {
    if let Some(name) = fields.name {
        form.name = name;
    }
    if let Some(code) = fields.code {
        form.code = code;
    }
    if let Some(slug) = fields.slug {
        form.slug = slug;
    }
    if let Some(color) = fields.color {
        form.color = color;
    }
    if let Some(expires_at) = fields.expires_at {
        form.expires_at = expires_at;
    }
    if let Some(order) = fields.display_order {
        form.display_order = order;
    }
}

/// Builds the form for the live editor from a draft file path or the id of
/// an existing live article.
pub async fn live_form<A>(target: &str, state: &mut AppState, api: &A) -> Result<ArticleForm>
where
    A: ContentApi + ?Sized,
{
    state.require_session()?;
    let path = Path::new(target);
    let mut form = if path.is_file() {
        let draft: ArticleDraft = read_draft(path)?;
        ArticleForm::from_draft(state.brand(), draft)?
    } else {
        let article = state.load_article(api, target, true).await?;
        if !article.is_live {
            return Err(AppError::Config(format!(
                "article {} is not a live article",
                article.id
            )));
        }
        ArticleForm::from_article(state.brand(), &article)
    };
    form.is_live = true;
    Ok(form)
}

fn read_draft<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

fn format_time(time: Option<chrono::DateTime<Utc>>) -> String {
    time.map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn html_to_text(html: &str) -> String {
    html2text::from_read(html.as_bytes(), 100).unwrap_or_else(|_| html.to_string())
}

fn flags(article: &Article) -> String {
    let mut flags = String::new();
    for (on, mark) in [
        (article.is_breaking, 'B'),
        (article.is_headline, 'H'),
        (article.is_topstory, 'T'),
        (article.is_live, 'L'),
    ] {
        flags.push(if on { mark } else { '.' });
    }
    flags
}

fn print_article_row(article: &Article) {
    println!(
        "{:<26} {} {:<16} {}  {}",
        article.id,
        flags(article),
        format_time(article.last_modified()),
        article.category,
        article.title
    );
}

fn print_articles(page: &Page<Article>) {
    if page.items.is_empty() {
        println!("No articles");
        return;
    }
    for article in &page.items {
        print_article_row(article);
    }
    print_page_footer(page.current_page, page.total_pages, page.total, page.has_next());
}

fn print_page_footer(current: u32, pages: u32, total: u64, more: bool) {
    let hint = if more {
        format!(", next with --page {}", current + 1)
    } else {
        String::new()
    };
    println!("-- page {current}/{pages} ({total} total{hint})");
}

fn print_slot(state: &AppState, slot: Slot) {
    println!("{}:", slot.label());
    let view = match slot {
        Slot::Headline => state.headline().into_iter().collect(),
        _ => state.slot_view(slot),
    };
    if view.is_empty() {
        println!("  (empty)");
    }
    for article in view {
        print!("  ");
        print_article_row(article);
    }
}

fn print_article(article: &Article) {
    println!("{}  {}", article.id, article.title);
    println!("{}", article.description);
    println!(
        "Category: {} {}",
        article.category,
        if article.subcategory.is_empty() {
            String::new()
        } else {
            format!("/ {}", article.subcategory.join(", "))
        }
    );
    if !article.tags.is_empty() {
        println!("Tags: {}", article.tags.join(", "));
    }
    if let Some(section) = &article.section {
        println!("Section: {}", section.name.as_deref().unwrap_or(&section.id));
    }
    if let Some(tag) = &article.livescore_tag {
        println!("Live score: {tag}");
    }
    println!(
        "Flags: {}  By {}  Updated {}",
        flags(article),
        article.creator,
        format_time(article.last_modified())
    );
    println!();
    match &article.content {
        ArticleContent::Html(html) => println!("{}", html_to_text(html)),
        ArticleContent::Updates(updates) => {
            for (i, update) in updates.iter().enumerate() {
                println!(
                    "{}{:>2}. [{}] {}",
                    if update.is_key { "*" } else { " " },
                    i + 1,
                    update.content_published_at.format("%H:%M"),
                    update.content_title
                );
                println!("{}", update.detail_text(96));
            }
            println!("{} key events", article.key_events.len());
        }
    }
}

fn print_posts(page: &Page<Post>) {
    if page.items.is_empty() {
        println!("Nothing found");
        return;
    }
    for post in &page.items {
        println!(
            "{:<26} {:<16} {}",
            post.id,
            format_time(post.updated_at.or(post.created_at)),
            post.title
        );
    }
    print_page_footer(page.current_page, page.total_pages, page.total, page.has_next());
}

fn print_section(section: &Section, now: chrono::DateTime<Utc>) {
    let status = if section.is_active_at(now) { "" } else { " (expired)" };
    println!(
        "{:>3} {:<8} {:<24} {:<8} {} articles{}",
        section.display_order,
        section.code,
        section.name,
        section.color,
        section.articles_count,
        status
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockApi;
    use crate::config::Config;
    use crate::models::Brand;

    fn state(dir: &tempfile::TempDir) -> AppState {
        AppState::initialize(&Config {
            session_path: dir.path().join("session.json").to_string_lossy().to_string(),
            ..Config::default()
        })
    }

    #[tokio::test]
    async fn article_edit_changes_only_given_fields() {
        let dir = tempfile::tempdir().unwrap();
        let api = MockApi::new();
        let seeded = api.seed_article(Brand::Ghanapolitan, "Original headline", false);
        let mut state = state(&dir);
        state.login(&api, "desk@example.com", "pw").await.unwrap();

        run(
            Command::Articles(ArticlesCommand::Edit(EditArticle {
                id: seeded.id.clone(),
                title: Some("Corrected headline".to_string()),
                topstory: Some(true),
                ..EditArticle::default()
            })),
            &mut state,
            &api,
        )
        .await
        .unwrap();

        let payload = api.last_payload().unwrap();
        assert_eq!(payload.get_text("title"), Some("Corrected headline"));
        assert_eq!(payload.get_text("isTopstory"), Some("true"));
        assert_eq!(payload.get_text("description"), Some("Seeded description text"));
        assert_eq!(state.top_stories()[0].id, seeded.id);
    }

    #[tokio::test]
    async fn live_form_rejects_regular_articles() {
        let dir = tempfile::tempdir().unwrap();
        let api = MockApi::new();
        let regular = api.seed_article(Brand::Ghanapolitan, "Budget read", false);
        let live = api.seed_article(Brand::Ghanapolitan, "Live: Budget", true);
        let mut state = state(&dir);
        state.login(&api, "desk@example.com", "pw").await.unwrap();

        assert!(live_form(&regular.id, &mut state, &api).await.is_err());
        let form = live_form(&live.id, &mut state, &api).await.unwrap();
        assert_eq!(form.updates.len(), 2);
        assert_eq!(form.key_events().len(), 1);
    }

    #[tokio::test]
    async fn live_form_reports_unknown_articles() {
        let dir = tempfile::tempdir().unwrap();
        let api = MockApi::new();
        let mut state = state(&dir);
        state.login(&api, "desk@example.com", "pw").await.unwrap();

        let err = live_form("missing", &mut state, &api).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn live_form_reads_draft_files() {
        let dir = tempfile::tempdir().unwrap();
        let draft = dir.path().join("match.toml");
        std::fs::write(
            &draft,
            r#"
title = "Live: Test Match"
description = "Minute by minute from Accra"
category = "Football"
creator = "Sports desk"

[[updates]]
title = "Kick-off"
detail = "<p>We are underway</p>"
"#,
        )
        .unwrap();
        let api = MockApi::new();
        let mut state = state(&dir);
        state.login(&api, "desk@example.com", "pw").await.unwrap();

        let form = live_form(draft.to_str().unwrap(), &mut state, &api)
            .await
            .unwrap();
        assert!(form.is_live);
        assert!(!form.is_edit());
        assert_eq!(form.updates.len(), 1);
    }

    #[tokio::test]
    async fn signed_out_mutations_are_refused() {
        let dir = tempfile::tempdir().unwrap();
        let api = MockApi::new();
        let mut state = state(&dir);
        let err = run(
            Command::Sections(SectionsCommand::Delete {
                id: "sec-1".to_string(),
            }),
            &mut state,
            &api,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
        assert_eq!(api.request_count(), 0);
    }
}
