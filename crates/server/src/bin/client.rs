use anyhow::{bail, Context};
use reqwest::header::{COOKIE, SET_COOKIE};
use serde::Deserialize;
use serde_json::{json, Value};

use domain::{Comment, CommentDraft, CommentNode, CommentThread, EntityId, Relation};

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:3000";

#[derive(Deserialize)]
struct CommentList {
    data: Vec<Comment>,
}

/// Smoke client: `client [relation]`, with `APERTURE_URL`, `APERTURE_LOGIN`,
/// `APERTURE_PASSWORD`, `APERTURE_COMMENT` and `APERTURE_PARENT_ID` read from
/// the environment. A parent id turns the comment into a reply.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let base_url = std::env::var("APERTURE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
    let relation = match std::env::args().nth(1) {
        Some(raw) => Relation::new(raw)?,
        None => Relation::article(1),
    };
    let parent_id = match std::env::var("APERTURE_PARENT_ID") {
        Ok(raw) => Some(
            raw.parse::<EntityId>()
                .context("APERTURE_PARENT_ID must be a comment id")?,
        ),
        Err(_) => None,
    };
    let client = reqwest::Client::new();
    println!("Starting Aperture test client against {}...", base_url);

    println!("\n[1/3] Checking session...");
    let resp = client
        .get(format!("{}/api/auth/session", base_url))
        .send()
        .await
        .context("Server unreachable")?;
    println!("   -> {} {}", resp.status(), resp.text().await?);

    println!("\n[2/3] Fetching comment thread for {}...", relation);
    let mut thread = fetch_thread(&client, &base_url, &relation).await?;
    print_thread(&thread);

    let (Ok(login), Ok(password)) = (
        std::env::var("APERTURE_LOGIN"),
        std::env::var("APERTURE_PASSWORD"),
    ) else {
        println!("\n[3/3] No APERTURE_LOGIN/APERTURE_PASSWORD set, skipping comment.");
        return Ok(());
    };

    println!("\n[3/3] Logging in and commenting...");
    let content = std::env::var("APERTURE_COMMENT")
        .unwrap_or_else(|_| "This is a message from the Aperture test client!".to_string());
    // 先在本地校验，空内容不发请求
    let draft = CommentDraft::new(&content, parent_id)?;

    let resp = client
        .post(format!("{}/api/login", base_url))
        .json(&json!({ "identifier": login, "password": password }))
        .send()
        .await?;
    if !resp.status().is_success() {
        bail!("Login failed: {}", resp.text().await?);
    }
    let cookie = resp
        .headers()
        .get(SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
        .context("Login response carried no session cookie")?;
    println!("   -> Logged in");

    let (path, payload) = match draft.parent_id {
        Some(parent) => (
            "reply",
            json!({ "content": draft.content, "relation": relation, "parentId": parent }),
        ),
        None => (
            "create",
            json!({ "content": draft.content, "relation": relation }),
        ),
    };
    let resp = client
        .post(format!("{}/api/comments/{}", base_url, path))
        .header(COOKIE, cookie)
        .json(&payload)
        .send()
        .await?;
    let status = resp.status();
    let body: Value = resp.json().await?;
    if !status.is_success() {
        println!("   -> ❌ Failed to post ({}): {}", status, body["message"]);
        return Ok(());
    }

    let created: Comment = serde_json::from_value(body["data"].clone())
        .context("Created comment missing from response")?;
    println!("   -> ✅ Posted comment #{}", created.id);

    // 本地合并，无需重新拉取
    match draft.parent_id {
        Some(parent) => thread.append_reply(parent, created)?,
        None => thread.insert_new(created),
    }
    print_thread(&thread);
    Ok(())
}

async fn fetch_thread(
    client: &reqwest::Client,
    base_url: &str,
    relation: &Relation,
) -> anyhow::Result<CommentThread> {
    let resp = client
        .get(format!("{}/api/comments/{}", base_url, relation))
        .send()
        .await?;
    if !resp.status().is_success() {
        bail!("Comment request failed: {}", resp.text().await?);
    }
    let list: CommentList = resp.json().await?;
    Ok(CommentThread::new(list.data))
}

fn print_thread(thread: &CommentThread) {
    println!("   -> {} comment(s):", thread.len());
    for node in &thread.render() {
        print_node(node, 1);
    }
}

fn print_node(node: &CommentNode, depth: usize) {
    let indent = "   ".repeat(depth + 1);
    match node {
        CommentNode::Visible {
            id,
            author_name,
            content,
            created_at,
            ..
        } => {
            let when = created_at
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default();
            println!("{}- #{} [{}] {}: {}", indent, id, when, author_name, content);
        }
        CommentNode::Removed {
            id, placeholder, ..
        } => {
            println!("{}- #{} {}", indent, id, placeholder);
        }
    }
    for reply in node.replies() {
        print_node(reply, depth + 1);
    }
}
