use cms::{Cms, CmsConfig, CmsError, FileUpload, Freshness};
use domain::{CommentDraft, Credentials, ProfileUpdate, Relation, ReportDraft};
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer, token: Option<&str>) -> Cms {
    Cms::new(CmsConfig {
        url: server.uri(),
        api_token: token.map(str::to_string),
        revalidate: Duration::from_secs(60),
        cache_capacity: cms::DEFAULT_CAPACITY,
    })
    .unwrap()
}

#[tokio::test]
async fn fetch_api_sends_token_and_caches() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/partners"))
        .and(query_param("populate", "*"))
        .and(header("authorization", "Bearer read-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "id": 1, "name": "Ferris Inc", "url": "https://ferris.rs" }],
            "meta": {}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let cms = client(&server, Some("read-token"));
    let first = cms.partners().await.unwrap();
    let second = cms.partners().await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first[0].name, "Ferris Inc");
}

#[tokio::test]
async fn no_store_bypasses_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .expect(2)
        .mount(&server)
        .await;

    let cms = client(&server, None);
    for _ in 0..2 {
        let v: Value = cms
            .fetch_api("tags", &json!({}), Freshness::NoStore)
            .await
            .unwrap();
        assert_eq!(v["data"], json!([]));
    }
}

#[tokio::test]
async fn non_success_carries_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/articles"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = client(&server, None)
        .fetch_api::<Value>("articles", &json!({}), Freshness::Revalidate)
        .await
        .unwrap_err();
    match err {
        CmsError::Status { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "boom");
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[tokio::test]
async fn category_descendant_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/categories"))
        .and(query_param("filters[slug][$eq]", "tech"))
        .and(query_param("populate", "children.children.children"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{
                "id": 1, "name": "Tech", "slug": "tech",
                "children": [
                    { "id": 2, "name": "AI", "slug": "ai", "children": [] },
                    { "id": 3, "name": "HW", "slug": "hw", "children": [{ "id": 4, "slug": "gpu" }] }
                ]
            }]
        })))
        .mount(&server)
        .await;

    let category = client(&server, None)
        .category_with_descendants("tech")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(category.descendant_ids(), vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn articles_in_categories_skips_empty_set() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let articles = client(&server, None).articles_in_categories(&[]).await.unwrap();
    assert!(articles.is_empty());
}

#[tokio::test]
async fn login_and_me() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/local"))
        .and(body_json(json!({ "identifier": "ferris@rust.dev", "password": "crab" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jwt": "user-jwt",
            "user": { "id": 7, "username": "ferris", "email": "ferris@rust.dev" }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/users/me"))
        .and(query_param("populate", "avatar"))
        .and(header("authorization", "Bearer user-jwt"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 7, "username": "ferris", "email": "ferris@rust.dev",
            "avatar": { "id": 3, "url": "/uploads/ferris.png" }
        })))
        .mount(&server)
        .await;

    let cms = client(&server, Some("read-token"));
    let session = cms
        .login(&Credentials::new("ferris@rust.dev", "crab").unwrap())
        .await
        .unwrap();
    assert_eq!(session.jwt, "user-jwt");

    let me = cms.me(&session.jwt).await.unwrap();
    assert_eq!(me.avatar_url(), Some("/uploads/ferris.png"));
}

#[tokio::test]
async fn login_failure_exposes_cms_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/local"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "data": null,
            "error": { "status": 400, "message": "Invalid identifier or password" }
        })))
        .mount(&server)
        .await;

    let err = client(&server, None)
        .login(&Credentials::new("x", "y").unwrap())
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(400));
    assert_eq!(
        err.upstream_message().as_deref(),
        Some("Invalid identifier or password")
    );
}

#[tokio::test]
async fn comments_list_and_reply() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/comments/api::article.article:23"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                { "id": 1, "content": "first", "children": [{ "id": 2, "content": "re" }] },
                { "id": 2, "content": "re", "children": [] }
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/comments/api::article.article:23"))
        .and(header("authorization", "Bearer user-jwt"))
        .and(body_json(json!({ "content": "me too", "threadOf": 1 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 3, "content": "me too", "blocked": false
        })))
        .mount(&server)
        .await;

    let cms = client(&server, None);
    let relation = Relation::article(23);

    let comments = cms.list_comments(&relation).await.unwrap();
    assert_eq!(comments.len(), 2);

    let draft = CommentDraft::new("me too", Some(1)).unwrap();
    let reply = cms.post_comment("user-jwt", &relation, &draft).await.unwrap();
    assert_eq!(reply.id, 3);
}

#[tokio::test]
async fn report_without_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/comments-reports/report/5"))
        .and(body_json(json!({ "content": "spam" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 1 })))
        .expect(1)
        .mount(&server)
        .await;

    client(&server, None)
        .report_comment(None, &ReportDraft::new(Some(5), "spam").unwrap())
        .await
        .unwrap();
}

#[tokio::test]
async fn avatar_upload_flow() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/upload"))
        .and(header("authorization", "Bearer user-jwt"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 11, "url": "/uploads/avatar.png", "width": 64, "height": 64 }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/users/7"))
        .and(body_json(json!({ "avatar": 11 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 7 })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/users/8"))
        .and(body_json(json!({ "bio": "hi" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 8 })))
        .expect(1)
        .mount(&server)
        .await;

    let cms = client(&server, None);
    let media = cms
        .upload(
            "user-jwt",
            FileUpload {
                file_name: "avatar.png".into(),
                content_type: Some("image/png".into()),
                bytes: vec![0x89, b'P', b'N', b'G'],
            },
        )
        .await
        .unwrap();
    assert_eq!(media.id, Some(11));

    cms.set_avatar("user-jwt", 7, 11).await.unwrap();

    let update = ProfileUpdate::new(Some(8), None, Some("hi".into())).unwrap();
    cms.update_user("user-jwt", &update).await.unwrap();
}
