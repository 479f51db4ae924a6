/// Integration tests for the PipeDesk API
///
/// End-to-end coverage over the HTTP surface:
/// - session cookie authentication
/// - workspace membership and role gates
/// - deal automation visible through the API
/// - checklist materialization and toggling
/// - member-removal invariants
///
/// These tests require a running PostgreSQL database (DATABASE_URL).

mod common;

use axum::http::StatusCode;
use common::{error_code, TestContext};
use pipedesk_shared::models::member::MemberRole;
use pipedesk_shared::models::task::Task;
use serde_json::json;

#[tokio::test]
async fn test_health() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) = ctx.send("GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_register_login_me_flow() {
    let ctx = TestContext::new().await.unwrap();
    let email = format!("flow-{}@example.com", uuid::Uuid::new_v4());

    let (status, body) = ctx
        .send(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({ "email": email, "password": "Sup3r-secret", "name": "Flow" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["user"]["email"], email.as_str());
    // The password hash must never appear in responses.
    assert!(body["data"]["user"].get("password_hash").is_none());

    let (status, body) = ctx
        .send(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": email, "password": "Sup3r-secret" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, body) = ctx
        .send(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": email, "password": "wrong-password" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&body), "UNAUTHORIZED");
}

#[tokio::test]
async fn test_me_without_cookie_is_unauthorized() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) = ctx.send("GET", "/api/auth/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(error_code(&body), "UNAUTHORIZED");
}

#[tokio::test]
async fn test_unknown_workspace_slug_is_not_found() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) = ctx
        .send(
            "GET",
            "/api/workspaces/no-such-workspace/deals",
            Some(&ctx.owner_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), "WORKSPACE_NOT_FOUND");
}

#[tokio::test]
async fn test_non_member_is_forbidden_even_with_platform_admin_flag() {
    let ctx = TestContext::new().await.unwrap();
    let (_admin, token) = ctx.create_platform_admin().await.unwrap();

    // Workspace RBAC ignores the global flag entirely.
    let (status, body) = ctx
        .send("GET", &ctx.ws_uri("/deals"), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_code(&body), "FORBIDDEN");

    // The same user is welcome on the platform surface.
    let (status, _body) = ctx
        .send("GET", "/api/platform/stats", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    // And a workspace member without the flag is not.
    let (status, body) = ctx
        .send("GET", "/api/platform/stats", Some(&ctx.owner_token), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_code(&body), "FORBIDDEN");
}

#[tokio::test]
async fn test_viewer_reads_but_cannot_mutate() {
    let ctx = TestContext::new().await.unwrap();
    let (_viewer, token) = ctx.create_member(MemberRole::Viewer).await.unwrap();

    let (status, _body) = ctx
        .send("GET", &ctx.ws_uri("/deals"), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = ctx
        .send(
            "POST",
            &ctx.ws_uri("/deals"),
            Some(&token),
            Some(json!({ "title": "Viewer deal" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_code(&body), "FORBIDDEN");
}

#[tokio::test]
async fn test_agent_updates_but_cannot_delete() {
    let ctx = TestContext::new().await.unwrap();
    let (_agent, token) = ctx.create_member(MemberRole::Agent).await.unwrap();

    let (status, body) = ctx
        .send(
            "POST",
            &ctx.ws_uri("/deals"),
            Some(&token),
            Some(json!({ "title": "Agent deal", "stage": "lead" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let deal_id = body["data"]["deal"]["id"].as_str().unwrap().to_string();

    let (status, _body) = ctx
        .send(
            "PATCH",
            &ctx.ws_uri(&format!("/deals/{}", deal_id)),
            Some(&token),
            Some(json!({ "amount": 50000.0 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = ctx
        .send(
            "DELETE",
            &ctx.ws_uri(&format!("/deals/{}", deal_id)),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_code(&body), "FORBIDDEN");
}

#[tokio::test]
async fn test_deal_creation_fires_automation() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) = ctx
        .send(
            "POST",
            &ctx.ws_uri("/deals"),
            Some(&ctx.owner_token),
            Some(json!({ "title": "Automated deal", "stage": "lead" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    // Side effects are not reported in the response.
    assert!(body["data"].get("tasks").is_none());

    let tasks = Task::list_by_workspace(&ctx.db, ctx.workspace.id)
        .await
        .unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].title, "Первичный контакт");
}

#[tokio::test]
async fn test_stage_change_fires_automation_and_noop_does_not() {
    let ctx = TestContext::new().await.unwrap();

    let (_, body) = ctx
        .send(
            "POST",
            &ctx.ws_uri("/deals"),
            Some(&ctx.owner_token),
            Some(json!({ "title": "Pipeline deal", "stage": "lead" })),
        )
        .await;
    let deal_id = body["data"]["deal"]["id"].as_str().unwrap().to_string();

    let before = Task::list_by_workspace(&ctx.db, ctx.workspace.id)
        .await
        .unwrap()
        .len();

    // Same stage: no trigger.
    let (status, _) = ctx
        .send(
            "PATCH",
            &ctx.ws_uri(&format!("/deals/{}", deal_id)),
            Some(&ctx.owner_token),
            Some(json!({ "stage": "lead" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let after_noop = Task::list_by_workspace(&ctx.db, ctx.workspace.id)
        .await
        .unwrap()
        .len();
    assert_eq!(after_noop, before);

    // Different stage: one task from the qualification template.
    let (status, body) = ctx
        .send(
            "PATCH",
            &ctx.ws_uri(&format!("/deals/{}", deal_id)),
            Some(&ctx.owner_token),
            Some(json!({ "stage": "qualification" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["deal"]["stage"], "qualification");

    let tasks = Task::list_by_workspace(&ctx.db, ctx.workspace.id)
        .await
        .unwrap();
    assert_eq!(tasks.len(), before + 1);
    assert!(tasks.iter().any(|t| t.title == "Провести квалификацию"));
}

#[tokio::test]
async fn test_checklist_view_and_toggle() {
    let ctx = TestContext::new().await.unwrap();

    let (_, body) = ctx
        .send(
            "POST",
            &ctx.ws_uri("/deals"),
            Some(&ctx.owner_token),
            Some(json!({ "title": "Checklist deal", "stage": "negotiation" })),
        )
        .await;
    let deal_id = body["data"]["deal"]["id"].as_str().unwrap().to_string();
    let checklist_uri = ctx.ws_uri(&format!("/deals/{}/checklist", deal_id));

    // First view materializes exactly three incomplete items.
    let (status, body) = ctx
        .send("GET", &checklist_uri, Some(&ctx.owner_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["totalCount"], 3);
    assert_eq!(body["data"]["completedCount"], 0);
    assert_eq!(body["data"]["checklistComplete"], false);
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 3);

    // Second view: no duplicates.
    let (_, body) = ctx
        .send("GET", &checklist_uri, Some(&ctx.owner_token), None)
        .await;
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 3);

    // Toggle one item complete.
    let (status, body) = ctx
        .send(
            "POST",
            &checklist_uri,
            Some(&ctx.owner_token),
            Some(json!({ "title": "Скидка согласована", "completed": true })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["item"]["completed"], true);
    assert_eq!(body["data"]["completedCount"], 1);
    assert_eq!(body["data"]["totalCount"], 3);
    assert_eq!(body["data"]["checklistComplete"], false);

    // And back.
    let (_, body) = ctx
        .send(
            "POST",
            &checklist_uri,
            Some(&ctx.owner_token),
            Some(json!({ "title": "Скидка согласована", "completed": false })),
        )
        .await;
    assert_eq!(body["data"]["item"]["completed"], false);
    assert_eq!(body["data"]["item"]["completed_by"], serde_json::Value::Null);
    assert_eq!(body["data"]["completedCount"], 0);
}

#[tokio::test]
async fn test_member_cannot_remove_self() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) = ctx
        .send(
            "DELETE",
            &ctx.ws_uri(&format!("/members/{}", ctx.owner.id)),
            Some(&ctx.owner_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_code(&body), "FORBIDDEN");
    assert!(body["error"]["message"]
        .as_str()
        .unwrap_or("")
        .contains("yourself"));
}

#[tokio::test]
async fn test_last_owner_cannot_be_removed() {
    let ctx = TestContext::new().await.unwrap();
    let (_admin, admin_token) = ctx.create_member(MemberRole::Admin).await.unwrap();

    // The fixture owner is the only OWNER.
    let (status, body) = ctx
        .send(
            "DELETE",
            &ctx.ws_uri(&format!("/members/{}", ctx.owner.id)),
            Some(&admin_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error"]["message"]
        .as_str()
        .unwrap_or("")
        .contains("last owner"));

    // With a second OWNER present the removal goes through.
    let (_second_owner, _) = ctx.create_member(MemberRole::Owner).await.unwrap();
    let (status, _body) = ctx
        .send(
            "DELETE",
            &ctx.ws_uri(&format!("/members/{}", ctx.owner.id)),
            Some(&admin_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_duplicate_invite_conflicts() {
    let ctx = TestContext::new().await.unwrap();
    let email = format!("invitee-{}@example.com", uuid::Uuid::new_v4());

    let (status, _body) = ctx
        .send(
            "POST",
            &ctx.ws_uri("/invites"),
            Some(&ctx.owner_token),
            Some(json!({ "email": email, "role": "AGENT" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = ctx
        .send(
            "POST",
            &ctx.ws_uri("/invites"),
            Some(&ctx.owner_token),
            Some(json!({ "email": email, "role": "AGENT" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&body), "CONFLICT");
}

#[tokio::test]
async fn test_cross_workspace_deal_is_invisible() {
    let ctx = TestContext::new().await.unwrap();

    let (_, body) = ctx
        .send(
            "POST",
            &ctx.ws_uri("/deals"),
            Some(&ctx.owner_token),
            Some(json!({ "title": "Private deal" })),
        )
        .await;
    let deal_id = body["data"]["deal"]["id"].as_str().unwrap().to_string();

    // A second workspace owned by the same user.
    let (status, body) = ctx
        .send(
            "POST",
            "/api/workspaces",
            Some(&ctx.owner_token),
            Some(json!({
                "name": "Other",
                "slug": format!("other-{}", uuid::Uuid::new_v4().simple()),
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let other_slug = body["data"]["workspace"]["slug"].as_str().unwrap().to_string();

    // The deal does not exist through the other tenant's scope.
    let (status, body) = ctx
        .send(
            "GET",
            &format!("/api/workspaces/{}/deals/{}", other_slug, deal_id),
            Some(&ctx.owner_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), "NOT_FOUND");
}

#[tokio::test]
async fn test_permissions_endpoint_reflects_role() {
    let ctx = TestContext::new().await.unwrap();
    let (_viewer, viewer_token) = ctx.create_member(MemberRole::Viewer).await.unwrap();
    let (_agent, agent_token) = ctx.create_member(MemberRole::Agent).await.unwrap();

    let (status, body) = ctx
        .send("GET", &ctx.ws_uri("/permissions"), Some(&viewer_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["role"], "VIEWER");
    assert!(body["data"]["actions"].as_array().unwrap().is_empty());

    let (_, body) = ctx
        .send("GET", &ctx.ws_uri("/permissions"), Some(&agent_token), None)
        .await;
    let actions: Vec<&str> = body["data"]["actions"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|a| a.as_str())
        .collect();
    assert!(actions.contains(&"deal.update.stage"));
    assert!(!actions.contains(&"deal.delete"));
}
