mod common;

use common::test_server::{SUPERADMIN_PASSWORD, TestServer};
use reqwest::StatusCode;
use serde_json::{Value, json};
use shifttrack::cli::credentials::Credentials;
use shifttrack::cli::http_client::ApiClient;

async fn get(server: &TestServer, token: &str, path: &str) -> (StatusCode, Value) {
    let resp = reqwest::Client::new()
        .get(server.api_url(path))
        .bearer_auth(token)
        .send()
        .await
        .expect("send request");
    let status = resp.status();
    let body = resp.json().await.unwrap_or(Value::Null);
    (status, body)
}

async fn post(server: &TestServer, token: &str, path: &str, body: &Value) -> (StatusCode, Value) {
    let resp = reqwest::Client::new()
        .post(server.api_url(path))
        .bearer_auth(token)
        .json(body)
        .send()
        .await
        .expect("send request");
    let status = resp.status();
    let body = resp.json().await.unwrap_or(Value::Null);
    (status, body)
}

async fn patch(server: &TestServer, token: &str, path: &str, body: &Value) -> (StatusCode, Value) {
    let resp = reqwest::Client::new()
        .patch(server.api_url(path))
        .bearer_auth(token)
        .json(body)
        .send()
        .await
        .expect("send request");
    let status = resp.status();
    let body = resp.json().await.unwrap_or(Value::Null);
    (status, body)
}

async fn delete(server: &TestServer, token: &str, path: &str) -> StatusCode {
    reqwest::Client::new()
        .delete(server.api_url(path))
        .bearer_auth(token)
        .send()
        .await
        .expect("send request")
        .status()
}

fn id_by_name(items: &Value, name: &str) -> String {
    items
        .as_array()
        .expect("expected an array")
        .iter()
        .find(|item| item["name"] == name)
        .unwrap_or_else(|| panic!("no item named {name}"))["id"]
        .as_str()
        .expect("id not a string")
        .to_string()
}

async fn seeded_section_id(server: &TestServer, token: &str, name: &str) -> String {
    let (status, body) = get(server, token, "/sections").await;
    assert_eq!(status, StatusCode::OK);
    id_by_name(&body["data"], name)
}

async fn seeded_shift_id(server: &TestServer, token: &str, name: &str) -> String {
    let (status, body) = get(server, token, "/shifts").await;
    assert_eq!(status, StatusCode::OK);
    id_by_name(&body["data"], name)
}

/// Creates a user with the named role and returns its id.
async fn create_user(
    server: &TestServer,
    admin_token: &str,
    username: &str,
    password: &str,
    role_name: &str,
) -> String {
    let (status, roles) = get(server, admin_token, "/roles").await;
    assert_eq!(status, StatusCode::OK);
    let role_id = id_by_name(&roles["data"], role_name);

    let (status, body) = post(
        server,
        admin_token,
        "/users",
        &json!({"username": username, "password": password, "role_id": role_id}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create user failed: {body}");
    body["data"]["id"].as_str().expect("user id").to_string()
}

#[tokio::test]
async fn health_endpoint_responds() {
    let server = TestServer::start().await;

    let resp = reqwest::get(format!("{}/health", server.base_url))
        .await
        .expect("health request");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn login_returns_token_and_user_without_password() {
    let server = TestServer::start().await;

    let (status, body) = post(
        &server,
        "",
        "/auth/login",
        &json!({"username": "superadmin", "password": SUPERADMIN_PASSWORD}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["access_token"].is_string());

    let user = &body["data"]["user"];
    assert_eq!(user["username"], "superadmin");
    assert_eq!(user["role"]["name"], "SuperAdmin");
    assert!(user.get("password").is_none());
    assert!(user.get("password_hash").is_none());
}

#[tokio::test]
async fn login_with_wrong_password_returns_401_and_no_token() {
    let server = TestServer::start().await;

    let (status, body) = post(
        &server,
        "",
        "/auth/login",
        &json!({"username": "superadmin", "password": "wrong"}),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["data"].is_null());
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn login_with_unknown_username_returns_401() {
    let server = TestServer::start().await;

    let (status, _) = post(
        &server,
        "",
        "/auth/login",
        &json!({"username": "nobody", "password": "whatever"}),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_revokes_the_session() {
    let server = TestServer::start().await;
    let token = server.superadmin_token().await;

    let (status, _) = get(&server, &token, "/sections").await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = post(&server, &token, "/auth/logout", &json!({})).await;
    assert_eq!(status, StatusCode::OK, "logout failed: {body}");

    // The revoked token no longer authenticates
    let (status, _) = get(&server, &token, "/sections").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // A fresh login issues a working session
    let token = server.superadmin_token().await;
    let (status, _) = get(&server, &token, "/sections").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn password_change_revokes_existing_sessions() {
    let server = TestServer::start().await;
    let admin_token = server.superadmin_token().await;

    let user_id = create_user(&server, &admin_token, "rotated", "oldpw", "User").await;
    let old_token = server.login("rotated", "oldpw").await;

    let (status, _) = get(&server, &old_token, "/sections").await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = patch(
        &server,
        &admin_token,
        &format!("/users/{user_id}"),
        &json!({"password": "newpw"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "password change failed: {body}");

    let (status, _) = get(&server, &old_token, "/sections").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let new_token = server.login("rotated", "newpw").await;
    let (status, _) = get(&server, &new_token, "/sections").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn requests_without_token_are_rejected() {
    let server = TestServer::start().await;

    let resp = reqwest::Client::new()
        .get(server.api_url("/sections"))
        .send()
        .await
        .expect("send request");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn init_seeds_sections_shifts_and_roles() {
    let server = TestServer::start().await;
    let token = server.superadmin_token().await;

    let (_, sections) = get(&server, &token, "/sections").await;
    let names: Vec<&str> = sections["data"]
        .as_array()
        .expect("sections array")
        .iter()
        .map(|s| s["name"].as_str().expect("name"))
        .collect();
    assert!(names.contains(&"CCS"));
    assert!(names.contains(&"BAF"));
    assert!(names.contains(&"Slitter"));

    let (_, shifts) = get(&server, &token, "/shifts").await;
    let first = shifts["data"]
        .as_array()
        .expect("shifts array")
        .iter()
        .find(|s| s["name"] == "1st Shift")
        .expect("1st shift seeded");
    assert_eq!(first["start_time"], "07:00:00");
    assert_eq!(first["end_time"], "15:00:00");

    let (_, roles) = get(&server, &token, "/roles").await;
    assert_eq!(roles["data"].as_array().expect("roles array").len(), 3);
}

#[tokio::test]
async fn regular_users_cannot_manage_reference_data() {
    let server = TestServer::start().await;
    let admin_token = server.superadmin_token().await;

    create_user(&server, &admin_token, "worker", "workerpw", "User").await;
    let worker_token = server.login("worker", "workerpw").await;

    let (status, _) = post(&server, &worker_token, "/sections", &json!({"name": "New"})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = get(&server, &worker_token, "/users").await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = get(&server, &worker_token, "/records").await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Reads of reference data are open to any authenticated user
    let (status, _) = get(&server, &worker_token, "/sections").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn only_superadmin_can_delete_reference_data() {
    let server = TestServer::start().await;
    let super_token = server.superadmin_token().await;

    create_user(&server, &super_token, "manager", "managerpw", "Admin").await;
    let admin_token = server.login("manager", "managerpw").await;

    let (status, body) = post(&server, &admin_token, "/sections", &json!({"name": "Annex"})).await;
    assert_eq!(status, StatusCode::CREATED);
    let section_id = body["data"]["id"].as_str().expect("section id").to_string();

    let status = delete(&server, &admin_token, &format!("/sections/{section_id}")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let status = delete(&server, &super_token, &format!("/sections/{section_id}")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = get(&server, &super_token, &format!("/sections/{section_id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_can_rename_sections_and_adjust_shift_times() {
    let server = TestServer::start().await;
    let token = server.superadmin_token().await;

    let (status, body) = post(&server, &token, "/sections", &json!({"name": "Paintline"})).await;
    assert_eq!(status, StatusCode::CREATED);
    let section_id = body["data"]["id"].as_str().expect("section id").to_string();

    let (status, body) = patch(
        &server,
        &token,
        &format!("/sections/{section_id}"),
        &json!({"name": "Paint Line"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Paint Line");

    let shift_id = seeded_shift_id(&server, &token, "3rd Shift").await;
    let (status, body) = patch(
        &server,
        &token,
        &format!("/shifts/{shift_id}"),
        &json!({"end_time": "06:30:00"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["end_time"], "06:30:00");
}

#[tokio::test]
async fn duplicate_section_name_is_conflict() {
    let server = TestServer::start().await;
    let token = server.superadmin_token().await;

    let (status, _) = post(&server, &token, "/sections", &json!({"name": "CCS"})).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn shift_times_are_validated() {
    let server = TestServer::start().await;
    let token = server.superadmin_token().await;

    let (status, _) = post(
        &server,
        &token,
        "/shifts",
        &json!({"name": "4th", "start_time": "7am", "end_time": "15:00:00"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let shift_id = seeded_shift_id(&server, &token, "1st Shift").await;
    let (status, _) = patch(
        &server,
        &token,
        &format!("/shifts/{shift_id}"),
        &json!({"end_time": "25:00:00"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn get_missing_record_is_not_found() {
    let server = TestServer::start().await;
    let token = server.superadmin_token().await;

    let (status, body) = get(&server, &token, "/records/does-not-exist").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn create_record_then_read_it_back() {
    let server = TestServer::start().await;
    let admin_token = server.superadmin_token().await;

    create_user(&server, &admin_token, "operator", "operatorpw", "User").await;
    let token = server.login("operator", "operatorpw").await;

    let section_id = seeded_section_id(&server, &token, "CCS").await;
    let shift_id = seeded_shift_id(&server, &token, "1st Shift").await;

    let (status, body) = post(
        &server,
        &token,
        "/records",
        &json!({
            "section_id": section_id,
            "shift_id": shift_id,
            "detail": {
                "section": "ccs",
                "total_movements": 5,
                "down_time": 2.5,
                "total_trucks_in": 3,
                "issues": "forklift down an hour"
            }
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create record failed: {body}");

    let record_id = body["data"]["id"].as_str().expect("record id").to_string();
    assert_eq!(body["data"]["user"]["username"], "operator");

    let (status, body) = get(&server, &token, &format!("/records/{record_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["section"]["name"], "CCS");
    assert_eq!(body["data"]["shift"]["name"], "1st Shift");
    assert_eq!(body["data"]["detail"]["section"], "ccs");
    assert_eq!(body["data"]["detail"]["total_movements"], 5);
    assert_eq!(body["data"]["detail"]["down_time"], 2.5);
    assert_eq!(body["data"]["detail"]["issues"], "forklift down an hour");

    // Visible in the owner's listing and in the admin listing
    let (_, body) = get(&server, &token, "/records/my-records").await;
    let mine = body["data"].as_array().expect("records array");
    assert!(mine.iter().any(|r| r["id"] == record_id.as_str()));

    let (_, body) = get(&server, &admin_token, "/records").await;
    let all = body["data"].as_array().expect("records array");
    assert!(all.iter().any(|r| r["id"] == record_id.as_str()));
}

#[tokio::test]
async fn record_detail_must_match_section() {
    let server = TestServer::start().await;
    let token = server.superadmin_token().await;

    let baf_id = seeded_section_id(&server, &token, "BAF").await;
    let shift_id = seeded_shift_id(&server, &token, "2nd Shift").await;

    let (status, body) = post(
        &server,
        &token,
        "/records",
        &json!({
            "section_id": baf_id,
            "shift_id": shift_id,
            "detail": {"section": "ccs", "total_movements": 1}
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn record_create_for_other_user_requires_admin() {
    let server = TestServer::start().await;
    let admin_token = server.superadmin_token().await;

    let other_id = create_user(&server, &admin_token, "other", "otherpw", "User").await;
    create_user(&server, &admin_token, "worker2", "worker2pw", "User").await;
    let worker_token = server.login("worker2", "worker2pw").await;

    let section_id = seeded_section_id(&server, &worker_token, "BAF").await;
    let shift_id = seeded_shift_id(&server, &worker_token, "3rd Shift").await;

    let (status, _) = post(
        &server,
        &worker_token,
        "/records",
        &json!({"user_id": other_id, "section_id": section_id, "shift_id": shift_id}),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // An admin may file on another user's behalf
    let (status, body) = post(
        &server,
        &admin_token,
        "/records",
        &json!({"user_id": other_id, "section_id": section_id, "shift_id": shift_id}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["user"]["username"], "other");
}

#[tokio::test]
async fn record_patch_rejects_unknown_fields() {
    let server = TestServer::start().await;
    let token = server.superadmin_token().await;

    let section_id = seeded_section_id(&server, &token, "Slitter").await;
    let shift_id = seeded_shift_id(&server, &token, "1st Shift").await;

    let (status, body) = post(
        &server,
        &token,
        "/records",
        &json!({"section_id": section_id, "shift_id": shift_id}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let record_id = body["data"]["id"].as_str().expect("record id").to_string();

    // created_at and user_id are immutable; a patch naming them is an error
    let (status, _) = patch(
        &server,
        &token,
        &format!("/records/{record_id}"),
        &json!({"created_at": "2020-01-01T00:00:00Z"}),
    )
    .await;
    assert!(status.is_client_error(), "expected 4xx, got {status}");

    let (status, _) = patch(
        &server,
        &token,
        &format!("/records/{record_id}"),
        &json!({"user_id": "someone-else"}),
    )
    .await;
    assert!(status.is_client_error(), "expected 4xx, got {status}");

    // The record is unchanged
    let (status, body) = get(&server, &token, &format!("/records/{record_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user"]["username"], "superadmin");
}

#[tokio::test]
async fn record_patch_moves_record_and_replaces_detail() {
    let server = TestServer::start().await;
    let token = server.superadmin_token().await;

    let ccs_id = seeded_section_id(&server, &token, "CCS").await;
    let baf_id = seeded_section_id(&server, &token, "BAF").await;
    let shift_id = seeded_shift_id(&server, &token, "1st Shift").await;

    let (status, body) = post(
        &server,
        &token,
        "/records",
        &json!({
            "section_id": ccs_id,
            "shift_id": shift_id,
            "detail": {"section": "ccs", "total_movements": 2}
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let record_id = body["data"]["id"].as_str().expect("record id").to_string();

    // Moving to BAF while keeping the CCS detail is rejected
    let (status, _) = patch(
        &server,
        &token,
        &format!("/records/{record_id}"),
        &json!({"section_id": baf_id}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Moving with a matching detail succeeds
    let (status, body) = patch(
        &server,
        &token,
        &format!("/records/{record_id}"),
        &json!({
            "section_id": baf_id,
            "detail": {"section": "baf", "production_count": 10}
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["section"]["name"], "BAF");
    assert_eq!(body["data"]["detail"]["section"], "baf");
    assert_eq!(body["data"]["detail"]["production_count"], 10);
}

#[tokio::test]
async fn delete_record_requires_admin() {
    let server = TestServer::start().await;
    let admin_token = server.superadmin_token().await;

    create_user(&server, &admin_token, "worker3", "worker3pw", "User").await;
    let worker_token = server.login("worker3", "worker3pw").await;

    let section_id = seeded_section_id(&server, &worker_token, "CCS").await;
    let shift_id = seeded_shift_id(&server, &worker_token, "2nd Shift").await;

    let (status, body) = post(
        &server,
        &worker_token,
        "/records",
        &json!({"section_id": section_id, "shift_id": shift_id}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let record_id = body["data"]["id"].as_str().expect("record id").to_string();

    let status = delete(&server, &worker_token, &format!("/records/{record_id}")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let status = delete(&server, &admin_token, &format!("/records/{record_id}")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = get(&server, &admin_token, &format!("/records/{record_id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn visible_records_fall_back_to_own_records_only_on_forbidden() {
    let server = TestServer::start().await;
    let admin_token = server.superadmin_token().await;

    create_user(&server, &admin_token, "reporter", "reporterpw", "User").await;
    let worker_token = server.login("reporter", "reporterpw").await;

    let section_id = seeded_section_id(&server, &worker_token, "CCS").await;
    let shift_id = seeded_shift_id(&server, &worker_token, "1st Shift").await;
    let (status, body) = post(
        &server,
        &worker_token,
        "/records",
        &json!({"section_id": section_id, "shift_id": shift_id}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let record_id = body["data"]["id"].as_str().expect("record id").to_string();

    // A non-admin is forbidden from /records, so the client falls back to
    // their own records
    let base_url = server.base_url.clone();
    let records = tokio::task::spawn_blocking(move || {
        let client = ApiClient::new(&Credentials {
            server_url: base_url,
            token: worker_token,
        })
        .expect("build client");
        client.fetch_visible_records().expect("fetch records")
    })
    .await
    .expect("join blocking task");
    assert!(records.iter().any(|r| r.record.id == record_id));

    // A connection failure propagates instead of being read as a role
    let result = tokio::task::spawn_blocking(|| {
        let client = ApiClient::new(&Credentials {
            server_url: "http://127.0.0.1:1".to_string(),
            token: "shifttrack_deadbeef_000000000000000000000000".to_string(),
        })
        .expect("build client");
        client.fetch_visible_records()
    })
    .await
    .expect("join blocking task");
    assert!(result.is_err());
}

#[tokio::test]
async fn duplicate_username_is_conflict() {
    let server = TestServer::start().await;
    let token = server.superadmin_token().await;

    create_user(&server, &token, "dupe", "dupepw", "User").await;

    let (status, roles) = get(&server, &token, "/roles").await;
    assert_eq!(status, StatusCode::OK);
    let role_id = id_by_name(&roles["data"], "User");

    let (status, _) = post(
        &server,
        &token,
        "/users",
        &json!({"username": "dupe", "password": "dupepw", "role_id": role_id}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn only_superadmin_can_change_roles() {
    let server = TestServer::start().await;
    let super_token = server.superadmin_token().await;

    create_user(&server, &super_token, "manager2", "manager2pw", "Admin").await;
    let target_id = create_user(&server, &super_token, "promotee", "promoteepw", "User").await;
    let admin_token = server.login("manager2", "manager2pw").await;

    let (status, roles) = get(&server, &admin_token, "/roles").await;
    assert_eq!(status, StatusCode::OK);
    let admin_role_id = id_by_name(&roles["data"], "Admin");

    let (status, _) = patch(
        &server,
        &admin_token,
        &format!("/users/{target_id}"),
        &json!({"role_id": admin_role_id}),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = patch(
        &server,
        &super_token,
        &format!("/users/{target_id}"),
        &json!({"role_id": admin_role_id}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["role"]["name"], "Admin");
}

#[tokio::test]
async fn expired_or_garbage_tokens_are_unauthorized() {
    let server = TestServer::start().await;

    let resp = reqwest::Client::new()
        .get(server.api_url("/sections"))
        .bearer_auth("shifttrack_deadbeef_notarealtokenatall")
        .send()
        .await
        .expect("send request");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = reqwest::Client::new()
        .get(server.api_url("/sections"))
        .header("Authorization", "Basic dXNlcjpwYXNz")
        .send()
        .await
        .expect("send request");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
