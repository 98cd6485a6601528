//! Field changes, masks and the operator tabs.

use member_signup_integration_tests::TestApp;
use reqwest::StatusCode;

#[tokio::test]
async fn test_masked_field_returns_masked_input() {
    let app = TestApp::spawn().await;
    app.get("/").await;

    let (status, body) = app.post("/form/field/cell", &[("cell", "11987654321")]).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#"id="cell""#));
    assert!(body.contains(r#"value="(11) 98765-4321""#));
}

#[tokio::test]
async fn test_mask_truncates_extra_digits() {
    let app = TestApp::spawn().await;
    app.get("/").await;

    let (_, body) = app.post("/form/field/cep", &[("cep", "0131010099")]).await;
    assert!(body.contains(r#"value="01310-100""#));
}

#[tokio::test]
async fn test_plain_field_returns_no_content() {
    let app = TestApp::spawn().await;
    app.get("/").await;

    let (status, body) = app.post("/form/field/name", &[("name", "Maria")]).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_unknown_field_is_rejected() {
    let app = TestApp::spawn().await;
    app.get("/").await;

    let (status, _) = app.post("/form/field/password", &[("password", "x")]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_invalid_chip_type_is_rejected() {
    let app = TestApp::spawn().await;
    app.get("/").await;

    let (status, _) = app
        .post("/form/field/typeChip", &[("typeChip", "nano")])
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_field_change_without_page_opens_a_form() {
    let app = TestApp::spawn().await;

    let (status, body) = app.post("/form/field/cpf", &[("cpf", "12345678901")]).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#"value="123.456.789-01""#));
}

#[tokio::test]
async fn test_operator_switch_lists_its_plans() {
    let app = TestApp::spawn().await;
    let (_, page) = app.get("/").await;
    assert!(page.contains("40GB COM LIGACAO VIVO 49.90"));

    let (status, body) = app.post("/form/operator/TIM", &[]).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#"id="plans""#));
    assert!(body.contains("200GB SEM LIGAÇÃO 159.90"));
    assert!(!body.contains("40GB COM LIGACAO VIVO 49.90"));
}

#[tokio::test]
async fn test_operator_switch_clears_plan() {
    let app = TestApp::spawn().await;
    app.get("/").await;

    let (status, _) = app.post("/form/field/plan_id", &[("plan_id", "69")]).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = app.post("/form/operator/VIVO", &[]).await;
    assert!(!body.contains(r#"value="69" selected"#));
}

#[tokio::test]
async fn test_plan_of_other_operator_is_rejected() {
    let app = TestApp::spawn().await;
    app.get("/").await;

    let (status, _) = app.post("/form/field/plan_id", &[("plan_id", "154")]).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    app.post("/form/operator/TIM", &[]).await;
    let (status, _) = app.post("/form/field/plan_id", &[("plan_id", "154")]).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_unknown_operator_is_rejected() {
    let app = TestApp::spawn().await;
    app.get("/").await;

    let (status, _) = app.post("/form/operator/OI", &[]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_page_mount_starts_a_fresh_draft() {
    let app = TestApp::spawn().await;
    app.get("/").await;
    app.post("/form/field/cpf", &[("cpf", "12345678901")]).await;

    let (_, page) = app.get("/").await;
    assert!(!page.contains("123.456.789-01"));
}
