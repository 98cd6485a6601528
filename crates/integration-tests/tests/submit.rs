//! Registration submission.

use std::time::Duration;

use member_signup_integration_tests::{SECOND_REFERRER_ID, TestApp, complete_form};
use reqwest::StatusCode;

#[tokio::test]
async fn test_successful_submission_resets_form() {
    let app = TestApp::spawn().await;
    app.get(&format!("/{SECOND_REFERRER_ID}")).await;

    let (status, body) = app.post("/form/submit", &complete_form()).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Cadastro realizado com sucesso!"));
    assert!(body.contains("message-success"));
    assert!(!body.contains("123.456.789-01"));
    assert!(!body.contains("Maria Silva"));

    let submissions = app.upstream.submissions();
    assert_eq!(submissions.len(), 1);
    let payload = &submissions[0];
    assert_eq!(payload["cpf"], "12345678901");
    assert_eq!(payload["cell"], "11987654321");
    assert_eq!(payload["phone"], "1133334444");
    assert_eq!(payload["cep"], "01310100");
    assert_eq!(payload["name"], "Maria Silva");
    assert_eq!(payload["typeChip"], "eSim");
    assert_eq!(payload["plan_id"], "69");
    assert_eq!(payload["representative_id"], SECOND_REFERRER_ID);
}

#[tokio::test]
async fn test_rejected_submission_keeps_values() {
    let app = TestApp::spawn().await;
    app.upstream
        .set_registration_status(StatusCode::UNPROCESSABLE_ENTITY);
    app.get("/").await;

    let (status, body) = app.post("/form/submit", &complete_form()).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Erro ao enviar cadastro. Tente novamente."));
    assert!(body.contains("message-error"));
    assert!(body.contains(r#"value="123.456.789-01""#));
    assert!(body.contains(r#"value="Maria Silva""#));
    assert_eq!(app.upstream.submissions().len(), 1);
}

#[tokio::test]
async fn test_retry_after_failure_succeeds() {
    let app = TestApp::spawn().await;
    app.upstream
        .set_registration_status(StatusCode::INTERNAL_SERVER_ERROR);
    app.get("/").await;
    app.post("/form/submit", &complete_form()).await;

    app.upstream.set_registration_status(StatusCode::OK);
    let (_, body) = app.post("/form/submit", &complete_form()).await;

    assert!(body.contains("Cadastro realizado com sucesso!"));
    assert!(!body.contains("Erro ao enviar cadastro"));
    assert_eq!(app.upstream.submissions().len(), 2);
}

#[tokio::test]
async fn test_incomplete_submission_is_blocked() {
    let app = TestApp::spawn().await;
    app.get("/").await;

    let values: Vec<_> = complete_form()
        .into_iter()
        .filter(|(name, _)| *name != "name" && *name != "plan_id")
        .collect();
    let (status, body) = app.post("/form/submit", &values).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Nome Completo, Plano"));
    assert!(app.upstream.submissions().is_empty());
}

#[tokio::test]
async fn test_malformed_email_is_blocked() {
    let app = TestApp::spawn().await;
    app.get("/").await;

    let values: Vec<_> = complete_form()
        .into_iter()
        .map(|(name, value)| {
            if name == "email" {
                (name, "maria-at-example")
            } else {
                (name, value)
            }
        })
        .collect();
    let (_, body) = app.post("/form/submit", &values).await;

    assert!(body.contains("Preencha os campos obrigatórios: Email"));
    assert!(app.upstream.submissions().is_empty());
}

#[tokio::test]
async fn test_second_submit_while_in_flight_is_rejected() {
    let app = TestApp::spawn().await;
    app.upstream
        .set_registration_delay(Duration::from_millis(800));
    let (_, page) = app.get("/").await;
    assert!(page.contains("hx-disabled-elt"));

    let first_form = complete_form();
    let first = app.post("/form/submit", &first_form);
    let second = async {
        tokio::time::sleep(Duration::from_millis(200)).await;
        app.post("/form/submit", &complete_form()).await
    };
    let ((first_status, first_body), (second_status, second_body)) =
        tokio::join!(first, second);

    assert_eq!(second_status, StatusCode::CONFLICT);
    assert!(second_body.contains("Cadastro em andamento"));
    assert_eq!(first_status, StatusCode::OK);
    assert!(first_body.contains("Cadastro realizado com sucesso!"));
    assert!(first_body.contains("Finalizar Cadastro"));
    assert_eq!(app.upstream.submissions().len(), 1);
}

#[tokio::test]
async fn test_abandoned_submit_still_settles_the_form() {
    let app = TestApp::spawn().await;
    app.upstream
        .set_registration_delay(Duration::from_millis(600));
    app.get("/").await;

    let abandoned = app
        .client
        .post(format!("{}/form/submit", app.url))
        .header("hx-request", "true")
        .form(&complete_form())
        .timeout(Duration::from_millis(150))
        .send()
        .await;
    assert!(abandoned.is_err_and(|e| e.is_timeout()));

    // Let the registration API answer the dropped request.
    tokio::time::sleep(Duration::from_millis(1200)).await;

    app.upstream.set_registration_delay(Duration::ZERO);
    let (status, body) = app.post("/form/submit", &complete_form()).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Cadastro realizado com sucesso!"));
    assert_eq!(app.upstream.submissions().len(), 2);
}

#[tokio::test]
async fn test_slow_registration_is_not_cut_short() {
    let app = TestApp::spawn().await;
    app.upstream
        .set_registration_delay(Duration::from_secs(11));
    app.get("/").await;

    let (status, body) = app.post("/form/submit", &complete_form()).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Cadastro realizado com sucesso!"));
    assert_eq!(app.upstream.submissions().len(), 1);
}
