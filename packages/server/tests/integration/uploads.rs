use crate::common::{TestApp, routes};

const CSV: &str = "\
name,email,mobile,total invoice,amount paid,amount due
Ann,ann@example.com,5550001,100,100,0
Bob,bob@example.com,5550002,250.25,50,200.25
";

async fn alice(app: &TestApp) -> String {
    app.create_authenticated_user("Alice", "alice@example.com", "9876543210")
        .await
}

#[tokio::test]
async fn history_lists_newest_first() {
    let app = TestApp::spawn().await;
    let token = alice(&app).await;
    let first = app.upload_csv(CSV, &token).await;
    let second = app.upload_csv(CSV, &token).await;

    let res = app.get_with_token(routes::UPLOADS, &token).await;

    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["pagination"]["total"], 2);
    assert_eq!(res.body["data"][0]["id"], second);
    assert_eq!(res.body["data"][1]["id"], first);
    assert_eq!(res.body["data"][0]["row_count"], 2);
    assert_eq!(res.body["data"][0]["file_type"], "CSV");
    assert_eq!(res.body["data"][0]["original_name"], "buyers.csv");
}

#[tokio::test]
async fn detail_includes_totals() {
    let app = TestApp::spawn().await;
    let token = alice(&app).await;
    let id = app.upload_csv(CSV, &token).await;

    let res = app.get_with_token(&routes::upload(id), &token).await;

    assert_eq!(res.status, 200, "{}", res.text);
    let summary = &res.body["summary"];
    assert_eq!(summary["total_buyers"], 2);
    assert_eq!(summary["total_due"], "200.25");
    assert_eq!(summary["total_invoice"], "350.25");
    assert_eq!(summary["no_due_count"], 1);
    assert_eq!(summary["has_due_count"], 1);
}

#[tokio::test]
async fn delete_removes_the_upload_and_its_buyers() {
    let app = TestApp::spawn().await;
    let token = alice(&app).await;
    let kept = app.upload_csv(CSV, &token).await;
    let doomed = app.upload_csv(CSV, &token).await;

    let res = app.delete_with_token(&routes::upload(doomed), &token).await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["message"], "Upload deleted successfully");

    let gone = app.get_with_token(&routes::upload(doomed), &token).await;
    assert_eq!(gone.status, 404);

    let buyers = app.get_with_token(routes::BUYERS, &token).await;
    assert_eq!(buyers.body["pagination"]["total"], 2);

    let still = app
        .get_with_token(&format!("{}?uploadId={kept}", routes::BUYERS), &token)
        .await;
    assert_eq!(still.body["pagination"]["total"], 2);
}

#[tokio::test]
async fn uploads_of_other_users_are_not_found() {
    let app = TestApp::spawn().await;
    let alice_token = alice(&app).await;
    let id = app.upload_csv(CSV, &alice_token).await;
    let bob_token = app
        .create_authenticated_user("Bob", "bob@example.com", "1234567890")
        .await;

    let get = app.get_with_token(&routes::upload(id), &bob_token).await;
    assert_eq!(get.status, 404);
    assert_eq!(get.body["code"], "NOT_FOUND");

    let delete = app.delete_with_token(&routes::upload(id), &bob_token).await;
    assert_eq!(delete.status, 404);

    let still_there = app.get_with_token(&routes::upload(id), &alice_token).await;
    assert_eq!(still_there.status, 200);
}
