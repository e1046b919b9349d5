use crate::common::{TestApp, routes};

const BUYERS_CSV: &str = "\
Name,Email,Mobile,Address,Total Invoice,Amount Paid,Amount Due
Ann Lee,ann@example.com,5550001,1 Main St,1000,1000,0
Bob Ray,bob@example.com,5550002,2 Side St,\"$1,200.50\",200.50,1000
Cy Dee,cy@example.com,5550003,3 High St,300,100,200
,missing@example.com,5550004,4 Low St,10,0,10
";

async fn alice(app: &TestApp) -> String {
    app.create_authenticated_user("Alice", "alice@example.com", "9876543210")
        .await
}

mod upload {
    use super::*;

    #[tokio::test]
    async fn csv_import_skips_invalid_rows_and_reports_the_count() {
        let app = TestApp::spawn().await;
        let token = alice(&app).await;

        let res = app
            .upload_with_token("buyers.csv", "text/csv", BUYERS_CSV.into(), &token)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["count"], 3);
        assert_eq!(res.body["message"], "Successfully imported 3 buyers");
        assert_eq!(res.body["fileName"], "buyers.csv");
        assert!(res.body["uploadId"].is_number());
        assert_eq!(app.spooled_files(), 0);
    }

    #[tokio::test]
    async fn excel_columns_are_read_by_position() {
        let app = TestApp::spawn().await;
        let token = alice(&app).await;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("buyers.xlsx");
        let mut book = umya_spreadsheet::new_file();
        let sheet = book.get_sheet_by_name_mut("Sheet1").unwrap();
        for (col, header) in ["N", "E", "M", "A", "TI", "AP", "AD"].iter().enumerate() {
            sheet.get_cell_mut((col as u32 + 1, 1)).set_value(*header);
        }
        sheet.get_cell_mut((1, 2)).set_value("Dana");
        sheet.get_cell_mut((2, 2)).set_value("dana@example.com");
        sheet.get_cell_mut((3, 2)).set_value_number(5_550_100.0);
        sheet.get_cell_mut((4, 2)).set_value("9 Elm St");
        sheet.get_cell_mut((5, 2)).set_value_number(50.0);
        sheet.get_cell_mut((6, 2)).set_value_number(20.0);
        sheet.get_cell_mut((7, 2)).set_value_number(30.0);
        umya_spreadsheet::writer::xlsx::write(&book, &path).unwrap();

        let res = app
            .upload_with_token(
                "buyers.xlsx",
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
                std::fs::read(&path).unwrap(),
                &token,
            )
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["count"], 1);

        let list = app.get_with_token(routes::BUYERS, &token).await;
        assert_eq!(list.body["data"][0]["mobile"], "5550100");
        assert_eq!(list.body["data"][0]["amount_due"], "30.00");
    }

    #[tokio::test]
    async fn disallowed_file_type_is_rejected() {
        let app = TestApp::spawn().await;
        let token = alice(&app).await;

        let res = app
            .upload_with_token("notes.txt", "text/plain", b"hello".to_vec(), &token)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        assert_eq!(res.body["message"], "Only CSV and Excel files are allowed");
    }

    #[tokio::test]
    async fn header_only_file_is_empty() {
        let app = TestApp::spawn().await;
        let token = alice(&app).await;

        let res = app
            .upload_with_token("empty.csv", "text/csv", b"name,email,mobile\n".to_vec(), &token)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "EMPTY_FILE");
        assert_eq!(res.body["message"], "No valid data found in file");
        assert_eq!(app.spooled_files(), 0);

        let uploads = app.get_with_token(routes::UPLOADS, &token).await;
        assert_eq!(uploads.body["pagination"]["total"], 0);
    }

    #[tokio::test]
    async fn oversized_file_is_rejected_without_leaving_a_spool_file() {
        let app = TestApp::spawn_with_limit(1024).await;
        let token = alice(&app).await;

        let mut csv = String::from("name,email,mobile\n");
        while csv.len() <= 1024 {
            csv.push_str("Ann Lee,ann@example.com,5550001\n");
        }

        let res = app
            .upload_with_token("big.csv", "text/csv", csv.into_bytes(), &token)
            .await;

        assert_eq!(res.status, 413, "{}", res.text);
        assert_eq!(res.body["code"], "PAYLOAD_TOO_LARGE");
        assert_eq!(app.spooled_files(), 0);
    }

    #[tokio::test]
    async fn upload_requires_a_token() {
        let app = TestApp::spawn().await;

        let res = app
            .upload_with_token("buyers.csv", "text/csv", BUYERS_CSV.into(), "")
            .await;

        assert_eq!(res.status, 401);
    }
}

mod listing {
    use super::*;

    #[tokio::test]
    async fn filters_narrow_the_listing() {
        let app = TestApp::spawn().await;
        let token = alice(&app).await;
        app.upload_csv(BUYERS_CSV, &token).await;

        let all = app.get_with_token(routes::BUYERS, &token).await;
        assert_eq!(all.status, 200, "{}", all.text);
        assert_eq!(all.body["pagination"]["total"], 3);
        assert_eq!(all.body["filters"]["dueStatus"], "all");

        let no_due = app
            .get_with_token(&format!("{}?dueStatus=no_due", routes::BUYERS), &token)
            .await;
        assert_eq!(no_due.body["pagination"]["total"], 1);
        assert_eq!(no_due.body["data"][0]["name"], "Ann Lee");

        let has_due = app
            .get_with_token(
                &format!("{}?dueStatus=has_due&minInvoice=500", routes::BUYERS),
                &token,
            )
            .await;
        assert_eq!(has_due.body["pagination"]["total"], 1);
        assert_eq!(has_due.body["data"][0]["total_invoice"], "1200.50");

        let search = app
            .get_with_token(&format!("{}?search=CY%40EXAMPLE", routes::BUYERS), &token)
            .await;
        assert_eq!(search.body["pagination"]["total"], 1);
        assert_eq!(search.body["data"][0]["mobile"], "5550003");
    }

    #[tokio::test]
    async fn pagination_is_clamped_and_reported() {
        let app = TestApp::spawn().await;
        let token = alice(&app).await;
        app.upload_csv(BUYERS_CSV, &token).await;

        let res = app
            .get_with_token(&format!("{}?page=2&limit=2", routes::BUYERS), &token)
            .await;
        assert_eq!(res.body["data"].as_array().unwrap().len(), 1);
        assert_eq!(res.body["pagination"]["totalPages"], 2);

        let res = app
            .get_with_token(&format!("{}?limit=1000", routes::BUYERS), &token)
            .await;
        assert_eq!(res.body["pagination"]["limit"], 100);
    }

    #[tokio::test]
    async fn buyers_of_other_users_are_invisible() {
        let app = TestApp::spawn().await;
        let alice_token = alice(&app).await;
        app.upload_csv(BUYERS_CSV, &alice_token).await;

        let bob_token = app
            .create_authenticated_user("Bob", "bob@example.com", "1234567890")
            .await;
        let res = app.get_with_token(routes::BUYERS, &bob_token).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["pagination"]["total"], 0);
    }
}
