mod common;

use axum::http::StatusCode;
use common::*;
use serde_json::json;

const HEADER: &str = "id,nom,prenom,telephone,reseaux_social,latitude,longitude";

fn csv_with(rows: &[&str]) -> String {
    let mut csv = String::from(HEADER);
    for row in rows {
        csv.push('\n');
        csv.push_str(row);
    }
    csv.push('\n');
    csv
}

#[tokio::test]
async fn upload_requires_admin() {
    let (app, _) = offline_app("http://127.0.0.1:9");
    let resp = send(
        &app,
        csv_upload_request("clients.csv", &csv_with(&["1,A,B,0600,@a,48.8,2.3"]), None),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn upload_reports_missing_columns() {
    let (app, _) = offline_app("http://127.0.0.1:9");
    let resp = send(
        &app,
        csv_upload_request(
            "broken.csv",
            "id,nom,telephone,latitude\n1,A,0600,48.8\n",
            Some(&admin_basic()),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(
        body["missing_columns"],
        json!(["prenom", "reseaux_social", "longitude"])
    );
}

#[tokio::test]
async fn overlong_filename_is_a_bad_request() {
    let (app, _) = offline_app("http://127.0.0.1:9");
    let filename = format!("{}{}.csv", unique("clients"), "a".repeat(300));
    let resp = send(
        &app,
        csv_upload_request(
            &filename,
            &csv_with(&["1,A,B,0600,@a,48.8,2.3"]),
            Some(&admin_basic()),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert!(body["error"].as_str().unwrap().contains("255"));
}

#[tokio::test]
async fn filename_of_exactly_255_characters_is_stored() {
    let Some((app, _)) = database_app().await else {
        return;
    };
    let prefix = unique("clients");
    let filename = format!("{}{}.csv", prefix, "a".repeat(255 - prefix.len() - 4));
    assert_eq!(filename.chars().count(), 255);

    let resp = send(
        &app,
        csv_upload_request(
            &filename,
            &csv_with(&["1,A,B,0600,@a,48.8,2.3"]),
            Some(&admin_basic()),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(body_json(resp).await["filename"], filename.as_str());
}

#[tokio::test]
async fn upload_without_multipart_body_is_a_json_error() {
    let (app, _) = offline_app("http://127.0.0.1:9");
    let resp = send(
        &app,
        json_request("POST", "/upload-csv", Some(&admin_basic()), &json!({})),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(resp).await["error"].is_string());
}

#[tokio::test]
async fn malformed_rows_are_dropped_and_counted() {
    let Some((app, _)) = database_app().await else {
        return;
    };
    let filename = format!("{}.csv", unique("clients"));
    let csv = csv_with(&[
        "1,Martin,Paul,0600000001,@paul,48.85,2.35",
        "2,Durand,Anne,0600000002,@anne,not-a-number,2.30",
        "3,Petit,Luc,0600000003,@luc,45.76,4.83",
        "4,Roux,Eva,0600000004,@eva,43.60,",
        "5,Moreau,Jean,0600000005,@jean,43.30,5.37",
    ]);

    let resp = send(
        &app,
        csv_upload_request(&filename, &csv, Some(&admin_basic())),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = body_json(resp).await;
    assert_eq!(body["accepted_rows"], 3);
    assert_eq!(body["rejected_rows"], 2);
    assert_eq!(body["total_rows"], 5);
    let import_id = body["import_id"].as_i64().unwrap();

    let resp = send(
        &app,
        empty_request("GET", &format!("/imports/{}", import_id), Some(&admin_basic())),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["client_count"], 3);
    let ids: Vec<i64> = body["clients"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["client_id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![1, 3, 5]);

    // Same filename again is a conflict, and nothing new is stored.
    let resp = send(
        &app,
        csv_upload_request(&filename, &csv, Some(&admin_basic())),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn aggregation_counts_match_per_import_sizes() {
    let Some((app, _)) = database_app().await else {
        return;
    };

    let mut ids = Vec::new();
    for rows in [
        vec!["1,A,A,01,@a,48.1,2.1", "2,B,B,02,@b,48.2,2.2"],
        vec!["1,C,C,03,@c,45.1,4.1", "2,D,D,04,@d,45.2,4.2", "3,E,E,05,@e,45.3,4.3"],
    ] {
        let resp = send(
            &app,
            csv_upload_request(
                &format!("{}.csv", unique("batch")),
                &csv_with(&rows),
                Some(&admin_basic()),
            ),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        ids.push(body_json(resp).await["import_id"].as_i64().unwrap());
    }

    let total = |ids: serde_json::Value| {
        let app = app.clone();
        async move {
            let resp = send(
                &app,
                json_request("POST", "/total-clients", Some(&admin_basic()), &ids),
            )
            .await;
            assert_eq!(resp.status(), StatusCode::OK);
            body_json(resp).await["total_clients"].as_i64().unwrap()
        }
    };

    assert_eq!(total(json!([ids[0]])).await, 2);
    assert_eq!(total(json!([ids[1]])).await, 3);
    assert_eq!(total(json!([ids[0], ids[1]])).await, 5);
    assert_eq!(total(json!([ids[0], ids[0]])).await, 2);
    assert_eq!(total(json!([])).await, 0);

    // Client 1 exists in both imports and is returned twice.
    let resp = send(
        &app,
        json_request(
            "POST",
            "/clients-coordinates",
            Some(&admin_basic()),
            &json!([ids[0], ids[1]]),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    let coords = body["coordinates"].as_array().unwrap();
    assert_eq!(coords.len(), 5);
    assert_eq!(coords.iter().filter(|c| c["id"] == 1).count(), 2);
}

#[tokio::test]
async fn deleting_an_import_removes_its_clients() {
    let Some((app, _)) = database_app().await else {
        return;
    };
    let resp = send(
        &app,
        csv_upload_request(
            &format!("{}.csv", unique("doomed")),
            &csv_with(&["9,Z,Z,09,@z,47.0,1.0"]),
            Some(&admin_basic()),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let id = body_json(resp).await["import_id"].as_i64().unwrap();

    let resp = send(
        &app,
        empty_request("DELETE", &format!("/imports/{}", id), Some(&admin_basic())),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = send(
        &app,
        json_request("POST", "/total-clients", Some(&admin_basic()), &json!([id])),
    )
    .await;
    assert_eq!(body_json(resp).await["total_clients"], 0);

    let resp = send(
        &app,
        empty_request("DELETE", &format!("/imports/{}", id), Some(&admin_basic())),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
