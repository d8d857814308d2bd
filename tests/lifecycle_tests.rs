//! End-to-end coverage of the equipment lifecycle: registration, the
//! movement-driven status machine, the audit trail and terminal discard.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use almox::config::Config;
use http_body_util::BodyExt;
use tower::ServiceExt;

async fn spawn_app() -> Router {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();

    let state = almox::api::create_app_state(config, None)
        .await
        .expect("Failed to create app state");
    almox::api::router(state).await
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

/// Logs in with the seeded bootstrap admin; returns `(token, user_id)`.
async fn admin_session(app: &Router) -> (String, i64) {
    let payload = serde_json::json!({ "login": "admin", "password": "admin" });

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/login")
                .header("Content-Type", "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    (
        json["token"].as_str().unwrap().to_string(),
        json["user"]["id"].as_i64().unwrap(),
    )
}

fn get(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("Authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

fn send_json(method: &str, uri: &str, token: &str, payload: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Authorization", format!("Bearer {token}"))
        .header("Content-Type", "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap()
}

async fn create_equipment(app: &Router, token: &str, owner_id: i64, serial: &str) -> i64 {
    let payload = serde_json::json!({
        "name": "Notebook Dell",
        "model": "Latitude 5440",
        "serial_number": serial,
        "asset_tag": "00451",
        "location": "Sala 12",
        "user_id": owner_id,
    });

    let response = app
        .clone()
        .oneshot(send_json("POST", "/api/equipamentos", token, &payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    body_json(response).await["id"].as_i64().unwrap()
}

async fn create_movement(
    app: &Router,
    token: &str,
    equipment_id: i64,
    movement_type: &str,
    user_id: i64,
) -> axum::response::Response {
    let payload = serde_json::json!({
        "equipment_id": equipment_id,
        "movement_type": movement_type,
        "user_id": user_id,
    });

    app.clone()
        .oneshot(send_json("POST", "/api/movimentacoes", token, &payload))
        .await
        .unwrap()
}

async fn equipment_status(app: &Router, token: &str, id: i64) -> String {
    let response = app
        .clone()
        .oneshot(get(&format!("/api/equipamentos/{id}"), token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    body_json(response).await["status"].as_str().unwrap().to_string()
}

async fn ledger_total(app: &Router, token: &str, equipment_id: i64) -> i64 {
    let response = app
        .clone()
        .oneshot(get(
            &format!("/api/movimentacoes/equipamento/{equipment_id}"),
            token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    body_json(response).await["meta"]["total"].as_i64().unwrap()
}

#[tokio::test]
async fn registration_forces_status_to_deposito() {
    let app = spawn_app().await;
    let (token, admin_id) = admin_session(&app).await;

    // Caller-supplied status must be ignored
    let payload = serde_json::json!({
        "name": "Projetor Epson",
        "model": "X49",
        "serial_number": "EPS-001",
        "user_id": admin_id,
        "status": "DESCARTADO",
    });

    let response = app
        .clone()
        .oneshot(send_json("POST", "/api/equipamentos", &token, &payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let created = body_json(response).await;
    assert_eq!(created["status"], "NO_DEPOSITO");

    // Registration leaves a CADASTRO audit entry
    let id = created["id"].as_i64().unwrap();
    let response = app
        .clone()
        .oneshot(get(&format!("/api/equipamentos/{id}/historico"), &token))
        .await
        .unwrap();
    let history = body_json(response).await;
    let rows = history.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["action"], "CADASTRO");
}

#[tokio::test]
async fn saida_and_entrada_drive_the_status_machine() {
    let app = spawn_app().await;
    let (token, admin_id) = admin_session(&app).await;
    let id = create_equipment(&app, &token, admin_id, "SN-MOVE-1").await;

    // ENTRADA against an item still in storage is rejected, naming the
    // required state
    let response = create_movement(&app, &token, id, "ENTRADA", admin_id).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "INVALID_TRANSITION");
    assert!(json["error"].as_str().unwrap().contains("FORA_DEPOSITO"));
    assert_eq!(ledger_total(&app, &token, id).await, 0);

    // SAIDA from storage succeeds and appends exactly one ledger row
    let response = create_movement(&app, &token, id, "SAIDA", admin_id).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(equipment_status(&app, &token, id).await, "FORA_DEPOSITO");
    assert_eq!(ledger_total(&app, &token, id).await, 1);

    // A second SAIDA is rejected, naming the required state
    let response = create_movement(&app, &token, id, "SAIDA", admin_id).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("NO_DEPOSITO"));
    assert_eq!(ledger_total(&app, &token, id).await, 1);

    // ENTRADA returns it to storage
    let response = create_movement(&app, &token, id, "ENTRADA", admin_id).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(equipment_status(&app, &token, id).await, "NO_DEPOSITO");
    assert_eq!(ledger_total(&app, &token, id).await, 2);
}

#[tokio::test]
async fn discard_is_terminal_for_both_movement_types() {
    let app = spawn_app().await;
    let (token, admin_id) = admin_session(&app).await;
    let id = create_equipment(&app, &token, admin_id, "SN-DISC-1").await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/equipamentos/{id}"))
                .header("Authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "DESCARTADO");

    for movement_type in ["SAIDA", "ENTRADA"] {
        let response = create_movement(&app, &token, id, movement_type, admin_id).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["code"], "EQUIPMENT_DISCARDED");
        assert_eq!(
            json["error"],
            "Não é possível movimentar um equipamento descartado"
        );
    }

    assert_eq!(equipment_status(&app, &token, id).await, "DESCARTADO");
    assert_eq!(ledger_total(&app, &token, id).await, 0);

    // The discard itself is audited as a status transition
    let response = app
        .clone()
        .oneshot(get(&format!("/api/equipamentos/{id}/historico"), &token))
        .await
        .unwrap();
    let history = body_json(response).await;
    let discard_row = history
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["action"] == "DESCARTE")
        .expect("discard must be audited");
    assert_eq!(discard_row["field"], "status");
    assert_eq!(discard_row["old_value"], "NO_DEPOSITO");
    assert_eq!(discard_row["new_value"], "DESCARTADO");
}

#[tokio::test]
async fn serial_numbers_are_unique_on_both_paths() {
    let app = spawn_app().await;
    let (token, admin_id) = admin_session(&app).await;
    create_equipment(&app, &token, admin_id, "SN-UNIQ-1").await;
    let other = create_equipment(&app, &token, admin_id, "SN-UNIQ-2").await;

    // Create path
    let payload = serde_json::json!({
        "name": "Notebook Dell",
        "model": "Latitude 5440",
        "serial_number": "SN-UNIQ-1",
        "user_id": admin_id,
    });
    let response = app
        .clone()
        .oneshot(send_json("POST", "/api/equipamentos", &token, &payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "SERIAL_TAKEN");
    assert_eq!(json["error"], "Número de série já cadastrado");

    // Update path carries a distinct message
    let payload = serde_json::json!({ "serial_number": "SN-UNIQ-1" });
    let response = app
        .clone()
        .oneshot(send_json(
            "PUT",
            &format!("/api/equipamentos/{other}"),
            &token,
            &payload,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "SERIAL_TAKEN_OTHER");
    assert_eq!(
        json["error"],
        "Número de série já cadastrado em outro equipamento"
    );
}

#[tokio::test]
async fn update_audits_one_row_per_changed_field() {
    let app = spawn_app().await;
    let (token, admin_id) = admin_session(&app).await;
    let id = create_equipment(&app, &token, admin_id, "SN-EDIT-1").await;

    let payload = serde_json::json!({
        "name": "Notebook Dell Renomeado",
        "model": "Latitude 5440",
        "location": "Sala 30",
    });
    let response = app
        .clone()
        .oneshot(send_json(
            "PUT",
            &format!("/api/equipamentos/{id}"),
            &token,
            &payload,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(get(&format!("/api/equipamentos/{id}/historico"), &token))
        .await
        .unwrap();
    let history = body_json(response).await;
    let edits: Vec<&serde_json::Value> = history
        .as_array()
        .unwrap()
        .iter()
        .filter(|r| r["action"] == "EDICAO")
        .collect();

    // Model was resubmitted unchanged: only name and location are audited
    assert_eq!(edits.len(), 2);

    let name_row = edits.iter().find(|r| r["field"] == "name").unwrap();
    assert_eq!(name_row["old_value"], "Notebook Dell");
    assert_eq!(name_row["new_value"], "Notebook Dell Renomeado");

    let location_row = edits.iter().find(|r| r["field"] == "location").unwrap();
    assert_eq!(location_row["old_value"], "Sala 12");
    assert_eq!(location_row["new_value"], "Sala 30");
}

#[tokio::test]
async fn update_of_missing_equipment_is_a_404() {
    let app = spawn_app().await;
    let (token, _) = admin_session(&app).await;

    let payload = serde_json::json!({ "name": "Novo Nome" });
    let response = app
        .clone()
        .oneshot(send_json("PUT", "/api/equipamentos/9999", &token, &payload))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["code"], "EQUIPMENT_NOT_FOUND");
    assert_eq!(json["error"], "Equipamento não encontrado");
}

#[tokio::test]
async fn movement_references_must_resolve() {
    let app = spawn_app().await;
    let (token, admin_id) = admin_session(&app).await;
    let id = create_equipment(&app, &token, admin_id, "SN-REF-1").await;

    // Unknown equipment
    let response = create_movement(&app, &token, 9999, "SAIDA", admin_id).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["code"], "EQUIPMENT_NOT_FOUND");

    // Unknown acting user
    let response = create_movement(&app, &token, id, "SAIDA", 9999).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["code"], "USER_NOT_FOUND");

    // Neither attempt touched the ledger or the status
    assert_eq!(ledger_total(&app, &token, id).await, 0);
    assert_eq!(equipment_status(&app, &token, id).await, "NO_DEPOSITO");
}

#[tokio::test]
async fn movement_type_membership_is_validated() {
    let app = spawn_app().await;
    let (token, admin_id) = admin_session(&app).await;
    let id = create_equipment(&app, &token, admin_id, "SN-VAL-1").await;

    let response = create_movement(&app, &token, id, "EMPRESTIMO", admin_id).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Erro de validação");
    assert_eq!(json["details"][0]["field"], "movement_type");
}

#[tokio::test]
async fn movements_can_be_backdated_and_notes_are_trimmed() {
    let app = spawn_app().await;
    let (token, admin_id) = admin_session(&app).await;
    let id = create_equipment(&app, &token, admin_id, "SN-DATE-1").await;

    let payload = serde_json::json!({
        "equipment_id": id,
        "movement_type": "SAIDA",
        "user_id": admin_id,
        "note": "  entregue ao laboratório  ",
        "moved_at": "2025-11-03T09:30:00+00:00",
    });
    let response = app
        .clone()
        .oneshot(send_json("POST", "/api/movimentacoes", &token, &payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["moved_at"], "2025-11-03T09:30:00+00:00");
    assert_eq!(json["note"], "entregue ao laboratório");
    assert_eq!(json["equipment"]["serial_number"], "SN-DATE-1");
    assert_eq!(json["user"]["login"], "admin");
}

#[tokio::test]
async fn default_listing_excludes_discarded_equipment() {
    let app = spawn_app().await;
    let (token, admin_id) = admin_session(&app).await;

    let stored = create_equipment(&app, &token, admin_id, "SN-LIST-1").await;
    let out = create_equipment(&app, &token, admin_id, "SN-LIST-2").await;
    let discarded = create_equipment(&app, &token, admin_id, "SN-LIST-3").await;

    let response = create_movement(&app, &token, out, "SAIDA", admin_id).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/equipamentos/{discarded}"))
                .header("Authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // One item per status exists; the default list returns only the two
    // non-terminal ones
    let response = app
        .clone()
        .oneshot(get("/api/equipamentos", &token))
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["meta"]["total"], 2);
    let listed_ids: Vec<i64> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| {
            assert_ne!(item["status"], "DESCARTADO");
            item["id"].as_i64().unwrap()
        })
        .collect();
    assert!(listed_ids.contains(&stored));
    assert!(listed_ids.contains(&out));

    // Status filter narrows to one
    let response = app
        .clone()
        .oneshot(get("/api/equipamentos?status=FORA_DEPOSITO", &token))
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["meta"]["total"], 1);
    assert_eq!(json["data"][0]["id"], out);

    // The terminal status is not a valid filter value
    let response = app
        .clone()
        .oneshot(get("/api/equipamentos?status=DESCARTADO", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn listing_embeds_latest_note_and_owner() {
    let app = spawn_app().await;
    let (token, admin_id) = admin_session(&app).await;
    let id = create_equipment(&app, &token, admin_id, "SN-NOTE-1").await;

    let payload = serde_json::json!({
        "equipment_id": id,
        "movement_type": "SAIDA",
        "user_id": admin_id,
        "note": "primeira saída",
    });
    let response = app
        .clone()
        .oneshot(send_json("POST", "/api/movimentacoes", &token, &payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let payload = serde_json::json!({
        "equipment_id": id,
        "movement_type": "ENTRADA",
        "user_id": admin_id,
        "note": "devolvido com carregador",
    });
    let response = app
        .clone()
        .oneshot(send_json("POST", "/api/movimentacoes", &token, &payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(get("/api/equipamentos?q=SN-NOTE", &token))
        .await
        .unwrap();
    let json = body_json(response).await;
    let item = &json["data"][0];

    assert_eq!(item["last_movement_note"], "devolvido com carregador");
    assert_eq!(item["user"]["login"], "admin");
}

#[tokio::test]
async fn ledger_is_ordered_newest_first_and_filters_by_type() {
    let app = spawn_app().await;
    let (token, admin_id) = admin_session(&app).await;
    let id = create_equipment(&app, &token, admin_id, "SN-ORD-1").await;

    for movement_type in ["SAIDA", "ENTRADA", "SAIDA"] {
        let response = create_movement(&app, &token, id, movement_type, admin_id).await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app
        .clone()
        .oneshot(get("/api/movimentacoes", &token))
        .await
        .unwrap();
    let json = body_json(response).await;
    let rows = json["data"].as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["movement_type"], "SAIDA");
    assert_eq!(rows[1]["movement_type"], "ENTRADA");
    assert_eq!(rows[2]["movement_type"], "SAIDA");

    let response = app
        .clone()
        .oneshot(get("/api/movimentacoes?movement_type=ENTRADA", &token))
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["meta"]["total"], 1);
    assert_eq!(json["data"][0]["movement_type"], "ENTRADA");
}

#[tokio::test]
async fn analytics_reports_reflect_the_inventory() {
    let app = spawn_app().await;
    let (token, admin_id) = admin_session(&app).await;

    let a = create_equipment(&app, &token, admin_id, "SN-AN-1").await;
    let b = create_equipment(&app, &token, admin_id, "SN-AN-2").await;

    let response = create_movement(&app, &token, a, "SAIDA", admin_id).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/equipamentos/{b}"))
                .header("Authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(get("/api/analytics/equipamentos", &token))
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["total"], 2);
    let by_status = json["by_status"].as_array().unwrap();
    let count_for = |status: &str| {
        by_status
            .iter()
            .find(|s| s["status"] == status)
            .map_or(0, |s| s["count"].as_i64().unwrap())
    };
    assert_eq!(count_for("FORA_DEPOSITO"), 1);
    assert_eq!(count_for("DESCARTADO"), 1);

    let response = app
        .clone()
        .oneshot(get("/api/analytics/movimentacoes", &token))
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["total"], 1);
    assert_eq!(json["saidas"], 1);
    assert_eq!(json["entradas"], 0);
    assert_eq!(json["per_day"].as_array().unwrap().len(), 1);
}
