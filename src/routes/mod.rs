pub mod allocations;
pub mod auth;
pub mod equipment;
pub mod health;
pub mod investors;

use actix_web::{error, web, HttpRequest};

use crate::error::LedgerError;

// Corps JSON ou paramètre de chemin illisible: même format { "error": ... }
fn json_error(err: error::JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    LedgerError::Validation(err.to_string()).into()
}

fn path_error(err: error::PathError, _req: &HttpRequest) -> actix_web::Error {
    LedgerError::Validation(err.to_string()).into()
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .app_data(web::JsonConfig::default().error_handler(json_error))
            .app_data(web::PathConfig::default().error_handler(path_error))
            .service(health::health_check)
            .configure(auth::auth_routes)
            .configure(investors::investor_routes)
            .configure(equipment::equipment_routes)
            .configure(allocations::allocation_routes)
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test, App};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use sea_orm::DatabaseConnection;
    use serde_json::{json, Value};

    use crate::test_support;

    macro_rules! app {
        ($db:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($db.clone()))
                    .app_data(web::Data::new(test_support::jwt_config()))
                    .configure(configure_routes),
            )
            .await
        };
    }

    fn bearer(token: &str) -> (&'static str, String) {
        ("Authorization", format!("Bearer {}", token))
    }

    fn decimal(value: &Value) -> Decimal {
        value.as_str().unwrap().parse().unwrap()
    }

    async fn admin_token(db: &DatabaseConnection) -> String {
        let admin = test_support::seed_admin(db, "admin").await;
        test_support::token_for(&admin)
    }

    #[actix_web::test]
    async fn test_health() {
        let db = test_support::setup_db().await;
        let app = app!(db);

        let resp = test::call_service(&app, test::TestRequest::get().uri("/api/health").to_request()).await;

        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn test_missing_token_is_401_with_error_body() {
        let db = test_support::setup_db().await;
        let app = app!(db);

        let resp = test::call_service(&app, test::TestRequest::get().uri("/api/investors/me").to_request()).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Missing Authorization header");
    }

    #[actix_web::test]
    async fn test_investor_cannot_call_admin_routes() {
        let db = test_support::setup_db().await;
        let app = app!(db);

        let req = test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(json!({ "username": "mariam", "password": "longpassword", "full_name": "Mariam" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let auth: Value = test::read_body_json(resp).await;
        let token = auth["token"].as_str().unwrap().to_string();

        let req = test::TestRequest::post()
            .uri("/api/equipment")
            .insert_header(bearer(&token))
            .set_json(json!({ "name": "Loom", "purchase_price": "1000" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        // Un admin n'a pas de profil investisseur
        let admin = admin_token(&db).await;
        let req = test::TestRequest::get()
            .uri("/api/investors/me")
            .insert_header(bearer(&admin))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn test_register_validation() {
        let db = test_support::setup_db().await;
        let app = app!(db);

        let req = test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(json!({ "username": "ab", "password": "short", "full_name": "" }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_malformed_body_is_400_with_error_body() {
        let db = test_support::setup_db().await;
        let app = app!(db);

        let req = test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(json!({ "username": 5 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].as_str().unwrap().starts_with("Validation failed"));
    }

    #[actix_web::test]
    async fn test_bad_path_id_is_400_with_error_body() {
        let db = test_support::setup_db().await;
        let app = app!(db);
        let admin = admin_token(&db).await;

        let req = test::TestRequest::get()
            .uri("/api/investors/abc/reconcile")
            .insert_header(bearer(&admin))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].is_string());
    }

    #[actix_web::test]
    async fn test_deposit_then_equipment_profit_over_http() {
        let db = test_support::setup_db().await;
        let app = app!(db);
        let admin = admin_token(&db).await;

        // 1. Inscription + contrat
        let req = test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(json!({ "username": "kojo", "password": "longpassword", "full_name": "Kojo Asante" }))
            .to_request();
        let auth: Value = test::read_body_json(test::call_service(&app, req).await).await;
        let token = auth["token"].as_str().unwrap().to_string();

        let req = test::TestRequest::post()
            .uri("/api/investors/me/accept-agreement")
            .insert_header(bearer(&token))
            .to_request();
        let investor: Value = test::read_body_json(test::call_service(&app, req).await).await;
        let investor_id = investor["id"].as_i64().unwrap();

        // 2. Dépôt 10000, frais 200
        let req = test::TestRequest::post()
            .uri("/api/investors/deposits")
            .insert_header(bearer(&token))
            .set_json(json!({ "gross_amount": "10000", "payment_method": "mobile_money" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let deposit: Value = test::read_body_json(resp).await;
        let deposit_id = deposit["id"].as_i64().unwrap();

        let req = test::TestRequest::post()
            .uri(&format!("/api/investors/deposits/{}/receipt", deposit_id))
            .insert_header(bearer(&token))
            .set_json(json!({ "receipt_reference": "MM-55120" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::post()
            .uri(&format!("/api/investors/deposits/{}/confirm-receipt", deposit_id))
            .insert_header(bearer(&admin))
            .set_json(json!({ "charges": "200" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::post()
            .uri(&format!("/api/investors/deposits/{}/confirm", deposit_id))
            .insert_header(bearer(&token))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::post()
            .uri(&format!("/api/investors/deposits/{}/confirm", deposit_id))
            .insert_header(bearer(&token))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        // 3. Allocation de 50% d'un équipement
        let req = test::TestRequest::post()
            .uri("/api/equipment")
            .insert_header(bearer(&admin))
            .set_json(json!({ "name": "Embroidery machine", "purchase_price": "4000" }))
            .to_request();
        let equipment: Value = test::read_body_json(test::call_service(&app, req).await).await;
        let equipment_id = equipment["id"].as_i64().unwrap();

        let req = test::TestRequest::post()
            .uri(&format!("/api/investors/{}/allocate-equipment", investor_id))
            .insert_header(bearer(&admin))
            .set_json(json!({ "equipment_id": equipment_id, "amount_allocated": "2000" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

        // 4. Job: 1000 de revenu, 400 de coûts
        let req = test::TestRequest::post()
            .uri(&format!("/api/equipment/{}/job-usage", equipment_id))
            .insert_header(bearer(&admin))
            .set_json(json!({ "revenue": "1000", "costs": { "materials": "250", "labor": "150" } }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let job: Value = test::read_body_json(resp).await;
        assert_eq!(decimal(&job["job"]["net_profit"]), dec!(600));
        assert_eq!(decimal(&job["distributions"][0]["investor_share"]), dec!(150));

        // 5. Soldes finaux et journal cohérent
        let req = test::TestRequest::get()
            .uri("/api/investors/me")
            .insert_header(bearer(&token))
            .to_request();
        let profile: Value = test::read_body_json(test::call_service(&app, req).await).await;
        assert_eq!(decimal(&profile["cash_balance"]), dec!(7800));
        assert_eq!(decimal(&profile["profit_balance"]), dec!(150));

        let req = test::TestRequest::get()
            .uri(&format!("/api/investors/{}/reconcile", investor_id))
            .insert_header(bearer(&admin))
            .to_request();
        let reconciliation: Value = test::read_body_json(test::call_service(&app, req).await).await;
        assert_eq!(reconciliation["cash_matches"], true);
        assert_eq!(reconciliation["profit_matches"], true);
    }
}
