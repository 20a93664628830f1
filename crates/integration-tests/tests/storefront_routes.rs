//! Router tests that never touch the database.
//!
//! Each test drives the full middleware stack through one [`TestApp`], which
//! keeps the session cookie between requests.

use axum::http::StatusCode;
use libra_integration_tests::{ADMIN_PASSWORD, TestApp};

#[tokio::test]
async fn health_is_ok() {
    let mut app = TestApp::new();

    let response = app.get("/health").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, "ok");
}

#[tokio::test]
async fn unknown_path_renders_not_found_page() {
    let mut app = TestApp::new();

    let response = app.get("/no-such-page").await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(response.body.contains("Faqja nuk u gjet."));
}

#[tokio::test]
async fn responses_carry_security_headers_and_request_id() {
    let mut app = TestApp::new();

    let response = app.get("/health").await;

    assert_eq!(response.headers["x-frame-options"], "DENY");
    assert_eq!(response.headers["x-content-type-options"], "nosniff");
    assert_eq!(response.headers["referrer-policy"], "same-origin");
    assert!(response.headers.contains_key("content-security-policy"));
    assert!(response.headers.contains_key("x-request-id"));
}

#[tokio::test]
async fn empty_cart_page_needs_no_catalog_lookup() {
    let mut app = TestApp::new();

    let response = app.get("/cart").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Shporta është bosh."));
}

#[tokio::test]
async fn add_to_cart_returns_to_referring_page_and_counts_items() {
    let mut app = TestApp::new();

    let response = app
        .post_form_from(
            "/cart/add",
            "product_id=7&quantity=2",
            "http://localhost:3000/shop?grade=3",
        )
        .await;

    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/shop?grade=3"));

    let page = app.get("/contact").await;
    assert!(page.body.contains("Produkti u shtua në shportë."));
    assert!(page.body.contains(r#"<span class="badge">2</span>"#));
}

#[tokio::test]
async fn add_to_cart_without_product_changes_nothing() {
    let mut app = TestApp::new();

    let response = app.post_form("/cart/add", "quantity=2").await;

    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/shop"));

    let page = app.get("/contact").await;
    assert!(!page.body.contains("badge"));
}

#[tokio::test]
async fn cart_update_with_zero_quantity_empties_the_cart() {
    let mut app = TestApp::new();
    app.post_form("/cart/add", "product_id=7&quantity=3").await;

    let response = app.post_form("/cart/update", "qty_7=0").await;
    assert_eq!(response.location(), Some("/cart"));

    let page = app.get("/cart").await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("Shporta u përditësua."));
    assert!(page.body.contains("Shporta është bosh."));
}

#[tokio::test]
async fn checkout_with_empty_cart_redirects_to_shop() {
    let mut app = TestApp::new();

    let response = app.get("/checkout").await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/shop"));

    let page = app.get("/contact").await;
    assert!(page.body.contains("Shporta është bosh."));
}

#[tokio::test]
async fn checkout_submit_with_empty_cart_redirects_to_shop() {
    let mut app = TestApp::new();

    let response = app
        .post_form("/checkout", "name=Arta&phone=069&address=Tirane")
        .await;

    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/shop"));
}

#[tokio::test]
async fn checkout_submit_redirect_keeps_pending_flashes() {
    let mut app = TestApp::new();
    app.post_form("/cart/update", "qty_7=0").await;

    let response = app
        .post_form("/checkout", "name=Arta&phone=069&address=Tirane")
        .await;
    assert_eq!(response.location(), Some("/shop"));

    let page = app.get("/contact").await;
    assert!(page.body.contains("Shporta u përditësua."));
    assert!(page.body.contains("Shporta është bosh."));
}

#[tokio::test]
async fn thank_you_for_foreign_order_shows_no_details() {
    let mut app = TestApp::new();

    let response = app.get("/thank-you?order_id=42").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Porosia juaj u regjistrua."));
    assert!(!response.body.contains("#42"));
}

#[tokio::test]
async fn contact_with_blank_fields_rerenders_form() {
    let mut app = TestApp::new();

    let response = app
        .post_form("/contact", "name=&email=arta%40example.com&message=")
        .await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.body.contains("Ju lutem plotësoni: Emër dhe Mesazh."));
    assert!(response.body.contains("arta@example.com"));
}

#[tokio::test]
async fn contact_with_malformed_email_is_rejected() {
    let mut app = TestApp::new();

    let response = app
        .post_form("/contact", "name=Arta&email=not-an-email&message=Pershendetje")
        .await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.body.contains("Adresa e email-it nuk është e vlefshme."));
}

#[tokio::test]
async fn admin_pages_redirect_anonymous_visitors_to_login() {
    let mut app = TestApp::new();

    let orders = app.get("/admin/orders").await;
    assert_eq!(orders.status, StatusCode::SEE_OTHER);
    assert_eq!(orders.location(), Some("/admin/login"));

    let status = app.post_form("/admin/orders/1/status", "status=shipped").await;
    assert_eq!(status.location(), Some("/admin/login"));
}

#[tokio::test]
async fn wrong_admin_password_flashes_error() {
    let mut app = TestApp::new();

    let response = app.post_form("/admin/session", "password=guess").await;
    assert_eq!(response.location(), Some("/admin/login"));

    let page = app.get("/admin/login").await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("Fjalëkalim i pasaktë."));
}

#[tokio::test]
async fn admin_login_and_logout() {
    let mut app = TestApp::new();

    let response = app
        .post_form("/admin/session", &format!("password={}", ADMIN_PASSWORD.replace(' ', "+")))
        .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/admin/orders"));

    let login_page = app.get("/admin/login").await;
    assert_eq!(login_page.location(), Some("/admin/orders"));

    let logout = app.post_form("/admin/logout", "").await;
    assert_eq!(logout.location(), Some("/"));

    let orders = app.get("/admin/orders").await;
    assert_eq!(orders.location(), Some("/admin/login"));
}

#[tokio::test]
async fn unknown_status_is_rejected_before_any_update() {
    let mut app = TestApp::new();
    app.post_form("/admin/session", &format!("password={}", ADMIN_PASSWORD.replace(' ', "+")))
        .await;

    let response = app
        .post_form("/admin/orders/1/status", "status=lost-in-mail")
        .await;
    assert_eq!(response.location(), Some("/admin/orders"));

    // The order list needs the database, so read the flash off another page
    let page = app.get("/contact").await;
    assert!(page.body.contains("Status i panjohur."));
}
