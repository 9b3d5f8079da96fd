// SPDX-License-Identifier: Apache-2.0

//! End-to-end exercise of both clients against a real in-process server.

use empaque_api::SizeVariantDto;
use empaque_cart::{CartLine, CartStore};
use empaque_client::{AdminClient, ApiClient, ClientError, ListQuery, NewProductImage, ProductDraft};
use empaque_model::{ContactDetails, EmailAddress, PhoneNumber, ProductId, Rut, Slug};
use empaque_server::{build_router, ApiConfig, AppState, InMemoryImageHost, LogOnlyMailer};
use empaque_store::SqliteCatalogStore;
use std::sync::atomic::Ordering;
use std::sync::Arc;

const ADMIN_TOKEN: &str = "secreto-admin";

struct TestServer {
    base_url: String,
    mailer: Arc<LogOnlyMailer>,
    images: Arc<InMemoryImageHost>,
}

async fn spawn_server() -> TestServer {
    let store = Arc::new(SqliteCatalogStore::open_in_memory().unwrap());
    let mailer = Arc::new(LogOnlyMailer::default());
    let images = Arc::new(InMemoryImageHost::default());
    let api = ApiConfig {
        admin_token: Some(ADMIN_TOKEN.to_string()),
        ..ApiConfig::default()
    };
    let state = AppState::new(store, images.clone(), mailer.clone(), api);
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve app");
    });
    TestServer {
        base_url: format!("http://{addr}"),
        mailer,
        images,
    }
}

fn draft(name: &str) -> ProductDraft {
    ProductDraft {
        name: name.to_string(),
        description: format!("{name} para embalaje"),
        category: "Bolsas".to_string(),
        featured: false,
        size_variants: vec![SizeVariantDto {
            size: "30x40".to_string(),
            is_available: true,
        }],
    }
}

fn image(filename: &str) -> NewProductImage {
    NewProductImage {
        filename: filename.to_string(),
        content_type: "image/png".to_string(),
        bytes: vec![0x89, 0x50, 0x4e, 0x47],
    }
}

fn contact() -> ContactDetails {
    ContactDetails::new(
        Rut::parse("12345678-5").unwrap(),
        "Ana",
        "Rojas",
        PhoneNumber::parse("+56", "912345678").unwrap(),
        EmailAddress::parse("ana@example.cl").unwrap(),
    )
    .unwrap()
}

#[tokio::test]
async fn admin_creates_and_public_client_reads_back() {
    let server = spawn_server().await;
    let admin = AdminClient::new(&server.base_url, ADMIN_TOKEN);
    let public = ApiClient::new(&server.base_url);

    let created = admin
        .create_product(&draft("Bolsa Camiseta"), image("bolsa.png"))
        .await
        .expect("create product");
    assert_eq!(created.slug, "bolsa-camiseta");
    assert_eq!(created.image_url, "https://images.local/productos/bolsa.png");
    assert_eq!(*server.images.uploads.lock().await, vec!["productos/bolsa"]);

    let page = public
        .list_products(&ListQuery::default())
        .await
        .expect("list products");
    assert_eq!(page.total_items, 1);
    assert_eq!(page.items[0].name, "Bolsa Camiseta");

    let id = ProductId::parse(&created.id).unwrap();
    let by_id = public.get_product(&id).await.expect("get product");
    assert_eq!(by_id.views, 1);
    let by_slug = public
        .get_product_by_slug(&Slug::parse("bolsa-camiseta").unwrap())
        .await
        .expect("get by slug");
    // The slug route never counts a view.
    assert_eq!(by_slug.views, 1);
}

#[tokio::test]
async fn wrong_token_surfaces_the_api_error() {
    let server = spawn_server().await;
    let admin = AdminClient::new(&server.base_url, "token-equivocado");
    let err = admin
        .create_product(&draft("Bolsa"), image("bolsa.png"))
        .await
        .expect_err("must be rejected");
    match err {
        ClientError::Api { status, error } => {
            assert_eq!(status, 403);
            assert_eq!(error.code.as_str(), "forbidden");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn submit_quotation_clears_cart_only_on_success() {
    let server = spawn_server().await;
    let public = ApiClient::new(&server.base_url);

    let mut cart = CartStore::new();
    cart.add(CartLine {
        product_id: ProductId::parse("0123456789abcdef01234567").unwrap(),
        name: "Bolsa Camiseta".to_string(),
        category: "Bolsas".to_string(),
        image_url: "https://images.local/productos/bolsa.png".to_string(),
        selected_size: Some("30x40".to_string()),
        quantity: 3,
    });

    server.mailer.fail_sends.store(true, Ordering::Relaxed);
    let err = public
        .submit_quotation(&mut cart, &contact())
        .await
        .expect_err("relay is down");
    match err {
        ClientError::Api { status, .. } => assert_eq!(status, 502),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(cart.line_count(), 1);

    server.mailer.fail_sends.store(false, Ordering::Relaxed);
    let lines = public
        .submit_quotation(&mut cart, &contact())
        .await
        .expect("relay accepted");
    assert_eq!(lines, 1);
    assert_eq!(cart.line_count(), 0);
    assert_eq!(server.mailer.sent.lock().await.len(), 1);

    // An emptied cart can no longer produce a quotation.
    let err = public
        .submit_quotation(&mut cart, &contact())
        .await
        .expect_err("empty cart");
    assert!(matches!(err, ClientError::Validation(_)));
}
