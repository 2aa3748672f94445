use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use tracing::{info, instrument};

use crate::error::ApiError;
use crate::gate::{authorize, CurrentIdentity};
use crate::identity::model::Role;
use crate::state::AppState;

use super::dto::{CreateProductRequest, ProductList};
use super::model::{NewProduct, Product};

#[instrument(skip(state))]
pub async fn list_products(State(state): State<AppState>) -> Result<Json<ProductList>, ApiError> {
    let products = state.products.list().await?;
    let count = products.len();
    Ok(Json(ProductList { products, count }))
}

#[instrument(skip(state))]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Product>, ApiError> {
    validate_product_id(id)?;
    let product = state
        .products
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Product {id} not found")))?;
    Ok(Json(product))
}

#[instrument(skip(state, identity, payload))]
pub async fn create_product(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    Json(payload): Json<CreateProductRequest>,
) -> Result<(StatusCode, HeaderMap, Json<Product>), ApiError> {
    let new = validate_product_data(payload)?;
    let product = state.products.insert(new).await?;
    info!(product_id = product.id, identity_id = %identity.id, "product created");

    let mut headers = HeaderMap::new();
    if let Ok(location) = format!("/products/{}", product.id).parse() {
        headers.insert(axum::http::header::LOCATION, location);
    }
    Ok((StatusCode::CREATED, headers, Json(product)))
}

#[instrument(skip(state, identity))]
pub async fn delete_product(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    Path(id): Path<i64>,
) -> Result<Json<Product>, ApiError> {
    authorize(&identity, &[Role::Admin])?;
    validate_product_id(id)?;
    let removed = state
        .products
        .delete(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Product {id} not found")))?;
    info!(product_id = id, identity_id = %identity.id, "product deleted");
    Ok(Json(removed))
}

fn validate_product_id(id: i64) -> Result<(), ApiError> {
    if id <= 0 {
        return Err(ApiError::Validation(
            "Product id must be a positive number".into(),
        ));
    }
    Ok(())
}

fn validate_product_data(payload: CreateProductRequest) -> Result<NewProduct, ApiError> {
    let mut errors = Vec::new();

    let name = payload.name.as_deref().map(str::trim).unwrap_or("");
    if name.is_empty() {
        errors.push("Name is required");
    }

    match payload.price {
        None => errors.push("Price is required"),
        Some(p) if !p.is_finite() || p < 0.0 => errors.push("Price must be a non-negative number"),
        Some(_) => {}
    }

    let category = payload.category.as_deref().map(str::trim).unwrap_or("");
    if category.is_empty() {
        errors.push("Category is required");
    }

    if !errors.is_empty() {
        return Err(ApiError::Validation(format!(
            "Validation failed: {}",
            errors.join(", ")
        )));
    }

    // all three checked above
    Ok(NewProduct {
        name: name.to_string(),
        price: payload.price.unwrap_or_default(),
        category: category.to_string(),
        in_stock: payload.in_stock.unwrap_or(true),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::FromRequestParts;
    use axum::http::Request;

    use crate::auth::dto::RegisterRequest;
    use crate::auth::handlers::register;
    use crate::gate::error::GateError;

    async fn signup(state: &AppState, email: &str, role: Role) -> String {
        let (_, Json(resp)) = register(
            State(state.clone()),
            Json(RegisterRequest {
                email: email.into(),
                password: "password123".into(),
                role: Some(role),
            }),
        )
        .await
        .expect("register");
        resp.token
    }

    async fn bearer_identity(state: &AppState, token: &str) -> Result<CurrentIdentity, ApiError> {
        let mut parts = Request::builder()
            .uri("/products/1")
            .header(
                axum::http::header::AUTHORIZATION,
                format!("Bearer {token}"),
            )
            .body(())
            .expect("request")
            .into_parts()
            .0;
        CurrentIdentity::from_request_parts(&mut parts, state).await
    }

    #[tokio::test]
    async fn delete_is_denied_for_user_and_allowed_for_admin() {
        let state = AppState::fake();
        let user_token = signup(&state, "user@example.com", Role::User).await;
        let admin_token = signup(&state, "admin@example.com", Role::Admin).await;

        let user = bearer_identity(&state, &user_token).await.expect("user resolves");
        let err = delete_product(State(state.clone()), user, Path(1))
            .await
            .expect_err("user may not delete");
        assert!(matches!(err, ApiError::Gate(GateError::Forbidden)));
        assert_eq!(err.status(), StatusCode::FORBIDDEN);

        let admin = bearer_identity(&state, &admin_token).await.expect("admin resolves");
        let Json(removed) = delete_product(State(state.clone()), admin, Path(1))
            .await
            .expect("admin may delete");
        assert_eq!(removed.id, 1);
        assert!(state
            .products
            .find_by_id(1)
            .await
            .expect("lookup")
            .is_none());
    }

    #[tokio::test]
    async fn list_counts_the_demo_catalog() {
        let state = AppState::fake();
        let Json(list) = list_products(State(state)).await.expect("list");
        assert_eq!(list.count, 3);
        assert_eq!(list.products.len(), 3);
    }

    #[tokio::test]
    async fn unknown_product_is_a_404() {
        let state = AppState::fake();
        let err = get_product(State(state), Path(999))
            .await
            .expect_err("no such product");
        assert!(matches!(err, ApiError::NotFound(_)));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn non_positive_id_is_a_validation_error() {
        let state = AppState::fake();
        let err = get_product(State(state), Path(0))
            .await
            .expect_err("zero id is invalid");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn create_payload_failures_are_reported_together() {
        let err = validate_product_data(CreateProductRequest {
            name: Some("   ".into()),
            price: Some(-5.0),
            category: None,
            in_stock: None,
        })
        .expect_err("three invalid fields");
        let message = err.to_string();
        assert!(message.contains("Name is required"));
        assert!(message.contains("Price must be a non-negative number"));
        assert!(message.contains("Category is required"));
    }

    #[test]
    fn create_payload_defaults_in_stock_to_true() {
        let new = validate_product_data(CreateProductRequest {
            name: Some("Keyboard".into()),
            price: Some(49.99),
            category: Some("Electronics".into()),
            in_stock: None,
        })
        .expect("valid payload");
        assert!(new.in_stock);
        assert_eq!(new.name, "Keyboard");
    }
}
