use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use axum_helpers::{
    errors::responses::{
        BadRequestValidationResponse, ConflictResponse, InternalServerErrorResponse,
        NotFoundResponse, ServiceUnavailableResponse, UnprocessableEntityResponse,
    },
    ValidatedJson,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, OpenApi, ToSchema};

use crate::error::CatalogResult;
use crate::models::{
    CategoryView, CreateCategory, CreateProduct, Page, ProductView, UpdateCategory, UpdateProduct,
};
use crate::pagination::PageParams;
use crate::query::{CategoryQuery, ProductQuery};
use crate::repository::CatalogRepository;
use crate::service::{CategoryService, ProductService};

const CATEGORIES_TAG: &str = "categories";
const PRODUCTS_TAG: &str = "products";

/// Query for the name-availability endpoints.
#[derive(Debug, Deserialize, IntoParams)]
pub struct NameQuery {
    /// Name to check, compared ignoring case and surrounding whitespace
    pub name: Option<String>,
}

/// Wire shape of the product-count endpoint.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductCountResponse {
    pub product_count: u64,
}

/// OpenAPI documentation for the category endpoints
#[derive(OpenApi)]
#[openapi(
    paths(
        list_categories,
        search_categories,
        check_category_name,
        create_category,
        get_category,
        update_category,
        delete_category,
        category_product_count,
    ),
    components(
        schemas(
            CategoryView,
            CreateCategory,
            UpdateCategory,
            Page<CategoryView>,
            ProductCountResponse,
        ),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            ConflictResponse,
            InternalServerErrorResponse,
            ServiceUnavailableResponse
        )
    ),
    tags(
        (name = CATEGORIES_TAG, description = "Category management endpoints")
    )
)]
pub struct CategoriesApiDoc;

/// OpenAPI documentation for the product endpoints
#[derive(OpenApi)]
#[openapi(
    paths(
        list_products,
        search_products,
        check_product_name,
        create_product,
        get_product,
        update_product,
        delete_product,
    ),
    components(
        schemas(
            ProductView,
            CreateProduct,
            UpdateProduct,
            Page<ProductView>,
        ),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            ConflictResponse,
            UnprocessableEntityResponse,
            InternalServerErrorResponse,
            ServiceUnavailableResponse
        )
    ),
    tags(
        (name = PRODUCTS_TAG, description = "Product management endpoints")
    )
)]
pub struct ProductsApiDoc;

/// Create the category router with all HTTP endpoints
pub fn categories_router<R: CatalogRepository + 'static>(service: CategoryService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route("/search", get(search_categories))
        .route("/check-name", get(check_category_name))
        .route(
            "/{id}",
            get(get_category).put(update_category).delete(delete_category),
        )
        .route("/{id}/product-count", get(category_product_count))
        .with_state(shared_service)
}

/// Create the product router with all HTTP endpoints
pub fn products_router<R: CatalogRepository + 'static>(service: ProductService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/search", get(search_products))
        .route("/check-name", get(check_product_name))
        .route(
            "/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .with_state(shared_service)
}

/// List categories, newest first
#[utoipa::path(
    get,
    path = "",
    tag = CATEGORIES_TAG,
    params(PageParams),
    responses(
        (status = 200, description = "One page of categories", body = Page<CategoryView>),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_categories<R: CatalogRepository>(
    State(service): State<Arc<CategoryService<R>>>,
    Query(params): Query<PageParams>,
) -> CatalogResult<Json<Page<CategoryView>>> {
    let page = service.search(CategoryQuery::default(), params).await?;
    Ok(Json(page))
}

/// Search categories by name substring
#[utoipa::path(
    get,
    path = "/search",
    tag = CATEGORIES_TAG,
    params(CategoryQuery, PageParams),
    responses(
        (status = 200, description = "One page of matching categories", body = Page<CategoryView>),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn search_categories<R: CatalogRepository>(
    State(service): State<Arc<CategoryService<R>>>,
    Query(query): Query<CategoryQuery>,
    Query(params): Query<PageParams>,
) -> CatalogResult<Json<Page<CategoryView>>> {
    let page = service.search(query, params).await?;
    Ok(Json(page))
}

/// Check whether a category name is already taken
#[utoipa::path(
    get,
    path = "/check-name",
    tag = CATEGORIES_TAG,
    params(NameQuery),
    responses(
        (status = 200, description = "Whether the name is taken", body = bool),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn check_category_name<R: CatalogRepository>(
    State(service): State<Arc<CategoryService<R>>>,
    Query(query): Query<NameQuery>,
) -> CatalogResult<Json<bool>> {
    let taken = service
        .name_taken(query.name.as_deref().unwrap_or(""))
        .await?;
    Ok(Json(taken))
}

/// Create a new category
#[utoipa::path(
    post,
    path = "",
    tag = CATEGORIES_TAG,
    request_body = CreateCategory,
    responses(
        (status = 201, description = "Category created successfully", body = CategoryView),
        (status = 400, response = BadRequestValidationResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_category<R: CatalogRepository>(
    State(service): State<Arc<CategoryService<R>>>,
    ValidatedJson(input): ValidatedJson<CreateCategory>,
) -> CatalogResult<impl IntoResponse> {
    let category = service.create(input).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// Get a category by id
#[utoipa::path(
    get,
    path = "/{id}",
    tag = CATEGORIES_TAG,
    params(
        ("id" = i32, Path, description = "Category id")
    ),
    responses(
        (status = 200, description = "Category found", body = CategoryView),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_category<R: CatalogRepository>(
    State(service): State<Arc<CategoryService<R>>>,
    Path(id): Path<i32>,
) -> CatalogResult<Json<CategoryView>> {
    let category = service.get(id).await?;
    Ok(Json(category))
}

/// Update a category
#[utoipa::path(
    put,
    path = "/{id}",
    tag = CATEGORIES_TAG,
    params(
        ("id" = i32, Path, description = "Category id")
    ),
    request_body = UpdateCategory,
    responses(
        (status = 200, description = "Category updated successfully", body = CategoryView),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_category<R: CatalogRepository>(
    State(service): State<Arc<CategoryService<R>>>,
    Path(id): Path<i32>,
    ValidatedJson(input): ValidatedJson<UpdateCategory>,
) -> CatalogResult<Json<CategoryView>> {
    let category = service.update(id, input).await?;
    Ok(Json(category))
}

/// Delete a category
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = CATEGORIES_TAG,
    params(
        ("id" = i32, Path, description = "Category id")
    ),
    responses(
        (status = 204, description = "Category deleted successfully"),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_category<R: CatalogRepository>(
    State(service): State<Arc<CategoryService<R>>>,
    Path(id): Path<i32>,
) -> CatalogResult<impl IntoResponse> {
    service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Number of products referencing a category
#[utoipa::path(
    get,
    path = "/{id}/product-count",
    tag = CATEGORIES_TAG,
    params(
        ("id" = i32, Path, description = "Category id")
    ),
    responses(
        (status = 200, description = "Product count for the category", body = ProductCountResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn category_product_count<R: CatalogRepository>(
    State(service): State<Arc<CategoryService<R>>>,
    Path(id): Path<i32>,
) -> CatalogResult<Json<ProductCountResponse>> {
    let product_count = service.product_count(id).await?;
    Ok(Json(ProductCountResponse { product_count }))
}

/// List products, newest first
#[utoipa::path(
    get,
    path = "",
    tag = PRODUCTS_TAG,
    params(PageParams),
    responses(
        (status = 200, description = "One page of products", body = Page<ProductView>),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_products<R: CatalogRepository>(
    State(service): State<Arc<ProductService<R>>>,
    Query(params): Query<PageParams>,
) -> CatalogResult<Json<Page<ProductView>>> {
    let page = service.search(ProductQuery::default(), params).await?;
    Ok(Json(page))
}

/// Search products by name substring and/or category
#[utoipa::path(
    get,
    path = "/search",
    tag = PRODUCTS_TAG,
    params(ProductQuery, PageParams),
    responses(
        (status = 200, description = "One page of matching products", body = Page<ProductView>),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn search_products<R: CatalogRepository>(
    State(service): State<Arc<ProductService<R>>>,
    Query(query): Query<ProductQuery>,
    Query(params): Query<PageParams>,
) -> CatalogResult<Json<Page<ProductView>>> {
    let page = service.search(query, params).await?;
    Ok(Json(page))
}

/// Check whether a product name is already taken
#[utoipa::path(
    get,
    path = "/check-name",
    tag = PRODUCTS_TAG,
    params(NameQuery),
    responses(
        (status = 200, description = "Whether the name is taken", body = bool),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn check_product_name<R: CatalogRepository>(
    State(service): State<Arc<ProductService<R>>>,
    Query(query): Query<NameQuery>,
) -> CatalogResult<Json<bool>> {
    let taken = service
        .name_taken(query.name.as_deref().unwrap_or(""))
        .await?;
    Ok(Json(taken))
}

/// Create a new product
#[utoipa::path(
    post,
    path = "",
    tag = PRODUCTS_TAG,
    request_body = CreateProduct,
    responses(
        (status = 201, description = "Product created successfully", body = ProductView),
        (status = 400, response = BadRequestValidationResponse),
        (status = 409, response = ConflictResponse),
        (status = 422, response = UnprocessableEntityResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_product<R: CatalogRepository>(
    State(service): State<Arc<ProductService<R>>>,
    ValidatedJson(input): ValidatedJson<CreateProduct>,
) -> CatalogResult<impl IntoResponse> {
    let product = service.create(input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Get a product by id
#[utoipa::path(
    get,
    path = "/{id}",
    tag = PRODUCTS_TAG,
    params(
        ("id" = i32, Path, description = "Product id")
    ),
    responses(
        (status = 200, description = "Product found", body = ProductView),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_product<R: CatalogRepository>(
    State(service): State<Arc<ProductService<R>>>,
    Path(id): Path<i32>,
) -> CatalogResult<Json<ProductView>> {
    let product = service.get(id).await?;
    Ok(Json(product))
}

/// Update a product
#[utoipa::path(
    put,
    path = "/{id}",
    tag = PRODUCTS_TAG,
    params(
        ("id" = i32, Path, description = "Product id")
    ),
    request_body = UpdateProduct,
    responses(
        (status = 200, description = "Product updated successfully", body = ProductView),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 422, response = UnprocessableEntityResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_product<R: CatalogRepository>(
    State(service): State<Arc<ProductService<R>>>,
    Path(id): Path<i32>,
    ValidatedJson(input): ValidatedJson<UpdateProduct>,
) -> CatalogResult<Json<ProductView>> {
    let product = service.update(id, input).await?;
    Ok(Json(product))
}

/// Delete a product
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = PRODUCTS_TAG,
    params(
        ("id" = i32, Path, description = "Product id")
    ),
    responses(
        (status = 204, description = "Product deleted successfully"),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_product<R: CatalogRepository>(
    State(service): State<Arc<ProductService<R>>>,
    Path(id): Path<i32>,
) -> CatalogResult<impl IntoResponse> {
    service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
