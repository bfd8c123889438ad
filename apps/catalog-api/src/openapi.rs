//! OpenAPI documentation configuration

use utoipa::OpenApi;

/// Combined OpenAPI documentation for the Catalog API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Catalog API",
        version = "0.1.0",
        description = "Category and product catalog with paged, filtered search",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    nest(
        (path = "/api/categories", api = domain_catalog::handlers::CategoriesApiDoc),
        (path = "/api/products", api = domain_catalog::handlers::ProductsApiDoc)
    )
)]
pub struct ApiDoc;
