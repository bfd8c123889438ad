//! Sea-ORM entities for the categories and products tables

use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue::Set;

pub use categories::Entity as CategoriesEntity;
pub use products::Entity as ProductsEntity;

pub mod categories {
    use super::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "categories")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub name: String,
        pub created_date: DateTimeWithTimeZone,
        pub version: i32,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(has_many = "super::products::Entity")]
        Products,
    }

    impl Related<super::products::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Products.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}

    impl From<Model> for crate::models::Category {
        fn from(model: Model) -> Self {
            Self {
                id: model.id,
                name: model.name,
                created_date: model.created_date.into(),
                version: model.version,
            }
        }
    }

    impl From<crate::models::CreateCategory> for ActiveModel {
        fn from(input: crate::models::CreateCategory) -> Self {
            ActiveModel {
                name: Set(input.name),
                created_date: Set(chrono::Utc::now().into()),
                version: Set(1),
                ..Default::default()
            }
        }
    }
}

pub mod products {
    use super::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "products")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub name: String,
        pub price: f64,
        pub category_id: i32,
        pub created_date: DateTimeWithTimeZone,
        pub version: i32,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::categories::Entity",
            from = "Column::CategoryId",
            to = "super::categories::Column::Id",
            on_update = "NoAction",
            on_delete = "Restrict"
        )]
        Category,
    }

    impl Related<super::categories::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Category.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}

    impl From<Model> for crate::models::Product {
        fn from(model: Model) -> Self {
            Self {
                id: model.id,
                name: model.name,
                price: model.price,
                category_id: model.category_id,
                created_date: model.created_date.into(),
                version: model.version,
            }
        }
    }

    impl From<crate::models::CreateProduct> for ActiveModel {
        fn from(input: crate::models::CreateProduct) -> Self {
            ActiveModel {
                name: Set(input.name),
                price: Set(input.price),
                category_id: Set(input.category_id),
                created_date: Set(chrono::Utc::now().into()),
                version: Set(1),
                ..Default::default()
            }
        }
    }
}
