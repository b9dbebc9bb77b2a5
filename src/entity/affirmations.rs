use sea_orm::entity::prelude::*;

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "affirmations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub rowid: i64,
    #[sea_orm(unique)]
    pub id: String,
    pub text: String,
    pub category: String,
    pub is_active: bool,
    pub created_at_us: i64,
    pub updated_at_us: i64,
}

impl ActiveModelBehavior for ActiveModel {}
