use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "equipment")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,

    pub model: String,

    #[sea_orm(unique)]
    pub serial_number: String,

    /// Numeric asset-tag string, when the item carries a patrimony plate
    pub asset_tag: Option<String>,

    pub location: Option<String>,

    /// `NO_DEPOSITO`, `FORA_DEPOSITO` or `DESCARTADO`
    pub status: String,

    /// Responsible user
    pub user_id: i32,

    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Users,
    #[sea_orm(has_many = "super::movements::Entity")]
    Movements,
    #[sea_orm(has_many = "super::equipment_history::Entity")]
    EquipmentHistory,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::movements::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Movements.def()
    }
}

impl Related<super::equipment_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EquipmentHistory.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
