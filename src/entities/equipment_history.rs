use sea_orm::entity::prelude::*;

/// Append-only audit trail written as a side effect of equipment
/// create/update/discard.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "equipment_history")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub equipment_id: i32,

    /// Acting user
    pub user_id: i32,

    /// `CADASTRO`, `EDICAO` or `DESCARTE`
    pub action: String,

    /// Changed field name, for `EDICAO` and `DESCARTE` rows
    pub field: Option<String>,

    pub old_value: Option<String>,

    pub new_value: Option<String>,

    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::equipment::Entity",
        from = "Column::EquipmentId",
        to = "super::equipment::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Equipment,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Users,
}

impl Related<super::equipment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Equipment.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
