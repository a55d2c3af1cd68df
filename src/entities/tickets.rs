use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Width of the `owner_name` column
pub const OWNER_NAME_MAX_LEN: usize = 50;

/// Numbered ticket inside a round
/// Row invariants maintained by the services:
/// - is_taken = false => owner_name IS NULL and has_won = false
/// - has_won = true => is_taken = true
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "tickets")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub round_id: i32,
    pub number: i32,
    pub owner_name: Option<String>,
    pub is_taken: bool,
    pub has_won: bool,
    pub claimed_at: Option<DateTime<Utc>>,
    pub won_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::lottery_rounds::Entity",
        from = "Column::RoundId",
        to = "super::lottery_rounds::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Round,
}

impl Related<super::lottery_rounds::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Round.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
