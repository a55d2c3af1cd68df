//! Shared fixtures: an in-memory SQLite store with the real migrations and
//! the services wired the same way `main` wires them.

#![allow(dead_code)]

use lottery_backend::config::LotteryConfig;
use lottery_backend::database::run_migrations;
use lottery_backend::entities::{round_entity as rounds, ticket_entity as tickets};
use lottery_backend::services::{
    AllocationService, DrawService, RoundEvents, RoundService, StatisticsService,
};
use sea_orm::{
    ColumnTrait, ConnectOptions, Database, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder,
};

pub struct TestLottery {
    pub db: DatabaseConnection,
    pub config: LotteryConfig,
    pub events: RoundEvents,
    pub rounds: RoundService,
    pub allocation: AllocationService,
    pub draw: DrawService,
    pub stats: StatisticsService,
}

pub async fn setup_db() -> DatabaseConnection {
    // one connection: every pooled connection to :memory: would be its own
    // database. Transactions therefore run one at a time and SQLite ignores
    // FOR SHARE / FOR UPDATE, so nothing here exercises lock contention.
    let mut options = ConnectOptions::new("sqlite::memory:".to_string());
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options)
        .await
        .expect("sqlite in-memory database should open");
    run_migrations(&db).await.expect("migrations should apply");
    db
}

pub async fn setup(pool_size: i32) -> TestLottery {
    services(setup_db().await, pool_size)
}

/// Services over an already migrated store
pub fn services(db: DatabaseConnection, pool_size: i32) -> TestLottery {
    let config = LotteryConfig {
        pool_size,
        ..Default::default()
    };
    let events = RoundEvents::default();
    TestLottery {
        rounds: RoundService::new(db.clone(), config.clone(), events.clone()),
        allocation: AllocationService::new(db.clone(), config.clone(), events.clone()),
        draw: DrawService::new(db.clone(), events.clone()),
        stats: StatisticsService::new(db.clone(), config.clone()),
        db,
        config,
        events,
    }
}

pub async fn round_tickets(db: &DatabaseConnection, round_id: i32) -> Vec<tickets::Model> {
    tickets::Entity::find()
        .filter(tickets::Column::RoundId.eq(round_id))
        .order_by_asc(tickets::Column::Number)
        .all(db)
        .await
        .expect("ticket query")
}

pub async fn ticket(db: &DatabaseConnection, round_id: i32, number: i32) -> tickets::Model {
    tickets::Entity::find()
        .filter(tickets::Column::RoundId.eq(round_id))
        .filter(tickets::Column::Number.eq(number))
        .one(db)
        .await
        .expect("ticket query")
        .expect("ticket exists")
}

pub async fn all_rounds(db: &DatabaseConnection) -> Vec<rounds::Model> {
    rounds::Entity::find()
        .order_by_asc(rounds::Column::Id)
        .all(db)
        .await
        .expect("round query")
}

/// Row and cross-row invariants that must hold at every observed instant
pub async fn assert_invariants(db: &DatabaseConnection) {
    let rounds = all_rounds(db).await;
    assert!(
        rounds.iter().filter(|r| r.is_active).count() <= 1,
        "more than one active round"
    );

    for round in rounds {
        let list = round_tickets(db, round.id).await;
        let mut winners = std::collections::HashSet::new();
        for t in &list {
            if !t.is_taken {
                assert!(t.owner_name.is_none(), "free ticket {} has an owner", t.number);
                assert!(!t.has_won, "free ticket {} has won", t.number);
            }
            if t.has_won {
                assert!(t.is_taken, "winning ticket {} is not taken", t.number);
                let owner = t.owner_name.clone().expect("winner has owner");
                assert!(
                    winners.insert(owner.clone()),
                    "{owner} won twice in round {}",
                    round.id
                );
            }
        }
    }
}
