use std::time::Duration;

use mongodb::{Database, IndexModel, options::IndexOptions};
use tracing::info;

use crate::models::{InviteCode, InviteRedemption, Job, RevokedSession, RoleProfile, User, Worker};

pub async fn ensure_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    // Accounts
    create_indexes(
        db,
        User::COLLECTION,
        vec![index_unique(bson::doc! { "email": 1 })],
    )
    .await?;

    // Signed-out sessions expire once their refresh tokens would have
    create_indexes(
        db,
        RevokedSession::COLLECTION,
        vec![index_ttl(bson::doc! { "forget_after": 1 })],
    )
    .await?;

    // Role profiles are keyed by account id (`_id`), nothing else to index
    create_indexes(db, RoleProfile::COLLECTION, vec![index(bson::doc! { "role": 1 })]).await?;

    // Invite codes
    create_indexes(
        db,
        InviteCode::COLLECTION,
        vec![
            index_unique(bson::doc! { "code": 1 }),
            index(bson::doc! { "active": 1, "target_role": 1 }),
        ],
    )
    .await?;

    // Redemption audit trail
    create_indexes(
        db,
        InviteRedemption::COLLECTION,
        vec![
            index(bson::doc! { "code": 1, "created_at": -1 }),
            index(bson::doc! { "account_id": 1 }),
        ],
    )
    .await?;

    // Workers
    create_indexes(
        db,
        Worker::COLLECTION,
        vec![
            index(bson::doc! { "account_id": 1 }),
            index(bson::doc! { "email": 1 }),
            index(bson::doc! { "name": 1 }),
        ],
    )
    .await?;

    // Jobs
    create_indexes(
        db,
        Job::COLLECTION,
        vec![
            index(bson::doc! { "created_at": -1 }),
            index(bson::doc! { "worker_id": 1, "start_date": -1 }),
            index(bson::doc! { "payment_status": 1 }),
        ],
    )
    .await?;

    info!("All indexes ensured");
    Ok(())
}

async fn create_indexes(
    db: &Database,
    collection: &str,
    indexes: Vec<IndexModel>,
) -> Result<(), mongodb::error::Error> {
    let coll = db.collection::<bson::Document>(collection);
    coll.create_indexes(indexes).await?;
    Ok(())
}

fn index(keys: bson::Document) -> IndexModel {
    IndexModel::builder().keys(keys).build()
}

fn index_unique(keys: bson::Document) -> IndexModel {
    IndexModel::builder()
        .keys(keys)
        .options(IndexOptions::builder().unique(true).build())
        .build()
}

fn index_ttl(keys: bson::Document) -> IndexModel {
    IndexModel::builder()
        .keys(keys)
        .options(IndexOptions::builder().expire_after(Duration::ZERO).build())
        .build()
}
