use bson::doc;
use mongodb::{Database, IndexModel, options::IndexOptions};
use tracing::info;

async fn ensure(
    db: &Database,
    collection: &str,
    models: Vec<IndexModel>,
) -> Result<(), mongodb::error::Error> {
    db.collection::<bson::Document>(collection)
        .create_indexes(models)
        .await?;
    info!(collection, "Indexes ensured");
    Ok(())
}

pub async fn ensure_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    // Sparse: users without an email must not collide on the null key
    let unique = IndexOptions::builder().unique(true).sparse(true).build();

    ensure(
        db,
        "users",
        vec![
            IndexModel::builder()
                .keys(doc! { "email": 1 })
                .options(unique)
                .build(),
            IndexModel::builder().keys(doc! { "mobile": 1 }).build(),
        ],
    )
    .await?;

    // The sweep and the feed both scan per-owner by expiry date
    ensure(
        db,
        "items",
        vec![
            IndexModel::builder()
                .keys(doc! { "owner_id": 1, "expiry_date": 1 })
                .build(),
            IndexModel::builder()
                .keys(doc! { "owner_id": 1, "category": 1 })
                .build(),
        ],
    )
    .await?;

    Ok(())
}
