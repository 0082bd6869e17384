use contracts::domain::a001_package::PackageId;
use contracts::domain::a005_voucher::aggregate::Voucher;
use serde::{Deserialize, Serialize};

use sea_orm::entity::prelude::*;

use sea_orm::{ConnectionTrait, DatabaseBackend, QueryOrder, Set, Statement};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a005_voucher")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub code: String,
    pub order_id: String,
    pub package_id: String,
    pub package_name: String,
    pub price: i64,
    pub accounts: i32,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub status: String,
    pub redeemed: bool,
    pub redeemed_by: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Voucher {
    type Error = anyhow::Error;

    fn try_from(m: Model) -> Result<Self, Self::Error> {
        Ok(Voucher {
            code: m.code,
            package_id: m.package_id.parse::<PackageId>()?,
            package_name: m.package_name,
            price: m.price,
            accounts: m.accounts.max(0) as u32,
            order_id: m.order_id,
            customer_name: m.customer_name,
            customer_email: m.customer_email,
            customer_phone: m.customer_phone,
            redeemed: m.redeemed,
            redeemed_by: m.redeemed_by,
            created_at: m.created_at,
        })
    }
}

/// Fails with a UNIQUE violation on a repeated code or order id
pub async fn insert<C: ConnectionTrait>(db: &C, voucher: &Voucher) -> anyhow::Result<()> {
    let active = ActiveModel {
        code: Set(voucher.code.clone()),
        order_id: Set(voucher.order_id.clone()),
        package_id: Set(voucher.package_id.as_str().to_string()),
        package_name: Set(voucher.package_name.clone()),
        price: Set(voucher.price),
        accounts: Set(voucher.accounts as i32),
        customer_name: Set(voucher.customer_name.clone()),
        customer_email: Set(voucher.customer_email.clone()),
        customer_phone: Set(voucher.customer_phone.clone()),
        status: Set("paid".to_string()),
        redeemed: Set(voucher.redeemed),
        redeemed_by: Set(voucher.redeemed_by.clone()),
        created_at: Set(voucher.created_at),
    };
    active.insert(db).await?;
    Ok(())
}

pub async fn get_by_order_id<C: ConnectionTrait>(
    db: &C,
    order_id: &str,
) -> anyhow::Result<Option<Voucher>> {
    let result = Entity::find()
        .filter(Column::OrderId.eq(order_id))
        .one(db)
        .await?;
    result.map(Voucher::try_from).transpose()
}

pub async fn get_by_code<C: ConnectionTrait>(db: &C, code: &str) -> anyhow::Result<Option<Voucher>> {
    let result = Entity::find_by_id(code.to_string()).one(db).await?;
    result.map(Voucher::try_from).transpose()
}

pub async fn count_by_order_id<C: ConnectionTrait>(db: &C, order_id: &str) -> anyhow::Result<u64> {
    let count = Entity::find()
        .filter(Column::OrderId.eq(order_id))
        .count(db)
        .await?;
    Ok(count)
}

pub async fn list_all<C: ConnectionTrait>(db: &C) -> anyhow::Result<Vec<Voucher>> {
    let models = Entity::find()
        .order_by_desc(Column::CreatedAt)
        .all(db)
        .await?;
    models.into_iter().map(Voucher::try_from).collect()
}

/// false -> true exactly once. Returns false if already redeemed or unknown.
///
/// Storage primitive only: no route redeems vouchers yet.
pub async fn redeem<C: ConnectionTrait>(
    db: &C,
    code: &str,
    school_name: &str,
) -> anyhow::Result<bool> {
    let result = db
        .execute(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "UPDATE a005_voucher SET redeemed = 1, redeemed_by = ?
             WHERE code = ? AND redeemed = 0",
            [school_name.into(), code.into()],
        ))
        .await?;
    Ok(result.rows_affected() == 1)
}
