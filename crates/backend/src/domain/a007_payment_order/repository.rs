use contracts::domain::a001_package::PackageId;
use contracts::domain::a007_payment_order::aggregate::PaymentOrder;
use contracts::usecases::u501_create_transaction::CustomerInfo;
use serde::{Deserialize, Serialize};

use sea_orm::entity::prelude::*;

use sea_orm::{ConnectionTrait, Set};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a007_payment_order")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub order_id: String,
    pub package_id: String,
    pub gross_amount: i64,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for PaymentOrder {
    type Error = anyhow::Error;

    fn try_from(m: Model) -> Result<Self, Self::Error> {
        Ok(PaymentOrder {
            order_id: m.order_id,
            package_id: m.package_id.parse::<PackageId>()?,
            gross_amount: m.gross_amount,
            customer: CustomerInfo {
                name: m.customer_name,
                email: m.customer_email,
                phone: m.customer_phone,
            },
            created_at: m.created_at,
        })
    }
}

/// Fails with a UNIQUE violation when the order id was already used
pub async fn insert<C: ConnectionTrait>(db: &C, order: &PaymentOrder) -> anyhow::Result<()> {
    let active = ActiveModel {
        order_id: Set(order.order_id.clone()),
        package_id: Set(order.package_id.as_str().to_string()),
        gross_amount: Set(order.gross_amount),
        customer_name: Set(order.customer.name.clone()),
        customer_email: Set(order.customer.email.clone()),
        customer_phone: Set(order.customer.phone.clone()),
        created_at: Set(order.created_at),
    };
    active.insert(db).await?;
    Ok(())
}

pub async fn get<C: ConnectionTrait>(db: &C, order_id: &str) -> anyhow::Result<Option<PaymentOrder>> {
    let result = Entity::find_by_id(order_id.to_string()).one(db).await?;
    result.map(PaymentOrder::try_from).transpose()
}
