//! Staff-managed deposit instructions.

use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, NewPaymentMethodCmd, PaymentMethod, ResultEngine, payment_methods,
    util::{normalize_optional_text, normalize_required_text},
};

use super::{Engine, with_tx};

impl Engine {
    pub async fn create_payment_method(
        &self,
        cmd: NewPaymentMethodCmd,
    ) -> ResultEngine<PaymentMethod> {
        let name = normalize_required_text(&cmd.name, "name")?;
        let instructions = normalize_required_text(&cmd.instructions, "instructions")?;

        let mut method = PaymentMethod::new(name, instructions, cmd.min_amount_minor)?;
        method.icon_ref = normalize_optional_text(cmd.icon_ref.as_deref());
        method.payment_url = normalize_optional_text(cmd.payment_url.as_deref());

        payment_methods::ActiveModel::from(&method)
            .insert(&self.database)
            .await?;
        Ok(method)
    }

    /// Toggles a method in or out of the deposit flow without deleting its
    /// instructions.
    pub async fn set_payment_method_active(
        &self,
        method_id: Uuid,
        active: bool,
    ) -> ResultEngine<PaymentMethod> {
        with_tx!(self, |db_tx| {
            let model = payment_methods::Entity::find_by_id(method_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| {
                    EngineError::KeyNotFound("payment method not exists".to_string())
                })?;

            let method_active = payment_methods::ActiveModel {
                id: ActiveValue::Set(model.id.clone()),
                active: ActiveValue::Set(active),
                ..Default::default()
            };
            let updated = method_active.update(&db_tx).await?;
            PaymentMethod::try_from(updated)
        })
    }

    pub async fn list_payment_methods(
        &self,
        active_only: bool,
    ) -> ResultEngine<Vec<PaymentMethod>> {
        let mut query = payment_methods::Entity::find().order_by_asc(payment_methods::Column::Name);
        if active_only {
            query = query.filter(payment_methods::Column::Active.eq(true));
        }

        let models = query.all(&self.database).await?;
        models.into_iter().map(PaymentMethod::try_from).collect()
    }
}
