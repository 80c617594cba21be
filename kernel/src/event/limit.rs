use error_stack::ResultExt;
use serde::Deserialize;
use serde_json::Value;
use vodca::References;

use crate::entity::{
    BrandId, CurrencyCode, LimitAmount, LimitPeriod, LimitStatus, LimitType, UserId, UserLimit,
    UserLimitId,
};
use crate::error::KernelError;
use crate::event::Schema;

/// Payload of `USER_LIMIT_CREATED`.
#[derive(Debug, Clone, Deserialize, References)]
#[serde(rename_all = "camelCase")]
pub struct UserLimitCreatedPayload {
    user_id: UserId,
    user_limit_id: UserLimitId,
    brand_id: BrandId,
    currency_code: CurrencyCode,
    next_reset_time: i64,
    active_from: i64,
    period: LimitPeriod,
    status: LimitStatus,
    #[serde(rename = "type")]
    limit_type: LimitType,
    value: LimitAmount,
}

impl UserLimitCreatedPayload {
    pub fn parse(raw: &Value) -> error_stack::Result<Self, KernelError> {
        let mut schema = Schema::new(raw);
        schema.require_string("brandId");
        schema.require_string("currencyCode");
        schema.require_number("nextResetTime");
        schema.require_string("userId");
        schema.require_string("userLimitId");
        schema.require_number("activeFrom");
        schema.require_variant::<LimitPeriod>("period");
        schema.require_variant::<LimitStatus>("status");
        schema.require_variant::<LimitType>("type");
        schema.require_string("value");
        schema.finish()?;

        serde_json::from_value(raw.clone()).change_context_lazy(|| KernelError::Decode)
    }

    /// Builds the stored record. A new record has no prior usage, so
    /// `progress` starts at `"0"`.
    pub fn into_limit(self) -> UserLimit {
        UserLimit::new(
            self.user_id,
            self.user_limit_id,
            self.brand_id,
            self.currency_code,
            self.value,
            LimitAmount::zero(),
            self.period,
            self.status,
            self.limit_type,
            self.active_from,
        )
    }
}

/// Payload of `USER_LIMIT_PROGRESS_CHANGED`. `remainingAmount` is carried by
/// the wire format and schema-checked, but the additive
/// `previousProgress + amount` semantics is authoritative.
#[derive(Debug, Clone, Deserialize, References)]
#[serde(rename_all = "camelCase")]
pub struct UserLimitProgressChangedPayload {
    user_id: UserId,
    user_limit_id: UserLimitId,
    brand_id: BrandId,
    currency_code: CurrencyCode,
    next_reset_time: i64,
    amount: LimitAmount,
    previous_progress: LimitAmount,
    remaining_amount: LimitAmount,
}

impl UserLimitProgressChangedPayload {
    pub fn parse(raw: &Value) -> error_stack::Result<Self, KernelError> {
        let mut schema = Schema::new(raw);
        schema.require_string("brandId");
        schema.require_string("currencyCode");
        schema.require_number("nextResetTime");
        schema.require_string("userId");
        schema.require_string("userLimitId");
        schema.require_string("amount");
        schema.require_string("previousProgress");
        schema.require_string("remainingAmount");
        schema.finish()?;

        serde_json::from_value(raw.clone()).change_context_lazy(|| KernelError::Decode)
    }
}

/// Payload of `USER_LIMIT_RESET`. The reset-specific fields describe the
/// reset for consumers downstream; the mutation itself only zeroes progress.
#[derive(Debug, Clone, Deserialize, References)]
#[serde(rename_all = "camelCase")]
pub struct UserLimitResetPayload {
    user_id: UserId,
    user_limit_id: UserLimitId,
    brand_id: BrandId,
    currency_code: CurrencyCode,
    next_reset_time: i64,
    period: LimitPeriod,
    reset_amount: LimitAmount,
    reset_percentage: LimitAmount,
    #[serde(rename = "type")]
    limit_type: LimitType,
    unused_amount: LimitAmount,
}

impl UserLimitResetPayload {
    pub fn parse(raw: &Value) -> error_stack::Result<Self, KernelError> {
        let mut schema = Schema::new(raw);
        schema.require_string("brandId");
        schema.require_string("currencyCode");
        schema.require_number("nextResetTime");
        schema.require_string("userId");
        schema.require_string("userLimitId");
        schema.require_variant::<LimitPeriod>("period");
        schema.require_string("resetAmount");
        schema.require_string("resetPercentage");
        schema.require_variant::<LimitType>("type");
        schema.require_string("unusedAmount");
        schema.finish()?;

        serde_json::from_value(raw.clone()).change_context_lazy(|| KernelError::Decode)
    }
}
