mod amount;
mod brand;
mod id;
mod limit_type;
mod period;
mod status;

pub use self::{amount::*, brand::*, id::*, limit_type::*, period::*, status::*};
use destructure::Destructure;
use serde::{Deserialize, Serialize};
use vodca::References;

/// Persisted record describing a user's numeric limit, its ceiling,
/// accumulated progress and reset cadence. One record per user id.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize, Destructure, References)]
#[serde(rename_all = "camelCase")]
pub struct UserLimit {
    user_id: UserId,
    user_limit_id: UserLimitId,
    brand_id: BrandId,
    currency_code: CurrencyCode,
    value: LimitAmount,
    progress: LimitAmount,
    period: LimitPeriod,
    status: LimitStatus,
    #[serde(rename = "type")]
    limit_type: LimitType,
    active_from: i64,
}

impl UserLimit {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_id: UserId,
        user_limit_id: UserLimitId,
        brand_id: BrandId,
        currency_code: CurrencyCode,
        value: LimitAmount,
        progress: LimitAmount,
        period: LimitPeriod,
        status: LimitStatus,
        limit_type: LimitType,
        active_from: i64,
    ) -> Self {
        Self {
            user_id,
            user_limit_id,
            brand_id,
            currency_code,
            value,
            progress,
            period,
            status,
            limit_type,
            active_from,
        }
    }
}
