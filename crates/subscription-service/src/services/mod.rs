//! Subscription and verification orchestration.

mod subscription;
mod verification;

pub use subscription::{
    Accepted, SubscribeRejection, SubscribeRequest, SubscriptionService, SubscriptionSettings,
    PHONE_SECRET_LEN,
};
pub use verification::{Confirmed, VerificationService, VerifyRejection};
