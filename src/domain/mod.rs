//! Domain layer: foundation value objects and the subscription
//! reconciliation core.

pub mod foundation;
pub mod subscription;
