//! Managed resources, one module per resource type

pub mod cbh_instance;
pub mod compute_instance;
pub mod cse_engine;
pub mod cse_microservice;
pub mod cts_notification;
pub mod cts_tracker;
pub mod esw_instance;
pub mod sdrs_protected_instance;
pub mod sdrs_protection_group;
pub mod sms_task;

pub use cbh_instance::CbhInstanceResource;
pub use compute_instance::ComputeInstanceResource;
pub use cse_engine::CseEngineResource;
pub use cse_microservice::CseMicroserviceResource;
pub use cts_notification::CtsNotificationResource;
pub use cts_tracker::CtsTrackerResource;
pub use esw_instance::EswInstanceResource;
pub use sdrs_protected_instance::SdrsProtectedInstanceResource;
pub use sdrs_protection_group::SdrsProtectionGroupResource;
pub use sms_task::SmsTaskResource;
