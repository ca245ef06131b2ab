//! Data sources, one module per type

pub mod cbh_instances;
pub mod sdrs_domain;
pub mod sms_source_servers;

pub use cbh_instances::CbhInstancesDataSource;
pub use sdrs_domain::SdrsDomainDataSource;
pub use sms_source_servers::SmsSourceServersDataSource;
