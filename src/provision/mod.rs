//! Atomic creation of the infrastructure an analysis calls for

pub mod engines;
pub mod memory;
pub mod provisioner;
pub mod store;
pub mod types;

pub use engines::{DatabaseEngine, DatabaseEngineRegistry, StandardEngine};
pub use memory::{FailurePoint, InMemoryStore, StoreSnapshot};
pub use provisioner::InfrastructureProvisioner;
pub use store::{
    AddressGenerator, DestinationResolver, ProvisioningTransaction, StaticDestinationResolver,
    SubdomainAddressGenerator, UnitOfWork,
};
pub use types::{
    ApplicationHandle, DatabaseCredentials, DatabaseHandle, Destination, Environment, GitConfig,
    NewApplication, NewDatabase, NewEnvVariable, NewResourceLink, ProvisioningResult,
    ResourceLinkHandle, VolumeHint,
};
