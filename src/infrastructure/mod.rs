pub mod credential;

pub use credential::{
    with_credential, CredentialGate, CredentialSlot, EnvCredentialGate, GateOutcome,
};
