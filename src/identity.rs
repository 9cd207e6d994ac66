use uuid::Uuid;

/// Source of identities for new entries.
pub trait IdentitySource: Send + Sync {
    fn next_identity(&self) -> crate::Result<Uuid>;
}

/// Random (v4) UUIDs: 122 random bits per identity.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIdentity;

impl IdentitySource for RandomIdentity {
    fn next_identity(&self) -> crate::Result<Uuid> {
        Ok(Uuid::new_v4())
    }
}
