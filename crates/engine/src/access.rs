/// Role of whoever drives the engine. Authentication happens elsewhere;
/// the engine only asks whether a role may run an import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn may_import(&self) -> bool {
        matches!(self, Role::Admin)
    }
}
