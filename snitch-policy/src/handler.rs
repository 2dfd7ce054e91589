use snitch_common::PolicyEvent;
use std::fmt;

/// Applies policy events on behalf of the gRPC service
///
/// Each method returns whether the event was applied.
pub trait PolicyHandler: Send + Sync + 'static {
    fn update_container_policy(&self, event: &PolicyEvent) -> bool;

    fn update_host_policy(&self, event: &PolicyEvent) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyKind {
    Container,
    Host,
}

impl PolicyKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            PolicyKind::Container => "Container",
            PolicyKind::Host => "Host",
        }
    }

    /// Route an event to the handler method for this kind
    pub fn apply<H: PolicyHandler + ?Sized>(&self, handler: &H, event: &PolicyEvent) -> bool {
        match self {
            PolicyKind::Container => handler.update_container_policy(event),
            PolicyKind::Host => handler.update_host_policy(event),
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
