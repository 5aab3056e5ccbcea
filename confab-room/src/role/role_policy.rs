use confab_core::{LinkRole, SessionRole, Topology};

/// Session role of a participant, decided once when its subscription is confirmed.
pub fn decide_role(self_is_first: bool, topology: Topology) -> SessionRole {
    match topology {
        Topology::Mesh => SessionRole::Peer,
        Topology::HubSpoke if self_is_first => SessionRole::Host,
        Topology::HubSpoke => SessionRole::Student,
    }
}

/// Decides who offers on each link so that at most one offer exists per pair.
///
/// Late joiners never offer: they broadcast readiness and whoever is entitled
/// to initiate toward them answers that broadcast with an offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RolePolicy {
    topology: Topology,
}

impl RolePolicy {
    pub fn new(topology: Topology) -> Self {
        Self { topology }
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }

    pub fn decide_role(&self, self_is_first: bool) -> SessionRole {
        decide_role(self_is_first, self.topology)
    }

    /// Role toward one remote participant.
    ///
    /// Host offers to everybody and students never do. In a mesh the earlier
    /// joiner of the pair offers to the later one.
    pub fn link_role(&self, role: SessionRole, remote_joined_after_self: bool) -> LinkRole {
        match role {
            SessionRole::Host => LinkRole::Initiator,
            SessionRole::Student => LinkRole::Responder,
            SessionRole::Peer if remote_joined_after_self => LinkRole::Initiator,
            SessionRole::Peer => LinkRole::Responder,
        }
    }

    /// The Host only waits for readiness; everyone else announces it.
    pub fn announces_readiness(&self, role: SessionRole) -> bool {
        role != SessionRole::Host
    }
}
