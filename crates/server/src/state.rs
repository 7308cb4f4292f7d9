use service::{Repositories, Services};

/// Shared handler state: the domain services over one set of repositories.
#[derive(Clone)]
pub struct ServerState {
    pub services: Services,
}

impl ServerState {
    pub fn new(repos: &Repositories) -> Self {
        Self { services: Services::new(repos) }
    }
}
