pub mod session;

pub use session::SessionRepository;

#[cfg(test)]
pub use session::MockSessionRepository;
