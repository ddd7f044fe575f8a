mod lifecycle;
mod session;

pub use lifecycle::LifecycleStore;
pub use session::SessionManager;
