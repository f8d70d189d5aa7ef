pub use session::SessionStore;

mod session;
