mod components;

mod login;
pub use login::Login;

mod dashboard;
pub use dashboard::Dashboard;

mod users;
pub use users::Users;

mod opportunities;
pub use opportunities::Opportunities;

mod applications;
pub use applications::Applications;
