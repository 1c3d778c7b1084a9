/// Domain services.
///
/// Both API surfaces are thin adapters over these two services, so the
/// validation and ownership rules exist exactly once.
pub mod accounts;
pub mod posts;

pub use accounts::AccountService;
pub use posts::{PostDraft, PostPage, PostService};
