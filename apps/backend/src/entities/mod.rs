pub mod drafts;

pub use drafts::Entity as Drafts;
pub use drafts::Model as DraftRow;
