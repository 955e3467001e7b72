pub mod current_player;
pub mod draft_id;
pub mod validated_json;

pub use current_player::CurrentPlayer;
pub use draft_id::DraftId;
pub use validated_json::ValidatedJson;
