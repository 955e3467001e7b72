pub mod draft_flow;
pub mod notifier;
