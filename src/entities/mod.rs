//! Entities module - the interaction model and its sorted collection
//!
//! No UI here; widgets render these, the sync layer persists them.

pub mod interaction;
pub mod interaction_list;

pub use interaction::{
    ContactFormConfig, CtaConfig, DownloadConfig, FeedbackConfig, Interaction, InteractionConfig,
    InteractionId, InteractionKind, InteractionPatch, PauseConfig, PollConfig, QuestionConfig,
    QuizConfig, ScreenPosition, SpecialOfferConfig, TipConfig,
};
pub use interaction_list::InteractionList;
