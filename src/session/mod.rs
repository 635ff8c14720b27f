pub mod answers;
pub mod controller;
pub mod prompt;
pub mod record;
pub mod state;

pub use answers::AnswerTable;
pub use controller::{PhaseEvent, PhaseSnapshot, SessionPhaseController};
pub use prompt::PromptFollower;
pub use record::{CloudPoint, QuestionnaireAnswer, SessionRecord};
pub use state::{Phase, PhaseTimer, Window};
