pub mod event;
pub mod transaction;

pub use event::{
    Event, EventStats, EventSubmission, EventType, InsertOutcome, SubmitOutcome,
};
pub use transaction::{
    InstructionPayload, LogNotification, ParsedInstruction, ParsedTransaction, PayloadEncoding,
    SignatureInfo,
};
