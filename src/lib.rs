pub mod answer_service;
pub mod chat;
pub mod config;
pub mod constants;
pub mod conversation;
pub mod interpreter;
pub mod message;
pub mod render;
pub mod session;
pub mod web_server;

pub use answer_service::{AnswerService, HttpAnswerService, TransportError};
pub use config::Settings;
pub use conversation::{ConversationStore, RequestStatus, Snapshot, StoreError};
pub use interpreter::{interpret, try_interpret, InterpretError};
pub use message::{ChartKind, DataPoint, Message, Role, Visualization};
pub use session::{ChatSession, PendingQuery};
