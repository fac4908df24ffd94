pub mod domain;
pub mod error;
pub mod ports;
pub mod services;
pub mod validation;

pub use domain::{Answer, AnswerId, NewAnswer, Question, QuestionId};
pub use error::{DomainError, DomainResult};
pub use ports::{AnswerRepository, PortError, PortResult, QuestionRepository};
pub use services::{AnswerManager, AnswerService, QuestionManager, QuestionService};
