//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.
//!
//! Every handler follows the same steps: parse the path id, decode the body when
//! one is expected, run exactly one service operation under the request deadline,
//! then write either the success payload or the error mapped by `Failure`.

use crate::web::{
    deadline::Deadline,
    response::{decode_json, parse_path_id, send_json, ErrorResponse, Failure, OrFail},
    state::AppState,
};
use axum::{
    extract::{
        rejection::{BytesRejection, PathRejection},
        Path, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use qa_core::domain::{Answer, Question};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{OpenApi, ToSchema};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        list_questions_handler,
        create_question_handler,
        get_question_handler,
        delete_question_handler,
        create_answer_handler,
        get_answer_handler,
        delete_answer_handler,
        health_handler,
    ),
    components(
        schemas(
            CreateQuestionRequest,
            CreateAnswerRequest,
            QuestionListResponse,
            QuestionSummary,
            QuestionResponse,
            QuestionDetailResponse,
            AnswerSummary,
            AnswerResponse,
            ErrorResponse,
        )
    ),
    tags(
        (name = "Questions API", description = "Questions and the answers posted to them.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// Payload for creating a question. A missing field decodes as empty text.
#[derive(Deserialize, ToSchema)]
pub struct CreateQuestionRequest {
    #[serde(default)]
    pub text: String,
}

/// Payload for answering a question.
#[derive(Deserialize, ToSchema)]
pub struct CreateAnswerRequest {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub text: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct QuestionSummary {
    pub id: i64,
    pub text: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct QuestionListResponse {
    pub questions: Vec<QuestionSummary>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct QuestionResponse {
    pub id: i64,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// A question with every answer posted to it, newest first.
#[derive(Serialize, Deserialize, ToSchema)]
pub struct QuestionDetailResponse {
    pub id: i64,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub answers: Vec<AnswerSummary>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct AnswerSummary {
    pub id: i64,
    pub user_id: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct AnswerResponse {
    pub id: i64,
    pub question_id: i64,
    pub user_id: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl From<Question> for QuestionSummary {
    fn from(q: Question) -> Self {
        Self { id: q.id, text: q.text }
    }
}

impl From<Question> for QuestionResponse {
    fn from(q: Question) -> Self {
        Self {
            id: q.id,
            text: q.text,
            created_at: q.created_at,
        }
    }
}

impl From<Answer> for AnswerSummary {
    fn from(a: Answer) -> Self {
        Self {
            id: a.id,
            user_id: a.user_id,
            text: a.text,
            created_at: a.created_at,
        }
    }
}

impl From<Answer> for AnswerResponse {
    fn from(a: Answer) -> Self {
        Self {
            id: a.id,
            question_id: a.question_id,
            user_id: a.user_id,
            text: a.text,
            created_at: a.created_at,
        }
    }
}

//=========================================================================================
// Question Handlers
//=========================================================================================

/// List all questions, most recent first.
#[utoipa::path(
    get,
    path = "/questions/",
    responses(
        (status = 200, description = "All questions", body = QuestionListResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
pub async fn list_questions_handler(
    State(app_state): State<Arc<AppState>>,
    deadline: Deadline,
) -> Result<Response, Failure> {
    const CONTEXT: &str = "Failed to list questions";

    let questions = deadline
        .run(app_state.questions.get_all_questions())
        .await
        .or_fail(CONTEXT)?;

    let response = QuestionListResponse {
        questions: questions.into_iter().map(QuestionSummary::from).collect(),
    };
    Ok(send_json(StatusCode::OK, &response))
}

/// Create a question. Question text must be non-blank and unique.
#[utoipa::path(
    post,
    path = "/questions/",
    request_body = CreateQuestionRequest,
    responses(
        (status = 201, description = "Question created", body = QuestionResponse),
        (status = 400, description = "Malformed JSON or blank text", body = ErrorResponse),
        (status = 409, description = "A question with this text exists", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
pub async fn create_question_handler(
    State(app_state): State<Arc<AppState>>,
    deadline: Deadline,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, Failure> {
    const CONTEXT: &str = "Failed to create question";

    let request: CreateQuestionRequest = decode_json(body).or_fail(CONTEXT)?;

    let question = deadline
        .run(app_state.questions.create_question(&request.text))
        .await
        .or_fail(CONTEXT)?;

    Ok(send_json(StatusCode::CREATED, &QuestionResponse::from(question)))
}

/// Fetch a question together with its answers.
#[utoipa::path(
    get,
    path = "/questions/{id}",
    params(("id" = i64, Path, description = "Question id")),
    responses(
        (status = 200, description = "The question and its answers", body = QuestionDetailResponse),
        (status = 400, description = "Id is not an integer", body = ErrorResponse),
        (status = 404, description = "No such question", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
pub async fn get_question_handler(
    State(app_state): State<Arc<AppState>>,
    deadline: Deadline,
    path: Result<Path<String>, PathRejection>,
) -> Result<Response, Failure> {
    const CONTEXT: &str = "Failed to get question";

    let id = parse_path_id(path).or_fail(CONTEXT)?;

    let question = deadline
        .run(app_state.questions.get_question(id))
        .await
        .or_fail(CONTEXT)?;
    let answers = deadline
        .run(app_state.answers.get_answers_by_question(id))
        .await
        .or_fail("Failed to get answers of question")?;

    let response = QuestionDetailResponse {
        id: question.id,
        text: question.text,
        created_at: question.created_at,
        answers: answers.into_iter().map(AnswerSummary::from).collect(),
    };
    Ok(send_json(StatusCode::OK, &response))
}

/// Delete a question and all of its answers.
#[utoipa::path(
    delete,
    path = "/questions/{id}",
    params(("id" = i64, Path, description = "Question id")),
    responses(
        (status = 204, description = "Question deleted"),
        (status = 400, description = "Id is not an integer", body = ErrorResponse),
        (status = 404, description = "No such question", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
pub async fn delete_question_handler(
    State(app_state): State<Arc<AppState>>,
    deadline: Deadline,
    path: Result<Path<String>, PathRejection>,
) -> Result<Response, Failure> {
    const CONTEXT: &str = "Failed to delete question";

    let id = parse_path_id(path).or_fail(CONTEXT)?;

    deadline
        .run(app_state.questions.delete_question(id))
        .await
        .or_fail(CONTEXT)?;

    Ok(StatusCode::NO_CONTENT.into_response())
}

//=========================================================================================
// Answer Handlers
//=========================================================================================

/// Post an answer to an existing question.
#[utoipa::path(
    post,
    path = "/questions/{id}/answers/",
    params(("id" = i64, Path, description = "Id of the question being answered")),
    request_body = CreateAnswerRequest,
    responses(
        (status = 201, description = "Answer created", body = AnswerResponse),
        (
            status = 400,
            description = "Bad id, malformed JSON, blank user id or text",
            body = ErrorResponse
        ),
        (status = 404, description = "No such question", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
pub async fn create_answer_handler(
    State(app_state): State<Arc<AppState>>,
    deadline: Deadline,
    path: Result<Path<String>, PathRejection>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, Failure> {
    const CONTEXT: &str = "Failed to create answer";

    let question_id = parse_path_id(path).or_fail(CONTEXT)?;
    let request: CreateAnswerRequest = decode_json(body).or_fail(CONTEXT)?;

    let answer = deadline
        .run(
            app_state
                .answers
                .create_answer(question_id, &request.user_id, &request.text),
        )
        .await
        .or_fail(CONTEXT)?;

    Ok(send_json(StatusCode::CREATED, &AnswerResponse::from(answer)))
}

/// Fetch a single answer.
#[utoipa::path(
    get,
    path = "/answers/{id}",
    params(("id" = i64, Path, description = "Answer id")),
    responses(
        (status = 200, description = "The answer", body = AnswerResponse),
        (status = 400, description = "Id is not an integer", body = ErrorResponse),
        (status = 404, description = "No such answer", body = ErrorResponse)
    )
)]
pub async fn get_answer_handler(
    State(app_state): State<Arc<AppState>>,
    deadline: Deadline,
    path: Result<Path<String>, PathRejection>,
) -> Result<Response, Failure> {
    const CONTEXT: &str = "Failed to get answer";

    let id = parse_path_id(path).or_fail(CONTEXT)?;

    let answer = deadline
        .run(app_state.answers.get_answer(id))
        .await
        .or_fail(CONTEXT)?;

    Ok(send_json(StatusCode::OK, &AnswerResponse::from(answer)))
}

/// Delete a single answer.
#[utoipa::path(
    delete,
    path = "/answers/{id}",
    params(("id" = i64, Path, description = "Answer id")),
    responses(
        (status = 204, description = "Answer deleted"),
        (status = 400, description = "Id is not an integer", body = ErrorResponse),
        (status = 404, description = "No such answer", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
pub async fn delete_answer_handler(
    State(app_state): State<Arc<AppState>>,
    deadline: Deadline,
    path: Result<Path<String>, PathRejection>,
) -> Result<Response, Failure> {
    const CONTEXT: &str = "Failed to delete answer";

    let id = parse_path_id(path).or_fail(CONTEXT)?;

    deadline
        .run(app_state.answers.delete_answer(id))
        .await
        .or_fail(CONTEXT)?;

    Ok(StatusCode::NO_CONTENT.into_response())
}

//=========================================================================================
// Health
//=========================================================================================

/// Liveness probe.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (
            status = 200,
            description = "Server is running",
            body = String,
            content_type = "text/plain"
        )
    )
)]
pub async fn health_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        "OK",
    )
}
