use actix_web::{web, HttpResponse, Responder};
use log::{error, info, warn};
use serde_json::json;

use crate::decode::decode_reply;
use crate::llama::{LlamaError, LlamaStatus, SamplingParams};
use crate::prompt::build_prompt;
use crate::web::models::{ChatContext, ChatRequest, ChatResponse, HealthResponse};
use crate::web::AppState;

/// Number of knowledge base sentences injected into the prompt.
const RETRIEVAL_LIMIT: usize = 3;

const FALLBACK_RESPONSE: &str = "Je suis désolé, j'ai rencontré un problème en traitant votre demande. Pourriez-vous reformuler votre question ?";
const FALLBACK_RISK_HINT: &str = "Assurez-vous de toujours vérifier les sources avant de partager des informations sensibles.";
const FALLBACK_TOPIC: &str = "PHISHING";

// Root endpoint: static service metadata
pub async fn index() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "service": "CyberSensei AI",
        "version": "1.0.0",
        "model": "Mistral 7B Instruct",
        "status": "operational",
        "endpoints": {
            "chat": "POST /api/ai/chat",
            "health": "GET /health"
        }
    }))
}

// Health check endpoint: probes the llama.cpp server with a short timeout
pub async fn health_check(data: web::Data<AppState>) -> impl Responder {
    let llama_status = data.llama.probe().await;
    let healthy = llama_status == LlamaStatus::Healthy;
    if !healthy {
        warn!("llama.cpp server health check: {}", llama_status);
    }

    HttpResponse::Ok().json(HealthResponse {
        status: if healthy { "healthy" } else { "degraded" }.to_string(),
        llama_server: llama_status.to_string(),
        model_loaded: healthy,
        model_path: data.config.model_path.clone(),
    })
}

// Chat API endpoint: validate, retrieve, build prompt, infer, decode
pub async fn chat(data: web::Data<AppState>, req: web::Json<ChatRequest>) -> impl Responder {
    let req = req.into_inner();

    if let Err(details) = req.validate() {
        return HttpResponse::BadRequest().json(json!({
            "error": "Invalid request",
            "details": details,
        }));
    }

    info!(
        "Chat request from user {}: {}...",
        req.user_id.as_deref().unwrap_or("anonymous"),
        req.message.chars().take(50).collect::<String>()
    );

    let topic = req.context.as_ref().and_then(|c| c.topic.as_deref());
    let retrieved = data.knowledge.retrieve(&req.message, topic, RETRIEVAL_LIMIT);

    let prompt = build_prompt(
        &req.message,
        Some(req.role.as_str()),
        req.context.as_ref(),
        &retrieved,
    );

    let sampling = SamplingParams {
        temperature: req.temperature,
        max_tokens: req.max_tokens,
        top_p: 0.9,
        top_k: 40,
    };

    match data.llama.complete(&prompt, sampling).await {
        Ok(completion) => {
            let decoded = decode_reply(completion.content.trim());
            info!(
                "Response generated ({} tokens), suggested topic: {:?}",
                completion.tokens_predicted, decoded.suggested_next_exercise_topic
            );
            HttpResponse::Ok().json(ChatResponse {
                response: decoded.response,
                suggested_next_exercise_topic: decoded.suggested_next_exercise_topic,
                risk_hints: decoded.risk_hints,
            })
        }
        Err(e) => {
            error!("Inference error: {}", e);
            gateway_error_response(&e, req.context.as_ref())
        }
    }
}

/// Map a gateway failure to the client-facing response. Timeouts and
/// upstream status errors surface as fixed 5xx messages; anything else
/// masks the failure behind a degraded but well-formed answer.
fn gateway_error_response(error: &LlamaError, context: Option<&ChatContext>) -> HttpResponse {
    match error {
        LlamaError::Timeout => {
            HttpResponse::GatewayTimeout().json(json!({ "error": "AI model timeout" }))
        }
        LlamaError::Upstream { .. } => HttpResponse::ServiceUnavailable()
            .json(json!({ "error": "AI model service unavailable" })),
        _ => HttpResponse::Ok().json(fallback_response(context)),
    }
}

/// Degraded answer returned when the model could not be reached: a fixed
/// apology, the caller's current topic (or the default) as the suggestion,
/// and one generic risk hint.
fn fallback_response(context: Option<&ChatContext>) -> ChatResponse {
    let topic = context
        .and_then(|c| c.topic.clone())
        .unwrap_or_else(|| FALLBACK_TOPIC.to_string());
    ChatResponse {
        response: FALLBACK_RESPONSE.to_string(),
        suggested_next_exercise_topic: Some(topic),
        risk_hints: vec![FALLBACK_RISK_HINT.to_string()],
    }
}
