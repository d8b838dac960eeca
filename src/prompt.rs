use crate::web::models::ChatContext;

const SYSTEM_PROMPT: &str = "Tu es CyberSensei, un assistant expert en cybersécurité. \n\
Tu fournis des réponses claires, précises et pédagogiques sur les sujets de sécurité informatique.\n\
Tu réponds TOUJOURS en français de manière professionnelle et accessible.";

/// Build the full Mistral-instruct prompt for one chat turn.
///
/// Pure string assembly: persona, optional role and learning context,
/// retrieved knowledge, the JSON output instructions, then the user message
/// wrapped in `[INST]` delimiters. The trailing open brace nudges the model
/// into emitting JSON immediately.
pub fn build_prompt(
    message: &str,
    role: Option<&str>,
    context: Option<&ChatContext>,
    retrieved_content: &str,
) -> String {
    let mut system_prompt = SYSTEM_PROMPT.to_string();

    if let Some(role) = role {
        system_prompt.push_str(&format!("\n\nL'utilisateur a le rôle: {role}"));
    }

    if let Some(context) = context {
        if let Some(topic) = &context.topic {
            system_prompt.push_str(&format!("\nSujet actuel: {topic}"));
        }
        if let Some(difficulty) = &context.difficulty {
            system_prompt.push_str(&format!("\nNiveau: {difficulty}"));
        }
        if let Some(last_results) = &context.last_results {
            system_prompt.push_str(&format!("\nDerniers résultats: {}", score_of(last_results)));
        }
    }

    if !retrieved_content.is_empty() {
        system_prompt.push_str(&format!(
            "\n\nContenu pertinent de la base de connaissances:\n{retrieved_content}"
        ));
    }

    system_prompt.push_str("\n\nRÉPONDS EN FORMAT JSON avec ces champs:");
    system_prompt.push_str("\n- response: ta réponse détaillée");
    system_prompt.push_str("\n- suggestedNextExerciseTopic: suggère un sujet pour le prochain exercice (ex: PHISHING, PASSWORDS, MALWARE, SOCIAL_ENGINEERING, NETWORK_SECURITY, DATA_PROTECTION)");
    system_prompt.push_str("\n- riskHints: liste de 1-3 conseils de sécurité pertinents");

    format!("[INST] {system_prompt}\n\nQuestion: {message} [/INST]\n\n{{")
}

// Scores arrive as either a bare number or a display string.
fn score_of(last_results: &serde_json::Map<String, serde_json::Value>) -> String {
    match last_results.get("score") {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(value) => value.to_string(),
        None => "N/A".to_string(),
    }
}
